//! llamasum pipeline
//!
//! Presentation-free service: input string, mode and optional instruction
//! in, generated text or error out

mod pipeline;
mod types;

pub use pipeline::Pipeline;
pub use types::{DeliveryStrategy, PipelineOutput, PipelineRequest, PipelineSettings};

// Front ends need the token type to cancel a run
pub use tokio_util::sync::CancellationToken;
