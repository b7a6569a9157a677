//! Application use cases. Orchestrate domain logic via ports.

pub mod content_aggregator;
pub mod digest_dispatcher;
pub mod digest_renderer;
pub mod pipeline;

pub use content_aggregator::ContentAggregator;
pub use digest_dispatcher::DigestDispatcher;
pub use digest_renderer::DigestRenderer;
pub use pipeline::{DigestPipeline, PipelineState, RunOutcome};
