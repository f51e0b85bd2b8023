//! Pipeline components: queue, retry policy, stages and the coordinator.

pub mod context;
pub mod discovery;
pub mod extraction;
pub mod orchestrator;
pub mod queue;
pub mod retry;

pub use context::{CancelToken, StageProgress};
pub use discovery::{DiscoveryReport, run_discovery};
pub use extraction::{ExtractionReport, run_extraction};
pub use orchestrator::{run_collect, run_pipeline, run_scrap};
pub use queue::{QueueConsumer, QueueProducer, bounded_queue};
pub use retry::{Backoff, RetryPolicy};
