//! Application services for the audit pipeline.

mod notifier;
mod pipeline;
mod processor;
mod recorder;
mod sweep;

pub use notifier::{AdminNotifier, FanOutOutcome, alert_dedupe_key};
pub use pipeline::AuditPipeline;
pub use processor::{EventProcessor, SweepReport};
pub use recorder::{EventRecorder, RecordOutcome};
pub use sweep::{SweepBootstrap, SweepError, SweepStart};
