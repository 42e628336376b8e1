//! Wiring of recorder, processor and sweep over one store and inbox.

use super::{AdminNotifier, EventProcessor, EventRecorder, SweepBootstrap};
use crate::audit::{
    domain::AlertRenderer,
    ports::{AdminInbox, SystemEventStore},
};
use crate::config::PipelineConfig;
use mockable::Clock;
use std::sync::Arc;

/// The assembled audit pipeline.
pub struct AuditPipeline<S, I, C>
where
    S: SystemEventStore + ?Sized + 'static,
    I: AdminInbox + ?Sized + 'static,
    C: Clock + Send + Sync + 'static,
{
    recorder: Arc<EventRecorder<S, I, C>>,
    processor: Arc<EventProcessor<S, I, C>>,
    sweep: SweepBootstrap<S, I, C>,
}

impl<S, I, C> AuditPipeline<S, I, C>
where
    S: SystemEventStore + ?Sized + 'static,
    I: AdminInbox + ?Sized + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Builds the pipeline from `config`.
    #[must_use]
    pub fn new(store: Arc<S>, inbox: Arc<I>, clock: Arc<C>, config: &PipelineConfig) -> Self {
        let renderer = Arc::new(AlertRenderer::new(
            config.unknown_actor_label.clone(),
            config.missing_detail_label.clone(),
        ));
        let notifier = AdminNotifier::new(inbox, renderer, Arc::clone(&clock));
        let recorder = Arc::new(EventRecorder::new(
            Arc::clone(&store),
            notifier.clone(),
            Arc::clone(&clock),
        ));
        let processor = Arc::new(EventProcessor::new(
            store,
            notifier,
            clock,
            config.batch_size,
        ));
        let sweep = SweepBootstrap::new(Arc::clone(&processor), config.sweep_interval);
        Self {
            recorder,
            processor,
            sweep,
        }
    }

    /// Recorder to hand to the tracker service as its audit trail.
    #[must_use]
    pub fn recorder(&self) -> Arc<EventRecorder<S, I, C>> {
        Arc::clone(&self.recorder)
    }

    /// Processor for running sweep passes by hand.
    #[must_use]
    pub fn processor(&self) -> Arc<EventProcessor<S, I, C>> {
        Arc::clone(&self.processor)
    }

    /// Sweep lifecycle latch.
    #[must_use]
    pub const fn sweep(&self) -> &SweepBootstrap<S, I, C> {
        &self.sweep
    }
}
