use crate::core::errors::SimulationResult;
use crate::core::event_scheduler::EventScheduler;
use log::debug;

/// Model driven by the engine
///
/// Logical processes are expressed as events: a process suspends by
/// scheduling the event that resumes it and is continued in `handle`.
pub trait EventHandler {
    type Event;

    /// Schedule the initial resumptions at time zero
    fn start(&mut self, scheduler: &mut EventScheduler<Self::Event>) -> SimulationResult<()>;

    /// Continue the process an event belongs to
    fn handle(
        &mut self,
        scheduler: &mut EventScheduler<Self::Event>,
        event: Self::Event,
    ) -> SimulationResult<()>;
}

/// Single-run event loop over one model and a fixed horizon
pub struct SimulationEngine<H: EventHandler> {
    handler: H,
    scheduler: EventScheduler<H::Event>,
    horizon: f64,
    events_processed: u64,
}

impl<H: EventHandler> SimulationEngine<H> {
    pub fn new(handler: H, horizon: f64) -> Self {
        Self {
            handler,
            scheduler: EventScheduler::new(),
            horizon,
            events_processed: 0,
        }
    }

    /// Run the model to the horizon, returns the number of events processed
    ///
    /// The first error raised by the model aborts the run.
    pub fn run(&mut self) -> SimulationResult<u64> {
        let Self {
            handler,
            scheduler,
            horizon,
            events_processed,
        } = self;

        handler.start(scheduler)?;
        *events_processed +=
            scheduler.run(*horizon, |scheduler, event| handler.handle(scheduler, event))?;

        debug!(
            "=== Simulation finished at t={} after {} events ===",
            scheduler.now(),
            events_processed
        );
        Ok(*events_processed)
    }

    /// Get current simulation time
    pub fn current_time(&self) -> f64 {
        self.scheduler.now()
    }

    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }
}
