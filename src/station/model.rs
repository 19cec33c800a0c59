use super::arrivals::{ArrivalGenerator, NextArrival};
use super::booth::{ServiceTimes, CUSTOMER_PRIORITY, REMOVAL_PRIORITY};
use super::dispatcher::{select_booth, Customer};
use super::monitor::QueueMonitor;
use super::schedule::{DemandTable, StaffSchedule};
use super::station::{RemovalOrder, Requester, Station};
use crate::core::errors::SimulationResult;
use crate::core::event_scheduler::{EventScheduler, Priority};
use crate::core::execution::config::StationParameters;
use crate::core::execution::simulation_engine::EventHandler;
use crate::core::types::{BoothId, TimeBlock, TransactionType};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Staffing reviews run ahead of anything else due at a block boundary
const STAFFING_PRIORITY: Priority = REMOVAL_PRIORITY;

/// Resumption points of the station's logical processes
#[derive(Debug, Clone, PartialEq)]
pub enum Activity {
    /// Staffing controller wakes at a block boundary
    StaffingReview,
    /// A customer of this kind arrives
    ArrivalDue(TransactionType),
    /// Generator of this kind re-checks demand after an idle block
    ArrivalWake(TransactionType),
    /// A requester has been given the booth
    AccessGranted { booth: BoothId, requester: Requester },
    /// A customer's transaction finished
    ServiceComplete { booth: BoothId, customer: Customer },
    /// Monitor takes a queue-length sample
    QueueSample,
}

/// Per-kind counters, indexed by `TransactionType::index`
pub type KindCounts = [u64; 2];

/// What one run of the station produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub seed: u64,
    /// Rolling per-block queue accumulators
    pub rolling_averages: Vec<f64>,
    pub arrivals: KindCounts,
    /// Arrivals drawn at a rate that no longer applied and dropped
    pub thinned: KindCounts,
    pub served: KindCounts,
    /// Customers granted a booth that had gone off shift while they waited
    pub abandoned: KindCounts,
    pub reconciliations: u64,
    pub removals: u64,
    pub samples: u64,
    pub events: u64,
}

/// The station with its arrival, staffing, customer and monitor processes
pub struct StationModel {
    station: Station,
    demand: DemandTable,
    params: StationParameters,
    service_times: ServiceTimes,
    generators: [ArrivalGenerator; 2],
    monitor: QueueMonitor,
    rng: StdRng,
    seed: u64,
    arrivals: KindCounts,
    thinned: KindCounts,
    served: KindCounts,
    abandoned: KindCounts,
    reconciliations: u64,
    removals: u64,
    /// Booths with an outstanding grant, tracked apart from the booths' own flag
    holders: BTreeSet<BoothId>,
}

impl StationModel {
    pub fn new(
        schedule: StaffSchedule,
        demand: DemandTable,
        params: StationParameters,
        service_times: ServiceTimes,
        seed: u64,
    ) -> Self {
        let monitor = QueueMonitor::new(
            params.blocks,
            params.lookback_blocks,
            params.sample_interval,
        );
        Self {
            station: Station::new(schedule),
            demand,
            params,
            service_times,
            generators: [
                ArrivalGenerator::new(TransactionType::Buy),
                ArrivalGenerator::new(TransactionType::Reload),
            ],
            monitor,
            rng: StdRng::seed_from_u64(seed),
            seed,
            arrivals: [0; 2],
            thinned: [0; 2],
            served: [0; 2],
            abandoned: [0; 2],
            reconciliations: 0,
            removals: 0,
            holders: BTreeSet::new(),
        }
    }

    pub fn station(&self) -> &Station {
        &self.station
    }

    pub fn monitor(&self) -> &QueueMonitor {
        &self.monitor
    }

    /// Consume the model into its report
    pub fn into_report(self, events: u64) -> RunReport {
        RunReport {
            seed: self.seed,
            samples: self.monitor.samples(),
            rolling_averages: self.monitor.into_rolling_averages(),
            arrivals: self.arrivals,
            thinned: self.thinned,
            served: self.served,
            abandoned: self.abandoned,
            reconciliations: self.reconciliations,
            removals: self.removals,
            events,
        }
    }

    fn block_at(&self, time: f64) -> TimeBlock {
        TimeBlock::containing(time, self.params.block_length, self.params.blocks)
    }

    fn request(
        &mut self,
        scheduler: &mut EventScheduler<Activity>,
        booth: BoothId,
        priority: Priority,
        requester: Requester,
    ) {
        if let Some(grant) = self.station.booth_mut(booth).request(priority, requester) {
            let fresh = self.holders.insert(booth);
            debug_assert!(fresh, "booth {} granted while already held", booth);
            scheduler.schedule_event(
                Activity::AccessGranted {
                    booth,
                    requester: grant.requester,
                },
                0.0,
                grant.priority,
            );
        }
    }

    fn release(&mut self, scheduler: &mut EventScheduler<Activity>, booth: BoothId) {
        match self.station.booth_mut(booth).release() {
            // Handed straight to the next waiter, so the booth stays held
            Some(grant) => scheduler.schedule_event(
                Activity::AccessGranted {
                    booth,
                    requester: grant.requester,
                },
                0.0,
                grant.priority,
            ),
            None => {
                self.holders.remove(&booth);
            }
        }
        self.check_single_holder(booth);
    }

    fn check_single_holder(&self, booth: BoothId) {
        let state = self.station.booth(booth);
        debug_assert_eq!(state.is_occupied(), self.holders.contains(&booth));
        debug_assert!(state.queue_length() <= state.waiting() + 1);
    }

    /// Every booth holds at most one requester and agrees with the grant ledger
    pub fn holders_consistent(&self) -> bool {
        self.station.booths().iter().all(|booth| {
            booth.is_occupied() == self.holders.contains(&booth.id())
                && booth.queue_length() <= booth.waiting() + 1
        })
    }

    /// Ask for the next booth on a removal order, if any are left
    fn continue_removal(
        &mut self,
        scheduler: &mut EventScheduler<Activity>,
        mut order: RemovalOrder,
    ) {
        if let Some(booth) = order.remaining.pop_front() {
            self.request(scheduler, booth, REMOVAL_PRIORITY, Requester::Removal(order));
        }
    }

    fn schedule_next_arrival(
        &mut self,
        scheduler: &mut EventScheduler<Activity>,
        kind: TransactionType,
    ) {
        let generator = self.generators[kind.index()];
        let now = scheduler.now();
        let next = generator.next_arrival(&self.demand, now, &self.params, &mut self.rng);
        let (activity, delay) = match next {
            NextArrival::After(gap) => (Activity::ArrivalDue(kind), gap),
            NextArrival::IdleUntilNextBlock(wait) => (Activity::ArrivalWake(kind), wait),
        };
        scheduler.schedule_event(activity, delay, CUSTOMER_PRIORITY);
    }

    fn review_staffing(&mut self, scheduler: &mut EventScheduler<Activity>) {
        let block = self.block_at(scheduler.now());
        log::debug!("=== Staffing review, block {} (t={}) ===", block, scheduler.now());

        self.reconciliations += 1;
        for order in self.station.reconcile(block) {
            self.continue_removal(scheduler, order);
        }
        scheduler.schedule_event(
            Activity::StaffingReview,
            self.params.block_length,
            STAFFING_PRIORITY,
        );
    }

    fn customer_arrives(
        &mut self,
        scheduler: &mut EventScheduler<Activity>,
        kind: TransactionType,
    ) -> SimulationResult<()> {
        let now = scheduler.now();
        let block = self.block_at(now);

        // The gap was drawn at the previous block's rate; with no demand here
        // the arrival is thinned away instead of dispatched.
        if self.demand.demand(kind, block) == 0 {
            log::trace!("{} arrival at t={:.1} thinned, block {} has no demand", kind, now, block);
            self.thinned[kind.index()] += 1;
            self.schedule_next_arrival(scheduler, kind);
            return Ok(());
        }
        self.arrivals[kind.index()] += 1;

        let booth = select_booth(&self.station, kind, now, block)?;
        log::trace!(
            "[Booth {}] {} customer joins queue of {} at t={:.1}",
            booth,
            kind,
            self.station.booth(booth).queue_length(),
            now
        );
        let customer = Requester::Customer(Customer::new(kind, now));
        self.request(scheduler, booth, CUSTOMER_PRIORITY, customer);

        self.schedule_next_arrival(scheduler, kind);
        Ok(())
    }

    fn access_granted(
        &mut self,
        scheduler: &mut EventScheduler<Activity>,
        booth: BoothId,
        requester: Requester,
    ) {
        match requester {
            Requester::Removal(order) => {
                log::debug!(
                    "[Booth {}] {} collector goes off shift at t={:.1}, {} more to remove",
                    booth,
                    order.collector_type,
                    scheduler.now(),
                    order.remaining.len()
                );
                self.removals += 1;
                self.station.set_on_shift(booth, false);
                self.release(scheduler, booth);
                self.continue_removal(scheduler, order);
            }
            Requester::Customer(customer) if self.station.booth(booth).is_on_shift() => {
                log::trace!(
                    "[Booth {}] serving {} customer after {:.1}s wait",
                    booth,
                    customer.kind,
                    scheduler.now() - customer.arrived_at
                );
                let duration = self.service_times.for_transaction(customer.kind, &mut self.rng);
                scheduler.schedule_event(
                    Activity::ServiceComplete { booth, customer },
                    duration,
                    CUSTOMER_PRIORITY,
                );
            }
            Requester::Customer(customer) => {
                // Booth went off shift while the customer waited: they leave unserved
                log::trace!(
                    "[Booth {}] off shift, {} customer leaves unserved",
                    booth,
                    customer.kind
                );
                self.abandoned[customer.kind.index()] += 1;
                self.release(scheduler, booth);
            }
        }
    }
}

impl EventHandler for StationModel {
    type Event = Activity;

    fn start(&mut self, scheduler: &mut EventScheduler<Activity>) -> SimulationResult<()> {
        scheduler.schedule_event(Activity::StaffingReview, 0.0, STAFFING_PRIORITY);
        scheduler.schedule_event(Activity::QueueSample, 0.0, CUSTOMER_PRIORITY);
        self.schedule_next_arrival(scheduler, TransactionType::Reload);
        self.schedule_next_arrival(scheduler, TransactionType::Buy);
        Ok(())
    }

    fn handle(
        &mut self,
        scheduler: &mut EventScheduler<Activity>,
        event: Activity,
    ) -> SimulationResult<()> {
        match event {
            Activity::StaffingReview => self.review_staffing(scheduler),
            Activity::ArrivalDue(kind) => self.customer_arrives(scheduler, kind)?,
            Activity::ArrivalWake(kind) => self.schedule_next_arrival(scheduler, kind),
            Activity::AccessGranted { booth, requester } => {
                self.access_granted(scheduler, booth, requester)
            }
            Activity::ServiceComplete { booth, customer } => {
                self.served[customer.kind.index()] += 1;
                self.release(scheduler, booth);
            }
            Activity::QueueSample => {
                let block = self.block_at(scheduler.now());
                self.monitor.sample(&self.station, block);
                scheduler.schedule_event(
                    Activity::QueueSample,
                    self.params.sample_interval,
                    CUSTOMER_PRIORITY,
                );
            }
        }
        Ok(())
    }
}
