use crate::core::errors::{SimulationError, SimulationResult};
use crate::core::event_scheduler::Priority;
use crate::core::types::{BoothId, CollectorType, TransactionType};
use rand::Rng;
use rand_distr::{Distribution, Exp};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Priority of staffing removal requests
pub const REMOVAL_PRIORITY: Priority = -1;
/// Default priority of customer requests
pub const CUSTOMER_PRIORITY: Priority = 0;

/// Exclusive access handed to a requester
#[derive(Debug, Clone, PartialEq)]
pub struct Grant<R> {
    pub priority: Priority,
    pub requester: R,
}

#[derive(Debug)]
struct WaitingRequest<R> {
    priority: Priority,
    ticket: u64,
    requester: R,
}

impl<R> PartialEq for WaitingRequest<R> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.ticket == other.ticket
    }
}

impl<R> Eq for WaitingRequest<R> {}

impl<R> PartialOrd for WaitingRequest<R> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<R> Ord for WaitingRequest<R> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap yields (lowest priority value, oldest ticket)
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.ticket.cmp(&self.ticket))
    }
}

/// A single-capacity service point staffed by one fare collector
///
/// At most one requester holds the booth. Waiters are granted in
/// (priority, arrival) order when the holder releases. Taking a booth off
/// shift never evicts the holder; it only stops new dispatch to it.
#[derive(Debug)]
pub struct Booth<R> {
    id: BoothId,
    collector_type: CollectorType,
    on_shift: bool,
    occupied: bool,
    wait_list: BinaryHeap<WaitingRequest<R>>,
    next_ticket: u64,
}

impl<R> Booth<R> {
    /// Create an idle, off-shift booth
    pub fn new(id: BoothId, collector_type: CollectorType) -> Self {
        Self {
            id,
            collector_type,
            on_shift: false,
            occupied: false,
            wait_list: BinaryHeap::new(),
            next_ticket: 0,
        }
    }

    pub fn id(&self) -> BoothId {
        self.id
    }

    pub fn collector_type(&self) -> CollectorType {
        self.collector_type
    }

    pub fn is_on_shift(&self) -> bool {
        self.on_shift
    }

    pub(crate) fn set_on_shift(&mut self, on_shift: bool) {
        self.on_shift = on_shift;
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    /// Number of requests waiting behind the holder
    pub fn waiting(&self) -> usize {
        self.wait_list.len()
    }

    /// Wait-list size plus one if the booth is held
    pub fn queue_length(&self) -> usize {
        self.wait_list.len() + usize::from(self.occupied)
    }

    /// Ask for exclusive access
    ///
    /// Returns the grant straight away when the booth is free, otherwise the
    /// request joins the wait list and is handed out by a later `release`.
    pub fn request(&mut self, priority: Priority, requester: R) -> Option<Grant<R>> {
        if !self.occupied {
            self.occupied = true;
            return Some(Grant { priority, requester });
        }

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.wait_list.push(WaitingRequest {
            priority,
            ticket,
            requester,
        });
        None
    }

    /// Vacate the booth, handing it to the next eligible waiter if any
    pub fn release(&mut self) -> Option<Grant<R>> {
        if !self.occupied {
            log::warn!("[Booth {}] release without a holder", self.id);
            return None;
        }

        match self.wait_list.pop() {
            Some(next) => Some(Grant {
                priority: next.priority,
                requester: next.requester,
            }),
            None => {
                self.occupied = false;
                None
            }
        }
    }
}

/// Exponential service durations for the two transaction kinds
#[derive(Debug, Clone)]
pub struct ServiceTimes {
    ticket: Exp<f64>,
    reload: Exp<f64>,
}

impl ServiceTimes {
    /// Build from mean durations in seconds
    pub fn new(ticket_mean: f64, reload_mean: f64) -> SimulationResult<Self> {
        Ok(Self {
            ticket: exponential_with_mean(ticket_mean, "ticket mean")?,
            reload: exponential_with_mean(reload_mean, "reload mean")?,
        })
    }

    /// Time spent selling a ticket
    pub fn sell_ticket<G: Rng + ?Sized>(&self, rng: &mut G) -> f64 {
        self.ticket.sample(rng)
    }

    /// Time spent reloading a prepaid card
    pub fn reload_card<G: Rng + ?Sized>(&self, rng: &mut G) -> f64 {
        self.reload.sample(rng)
    }

    pub fn for_transaction<G: Rng + ?Sized>(&self, kind: TransactionType, rng: &mut G) -> f64 {
        match kind {
            TransactionType::Buy => self.sell_ticket(rng),
            TransactionType::Reload => self.reload_card(rng),
        }
    }
}

fn exponential_with_mean(mean: f64, name: &str) -> SimulationResult<Exp<f64>> {
    if !(mean.is_finite() && mean > 0.0) {
        return Err(SimulationError::invalid_config(format!(
            "{} must be positive, got {}",
            name, mean
        )));
    }
    Exp::new(1.0 / mean).map_err(|e| SimulationError::invalid_config(format!("{}: {}", name, e)))
}
