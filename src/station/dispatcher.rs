use super::station::Station;
use crate::core::errors::{SimulationError, SimulationResult};
use crate::core::types::{BoothId, TimeBlock, TransactionType};
use serde::{Deserialize, Serialize};

/// A customer on their way through the station
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub kind: TransactionType,
    pub arrived_at: f64,
}

impl Customer {
    pub fn new(kind: TransactionType, arrived_at: f64) -> Self {
        Self { kind, arrived_at }
    }
}

/// Pick the booth a new customer joins
///
/// Customers go to the on-shift booth with the shortest queue among those
/// able to serve them; ties go to the earliest booth in the list. An empty
/// eligible set means the schedule cannot serve the demand it was given.
pub fn select_booth(
    station: &Station,
    kind: TransactionType,
    now: f64,
    block: TimeBlock,
) -> SimulationResult<BoothId> {
    let mut best: Option<(usize, BoothId)> = None;
    for booth in station.eligible_booths(kind) {
        let length = booth.queue_length();
        match best {
            Some((shortest, _)) if length >= shortest => {}
            _ => best = Some((length, booth.id())),
        }
    }

    best.map(|(_, id)| id).ok_or(SimulationError::NoEligibleCollector {
        kind,
        time: now,
        block: block.index(),
    })
}
