use super::schedule::DemandTable;
use crate::core::execution::config::StationParameters;
use crate::core::types::{TimeBlock, TransactionType};
use rand::Rng;
use rand_distr::{Distribution, Exp};

/// What the arrival generator does next
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NextArrival {
    /// The next customer arrives after this many seconds
    After(f64),
    /// No demand in the current block; look again after this many seconds
    IdleUntilNextBlock(f64),
}

/// Time-varying Poisson arrival process for one transaction kind
///
/// The rate is recomputed on every draw from the demand of the block the
/// clock is in, so a new block's rate applies from the first draw after the
/// boundary.
#[derive(Debug, Clone, Copy)]
pub struct ArrivalGenerator {
    kind: TransactionType,
}

impl ArrivalGenerator {
    pub fn new(kind: TransactionType) -> Self {
        Self { kind }
    }

    /// Arrivals per second in `block`: the block's expected count spread
    /// over the block length
    pub fn rate(&self, demand: &DemandTable, block: TimeBlock, params: &StationParameters) -> f64 {
        demand.demand(self.kind, block) as f64 / params.block_length
    }

    pub fn next_arrival<G: Rng + ?Sized>(
        &self,
        demand: &DemandTable,
        now: f64,
        params: &StationParameters,
        rng: &mut G,
    ) -> NextArrival {
        let block = TimeBlock::containing(now, params.block_length, params.blocks);
        let rate = self.rate(demand, block, params);

        match Exp::new(rate) {
            Ok(interarrival) if rate > 0.0 => NextArrival::After(interarrival.sample(rng)),
            _ => {
                let next_block = (block.index() + 1) as f64 * params.block_length;
                NextArrival::IdleUntilNextBlock(next_block - now)
            }
        }
    }
}
