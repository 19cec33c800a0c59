use super::station::Station;
use crate::core::types::TimeBlock;

/// Periodic queue-length sampler with lookback smoothing
///
/// Each sample is the mean queue length over on-shift booths divided by the
/// sampling interval. It is added to the accumulator of the current block
/// and of the `lookback - 1` blocks before it, stopping at block zero.
#[derive(Debug, Clone)]
pub struct QueueMonitor {
    totals: Vec<f64>,
    lookback: usize,
    interval: f64,
    samples: u64,
}

impl QueueMonitor {
    pub fn new(blocks: usize, lookback: usize, interval: f64) -> Self {
        Self {
            totals: vec![0.0; blocks],
            lookback,
            interval,
            samples: 0,
        }
    }

    /// Take one sample of the station at `block`
    ///
    /// Returns the normalised contribution, or `None` when no booth is on
    /// shift and nothing is recorded.
    pub fn sample(&mut self, station: &Station, block: TimeBlock) -> Option<f64> {
        let (sum, on_shift) = station
            .on_shift_booths()
            .fold((0usize, 0usize), |(sum, count), booth| (sum + booth.queue_length(), count + 1));
        if on_shift == 0 {
            return None;
        }

        let contribution = (sum as f64 / on_shift as f64) / self.interval;
        self.record(block, contribution);
        Some(contribution)
    }

    /// Smear `value` over `block` and its lookback window
    pub fn record(&mut self, block: TimeBlock, value: f64) {
        self.samples += 1;
        if self.totals.is_empty() {
            return;
        }
        let last = block.index().min(self.totals.len().saturating_sub(1));
        let first = (last + 1).saturating_sub(self.lookback);
        for total in &mut self.totals[first..=last] {
            *total += value;
        }
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn rolling_averages(&self) -> &[f64] {
        &self.totals
    }

    pub fn into_rolling_averages(self) -> Vec<f64> {
        self.totals
    }
}
