/// Configuration for station simulation runs
///
/// This module provides the run settings (repetitions, seeding, concurrency,
/// service standard) and the physical parameters of the station model.
use crate::core::errors::{SimulationError, SimulationResult};
use serde::{Deserialize, Serialize};

/// Enumeration of supported concurrency modes for Monte Carlo repetitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConcurrencyMode {
    /// Repetitions run one after another on the calling thread
    #[default]
    Sequential,
    /// Repetitions run on a Rayon thread pool
    Rayon,
}

/// Physical and timing parameters of the station model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationParameters {
    /// Number of blocks in the operating day
    pub blocks: usize,
    /// Length of one block in seconds
    pub block_length: f64,
    /// Seconds between queue-length samples
    pub sample_interval: f64,
    /// Blocks a single sample is smeared over, current block included
    pub lookback_blocks: usize,
    /// Mean ticket sale duration in seconds
    pub ticket_mean: f64,
    /// Mean card reload duration in seconds
    pub reload_mean: f64,
}

impl StationParameters {
    /// Simulated horizon in seconds
    pub fn horizon(&self) -> f64 {
        self.blocks as f64 * self.block_length
    }
}

impl Default for StationParameters {
    fn default() -> Self {
        Self {
            blocks: 68,
            block_length: 15.0 * 60.0,
            sample_interval: 60.0,
            lookback_blocks: 4,
            ticket_mean: 11.0,
            reload_mean: 17.0,
        }
    }
}

/// Configuration for a schedule evaluation
///
/// Holds the Monte Carlo repetition count, seeding, the service standard the
/// evaluator checks against, and how repetitions are executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of independent runs averaged together
    pub repetitions: usize,
    /// Base seed; repetition `i` uses `seed + i`. `None` draws fresh seeds.
    pub seed: Option<u64>,
    /// Maximum tolerated rolling average queue length
    pub service_standard: f64,
    /// Report per-run and violation details at info level
    pub verbose: bool,
    /// The concurrency mode to use for repetitions
    pub concurrency_mode: ConcurrencyMode,
    /// The size of the thread pool for parallel execution
    /// Only relevant when concurrency_mode is Rayon
    pub thread_pool_size: Option<usize>,
    pub parameters: StationParameters,
}

impl SimulationConfig {
    /// Create a new simulation configuration with default values
    ///
    /// Default configuration is a single sequential repetition with fresh
    /// randomness and a service standard of 3.
    pub fn new() -> Self {
        Self {
            repetitions: 1,
            seed: None,
            service_standard: 3.0,
            verbose: false,
            concurrency_mode: ConcurrencyMode::default(),
            thread_pool_size: None,
            parameters: StationParameters::default(),
        }
    }

    /// Fix the base seed so runs are reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the number of Monte Carlo repetitions
    pub fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    pub fn with_service_standard(mut self, service_standard: f64) -> Self {
        self.service_standard = service_standard;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the concurrency mode for the repetitions
    pub fn with_concurrency(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency_mode = mode;
        self
    }

    /// Set the thread pool size for parallel execution
    ///
    /// # Note
    /// This setting only affects execution when concurrency_mode is Rayon
    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }

    pub fn with_parameters(mut self, parameters: StationParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Seed for the given repetition, if runs are seeded
    pub fn repetition_seed(&self, repetition: usize) -> Option<u64> {
        self.seed.map(|seed| seed.wrapping_add(repetition as u64))
    }

    /// Reject settings the simulation cannot run with
    pub fn validate(&self) -> SimulationResult<()> {
        let p = &self.parameters;
        if self.repetitions == 0 {
            return Err(SimulationError::invalid_config("repetitions must be at least 1"));
        }
        if !self.service_standard.is_finite() {
            return Err(SimulationError::invalid_config("service standard must be finite"));
        }
        if self.thread_pool_size == Some(0) {
            return Err(SimulationError::invalid_config("thread pool size must be positive"));
        }
        if p.blocks == 0 {
            return Err(SimulationError::invalid_config("operating day needs at least one block"));
        }
        if p.lookback_blocks == 0 {
            return Err(SimulationError::invalid_config(
                "lookback window must cover the current block",
            ));
        }
        for (name, value) in [
            ("block length", p.block_length),
            ("sample interval", p.sample_interval),
            ("ticket mean", p.ticket_mean),
            ("reload mean", p.reload_mean),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimulationError::invalid_config(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new()
    }
}
