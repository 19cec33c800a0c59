use super::types::TransactionType;
use thiserror::Error;

/// Errors that abort a simulation run
///
/// Every variant except `ThreadPool` belongs to the configuration class: the
/// schedule/demand pair or the run settings handed in by the caller cannot be
/// simulated. Stochastic behaviour is never reported as an error.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("block {block}: demand of {demand} {kind} transactions but no capable collector")]
    UnstaffedDemand {
        block: usize,
        kind: TransactionType,
        demand: u32,
    },

    #[error("{table} block key {block} is outside the operating day of {blocks} blocks")]
    BlockOutOfRange {
        table: &'static str,
        block: usize,
        blocks: usize,
    },

    #[error("{table} has {actual} blocks, expected {expected}")]
    ScheduleLength {
        table: &'static str,
        actual: usize,
        expected: usize,
    },

    #[error("{table} category {category} is not recognised")]
    UnknownCategory { table: &'static str, category: u32 },

    #[error("{table} entry ({category}, {block}) rounds to negative count {count}")]
    NegativeCount {
        table: &'static str,
        category: u32,
        block: usize,
        count: i64,
    },

    #[error("no on-shift collector can serve a {kind} customer at t={time:.1}s (block {block})")]
    NoEligibleCollector {
        kind: TransactionType,
        time: f64,
        block: usize,
    },

    #[error("invalid simulation config: {0}")]
    InvalidConfig(String),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl SimulationError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// True for errors caused by the supplied schedule, demand or settings
    pub fn is_configuration_error(&self) -> bool {
        !matches!(self, SimulationError::ThreadPool(_))
    }
}

/// Result type for simulation operations
pub type SimulationResult<T> = Result<T, SimulationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_eligible_collector_is_configuration_class() {
        let err = SimulationError::NoEligibleCollector {
            kind: TransactionType::Reload,
            time: 930.0,
            block: 1,
        };
        assert!(err.is_configuration_error());
        assert_eq!(
            err.to_string(),
            "no on-shift collector can serve a reload customer at t=930.0s (block 1)"
        );
    }

    #[test]
    fn test_unstaffed_demand_message() {
        let err = SimulationError::UnstaffedDemand {
            block: 4,
            kind: TransactionType::Reload,
            demand: 12,
        };
        assert!(err.is_configuration_error());
        assert!(err.to_string().starts_with("block 4: demand of 12 reload"));
    }
}
