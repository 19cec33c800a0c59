pub mod core;
pub mod station;

// Re-export commonly used types
pub use crate::core::errors::{SimulationError, SimulationResult};
pub use crate::core::execution::{ConcurrencyMode, SimulationConfig, StationParameters};
pub use crate::core::types::{BoothId, CollectorType, TimeBlock, TransactionType};
pub use crate::station::{
    evaluate_schedule, Completion, DemandTable, FeedbackVector, MonteCarloSummary, RunReport,
    StaffSchedule, StationSimulation, Violation,
};
