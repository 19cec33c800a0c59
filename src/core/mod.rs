pub mod errors;
pub mod event_scheduler;
pub mod execution;
pub mod types;
