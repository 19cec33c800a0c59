//! Fare-collection station model
//!
//! - **booth**: single-capacity service points with priority wait lists
//! - **station**: the booth set and the staffing controller
//! - **arrivals**: time-varying Poisson arrivals per transaction kind
//! - **dispatcher**: customer booth selection
//! - **monitor**: rolling queue-length sampling
//! - **evaluator**: service-standard check producing optimizer feedback
//! - **model**: the processes above wired into one event handler
//! - **simulation**: validated entry point with Monte Carlo averaging

pub mod arrivals;
pub mod booth;
pub mod dispatcher;
pub mod evaluator;
pub mod model;
pub mod monitor;
pub mod schedule;
pub mod simulation;
pub mod station;

pub use booth::{Booth, ServiceTimes, CUSTOMER_PRIORITY, REMOVAL_PRIORITY};
pub use evaluator::{Completion, Evaluator, Violation};
pub use model::{Activity, RunReport, StationModel};
pub use schedule::{DemandTable, FeedbackVector, StaffSchedule};
pub use simulation::{evaluate_schedule, MonteCarloSummary, StationSimulation};
pub use station::{RemovalOrder, Requester, Station};
