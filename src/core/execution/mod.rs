pub mod config;
pub mod monte_carlo;
pub mod simulation_engine;

// Re-export commonly used types
pub use config::{ConcurrencyMode, SimulationConfig, StationParameters};
pub use monte_carlo::MonteCarloRunner;
pub use simulation_engine::{EventHandler, SimulationEngine};
