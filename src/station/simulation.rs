//! Entry point used by the staffing optimizer
//!
//! One call simulates the supplied schedule against the supplied demand,
//! averages the rolling queue lengths over the configured repetitions, and
//! writes at most one revised minimum into the feedback vector.

use super::booth::ServiceTimes;
use super::evaluator::{Completion, Evaluator};
use super::model::{RunReport, StationModel};
use super::schedule::{DemandTable, FeedbackVector, StaffSchedule};
use crate::core::errors::{SimulationError, SimulationResult};
use crate::core::execution::config::SimulationConfig;
use crate::core::execution::monte_carlo::MonteCarloRunner;
use crate::core::execution::simulation_engine::SimulationEngine;
use crate::core::types::{CollectorType, TimeBlock, TransactionType};
use log::Level;
use serde::{Deserialize, Serialize};

/// Block-wise average of the repetitions' rolling accumulators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloSummary {
    pub rolling_averages: Vec<f64>,
    pub runs: Vec<RunReport>,
}

/// A validated schedule/demand pair ready to be simulated
#[derive(Debug, Clone)]
pub struct StationSimulation {
    schedule: StaffSchedule,
    demand: DemandTable,
    config: SimulationConfig,
    service_times: ServiceTimes,
}

impl StationSimulation {
    /// Validate the inputs; any problem here is a configuration error
    pub fn new(
        schedule: StaffSchedule,
        demand: DemandTable,
        config: SimulationConfig,
    ) -> SimulationResult<Self> {
        config.validate()?;
        let blocks = config.parameters.blocks;

        if schedule.blocks() != blocks {
            return Err(SimulationError::ScheduleLength {
                table: "staff schedule",
                actual: schedule.blocks(),
                expected: blocks,
            });
        }
        if demand.blocks() != blocks {
            return Err(SimulationError::ScheduleLength {
                table: "demand table",
                actual: demand.blocks(),
                expected: blocks,
            });
        }
        check_demand_is_staffed(&schedule, &demand, blocks)?;

        let params = &config.parameters;
        let service_times = ServiceTimes::new(params.ticket_mean, params.reload_mean)?;
        Ok(Self {
            schedule,
            demand,
            config,
            service_times,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn schedule(&self) -> &StaffSchedule {
        &self.schedule
    }

    /// Simulate one operating day with the given seed
    pub fn run_once(&self, seed: u64) -> SimulationResult<RunReport> {
        let model = StationModel::new(
            self.schedule.clone(),
            self.demand.clone(),
            self.config.parameters.clone(),
            self.service_times.clone(),
            seed,
        );
        let mut engine = SimulationEngine::new(model, self.config.parameters.horizon());
        let events = engine.run()?;
        Ok(engine.into_handler().into_report(events))
    }

    /// Run every repetition and average their accumulators block by block
    pub fn run(&self) -> SimulationResult<MonteCarloSummary> {
        let level = self.report_level();
        let runs = MonteCarloRunner::new(&self.config).run(|repetition, seed| {
            let report = self.run_once(seed)?;
            log::log!(
                level,
                "--- Run {} of {} completed (seed {}, {} customers, {} unserved)",
                repetition + 1,
                self.config.repetitions,
                seed,
                report.arrivals.iter().sum::<u64>(),
                report.abandoned.iter().sum::<u64>()
            );
            Ok(report)
        })?;

        let mut rolling_averages = vec![0.0; self.config.parameters.blocks];
        let repetitions = runs.len() as f64;
        for run in &runs {
            for (average, value) in rolling_averages.iter_mut().zip(&run.rolling_averages) {
                *average += value / repetitions;
            }
        }

        Ok(MonteCarloSummary { rolling_averages, runs })
    }

    /// Simulate, then feed the first service-standard violation back
    pub fn evaluate(&self, feedback: &mut FeedbackVector) -> SimulationResult<Completion> {
        let summary = self.run()?;
        let evaluator =
            Evaluator::new(self.config.service_standard).with_verbose(self.config.verbose);
        Ok(evaluator.evaluate(&summary.rolling_averages, &self.schedule, feedback))
    }

    fn report_level(&self) -> Level {
        if self.config.verbose {
            Level::Info
        } else {
            Level::Debug
        }
    }
}

/// Validate, simulate and evaluate in one call
pub fn evaluate_schedule(
    schedule: StaffSchedule,
    demand: DemandTable,
    feedback: &mut FeedbackVector,
    config: SimulationConfig,
) -> SimulationResult<Completion> {
    StationSimulation::new(schedule, demand, config)?.evaluate(feedback)
}

/// Every block with demand must have someone able to serve it
fn check_demand_is_staffed(
    schedule: &StaffSchedule,
    demand: &DemandTable,
    blocks: usize,
) -> SimulationResult<()> {
    for index in 0..blocks {
        let block = TimeBlock(index);
        for kind in TransactionType::ALL {
            let expected = demand.demand(kind, block);
            if expected == 0 {
                continue;
            }
            let capable: u32 = CollectorType::ALL
                .into_iter()
                .filter(|c| c.can_serve(kind))
                .map(|c| schedule.required(c, block))
                .sum();
            if capable == 0 {
                return Err(SimulationError::UnstaffedDemand {
                    block: index,
                    kind,
                    demand: expected,
                });
            }
        }
    }
    Ok(())
}
