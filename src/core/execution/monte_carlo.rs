use crate::core::errors::SimulationResult;
use crate::core::execution::config::{ConcurrencyMode, SimulationConfig};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

/// Runs independent repetitions of a simulation and gathers their results
///
/// Results come back in repetition order whichever concurrency mode is used,
/// so a seeded configuration produces the same output sequentially and on a
/// thread pool.
pub struct MonteCarloRunner<'a> {
    config: &'a SimulationConfig,
}

impl<'a> MonteCarloRunner<'a> {
    pub fn new(config: &'a SimulationConfig) -> Self {
        Self { config }
    }

    /// One seed per repetition; fresh random seeds when the config is unseeded
    pub fn seeds(&self) -> Vec<u64> {
        (0..self.config.repetitions)
            .map(|repetition| self.config.repetition_seed(repetition).unwrap_or_else(rand::random))
            .collect()
    }

    /// Run `job(repetition, seed)` for every repetition
    ///
    /// The first failing repetition's error is returned.
    pub fn run<T, F>(&self, job: F) -> SimulationResult<Vec<T>>
    where
        T: Send,
        F: Fn(usize, u64) -> SimulationResult<T> + Sync,
    {
        let seeds = self.seeds();
        log::debug!(
            "[MonteCarlo] {} repetitions, mode {:?}",
            seeds.len(),
            self.config.concurrency_mode
        );

        match self.config.concurrency_mode {
            ConcurrencyMode::Sequential => seeds
                .iter()
                .enumerate()
                .map(|(repetition, &seed)| job(repetition, seed))
                .collect(),
            ConcurrencyMode::Rayon => {
                let run_all = || {
                    seeds
                        .par_iter()
                        .enumerate()
                        .map(|(repetition, &seed)| job(repetition, seed))
                        .collect::<SimulationResult<Vec<T>>>()
                };
                match self.config.thread_pool_size {
                    Some(threads) => ThreadPoolBuilder::new()
                        .num_threads(threads)
                        .build()?
                        .install(run_all),
                    None => run_all(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::SimulationError;

    #[test]
    fn test_seeded_repetitions_use_consecutive_seeds() {
        let config = SimulationConfig::new().with_seed(100).with_repetitions(3);
        assert_eq!(MonteCarloRunner::new(&config).seeds(), vec![100, 101, 102]);
    }

    #[test]
    fn test_rayon_results_keep_repetition_order() {
        let config = SimulationConfig::new()
            .with_seed(10)
            .with_repetitions(16)
            .with_concurrency(ConcurrencyMode::Rayon)
            .with_thread_pool_size(4);
        let results = MonteCarloRunner::new(&config)
            .run(|repetition, seed| Ok((repetition, seed)))
            .unwrap();
        let expected: Vec<_> = (0..16).map(|r| (r, 10 + r as u64)).collect();
        assert_eq!(results, expected);
    }

    #[test]
    fn test_failing_repetition_aborts() {
        let config = SimulationConfig::new().with_seed(1).with_repetitions(4);
        let runner = MonteCarloRunner::new(&config);
        let result: SimulationResult<Vec<u64>> = runner.run(|repetition, seed| {
            if repetition == 2 {
                Err(SimulationError::invalid_config("boom"))
            } else {
                Ok(seed)
            }
        });
        assert!(matches!(result, Err(SimulationError::InvalidConfig(_))));
    }
}
