use super::schedule::{FeedbackVector, StaffSchedule};
use crate::core::types::TimeBlock;
use log::Level;
use serde::{Deserialize, Serialize};

/// The first block that broke the service standard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// 1-indexed block key, as written into the feedback vector
    pub block: usize,
    pub rolling_average: f64,
    pub on_shift: u32,
    pub revised_minimum: u32,
}

/// Outcome of one evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    /// True when no block violated the service standard
    pub complete: bool,
    pub violation: Option<Violation>,
}

/// Post-run check of rolling averages against the service standard
#[derive(Debug, Clone)]
pub struct Evaluator {
    service_standard: f64,
    verbose: bool,
}

impl Evaluator {
    pub fn new(service_standard: f64) -> Self {
        Self {
            service_standard,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Averages at or above this value violate the standard
    pub fn threshold(&self) -> f64 {
        self.service_standard + 1.0
    }

    /// Scan blocks in order and raise the minimum staffing of the first
    /// violating block by one
    ///
    /// Only the first violation is written; the optimizer is expected to
    /// call again after re-solving. Other feedback entries are untouched.
    pub fn evaluate(
        &self,
        rolling_averages: &[f64],
        schedule: &StaffSchedule,
        feedback: &mut FeedbackVector,
    ) -> Completion {
        let level = if self.verbose { Level::Info } else { Level::Debug };
        let threshold = self.threshold();

        let first = rolling_averages
            .iter()
            .enumerate()
            .find(|&(_, &average)| average >= threshold);

        let Some((index, &average)) = first else {
            log::log!(
                level,
                "[Evaluator] service standard met in all {} blocks",
                rolling_averages.len()
            );
            return Completion {
                complete: true,
                violation: None,
            };
        };

        let block = TimeBlock(index);
        let on_shift = schedule.total_on_shift(block);
        let revised_minimum = on_shift + 1;
        feedback.set(block.external_key(), revised_minimum);

        log::log!(
            level,
            "[Evaluator] block {} had an average queue length of {:.2}",
            block.external_key(),
            average
        );
        log::log!(
            level,
            "[Evaluator] increasing minimum staff from {} to {}",
            on_shift,
            revised_minimum
        );

        Completion {
            complete: false,
            violation: Some(Violation {
                block: block.external_key(),
                rolling_average: average,
                on_shift,
                revised_minimum,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule() -> StaffSchedule {
        StaffSchedule::new(vec![1, 1, 1], vec![1, 1, 1]).unwrap()
    }

    #[test]
    fn test_first_violation_raises_minimum() {
        let mut feedback = FeedbackVector::new();
        let completion = Evaluator::new(3.0).evaluate(&[1.0, 4.2, 1.0], &schedule(), &mut feedback);

        assert!(!completion.complete);
        assert_eq!(feedback.get(2), Some(3));
        assert_eq!(feedback.get(1), None);
        assert_eq!(feedback.get(3), None);
        assert_eq!(completion.violation.unwrap().on_shift, 2);
    }

    #[test]
    fn test_only_first_violation_reported() {
        let mut feedback = FeedbackVector::new();
        let completion = Evaluator::new(3.0).evaluate(&[5.0, 4.2, 9.0], &schedule(), &mut feedback);
        assert!(!completion.complete);
        assert_eq!(feedback.iter().collect::<Vec<_>>(), vec![(1, 3)]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mut feedback = FeedbackVector::new();
        let completion =
            Evaluator::new(3.0).evaluate(&[3.99, 4.0, 0.0], &schedule(), &mut feedback);
        assert_eq!(completion.violation.map(|v| v.block), Some(2));
    }

    #[test]
    fn test_all_blocks_within_standard() {
        let mut feedback: FeedbackVector = vec![(2, 7)].into_iter().collect();
        let completion = Evaluator::new(3.0)
            .with_verbose(true)
            .evaluate(&[3.9, 0.0, 2.5], &schedule(), &mut feedback);
        assert!(completion.complete);
        assert!(completion.violation.is_none());
        assert_eq!(feedback.iter().collect::<Vec<_>>(), vec![(2, 7)]);
    }

    #[test]
    fn test_existing_entries_overwritten_only_at_violation() {
        let mut feedback: FeedbackVector = vec![(1, 9), (2, 1)].into_iter().collect();
        Evaluator::new(3.0).evaluate(&[0.0, 6.0, 0.0], &schedule(), &mut feedback);
        assert_eq!(feedback.get(1), Some(9));
        assert_eq!(feedback.get(2), Some(3));
    }
}
