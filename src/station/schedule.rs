//! Staffing and demand tables exchanged with the optimizer
//!
//! The optimizer keys its tables by 1-indexed `(category, block)` pairs.
//! These types hold them as dense 0-indexed per-category rows.

use crate::core::errors::{SimulationError, SimulationResult};
use crate::core::types::{CollectorType, TimeBlock, TransactionType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Required on-shift collectors per capability class and block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffSchedule {
    rows: [Vec<u32>; 2],
}

impl StaffSchedule {
    /// Build from per-block rows. Both rows must cover the same blocks.
    pub fn new(with_terminal: Vec<u32>, without_terminal: Vec<u32>) -> SimulationResult<Self> {
        if with_terminal.len() != without_terminal.len() {
            return Err(SimulationError::ScheduleLength {
                table: "staff schedule",
                actual: without_terminal.len(),
                expected: with_terminal.len(),
            });
        }
        Ok(Self {
            rows: [with_terminal, without_terminal],
        })
    }

    /// Translate the optimizer's 1-indexed `(category, block) -> count` table
    ///
    /// Odd categories fold into `WithTerminal`, even ones into
    /// `WithoutTerminal`, so several physical collector kinds sharing a
    /// capability are summed. Fractional counts are rounded.
    pub fn from_external<I>(entries: I, blocks: usize) -> SimulationResult<Self>
    where
        I: IntoIterator<Item = ((u32, usize), f64)>,
    {
        let mut rows = [vec![0u32; blocks], vec![0u32; blocks]];
        for ((category, block), count) in entries {
            if category == 0 {
                return Err(SimulationError::UnknownCategory {
                    table: "staff schedule",
                    category,
                });
            }
            let slot = external_block("staff schedule", block, blocks)?;
            let count = rounded_count("staff schedule", category, block, count)?;
            let collector = if (category - 1) % 2 == 0 {
                CollectorType::WithTerminal
            } else {
                CollectorType::WithoutTerminal
            };
            rows[collector.index()][slot] += count;
        }
        Ok(Self { rows })
    }

    /// Number of blocks covered
    pub fn blocks(&self) -> usize {
        self.rows[0].len()
    }

    /// Required on-shift count for a type in a block (zero past the end)
    pub fn required(&self, collector: CollectorType, block: TimeBlock) -> u32 {
        self.rows[collector.index()].get(block.index()).copied().unwrap_or(0)
    }

    /// Combined on-shift count of both types in a block
    pub fn total_on_shift(&self, block: TimeBlock) -> u32 {
        CollectorType::ALL.iter().map(|&c| self.required(c, block)).sum()
    }

    /// Largest count of a type required at any point of the day
    pub fn peak(&self, collector: CollectorType) -> u32 {
        self.rows[collector.index()].iter().copied().max().unwrap_or(0)
    }
}

/// Expected transaction counts per kind and block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandTable {
    rows: [Vec<u32>; 2],
}

impl DemandTable {
    pub fn new(buy: Vec<u32>, reload: Vec<u32>) -> SimulationResult<Self> {
        if buy.len() != reload.len() {
            return Err(SimulationError::ScheduleLength {
                table: "demand table",
                actual: reload.len(),
                expected: buy.len(),
            });
        }
        Ok(Self { rows: [buy, reload] })
    }

    /// Translate the optimizer's 1-indexed `(kind, block) -> count` table
    ///
    /// Kind 1 is ticket purchase, kind 2 card reload.
    pub fn from_external<I>(entries: I, blocks: usize) -> SimulationResult<Self>
    where
        I: IntoIterator<Item = ((u32, usize), f64)>,
    {
        let mut rows = [vec![0u32; blocks], vec![0u32; blocks]];
        for ((kind, block), count) in entries {
            let kind_type = match kind {
                1 => TransactionType::Buy,
                2 => TransactionType::Reload,
                other => {
                    return Err(SimulationError::UnknownCategory {
                        table: "demand table",
                        category: other,
                    })
                }
            };
            let slot = external_block("demand table", block, blocks)?;
            rows[kind_type.index()][slot] = rounded_count("demand table", kind, block, count)?;
        }
        Ok(Self { rows })
    }

    pub fn blocks(&self) -> usize {
        self.rows[0].len()
    }

    /// Expected count for a kind in a block (zero past the end)
    pub fn demand(&self, kind: TransactionType, block: TimeBlock) -> u32 {
        self.rows[kind.index()].get(block.index()).copied().unwrap_or(0)
    }
}

/// Revised minimum staff counts keyed by 1-indexed block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackVector {
    entries: BTreeMap<usize, u32>,
}

impl FeedbackVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, block_key: usize) -> Option<u32> {
        self.entries.get(&block_key).copied()
    }

    pub fn set(&mut self, block_key: usize, minimum: u32) {
        self.entries.insert(block_key, minimum);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.entries.iter().map(|(&k, &v)| (k, v))
    }
}

impl FromIterator<(usize, u32)> for FeedbackVector {
    fn from_iter<T: IntoIterator<Item = (usize, u32)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

fn external_block(table: &'static str, block: usize, blocks: usize) -> SimulationResult<usize> {
    if block == 0 || block > blocks {
        return Err(SimulationError::BlockOutOfRange { table, block, blocks });
    }
    Ok(block - 1)
}

fn rounded_count(
    table: &'static str,
    category: u32,
    block: usize,
    count: f64,
) -> SimulationResult<u32> {
    let rounded = count.round() as i64;
    if rounded < 0 {
        return Err(SimulationError::NegativeCount {
            table,
            category,
            block,
            count: rounded,
        });
    }
    Ok(rounded as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_schedule_folds_categories_by_parity() {
        let entries = vec![
            ((1, 1), 2.0),
            ((3, 1), 1.0),
            ((2, 1), 1.4),
            ((4, 2), 2.6),
        ];
        let schedule = StaffSchedule::from_external(entries, 3).unwrap();
        assert_eq!(schedule.required(CollectorType::WithTerminal, TimeBlock(0)), 3);
        assert_eq!(schedule.required(CollectorType::WithoutTerminal, TimeBlock(0)), 1);
        assert_eq!(schedule.required(CollectorType::WithoutTerminal, TimeBlock(1)), 3);
        assert_eq!(schedule.total_on_shift(TimeBlock(2)), 0);
        assert_eq!(schedule.peak(CollectorType::WithoutTerminal), 3);
    }

    #[test]
    fn test_external_block_out_of_range() {
        let err = StaffSchedule::from_external(vec![((1, 69), 1.0)], 68).unwrap_err();
        assert!(matches!(err, SimulationError::BlockOutOfRange { block: 69, .. }));

        let err = DemandTable::from_external(vec![((1, 0), 1.0)], 68).unwrap_err();
        assert!(matches!(err, SimulationError::BlockOutOfRange { block: 0, .. }));
    }

    #[test]
    fn test_external_demand_kinds() {
        let demand = DemandTable::from_external(vec![((1, 2), 30.2), ((2, 2), 11.5)], 2).unwrap();
        assert_eq!(demand.demand(TransactionType::Buy, TimeBlock(1)), 30);
        assert_eq!(demand.demand(TransactionType::Reload, TimeBlock(1)), 12);
        assert_eq!(demand.demand(TransactionType::Buy, TimeBlock(0)), 0);

        let err = DemandTable::from_external(vec![((3, 1), 1.0)], 2).unwrap_err();
        assert!(matches!(err, SimulationError::UnknownCategory { category: 3, .. }));
    }

    #[test]
    fn test_negative_counts_rejected() {
        let err = StaffSchedule::from_external(vec![((1, 1), -2.0)], 4).unwrap_err();
        assert!(matches!(err, SimulationError::NegativeCount { count: -2, .. }));
    }

    #[test]
    fn test_mismatched_rows_rejected() {
        assert!(StaffSchedule::new(vec![1, 1], vec![1]).is_err());
        assert!(DemandTable::new(vec![1], vec![]).is_err());
    }

    #[test]
    fn test_feedback_vector_is_one_indexed_map() {
        let mut feedback: FeedbackVector = vec![(1, 4)].into_iter().collect();
        feedback.set(3, 2);
        assert_eq!(feedback.get(1), Some(4));
        assert_eq!(feedback.get(2), None);
        assert_eq!(feedback.iter().collect::<Vec<_>>(), vec![(1, 4), (3, 2)]);
    }
}
