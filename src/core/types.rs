use serde::{Deserialize, Serialize};
use std::fmt;

/// Fare collector capability class
///
/// Collectors with a terminal can serve both transaction kinds, collectors
/// without one only sell tickets. Static and mobile collectors are folded
/// into these two classes because only queue lengths matter here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CollectorType {
    WithTerminal,
    WithoutTerminal,
}

impl CollectorType {
    pub const ALL: [CollectorType; 2] =
        [CollectorType::WithTerminal, CollectorType::WithoutTerminal];

    /// Dense index used for per-type tables
    pub fn index(self) -> usize {
        match self {
            CollectorType::WithTerminal => 0,
            CollectorType::WithoutTerminal => 1,
        }
    }

    /// Whether a collector of this type can serve the given transaction
    pub fn can_serve(self, kind: TransactionType) -> bool {
        match (self, kind) {
            (CollectorType::WithTerminal, _) => true,
            (CollectorType::WithoutTerminal, TransactionType::Buy) => true,
            (CollectorType::WithoutTerminal, TransactionType::Reload) => false,
        }
    }
}

impl fmt::Display for CollectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectorType::WithTerminal => write!(f, "with-terminal"),
            CollectorType::WithoutTerminal => write!(f, "without-terminal"),
        }
    }
}

/// Kind of transaction a customer comes to the station for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TransactionType {
    Buy,
    Reload,
}

impl TransactionType {
    pub const ALL: [TransactionType; 2] = [TransactionType::Buy, TransactionType::Reload];

    pub fn index(self) -> usize {
        match self {
            TransactionType::Buy => 0,
            TransactionType::Reload => 1,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Buy => write!(f, "buy"),
            TransactionType::Reload => write!(f, "reload"),
        }
    }
}

/// Zero-based index of a fixed-length block of the operating day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeBlock(pub usize);

impl TimeBlock {
    /// The block containing `time`, clamped to the last block of the day
    pub fn containing(time: f64, block_length: f64, blocks: usize) -> Self {
        let index = (time.max(0.0) / block_length).floor() as usize;
        TimeBlock(index.min(blocks.saturating_sub(1)))
    }

    /// Get the raw zero-based index
    pub fn index(&self) -> usize {
        self.0
    }

    /// The 1-indexed key used by external tables
    pub fn external_key(&self) -> usize {
        self.0 + 1
    }

    /// Start of this block in seconds
    pub fn start(&self, block_length: f64) -> f64 {
        self.0 as f64 * block_length
    }
}

impl fmt::Display for TimeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a booth: its position in the station's booth list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoothId(pub usize);

impl fmt::Display for BoothId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
