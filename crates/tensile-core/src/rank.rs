use std::fmt;

use crate::{Result, TensorError};

/// Number of axes of a native array. Only ranks 1 through 4 exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rank {
    One,
    Two,
    Three,
    Four,
}

impl Rank {
    pub const ALL: [Rank; 4] = [Rank::One, Rank::Two, Rank::Three, Rank::Four];

    /// Validate a raw axis count.
    pub fn new(rank: usize) -> Result<Self> {
        match rank {
            1 => Ok(Rank::One),
            2 => Ok(Rank::Two),
            3 => Ok(Rank::Three),
            4 => Ok(Rank::Four),
            _ => Err(TensorError::UnsupportedRank { rank }),
        }
    }

    pub fn get(&self) -> usize {
        match self {
            Rank::One => 1,
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
        }
    }

    /// Fixed name used in kernel identifiers.
    pub fn name(&self) -> &'static str {
        match self {
            Rank::One => "vector",
            Rank::Two => "matrix",
            Rank::Three => "tensor3",
            Rank::Four => "tensor4",
        }
    }
}

impl TryFrom<usize> for Rank {
    type Error = TensorError;

    fn try_from(rank: usize) -> Result<Self> {
        Rank::new(rank)
    }
}

impl From<Rank> for usize {
    fn from(rank: Rank) -> usize {
        rank.get()
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}
