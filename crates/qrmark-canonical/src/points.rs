use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;

/// A non-negative number of points granted by one redemption.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Points(u64);

impl Points {
    /// Zero points.
    pub const ZERO: Points = Points(0);

    /// Wraps a raw point value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw point value.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Adds two point values, clamping at `u64::MAX`.
    pub fn saturating_add(self, other: Points) -> Points {
        Points(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Sum for Points {
    fn sum<I: Iterator<Item = Points>>(iter: I) -> Self {
        iter.fold(Points::ZERO, Points::saturating_add)
    }
}
