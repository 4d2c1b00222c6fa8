use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Period-over-period change
// ---------------------------------------------------------------------------

/// Percentage change of a metric against a comparable earlier period.
///
/// The variants keep "a real number", "an estimate" and "nothing to compare
/// against" apart, so a missing baseline is never rendered as `0 %`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Growth {
    /// Change measured between two real periods.
    Actual { percent: Decimal },
    /// Linear estimate (YoY derived from MoM × 12).
    Extrapolated { percent: Decimal },
    /// The comparison period exists in the calendar but its value is zero.
    NoPriorData,
    /// Fewer periods than the comparison needs.
    InsufficientHistory,
    /// The change, or one of its inputs, does not fit in a `Decimal`.
    OutOfRange,
}

impl Growth {
    /// Numeric value for both measured and extrapolated growth.
    pub fn percent(&self) -> Option<Decimal> {
        match self {
            Growth::Actual { percent } | Growth::Extrapolated { percent } => Some(*percent),
            Growth::NoPriorData | Growth::InsufficientHistory | Growth::OutOfRange => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        self.percent().is_some()
    }

    pub fn is_extrapolated(&self) -> bool {
        matches!(self, Growth::Extrapolated { .. })
    }
}
