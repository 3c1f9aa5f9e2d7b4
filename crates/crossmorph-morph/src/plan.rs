//! Filter kinds and pass plans
//!
//! A [`PassPlan`] is an ordered list of `(FilterKind, count)` steps. The
//! engine runs every pass of a step before starting the next step.
//!
//! # Sequence string format
//!
//! Steps are separated by `+` and whitespace is ignored. Each step begins
//! with a case-insensitive character, optionally followed by a repeat
//! count (default 1):
//!
//! - `e<n>` - Erode `n` times
//! - `d<n>` - Dilate `n` times
//!
//! # Examples
//!
//! ```
//! use crossmorph_morph::{FilterKind, PassPlan};
//!
//! let plan = PassPlan::parse("e2 + d").unwrap();
//! assert_eq!(plan.steps().len(), 2);
//! assert_eq!(plan.steps()[0].kind, FilterKind::Erode);
//! assert_eq!(plan.total_passes(), 3);
//! ```

use crate::neighborhood::CROSS_LEN;
use crate::{MorphError, MorphResult};
use std::fmt;
use std::str::FromStr;

/// Reducer applied to each neighborhood
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// Maximum of the neighborhood; grows bright regions
    Dilate,
    /// Minimum of the neighborhood; shrinks bright regions
    Erode,
}

impl FilterKind {
    /// Reduce a neighborhood sample to a single output value.
    #[inline]
    pub fn reduce(self, samples: &[u8; CROSS_LEN]) -> u8 {
        let first = samples[0];
        match self {
            FilterKind::Dilate => samples[1..].iter().fold(first, |m, &v| m.max(v)),
            FilterKind::Erode => samples[1..].iter().fold(first, |m, &v| m.min(v)),
        }
    }

    /// Single-letter code used in sequence strings
    pub fn code(self) -> char {
        match self {
            FilterKind::Dilate => 'd',
            FilterKind::Erode => 'e',
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterKind::Dilate => f.write_str("dilate"),
            FilterKind::Erode => f.write_str("erode"),
        }
    }
}

/// One step of a plan: `count` consecutive passes of `kind`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassStep {
    pub kind: FilterKind,
    pub count: u32,
}

/// Ordered list of filter steps
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassPlan {
    steps: Vec<PassStep>,
}

impl PassPlan {
    /// Create an empty plan (leaves the image unchanged).
    pub fn new() -> Self {
        Self::default()
    }

    /// `n_erode` erosions followed by `n_dilate` dilations.
    ///
    /// Zero counts contribute no step.
    pub fn erode_then_dilate(n_erode: u32, n_dilate: u32) -> Self {
        Self::new()
            .then(FilterKind::Erode, n_erode)
            .then(FilterKind::Dilate, n_dilate)
    }

    /// Append a step. A zero `count` is ignored.
    pub fn then(mut self, kind: FilterKind, count: u32) -> Self {
        if count > 0 {
            self.steps.push(PassStep { kind, count });
        }
        self
    }

    /// Parse a sequence string such as `"e2 + d1"`.
    pub fn parse(sequence: &str) -> MorphResult<Self> {
        if sequence.trim().is_empty() {
            return Err(MorphError::InvalidSequence("empty sequence".to_string()));
        }

        let mut steps = Vec::new();
        for (i, part) in sequence.split('+').enumerate() {
            let op_str: String = part.chars().filter(|c| !c.is_whitespace()).collect();
            if op_str.is_empty() {
                return Err(MorphError::InvalidSequence(format!(
                    "empty operation at position {}",
                    i + 1
                )));
            }
            steps.push(Self::parse_step(&op_str)?);
        }

        Ok(PassPlan { steps })
    }

    fn parse_step(op_str: &str) -> MorphResult<PassStep> {
        let mut chars = op_str.chars();
        let kind = match chars.next().map(|c| c.to_ascii_lowercase()) {
            Some('e') => FilterKind::Erode,
            Some('d') => FilterKind::Dilate,
            Some(c) => {
                return Err(MorphError::InvalidSequence(format!(
                    "unknown operation '{}' in '{}'",
                    c, op_str
                )));
            }
            None => return Err(MorphError::InvalidSequence("empty operation".to_string())),
        };

        let count_str = chars.as_str();
        let count = if count_str.is_empty() {
            1
        } else {
            count_str.parse::<u32>().map_err(|_| {
                MorphError::InvalidSequence(format!(
                    "invalid repeat count '{}' in '{}'",
                    count_str, op_str
                ))
            })?
        };
        if count == 0 {
            return Err(MorphError::InvalidSequence(format!(
                "repeat count must be > 0 in '{}'",
                op_str
            )));
        }

        Ok(PassStep { kind, count })
    }

    pub fn steps(&self) -> &[PassStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Total number of passes across all steps
    pub fn total_passes(&self) -> u64 {
        self.steps.iter().map(|s| u64::from(s.count)).sum()
    }
}

impl FromStr for PassPlan {
    type Err = MorphError;

    fn from_str(s: &str) -> MorphResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PassPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(" + ")?;
            }
            write!(f, "{}{}", step.kind.code(), step.count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce() {
        let s = [5, 9, 1, 7, 3];
        assert_eq!(FilterKind::Dilate.reduce(&s), 9);
        assert_eq!(FilterKind::Erode.reduce(&s), 1);
        assert_eq!(FilterKind::Erode.reduce(&[4; 5]), 4);
    }

    #[test]
    fn test_erode_then_dilate() {
        let plan = PassPlan::erode_then_dilate(2, 3);
        assert_eq!(
            plan.steps(),
            &[
                PassStep {
                    kind: FilterKind::Erode,
                    count: 2
                },
                PassStep {
                    kind: FilterKind::Dilate,
                    count: 3
                },
            ]
        );
        assert_eq!(plan.total_passes(), 5);

        let plan = PassPlan::erode_then_dilate(0, 1);
        assert_eq!(plan.steps().len(), 1);
        assert_eq!(plan.steps()[0].kind, FilterKind::Dilate);

        assert!(PassPlan::erode_then_dilate(0, 0).is_empty());
    }

    #[test]
    fn test_parse() {
        let plan: PassPlan = " E3 +d ".parse().unwrap();
        assert_eq!(plan, PassPlan::erode_then_dilate(3, 1));
        assert_eq!(plan.to_string(), "e3 + d1");

        let plan = PassPlan::parse("d1 + e1 + d2").unwrap();
        assert_eq!(plan.steps().len(), 3);
        assert_eq!(plan.total_passes(), 4);
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["", "   ", "e2 +", "x3", "e0", "d-1", "e1.5", "+d"] {
            assert!(
                matches!(PassPlan::parse(bad), Err(MorphError::InvalidSequence(_))),
                "expected error for {:?}",
                bad
            );
        }
    }
}
