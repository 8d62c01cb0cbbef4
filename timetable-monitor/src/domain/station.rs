//! Station code types.

use std::fmt;

use serde::{Serialize, Serializer};

/// Error returned when parsing an invalid EVA number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid EVA number: {reason}")]
pub struct InvalidEvaId {
    reason: &'static str,
}

/// A station's EVA number, the numeric id the timetable service keys
/// stations by.
///
/// # Examples
///
/// ```
/// use timetable_monitor::domain::EvaId;
///
/// let karlsruhe = EvaId::parse("8000191").unwrap();
/// assert_eq!(karlsruhe.get(), 8000191);
/// assert_eq!(karlsruhe.to_string(), "8000191");
///
/// assert!(EvaId::parse("KA").is_err());
/// assert!(EvaId::parse("0").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EvaId(u32);

impl EvaId {
    /// Longest EVA number accepted, in digits.
    const MAX_DIGITS: usize = 9;

    /// Parse an EVA number from its decimal form.
    pub fn parse(s: &str) -> Result<Self, InvalidEvaId> {
        if s.is_empty() || s.len() > Self::MAX_DIGITS {
            return Err(InvalidEvaId {
                reason: "must be 1 to 9 digits",
            });
        }

        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidEvaId {
                reason: "must contain only digits",
            });
        }

        match s.parse::<u32>() {
            Ok(0) | Err(_) => Err(InvalidEvaId {
                reason: "must be non-zero",
            }),
            Ok(n) => Ok(EvaId(n)),
        }
    }

    /// Create from a numeric id, rejecting zero.
    pub fn new(n: u32) -> Result<Self, InvalidEvaId> {
        if n == 0 {
            return Err(InvalidEvaId {
                reason: "must be non-zero",
            });
        }
        Ok(EvaId(n))
    }

    /// Returns the numeric id.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for EvaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EvaId({})", self.0)
    }
}

impl fmt::Display for EvaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for EvaId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any non-zero id survives display then parse
        #[test]
        fn nonzero_roundtrip(n in 1u32..1_000_000_000) {
            let eva = EvaId::new(n).unwrap();
            prop_assert_eq!(EvaId::parse(&eva.to_string()), Ok(eva));
        }

        /// Strings with letters are always rejected
        #[test]
        fn letters_rejected(s in "[0-9]{0,3}[A-Za-z][0-9]{0,3}") {
            prop_assert!(EvaId::parse(&s).is_err());
        }
    }
}
