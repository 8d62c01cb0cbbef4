//! Trip labels.

/// Describes the physical train serving a stop visit.
///
/// Feeds send the label whole; a later label replaces an earlier one
/// entirely rather than field by field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TripLabel {
    /// Category shown to passengers, e.g. `ICE`, `RB`, `S`.
    pub category: String,
    /// Train number within the category.
    pub number: String,
    /// Trip type code (`p` for passenger trips).
    pub trip_type: Option<String>,
    /// Filter flags (`F` long distance, `D` regional, `S` urban, ...).
    pub filter_flags: Option<String>,
    /// Operator code.
    pub operator: Option<String>,
}

impl TripLabel {
    /// Create a label with only category and number known.
    pub fn new(category: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            number: number.into(),
            ..Self::default()
        }
    }

    /// Passenger-facing train name, with the line when one is known.
    ///
    /// # Examples
    ///
    /// ```
    /// use timetable_monitor::domain::TripLabel;
    ///
    /// let label = TripLabel::new("S", "85123");
    /// assert_eq!(label.train_name(Some("S3")), "S S3 (85123)");
    /// assert_eq!(label.train_name(None), "S 85123");
    /// ```
    pub fn train_name(&self, line: Option<&str>) -> String {
        match line {
            Some(line) => format!("{} {} ({})", self.category, line, self.number),
            None => format!("{} {}", self.category, self.number),
        }
    }
}
