//! Quantity stepper arithmetic.

use crate::format::parse_int_prefix;

/// Lowest quantity the decrement button will reach.
pub const MIN_QUANTITY: i64 = 1;

/// Upper bound used when the field carries no usable `max` attribute.
pub const DEFAULT_MAX_QUANTITY: i64 = 999;

/// Direction of a stepper press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Decrement,
    Increment,
}

/// Bounds for one quantity field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityStepper {
    pub min: i64,
    pub max: i64,
}

impl Default for QuantityStepper {
    fn default() -> Self {
        Self {
            min: MIN_QUANTITY,
            max: DEFAULT_MAX_QUANTITY,
        }
    }
}

impl QuantityStepper {
    /// Build from a field's `max` attribute, falling back to `default_max`
    /// when it is missing, non-numeric or zero.
    pub fn from_max_attr(max_attr: Option<&str>, default_max: i64) -> Self {
        let max = max_attr
            .and_then(parse_int_prefix)
            .filter(|m| *m != 0)
            .unwrap_or(default_max);
        Self {
            min: MIN_QUANTITY,
            max,
        }
    }

    /// Next value for the field, or `None` if the press changes nothing.
    ///
    /// An unreadable current value counts as the minimum when decrementing
    /// and as zero when incrementing, so `+` on an empty field yields 1.
    pub fn apply(&self, current: &str, step: Step) -> Option<i64> {
        match step {
            Step::Decrement => {
                let value = parse_int_prefix(current)
                    .filter(|v| *v != 0)
                    .unwrap_or(self.min);
                (value > self.min).then(|| value - 1)
            }
            Step::Increment => {
                let value = parse_int_prefix(current).unwrap_or(0);
                (value < self.max).then(|| value + 1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decrement_stops_at_min() {
        let stepper = QuantityStepper::default();
        assert_eq!(stepper.apply("3", Step::Decrement), Some(2));
        assert_eq!(stepper.apply("2", Step::Decrement), Some(1));
        assert_eq!(stepper.apply("1", Step::Decrement), None);
        assert_eq!(stepper.apply("", Step::Decrement), None);
    }

    #[test]
    fn test_increment_stops_at_max() {
        let stepper = QuantityStepper::from_max_attr(Some("5"), DEFAULT_MAX_QUANTITY);
        assert_eq!(stepper.apply("4", Step::Increment), Some(5));
        assert_eq!(stepper.apply("5", Step::Increment), None);
    }

    #[test]
    fn test_increment_from_empty() {
        let stepper = QuantityStepper::default();
        assert_eq!(stepper.apply("", Step::Increment), Some(1));
        assert_eq!(stepper.apply("abc", Step::Increment), Some(1));
    }

    #[test]
    fn test_max_attr_fallback() {
        assert_eq!(QuantityStepper::from_max_attr(None, 999).max, 999);
        assert_eq!(QuantityStepper::from_max_attr(Some(""), 999).max, 999);
        assert_eq!(QuantityStepper::from_max_attr(Some("0"), 999).max, 999);
        assert_eq!(QuantityStepper::from_max_attr(Some("12"), 999).max, 12);
    }

    #[test]
    fn test_increment_at_default_max() {
        let stepper = QuantityStepper::default();
        assert_eq!(stepper.apply("998", Step::Increment), Some(999));
        assert_eq!(stepper.apply("999", Step::Increment), None);
    }
}
