pub use anyhow::{
    anyhow,
    bail,
    ensure,
};
pub use thiserror::Error;

pub type ValidationResult<T> = Result<T, ValidationError>;

// Every way a fixture can be wrong is a caller-input error, so there's exactly one error kind; it
// records the dotted path of the offending field (e.g. `spec.containers[0].ports[1].containerPort`)
// and a human-readable statement of the rule that was broken.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{field}: {rule}")]
pub struct ValidationError {
    pub field: String,
    pub rule: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, rule: impl Into<String>) -> ValidationError {
        ValidationError { field: field.into(), rule: rule.into() }
    }

    // Prefix the field path with the path of the enclosing object, so that errors from nested
    // validators come out fully qualified
    pub fn within(self, parent: &str) -> ValidationError {
        let field = if self.field.is_empty() {
            parent.into()
        } else if self.field.starts_with('[') {
            format!("{parent}{}", self.field)
        } else {
            format!("{parent}.{}", self.field)
        };
        ValidationError { field, rule: self.rule }
    }

    pub fn mentions(&self, field: &str) -> bool {
        self.field.contains(field) || self.rule.contains(field)
    }
}

pub(crate) trait ValidationContext<T> {
    fn within(self, parent: &str) -> ValidationResult<T>;
}

impl<T> ValidationContext<T> for ValidationResult<T> {
    fn within(self, parent: &str) -> ValidationResult<T> {
        self.map_err(|err| err.within(parent))
    }
}

// Return a ValidationError from the enclosing function unless the condition holds; this is the
// validation-flavoured equivalent of anyhow's `ensure!`.
#[macro_export]
macro_rules! check {
    ($cond:expr, $field:expr, $($rule:tt)+) => {
        if !($cond) {
            return Err($crate::errors::ValidationError::new($field, format!($($rule)+)));
        }
    };
}

pub use crate::check;

#[cfg(test)]
mod test {
    use rstest::*;

    use super::*;

    #[rstest]
    #[case::leaf("name", "metadata", "metadata.name")]
    #[case::index("[2]", "spec.containers", "spec.containers[2]")]
    #[case::empty("", "spec", "spec")]
    fn test_within(#[case] field: &str, #[case] parent: &str, #[case] expected: &str) {
        let err = ValidationError::new(field, "bad").within(parent);
        assert_eq!(err.field, expected);
        assert_eq!(err.rule, "bad");
    }

    #[rstest]
    fn test_display() {
        let err = ValidationError::new("containerCount", "containerCount=0 incompatible with phase=Running");
        assert_eq!(format!("{err}"), "containerCount: containerCount=0 incompatible with phase=Running");
    }

    #[rstest]
    fn test_check_macro() {
        fn positive(n: i32) -> ValidationResult<i32> {
            check!(n > 0, "n", "must be positive, got {n}");
            Ok(n)
        }

        assert_eq!(positive(3), Ok(3));
        assert_eq!(positive(-1), Err(ValidationError::new("n", "must be positive, got -1")));
    }
}
