//! Validation failures as a path of context frames.

use std::collections::BTreeMap;

use serde_json::Value;
use validator::{ValidationErrors, ValidationErrorsKind};

/// One frame on the way from the validated root to the failing value.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextEntry {
    /// Field name or list index; the root frame has an empty key.
    pub key: String,
    /// Value seen at this frame; `None` when it was absent.
    pub actual: Option<Value>,
}

impl ContextEntry {
    pub fn new(key: impl Into<String>, actual: Option<Value>) -> Self {
        Self {
            key: key.into(),
            actual,
        }
    }
}

/// A single failing leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationFailure {
    pub context: Vec<ContextEntry>,
    /// Message produced by the validator, if any.
    pub message: Option<String>,
}

impl ValidationFailure {
    pub fn new(context: Vec<ContextEntry>, message: Option<String>) -> Self {
        Self { context, message }
    }

    /// Failure at a dotted `path` whose leaf held `actual`.
    pub fn at(path: &str, actual: Option<Value>) -> Self {
        let mut context = vec![ContextEntry::new("", None)];
        let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
        let last = segments.len().saturating_sub(1);
        for (i, segment) in segments.iter().enumerate() {
            let actual = if i == last { actual.clone() } else { None };
            context.push(ContextEntry::new(*segment, actual));
        }
        Self {
            context,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn keyed(&self) -> impl Iterator<Item = &ContextEntry> {
        self.context.iter().filter(|c| !c.key.is_empty())
    }

    /// Non-empty frame keys joined with `.`.
    pub fn path(&self) -> String {
        self.keyed()
            .map(|c| c.key.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Whether the failing value was absent, `null` or an empty string.
    ///
    /// Judged on the last keyed frame; a failure with no keyed frame is
    /// not considered empty.
    pub fn is_value_empty(&self) -> bool {
        match self.keyed().last() {
            Some(entry) => match &entry.actual {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.is_empty(),
                Some(_) => false,
            },
            None => false,
        }
    }

    /// Flatten `validator` errors into failures, ordered by path.
    ///
    /// Nested structs and list items become path segments. The `value`
    /// parameter recorded by the validator becomes the leaf's `actual`.
    pub fn from_validator(errors: &ValidationErrors) -> Vec<Self> {
        let mut failures = Vec::new();
        collect(errors, &mut vec![ContextEntry::new("", None)], &mut failures);
        failures.sort_by_key(|f| f.path());
        failures
    }
}

fn collect(
    errors: &ValidationErrors,
    trail: &mut Vec<ContextEntry>,
    out: &mut Vec<ValidationFailure>,
) {
    let fields: BTreeMap<String, &ValidationErrorsKind> = errors
        .errors()
        .iter()
        .map(|(name, kind)| (name.to_string(), kind))
        .collect();

    for (name, kind) in fields {
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let mut context = trail.clone();
                    context.push(ContextEntry::new(
                        name.clone(),
                        error.params.get("value").cloned(),
                    ));
                    out.push(ValidationFailure {
                        context,
                        message: error.message.as_deref().map(str::to_string),
                    });
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                trail.push(ContextEntry::new(name.clone(), None));
                collect(nested, trail, out);
                trail.pop();
            }
            ValidationErrorsKind::List(items) => {
                trail.push(ContextEntry::new(name.clone(), None));
                for (index, nested) in items {
                    trail.push(ContextEntry::new(index.to_string(), None));
                    collect(nested, trail, out);
                    trail.pop();
                }
                trail.pop();
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use validator::Validate;

    #[test]
    fn path_skips_empty_keys() {
        let failure = ValidationFailure::new(
            vec![
                ContextEntry::new("", Some(json!({}))),
                ContextEntry::new("user", None),
                ContextEntry::new("", None),
                ContextEntry::new("name", Some(json!("x"))),
            ],
            None,
        );
        assert_eq!(failure.path(), "user.name");
        assert!(!failure.is_value_empty());
    }

    #[test]
    fn empty_values() {
        assert!(ValidationFailure::at("a", None).is_value_empty());
        assert!(ValidationFailure::at("a", Some(Value::Null)).is_value_empty());
        assert!(ValidationFailure::at("a", Some(json!(""))).is_value_empty());
        assert!(!ValidationFailure::at("a", Some(json!(" "))).is_value_empty());
        assert!(!ValidationFailure::at("a", Some(json!(0))).is_value_empty());
        assert!(!ValidationFailure::at("a", Some(json!([]))).is_value_empty());
    }

    #[test]
    fn no_keyed_frame_is_not_empty() {
        let failure = ValidationFailure::new(vec![ContextEntry::new("", None)], None);
        assert_eq!(failure.path(), "");
        assert!(!failure.is_value_empty());
    }

    #[derive(Debug, Validate)]
    struct Address {
        #[validate(length(min = 1))]
        city: String,
    }

    #[derive(Debug, Validate)]
    struct Signup {
        #[validate(length(min = 2, message = "too short"))]
        name: String,
        #[validate(email)]
        email: String,
        #[validate(nested)]
        address: Address,
    }

    #[test]
    fn flattens_validator_errors() {
        let signup = Signup {
            name: "A".into(),
            email: "not-an-email".into(),
            address: Address { city: "".into() },
        };
        let errors = signup.validate().unwrap_err();
        let failures = ValidationFailure::from_validator(&errors);

        let paths: Vec<String> = failures.iter().map(ValidationFailure::path).collect();
        assert_eq!(paths, vec!["address.city", "email", "name"]);

        assert!(failures[0].is_value_empty());
        assert!(!failures[1].is_value_empty());
        assert_eq!(failures[2].message.as_deref(), Some("too short"));
    }
}
