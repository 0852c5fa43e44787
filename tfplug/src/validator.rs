use crate::types::{AttributePath, Diagnostic, Dynamic};

pub trait Validator: Send + Sync {
    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>);
}

/// Accepts a string only if it is one of a fixed set of values
pub struct StringOneOf {
    pub values: Vec<String>,
}

impl StringOneOf {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

impl Validator for StringOneOf {
    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if let Some(s) = value.as_string() {
            if !self.contains(s) {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} is an invalid value for argument {}", s, path),
                        format!("Expected one of {:?}", self.values),
                    )
                    .with_attribute(path.clone()),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_one_of_accepts_listed_values() {
        let validator = StringOneOf::new(["foo", "bar", "baz"]);
        let path = AttributePath::new("test_arg");

        for value in ["foo", "bar", "baz"] {
            let mut diags = Vec::new();
            validator.validate(&Dynamic::String(value.to_string()), &path, &mut diags);
            assert!(diags.is_empty(), "{} should be accepted", value);
        }
    }

    #[test]
    fn string_one_of_rejects_other_values() {
        let validator = StringOneOf::new(["foo", "bar", "baz"]);
        let mut diags = Vec::new();
        validator.validate(
            &Dynamic::String("none".to_string()),
            &AttributePath::new("test_arg"),
            &mut diags,
        );

        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].summary,
            "none is an invalid value for argument test_arg"
        );
    }

    #[test]
    fn empty_string_can_be_a_listed_value() {
        let validator = StringOneOf::new(["admins", "owners", ""]);
        assert!(validator.contains(""));
        assert!(!validator.contains("members"));
    }
}
