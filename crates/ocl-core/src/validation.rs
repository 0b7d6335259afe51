//! Field-level validation for submitted dictionary data.
//!
//! [`FieldErrors`] collects messages keyed by field name. Errors that do not
//! belong to a single field go under [`NON_FIELD_ERRORS`]. The map serializes
//! as a plain JSON object of string arrays, which is what API clients see in
//! a 400 response.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Key used for errors that apply to the whole object.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Maximum mnemonic length, in characters.
pub const MNEMONIC_MAX_LEN: usize = 255;

static MNEMONIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\-\._@]+$").expect("valid mnemonic regex"));

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a map holding a single message for `field`.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Appends a message for `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Messages recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Checks that `value` is a well-formed mnemonic, recording problems against
/// `field`.
pub fn validate_mnemonic(field: &str, value: Option<&str>, errors: &mut FieldErrors) {
    let Some(value) = value else {
        errors.add(field, "This field is required.");
        return;
    };
    if value.is_empty() {
        errors.add(field, "This field is required.");
    } else if value.chars().count() > MNEMONIC_MAX_LEN {
        errors.add(
            field,
            format!("Ensure this value has at most {} characters.", MNEMONIC_MAX_LEN),
        );
    } else if !MNEMONIC_RE.is_match(value) {
        errors.add(
            field,
            "Enter a valid value. Only letters, digits and -._@ are allowed.",
        );
    }
}

/// Records a "required" error when `value` is missing or blank.
pub fn require_text(field: &str, value: Option<&str>, errors: &mut FieldErrors) {
    match value {
        Some(v) if !v.trim().is_empty() => {}
        _ => errors.add(field, "This field is required."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn missing_mnemonic_is_required() {
        let mut errors = FieldErrors::new();
        validate_mnemonic("mnemonic", None, &mut errors);
        assert_eq!(errors.get("mnemonic").unwrap(), ["This field is required."]);
    }

    #[test]
    fn mnemonic_rejects_spaces() {
        let mut errors = FieldErrors::new();
        validate_mnemonic("mnemonic", Some("has space"), &mut errors);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn mnemonic_rejects_overlong_values() {
        let mut errors = FieldErrors::new();
        let long = "a".repeat(MNEMONIC_MAX_LEN + 1);
        validate_mnemonic("mnemonic", Some(&long), &mut errors);
        assert!(errors.get("mnemonic").unwrap()[0].contains("at most"));
    }

    #[test]
    fn errors_serialize_as_field_map() {
        let mut errors = FieldErrors::single("name", "This field is required.");
        errors.add(NON_FIELD_ERRORS, "bad");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": ["This field is required."],
                "non_field_errors": ["bad"]
            })
        );
    }

    #[test]
    fn into_result_is_ok_when_empty() {
        assert!(FieldErrors::new().into_result().is_ok());
        assert!(FieldErrors::single("x", "y").into_result().is_err());
    }

    #[test]
    fn display_joins_messages() {
        let mut errors = FieldErrors::single("a", "one");
        errors.add("b", "two");
        assert_eq!(errors.to_string(), "a: one; b: two");
    }

    proptest! {
        #[test]
        fn accepts_mnemonic_alphabet(value in "[a-zA-Z0-9._@-]{1,64}") {
            let mut errors = FieldErrors::new();
            validate_mnemonic("mnemonic", Some(&value), &mut errors);
            prop_assert!(errors.is_empty());
        }

        #[test]
        fn rejects_any_disallowed_character(
            prefix in "[a-z]{0,8}",
            bad in "[ /#?%&+=!]",
            suffix in "[a-z]{0,8}",
        ) {
            let value = format!("{prefix}{bad}{suffix}");
            let mut errors = FieldErrors::new();
            validate_mnemonic("mnemonic", Some(&value), &mut errors);
            prop_assert!(!errors.is_empty());
        }
    }
}
