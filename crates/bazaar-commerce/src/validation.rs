//! Per-field form validation errors.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Validation messages keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for one field.
    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Check a required text field, trimming it and enforcing a maximum length.
    pub fn required_text(&mut self, field: &str, value: &str, max_len: usize) -> String {
        let value = value.trim();
        if value.is_empty() {
            self.add(field, "This field is required.");
        } else if value.chars().count() > max_len {
            self.add(field, format!("Field cannot be longer than {max_len} characters."));
        }
        value.to_string()
    }

    /// Check an optional text field against a maximum length.
    pub fn optional_text(&mut self, field: &str, value: &str, max_len: usize) -> String {
        let value = value.trim();
        if value.chars().count() > max_len {
            self.add(field, format!("Field cannot be longer than {max_len} characters."));
        }
        value.to_string()
    }

    /// Parse an integer field.
    pub fn integer(&mut self, field: &str, value: &str) -> Option<i64> {
        match value.trim().parse::<i64>() {
            Ok(n) => Some(n),
            Err(_) => {
                self.add(field, "Not a valid integer value.");
                None
            }
        }
    }

    /// Turn the collected messages into a result.
    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}
