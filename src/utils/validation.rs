use std::collections::BTreeMap;

use serde::Serialize;

pub const BLANK: &str = "can't be blank";

/// Field-level validation messages, collected before failing so that every
/// broken field is reported in one response.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(value)` when nothing was recorded.
    pub fn finish<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }

    /// Folds these errors into another validation outcome.
    pub fn combine<T>(self, result: Result<T, Self>) -> Result<T, Self> {
        match result {
            Ok(value) => self.finish(value),
            Err(mut other) => {
                for (field, messages) in self.0 {
                    other.0.entry(field).or_default().extend(messages);
                }
                Err(other)
            }
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .flat_map(|(field, messages)| messages.iter().map(move |m| format!("{field} {m}")))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Returns the trimmed value, or records a blank error for `field`.
pub fn require_present(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<String>,
) -> Option<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            errors.add(field, BLANK);
            None
        }
    }
}

pub fn require<T>(errors: &mut ValidationErrors, field: &str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        errors.add(field, BLANK);
    }
    value
}

/// Width of the text columns.
pub const TEXT_MAX_LEN: usize = 255;

/// Records a length error when `value` exceeds `max` characters.
pub fn check_length(errors: &mut ValidationErrors, field: &str, value: Option<&str>, max: usize) {
    if value.is_some_and(|v| v.chars().count() > max) {
        errors.add(field, format!("is too long (maximum is {max} characters)"));
    }
}
