//! Input shape checks shared by the registration, scheduling, and lookup forms.
//!
//! These are boundary checks only. A valid email or phone number is not proof that a
//! message can be delivered to it.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Permissive `local@domain.tld` shape check.
///
/// Passes when the value contains the shape anywhere: a non-whitespace character before
/// an `@`, then a whitespace-free run holding a `.` with at least one character on either
/// side. Surrounding text is not inspected.
pub fn is_valid_email(value: &str) -> bool {
    value.char_indices().any(|(at, ch)| {
        if ch != '@' {
            return false;
        }
        let has_local = value[..at]
            .chars()
            .next_back()
            .is_some_and(|prev| !prev.is_whitespace());
        if !has_local {
            return false;
        }

        let rest = &value[at + 1..];
        let domain = &rest[..rest.find(char::is_whitespace).unwrap_or(rest.len())];
        domain
            .char_indices()
            .any(|(dot, ch)| ch == '.' && dot > 0 && dot + 1 < domain.len())
    })
}

/// Digits, spaces, `+`, `-`, `(` and `)` only, with at least one digit.
pub fn is_valid_phone(value: &str) -> bool {
    let mut has_digit = false;
    for ch in value.chars() {
        match ch {
            '0'..='9' => has_digit = true,
            ' ' | '+' | '-' | '(' | ')' => {}
            _ => return false,
        }
    }
    has_digit
}

/// Field-keyed validation messages collected across a whole form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`. The first message recorded for a field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// `Ok(value)` when nothing was recorded, otherwise the collected errors.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed")?;
        for (index, (field, message)) in self.fields.iter().enumerate() {
            let separator = if index == 0 { ": " } else { "; " };
            write!(f, "{separator}{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Trimmed copy of `value`, or a "required" message recorded against `field`.
pub(crate) fn required(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    message: &str,
) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, message);
    }
    trimmed.to_string()
}
