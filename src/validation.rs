//! Request body validation
//!
//! Request DTOs deserialize every field as optional and are turned into
//! typed inputs by a `validate` method. Problems are collected per field so a
//! single 400 response lists all of them, keyed by the JSON field name.

use std::collections::BTreeMap;
use std::fmt::Display;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(transparent)]
#[error("{} invalid field(s): {}", .fields.len(), .fields.keys().cloned().collect::<Vec<_>>().join(", "))]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Messages recorded for one field, if any.
    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    /// Finish a validation pass. `value` is the assembled input, present only
    /// when every required field was; it is returned when nothing was recorded.
    pub fn finish<T>(self, value: Option<T>) -> Result<T, Self> {
        match value {
            Some(value) if self.is_empty() => Ok(value),
            _ => Err(self),
        }
    }

    /// A required, non-blank string no longer than `max_len` characters.
    pub fn required_text(
        &mut self,
        field: &str,
        value: Option<String>,
        max_len: usize,
    ) -> Option<String> {
        match value.map(|v| v.trim().to_string()) {
            Some(v) if !v.is_empty() => self.max_len(field, v, max_len),
            _ => {
                self.add(field, format!("The {} field is required.", field));
                None
            }
        }
    }

    /// An optional string; blank input is stored as absent.
    pub fn optional_text(
        &mut self,
        field: &str,
        value: Option<String>,
        max_len: Option<usize>,
    ) -> Option<String> {
        let value = value.filter(|v| !v.trim().is_empty())?;
        match max_len {
            Some(max) => self.max_len(field, value, max),
            None => Some(value),
        }
    }

    pub fn required<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.add(field, format!("The {} field is required.", field));
        }
        value
    }

    /// Inclusive range check on a value that has already been found present.
    pub fn in_range<T>(&mut self, field: &str, value: T, min: T, max: T) -> Option<T>
    where
        T: PartialOrd + Display + Copy,
    {
        if value < min || value > max {
            self.add(
                field,
                format!("The field {} must be between {} and {}.", field, min, max),
            );
            None
        } else {
            Some(value)
        }
    }

    fn max_len(&mut self, field: &str, value: String, max_len: usize) -> Option<String> {
        if value.chars().count() > max_len {
            self.add(
                field,
                format!(
                    "The field {} must be a string with a maximum length of {}.",
                    field, max_len
                ),
            );
            None
        } else {
            Some(value)
        }
    }
}
