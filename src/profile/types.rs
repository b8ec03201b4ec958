//! Health profile payload and its positional ledger encoding.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Number of positional fields in the ledger encoding.
///
/// Order: name, age, gender, chronicCondition, preferredWalkTime,
/// pollutionSensitivity, location. The ledger module depends on it.
pub const PROFILE_FIELD_COUNT: usize = 7;

/// One user's health profile.
///
/// `preferred_walk_time` and `pollution_sensitivity` are optional; an
/// empty string means "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthProfile {
    pub name: String,
    pub age: u64,
    pub gender: String,
    pub chronic_condition: Vec<String>,
    #[serde(default)]
    pub preferred_walk_time: String,
    #[serde(default)]
    pub pollution_sensitivity: String,
    pub location: String,
}

/// A required form field that was left empty or out of range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl HealthProfile {
    /// Check the fields a submission requires.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError { field: "name", message: "is required" });
        }
        if self.age == 0 {
            errors.push(FieldError { field: "age", message: "must be greater than 0" });
        }
        if self.gender.trim().is_empty() {
            errors.push(FieldError { field: "gender", message: "is required" });
        }
        if self.chronic_condition.is_empty() {
            errors.push(FieldError {
                field: "chronicCondition",
                message: "select at least one condition",
            });
        }
        if self.location.trim().is_empty() {
            errors.push(FieldError { field: "location", message: "is required" });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Percentage of the seven fields that are filled in.
    pub fn completion_percent(&self) -> f64 {
        let filled = [
            !self.name.is_empty(),
            self.age > 0,
            !self.gender.is_empty(),
            !self.chronic_condition.is_empty(),
            !self.preferred_walk_time.is_empty(),
            !self.pollution_sensitivity.is_empty(),
            !self.location.is_empty(),
        ]
        .iter()
        .filter(|f| **f)
        .count();

        filled as f64 * 100.0 / PROFILE_FIELD_COUNT as f64
    }

    /// Positional arguments for the write call. `u64` travels as a decimal string.
    pub fn to_arguments(&self) -> Vec<Value> {
        vec![
            Value::from(self.name.as_str()),
            Value::from(self.age.to_string()),
            Value::from(self.gender.as_str()),
            Value::from(self.chronic_condition.clone()),
            Value::from(self.preferred_walk_time.as_str()),
            Value::from(self.pollution_sensitivity.as_str()),
            Value::from(self.location.as_str()),
        ]
    }

    /// Rebuild a profile from a view response, coercing each element.
    ///
    /// Fails only when fewer than seven elements are present.
    pub fn from_view(values: &[Value]) -> Result<Self, String> {
        if values.len() < PROFILE_FIELD_COUNT {
            return Err(format!(
                "expected at least {} elements, got {}",
                PROFILE_FIELD_COUNT,
                values.len()
            ));
        }

        Ok(Self {
            name: coerce_string(&values[0]),
            age: coerce_age(&values[1]),
            gender: coerce_string(&values[2]),
            chronic_condition: coerce_list(&values[3]),
            preferred_walk_time: coerce_string(&values[4]),
            pollution_sensitivity: coerce_string(&values[5]),
            location: coerce_string(&values[6]),
        })
    }
}

/// Falsy values (`null`, `false`, `0`, `""`) become the empty string.
fn coerce_string(value: &Value) -> String {
    match value {
        Value::Null | Value::Bool(false) => String::new(),
        Value::Bool(true) => "true".to_string(),
        Value::Number(n) if n.as_f64() == Some(0.0) => String::new(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(coerce_string).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Numbers and numeric strings become the age; anything else is 0.
fn coerce_age(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or_else(|| float_to_age(n.as_f64())),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .unwrap_or_else(|_| float_to_age(s.parse::<f64>().ok()))
        }
        Value::Bool(true) => 1,
        _ => 0,
    }
}

fn float_to_age(value: Option<f64>) -> u64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v.trunc() as u64,
        _ => 0,
    }
}

/// Only a sequence yields conditions; each element is stringified.
fn coerce_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}
