//! Donation records as delivered by the donations API.
//!
//! The API payload is loosely typed: any field can be missing, `null`, or carry a value of an
//! unexpected JSON type.  Decoding a [`DonationRecord`] therefore never fails because of a single
//! malformed field.  Instead every field is coerced to a safe default:
//!
//! | Field            | Accepted                         | Fallback                       |
//! |------------------|----------------------------------|--------------------------------|
//! | `supporter_id`   | JSON number or string            | [`SupporterId::Missing`]       |
//! | `supporter_name` | non-blank string or number       | `None` (placeholder is used)   |
//! | `amount`         | finite, non-negative number/text | `0.0`                          |
//! | `created_at`     | non-empty string                 | `None` (not grouped by day)    |
//!
//! Unknown fields are ignored.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Identifier of the supporter behind a donation.
///
/// Numeric and textual identifiers are kept apart, so `1` and `"1"` refer to different
/// supporters.  Records without an identifier all share the [`SupporterId::Missing`] key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SupporterId {
    /// Identifier sent as a JSON number, stored in its canonical textual form.
    Number(String),
    /// Identifier sent as a JSON string.
    Text(String),
    /// No identifier was present on the record.
    #[default]
    Missing,
}

impl SupporterId {
    /// Convenience constructor for numeric identifiers.
    pub fn number(id: i64) -> Self {
        Self::Number(id.to_string())
    }

    /// Convenience constructor for textual identifiers.
    pub fn text(id: impl Into<String>) -> Self {
        Self::Text(id.into())
    }

    /// Display name used when no supporter name is available.
    pub fn placeholder_name(&self) -> String {
        format!("Supporter {}", self)
    }

    fn from_value(value: Value) -> Self {
        match value {
            Value::Null => Self::Missing,
            Value::Number(number) => Self::Number(number.to_string()),
            Value::String(text) => Self::Text(text),
            other => Self::Text(other.to_string()),
        }
    }
}

impl fmt::Display for SupporterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) | Self::Text(id) => f.write_str(id),
            Self::Missing => f.write_str("unknown"),
        }
    }
}

impl Serialize for SupporterId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(id) => match id.parse::<serde_json::Number>() {
                Ok(number) => number.serialize(serializer),
                Err(_) => serializer.serialize_str(id),
            },
            Self::Text(id) => serializer.serialize_str(id),
            Self::Missing => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for SupporterId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

/// A single donation as returned by the API, with every field already coerced.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct DonationRecord {
    #[serde(default)]
    pub supporter_id: SupporterId,
    #[serde(default, deserialize_with = "lenient_name")]
    pub supporter_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: f64,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<String>,
}

impl DonationRecord {
    /// Creates a record for the given supporter with no name, amount or timestamp.
    pub fn new(supporter_id: SupporterId) -> Self {
        Self {
            supporter_id,
            ..Self::default()
        }
    }

    /// Sets the supporter name and returns the updated record.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.supporter_name = normalize_name(name.into());
        self
    }

    /// Sets the amount, applying the same coercion as decoding, and returns the updated record.
    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = coerce_number(amount);
        self
    }

    /// Sets the creation timestamp and returns the updated record.
    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        let created_at = created_at.into();
        self.created_at = (!created_at.is_empty()).then_some(created_at);
        self
    }

    /// Returns the calendar day the donation belongs to.
    ///
    /// This is the part of `created_at` before the first `T`, or the whole timestamp when it has
    /// no time component.  Records without a timestamp have no day.
    pub fn date_key(&self) -> Option<&str> {
        self.created_at
            .as_deref()
            .map(|timestamp| timestamp.split('T').next().unwrap_or(timestamp))
    }
}

fn coerce_number(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Coerces an arbitrary JSON value into a non-negative donation amount.
pub fn coerce_amount(value: &Value) -> f64 {
    match value {
        Value::Number(number) => number.as_f64().map(coerce_number).unwrap_or(0.0),
        Value::String(text) => text.trim().parse::<f64>().map(coerce_number).unwrap_or(0.0),
        _ => 0.0,
    }
}

fn normalize_name(name: String) -> Option<String> {
    (!name.trim().is_empty()).then_some(name)
}

fn lenient_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Value::deserialize(deserializer).map(|value| coerce_amount(&value))
}

fn lenient_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(name) => normalize_name(name),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(timestamp) if !timestamp.is_empty() => Some(timestamp),
        _ => None,
    })
}
