//! Measurement points and their line protocol encoding.

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

use chrono::{DateTime, Utc};

/// Timestamp resolution of a point, as understood by the write endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum WritePrecision {
    #[default]
    Seconds,
    Milliseconds,
    Microseconds,
    Nanoseconds,
}

impl WritePrecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seconds => "s",
            Self::Milliseconds => "ms",
            Self::Microseconds => "us",
            Self::Nanoseconds => "ns",
        }
    }

    /// Timestamp expressed in this precision, `None` when it overflows i64.
    pub fn encode(&self, timestamp: &DateTime<Utc>) -> Option<i64> {
        match self {
            Self::Seconds => Some(timestamp.timestamp()),
            Self::Milliseconds => Some(timestamp.timestamp_millis()),
            Self::Microseconds => Some(timestamp.timestamp_micros()),
            Self::Nanoseconds => timestamp.timestamp_nanos_opt(),
        }
    }
}

impl fmt::Display for WritePrecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Integer(i64),
    UInteger(u64),
    Boolean(bool),
    String(String),
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::UInteger(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    fn write_line_protocol(&self, out: &mut String) -> bool {
        match self {
            Self::Float(value) if !value.is_finite() => return false,
            Self::Float(value) => {
                let _ = write!(out, "{value}");
            }
            Self::Integer(value) => {
                let _ = write!(out, "{value}i");
            }
            Self::UInteger(value) => {
                let _ = write!(out, "{value}u");
            }
            Self::Boolean(value) => out.push_str(if *value { "true" } else { "false" }),
            Self::String(value) => {
                out.push('"');
                for ch in value.chars() {
                    if matches!(ch, '"' | '\\') {
                        out.push('\\');
                    }
                    out.push(ch);
                }
                out.push('"');
            }
        }
        true
    }
}

/// One measurement to emit.
///
/// Built by chaining consuming setters; once handed to a write it is not
/// touched again.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    measurement: String,
    tags: BTreeMap<String, String>,
    fields: BTreeMap<String, FieldValue>,
    timestamp: Option<DateTime<Utc>>,
    precision: WritePrecision,
}

impl Point {
    pub fn measurement(name: impl Into<String>) -> Self {
        Self {
            measurement: name.into(),
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
            timestamp: None,
            precision: WritePrecision::default(),
        }
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>, precision: WritePrecision) -> Self {
        self.timestamp = Some(timestamp);
        self.precision = precision;
        self
    }

    pub fn name(&self) -> &str {
        &self.measurement
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn field_value(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn time(&self) -> Option<&DateTime<Utc>> {
        self.timestamp.as_ref()
    }

    pub fn precision(&self) -> WritePrecision {
        self.precision
    }

    /// Encode as one line of line protocol.
    ///
    /// Returns `None` for a point without any writable field (the endpoint
    /// rejects those); non-finite floats are dropped.
    pub fn to_line_protocol(&self) -> Option<String> {
        let mut line = String::new();
        escape_into(&mut line, &self.measurement, &[',', ' ']);
        for (key, value) in &self.tags {
            if key.is_empty() || value.is_empty() {
                continue;
            }
            line.push(',');
            escape_into(&mut line, key, &[',', '=', ' ']);
            line.push('=');
            escape_into(&mut line, value, &[',', '=', ' ']);
        }

        let mut wrote_field = false;
        for (key, value) in &self.fields {
            let mut encoded = String::new();
            escape_into(&mut encoded, key, &[',', '=', ' ']);
            encoded.push('=');
            if !value.write_line_protocol(&mut encoded) {
                continue;
            }
            line.push(if wrote_field { ',' } else { ' ' });
            line.push_str(&encoded);
            wrote_field = true;
        }
        if !wrote_field {
            return None;
        }

        if let Some(ts) = self.timestamp.as_ref().and_then(|ts| self.precision.encode(ts)) {
            let _ = write!(line, " {ts}");
        }
        Some(line)
    }
}

/// Escape a measurement name, tag or field key. Line breaks and tabs are
/// written as `\n`, `\r` and `\t` so one point always stays on one line.
fn escape_into(out: &mut String, raw: &str, special: &[char]) {
    for ch in raw.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\\' => out.push_str("\\\\"),
            ch if special.contains(&ch) => {
                out.push('\\');
                out.push(ch);
            }
            ch => out.push(ch),
        }
    }
}
