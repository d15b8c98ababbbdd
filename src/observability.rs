//! Structured records emitted while deploying.
//!
//! The executor reports through an [`ObservabilitySink`] rather than calling
//! a logging backend directly:
//!
//! - [`TracingSink`] forwards records to `tracing` (the default)
//! - [`MemorySink`] keeps them in memory so tests can assert on fields
//!
//! Records never affect control flow. A sink must not fail a deployment.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
pub use tracing::Level;

/// Value of a record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Str(String),
    Bool(bool),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Str(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) if needs_quoting(s) => write!(f, "{s:?}"),
            Self::Str(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

fn needs_quoting(s: &str) -> bool {
    s.is_empty() || s.chars().any(|c| c.is_whitespace() || c == '=' || c == '"')
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// A named field attached to a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub key: &'static str,
    pub value: FieldValue,
}

impl Field {
    pub fn new(key: &'static str, value: impl Into<FieldValue>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

/// Renders fields as `key=value` pairs separated by spaces.
struct DisplayFields<'a>(&'a [Field]);

impl fmt::Display for DisplayFields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", field.key, field.value)?;
        }
        Ok(())
    }
}

/// Destination for deployment records.
pub trait ObservabilitySink: Send + Sync {
    fn record(&self, level: Level, message: &str, fields: &[Field]);
}

/// Forwards records to the active `tracing` subscriber.
///
/// Keys the executor emits become `tracing` fields of the same name. Any
/// other keys are collected into a single `fields` value.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

/// Record keys forwarded as structured `tracing` fields.
const STRUCTURED_KEYS: [&str; 10] = [
    "region",
    "application-name",
    "environment",
    "bucket",
    "bucket-key",
    "versionlabel",
    "description",
    "env-update",
    "auto-create",
    "error",
];

fn str_field<'a>(fields: &'a [Field], key: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|field| field.key == key)
        .and_then(|field| field.value.as_str())
}

fn bool_field(fields: &[Field], key: &str) -> Option<bool> {
    fields
        .iter()
        .find(|field| field.key == key)
        .and_then(|field| field.value.as_bool())
}

macro_rules! emit {
    ($macro:ident, $message:expr, $fields:expr, $rest:expr) => {
        tracing::$macro!(
            region = str_field($fields, "region"),
            "application-name" = str_field($fields, "application-name"),
            environment = str_field($fields, "environment"),
            bucket = str_field($fields, "bucket"),
            "bucket-key" = str_field($fields, "bucket-key"),
            versionlabel = str_field($fields, "versionlabel"),
            description = str_field($fields, "description"),
            "env-update" = bool_field($fields, "env-update"),
            "auto-create" = bool_field($fields, "auto-create"),
            error = str_field($fields, "error"),
            fields = $rest,
            "{}",
            $message
        )
    };
}

impl ObservabilitySink for TracingSink {
    fn record(&self, level: Level, message: &str, fields: &[Field]) {
        let other: Vec<Field> = fields
            .iter()
            .filter(|field| !STRUCTURED_KEYS.contains(&field.key))
            .cloned()
            .collect();
        let rest = (!other.is_empty()).then(|| tracing::field::display(DisplayFields(&other)));

        match level {
            Level::ERROR => emit!(error, message, fields, rest),
            Level::WARN => emit!(warn, message, fields, rest),
            Level::INFO => emit!(info, message, fields, rest),
            Level::DEBUG => emit!(debug, message, fields, rest),
            _ => emit!(trace, message, fields, rest),
        }
    }
}

/// A record captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub level: Level,
    pub message: String,
    pub fields: Vec<Field>,
}

impl Record {
    /// Value of the first field named `key`.
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|field| field.key == key)
            .map(|field| &field.value)
    }
}

/// Sink that keeps records in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<Record>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records in emission order.
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().clone()
    }

    /// Records at `level`, in emission order.
    pub fn at_level(&self, level: Level) -> Vec<Record> {
        self.records
            .lock()
            .iter()
            .filter(|record| record.level == level)
            .cloned()
            .collect()
    }
}

impl ObservabilitySink for MemorySink {
    fn record(&self, level: Level, message: &str, fields: &[Field]) {
        self.records.lock().push(Record {
            level,
            message: message.to_string(),
            fields: fields.to_vec(),
        });
    }
}
