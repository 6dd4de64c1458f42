//! Request validation.
//!
//! Raw JSON payloads are checked field by field and turned into typed
//! requests. Every violated field is reported at once; a payload either
//! validates completely or yields a [`ValidationError`].

pub mod operation;
pub mod project;

use std::str::FromStr;

use serde_json::{Map, Value};

use devstudio_types::error::{FieldViolation, ValidationError};
use devstudio_types::llm::ProviderKind;

pub use operation::validate_operation;

/// Deployment-dependent validation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationRules {
    /// Chat models a client may request. Empty allows any model.
    pub allowed_chat_models: Vec<String>,
}

/// A typed request that can be produced from a raw JSON payload.
pub trait Validate: Sized {
    fn validate(raw: &Value, rules: &ValidationRules) -> Result<Self, ValidationError>;
}

/// Reads typed fields out of a JSON object, collecting violations instead
/// of stopping at the first one.
///
/// Accessors return a placeholder when a field is invalid; the placeholder
/// is never observed because [`FieldReader::finish`] fails whenever any
/// violation was recorded.
pub struct FieldReader<'a> {
    object: Option<&'a Map<String, Value>>,
    prefix: String,
    violations: Vec<FieldViolation>,
}

impl<'a> FieldReader<'a> {
    /// Start reading a request body. A non-object body is a violation on `body`.
    pub fn new(raw: &'a Value) -> Self {
        let mut reader = Self {
            object: raw.as_object(),
            prefix: String::new(),
            violations: Vec::new(),
        };
        if reader.object.is_none() {
            reader.violate("body", "request body must be a JSON object");
        }
        reader
    }

    fn nested(object: &'a Map<String, Value>, prefix: String) -> Self {
        Self {
            object: Some(object),
            prefix,
            violations: Vec::new(),
        }
    }

    /// Full dotted path of `key` relative to the request root.
    pub fn path(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.prefix)
        }
    }

    /// Record a violation for `field` (already a full path).
    pub fn violate(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(FieldViolation::new(field, message));
    }

    /// Raw value for `key`. JSON `null` counts as absent.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.object
            .and_then(|obj| obj.get(key))
            .filter(|v| !v.is_null())
    }

    fn string_at(&mut self, key: &str) -> Option<Option<String>> {
        match self.get(key) {
            None => Some(None),
            Some(Value::String(s)) => Some(Some(s.clone())),
            Some(_) => {
                let field = self.path(key);
                self.violate(field.clone(), format!("{field} must be a string"));
                None
            }
        }
    }

    /// A string that must be present and contain non-whitespace text.
    pub fn required_string(&mut self, key: &str) -> String {
        if self.object.is_none() {
            return String::new();
        }
        match self.string_at(key) {
            Some(Some(s)) if !s.trim().is_empty() => s,
            Some(Some(_)) => {
                let field = self.path(key);
                self.violate(field.clone(), format!("{field} must not be empty"));
                String::new()
            }
            Some(None) => {
                let field = self.path(key);
                self.violate(field.clone(), format!("{field} is required"));
                String::new()
            }
            None => String::new(),
        }
    }

    /// A string that must be present but may be empty.
    pub fn string_allow_empty(&mut self, key: &str) -> String {
        if self.object.is_none() {
            return String::new();
        }
        match self.string_at(key) {
            Some(Some(s)) => s,
            Some(None) => {
                let field = self.path(key);
                self.violate(field.clone(), format!("{field} is required"));
                String::new()
            }
            None => String::new(),
        }
    }

    pub fn optional_string(&mut self, key: &str) -> Option<String> {
        self.string_at(key).flatten()
    }

    /// An optional string that, when supplied, must not be blank.
    pub fn optional_non_empty_string(&mut self, key: &str) -> Option<String> {
        let value = self.optional_string(key)?;
        if value.trim().is_empty() {
            let field = self.path(key);
            self.violate(field.clone(), format!("{field} must not be empty"));
            return None;
        }
        Some(value)
    }

    pub fn optional_bool(&mut self, key: &str) -> Option<bool> {
        match self.get(key)? {
            Value::Bool(b) => Some(*b),
            _ => {
                let field = self.path(key);
                self.violate(field.clone(), format!("{field} must be a boolean"));
                None
            }
        }
    }

    /// An optional number within `[min, max]` inclusive.
    pub fn optional_number_in_range(&mut self, key: &str, min: f64, max: f64) -> Option<f64> {
        let value = self.get(key)?;
        let field = self.path(key);
        match value.as_f64() {
            Some(n) if (min..=max).contains(&n) => Some(n),
            Some(_) => {
                self.violate(field.clone(), format!("{field} must be between {min} and {max}"));
                None
            }
            None => {
                self.violate(field.clone(), format!("{field} must be a number"));
                None
            }
        }
    }

    /// An optional string restricted to `names`.
    pub fn optional_enum<T: FromStr>(&mut self, key: &str, names: &[&str]) -> Option<T> {
        let raw = self.optional_string(key)?;
        match raw.parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                let field = self.path(key);
                self.violate(
                    field.clone(),
                    format!("{field} must be one of: {}", names.join(", ")),
                );
                None
            }
        }
    }

    /// An optional array whose elements are restricted to `names`.
    /// Bad elements are reported as `key[i]`.
    pub fn optional_enum_array<T: FromStr>(&mut self, key: &str, names: &[&str]) -> Vec<T> {
        let value = match self.get(key) {
            Some(value) => value,
            None => return Vec::new(),
        };
        let field = self.path(key);
        let items = match value.as_array() {
            Some(items) => items,
            None => {
                self.violate(field.clone(), format!("{field} must be an array"));
                return Vec::new();
            }
        };

        let mut parsed = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match item.as_str().map(str::parse::<T>) {
                Some(Ok(value)) => parsed.push(value),
                _ => self.violate(
                    format!("{field}[{i}]"),
                    format!("{field}[{i}] must be one of: {}", names.join(", ")),
                ),
            }
        }
        parsed
    }

    /// The optional `provider` field.
    pub fn optional_provider(&mut self) -> Option<ProviderKind> {
        self.optional_enum("provider", &["anthropic", "openai"])
    }

    /// Read an optional nested object with `read`, reporting its fields
    /// as `key.field`.
    pub fn optional_object<T>(
        &mut self,
        key: &str,
        read: impl FnOnce(&mut FieldReader<'a>) -> T,
    ) -> Option<T> {
        let value = self.get(key)?;
        let field = self.path(key);
        let object = match value.as_object() {
            Some(object) => object,
            None => {
                self.violate(field.clone(), format!("{field} must be an object"));
                return None;
            }
        };
        let mut child = FieldReader::nested(object, field);
        let result = read(&mut child);
        let failed = !child.violations.is_empty();
        self.violations.append(&mut child.violations);
        (!failed).then_some(result)
    }

    /// Read an optional array of objects with `read`, reporting element
    /// fields as `key[i].field`.
    pub fn optional_object_array<T>(
        &mut self,
        key: &str,
        mut read: impl FnMut(&mut FieldReader<'a>) -> T,
    ) -> Vec<T> {
        let value = match self.get(key) {
            Some(value) => value,
            None => return Vec::new(),
        };
        let field = self.path(key);
        let items = match value.as_array() {
            Some(items) => items,
            None => {
                self.violate(field.clone(), format!("{field} must be an array"));
                return Vec::new();
            }
        };

        let mut parsed = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let element = format!("{field}[{i}]");
            let object = match item.as_object() {
                Some(object) => object,
                None => {
                    self.violate(element.clone(), format!("{element} must be an object"));
                    continue;
                }
            };
            let mut child = FieldReader::nested(object, element);
            let value = read(&mut child);
            if child.violations.is_empty() {
                parsed.push(value);
            }
            self.violations.append(&mut child.violations);
        }
        parsed
    }

    /// Succeed with `value` only if no violation was recorded.
    pub fn finish<T>(self, value: T) -> Result<T, ValidationError> {
        if self.violations.is_empty() {
            Ok(value)
        } else {
            Err(ValidationError::new(self.violations))
        }
    }
}
