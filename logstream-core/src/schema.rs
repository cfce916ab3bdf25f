//! Schema - Define type schemas for resources
//!
//! Providers define schemas for each resource type. Besides value types an
//! attribute carries the constraints the caller has to respect before a
//! resource reaches the provider: required groups, conflicts, immutability
//! and sensitivity.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::resource::Value;

/// Placeholder shown instead of a sensitive value
pub const SENSITIVE_PLACEHOLDER: &str = "(sensitive)";

/// Attribute type
#[derive(Debug, Clone)]
pub enum AttributeType {
    /// String
    String,
    /// Integer
    Int,
    /// Boolean
    Bool,
    /// Enum (list of allowed values, case-sensitive)
    Enum(Vec<String>),
    /// Custom type (with validation function)
    Custom {
        name: String,
        base: Box<AttributeType>,
        validate: fn(&Value) -> Result<(), String>,
    },
    /// List
    List(Box<AttributeType>),
    /// Set (list without duplicates, order is irrelevant)
    Set(Box<AttributeType>),
    /// Map
    Map(Box<AttributeType>),
}

impl AttributeType {
    /// Check if a value conforms to this type
    pub fn validate(&self, value: &Value) -> Result<(), TypeError> {
        match (self, value) {
            (AttributeType::String, Value::String(_)) => Ok(()),
            (AttributeType::Int, Value::Int(_)) => Ok(()),
            (AttributeType::Bool, Value::Bool(_)) => Ok(()),

            (AttributeType::Enum(variants), Value::String(s)) => {
                if variants.iter().any(|v| v == s) {
                    Ok(())
                } else {
                    Err(TypeError::InvalidEnumVariant {
                        value: s.clone(),
                        expected: variants.clone(),
                    })
                }
            }

            (AttributeType::Custom { validate, base, .. }, v) => {
                base.validate(v)?;
                validate(v).map_err(|msg| TypeError::ValidationFailed { message: msg })
            }

            (AttributeType::List(inner), Value::List(items)) => validate_items(inner, items),

            (AttributeType::Set(inner), Value::List(items)) => {
                validate_items(inner, items)?;
                for (i, item) in items.iter().enumerate() {
                    if items[..i].contains(item) {
                        return Err(TypeError::DuplicateSetItem { index: i });
                    }
                }
                Ok(())
            }

            (AttributeType::Map(inner), Value::Map(map)) => {
                for (k, v) in map {
                    inner.validate(v).map_err(|e| TypeError::MapValueError {
                        key: k.clone(),
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            _ => Err(TypeError::TypeMismatch {
                expected: self.type_name(),
                got: value.type_name().to_string(),
            }),
        }
    }

    /// Whether two values are equal under this type (sets ignore order)
    pub fn values_equal(&self, a: &Value, b: &Value) -> bool {
        match (self, a, b) {
            (AttributeType::Set(_), Value::List(xs), Value::List(ys)) => {
                xs.len() == ys.len() && xs.iter().all(|x| ys.contains(x))
            }
            _ => a == b,
        }
    }

    fn type_name(&self) -> String {
        match self {
            AttributeType::String => "String".to_string(),
            AttributeType::Int => "Int".to_string(),
            AttributeType::Bool => "Bool".to_string(),
            AttributeType::Enum(variants) => format!("Enum({})", variants.join(" | ")),
            AttributeType::Custom { name, .. } => name.clone(),
            AttributeType::List(inner) => format!("List<{}>", inner.type_name()),
            AttributeType::Set(inner) => format!("Set<{}>", inner.type_name()),
            AttributeType::Map(inner) => format!("Map<{}>", inner.type_name()),
        }
    }
}

fn validate_items(inner: &AttributeType, items: &[Value]) -> Result<(), TypeError> {
    for (i, item) in items.iter().enumerate() {
        inner.validate(item).map_err(|e| TypeError::ListItemError {
            index: i,
            inner: Box::new(e),
        })?;
    }
    Ok(())
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Type error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Invalid enum variant '{value}', expected one of: {}", expected.join(", "))]
    InvalidEnumVariant {
        value: String,
        expected: Vec<String>,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Required attribute '{name}' is missing")]
    MissingRequired { name: String },

    #[error("Attribute '{name}' is computed and cannot be set")]
    ComputedOnly { name: String },

    #[error("'{name}' conflicts with '{other}'")]
    Conflict { name: String, other: String },

    #[error("'{name}': all of `{}` must be specified", keys.join(","))]
    MissingRequiredWith { name: String, keys: Vec<String> },

    #[error("List item at index {index}: {inner}")]
    ListItemError { index: usize, inner: Box<TypeError> },

    #[error("Duplicate set item at index {index}")]
    DuplicateSetItem { index: usize },

    #[error("Map value for key '{key}': {inner}")]
    MapValueError { key: String, inner: Box<TypeError> },
}

/// Attribute schema
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    pub name: String,
    pub attr_type: AttributeType,
    pub required: bool,
    /// Value may be assigned by the remote side
    pub computed: bool,
    /// Value cannot be set by the caller at all
    pub read_only: bool,
    /// Never shown in logs or plans
    pub sensitive: bool,
    /// Changing the value requires replacing the resource
    pub force_new: bool,
    /// String values differing only in ASCII case are the same value
    pub ignore_case: bool,
    pub conflicts_with: Vec<String>,
    pub required_with: Vec<String>,
    pub description: Option<String>,
}

impl AttributeSchema {
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            required: false,
            computed: false,
            read_only: false,
            sensitive: false,
            force_new: false,
            ignore_case: false,
            conflicts_with: Vec::new(),
            required_with: Vec::new(),
            description: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.computed = true;
        self.read_only = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    pub fn conflicts_with(mut self, names: &[&str]) -> Self {
        self.conflicts_with = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn required_with(mut self, names: &[&str]) -> Self {
        self.required_with = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Whether a desired and an observed value are the same for this attribute
    pub fn values_equal(&self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::String(x), Value::String(y)) if self.ignore_case => x.eq_ignore_ascii_case(y),
            _ => self.attr_type.values_equal(a, b),
        }
    }
}

/// Resource schema
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub resource_type: String,
    pub attributes: BTreeMap<String, AttributeSchema>,
    pub description: Option<String>,
}

impl ResourceSchema {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            attributes: BTreeMap::new(),
            description: None,
        }
    }

    pub fn attribute(mut self, schema: AttributeSchema) -> Self {
        self.attributes.insert(schema.name.clone(), schema);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Validate resource attributes
    ///
    /// Errors are reported in attribute name order.
    pub fn validate(&self, attributes: &HashMap<String, Value>) -> Result<(), Vec<TypeError>> {
        let mut errors = Vec::new();

        for (name, schema) in &self.attributes {
            let Some(value) = attributes.get(name) else {
                if schema.required {
                    errors.push(TypeError::MissingRequired { name: name.clone() });
                }
                continue;
            };

            if schema.read_only {
                errors.push(TypeError::ComputedOnly { name: name.clone() });
                continue;
            }

            if let Err(e) = schema.attr_type.validate(value) {
                errors.push(e);
            }

            for other in &schema.conflicts_with {
                if attributes.contains_key(other) {
                    errors.push(TypeError::Conflict {
                        name: name.clone(),
                        other: other.clone(),
                    });
                }
            }

            if !schema.required_with.is_empty()
                && schema
                    .required_with
                    .iter()
                    .any(|k| !attributes.contains_key(k))
            {
                let mut keys: Vec<String> = schema.required_with.clone();
                keys.push(name.clone());
                keys.sort();
                keys.dedup();
                errors.push(TypeError::MissingRequiredWith {
                    name: name.clone(),
                    keys,
                });
            }
        }

        // Unknown attributes are allowed (for flexibility)

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Copy of `attributes` with every sensitive value masked
    pub fn redact(&self, attributes: &HashMap<String, Value>) -> HashMap<String, Value> {
        attributes
            .iter()
            .map(|(k, v)| {
                let sensitive = self.attributes.get(k).is_some_and(|s| s.sensitive);
                let v = if sensitive {
                    Value::String(SENSITIVE_PLACEHOLDER.to_string())
                } else {
                    v.clone()
                };
                (k.clone(), v)
            })
            .collect()
    }
}
