use std::collections::HashSet;

use serde::Deserialize;

use crate::error::ConfigurationError;
use crate::value::{FieldType, Value};

/// How a field maps onto a host attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescriptor {
    pub name: String,
    /// External writes to the attribute are parsed back into state.
    pub observed: bool,
    /// State writes are serialized back onto the attribute.
    pub reflected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub ty: FieldType,
    pub default: Value,
    pub attribute: Option<AttributeDescriptor>,
    pub internal: bool,
}

impl FieldDef {
    pub fn new(name: &str, default: impl Into<Value>) -> Self {
        let default = default.into();
        Self {
            name: name.to_owned(),
            ty: default.field_type(),
            default,
            attribute: None,
            internal: false,
        }
    }

    /// Observed and reflected attribute with the given name.
    pub fn attr(self, attribute: &str) -> Self {
        self.with_attribute(attribute, true, true)
    }

    pub fn observed_attr(self, attribute: &str) -> Self {
        self.with_attribute(attribute, true, false)
    }

    pub fn with_attribute(mut self, attribute: &str, observed: bool, reflected: bool) -> Self {
        self.attribute = Some(AttributeDescriptor {
            name: attribute.to_owned(),
            observed,
            reflected,
        });
        self
    }

    pub fn internal(mut self) -> Self {
        self.internal = true;
        self
    }

    /// Attribute descriptor, unless the field is internal.
    pub fn synced_attribute(&self) -> Option<&AttributeDescriptor> {
        if self.internal {
            None
        } else {
            self.attribute.as_ref()
        }
    }
}

/// Field definitions for one component type.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldDef>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAttribute {
    Name(String),
    Full {
        name: String,
        #[serde(default = "yes")]
        observed: bool,
        #[serde(default = "yes")]
        reflected: bool,
    },
}

fn yes() -> bool {
    true
}

#[derive(Deserialize)]
struct RawField {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    default: Option<serde_json::Value>,
    #[serde(default)]
    attribute: Option<RawAttribute>,
    #[serde(default)]
    internal: bool,
}

impl Schema {
    pub fn declare(fields: Vec<FieldDef>) -> Result<Self, ConfigurationError> {
        let mut names = HashSet::new();
        let mut attributes = HashSet::new();

        for field in &fields {
            if !names.insert(field.name.as_str()) {
                return Err(ConfigurationError::DuplicateField(field.name.clone()));
            }
            if field.default.field_type() != field.ty {
                return Err(ConfigurationError::DefaultTypeMismatch {
                    field: field.name.clone(),
                    expected: field.ty.name(),
                });
            }
            if let Some(attr) = &field.attribute {
                if !attributes.insert(attr.name.as_str()) {
                    return Err(ConfigurationError::DuplicateAttribute(attr.name.clone()));
                }
            }
        }

        Ok(Self { fields })
    }

    /// Declare a schema from its JSON description.
    ///
    /// `[{"name": "open", "type": "boolean", "default": false, "attribute": "open"}]`
    pub fn from_json(raw: &str) -> Result<Self, ConfigurationError> {
        let raw_fields: Vec<RawField> =
            serde_json::from_str(raw).map_err(|err| ConfigurationError::InvalidSchema(err.to_string()))?;

        let mut fields = Vec::with_capacity(raw_fields.len());
        for raw in raw_fields {
            let ty: FieldType = raw.ty.parse()?;
            let default = match raw.default {
                Some(json) => ty.from_json(json).ok_or_else(|| ConfigurationError::DefaultTypeMismatch {
                    field: raw.name.clone(),
                    expected: ty.name(),
                })?,
                None => ty.zero(),
            };
            let attribute = raw.attribute.map(|attr| match attr {
                RawAttribute::Name(name) => AttributeDescriptor {
                    name,
                    observed: true,
                    reflected: true,
                },
                RawAttribute::Full {
                    name,
                    observed,
                    reflected,
                } => AttributeDescriptor {
                    name,
                    observed,
                    reflected,
                },
            });
            fields.push(FieldDef {
                name: raw.name,
                ty,
                default,
                attribute,
                internal: raw.internal,
            });
        }

        Self::declare(fields)
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field whose synced attribute is `attribute`.
    pub fn by_attribute(&self, attribute: &str) -> Option<&FieldDef> {
        self.fields
            .iter()
            .find(|f| f.synced_attribute().is_some_and(|a| a.name == attribute))
    }

    pub fn observed_attributes(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter_map(|f| f.synced_attribute())
            .filter(|a| a.observed)
            .map(|a| a.name.as_str())
            .collect()
    }
}
