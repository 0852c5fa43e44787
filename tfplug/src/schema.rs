//! Schema types and builders for tfplug
//!
//! A schema describes the attributes of a provider, resource, or data source.
//! Besides declaring shape for the host, the schema here carries the small
//! amount of behavior the framework applies before a resource sees a value:
//! default filling and per-attribute validators.

use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use crate::validator::Validator;
use std::sync::Arc;

/// AttributeType defines the type system for Terraform attributes
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number, // Always f64
    Bool,
    List(Box<AttributeType>), // Ordered, allows duplicates
    Set(Box<AttributeType>),  // Unordered, no duplicates
}

/// Schema is returned by providers/resources/data sources
/// Version is used for state migration
#[derive(Debug, Clone)]
pub struct Schema {
    pub version: i64,
    pub description: String,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Fill unset attributes that declare a default.
    pub fn with_defaults(&self, value: &DynamicValue) -> DynamicValue {
        let mut filled = value.clone();
        for attr in &self.attributes {
            let Some(default) = &attr.default else {
                continue;
            };
            let path = AttributePath::new(&attr.name);
            if filled.get(&path).is_err() {
                if let Dynamic::Map(m) = &mut filled.value {
                    m.insert(attr.name.clone(), default.clone());
                }
            }
        }
        filled
    }

    /// Check required attributes and run attribute validators.
    pub fn validate(&self, config: &DynamicValue) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for attr in &self.attributes {
            let path = AttributePath::new(&attr.name);
            match config.get(&path) {
                Ok(value) => {
                    for validator in &attr.validators {
                        validator.validate(value, &path, &mut diagnostics);
                    }
                }
                Err(_) if attr.required => diagnostics.push(
                    Diagnostic::error(
                        format!("Missing required argument: {}", attr.name),
                        format!("The argument \"{}\" is required, but no definition was found.", attr.name),
                    )
                    .with_attribute(path),
                ),
                Err(_) => {}
            }
        }

        diagnostics
    }
}

/// Attribute represents a single configuration attribute
#[derive(Clone)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub requires_replace: bool,
    pub default: Option<Dynamic>,
    pub validators: Vec<Arc<dyn Validator>>,
}

impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("sensitive", &self.sensitive)
            .field("requires_replace", &self.requires_replace)
            .field("default", &self.default)
            .field("validators", &self.validators.len())
            .finish()
    }
}

/// ALWAYS use this instead of constructing Attribute directly
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type: type_,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                requires_replace: false,
                default: None,
                validators: Vec::new(),
            },
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, AttributeType::String)
    }

    pub fn bool(name: &str) -> Self {
        Self::new(name, AttributeType::Bool)
    }

    pub fn number(name: &str) -> Self {
        Self::new(name, AttributeType::Number)
    }

    pub fn string_set(name: &str) -> Self {
        Self::new(name, AttributeType::Set(Box::new(AttributeType::String)))
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    /// Changing this attribute destroys and recreates the resource
    pub fn requires_replace(mut self) -> Self {
        self.attribute.requires_replace = true;
        self
    }

    pub fn default(mut self, value: Dynamic) -> Self {
        self.attribute.default = Some(value);
        self
    }

    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.attribute.validators.push(Arc::new(validator));
        self
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            schema: Schema {
                version: 0,
                description: String::new(),
                attributes: Vec::new(),
            },
        }
    }

    pub fn version(mut self, version: i64) -> Self {
        self.schema.version = version;
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.schema.description = desc.to_string();
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.schema.attributes.push(attr);
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::StringOneOf;

    fn schema() -> Schema {
        SchemaBuilder::new()
            .attribute(AttributeBuilder::string("name").required().build())
            .attribute(
                AttributeBuilder::bool("is_archived")
                    .optional()
                    .default(Dynamic::Bool(false))
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("action_on_destroy")
                    .required()
                    .validator(StringOneOf::new(["none", "archive"]))
                    .build(),
            )
            .build()
    }

    #[test]
    fn missing_required_attribute_is_reported() {
        let mut config = DynamicValue::object();
        config
            .set_string(&AttributePath::new("action_on_destroy"), "none")
            .unwrap();

        let diags = schema().validate(&config);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].summary.contains("name"));
    }

    #[test]
    fn validators_run_on_present_values() {
        let mut config = DynamicValue::object();
        config.set_string(&AttributePath::new("name"), "general").unwrap();
        config
            .set_string(&AttributePath::new("action_on_destroy"), "delete")
            .unwrap();

        let diags = schema().validate(&config);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].summary.contains("delete"));
    }

    #[test]
    fn defaults_fill_only_unset_attributes() {
        let mut config = DynamicValue::object();
        config.set_string(&AttributePath::new("name"), "general").unwrap();

        let filled = schema().with_defaults(&config);
        assert!(!filled.get_bool(&AttributePath::new("is_archived")).unwrap());

        let mut archived = config.clone();
        archived
            .set_bool(&AttributePath::new("is_archived"), true)
            .unwrap();
        let filled = schema().with_defaults(&archived);
        assert!(filled.get_bool(&AttributePath::new("is_archived")).unwrap());
    }
}
