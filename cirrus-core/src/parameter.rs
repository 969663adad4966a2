//! Template parameters
//!
//! A parameter is declared once, is immutable, and is referenced by name from
//! resource properties. Constraints are stored and rendered verbatim; any
//! validation against them happens in CloudFormation, not here.

use serde_json::json;

/// CloudFormation parameter type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterType {
    String,
    /// `List<AWS::EC2::Subnet::Id>`
    SubnetIdList,
    /// `List<AWS::EC2::AvailabilityZone::Name>`
    AvailabilityZoneList,
}

impl ParameterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::String => "String",
            ParameterType::SubnetIdList => "List<AWS::EC2::Subnet::Id>",
            ParameterType::AvailabilityZoneList => "List<AWS::EC2::AvailabilityZone::Name>",
        }
    }
}

/// A parameter declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub parameter_type: ParameterType,
    pub default: Option<String>,
    pub description: Option<String>,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub allowed_pattern: Option<String>,
    pub constraint_description: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, parameter_type: ParameterType) -> Self {
        Self {
            name: name.into(),
            parameter_type,
            default: None,
            description: None,
            min_length: None,
            max_length: None,
            allowed_pattern: None,
            constraint_description: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ParameterType::String)
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_min_length(mut self, min_length: u32) -> Self {
        self.min_length = Some(min_length);
        self
    }

    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_allowed_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.allowed_pattern = Some(pattern.into());
        self
    }

    pub fn with_constraint_description(mut self, description: impl Into<String>) -> Self {
        self.constraint_description = Some(description.into());
        self
    }

    /// True when submission must supply a value for this parameter
    pub fn requires_value(&self) -> bool {
        self.default.is_none()
    }

    /// Render the declaration body (everything but the name)
    pub fn to_json(&self) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        object.insert("Type".to_string(), json!(self.parameter_type.as_str()));
        if let Some(default) = &self.default {
            object.insert("Default".to_string(), json!(default));
        }
        if let Some(description) = &self.description {
            object.insert("Description".to_string(), json!(description));
        }
        if let Some(min_length) = self.min_length {
            object.insert("MinLength".to_string(), json!(min_length));
        }
        if let Some(max_length) = self.max_length {
            object.insert("MaxLength".to_string(), json!(max_length));
        }
        if let Some(pattern) = &self.allowed_pattern {
            object.insert("AllowedPattern".to_string(), json!(pattern));
        }
        if let Some(description) = &self.constraint_description {
            object.insert("ConstraintDescription".to_string(), json!(description));
        }
        serde_json::Value::Object(object)
    }
}
