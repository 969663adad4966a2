//! Template - the document aggregate
//!
//! A `Template` is an explicit value, constructed by the caller and passed to
//! whatever submits it. Parameter and resource maps are ordered so rendering
//! the same document always yields the same bytes.

use std::collections::BTreeMap;

use serde_json::json;
use uuid::Uuid;

use crate::error::TemplateError;
use crate::parameter::Parameter;
use crate::schema::ResourceKind;
use crate::value::{PropertyValue, Reference};

/// Handle to a declared parameter, usable as a `Ref` source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterHandle {
    name: String,
    document: Uuid,
}

impl ParameterHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A `Ref` to this parameter, tied to the document that declared it
    pub fn reference(&self) -> PropertyValue {
        PropertyValue::Ref(Reference {
            target: self.name.clone(),
            document: Some(self.document),
        })
    }
}

/// Handle to a declared resource, usable as a `Ref` source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHandle {
    name: String,
    document: Uuid,
}

impl ResourceHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reference(&self) -> PropertyValue {
        PropertyValue::Ref(Reference {
            target: self.name.clone(),
            document: Some(self.document),
        })
    }
}

/// Rolling-replacement settings for an autoscaling group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AutoScalingRollingUpdate {
    /// ISO-8601 duration, e.g. `PT5M`
    pub pause_time: Option<String>,
    pub min_instances_in_service: Option<u32>,
    pub max_batch_size: Option<u32>,
    pub wait_on_resource_signals: bool,
}

/// Resource update policy
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePolicy {
    pub rolling_update: AutoScalingRollingUpdate,
}

impl UpdatePolicy {
    pub fn rolling(rolling_update: AutoScalingRollingUpdate) -> Self {
        Self { rolling_update }
    }

    fn to_json(&self) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        let rolling = &self.rolling_update;
        if let Some(pause_time) = &rolling.pause_time {
            object.insert("PauseTime".to_string(), json!(pause_time));
        }
        if let Some(min) = rolling.min_instances_in_service {
            object.insert("MinInstancesInService".to_string(), json!(min));
        }
        if let Some(batch) = rolling.max_batch_size {
            object.insert("MaxBatchSize".to_string(), json!(batch));
        }
        object.insert(
            "WaitOnResourceSignals".to_string(),
            json!(rolling.wait_on_resource_signals),
        );
        json!({ "AutoScalingRollingUpdate": object })
    }
}

/// A resource declaration: kind plus property map
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub kind: ResourceKind,
    pub properties: BTreeMap<String, PropertyValue>,
    pub update_policy: Option<UpdatePolicy>,
    /// Opaque metadata block (e.g. a cfn-init package manifest), passed
    /// through to the rendered document uninterpreted
    pub metadata: Option<serde_json::Value>,
}

impl Resource {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            properties: BTreeMap::new(),
            update_policy: None,
            metadata: None,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn with_update_policy(mut self, policy: UpdatePolicy) -> Self {
        self.update_policy = Some(policy);
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    fn to_json(&self) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        object.insert("Type".to_string(), json!(self.kind.type_name()));
        if let Some(metadata) = &self.metadata {
            object.insert("Metadata".to_string(), metadata.clone());
        }
        let mut properties = serde_json::Map::new();
        for (key, value) in &self.properties {
            properties.insert(key.clone(), value.to_json());
        }
        object.insert(
            "Properties".to_string(),
            serde_json::Value::Object(properties),
        );
        if let Some(policy) = &self.update_policy {
            object.insert("UpdatePolicy".to_string(), policy.to_json());
        }
        serde_json::Value::Object(object)
    }
}

/// The template document
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    id: Uuid,
    description: Option<String>,
    parameters: BTreeMap<String, Parameter>,
    resources: BTreeMap<String, Resource>,
}

impl Template {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            description: None,
            parameters: BTreeMap::new(),
            resources: BTreeMap::new(),
        }
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    /// Declare a parameter.
    ///
    /// Fails with `DuplicateName` if the logical name is taken; the document
    /// is unchanged on failure.
    pub fn add_parameter(
        &mut self,
        parameter: Parameter,
    ) -> Result<ParameterHandle, TemplateError> {
        let name = parameter.name.clone();
        if self.is_declared(&name) {
            return Err(TemplateError::DuplicateName { name });
        }
        self.parameters.insert(name.clone(), parameter);
        Ok(ParameterHandle {
            name,
            document: self.id,
        })
    }

    /// Declare a resource.
    ///
    /// The property set is checked against the kind's schema and every
    /// reference in the property tree must resolve within this document.
    /// All checks run before any mutation, so a failed call adds nothing.
    pub fn add_resource(
        &mut self,
        logical_name: impl Into<String>,
        resource: Resource,
    ) -> Result<ResourceHandle, TemplateError> {
        let name = logical_name.into();
        if self.is_declared(&name) {
            return Err(TemplateError::DuplicateName { name });
        }
        resource
            .kind
            .check_fields(resource.properties.keys().map(|k| k.as_str()))?;

        let mut refs = Vec::new();
        for value in resource.properties.values() {
            value.collect_refs(&mut refs);
        }
        for reference in refs {
            self.check_reference(reference)?;
        }

        self.resources.insert(name.clone(), resource);
        Ok(ResourceHandle {
            name,
            document: self.id,
        })
    }

    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.values()
    }

    pub fn resource(&self, logical_name: &str) -> Option<&Resource> {
        self.resources.get(logical_name)
    }

    fn is_declared(&self, name: &str) -> bool {
        self.parameters.contains_key(name) || self.resources.contains_key(name)
    }

    fn check_reference(&self, reference: &Reference) -> Result<(), TemplateError> {
        if reference.is_pseudo() {
            return Ok(());
        }
        let foreign = reference
            .document
            .map(|document| document != self.id)
            .unwrap_or(false);
        if foreign || !self.is_declared(&reference.target) {
            return Err(TemplateError::CrossDocumentReference {
                target: reference.target.clone(),
            });
        }
        Ok(())
    }

    /// Check that every autoscaling group waiting on resource signals is
    /// backed by a launch configuration whose user data sends one.
    ///
    /// The signal and the wait flag must stay consistent or the rolling
    /// update hangs until CloudFormation's timeout.
    pub fn check_signal_wiring(&self) -> Result<(), TemplateError> {
        for (group_name, group) in &self.resources {
            if group.kind != ResourceKind::AutoScalingGroup {
                continue;
            }
            let waits = group
                .update_policy
                .as_ref()
                .map(|policy| policy.rolling_update.wait_on_resource_signals)
                .unwrap_or(false);
            if !waits {
                continue;
            }
            if !self.group_sends_signal(group) {
                return Err(TemplateError::UnsignaledRollingUpdate {
                    group: group_name.clone(),
                });
            }
        }
        Ok(())
    }

    fn group_sends_signal(&self, group: &Resource) -> bool {
        let Some(PropertyValue::Ref(launch_config)) =
            group.properties.get("LaunchConfigurationName")
        else {
            return false;
        };
        let Some(launch_config) = self.resources.get(&launch_config.target) else {
            return false;
        };
        let Some(user_data) = launch_config.properties.get("UserData") else {
            return false;
        };
        let mut script = String::new();
        user_data.literal_text(&mut script);
        script.contains("cfn-signal")
    }

    /// Render the document to JSON text.
    ///
    /// Pure and deterministic: map keys render in sorted order, so an
    /// unmodified document serializes to identical bytes every time, and a
    /// parse/re-serialize round trip is byte-stable.
    pub fn to_json(&self) -> Result<String, TemplateError> {
        let mut document = serde_json::Map::new();
        if let Some(description) = &self.description {
            document.insert("Description".to_string(), json!(description));
        }
        let mut parameters = serde_json::Map::new();
        for (name, parameter) in &self.parameters {
            parameters.insert(name.clone(), parameter.to_json());
        }
        document.insert(
            "Parameters".to_string(),
            serde_json::Value::Object(parameters),
        );
        let mut resources = serde_json::Map::new();
        for (name, resource) in &self.resources {
            resources.insert(name.clone(), resource.to_json());
        }
        document.insert(
            "Resources".to_string(),
            serde_json::Value::Object(resources),
        );
        serde_json::to_string_pretty(&serde_json::Value::Object(document))
            .map_err(|e| TemplateError::Serialization(e.to_string()))
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::new()
    }
}
