//! Stack submission
//!
//! Flattens the caller's parameter values into the list shape the remote API
//! expects and issues exactly one create-stack call. The only local check is
//! the pre-flight for parameters declared without a default: catching those
//! here saves a round trip.

use std::collections::BTreeMap;

use cirrus_core::Template;

use crate::api::{StackApi, StackParameter, StackSubmission, SubmitError, SubmitResult};

/// Submit a rendered template body as a new stack.
///
/// The body is parsed to find parameters declared without a default; if any
/// is absent from `parameter_values` the call fails before touching the
/// network. Values are flattened sorted by key so the outgoing parameter
/// list is deterministic.
pub async fn submit(
    api: &dyn StackApi,
    stack_name: &str,
    template_body: &str,
    parameter_values: &BTreeMap<String, String>,
) -> SubmitResult<StackSubmission> {
    for name in parameters_without_default(template_body)? {
        if !parameter_values.contains_key(&name) {
            return Err(SubmitError::MissingParameter { name });
        }
    }

    let parameters: Vec<StackParameter> = parameter_values
        .iter()
        .map(|(key, value)| StackParameter::new(key, value))
        .collect();

    api.create_stack(stack_name, template_body, &parameters)
        .await
}

/// Serialize a template document and submit it
pub async fn submit_template(
    api: &dyn StackApi,
    stack_name: &str,
    template: &Template,
    parameter_values: &BTreeMap<String, String>,
) -> SubmitResult<StackSubmission> {
    let body = template
        .to_json()
        .map_err(|e| SubmitError::InvalidTemplate(e.to_string()))?;
    submit(api, stack_name, &body, parameter_values).await
}

/// Names of parameters the body declares without a `Default`
fn parameters_without_default(template_body: &str) -> SubmitResult<Vec<String>> {
    let document: serde_json::Value = serde_json::from_str(template_body)
        .map_err(|e| SubmitError::InvalidTemplate(e.to_string()))?;

    let mut required = Vec::new();
    if let Some(parameters) = document.get("Parameters").and_then(|v| v.as_object()) {
        for (name, declaration) in parameters {
            if declaration.get("Default").is_none() {
                required.push(name.clone());
            }
        }
    }
    Ok(required)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use cirrus_core::{Parameter, Resource, ResourceKind, Template};

    use super::*;

    #[derive(Debug, Clone)]
    struct RecordedCall {
        stack_name: String,
        template_body: String,
        parameters: Vec<StackParameter>,
    }

    /// Stub remote that records every invocation
    #[derive(Default)]
    struct RecordingApi {
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl RecordingApi {
        fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StackApi for RecordingApi {
        async fn create_stack(
            &self,
            stack_name: &str,
            template_body: &str,
            parameters: &[StackParameter],
        ) -> SubmitResult<StackSubmission> {
            self.calls.lock().unwrap().push(RecordedCall {
                stack_name: stack_name.to_string(),
                template_body: template_body.to_string(),
                parameters: parameters.to_vec(),
            });
            Ok(StackSubmission {
                stack_id: "arn:aws:cloudformation:stack/test".to_string(),
            })
        }
    }

    fn ami_template() -> Template {
        let mut template = Template::new();
        let ami = template.add_parameter(Parameter::string("AmiId")).unwrap();
        template
            .add_parameter(Parameter::string("ScaleCapacity").with_default("1"))
            .unwrap();
        template
            .add_resource(
                "LaunchConfiguration",
                Resource::new(ResourceKind::LaunchConfiguration)
                    .with_property("ImageId", ami.reference())
                    .with_property("InstanceType", "m3.medium".into()),
            )
            .unwrap();
        template
    }

    #[tokio::test]
    async fn test_missing_parameter_makes_no_network_call() {
        let api = RecordingApi::default();
        let values = BTreeMap::new();

        let err = submit_template(&api, "test-stack", &ami_template(), &values)
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::MissingParameter { name } if name == "AmiId"));
        assert_eq!(api.calls().len(), 0);
    }

    #[tokio::test]
    async fn test_defaulted_parameter_needs_no_value() {
        let api = RecordingApi::default();
        let values = BTreeMap::from([("AmiId".to_string(), "ami-123".to_string())]);

        submit_template(&api, "test-stack", &ami_template(), &values)
            .await
            .unwrap();

        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_submission_issues_exactly_one_call() {
        let api = RecordingApi::default();
        let template = ami_template();
        let values = BTreeMap::from([("AmiId".to_string(), "ami-123".to_string())]);

        let submission = submit_template(&api, "test-stack", &template, &values)
            .await
            .unwrap();
        assert_eq!(submission.stack_id, "arn:aws:cloudformation:stack/test");

        let calls = api.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].stack_name, "test-stack");
        assert_eq!(calls[0].template_body, template.to_json().unwrap());
        assert!(
            calls[0]
                .parameters
                .contains(&StackParameter::new("AmiId", "ami-123"))
        );
    }

    #[tokio::test]
    async fn test_parameters_flatten_sorted_by_key() {
        let api = RecordingApi::default();
        let mut template = ami_template();
        let key = template.add_parameter(Parameter::string("KeyName")).unwrap();
        template
            .add_resource(
                "Spare",
                Resource::new(ResourceKind::LaunchConfiguration)
                    .with_property("ImageId", "ami-0".into())
                    .with_property("InstanceType", "m3.medium".into())
                    .with_property("KeyName", key.reference()),
            )
            .unwrap();
        let values = BTreeMap::from([
            ("KeyName".to_string(), "ops".to_string()),
            ("AmiId".to_string(), "ami-123".to_string()),
        ]);

        submit_template(&api, "test-stack", &template, &values)
            .await
            .unwrap();

        let keys: Vec<String> = api.calls()[0]
            .parameters
            .iter()
            .map(|p| p.key.clone())
            .collect();
        assert_eq!(keys, vec!["AmiId", "KeyName"]);
    }

    #[tokio::test]
    async fn test_unparseable_body_is_rejected_locally() {
        let api = RecordingApi::default();
        let values = BTreeMap::new();

        let err = submit(&api, "test-stack", "not json", &values)
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::InvalidTemplate(_)));
        assert_eq!(api.calls().len(), 0);
    }

    #[tokio::test]
    async fn test_end_to_end_reference_survives_to_the_wire() {
        let api = RecordingApi::default();
        let template = ami_template();
        let values = BTreeMap::from([("AmiId".to_string(), "ami-123".to_string())]);

        submit_template(&api, "test-stack", &template, &values)
            .await
            .unwrap();

        // the Ref marker reaches the remote untouched; resolution is theirs
        let body: serde_json::Value =
            serde_json::from_str(&api.calls()[0].template_body).unwrap();
        assert_eq!(
            body["Resources"]["LaunchConfiguration"]["Properties"]["ImageId"],
            serde_json::json!({ "Ref": "AmiId" })
        );
    }
}
