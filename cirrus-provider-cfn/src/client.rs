//! CloudFormation client
//!
//! Thin wrapper over the AWS SDK. Credentials and region come from the
//! ambient configuration chain; timeout policy is the SDK's.

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_cloudformation::Client as CloudFormationClient;
use aws_sdk_cloudformation::types::Parameter as AwsParameter;

use crate::api::{StackApi, StackParameter, StackSubmission, SubmitError, SubmitResult};

/// Real CloudFormation client
pub struct CfnClient {
    client: CloudFormationClient,
}

impl CfnClient {
    /// Create a client from the ambient AWS configuration, optionally
    /// pinning a region
    pub async fn new(region: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        let config = loader.load().await;

        Self {
            client: CloudFormationClient::new(&config),
        }
    }
}

#[async_trait]
impl StackApi for CfnClient {
    async fn create_stack(
        &self,
        stack_name: &str,
        template_body: &str,
        parameters: &[StackParameter],
    ) -> SubmitResult<StackSubmission> {
        let parameters: Vec<AwsParameter> = parameters
            .iter()
            .map(|p| {
                AwsParameter::builder()
                    .parameter_key(&p.key)
                    .parameter_value(&p.value)
                    .build()
            })
            .collect();

        let output = self
            .client
            .create_stack()
            .stack_name(stack_name)
            .template_body(template_body)
            .set_parameters(Some(parameters))
            .send()
            .await
            .map_err(|e| SubmitError::RemoteRejection(format!("{:?}", e)))?;

        Ok(StackSubmission {
            stack_id: output.stack_id().unwrap_or_default().to_string(),
        })
    }
}
