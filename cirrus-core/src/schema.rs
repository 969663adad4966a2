//! Per-kind property schemas
//!
//! The two resource kinds this tool provisions form a closed set with field
//! shapes known at build time. Unknown property names are rejected here so a
//! bad document fails at construction instead of far downstream in the
//! CloudFormation validator. Property values are not checked locally.

use crate::error::TemplateError;

/// The resource kinds a template may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    LaunchConfiguration,
    AutoScalingGroup,
}

/// Property-name table for one resource kind
#[derive(Debug)]
pub struct FieldSchema {
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
}

impl FieldSchema {
    pub fn allows(&self, field: &str) -> bool {
        self.required.iter().any(|f| *f == field) || self.optional.iter().any(|f| *f == field)
    }
}

const LAUNCH_CONFIGURATION_SCHEMA: FieldSchema = FieldSchema {
    required: &["ImageId", "InstanceType"],
    optional: &[
        "AssociatePublicIpAddress",
        "BlockDeviceMappings",
        "EbsOptimized",
        "IamInstanceProfile",
        "InstanceMonitoring",
        "KeyName",
        "PlacementTenancy",
        "SecurityGroups",
        "SpotPrice",
        "UserData",
    ],
};

const AUTO_SCALING_GROUP_SCHEMA: FieldSchema = FieldSchema {
    required: &["MinSize", "MaxSize"],
    optional: &[
        "AvailabilityZones",
        "Cooldown",
        "DesiredCapacity",
        "HealthCheckGracePeriod",
        "HealthCheckType",
        "LaunchConfigurationName",
        "LoadBalancerNames",
        "Tags",
        "TerminationPolicies",
        "VPCZoneIdentifier",
    ],
};

impl ResourceKind {
    /// CloudFormation type name
    pub fn type_name(&self) -> &'static str {
        match self {
            ResourceKind::LaunchConfiguration => "AWS::AutoScaling::LaunchConfiguration",
            ResourceKind::AutoScalingGroup => "AWS::AutoScaling::AutoScalingGroup",
        }
    }

    pub fn schema(&self) -> &'static FieldSchema {
        match self {
            ResourceKind::LaunchConfiguration => &LAUNCH_CONFIGURATION_SCHEMA,
            ResourceKind::AutoScalingGroup => &AUTO_SCALING_GROUP_SCHEMA,
        }
    }

    /// Check declared property names against this kind's schema
    pub fn check_fields<'a, I>(&self, fields: I) -> Result<(), TemplateError>
    where
        I: Iterator<Item = &'a str> + Clone,
    {
        let schema = self.schema();
        for field in fields.clone() {
            if !schema.allows(field) {
                return Err(TemplateError::UnsupportedField {
                    kind: self.type_name(),
                    field: field.to_string(),
                });
            }
        }
        for required in schema.required {
            if !fields.clone().any(|field| field == *required) {
                return Err(TemplateError::MissingField {
                    kind: self.type_name(),
                    field: required,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = ResourceKind::LaunchConfiguration
            .check_fields(["ImageId", "InstanceType", "FlavorText"].into_iter())
            .unwrap_err();
        assert!(matches!(
            err,
            TemplateError::UnsupportedField { field, .. } if field == "FlavorText"
        ));
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let err = ResourceKind::AutoScalingGroup
            .check_fields(["MinSize"].into_iter())
            .unwrap_err();
        assert!(matches!(
            err,
            TemplateError::MissingField { field: "MaxSize", .. }
        ));
    }

    #[test]
    fn test_full_launch_configuration_shape_passes() {
        ResourceKind::LaunchConfiguration
            .check_fields(
                ["ImageId", "InstanceType", "KeyName", "SecurityGroups", "UserData"].into_iter(),
            )
            .unwrap();
    }
}
