//! The autoscaling service template
//!
//! One launch configuration and one autoscaling group, wired together with
//! parameter references. Account-specific values (AMI, key pair, security
//! group, subnets, availability zones) are template parameters supplied at
//! deploy time, never embedded here.

use cirrus_core::{
    AutoScalingRollingUpdate, Parameter, ParameterType, PropertyValue, Resource, ResourceKind,
    Template, TemplateError, UpdatePolicy,
};
use serde_json::json;

/// Build the autoscaling service template.
///
/// The boot script calls cfn-signal so the group's rolling update (which
/// waits on resource signals) can complete.
pub fn service_template(instance_type: &str) -> Result<Template, TemplateError> {
    let mut template = Template::new();
    template.set_description("Configures autoscaling group");

    let security_group = template.add_parameter(
        Parameter::string("SecurityGroup").with_description("Security Group ID"),
    )?;
    let key_name = template.add_parameter(
        Parameter::string("KeyName")
            .with_description("Name of an existing EC2 KeyPair to enable SSH access")
            .with_min_length(1)
            .with_max_length(255)
            .with_allowed_pattern("[\\x20-\\x7E]*")
            .with_constraint_description("can contain only ASCII characters."),
    )?;
    let scale_capacity = template.add_parameter(
        Parameter::string("ScaleCapacity")
            .with_default("1")
            .with_description("Number of api servers to run"),
    )?;
    let ami_id = template.add_parameter(
        Parameter::string("AmiId").with_description("The AMI id for the api instances"),
    )?;
    let availability_zones = template.add_parameter(
        Parameter::new("VPCAvailabilityZones", ParameterType::AvailabilityZoneList)
            .with_description("First availability zone"),
    )?;
    template.add_parameter(
        Parameter::string("StackName").with_description("The root stack name"),
    )?;
    let subnet_ids = template.add_parameter(
        Parameter::new("SubnetIDs", ParameterType::SubnetIdList)
            .with_description("Second private VPC subnet ID for the api app."),
    )?;

    let launch_configuration = template.add_resource(
        "LaunchConfiguration",
        Resource::new(ResourceKind::LaunchConfiguration)
            .with_metadata(json!({
                "AWS::CloudFormation::Init": {
                    "config": {
                        "packages": {
                            "apt": {
                                "python-pip": [],
                                "p7zip-full": []
                            },
                            "pip": {
                                "awscli": []
                            }
                        }
                    }
                }
            }))
            .with_property("UserData", boot_script())
            .with_property("ImageId", ami_id.reference())
            .with_property("KeyName", key_name.reference())
            .with_property(
                "BlockDeviceMappings",
                PropertyValue::List(vec![PropertyValue::object([
                    ("DeviceName", "/dev/sda1".into()),
                    (
                        "Ebs",
                        PropertyValue::object([("VolumeSize", PropertyValue::Int(8))]),
                    ),
                ])]),
            )
            .with_property(
                "SecurityGroups",
                PropertyValue::List(vec![security_group.reference()]),
            )
            .with_property("InstanceType", instance_type.into()),
    )?;

    template.add_resource(
        "AutoscalingGroup",
        Resource::new(ResourceKind::AutoScalingGroup)
            .with_property("DesiredCapacity", scale_capacity.reference())
            .with_property("LaunchConfigurationName", launch_configuration.reference())
            .with_property("MinSize", scale_capacity.reference())
            .with_property("MaxSize", scale_capacity.reference())
            .with_property("VPCZoneIdentifier", subnet_ids.reference())
            .with_property("AvailabilityZones", availability_zones.reference())
            .with_property("HealthCheckType", "EC2".into())
            .with_update_policy(UpdatePolicy::rolling(AutoScalingRollingUpdate {
                pause_time: Some("PT5M".to_string()),
                min_instances_in_service: Some(1),
                max_batch_size: Some(1),
                wait_on_resource_signals: true,
            })),
    )?;

    Ok(template)
}

/// Shell payload for the launch configuration. Opaque text interleaved with
/// references CloudFormation substitutes at instance boot.
fn boot_script() -> PropertyValue {
    PropertyValue::base64(PropertyValue::join(
        "",
        vec![
            "#!/bin/bash\n".into(),
            "cfn-signal -e 0".into(),
            "    --resource AutoscalingGroup".into(),
            "    --stack ".into(),
            PropertyValue::pseudo("AWS::StackName"),
            "    --region ".into(),
            PropertyValue::pseudo("AWS::Region"),
            "\n".into(),
        ],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_declares_the_expected_parameters() {
        let template = service_template("m3.medium").unwrap();
        let names: Vec<&str> = template.parameters().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "AmiId",
                "KeyName",
                "ScaleCapacity",
                "SecurityGroup",
                "StackName",
                "SubnetIDs",
                "VPCAvailabilityZones",
            ]
        );
    }

    #[test]
    fn test_signal_wiring_is_consistent() {
        // WaitOnResourceSignals and the cfn-signal boot line must move
        // together, or the rolling update hangs
        let template = service_template("m3.medium").unwrap();
        template.check_signal_wiring().unwrap();
    }

    #[test]
    fn test_rendered_template_round_trips() {
        let template = service_template("m3.medium").unwrap();
        let body = template.to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body, serde_json::to_string_pretty(&parsed).unwrap());
    }

    #[test]
    fn test_group_references_resolve_in_document() {
        let template = service_template("m3.medium").unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(&template.to_json().unwrap()).unwrap();
        let group = &parsed["Resources"]["AutoscalingGroup"];
        assert_eq!(group["Type"], "AWS::AutoScaling::AutoScalingGroup");
        assert_eq!(
            group["Properties"]["LaunchConfigurationName"],
            json!({ "Ref": "LaunchConfiguration" })
        );
        assert_eq!(
            group["UpdatePolicy"]["AutoScalingRollingUpdate"]["WaitOnResourceSignals"],
            json!(true)
        );
    }
}
