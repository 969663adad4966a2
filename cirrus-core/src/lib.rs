//! Cirrus Core
//!
//! Document model for CloudFormation templates: parameters, the two resource
//! kinds this tool provisions (launch configuration and autoscaling group),
//! and deterministic JSON serialization. No network or file I/O happens here;
//! submitting the rendered document is the provider crate's job.

pub mod error;
pub mod parameter;
pub mod schema;
pub mod template;
pub mod value;

pub use error::TemplateError;
pub use parameter::{Parameter, ParameterType};
pub use schema::ResourceKind;
pub use template::{
    AutoScalingRollingUpdate, ParameterHandle, Resource, ResourceHandle, Template, UpdatePolicy,
};
pub use value::{PropertyValue, Reference};
