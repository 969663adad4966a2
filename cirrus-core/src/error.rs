//! Build-time errors for template construction

use thiserror::Error;

/// Errors raised while building or rendering a template document.
///
/// Every variant is fatal to the failing call only: a failed `add_parameter`
/// or `add_resource` leaves the document exactly as it was.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A parameter or resource with this logical name is already declared
    #[error("logical name already declared in this template: {name}")]
    DuplicateName { name: String },

    /// A reference points at a different document, or at a name that does not
    /// exist in this one
    #[error("reference does not resolve in this template: {target}")]
    CrossDocumentReference { target: String },

    /// A property name outside the resource kind's schema
    #[error("{kind} does not support property {field}")]
    UnsupportedField { kind: &'static str, field: String },

    /// A required property is absent
    #[error("{kind} requires property {field}")]
    MissingField { kind: &'static str, field: &'static str },

    /// An autoscaling group waits on resource signals but nothing in the
    /// launch configuration's user data sends one
    #[error(
        "update policy of {group} waits on resource signals, but its launch \
         configuration user data never calls cfn-signal"
    )]
    UnsignaledRollingUpdate { group: String },

    /// JSON rendering failure
    #[error("failed to serialize template: {0}")]
    Serialization(String),
}
