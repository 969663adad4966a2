//! Cirrus CloudFormation Provider
//!
//! Submits a rendered template document as a CloudFormation stack. One
//! remote operation is consumed: create-stack. No retry, no polling for
//! completion, no interpretation of remote failures.
//!
//! ## Module Structure
//!
//! - `api` - The remote API seam (`StackApi`) and submission error types
//! - `client` - Real client over the AWS SDK
//! - `submit` - Pre-flight checks and parameter flattening

pub mod api;
pub mod client;
pub mod submit;

pub use api::{StackApi, StackParameter, StackSubmission, SubmitError};
pub use client::CfnClient;
pub use submit::{submit, submit_template};
