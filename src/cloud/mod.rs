// ABOUTME: Cloud provider capability traits and their `aws` CLI implementation.
// ABOUTME: Defines IdentityOps, RegistryOps, StackOps and FunctionOps.

mod aws_cli;
mod function;
mod identity;
mod registry;
mod stack;

pub use aws_cli::{AWS_PROGRAM, AwsCli, AwsCliError};
pub use function::{FunctionError, FunctionOps, FunctionUpdateStatus};
pub use identity::{CallerIdentity, IdentityError, IdentityOps};
pub use registry::{RegistryError, RegistryOps};
pub use stack::{
    CAPABILITY_NAMED_IAM, OUTPUT_API_URL, OUTPUT_BUCKET_NAME, OUTPUT_FUNCTION_NAME,
    OUTPUT_REPOSITORY_URI, ParameterValue, REQUIRED_OUTPUTS, StackChange, StackDeployment,
    StackError, StackOps, StackOutputs,
};

/// Every cloud capability the deployment pipeline needs.
///
/// Automatically implemented for any type that implements all capability traits.
pub trait CloudProvider: IdentityOps + RegistryOps + StackOps + FunctionOps {}

impl<T> CloudProvider for T where T: IdentityOps + RegistryOps + StackOps + FunctionOps {}
