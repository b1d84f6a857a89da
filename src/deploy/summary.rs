// ABOUTME: Operator-facing report printed after a successful rollout.
// ABOUTME: Output values are printed exactly as the stack reported them.

use serde::Serialize;
use std::fmt;

use crate::cloud::StackOutputs;
use crate::config::DeployTarget;
use crate::types::ImageTag;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub environment: String,
    pub stack_name: String,
    pub region: String,
    pub image_tag: String,
    pub repository_uri: String,
    pub function_name: String,
    pub api_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<String>,
}

impl Summary {
    pub fn new(target: &DeployTarget, tag: &ImageTag, outputs: &StackOutputs) -> Self {
        Summary {
            environment: target.environment.clone(),
            stack_name: target.stack_name.to_string(),
            region: target.region.to_string(),
            image_tag: tag.to_string(),
            repository_uri: outputs.repository_uri_raw().to_string(),
            function_name: outputs.function_name().to_string(),
            api_url: outputs.api_url().to_string(),
            bucket_name: outputs.bucket_name().map(str::to_string),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Deployment summary")?;
        writeln!(f, "  Environment:      {}", self.environment)?;
        writeln!(f, "  Stack:            {}", self.stack_name)?;
        writeln!(f, "  Image tag:        {}", self.image_tag)?;
        writeln!(f, "  ECR repository:   {}", self.repository_uri)?;
        writeln!(f, "  Lambda function:  {}", self.function_name)?;
        writeln!(f, "  Webhook URL:      {}", self.api_url)?;
        if let Some(bucket) = &self.bucket_name {
            writeln!(f, "  S3 bucket:        {}", bucket)?;
        }
        writeln!(f)?;
        writeln!(f, "Next steps:")?;
        writeln!(
            f,
            "  1. Set the Slack app's Event Subscriptions Request URL to {}",
            self.api_url
        )?;
        writeln!(f, "  2. Mention the bot in a channel to test it")?;
        write!(
            f,
            "  3. Follow logs: aws logs tail /aws/lambda/{} --follow --region {}",
            self.function_name, self.region
        )
    }
}
