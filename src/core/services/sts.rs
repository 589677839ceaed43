use async_trait::async_trait;
use aws_sdk_sts::error::DisplayErrorContext;
use aws_sdk_sts::Client;

use crate::core::error::{ReportError, ReportResult};
use crate::core::services::IdentityService;

const SERVICE: &str = "STS";

/// Resolves the account id of the calling credentials.
pub struct StsIdentity {
    client: Client,
}

impl StsIdentity {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl IdentityService for StsIdentity {
    async fn account_id(&self) -> ReportResult<String> {
        let output = self
            .client
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| ReportError::upstream(SERVICE, DisplayErrorContext(&e).to_string()))?;

        output
            .account()
            .map(str::to_string)
            .ok_or_else(|| ReportError::upstream(SERVICE, "caller identity has no account"))
    }
}
