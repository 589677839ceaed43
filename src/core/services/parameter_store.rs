use async_trait::async_trait;
use aws_sdk_ssm::error::DisplayErrorContext;
use aws_sdk_ssm::Client;

use crate::core::error::{ReportError, ReportResult};
use crate::core::services::SecretStore;

const SERVICE: &str = "SSM Parameter Store";

/// Reads decrypted `SecureString` parameters from SSM Parameter Store.
pub struct SsmParameterStore {
    client: Client,
}

impl SsmParameterStore {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl SecretStore for SsmParameterStore {
    async fn get_secret(&self, name: &str) -> ReportResult<String> {
        let output = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await
            .map_err(|e| {
                ReportError::upstream(
                    SERVICE,
                    format!("parameter '{}': {}", name, DisplayErrorContext(&e)),
                )
            })?;

        let value = output
            .parameter()
            .and_then(|p| p.value())
            .ok_or_else(|| {
                ReportError::upstream(SERVICE, format!("parameter '{}' has no value", name))
            })?;

        if value.trim().is_empty() {
            return Err(ReportError::upstream(
                SERVICE,
                format!("parameter '{}' is empty", name),
            ));
        }

        Ok(value.to_string())
    }
}
