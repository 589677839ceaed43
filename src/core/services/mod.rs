//! Collaborators the report job talks to.
//!
//! Each concern is a trait so the job can be exercised with in-memory fakes;
//! the AWS and webhook implementations live in the submodules.

pub mod cost_explorer;
pub mod parameter_store;
pub mod sts;
pub mod webhook;

use async_trait::async_trait;

use crate::core::error::ReportResult;
use crate::core::models::message::ChatMessage;
use crate::core::models::metric::CostMetric;
use crate::core::period::BillingPeriod;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostQuery {
    pub period: BillingPeriod,
    pub metric: CostMetric,
    pub group_by_service: bool,
}

/// One time slice of a cost response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CostBucket {
    /// Ungrouped amount for the requested metric, if the API returned one.
    pub total: Option<String>,
    /// `(service name, amount)` pairs in API order.
    pub groups: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CostResponse {
    pub buckets: Vec<CostBucket>,
}

#[async_trait]
pub trait BillingQueryService: Send + Sync {
    async fn get_cost(&self, query: &CostQuery) -> ReportResult<CostResponse>;
}

#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn account_id(&self) -> ReportResult<String>;
}

#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get_secret(&self, name: &str) -> ReportResult<String>;
}

#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn post(&self, webhook_url: &str, message: &ChatMessage) -> ReportResult<()>;
}

/// Shared AWS configuration: default credential chain, explicit region.
pub async fn load_aws_config(region: &str) -> aws_config::SdkConfig {
    aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_string()))
        .load()
        .await
}
