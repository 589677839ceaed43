use std::future::Future;

use async_trait::async_trait;
use aws_sdk_costexplorer::error::DisplayErrorContext;
use aws_sdk_costexplorer::types::{
    DateInterval, Granularity, GroupDefinition, GroupDefinitionType, ResultByTime,
};
use aws_sdk_costexplorer::Client;

use crate::core::error::{ReportError, ReportResult};
use crate::core::models::metric::CostMetric;
use crate::core::services::{BillingQueryService, CostBucket, CostQuery, CostResponse};

const SERVICE: &str = "Cost Explorer";
const SERVICE_DIMENSION: &str = "SERVICE";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Billing queries against AWS Cost Explorer `GetCostAndUsage`.
pub struct CostExplorerBilling {
    client: Client,
}

impl CostExplorerBilling {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }

    /// Fetch one page of results, returning its buckets and the token for
    /// the next page, if any.
    async fn fetch_page(
        &self,
        query: &CostQuery,
        page_token: Option<String>,
    ) -> ReportResult<(Vec<CostBucket>, Option<String>)> {
        let interval = DateInterval::builder()
            .start(query.period.start.format(DATE_FORMAT).to_string())
            .end(query.period.end.format(DATE_FORMAT).to_string())
            .build()
            .map_err(|e| ReportError::upstream(SERVICE, format!("invalid date interval: {}", e)))?;

        let mut request = self
            .client
            .get_cost_and_usage()
            .time_period(interval)
            .granularity(Granularity::Monthly)
            .metrics(query.metric.api_name())
            .set_next_page_token(page_token);

        if query.group_by_service {
            request = request.group_by(
                GroupDefinition::builder()
                    .r#type(GroupDefinitionType::Dimension)
                    .key(SERVICE_DIMENSION)
                    .build(),
            );
        }

        tracing::debug!(
            start = %query.period.start,
            end = %query.period.end,
            metric = query.metric.api_name(),
            grouped = query.group_by_service,
            "querying cost and usage"
        );

        let output = request
            .send()
            .await
            .map_err(|e| ReportError::upstream(SERVICE, DisplayErrorContext(&e).to_string()))?;

        let buckets = to_buckets(output.results_by_time(), query.metric)?;
        Ok((buckets, output.next_page_token().map(str::to_string)))
    }
}

#[async_trait]
impl BillingQueryService for CostExplorerBilling {
    async fn get_cost(&self, query: &CostQuery) -> ReportResult<CostResponse> {
        let buckets = collect_pages(move |token| self.fetch_page(query, token)).await?;
        Ok(CostResponse { buckets })
    }
}

/// Keep requesting pages until the API stops handing out a token, and
/// concatenate their buckets in page order.
async fn collect_pages<F, Fut>(mut fetch_page: F) -> ReportResult<Vec<CostBucket>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = ReportResult<(Vec<CostBucket>, Option<String>)>>,
{
    let mut buckets = Vec::new();
    let mut token = None;
    loop {
        let (page, next) = fetch_page(token).await?;
        buckets.extend(page);
        match next.filter(|t| !t.is_empty()) {
            Some(next) => {
                tracing::debug!(buckets = buckets.len(), "following next page token");
                token = Some(next);
            }
            None => return Ok(buckets),
        }
    }
}

/// Flatten Cost Explorer results into time buckets, keeping only the
/// requested metric.
fn to_buckets(results: &[ResultByTime], metric: CostMetric) -> ReportResult<Vec<CostBucket>> {
    let metric_name = metric.api_name();
    let mut buckets = Vec::with_capacity(results.len());

    for result in results {
        let total = result
            .total()
            .and_then(|t| t.get(metric_name))
            .and_then(|v| v.amount())
            .map(str::to_string);

        let mut groups = Vec::with_capacity(result.groups().len());
        for group in result.groups() {
            let service = group.keys().first().ok_or_else(|| {
                ReportError::upstream(SERVICE, "group is missing its service key")
            })?;
            let amount = group
                .metrics()
                .and_then(|m| m.get(metric_name))
                .and_then(|v| v.amount())
                .ok_or_else(|| {
                    ReportError::upstream(
                        SERVICE,
                        format!("group '{}' has no {} amount", service, metric_name),
                    )
                })?;
            groups.push((service.clone(), amount.to_string()));
        }

        buckets.push(CostBucket { total, groups });
    }

    Ok(buckets)
}
