use std::collections::BTreeMap;

use crate::core::error::{ReportError, ReportResult};
use crate::core::models::cost::{ServiceCostEntry, ServiceCostSummary, TotalCost};
use crate::core::models::metric::CostMetric;
use crate::core::period::{BillingPeriod, ReportWindows};
use crate::core::services::{BillingQueryService, CostBucket, CostQuery};

const SERVICE: &str = "Cost Explorer";

/// Total plus per-service breakdown for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedCosts {
    pub total: TotalCost,
    pub services: ServiceCostSummary,
}

/// Query the total, then the per-service breakdown. The queries run one
/// after the other and the first failure aborts the whole aggregation.
pub async fn aggregate(
    billing: &dyn BillingQueryService,
    windows: &ReportWindows,
    metric: CostMetric,
) -> ReportResult<AggregatedCosts> {
    let total = fetch_total(billing, windows.total, metric).await?;
    let services = fetch_services(billing, windows.services, metric).await?;
    Ok(AggregatedCosts { total, services })
}

pub async fn fetch_total(
    billing: &dyn BillingQueryService,
    period: BillingPeriod,
    metric: CostMetric,
) -> ReportResult<TotalCost> {
    let query = CostQuery {
        period,
        metric,
        group_by_service: false,
    };
    let response = billing.get_cost(&query).await?;

    let bucket = response
        .buckets
        .first()
        .ok_or_else(|| ReportError::upstream(SERVICE, "response has no results"))?;
    let amount = bucket.total.clone().ok_or_else(|| {
        ReportError::upstream(
            SERVICE,
            format!("result is missing the {} total", metric.api_name()),
        )
    })?;

    tracing::info!(
        start = %period.start,
        end = %period.end,
        metric = metric.api_name(),
        amount = %amount,
        "fetched total cost"
    );

    Ok(TotalCost {
        period,
        amount,
        metric,
    })
}

pub async fn fetch_services(
    billing: &dyn BillingQueryService,
    period: BillingPeriod,
    metric: CostMetric,
) -> ReportResult<ServiceCostSummary> {
    let query = CostQuery {
        period,
        metric,
        group_by_service: true,
    };
    let response = billing.get_cost(&query).await?;
    let summary = summarize(&response.buckets);

    tracing::info!(
        start = %period.start,
        end = %period.end,
        services = summary.len(),
        "fetched per-service costs"
    );

    Ok(summary)
}

/// Merge groups across buckets by service name and order them by name.
///
/// A later bucket overwrites an earlier one for the same service. Monthly
/// granularity over a window of at most two calendar months means a service
/// only repeats when the window straddles a month boundary, and then the
/// later month is the one being reported on.
pub fn summarize(buckets: &[CostBucket]) -> ServiceCostSummary {
    let mut merged: BTreeMap<&str, &str> = BTreeMap::new();
    for bucket in buckets {
        for (service, amount) in &bucket.groups {
            merged.insert(service.as_str(), amount.as_str());
        }
    }

    merged
        .into_iter()
        .map(|(service, amount)| ServiceCostEntry {
            service_name: service.to_string(),
            amount: amount.to_string(),
        })
        .collect()
}
