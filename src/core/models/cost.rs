use serde::{Deserialize, Serialize};

use crate::core::models::metric::CostMetric;
use crate::core::period::BillingPeriod;

/// Headline figure for a period. `amount` is passed through exactly as the
/// billing API returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalCost {
    pub period: BillingPeriod,
    pub amount: String,
    pub metric: CostMetric,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCostEntry {
    pub service_name: String,
    pub amount: String,
}

/// Per-service costs, sorted by service name (byte order) with no duplicates.
pub type ServiceCostSummary = Vec<ServiceCostEntry>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub account_id: String,
    /// Period the message displays (the total's window).
    pub period: BillingPeriod,
    pub total: TotalCost,
    pub services: ServiceCostSummary,
}

impl Report {
    pub fn new(account_id: String, total: TotalCost, services: ServiceCostSummary) -> Self {
        Self {
            account_id,
            period: total.period,
            total,
            services,
        }
    }
}
