use serde::{Deserialize, Serialize};

/// Accounting method used for a cost figure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostMetric {
    #[default]
    Unblended,
    Amortized,
}

impl CostMetric {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "unblended" | "unblendedcost" | "unblended_cost" => Some(Self::Unblended),
            "amortized" | "amortizedcost" | "amortized_cost" => Some(Self::Amortized),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Unblended => "unblended",
            Self::Amortized => "amortized",
        }
    }

    /// Metric name as the Cost Explorer API expects it.
    pub fn api_name(&self) -> &'static str {
        match self {
            Self::Unblended => "UnblendedCost",
            Self::Amortized => "AmortizedCost",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Unblended => "Unblended",
            Self::Amortized => "Amortized",
        }
    }

    pub fn all() -> &'static [CostMetric] {
        &[CostMetric::Unblended, CostMetric::Amortized]
    }
}
