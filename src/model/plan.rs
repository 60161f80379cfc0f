//! Campaign support plans.

use std::cmp::Ordering;

use serde::{Deserialize, Deserializer, Serialize};

use super::{Record, cmp_timestamps};

pub const PLANS_TABLE: &str = "campaign_plans";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CampaignPlan {
    pub id: String,
    pub campaign_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Monthly price in currency units.
    pub price: f64,
    #[serde(default, deserialize_with = "deserialize_benefits")]
    pub benefits: Vec<String>,
    pub created_at: String,
}

impl Record for CampaignPlan {
    fn id(&self) -> &str {
        &self.id
    }

    /// Cheapest first.
    fn display_order(a: &Self, b: &Self) -> Ordering {
        a.price
            .total_cmp(&b.price)
            .then_with(|| cmp_timestamps(&a.created_at, &b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    }
}

/// A validated plan payload, produced by [`crate::forms::PlanForm::validate`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlanInput {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub benefits: Vec<String>,
}

#[derive(Serialize)]
pub(crate) struct NewPlanRow<'a> {
    pub campaign_id: &'a str,
    #[serde(flatten)]
    pub input: &'a PlanInput,
}

fn deserialize_benefits<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
