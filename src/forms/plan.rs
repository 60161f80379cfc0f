//! Plan create/edit form.

use crate::error::ApiError;
use crate::model::{CampaignPlan, PlanInput};

#[cfg(test)]
#[path = "plan_test.rs"]
mod plan_test;

/// Editable benefit rows. Always holds at least one (possibly empty) row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BenefitRows {
    rows: Vec<String>,
}

impl BenefitRows {
    #[must_use]
    pub fn new() -> Self {
        Self { rows: vec![String::new()] }
    }

    #[must_use]
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn add(&mut self) {
        self.rows.push(String::new());
    }

    /// Remove a row. The last remaining row cannot be removed.
    pub fn remove(&mut self, index: usize) -> bool {
        if self.rows.len() <= 1 || index >= self.rows.len() {
            return false;
        }
        self.rows.remove(index);
        true
    }

    pub fn set(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                *row = value.into();
                true
            }
            None => false,
        }
    }

    /// Rows as persisted: blank entries dropped, order kept.
    #[must_use]
    pub fn persisted(&self) -> Vec<String> {
        self.rows.iter().filter(|b| !b.trim().is_empty()).cloned().collect()
    }
}

impl Default for BenefitRows {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<String>> for BenefitRows {
    fn from(rows: Vec<String>) -> Self {
        if rows.is_empty() { Self::new() } else { Self { rows } }
    }
}

impl<const N: usize> From<[&str; N]> for BenefitRows {
    fn from(rows: [&str; N]) -> Self {
        Self::from(rows.iter().map(|r| (*r).to_string()).collect::<Vec<_>>())
    }
}

/// Raw plan input as typed by the user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlanForm {
    pub name: String,
    pub description: String,
    /// Price as typed, e.g. `"10.00"`.
    pub price: String,
    pub benefits: BenefitRows,
}

impl PlanForm {
    /// Pre-populate an edit form from a stored plan.
    #[must_use]
    pub fn from_plan(plan: &CampaignPlan) -> Self {
        Self {
            name: plan.name.clone(),
            description: plan.description.clone().unwrap_or_default(),
            price: plan.price.to_string(),
            benefits: BenefitRows::from(plan.benefits.clone()),
        }
    }

    /// Mirrors the dialog's submit button: enabled once name and price are filled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.name.trim().is_empty() && !self.price.trim().is_empty()
    }

    /// # Errors
    ///
    /// Returns `Validation` for an empty name or a missing, non-numeric or
    /// non-positive price.
    pub fn validate(&self) -> Result<PlanInput, ApiError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ApiError::validation("plan name is required"));
        }
        let price = parse_price(&self.price)?;
        Ok(PlanInput {
            name: name.to_string(),
            description: self.description.trim().to_string(),
            price,
            benefits: self.benefits.persisted(),
        })
    }
}

/// Parse a monthly price in currency units. Must be finite and above zero.
///
/// # Errors
///
/// Returns `Validation` describing what is wrong with `raw`.
pub fn parse_price(raw: &str) -> Result<f64, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ApiError::validation("price is required"));
    }
    let price: f64 = raw
        .parse()
        .map_err(|_| ApiError::validation(format!("price must be a number, got '{raw}'")))?;
    if !price.is_finite() || price <= 0.0 {
        return Err(ApiError::validation("price must be greater than zero"));
    }
    Ok(price)
}
