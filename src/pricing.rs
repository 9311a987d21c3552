//! The pricing record and its derived totals.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::confirm::{self, Action, ConfirmationToken, Outcome};

pub const DEFAULT_PROFIT_MARGIN: f64 = 20.0;
pub const DEFAULT_TAX_RATE: f64 = 5.0;
const MAX_PERCENT: f64 = 100.0;
/// Upper bound for any single amount. Products of two amounts stay finite.
pub const MAX_AMOUNT: f64 = 1e12;

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Clamps an edited amount into `0..=MAX_AMOUNT`. Non-finite input becomes 0.
pub fn clamp_amount(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, MAX_AMOUNT)
    } else {
        0.0
    }
}

/// Clamps an edited percentage into `0..=100`.
pub fn clamp_percent(value: f64) -> f64 {
    clamp_amount(value).min(MAX_PERCENT)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub unit_price: f64,
}

impl MaterialItem {
    /// A new line item with a fresh id. Numbers are clamped.
    pub fn new(name: impl Into<String>, quantity: f64, unit_price: f64) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            quantity: clamp_amount(quantity),
            unit_price: clamp_amount(unit_price),
        }
    }

    pub fn line_total(&self) -> f64 {
        self.quantity * self.unit_price
    }

    pub(crate) fn apply(&mut self, patch: &MaterialPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = clamp_amount(quantity);
        }
        if let Some(unit_price) = patch.unit_price {
            self.unit_price = clamp_amount(unit_price);
        }
    }

    fn normalize(&mut self) {
        if self.id.trim().is_empty() {
            self.id = new_id();
        }
        self.quantity = clamp_amount(self.quantity);
        self.unit_price = clamp_amount(self.unit_price);
    }
}

/// Partial update for a [`MaterialItem`]. `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialPatch {
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
}

impl MaterialPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn quantity(quantity: f64) -> Self {
        Self {
            quantity: Some(quantity),
            ..Default::default()
        }
    }

    pub fn unit_price(unit_price: f64) -> Self {
        Self {
            unit_price: Some(unit_price),
            ..Default::default()
        }
    }
}

/// Everything the calculator prices. Numeric fields stay finite and
/// non-negative; margin and tax are percentages in `0..=100`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingState {
    materials: Vec<MaterialItem>,
    labor_rate: f64,
    labor_hours: f64,
    fixed_labor: f64,
    profit_margin: f64,
    tax_rate: f64,
}

impl Default for PricingState {
    fn default() -> Self {
        Self {
            materials: vec![],
            labor_rate: 0.0,
            labor_hours: 0.0,
            fixed_labor: 0.0,
            profit_margin: DEFAULT_PROFIT_MARGIN,
            tax_rate: DEFAULT_TAX_RATE,
        }
    }
}

/// Derived amounts. Recomputed on demand, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub materials_total: f64,
    pub labor_total: f64,
    pub subtotal: f64,
    pub profit_amount: f64,
    pub total_with_profit: f64,
    pub tax_amount: f64,
    pub final_price: f64,
}

impl PricingState {
    pub fn materials(&self) -> &[MaterialItem] {
        &self.materials
    }

    pub fn material(&self, id: &str) -> Option<&MaterialItem> {
        self.materials.iter().find(|m| m.id == id)
    }

    pub fn labor_rate(&self) -> f64 {
        self.labor_rate
    }

    pub fn labor_hours(&self) -> f64 {
        self.labor_hours
    }

    pub fn fixed_labor(&self) -> f64 {
        self.fixed_labor
    }

    pub fn profit_margin(&self) -> f64 {
        self.profit_margin
    }

    pub fn tax_rate(&self) -> f64 {
        self.tax_rate
    }

    pub fn set_labor_rate(&mut self, value: f64) {
        self.labor_rate = clamp_amount(value);
    }

    pub fn set_labor_hours(&mut self, value: f64) {
        self.labor_hours = clamp_amount(value);
    }

    pub fn set_fixed_labor(&mut self, value: f64) {
        self.fixed_labor = clamp_amount(value);
    }

    pub fn set_profit_margin(&mut self, value: f64) {
        self.profit_margin = clamp_percent(value);
    }

    pub fn set_tax_rate(&mut self, value: f64) {
        self.tax_rate = clamp_percent(value);
    }

    /// Appends an empty line item (quantity 1, price 0) and returns its id.
    pub fn add_material(&mut self) -> String {
        let item = MaterialItem::new("", 1.0, 0.0);
        let id = item.id.clone();
        self.materials.push(item);
        debug!(%id, "material added");
        id
    }

    pub(crate) fn extend_materials(&mut self, items: impl IntoIterator<Item = MaterialItem>) {
        self.materials.extend(items);
    }

    /// Returns `false` when no item has `id`.
    pub fn update_material(&mut self, id: &str, patch: &MaterialPatch) -> bool {
        match self.materials.iter_mut().find(|m| m.id == id) {
            Some(item) => {
                item.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Returns `false` when no item has `id`.
    pub fn remove_material(&mut self, id: &str) -> bool {
        let before = self.materials.len();
        self.materials.retain(|m| m.id != id);
        let removed = self.materials.len() != before;
        if removed {
            debug!(%id, "material removed");
        }
        removed
    }

    /// Replaces the whole record with defaults, once confirmed.
    pub fn reset_all(&mut self, confirm: Option<&ConfirmationToken>) -> Outcome<()> {
        confirm::guarded(Action::ResetAll, confirm, || {
            *self = Self::default();
            info!("pricing state reset");
        })
    }

    pub fn totals(&self) -> Totals {
        let materials_total = self.materials.iter().map(MaterialItem::line_total).sum::<f64>();
        let labor_total = self.labor_rate * self.labor_hours + self.fixed_labor;
        let subtotal = materials_total + labor_total;
        let profit_amount = subtotal * (self.profit_margin / 100.0);
        let total_with_profit = subtotal + profit_amount;
        let tax_amount = total_with_profit * (self.tax_rate / 100.0);
        let final_price = total_with_profit + tax_amount;

        Totals {
            materials_total,
            labor_total,
            subtotal,
            profit_amount,
            total_with_profit,
            tax_amount,
            final_price,
        }
    }

    /// Brings a record read from storage back inside the invariants.
    pub(crate) fn normalize(&mut self) {
        for item in &mut self.materials {
            item.normalize();
        }
        self.labor_rate = clamp_amount(self.labor_rate);
        self.labor_hours = clamp_amount(self.labor_hours);
        self.fixed_labor = clamp_amount(self.fixed_labor);
        self.profit_margin = clamp_percent(self.profit_margin);
        self.tax_rate = clamp_percent(self.tax_rate);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    pub(crate) fn sample_state() -> PricingState {
        let mut state = PricingState::default();
        let id = state.add_material();
        state.update_material(
            &id,
            &MaterialPatch {
                name: Some("Timber".into()),
                quantity: Some(2.0),
                unit_price: Some(50.0),
            },
        );
        state.set_labor_rate(20.0);
        state.set_labor_hours(5.0);
        state
    }

    #[test]
    fn worked_example_totals() {
        let totals = sample_state().totals();
        assert_close(totals.materials_total, 100.0);
        assert_close(totals.labor_total, 100.0);
        assert_close(totals.subtotal, 200.0);
        assert_close(totals.profit_amount, 40.0);
        assert_close(totals.total_with_profit, 240.0);
        assert_close(totals.tax_amount, 12.0);
        assert_close(totals.final_price, 252.0);
    }

    #[test]
    fn all_zero_prices_to_zero() {
        let mut state = PricingState::default();
        state.set_profit_margin(0.0);
        state.set_tax_rate(0.0);
        assert_eq!(state.totals(), Totals::default());
    }

    #[test]
    fn tax_applies_after_margin() {
        let mut state = PricingState::default();
        state.set_fixed_labor(100.0);
        state.set_profit_margin(10.0);
        state.set_tax_rate(10.0);
        assert_close(state.totals().final_price, 121.0);
    }

    #[test]
    fn final_price_dominates_components() {
        let amounts = [0.0, 0.5, 3.0, 17.25, 1000.0];
        let percents = [0.0, 5.0, 20.0, 100.0];
        for &qty in &amounts {
            for &rate in &amounts {
                for &pct in &percents {
                    let mut state = PricingState::default();
                    let id = state.add_material();
                    state.update_material(
                        &id,
                        &MaterialPatch {
                            quantity: Some(qty),
                            unit_price: Some(rate),
                            ..Default::default()
                        },
                    );
                    state.set_labor_rate(rate);
                    state.set_labor_hours(qty);
                    state.set_fixed_labor(rate);
                    state.set_profit_margin(pct);
                    state.set_tax_rate(pct);

                    let t = state.totals();
                    assert!(t.final_price >= t.subtotal);
                    assert!(t.subtotal >= t.materials_total);
                    assert!(t.subtotal >= t.labor_total);
                }
            }
        }
    }

    #[test]
    fn extreme_amounts_keep_totals_finite() {
        let mut state = PricingState::default();
        let id = state.add_material();
        state.update_material(
            &id,
            &MaterialPatch {
                quantity: Some(1e200),
                unit_price: Some(f64::MAX),
                ..Default::default()
            },
        );
        state.set_labor_rate(1e200);
        state.set_labor_hours(1e200);
        state.set_fixed_labor(1e300);
        state.set_profit_margin(0.0);
        state.set_tax_rate(0.0);

        assert_eq!(state.labor_rate(), MAX_AMOUNT);
        let t = state.totals();
        assert!(t.final_price.is_finite());
        assert!(t.final_price >= t.subtotal);
        assert!(t.subtotal >= t.materials_total);
        assert!(t.subtotal >= t.labor_total);
    }

    #[test]
    fn add_then_remove_restores_materials() {
        let mut state = sample_state();
        let before = state.materials().to_vec();

        let id = state.add_material();
        let added = state.material(&id).cloned();
        assert_eq!(
            added.map(|m| (m.name, m.quantity, m.unit_price)),
            Some((String::new(), 1.0, 0.0))
        );

        assert!(state.remove_material(&id));
        assert_eq!(state.materials(), before.as_slice());
    }

    #[test]
    fn update_touches_only_named_fields() {
        let mut state = sample_state();
        let id = state.materials()[0].id.clone();

        assert!(state.update_material(&id, &MaterialPatch::unit_price(12.5)));
        let item = &state.materials()[0];
        assert_eq!(item.name, "Timber");
        assert_eq!(item.quantity, 2.0);
        assert_eq!(item.unit_price, 12.5);
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        let mut state = sample_state();
        let before = state.clone();
        assert!(!state.update_material("missing", &MaterialPatch::name("x")));
        assert!(!state.remove_material("missing"));
        assert_eq!(state, before);
    }

    #[test]
    fn edits_are_clamped() {
        let mut state = PricingState::default();
        let id = state.add_material();
        state.update_material(
            &id,
            &MaterialPatch {
                quantity: Some(-4.0),
                unit_price: Some(f64::NAN),
                ..Default::default()
            },
        );
        state.set_labor_rate(f64::INFINITY);
        state.set_profit_margin(250.0);
        state.set_tax_rate(-1.0);

        assert_eq!(state.materials()[0].quantity, 0.0);
        assert_eq!(state.materials()[0].unit_price, 0.0);
        assert_eq!(state.labor_rate(), 0.0);
        assert_eq!(state.profit_margin(), 100.0);
        assert_eq!(state.tax_rate(), 0.0);
    }

    #[test]
    fn reset_needs_confirmation() {
        let mut state = sample_state();
        let before = state.clone();

        let outcome = state.reset_all(None);
        assert_eq!(state, before);
        let token = outcome.token().cloned();
        assert!(token.is_some());

        assert!(state.reset_all(token.as_ref()).is_applied());
        assert!(state.materials().is_empty());
        assert_eq!(state.labor_rate(), 0.0);
        assert_eq!(state.labor_hours(), 0.0);
        assert_eq!(state.fixed_labor(), 0.0);
        assert_eq!(state.profit_margin(), 20.0);
        assert_eq!(state.tax_rate(), 5.0);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(sample_state()).unwrap();
        assert_eq!(json["laborRate"], 20.0);
        assert_eq!(json["profitMargin"], 20.0);
        assert_eq!(json["materials"][0]["unitPrice"], 50.0);
    }

    #[test]
    fn normalize_repairs_out_of_range_payload() {
        let json = r#"{"materials":[{"id":"","name":"x","quantity":-1,"unitPrice":3}],
            "laborRate":-5,"profitMargin":140}"#;
        let mut state: PricingState = serde_json::from_str(json).unwrap();
        state.normalize();

        assert!(!state.materials()[0].id.is_empty());
        assert_eq!(state.materials()[0].quantity, 0.0);
        assert_eq!(state.labor_rate(), 0.0);
        assert_eq!(state.profit_margin(), 100.0);
        assert_eq!(state.tax_rate(), DEFAULT_TAX_RATE);
    }
}
