//! Pending materials proposed by the estimation collaborator.
//!
//! A batch sits in the [`SuggestionTray`] until the user accepts it (merged
//! into the active state) or dismisses it. Starting a new request clears it.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::pricing::{clamp_amount, clamp_percent, MaterialItem, MaterialPatch, PricingState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedMaterial {
    pub name: String,
    pub quantity: f64,
    pub unit_price: f64,
}

/// What the estimation collaborator answers with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EstimatePayload {
    #[serde(default)]
    pub materials: Vec<SuggestedMaterial>,
    #[serde(default)]
    pub labor_hours: Option<f64>,
    /// Standard industry profit margin percentage for this project.
    #[serde(default)]
    pub suggested_margin: Option<f64>,
    /// Typical tax or VAT rate for this service.
    #[serde(default)]
    pub suggested_tax: Option<f64>,
    /// Brief reasoning for the suggested profit and tax rates.
    #[serde(default)]
    pub context: String,
}

/// Suggested rates and the reasoning behind them.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionNote {
    pub margin: Option<f64>,
    pub tax: Option<f64>,
    pub labor_hours: Option<f64>,
    pub context: String,
}

const DEFAULT_CONTEXT: &str = "Industry standard";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionTray {
    pending: Vec<MaterialItem>,
    note: Option<SuggestionNote>,
}

impl SuggestionTray {
    pub fn pending(&self) -> &[MaterialItem] {
        &self.pending
    }

    /// Survives `accept`, unlike the pending items.
    pub fn note(&self) -> Option<&SuggestionNote> {
        self.note.as_ref()
    }

    pub fn can_accept(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.note = None;
    }

    /// Replaces whatever was pending with `payload`, minting fresh ids.
    pub fn replace(&mut self, payload: EstimatePayload) {
        self.pending = payload
            .materials
            .into_iter()
            .map(|m| MaterialItem::new(m.name, m.quantity, m.unit_price))
            .collect();
        let context = payload.context.trim();
        self.note = Some(SuggestionNote {
            margin: payload.suggested_margin.map(clamp_percent),
            tax: payload.suggested_tax.map(clamp_percent),
            labor_hours: payload.labor_hours.map(clamp_amount),
            context: if context.is_empty() {
                DEFAULT_CONTEXT.to_string()
            } else {
                context.to_string()
            },
        });
        info!(items = self.pending.len(), "suggestion batch received");
    }

    pub fn update_item(&mut self, id: &str, patch: &MaterialPatch) -> bool {
        match self.pending.iter_mut().find(|m| m.id == id) {
            Some(item) => {
                item.apply(patch);
                true
            }
            None => false,
        }
    }

    pub fn remove_item(&mut self, id: &str) -> bool {
        let before = self.pending.len();
        self.pending.retain(|m| m.id != id);
        self.pending.len() != before
    }

    /// Merges the pending batch into `state`. Returns how many materials
    /// were added, or `None` when nothing was pending.
    pub fn accept(&mut self, state: &mut PricingState) -> Option<usize> {
        if !self.can_accept() {
            return None;
        }
        let items = std::mem::take(&mut self.pending);
        let added = items.len();
        state.extend_materials(items);
        if let Some(note) = &self.note {
            if let Some(margin) = note.margin {
                state.set_profit_margin(margin);
            }
            if let Some(tax) = note.tax {
                state.set_tax_rate(tax);
            }
        }
        info!(added, "suggestion batch accepted");
        Some(added)
    }

    pub fn dismiss(&mut self) {
        if !self.pending.is_empty() || self.note.is_some() {
            info!(discarded = self.pending.len(), "suggestion batch dismissed");
        }
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paint_payload() -> EstimatePayload {
        EstimatePayload {
            materials: vec![SuggestedMaterial {
                name: "Paint".into(),
                quantity: 3.0,
                unit_price: 15.0,
            }],
            labor_hours: Some(6.0),
            suggested_margin: Some(25.0),
            suggested_tax: None,
            context: "Typical for interior work".into(),
        }
    }

    #[test]
    fn accept_merges_items_and_margin() {
        let mut state = PricingState::default();
        let mut tray = SuggestionTray::default();
        tray.replace(paint_payload());

        assert_eq!(tray.accept(&mut state), Some(1));
        let paint = &state.materials()[0];
        assert_eq!(
            (paint.name.as_str(), paint.quantity, paint.unit_price),
            ("Paint", 3.0, 15.0)
        );
        assert_eq!(state.profit_margin(), 25.0);
        assert_eq!(state.tax_rate(), 5.0);
        assert!(tray.pending().is_empty());
        assert!(tray.note().is_some());
    }

    #[test]
    fn accept_overwrites_tax_and_keeps_margin() {
        let mut state = PricingState::default();
        let mut tray = SuggestionTray::default();
        let mut payload = paint_payload();
        payload.suggested_margin = None;
        payload.suggested_tax = Some(15.0);
        tray.replace(payload);

        assert_eq!(tray.accept(&mut state), Some(1));
        assert_eq!(state.tax_rate(), 15.0);
        assert_eq!(state.profit_margin(), 20.0);
    }

    #[test]
    fn dismiss_leaves_state_alone() {
        let mut state = PricingState::default();
        let before = state.clone();
        let mut tray = SuggestionTray::default();
        tray.replace(paint_payload());

        tray.dismiss();
        assert!(tray.pending().is_empty());
        assert!(tray.note().is_none());
        assert_eq!(tray.accept(&mut state), None);
        assert_eq!(state, before);
    }

    #[test]
    fn new_batch_replaces_old() {
        let mut tray = SuggestionTray::default();
        tray.replace(paint_payload());
        let mut second = paint_payload();
        second.materials[0].name = "Primer".into();
        tray.replace(second);

        let names: Vec<_> = tray.pending().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Primer"]);
    }

    #[test]
    fn pending_items_are_editable_before_accept() {
        let mut state = PricingState::default();
        let mut tray = SuggestionTray::default();
        let mut payload = paint_payload();
        payload.materials.push(SuggestedMaterial {
            name: "Brushes".into(),
            quantity: 2.0,
            unit_price: 4.0,
        });
        tray.replace(payload);

        let paint = tray.pending()[0].id.clone();
        let brushes = tray.pending()[1].id.clone();
        assert!(tray.update_item(&paint, &MaterialPatch::quantity(5.0)));
        assert!(tray.remove_item(&brushes));
        tray.accept(&mut state);

        assert_eq!(state.materials().len(), 1);
        assert_eq!(state.materials()[0].quantity, 5.0);
    }

    #[test]
    fn suggested_values_are_sanitized() {
        let mut tray = SuggestionTray::default();
        tray.replace(EstimatePayload {
            materials: vec![SuggestedMaterial {
                name: "Nails".into(),
                quantity: -2.0,
                unit_price: f64::NAN,
            }],
            suggested_margin: Some(180.0),
            ..Default::default()
        });

        let item = &tray.pending()[0];
        assert_eq!((item.quantity, item.unit_price), (0.0, 0.0));
        let note = tray.note().unwrap();
        assert_eq!(note.margin, Some(100.0));
        assert_eq!(note.context, "Industry standard");
    }

    #[test]
    fn ids_are_fresh_per_item() {
        let mut tray = SuggestionTray::default();
        let mut payload = paint_payload();
        payload.materials.push(payload.materials[0].clone());
        tray.replace(payload);
        assert_ne!(tray.pending()[0].id, tray.pending()[1].id);
    }

    #[test]
    fn payload_parses_camel_case_json() {
        let json = r#"{"materials":[{"name":"Tile","quantity":40,"unitPrice":2.5}],
            "laborHours":12,"suggestedMargin":30,"suggestedTax":15,"context":"VAT"}"#;
        let payload: EstimatePayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.materials[0].unit_price, 2.5);
        assert_eq!(payload.labor_hours, Some(12.0));
        assert_eq!(payload.suggested_tax, Some(15.0));
    }
}
