//! The application's single owned state: the active pricing record, saved
//! projects, the step navigator and any pending suggestion batch.
//!
//! Every mutation of the active record or the project store is written
//! straight back to storage.

use chrono::Utc;
use tracing::{info, warn};

use crate::confirm::{ConfirmationToken, Outcome};
use crate::error::Result;
use crate::pricing::{PricingState, Totals};
use crate::steps::{Step, StepNavigator};
use crate::storage::{read_record, write_record, KeyValueStore, ACTIVE_STATE_KEY, PROJECTS_KEY};
use crate::store::{ProjectStore, SaveOutcome};
use crate::suggestion::{EstimatePayload, SuggestionTray};

pub struct Workspace<S: KeyValueStore> {
    storage: S,
    state: PricingState,
    projects: ProjectStore,
    navigator: StepNavigator,
    suggestions: SuggestionTray,
}

impl<S: KeyValueStore> Workspace<S> {
    /// Rehydrates from `storage`, falling back to defaults on bad records.
    pub fn open(storage: S) -> Self {
        let mut state: PricingState = read_record(&storage, ACTIVE_STATE_KEY);
        state.normalize();
        let mut projects: ProjectStore = read_record(&storage, PROJECTS_KEY);
        projects.normalize();
        info!(
            materials = state.materials().len(),
            projects = projects.len(),
            "workspace opened"
        );
        Self {
            storage,
            state,
            projects,
            navigator: StepNavigator::default(),
            suggestions: SuggestionTray::default(),
        }
    }

    pub fn state(&self) -> &PricingState {
        &self.state
    }

    pub fn totals(&self) -> Totals {
        self.state.totals()
    }

    pub fn projects(&self) -> &ProjectStore {
        &self.projects
    }

    pub fn navigator(&self) -> &StepNavigator {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut StepNavigator {
        &mut self.navigator
    }

    pub fn suggestions(&self) -> &SuggestionTray {
        &self.suggestions
    }

    /// Pending items can be edited freely; nothing is persisted until accept.
    pub fn suggestions_mut(&mut self) -> &mut SuggestionTray {
        &mut self.suggestions
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Applies an edit to the active record and persists it.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut PricingState) -> R) -> R {
        let result = f(&mut self.state);
        self.persist_state();
        result
    }

    pub fn reset_all(&mut self, confirm: Option<&ConfirmationToken>) -> Outcome<()> {
        let outcome = self.state.reset_all(confirm);
        if outcome.is_applied() {
            self.suggestions.clear();
            self.navigator.goto(Step::Materials);
            self.persist_state();
        }
        outcome
    }

    pub fn save_project(
        &mut self,
        name: &str,
        confirm: Option<&ConfirmationToken>,
    ) -> Result<SaveOutcome> {
        let outcome = self.projects.save(name, &self.state, Utc::now(), confirm)?;
        self.persist_projects();
        Ok(outcome)
    }

    /// Replaces the active record with a saved copy and returns to the
    /// first step.
    pub fn load_project(&mut self, id: &str) -> Result<()> {
        self.state = self.projects.load(id)?;
        self.navigator.goto(Step::Materials);
        self.persist_state();
        info!(%id, "project loaded");
        Ok(())
    }

    pub fn delete_project(&mut self, id: &str) -> bool {
        let removed = self.projects.delete(id);
        if removed {
            self.persist_projects();
        }
        removed
    }

    /// Called when an estimation request starts; the old batch goes away.
    pub fn begin_estimate(&mut self) {
        self.suggestions.clear();
    }

    /// Feeds a finished estimation into the tray. Failure means there is
    /// simply nothing to accept.
    pub fn apply_estimate(&mut self, result: Result<EstimatePayload>) {
        match result {
            Ok(payload) => self.suggestions.replace(payload),
            Err(e) => {
                warn!(error = %e, "no suggestion available");
                self.suggestions.clear();
            }
        }
    }

    pub fn accept_suggestions(&mut self) -> Option<usize> {
        let added = self.suggestions.accept(&mut self.state)?;
        self.persist_state();
        Some(added)
    }

    pub fn dismiss_suggestions(&mut self) {
        self.suggestions.dismiss();
    }

    fn persist_state(&mut self) {
        write_record(&mut self.storage, ACTIVE_STATE_KEY, &self.state);
    }

    fn persist_projects(&mut self) {
        write_record(&mut self.storage, PROJECTS_KEY, &self.projects);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, PricingError};
    use crate::pricing::MaterialPatch;
    use crate::storage::{FileStorage, MemoryStorage};
    use crate::suggestion::SuggestedMaterial;
    use std::io;

    fn stored<T: serde::de::DeserializeOwned + Default>(
        ws: &Workspace<MemoryStorage>,
        key: &str,
    ) -> T {
        read_record(ws.storage(), key)
    }

    #[test]
    fn edits_are_persisted_immediately() {
        let mut ws = Workspace::open(MemoryStorage::default());
        let id = ws.edit(|s| s.add_material());
        ws.edit(|s| s.update_material(&id, &MaterialPatch::quantity(4.0)));

        let on_disk: PricingState = stored(&ws, ACTIVE_STATE_KEY);
        assert_eq!(&on_disk, ws.state());
        assert_eq!(on_disk.materials()[0].quantity, 4.0);
    }

    #[test]
    fn reopening_restores_state_and_projects() {
        let dir = tempfile::tempdir().unwrap();
        let mut ws = Workspace::open(FileStorage::new(dir.path()));
        ws.edit(|s| s.set_labor_rate(45.0));
        ws.save_project("Porch", None).unwrap();
        drop(ws);

        let ws = Workspace::open(FileStorage::new(dir.path()));
        assert_eq!(ws.state().labor_rate(), 45.0);
        assert_eq!(ws.projects().find_by_name("porch").map(|p| p.name.as_str()), Some("Porch"));
    }

    #[test]
    fn corrupt_storage_opens_with_defaults() {
        let storage = MemoryStorage::default()
            .with_record(ACTIVE_STATE_KEY, "\u{0}garbage")
            .with_record(PROJECTS_KEY, "[{\"id\":1}]");
        let ws = Workspace::open(storage);
        assert_eq!(ws.state(), &PricingState::default());
        assert!(ws.projects().is_empty());
    }

    #[test]
    fn reset_requires_token_and_rewinds() {
        let mut ws = Workspace::open(MemoryStorage::default());
        ws.edit(|s| {
            s.add_material();
            s.set_tax_rate(12.0);
        });
        ws.navigator_mut().goto(Step::Margin);

        let outcome = ws.reset_all(None);
        assert_eq!(ws.state().tax_rate(), 12.0);
        assert_eq!(ws.navigator().current(), Step::Margin);

        assert!(ws.reset_all(outcome.token()).is_applied());
        assert_eq!(ws.state(), &PricingState::default());
        assert_eq!(ws.navigator().current(), Step::Materials);
        let on_disk: PricingState = stored(&ws, ACTIVE_STATE_KEY);
        assert_eq!(on_disk, PricingState::default());
    }

    #[test]
    fn overwrite_flow_through_workspace() {
        let mut ws = Workspace::open(MemoryStorage::default());
        let first = ws.save_project("Roof", None).unwrap();
        ws.edit(|s| s.set_fixed_labor(300.0));

        let token = match ws.save_project("ROOF", None) {
            Err(PricingError::DuplicateName { token, .. }) => token,
            other => panic!("expected duplicate name, got {other:?}"),
        };
        let unchanged: ProjectStore = stored(&ws, PROJECTS_KEY);
        assert_eq!(unchanged.load(first.id()).unwrap().fixed_labor(), 0.0);

        ws.save_project("ROOF", Some(&token)).unwrap();
        let saved: ProjectStore = stored(&ws, PROJECTS_KEY);
        assert_eq!(saved.len(), 1);
        assert_eq!(saved.load(first.id()).unwrap().fixed_labor(), 300.0);
    }

    #[test]
    fn load_project_replaces_state_and_returns_to_materials() {
        let mut ws = Workspace::open(MemoryStorage::default());
        ws.edit(|s| s.set_labor_hours(8.0));
        let saved = ws.save_project("Shed", None).unwrap();
        ws.edit(|s| s.set_labor_hours(1.0));
        ws.navigator_mut().goto(Step::Summary);

        ws.load_project(saved.id()).unwrap();
        assert_eq!(ws.state().labor_hours(), 8.0);
        assert_eq!(ws.navigator().current(), Step::Materials);

        let err = ws.load_project("missing").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(ws.state().labor_hours(), 8.0);
    }

    #[test]
    fn delete_project_persists() {
        let mut ws = Workspace::open(MemoryStorage::default());
        let saved = ws.save_project("Gate", None).unwrap();
        assert!(ws.delete_project(saved.id()));
        assert!(!ws.delete_project(saved.id()));
        let on_disk: ProjectStore = stored(&ws, PROJECTS_KEY);
        assert!(on_disk.is_empty());
    }

    #[test]
    fn accepted_suggestion_lands_in_active_state() {
        let mut ws = Workspace::open(MemoryStorage::default());
        ws.begin_estimate();
        ws.apply_estimate(Ok(EstimatePayload {
            materials: vec![SuggestedMaterial {
                name: "Paint".into(),
                quantity: 3.0,
                unit_price: 15.0,
            }],
            suggested_margin: Some(25.0),
            ..Default::default()
        }));

        assert_eq!(ws.accept_suggestions(), Some(1));
        assert_eq!(ws.state().profit_margin(), 25.0);
        let on_disk: PricingState = stored(&ws, ACTIVE_STATE_KEY);
        assert_eq!(on_disk.materials()[0].name, "Paint");
    }

    #[test]
    fn failed_estimate_leaves_nothing_to_accept() {
        let mut ws = Workspace::open(MemoryStorage::default());
        ws.apply_estimate(Err(PricingError::EstimationUnavailable("offline".into())));
        assert!(!ws.suggestions().can_accept());
        assert_eq!(ws.accept_suggestions(), None);
    }

    struct BrokenStorage;

    impl KeyValueStore for BrokenStorage {
        fn read(&self, _key: &str) -> io::Result<Option<String>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }

        fn write(&mut self, _key: &str, _value: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    #[test]
    fn storage_failures_are_not_fatal() {
        let mut ws = Workspace::open(BrokenStorage);
        ws.edit(|s| s.set_labor_rate(10.0));
        assert!(ws.save_project("Anything", None).is_ok());
        assert_eq!(ws.state().labor_rate(), 10.0);
    }
}
