//! Named, timestamped snapshots of a [`PricingState`].

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::confirm::{Action, ConfirmationToken};
use crate::error::{PricingError, Result};
use crate::pricing::{new_id, PricingState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub date: DateTime<Utc>,
    pub state: PricingState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(String),
    Overwritten(String),
}

impl SaveOutcome {
    pub fn id(&self) -> &str {
        match self {
            Self::Created(id) | Self::Overwritten(id) => id,
        }
    }
}

/// Saved projects, newest first. Names are unique ignoring case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectStore {
    projects: Vec<Project>,
}

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

impl ProjectStore {
    pub fn iter(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Project> {
        let name = name.trim();
        self.projects.iter().find(|p| same_name(&p.name, name))
    }

    /// Saves a copy of `state` under `name`.
    ///
    /// A name already in use is rejected with [`PricingError::DuplicateName`]
    /// unless `confirm` is the overwrite token for that project.
    pub fn save(
        &mut self,
        name: &str,
        state: &PricingState,
        now: DateTime<Utc>,
        confirm: Option<&ConfirmationToken>,
    ) -> Result<SaveOutcome> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PricingError::EmptyName);
        }

        if let Some(existing) = self.projects.iter_mut().find(|p| same_name(&p.name, name)) {
            let action = Action::Overwrite {
                project_id: existing.id.clone(),
            };
            return match confirm {
                Some(token) if token.authorizes(&action) => {
                    existing.state = state.clone();
                    existing.date = now;
                    info!(id = %existing.id, name = %existing.name, "project overwritten");
                    Ok(SaveOutcome::Overwritten(existing.id.clone()))
                }
                _ => Err(PricingError::DuplicateName {
                    name: existing.name.clone(),
                    token: ConfirmationToken::issue(action),
                }),
            };
        }

        let project = Project {
            id: new_id(),
            name: name.to_string(),
            date: now,
            state: state.clone(),
        };
        let id = project.id.clone();
        info!(%id, %name, "project created");
        self.projects.insert(0, project);
        Ok(SaveOutcome::Created(id))
    }

    pub fn load(&self, id: &str) -> Result<PricingState> {
        self.get(id)
            .map(|p| p.state.clone())
            .ok_or_else(|| PricingError::NotFound(id.to_string()))
    }

    /// Returns `false` if nothing had that id.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.projects.len();
        self.projects.retain(|p| p.id != id);
        let removed = self.projects.len() != before;
        if removed {
            info!(%id, "project deleted");
        }
        removed
    }

    /// Brings a rehydrated store back inside its invariants: every id is
    /// unique and non-empty, and names are unique ignoring case. Of two
    /// projects sharing a name the earlier (newer) one is kept.
    pub(crate) fn normalize(&mut self) {
        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        self.projects.retain_mut(|project| {
            if !names.insert(project.name.trim().to_lowercase()) {
                warn!(id = %project.id, name = %project.name, "dropping project with duplicate name");
                return false;
            }
            if project.id.trim().is_empty() || !ids.insert(project.id.clone()) {
                project.id = new_id();
                ids.insert(project.id.clone());
            }
            project.state.normalize();
            true
        });
    }
}
