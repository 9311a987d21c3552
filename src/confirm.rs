//! Two-phase confirmation for destructive operations.
//!
//! A destructive call made without a token does nothing and hands back a
//! [`ConfirmationToken`] naming what it would have done. Passing that token
//! into the same call performs it. Tokens can only be issued by this crate.

/// The destructive action a token authorizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ResetAll,
    Overwrite { project_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationToken {
    action: Action,
}

impl ConfirmationToken {
    pub(crate) fn issue(action: Action) -> Self {
        Self { action }
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub(crate) fn authorizes(&self, action: &Action) -> bool {
        &self.action == action
    }
}

/// Result of a destructive operation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T> {
    Applied(T),
    ConfirmationRequired(ConfirmationToken),
}

impl<T> Outcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn token(&self) -> Option<&ConfirmationToken> {
        match self {
            Self::Applied(_) => None,
            Self::ConfirmationRequired(token) => Some(token),
        }
    }
}

/// Runs `apply` only when `confirm` authorizes `action`.
pub(crate) fn guarded<T>(
    action: Action,
    confirm: Option<&ConfirmationToken>,
    apply: impl FnOnce() -> T,
) -> Outcome<T> {
    match confirm {
        Some(token) if token.authorizes(&action) => Outcome::Applied(apply()),
        _ => Outcome::ConfirmationRequired(ConfirmationToken::issue(action)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_only_authorizes_its_own_action() {
        let reset = ConfirmationToken::issue(Action::ResetAll);
        let overwrite_a = ConfirmationToken::issue(Action::Overwrite {
            project_id: "a".into(),
        });

        assert!(reset.authorizes(&Action::ResetAll));
        assert!(!reset.authorizes(&Action::Overwrite {
            project_id: "a".into()
        }));
        assert!(!overwrite_a.authorizes(&Action::Overwrite {
            project_id: "b".into()
        }));
    }

    #[test]
    fn guarded_without_token_does_not_run() {
        let mut ran = false;
        let outcome = guarded(Action::ResetAll, None, || ran = true);
        assert!(!ran);
        assert_eq!(outcome.token().map(|t| t.action()), Some(&Action::ResetAll));

        let token = outcome.token().cloned();
        let outcome = guarded(Action::ResetAll, token.as_ref(), || ran = true);
        assert!(ran);
        assert!(outcome.is_applied());
    }
}
