//! Pricing calculator core: line items, labor, margin and tax folded into a
//! final selling price, with named projects kept in local storage.

pub mod config;
pub mod confirm;
pub mod error;
pub mod estimation;
pub mod export;
pub mod gemini;
pub mod i18n;
pub mod pricing;
pub mod request;
pub mod speech;
pub mod steps;
pub mod storage;
pub mod store;
pub mod suggestion;
pub mod workspace;

pub use confirm::{Action, ConfirmationToken, Outcome};
pub use error::{ErrorKind, PricingError};
pub use pricing::{MaterialItem, MaterialPatch, PricingState, Totals};
pub use steps::{Step, StepNavigator, Transition};
pub use store::{Project, ProjectStore, SaveOutcome};
pub use suggestion::{EstimatePayload, SuggestionTray};
pub use workspace::Workspace;
