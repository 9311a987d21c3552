use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};
use tracing::debug;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Step {
    #[default]
    Materials,
    Labor,
    Margin,
    Summary,
}

impl Step {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Step> {
        Step::iter().nth(self.index() + 1)
    }

    pub fn prev(self) -> Option<Step> {
        self.index().checked_sub(1).and_then(|i| Step::iter().nth(i))
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// A completed move between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Step,
    pub to: Step,
    /// Set once when the summary is entered from another step.
    pub show_interstitial: bool,
}

/// Tracks which editing view is active. It does not enforce order;
/// `goto` jumps anywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepNavigator {
    current: Step,
}

impl StepNavigator {
    pub fn current(&self) -> Step {
        self.current
    }

    pub fn goto(&mut self, to: Step) -> Transition {
        let from = self.current;
        self.current = to;
        debug!(from = from.as_str(), to = to.as_str(), "step changed");
        Transition {
            from,
            to,
            show_interstitial: to == Step::Summary && from != Step::Summary,
        }
    }

    /// `None` at the last step.
    pub fn next(&mut self) -> Option<Transition> {
        self.current.next().map(|to| self.goto(to))
    }

    /// `None` at the first step.
    pub fn back(&mut self) -> Option<Transition> {
        self.current.prev().map(|to| self.goto(to))
    }
}
