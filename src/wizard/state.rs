//! Step machine
//!
//! Tracks which steps are visible, which one is expanded, which have been
//! completed and which (if any) is mid-transition. Knows nothing about the
//! draft; the controller decides whether a step's content is valid before
//! asking the machine to move.

use crate::error::ValidationError;
use std::collections::BTreeSet;

/// The three booking steps, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardStep {
    Treatments,
    DateAndTime,
    Contact,
}

impl WizardStep {
    pub const ALL: [WizardStep; 3] = [Self::Treatments, Self::DateAndTime, Self::Contact];

    pub fn index(&self) -> usize {
        match self {
            Self::Treatments => 0,
            Self::DateAndTime => 1,
            Self::Contact => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Treatments => "Treatments",
            Self::DateAndTime => "Date & Time",
            Self::Contact => "Your Details",
        }
    }
}

/// Ephemeral wizard state; never persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardState {
    expanded: Option<WizardStep>,
    visible: Vec<WizardStep>,
    completed: BTreeSet<WizardStep>,
    pending: Option<WizardStep>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            expanded: Some(WizardStep::Treatments),
            visible: vec![WizardStep::Treatments],
            completed: BTreeSet::new(),
            pending: None,
        }
    }
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expanded(&self) -> Option<WizardStep> {
        self.expanded
    }

    /// Unlocked steps in unlock order
    pub fn visible_steps(&self) -> &[WizardStep] {
        &self.visible
    }

    pub fn completed_steps(&self) -> &BTreeSet<WizardStep> {
        &self.completed
    }

    pub fn pending(&self) -> Option<WizardStep> {
        self.pending
    }

    pub fn is_visible(&self, step: WizardStep) -> bool {
        self.visible.contains(&step)
    }

    pub fn is_completed(&self, step: WizardStep) -> bool {
        self.completed.contains(&step)
    }

    /// Collapse `step` if it is the expanded one, otherwise expand it.
    /// Steps that are not visible are ignored. Returns whether anything
    /// changed.
    pub fn toggle_expanded(&mut self, step: WizardStep) -> bool {
        if !self.is_visible(step) {
            tracing::debug!("Ignoring toggle of hidden step {}", step.index());
            return false;
        }
        self.expanded = if self.expanded == Some(step) {
            None
        } else {
            Some(step)
        };
        true
    }

    /// Mark `step` as in flight. Only one transition may be pending.
    pub(crate) fn begin(&mut self, step: WizardStep) -> Result<(), ValidationError> {
        if !self.is_visible(step) {
            return Err(ValidationError::StepNotVisible(step.index()));
        }
        if let Some(pending) = self.pending {
            return Err(ValidationError::TransitionPending(pending.index()));
        }
        self.pending = Some(step);
        Ok(())
    }

    /// Complete the pending transition: mark the step done, unlock and
    /// expand the next one. The last step has no successor, so it stays
    /// expanded.
    pub(crate) fn finish(&mut self) -> Option<WizardStep> {
        let step = self.pending.take()?;
        self.completed.insert(step);
        if let Some(next) = step.next() {
            if !self.visible.contains(&next) {
                self.visible.push(next);
            }
            self.expanded = Some(next);
        }
        tracing::debug!(
            "Completed step {} (visible: {:?}, expanded: {:?})",
            step.index(),
            self.visible,
            self.expanded
        );
        Some(step)
    }

    /// Drop a pending transition without completing it
    pub(crate) fn abort(&mut self) {
        self.pending = None;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}
