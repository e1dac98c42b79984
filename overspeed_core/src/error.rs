// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reasons a reconciliation step was skipped.
//!
//! None of these are fatal. Passes repeat on every host mutation, so a step
//! skipped now is retried on the next structural change; the engine reports
//! the reason through the [`trace`](crate::trace) side channel and moves on to
//! the next surface.

use core::fmt;

/// A contained, per-surface or per-entry failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Skip {
    /// No matching surface was found this pass.
    LocatorMiss,
    /// A label did not match the speed label grammar.
    UnparseableLabel,
    /// No entry was available to clone as a template.
    TemplateMissing,
    /// An expected sub-element (readout, slider, summary row) was absent.
    MissingCollaboratorNode,
}

impl Skip {
    /// Returns a short, stable name for diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LocatorMiss => "locator-miss",
            Self::UnparseableLabel => "unparseable-label",
            Self::TemplateMissing => "template-missing",
            Self::MissingCollaboratorNode => "missing-collaborator-node",
        }
    }
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::LocatorMiss => "no speed surface found",
            Self::UnparseableLabel => "entry label is not a speed",
            Self::TemplateMissing => "no entry to use as a template",
            Self::MissingCollaboratorNode => "expected sub-element is missing",
        };
        f.write_str(msg)
    }
}

impl core::error::Error for Skip {}
