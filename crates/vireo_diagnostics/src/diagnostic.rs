//! Structured diagnostic messages anchored to hardware components.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a diagnostic is for the synthesis run that emitted it.
///
/// Only [`Severity::Error`] aborts the run; notes and warnings are
/// reported and synthesis continues. The derived ordering goes from least
/// to most serious.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Severity {
    /// Context that helps interpret other diagnostics.
    Note,
    /// Suspicious but survivable; the run continues.
    Warning,
    /// Fatal: the run aborts and no netlist is emitted.
    Error,
}

impl Severity {
    /// Whether a diagnostic of this severity aborts the synthesis run.
    pub fn aborts_synthesis(self) -> bool {
        matches!(self, Severity::Error)
    }

    /// The lowercase label used when rendering diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A structured diagnostic message.
///
/// There is no source text at this layer of the toolchain, so diagnostics
/// anchor to the identity of the offending component (or instruction)
/// instead of a source span. A synthesis run that hits an error-severity
/// diagnostic aborts, reporting the component identity and message.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The main diagnostic message.
    pub message: String,
    /// The identity of the component the diagnostic refers to, if any.
    pub component: Option<String>,
    /// Explanatory footnotes (e.g., "note: ...").
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// Creates a new error diagnostic with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            component: None,
            notes: Vec::new(),
        }
    }

    /// Creates a new warning diagnostic with the given message.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            component: None,
            notes: Vec::new(),
        }
    }

    /// Creates a new note diagnostic with the given message.
    pub fn note(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Note,
            message: message.into(),
            component: None,
            notes: Vec::new(),
        }
    }

    /// Anchors this diagnostic to a component identity.
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Adds an explanatory note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.component {
            Some(c) => write!(f, "{}: {} ({})", self.severity, self.message, c),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}
