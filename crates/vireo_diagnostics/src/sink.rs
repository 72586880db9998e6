//! Collection point for the diagnostics of one synthesis run.

use crate::diagnostic::Diagnostic;
use std::sync::Mutex;

/// Everything the sink knows about the run so far, behind one lock.
#[derive(Default)]
struct RunState {
    entries: Vec<Diagnostic>,
    error_count: usize,
}

/// Accumulates the diagnostics of one synthesis run and decides whether
/// the run may proceed.
///
/// The sink is shared by reference across passes, and across threads when
/// passes run in parallel; all state lives behind a single lock. Once any
/// run-aborting diagnostic has been emitted the run is considered failed,
/// and [`abort_report`](Self::abort_report) renders the offending
/// component identities for the final user-facing message.
pub struct DiagnosticSink {
    state: Mutex<RunState>,
}

impl DiagnosticSink {
    /// Creates a sink for a fresh run.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RunState::default()),
        }
    }

    /// Records one diagnostic.
    pub fn emit(&self, diagnostic: Diagnostic) {
        let mut state = self.state.lock().unwrap();
        if diagnostic.severity.aborts_synthesis() {
            state.error_count += 1;
        }
        state.entries.push(diagnostic);
    }

    /// Whether a run-aborting diagnostic has been emitted.
    pub fn has_errors(&self) -> bool {
        self.state.lock().unwrap().error_count > 0
    }

    /// The number of run-aborting diagnostics emitted so far.
    pub fn error_count(&self) -> usize {
        self.state.lock().unwrap().error_count
    }

    /// A snapshot of every diagnostic emitted so far, in emission order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.state.lock().unwrap().entries.clone()
    }

    /// Drains the sink and resets the run to viable, returning the
    /// accumulated diagnostics.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        let mut state = self.state.lock().unwrap();
        state.error_count = 0;
        std::mem::take(&mut state.entries)
    }

    /// Renders the abort message for a failed run: one line per
    /// run-aborting diagnostic, leading with the offending component
    /// identity where one is known. Returns `None` while the run is
    /// still viable.
    pub fn abort_report(&self) -> Option<String> {
        let state = self.state.lock().unwrap();
        if state.error_count == 0 {
            return None;
        }
        let mut report = String::from("synthesis aborted:");
        for diagnostic in state
            .entries
            .iter()
            .filter(|d| d.severity.aborts_synthesis())
        {
            report.push('\n');
            match &diagnostic.component {
                Some(component) => {
                    report.push_str(&format!("  {component}: {}", diagnostic.message));
                }
                None => report.push_str(&format!("  {}", diagnostic.message)),
            }
        }
        Some(report)
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}
