//! Transaction verbs: one cycle of signal drives, grouped.
//!
//! A functional unit is driven cycle-by-cycle through [`TaVerb`]s produced
//! by its transaction site. Each verb claims a set of signal drives for
//! exactly one clock cycle; a [`VerbMode::Locked`] verb additionally forbids
//! any other verb on the same site for that cycle. Within one verb, drives
//! are unordered — they all land in the same delta.

use crate::error::HwError;
use crate::signal::SignalId;
use serde::{Deserialize, Serialize};
use vireo_common::LogicVec;

/// Occupancy mode of a verb on its transaction site.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum VerbMode {
    /// No other verb may occupy the same site in the same cycle.
    Locked,
    /// Other verbs may share the site in the same cycle.
    Shared,
}

/// What drives a signal for one cycle.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub enum SignalSource {
    /// A constant value.
    Const(LogicVec),
    /// The current value of another signal (a wire from a port).
    Signal(SignalId),
}

/// One signal bound to one source for exactly one cycle.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Drive {
    /// The driven signal.
    pub target: SignalId,
    /// Where its value comes from this cycle.
    pub source: SignalSource,
}

/// One cycle's worth of signal drives on a transaction site.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct TaVerb {
    /// The occupancy mode.
    pub mode: VerbMode,
    /// The unordered set of drives claimed for this cycle.
    pub drives: Vec<Drive>,
}

impl TaVerb {
    /// Creates a `Locked` verb from the given drives.
    pub fn locked(drives: Vec<Drive>) -> Self {
        Self {
            mode: VerbMode::Locked,
            drives,
        }
    }

    /// Creates a `Shared` verb from the given drives.
    pub fn shared(drives: Vec<Drive>) -> Self {
        Self {
            mode: VerbMode::Shared,
            drives,
        }
    }

    /// Returns the number of drives in this verb.
    pub fn drive_count(&self) -> usize {
        self.drives.len()
    }
}

/// A per-functional-unit facade that produces per-cycle verbs binding the
/// unit's ports.
///
/// Sites are created alongside their component and must be `establish`ed
/// (binding ports through an
/// [`AutoBinder`](crate::component::AutoBinder)) before any verb factory
/// is usable. Component-specific verb factories (branch, select, ...) live
/// on the concrete site types.
pub trait TransactionSite {
    /// The identity of the hosting functional unit.
    fn host_name(&self) -> &str;

    /// Returns `true` once `establish` has bound the unit's ports.
    fn is_established(&self) -> bool;

    /// Binds the unit's ports through the given binder.
    fn establish(
        &mut self,
        binder: &mut dyn crate::component::AutoBinder,
    ) -> Result<(), HwError>;

    /// Produces the verb that parks the unit for one cycle without doing
    /// observable work.
    fn do_nothing(&self) -> Result<TaVerb, HwError>;
}
