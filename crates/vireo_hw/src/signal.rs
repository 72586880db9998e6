//! Signal cells with current/next values and rising-edge detection.
//!
//! A [`SignalCell`] holds the `current` value visible to all readers within
//! a delta cycle and an optional pending `next` value. Exactly one writer
//! may schedule a `next` per delta; the pending values become current at the
//! delta boundary via [`SignalPool::commit`]. The previous value is retained
//! for one delta so clocked processes can observe a `'0' → '1'` transition
//! through [`SignalPool::rising_edge`].

use crate::error::HwError;
use serde::{Deserialize, Serialize};
use vireo_common::{Logic, LogicVec};

/// Identifies one signal cell within a [`SignalPool`].
///
/// IDs are handed out by [`SignalPool::alloc`] in allocation order and are
/// only meaningful for the pool that created them; looking one up in a
/// different pool panics or silently names the wrong cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct SignalId(u32);

impl SignalId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// How a bound signal is used by its component.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum PortUsage {
    /// The component's clock input.
    Clock,
    /// The component's synchronous reset input.
    Reset,
    /// A data/control operand input.
    Operand,
    /// A result output.
    Result,
    /// Internal component state (registers, shift registers).
    State,
}

/// One signal's storage: current, previous, and pending next value.
#[derive(Debug, Clone)]
pub struct SignalCell {
    /// Hierarchical signal name.
    pub name: String,
    /// How the owning component uses this signal.
    pub usage: PortUsage,
    current: LogicVec,
    previous: LogicVec,
    next: Option<LogicVec>,
}

impl SignalCell {
    fn new(name: String, usage: PortUsage, init: LogicVec) -> Self {
        Self {
            name,
            usage,
            previous: init.clone(),
            current: init,
            next: None,
        }
    }

    /// The signal's fixed bit width.
    pub fn width(&self) -> u32 {
        self.current.width()
    }
}

/// Flat storage for all signals of a simulated design.
///
/// Cells live in a dense vector indexed by [`SignalId`]; allocation never
/// removes or reorders cells, so IDs stay valid for the pool's lifetime.
/// Widths are fixed at allocation (the width of the initial value) and a
/// cell never exposes its pending `next` — processes always read `current`.
#[derive(Debug, Default)]
pub struct SignalPool {
    cells: Vec<SignalCell>,
}

impl SignalPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a new signal initialized to `init`.
    pub fn alloc(&mut self, name: &str, usage: PortUsage, init: LogicVec) -> SignalId {
        let id = SignalId::from_index(self.cells.len());
        self.cells
            .push(SignalCell::new(name.to_string(), usage, init));
        id
    }

    fn cell(&self, id: SignalId) -> &SignalCell {
        &self.cells[id.index()]
    }

    fn cell_mut(&mut self, id: SignalId) -> &mut SignalCell {
        &mut self.cells[id.index()]
    }

    /// Returns the current value of a signal.
    pub fn value(&self, id: SignalId) -> &LogicVec {
        &self.cell(id).current
    }

    /// Returns the value a signal had before the most recent commit.
    pub fn previous(&self, id: SignalId) -> &LogicVec {
        &self.cell(id).previous
    }

    /// Returns a signal's name.
    pub fn name(&self, id: SignalId) -> &str {
        &self.cell(id).name
    }

    /// Returns a signal's width.
    pub fn width(&self, id: SignalId) -> u32 {
        self.cell(id).width()
    }

    /// Schedules `value` to become the signal's current value at the next
    /// delta boundary.
    ///
    /// Fails with [`HwError::MultipleDrivers`] if the signal already has a
    /// pending value this delta, or [`HwError::WidthMismatch`] if the value
    /// width differs from the signal width.
    pub fn drive(&mut self, id: SignalId, value: LogicVec) -> Result<(), HwError> {
        let cell = self.cell_mut(id);
        if value.width() != cell.width() {
            return Err(HwError::WidthMismatch {
                signal: cell.name.clone(),
                expected: cell.width(),
                actual: value.width(),
            });
        }
        if cell.next.is_some() {
            return Err(HwError::MultipleDrivers {
                signal: cell.name.clone(),
            });
        }
        cell.next = Some(value);
        Ok(())
    }

    /// Returns `true` if the signal's element 0 transitioned `'0' → '1'`
    /// at the most recent commit.
    pub fn rising_edge(&self, id: SignalId) -> bool {
        let cell = self.cell(id);
        cell.width() > 0
            && cell.previous.get(0) == Logic::Zero
            && cell.current.get(0) == Logic::One
    }

    /// Returns `true` if the signal's element 0 transitioned `'1' → '0'`
    /// at the most recent commit.
    pub fn falling_edge(&self, id: SignalId) -> bool {
        let cell = self.cell(id);
        cell.width() > 0
            && cell.previous.get(0) == Logic::One
            && cell.current.get(0) == Logic::Zero
    }

    /// Applies all pending `next` values, advancing one delta.
    ///
    /// Every cell's previous value becomes its old current value, so edges
    /// are observable for exactly one delta. Returns the IDs of signals
    /// whose current value actually changed.
    pub fn commit(&mut self) -> Vec<SignalId> {
        let mut changed = Vec::new();
        for (index, cell) in self.cells.iter_mut().enumerate() {
            cell.previous = cell.current.clone();
            if let Some(next) = cell.next.take() {
                if next != cell.current {
                    cell.current = next;
                    changed.push(SignalId::from_index(index));
                }
            }
        }
        changed
    }

    /// Returns `true` if any signal has a pending `next` value.
    pub fn has_pending(&self) -> bool {
        self.cells.iter().any(|c| c.next.is_some())
    }

    /// Finds a signal by name.
    pub fn find(&self, name: &str) -> Option<SignalId> {
        self.cells
            .iter()
            .position(|c| c.name == name)
            .map(SignalId::from_index)
    }

    /// Returns the number of signals in the pool.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the pool holds no signals.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterates over `(ID, &SignalCell)` pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (SignalId, &SignalCell)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(index, cell)| (SignalId::from_index(index), cell))
    }
}
