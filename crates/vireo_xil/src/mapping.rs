//! Mappings: a chosen way to realize one XIL instruction on one
//! functional unit.
//!
//! A mapping bundles the transaction site it uses, its resource kind,
//! initiation interval, latency, and a `realize` operation that turns
//! operand sources and result sinks into the per-cycle verb sequence
//! driving the unit. The concrete mapping kinds form a closed, shallow
//! set, so they are tagged variants rather than a trait hierarchy.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use vireo_hw::{Bcu, BranchLabel, Component, Mux2, SignalId, SignalSource, TaVerb};

use crate::error::XilError;

/// How a functional unit may be shared across mapped instructions.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ResourceKind {
    /// The unit is exclusively owned by its instruction stream; a verb
    /// occupies the site for its full duration.
    Exclusive,
    /// The unit is cheap enough to share: equivalent instances are
    /// interchangeable and concurrent clients may use different instances.
    Lightweight,
}

/// The branch-shaped mapping kinds on a BCU.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BcuMappingKind {
    /// Unconditional branch.
    Goto(BranchLabel),
    /// Branch taken when the condition operand is `'1'`.
    BranchIf(BranchLabel),
    /// Branch taken when the condition operand is `'0'`.
    BranchIfNot(BranchLabel),
}

/// A mapping of a control-transfer instruction onto a BCU.
#[derive(Clone, Debug)]
pub struct BcuMapping {
    host: Rc<RefCell<Bcu>>,
    kind: BcuMappingKind,
}

impl BcuMapping {
    /// Creates a BCU mapping of the given kind on `host`.
    pub fn new(host: Rc<RefCell<Bcu>>, kind: BcuMappingKind) -> Self {
        Self { host, kind }
    }

    /// The hosting BCU.
    pub fn host(&self) -> &Rc<RefCell<Bcu>> {
        &self.host
    }

    /// The mapping kind.
    pub fn kind(&self) -> BcuMappingKind {
        self.kind
    }

    fn operand(operands: &[SignalSource], index: usize) -> Result<SignalSource, XilError> {
        operands.get(index).cloned().ok_or(XilError::OutOfRange {
            what: "operand",
            index,
            count: operands.len(),
        })
    }

    fn realize(&self, operands: &[SignalSource]) -> Result<Vec<TaVerb>, XilError> {
        let host = self.host.borrow();
        let site = host.site();
        let verbs = match self.kind {
            BcuMappingKind::Goto(target) => site.branch(target)?,
            BcuMappingKind::BranchIf(target) => {
                site.branch_if(Self::operand(operands, 0)?, target)?
            }
            BcuMappingKind::BranchIfNot(target) => {
                site.branch_if_not(Self::operand(operands, 0)?, target)?
            }
        };
        Ok(verbs)
    }
}

/// A mapping of a `Select` instruction onto a MUX2.
#[derive(Clone, Debug)]
pub struct Mux2Mapping {
    host: Rc<RefCell<Mux2>>,
}

impl Mux2Mapping {
    /// Creates a select mapping on `host`.
    pub fn new(host: Rc<RefCell<Mux2>>) -> Self {
        Self { host }
    }

    /// The hosting MUX2.
    pub fn host(&self) -> &Rc<RefCell<Mux2>> {
        &self.host
    }

    /// Realizes the select.
    ///
    /// Operand wiring follows the historical `Select` ABI and must not be
    /// "fixed": the XIL convention is `Select(cond, then, else)` with the
    /// condition as operand 0, and the mux site call is
    /// `select(operands[1], operands[0], operands[2], results[0])` — the
    /// second XIL operand feeds the mux `a` input, the condition feeds
    /// `b`, and the third operand feeds `sel`. Note that this deviates
    /// from the MUX2 hardware convention where `sel = '0'` selects `a`.
    fn realize(
        &self,
        operands: &[SignalSource],
        results: &[SignalId],
    ) -> Result<Vec<TaVerb>, XilError> {
        if operands.len() < 3 {
            return Err(XilError::OutOfRange {
                what: "operand",
                index: 2,
                count: operands.len(),
            });
        }
        let result = *results.first().ok_or(XilError::OutOfRange {
            what: "result",
            index: 0,
            count: results.len(),
        })?;
        let host = self.host.borrow();
        let verb = host.site().select(
            operands[1].clone(),
            operands[0].clone(),
            operands[2].clone(),
            result,
        )?;
        Ok(vec![verb])
    }
}

/// A chosen realization of one XIL instruction on one functional unit.
#[derive(Clone, Debug)]
pub enum XilMapping {
    /// A control-transfer instruction on a BCU.
    Bcu(BcuMapping),
    /// A `Select` on a MUX2.
    Mux2(Mux2Mapping),
}

impl XilMapping {
    /// How the underlying functional unit may be shared.
    pub fn resource_kind(&self) -> ResourceKind {
        match self {
            XilMapping::Bcu(_) => ResourceKind::Exclusive,
            XilMapping::Mux2(_) => ResourceKind::Lightweight,
        }
    }

    /// Cycles before the site can accept the next instruction.
    pub fn initiation_interval(&self) -> u32 {
        1
    }

    /// Cycles from dispatch until the result is stable.
    pub fn latency(&self) -> u32 {
        match self {
            XilMapping::Bcu(m) => m.host.borrow().latency(),
            XilMapping::Mux2(_) => 0,
        }
    }

    /// The identity of the transaction site this mapping uses.
    pub fn site_name(&self) -> String {
        match self {
            XilMapping::Bcu(m) => m.host.borrow().name().to_string(),
            XilMapping::Mux2(m) => m.host.borrow().name().to_string(),
        }
    }

    /// A human-readable description of the mapping.
    pub fn description(&self) -> String {
        match self {
            XilMapping::Bcu(m) => {
                let verb = match m.kind {
                    BcuMappingKind::Goto(t) => format!("goto c-step {}", t.c_step()),
                    BcuMappingKind::BranchIf(t) => {
                        format!("branch if true to c-step {}", t.c_step())
                    }
                    BcuMappingKind::BranchIfNot(t) => {
                        format!("branch if false to c-step {}", t.c_step())
                    }
                };
                format!("{verb} on {}", self.site_name())
            }
            XilMapping::Mux2(m) => {
                format!("select through {} (width {})", self.site_name(), m.host.borrow().width())
            }
        }
    }

    /// Produces the verb sequence realizing this mapping: one verb per
    /// cycle, finite (a branch yields `latency` verbs, a select yields
    /// one).
    pub fn realize(
        &self,
        operands: &[SignalSource],
        results: &[SignalId],
    ) -> Result<Vec<TaVerb>, XilError> {
        match self {
            XilMapping::Bcu(m) => m.realize(operands),
            XilMapping::Mux2(m) => m.realize(operands, results),
        }
    }
}
