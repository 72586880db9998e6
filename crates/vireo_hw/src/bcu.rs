//! Branch Control Unit: next-address generation for a micro-sequenced
//! datapath.
//!
//! The BCU drives the address of the next instruction to fetch from program
//! ROM. Conditional branches choose between the linear successor
//! (`last_addr + 1`) and an alternative address, gated by two flags in dual
//! polarity: `brP` (branch if `'1'`) and `brN` (branch if `'0'`). With a
//! configured latency `L > 1`, a shift register masks branch decisions for
//! the first `L-1` cycles after reset, so the unit keeps fetching linearly
//! until the pipeline has refilled.

use serde::{Deserialize, Serialize};
use vireo_common::{Logic, LogicVec, Unsigned};

use crate::component::{AutoBinder, Component};
use crate::error::HwError;
use crate::kernel::{Edge, Sensitivity, SimKernel};
use crate::signal::{PortUsage, SignalId, SignalPool};
use crate::verb::{Drive, SignalSource, TaVerb, TransactionSite};

/// An opaque handle to an instruction address, identified by its c-step
/// (control step).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct BranchLabel {
    c_step: u32,
}

impl BranchLabel {
    /// Creates a label for the given c-step.
    pub fn new(c_step: u32) -> Self {
        Self { c_step }
    }

    /// The instruction address this label refers to.
    pub fn c_step(self) -> u32 {
        self.c_step
    }
}

/// The bound ports and internal state signals of a BCU.
#[derive(Clone, Debug)]
pub struct BcuPorts {
    /// Clock input.
    pub clk: SignalId,
    /// Synchronous, active-high reset input.
    pub rst: SignalId,
    /// Positive branch flag: branch if `'1'`.
    pub br_p: SignalId,
    /// Negative branch flag: branch if `'0'`.
    pub br_n: SignalId,
    /// Alternative (branch target) address input.
    pub alt_addr: SignalId,
    /// Next-address output.
    pub out_addr: SignalId,
    /// Register holding the previously emitted address.
    pub last_addr: SignalId,
    /// Reset masking shift register of width `latency - 1`; absent for
    /// latency 1.
    pub rstq: Option<SignalId>,
}

/// The BCU's transaction site: binds the ports and produces per-cycle
/// branch verbs.
#[derive(Debug)]
pub struct BcuTransactionSite {
    host_name: String,
    addr_width: u32,
    startup_addr: LogicVec,
    latency: u32,
    ports: Option<BcuPorts>,
}

impl BcuTransactionSite {
    fn new(host_name: String, addr_width: u32, startup_addr: LogicVec, latency: u32) -> Self {
        Self {
            host_name,
            addr_width,
            startup_addr,
            latency,
            ports: None,
        }
    }

    /// The bound ports, if `establish` has run.
    pub fn ports(&self) -> Option<&BcuPorts> {
        self.ports.as_ref()
    }

    fn established_ports(&self) -> Result<&BcuPorts, HwError> {
        self.ports.as_ref().ok_or_else(|| HwError::NotEstablished {
            component: self.host_name.clone(),
        })
    }

    /// Converts a branch target into an address-wide vector.
    fn target_addr(&self, target: BranchLabel) -> Result<LogicVec, HwError> {
        let addr = Unsigned::from_u64(u64::from(target.c_step()), self.addr_width)?;
        Ok(addr.to_logic_vec())
    }

    /// The drives shared by every branch-shaped verb.
    fn branch_drives(
        ports: &BcuPorts,
        br_p: SignalSource,
        br_n: SignalSource,
        alt: LogicVec,
    ) -> Vec<Drive> {
        vec![
            Drive {
                target: ports.br_p,
                source: br_p,
            },
            Drive {
                target: ports.br_n,
                source: br_n,
            },
            Drive {
                target: ports.alt_addr,
                source: SignalSource::Const(alt),
            },
        ]
    }

    /// Pads a branch verb with `latency - 1` no-op verbs, so a branch
    /// occupies exactly `latency` cycles of exclusive site usage and no
    /// second branch can be dispatched before the program counter is
    /// stable.
    fn with_padding(&self, first: TaVerb) -> Result<Vec<TaVerb>, HwError> {
        let mut verbs = vec![first];
        for _ in 1..self.latency {
            verbs.push(self.do_nothing()?);
        }
        Ok(verbs)
    }

    /// Unconditional branch to `target`: `brP ← '1'`, `brN ← '0'`,
    /// `alt_addr ← target`. Yields exactly `latency` verbs.
    pub fn branch(&self, target: BranchLabel) -> Result<Vec<TaVerb>, HwError> {
        let ports = self.established_ports()?;
        let verb = TaVerb::locked(Self::branch_drives(
            ports,
            SignalSource::Const(LogicVec::from_bool(true)),
            SignalSource::Const(LogicVec::from_bool(false)),
            self.target_addr(target)?,
        ));
        self.with_padding(verb)
    }

    /// Conditional branch: `brP ← cond`, `brN ← '1'`, taken when the
    /// condition evaluates to `'1'`. Yields exactly `latency` verbs.
    pub fn branch_if(
        &self,
        cond: SignalSource,
        target: BranchLabel,
    ) -> Result<Vec<TaVerb>, HwError> {
        let ports = self.established_ports()?;
        let verb = TaVerb::locked(Self::branch_drives(
            ports,
            cond,
            SignalSource::Const(LogicVec::from_bool(true)),
            self.target_addr(target)?,
        ));
        self.with_padding(verb)
    }

    /// Inverted conditional branch: `brP ← '0'`, `brN ← cond`, taken when
    /// the condition evaluates to `'0'`. Yields exactly `latency` verbs.
    pub fn branch_if_not(
        &self,
        cond: SignalSource,
        target: BranchLabel,
    ) -> Result<Vec<TaVerb>, HwError> {
        let ports = self.established_ports()?;
        let verb = TaVerb::locked(Self::branch_drives(
            ports,
            SignalSource::Const(LogicVec::from_bool(false)),
            cond,
            self.target_addr(target)?,
        ));
        self.with_padding(verb)
    }
}

impl TransactionSite for BcuTransactionSite {
    fn host_name(&self) -> &str {
        &self.host_name
    }

    fn is_established(&self) -> bool {
        self.ports.is_some()
    }

    fn establish(&mut self, binder: &mut dyn AutoBinder) -> Result<(), HwError> {
        let w = self.addr_width;
        let ports = BcuPorts {
            clk: binder.bind(PortUsage::Clock, "clk", LogicVec::new(1)),
            rst: binder.bind(PortUsage::Reset, "rst", LogicVec::new(1)),
            br_p: binder.bind(PortUsage::Operand, "brP", LogicVec::from_bool(false)),
            br_n: binder.bind(PortUsage::Operand, "brN", LogicVec::from_bool(true)),
            alt_addr: binder.bind(PortUsage::Operand, "alt_addr", LogicVec::zeros(w)),
            out_addr: binder.bind(PortUsage::Result, "out_addr", self.startup_addr.clone()),
            last_addr: binder.bind(PortUsage::State, "last_addr", self.startup_addr.clone()),
            rstq: if self.latency > 1 {
                Some(binder.bind(
                    PortUsage::State,
                    "rstq",
                    LogicVec::ones(self.latency - 1),
                ))
            } else {
                None
            },
        };
        self.ports = Some(ports);
        Ok(())
    }

    /// One `Locked` verb parking the unit: `brP ← '0'`, `brN ← '1'`,
    /// `alt_addr ← zeros`.
    fn do_nothing(&self) -> Result<TaVerb, HwError> {
        let ports = self.established_ports()?;
        Ok(TaVerb::locked(Self::branch_drives(
            ports,
            SignalSource::Const(LogicVec::from_bool(false)),
            SignalSource::Const(LogicVec::from_bool(true)),
            LogicVec::zeros(self.addr_width),
        )))
    }
}

/// The Branch Control Unit functional unit.
#[derive(Debug)]
pub struct Bcu {
    name: String,
    addr_width: u32,
    startup_addr: LogicVec,
    latency: u32,
    site: BcuTransactionSite,
}

impl Bcu {
    /// Creates a BCU with the given address width, startup address, and
    /// pipeline latency.
    ///
    /// Fails with [`HwError::OutOfRange`] if `latency < 1`. The startup
    /// address width is checked later, in
    /// [`pre_initialize`](Component::pre_initialize).
    pub fn new(
        name: impl Into<String>,
        addr_width: u32,
        startup_addr: LogicVec,
        latency: u32,
    ) -> Result<Self, HwError> {
        if latency < 1 {
            return Err(HwError::OutOfRange {
                what: "latency",
                value: u64::from(latency),
                min: 1,
            });
        }
        let name = name.into();
        let site = BcuTransactionSite::new(
            name.clone(),
            addr_width,
            startup_addr.clone(),
            latency,
        );
        Ok(Self {
            name,
            addr_width,
            startup_addr,
            latency,
            site,
        })
    }

    /// The address width in bits.
    pub fn addr_width(&self) -> u32 {
        self.addr_width
    }

    /// The address emitted while reset is asserted.
    pub fn startup_addr(&self) -> &LogicVec {
        &self.startup_addr
    }

    /// The configured pipeline latency (`>= 1`).
    pub fn latency(&self) -> u32 {
        self.latency
    }

    /// The BCU's transaction site.
    pub fn site(&self) -> &BcuTransactionSite {
        &self.site
    }
}

/// One synchronous step of the BCU, run on each rising clock edge.
///
/// `brP` is read permissively: anything that is not exactly `'1'` counts as
/// `'0'`. Symmetrically, anything that is not exactly `'0'` counts as `'1'`
/// for `brN`. A don't-care on either flag therefore never takes a branch on
/// its own.
fn bcu_step(
    pool: &mut SignalPool,
    ports: &BcuPorts,
    startup: &LogicVec,
    addr_width: u32,
) -> Result<(), HwError> {
    if pool.value(ports.rst).get(0) == Logic::One {
        pool.drive(ports.last_addr, startup.clone())?;
        pool.drive(ports.out_addr, startup.clone())?;
        if let Some(rstq) = ports.rstq {
            pool.drive(rstq, LogicVec::ones(pool.width(rstq)))?;
        }
        return Ok(());
    }

    let br_p = pool.value(ports.br_p).get(0);
    let br_n = pool.value(ports.br_n).get(0);
    let masked = match ports.rstq {
        Some(rstq) => pool.value(rstq).get(0) == Logic::One,
        None => false,
    };
    let taken = !masked && (br_p == Logic::One || br_n == Logic::Zero);

    let next = if taken {
        pool.value(ports.alt_addr).clone()
    } else {
        match Unsigned::try_from_logic_vec(pool.value(ports.last_addr)) {
            Some(last) => last.wrapping_add_one().to_logic_vec(),
            // A corrupted address register propagates as unknown.
            None => LogicVec::unknowns(addr_width),
        }
    };
    pool.drive(ports.out_addr, next.clone())?;
    pool.drive(ports.last_addr, next)?;

    if let Some(rstq) = ports.rstq {
        let current = pool.value(rstq).clone();
        // Shift right by one, injecting '0' at the most significant end;
        // after latency-1 cycles the register is all-zeros.
        let mut shifted = LogicVec::new(current.width());
        for i in 0..current.width() - 1 {
            shifted.set(i, current.get(i + 1));
        }
        pool.drive(rstq, shifted)?;
    }
    Ok(())
}

impl Component for Bcu {
    fn name(&self) -> &str {
        &self.name
    }

    fn pre_initialize(&mut self, binder: &mut dyn AutoBinder) -> Result<(), HwError> {
        if self.startup_addr.width() != self.addr_width {
            return Err(HwError::InvalidConfiguration {
                component: self.name.clone(),
                reason: format!(
                    "startup address width {} does not match address width {}",
                    self.startup_addr.width(),
                    self.addr_width
                ),
            });
        }
        self.site.establish(binder)
    }

    fn initialize(&mut self, kernel: &mut SimKernel) -> Result<(), HwError> {
        let ports = self
            .site
            .ports()
            .ok_or_else(|| HwError::NotEstablished {
                component: self.name.clone(),
            })?
            .clone();
        let startup = self.startup_addr.clone();
        let addr_width = self.addr_width;
        let clk = ports.clk;
        kernel.add_process(
            &format!("{}.step", self.name),
            Sensitivity::Edges(vec![(clk, Edge::Rising)]),
            Box::new(move |pool| bcu_step(pool, &ports, &startup, addr_width)),
        );
        Ok(())
    }
}
