//! Combinational 2-to-1 multiplexer.
//!
//! MUX2 selects between two operand vectors of equal width: `r = a` when
//! `sel = '0'`, otherwise `r = b`. It is stateless with latency 0 and
//! initiation interval 1, and instances of equal width are behaviorally
//! interchangeable, so the mapping layer treats them as a lightweight,
//! shareable resource.

use vireo_common::{Logic, LogicVec};

use crate::component::{AutoBinder, Component};
use crate::error::HwError;
use crate::kernel::{Sensitivity, SimKernel};
use crate::signal::{PortUsage, SignalId};
use crate::verb::{Drive, SignalSource, TaVerb, TransactionSite};

/// The bound ports of a MUX2.
#[derive(Clone, Debug)]
pub struct Mux2Ports {
    /// First data input (selected when `sel = '0'`).
    pub a: SignalId,
    /// Second data input (selected otherwise).
    pub b: SignalId,
    /// Select input.
    pub sel: SignalId,
    /// Result output.
    pub r: SignalId,
}

/// The MUX2's transaction site.
#[derive(Debug)]
pub struct Mux2TransactionSite {
    host_name: String,
    width: u32,
    ports: Option<Mux2Ports>,
}

impl Mux2TransactionSite {
    fn new(host_name: String, width: u32) -> Self {
        Self {
            host_name,
            width,
            ports: None,
        }
    }

    /// The bound ports, if `establish` has run.
    pub fn ports(&self) -> Option<&Mux2Ports> {
        self.ports.as_ref()
    }

    fn established_ports(&self) -> Result<&Mux2Ports, HwError> {
        self.ports.as_ref().ok_or_else(|| HwError::NotEstablished {
            component: self.host_name.clone(),
        })
    }

    /// One `Locked` verb routing a selection through the mux: the inputs
    /// are driven from their sources, and `result` is wired from the
    /// component's `r` port for the same cycle.
    pub fn select(
        &self,
        a: SignalSource,
        b: SignalSource,
        sel: SignalSource,
        result: SignalId,
    ) -> Result<TaVerb, HwError> {
        let ports = self.established_ports()?;
        Ok(TaVerb::locked(vec![
            Drive {
                target: ports.a,
                source: a,
            },
            Drive {
                target: ports.b,
                source: b,
            },
            Drive {
                target: ports.sel,
                source: sel,
            },
            Drive {
                target: result,
                source: SignalSource::Signal(ports.r),
            },
        ]))
    }
}

impl TransactionSite for Mux2TransactionSite {
    fn host_name(&self) -> &str {
        &self.host_name
    }

    fn is_established(&self) -> bool {
        self.ports.is_some()
    }

    fn establish(&mut self, binder: &mut dyn AutoBinder) -> Result<(), HwError> {
        let w = self.width;
        self.ports = Some(Mux2Ports {
            a: binder.bind(PortUsage::Operand, "a", LogicVec::dont_cares(w)),
            b: binder.bind(PortUsage::Operand, "b", LogicVec::dont_cares(w)),
            sel: binder.bind(PortUsage::Operand, "sel", LogicVec::dont_cares(1)),
            r: binder.bind(PortUsage::Result, "r", LogicVec::unknowns(w)),
        });
        Ok(())
    }

    /// One `Locked` verb sticking all inputs to don't-care.
    fn do_nothing(&self) -> Result<TaVerb, HwError> {
        let ports = self.established_ports()?;
        Ok(TaVerb::locked(vec![
            Drive {
                target: ports.a,
                source: SignalSource::Const(LogicVec::dont_cares(self.width)),
            },
            Drive {
                target: ports.b,
                source: SignalSource::Const(LogicVec::dont_cares(self.width)),
            },
            Drive {
                target: ports.sel,
                source: SignalSource::Const(LogicVec::dont_cares(1)),
            },
        ]))
    }
}

/// The 2-to-1 multiplexer functional unit.
#[derive(Debug)]
pub struct Mux2 {
    name: String,
    width: u32,
    site: Mux2TransactionSite,
}

impl Mux2 {
    /// Creates a MUX2 of the given data width.
    pub fn new(name: impl Into<String>, width: u32) -> Self {
        let name = name.into();
        let site = Mux2TransactionSite::new(name.clone(), width);
        Self { name, width, site }
    }

    /// The data width in bits.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Two MUX2 instances are behaviorally equivalent iff their widths
    /// are equal.
    pub fn is_equivalent(&self, other: &Mux2) -> bool {
        self.width == other.width
    }

    /// The behavior hash: instances with equal hashes are interchangeable.
    pub fn behavior_hash(&self) -> u64 {
        u64::from(self.width)
    }

    /// The MUX2's transaction site.
    pub fn site(&self) -> &Mux2TransactionSite {
        &self.site
    }
}

impl Component for Mux2 {
    fn name(&self) -> &str {
        &self.name
    }

    fn pre_initialize(&mut self, binder: &mut dyn AutoBinder) -> Result<(), HwError> {
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
        kernel.add_process(
            &format!("{}.select", self.name),
            Sensitivity::Signals(vec![ports.a, ports.b, ports.sel]),
            Box::new(move |pool| {
                let chosen = if pool.value(ports.sel).get(0) == Logic::Zero {
                    pool.value(ports.a).clone()
                } else {
                    pool.value(ports.b).clone()
                };
                pool.drive(ports.r, chosen)
            }),
        );
        Ok(())
    }
}
