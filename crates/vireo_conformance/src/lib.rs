//! Testbench helpers for the conformance suite.
//!
//! The integration tests in `tests/` exercise the full path from XIL
//! instructions through mappers and transaction verbs down to simulated
//! functional units. This crate provides the shared scaffolding: a clocked
//! BCU testbench and an elaborated MUX2 bench.
//!
//! Helpers panic on setup failure — they are test scaffolding, not
//! production API.

#![warn(missing_docs)]

use std::cell::RefCell;
use std::rc::Rc;

use vireo_common::LogicVec;
use vireo_hw::{
    Bcu, BcuPorts, Component, KernelBinder, Mux2, Mux2Ports, SimKernel,
};

/// A clocked testbench around a single BCU instance.
pub struct BcuBench {
    /// The simulation kernel hosting the BCU.
    pub kernel: SimKernel,
    /// The BCU under test.
    pub bcu: Rc<RefCell<Bcu>>,
    /// The BCU's bound ports.
    pub ports: BcuPorts,
}

impl BcuBench {
    /// Builds and elaborates a BCU with the given configuration.
    pub fn new(addr_width: u32, startup: u64, latency: u32) -> Self {
        let mut kernel = SimKernel::new();
        let bcu = Rc::new(RefCell::new(
            Bcu::new(
                "bcu0",
                addr_width,
                LogicVec::from_u64(startup, addr_width),
                latency,
            )
            .expect("BCU configuration"),
        ));
        {
            let mut b = bcu.borrow_mut();
            let mut binder = KernelBinder::new(&mut kernel, "bcu0");
            b.pre_initialize(&mut binder).expect("pre_initialize");
            b.initialize(&mut kernel).expect("initialize");
        }
        let ports = bcu.borrow().site().ports().expect("established").clone();
        Self { kernel, bcu, ports }
    }

    /// Asserts reset for one clock cycle, then deasserts it.
    pub fn reset(&mut self) {
        self.kernel
            .poke(self.ports.rst, LogicVec::from_bool(true))
            .unwrap();
        self.step();
        self.kernel
            .poke(self.ports.rst, LogicVec::from_bool(false))
            .unwrap();
    }

    /// Drives the no-op flag pattern: `brP = '0'`, `brN = '1'`.
    pub fn nop_flags(&mut self) {
        self.kernel
            .poke(self.ports.br_p, LogicVec::from_bool(false))
            .unwrap();
        self.kernel
            .poke(self.ports.br_n, LogicVec::from_bool(true))
            .unwrap();
    }

    /// Drives the taken-branch flag pattern with the given target address.
    pub fn branch_flags(&mut self, alt: u64) {
        self.kernel
            .poke(self.ports.br_p, LogicVec::from_bool(true))
            .unwrap();
        self.kernel
            .poke(self.ports.br_n, LogicVec::from_bool(false))
            .unwrap();
        let width = self.bcu.borrow().addr_width();
        self.kernel
            .poke(self.ports.alt_addr, LogicVec::from_u64(alt, width))
            .unwrap();
    }

    /// Runs one clock cycle.
    pub fn step(&mut self) {
        self.kernel.clock_cycle(self.ports.clk).unwrap();
    }

    /// The current `out_addr` value.
    pub fn out(&self) -> u64 {
        self.kernel
            .signal_value(self.ports.out_addr)
            .to_u64()
            .expect("out_addr definite")
    }

    /// Runs one cycle and returns the new `out_addr`.
    pub fn step_out(&mut self) -> u64 {
        self.step();
        self.out()
    }
}

/// An elaborated MUX2 bench: kernel, component handle, and bound ports.
pub struct MuxBench {
    /// The simulation kernel hosting the mux.
    pub kernel: SimKernel,
    /// The mux under test.
    pub mux: Rc<RefCell<Mux2>>,
    /// The mux's bound ports.
    pub ports: Mux2Ports,
}

impl MuxBench {
    /// Builds and elaborates a MUX2 of the given width.
    pub fn new(width: u32) -> Self {
        let mut kernel = SimKernel::new();
        let mux = Rc::new(RefCell::new(Mux2::new("mux0", width)));
        {
            let mut m = mux.borrow_mut();
            let mut binder = KernelBinder::new(&mut kernel, "mux0");
            m.pre_initialize(&mut binder).expect("pre_initialize");
            m.initialize(&mut kernel).expect("initialize");
        }
        let ports = mux.borrow().site().ports().expect("established").clone();
        Self { kernel, mux, ports }
    }
}
