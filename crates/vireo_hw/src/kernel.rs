//! Delta-cycle simulation kernel.
//!
//! [`SimKernel`] owns the design's [`SignalPool`] and its registered
//! processes, and advances time in discrete deltas: pending signal values
//! become current at the delta boundary, processes sensitive to the changed
//! signals fire, and the loop repeats until a fixed point. A bounded delta
//! count per settle step catches combinational loops.
//!
//! Time is counted in clock cycles plus the delta index within the current
//! cycle — this layer of the toolchain is cycle-accurate, not wall-clock
//! accurate.

use std::collections::HashSet;

use vireo_common::LogicVec;

use crate::error::HwError;
use crate::signal::{PortUsage, SignalId, SignalPool};
use crate::verb::{SignalSource, TaVerb};

/// A simulation time point: clock cycle plus delta index within the cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimTime {
    /// The clock cycle count.
    pub cycle: u64,
    /// Delta cycle index within the current clock cycle.
    pub delta: u32,
}

impl SimTime {
    /// Creates a time point at cycle zero, delta zero.
    pub fn zero() -> Self {
        Self { cycle: 0, delta: 0 }
    }
}

/// A signal edge type for edge-sensitive processes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Rising edge (`'0' → '1'`).
    Rising,
    /// Falling edge (`'1' → '0'`).
    Falling,
    /// Both edges.
    Both,
}

/// The sensitivity specification of a process.
#[derive(Clone, Debug)]
pub enum Sensitivity {
    /// Wake on any value change of the listed signals (combinational).
    Signals(Vec<SignalId>),
    /// Wake only on the listed signal edges (sequential).
    Edges(Vec<(SignalId, Edge)>),
}

/// The body of a simulation process.
///
/// Processes are non-suspending: each invocation runs to completion,
/// reading current values and scheduling next values on the pool.
pub type ProcessFn = Box<dyn FnMut(&mut SignalPool) -> Result<(), HwError>>;

/// Identifies a process registered with a [`SimKernel`].
///
/// Issued by [`SimKernel::add_process`] in registration order; meaningful
/// only for the kernel that issued it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ProcessId(u32);

impl ProcessId {
    fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A registered simulation process with its sensitivity.
struct SimProcess {
    name: String,
    sensitivity: Sensitivity,
    run: ProcessFn,
}

/// The simulation kernel: flat signal storage, processes, and the
/// delta-cycle loop.
pub struct SimKernel {
    pool: SignalPool,
    processes: Vec<SimProcess>,
    time: SimTime,
    max_delta_per_step: u32,
    total_deltas: u64,
}

impl Default for SimKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl SimKernel {
    /// Creates an empty kernel.
    pub fn new() -> Self {
        Self {
            pool: SignalPool::new(),
            processes: Vec::new(),
            time: SimTime::zero(),
            max_delta_per_step: 10_000,
            total_deltas: 0,
        }
    }

    /// Allocates a new signal in the kernel's pool.
    pub fn add_signal(&mut self, name: &str, usage: PortUsage, init: LogicVec) -> SignalId {
        self.pool.alloc(name, usage, init)
    }

    /// Registers a process with the given sensitivity.
    pub fn add_process(
        &mut self,
        name: &str,
        sensitivity: Sensitivity,
        run: ProcessFn,
    ) -> ProcessId {
        let id = ProcessId::from_index(self.processes.len());
        self.processes.push(SimProcess {
            name: name.to_string(),
            sensitivity,
            run,
        });
        id
    }

    /// Returns the signal pool (read access for testbenches).
    pub fn pool(&self) -> &SignalPool {
        &self.pool
    }

    /// Schedules a testbench drive of `value` onto `id`.
    pub fn poke(&mut self, id: SignalId, value: LogicVec) -> Result<(), HwError> {
        self.pool.drive(id, value)
    }

    /// Returns the current value of a signal.
    pub fn signal_value(&self, id: SignalId) -> &LogicVec {
        self.pool.value(id)
    }

    /// Finds a signal by its hierarchical name.
    pub fn find_signal(&self, name: &str) -> Option<SignalId> {
        self.pool.find(name)
    }

    /// Returns the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Returns the total number of delta cycles executed.
    pub fn total_deltas(&self) -> u64 {
        self.total_deltas
    }

    /// Returns the number of signals.
    pub fn signal_count(&self) -> usize {
        self.pool.len()
    }

    /// Returns the number of registered processes.
    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    /// Returns the name of a registered process.
    pub fn process_name(&self, id: ProcessId) -> &str {
        &self.processes[id.index()].name
    }

    /// Sets the maximum number of delta cycles per settle step.
    pub fn set_max_delta(&mut self, max: u32) {
        self.max_delta_per_step = max;
    }

    /// Runs delta cycles until no signal has a pending value.
    ///
    /// Returns the number of deltas executed. Fails with
    /// [`HwError::DeltaCycleLimit`] if the design does not reach a fixed
    /// point within the configured bound (a combinational loop).
    pub fn settle(&mut self) -> Result<u32, HwError> {
        let mut deltas = 0u32;
        while self.pool.has_pending() {
            if deltas >= self.max_delta_per_step {
                return Err(HwError::DeltaCycleLimit {
                    cycle: self.time.cycle,
                    max_deltas: self.max_delta_per_step,
                });
            }
            let changed = self.pool.commit();
            deltas += 1;
            self.total_deltas += 1;
            self.time.delta += 1;
            if changed.is_empty() {
                continue;
            }
            let woken = self.find_sensitive(&changed);
            self.run_processes(&woken)?;
        }
        Ok(deltas)
    }

    /// Drives one full clock cycle: `clk ← '1'`, settle, `clk ← '0'`,
    /// settle, then advances the cycle counter.
    pub fn clock_cycle(&mut self, clk: SignalId) -> Result<(), HwError> {
        self.poke(clk, LogicVec::from_bool(true))?;
        self.settle()?;
        self.poke(clk, LogicVec::from_bool(false))?;
        self.settle()?;
        self.time.cycle += 1;
        self.time.delta = 0;
        Ok(())
    }

    /// Applies one transaction verb, claiming its drives for the current
    /// cycle.
    ///
    /// Constant sources are driven and settled first; signal-wired drives
    /// are then resolved against the settled values, so a drive that wires
    /// a sink from a combinational output observes that output as computed
    /// within this same cycle. No ordering among the drives themselves is
    /// observable.
    pub fn apply_verb(&mut self, verb: &TaVerb) -> Result<(), HwError> {
        for drive in &verb.drives {
            if let SignalSource::Const(v) = &drive.source {
                self.pool.drive(drive.target, v.clone())?;
            }
        }
        self.settle()?;
        for drive in &verb.drives {
            if let SignalSource::Signal(src) = &drive.source {
                let value = self.pool.value(*src).clone();
                self.pool.drive(drive.target, value)?;
            }
        }
        self.settle()?;
        Ok(())
    }

    /// Finds processes to wake for the given set of changed signals,
    /// in registration order.
    fn find_sensitive(&self, changed: &[SignalId]) -> Vec<ProcessId> {
        let changed: HashSet<SignalId> = changed.iter().copied().collect();
        let mut woken = Vec::new();
        for (index, proc) in self.processes.iter().enumerate() {
            let wake = match &proc.sensitivity {
                Sensitivity::Signals(sigs) => sigs.iter().any(|s| changed.contains(s)),
                Sensitivity::Edges(edges) => edges.iter().any(|(s, edge)| {
                    changed.contains(s)
                        && match edge {
                            Edge::Rising => self.pool.rising_edge(*s),
                            Edge::Falling => self.pool.falling_edge(*s),
                            Edge::Both => {
                                self.pool.rising_edge(*s) || self.pool.falling_edge(*s)
                            }
                        }
                }),
            };
            if wake {
                woken.push(ProcessId::from_index(index));
            }
        }
        woken
    }

    /// Runs the given processes against the pool.
    fn run_processes(&mut self, woken: &[ProcessId]) -> Result<(), HwError> {
        // The process list is taken out so process bodies can borrow the
        // pool mutably; bodies never touch the process list itself.
        let mut processes = std::mem::take(&mut self.processes);
        let mut result = Ok(());
        for &id in woken {
            if let Err(e) = (processes[id.index()].run)(&mut self.pool) {
                result = Err(e);
                break;
            }
        }
        self.processes = processes;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use vireo_common::Logic;

    #[test]
    fn empty_kernel() {
        let kernel = SimKernel::new();
        assert_eq!(kernel.signal_count(), 0);
        assert_eq!(kernel.process_count(), 0);
        assert_eq!(kernel.time(), SimTime::zero());
    }

    #[test]
    fn settle_with_no_pending_is_noop() {
        let mut kernel = SimKernel::new();
        kernel.add_signal("a", PortUsage::Operand, LogicVec::new(1));
        assert_eq!(kernel.settle().unwrap(), 0);
    }

    #[test]
    fn combinational_propagation() {
        let mut kernel = SimKernel::new();
        let a = kernel.add_signal("a", PortUsage::Operand, LogicVec::new(1));
        let b = kernel.add_signal("b", PortUsage::Result, LogicVec::new(1));
        kernel.add_process(
            "copy",
            Sensitivity::Signals(vec![a]),
            Box::new(move |pool| {
                let v = pool.value(a).clone();
                pool.drive(b, v)
            }),
        );
        kernel.poke(a, LogicVec::from_bool(true)).unwrap();
        kernel.settle().unwrap();
        assert_eq!(kernel.signal_value(b).to_u64(), Some(1));
    }

    #[test]
    fn chained_propagation_takes_two_deltas() {
        let mut kernel = SimKernel::new();
        let a = kernel.add_signal("a", PortUsage::Operand, LogicVec::new(1));
        let b = kernel.add_signal("b", PortUsage::Operand, LogicVec::new(1));
        let c = kernel.add_signal("c", PortUsage::Result, LogicVec::new(1));
        kernel.add_process(
            "a_to_b",
            Sensitivity::Signals(vec![a]),
            Box::new(move |pool| {
                let v = pool.value(a).clone();
                pool.drive(b, v)
            }),
        );
        kernel.add_process(
            "b_to_c",
            Sensitivity::Signals(vec![b]),
            Box::new(move |pool| {
                let v = pool.value(b).clone();
                pool.drive(c, v)
            }),
        );
        kernel.poke(a, LogicVec::from_bool(true)).unwrap();
        let deltas = kernel.settle().unwrap();
        assert!(deltas >= 2);
        assert_eq!(kernel.signal_value(c).to_u64(), Some(1));
    }

    #[test]
    fn edge_process_fires_only_on_rising() {
        let mut kernel = SimKernel::new();
        let clk = kernel.add_signal("clk", PortUsage::Clock, LogicVec::new(1));
        let count = Rc::new(RefCell::new(0u32));
        let count_in_proc = count.clone();
        kernel.add_process(
            "counter",
            Sensitivity::Edges(vec![(clk, Edge::Rising)]),
            Box::new(move |_pool| {
                *count_in_proc.borrow_mut() += 1;
                Ok(())
            }),
        );
        kernel.clock_cycle(clk).unwrap();
        kernel.clock_cycle(clk).unwrap();
        kernel.clock_cycle(clk).unwrap();
        assert_eq!(*count.borrow(), 3);
        assert_eq!(kernel.time().cycle, 3);
    }

    #[test]
    fn falling_edge_process() {
        let mut kernel = SimKernel::new();
        let clk = kernel.add_signal("clk", PortUsage::Clock, LogicVec::new(1));
        let count = Rc::new(RefCell::new(0u32));
        let count_in_proc = count.clone();
        kernel.add_process(
            "neg",
            Sensitivity::Edges(vec![(clk, Edge::Falling)]),
            Box::new(move |_pool| {
                *count_in_proc.borrow_mut() += 1;
                Ok(())
            }),
        );
        kernel.clock_cycle(clk).unwrap();
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn register_updates_on_clock_edge() {
        let mut kernel = SimKernel::new();
        let clk = kernel.add_signal("clk", PortUsage::Clock, LogicVec::new(1));
        let d = kernel.add_signal("d", PortUsage::Operand, LogicVec::new(4));
        let q = kernel.add_signal("q", PortUsage::State, LogicVec::new(4));
        kernel.add_process(
            "dff",
            Sensitivity::Edges(vec![(clk, Edge::Rising)]),
            Box::new(move |pool| {
                let v = pool.value(d).clone();
                pool.drive(q, v)
            }),
        );
        kernel.poke(d, LogicVec::from_u64(9, 4)).unwrap();
        kernel.settle().unwrap();
        assert_eq!(kernel.signal_value(q).to_u64(), Some(0));
        kernel.clock_cycle(clk).unwrap();
        assert_eq!(kernel.signal_value(q).to_u64(), Some(9));
    }

    #[test]
    fn combinational_loop_hits_delta_limit() {
        let mut kernel = SimKernel::new();
        kernel.set_max_delta(50);
        let r = kernel.add_signal("r", PortUsage::Operand, LogicVec::new(1));
        kernel.add_process(
            "inverter",
            Sensitivity::Signals(vec![r]),
            Box::new(move |pool| {
                let v = !pool.value(r);
                pool.drive(r, v)
            }),
        );
        kernel.poke(r, LogicVec::from_bool(true)).unwrap();
        let err = kernel.settle().unwrap_err();
        assert!(matches!(err, HwError::DeltaCycleLimit { max_deltas: 50, .. }));
    }

    #[test]
    fn apply_verb_const_and_signal_sources() {
        use crate::verb::{Drive, VerbMode};
        let mut kernel = SimKernel::new();
        let src = kernel.add_signal("src", PortUsage::Result, LogicVec::from_u64(5, 4));
        let t1 = kernel.add_signal("t1", PortUsage::Operand, LogicVec::new(4));
        let t2 = kernel.add_signal("t2", PortUsage::Operand, LogicVec::new(4));
        let verb = TaVerb {
            mode: VerbMode::Locked,
            drives: vec![
                Drive {
                    target: t1,
                    source: SignalSource::Const(LogicVec::from_u64(3, 4)),
                },
                Drive {
                    target: t2,
                    source: SignalSource::Signal(src),
                },
            ],
        };
        kernel.apply_verb(&verb).unwrap();
        assert_eq!(kernel.signal_value(t1).to_u64(), Some(3));
        assert_eq!(kernel.signal_value(t2).to_u64(), Some(5));
    }

    #[test]
    fn process_does_not_observe_own_next() {
        let mut kernel = SimKernel::new();
        let a = kernel.add_signal("a", PortUsage::Operand, LogicVec::new(1));
        let b = kernel.add_signal("b", PortUsage::Result, LogicVec::new(1));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_in_proc = seen.clone();
        kernel.add_process(
            "observer",
            Sensitivity::Signals(vec![a]),
            Box::new(move |pool| {
                // Drive b, then read it back: the pending value must not
                // be visible within the same delta.
                pool.drive(b, LogicVec::from_bool(true))?;
                seen_in_proc.borrow_mut().push(pool.value(b).get(0));
                Ok(())
            }),
        );
        kernel.poke(a, LogicVec::from_bool(true)).unwrap();
        kernel.settle().unwrap();
        assert_eq!(seen.borrow().as_slice(), &[Logic::Zero]);
        assert_eq!(kernel.signal_value(b).to_u64(), Some(1));
    }

    #[test]
    fn process_names_retained() {
        let mut kernel = SimKernel::new();
        let a = kernel.add_signal("a", PortUsage::Operand, LogicVec::new(1));
        let id = kernel.add_process(
            "named",
            Sensitivity::Signals(vec![a]),
            Box::new(|_| Ok(())),
        );
        assert_eq!(kernel.process_name(id), "named");
    }

    #[test]
    fn process_ids_issued_in_registration_order() {
        let mut kernel = SimKernel::new();
        let a = kernel.add_signal("a", PortUsage::Operand, LogicVec::new(1));
        let p0 = kernel.add_process("p0", Sensitivity::Signals(vec![a]), Box::new(|_| Ok(())));
        let p1 = kernel.add_process("p1", Sensitivity::Signals(vec![a]), Box::new(|_| Ok(())));
        assert_ne!(p0, p1);
        assert_eq!(kernel.process_name(p0), "p0");
        assert_eq!(kernel.process_name(p1), "p1");
        assert_eq!(kernel.process_count(), 2);
    }

    #[test]
    fn sim_time_ordering() {
        let a = SimTime { cycle: 1, delta: 5 };
        let b = SimTime { cycle: 2, delta: 0 };
        let c = SimTime { cycle: 2, delta: 1 };
        assert!(a < b);
        assert!(b < c);
    }
}
