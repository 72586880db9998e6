//! Component lifecycle, port binding, and the design-level analysis pass.
//!
//! A functional unit goes through two lifecycle phases before simulation:
//! `pre_initialize` allocates its signals (through an [`AutoBinder`]), then
//! `initialize` registers its processes with the kernel. After `initialize`
//! the configuration (widths, latency, startup values) is immutable.
//!
//! The analysis phase is an explicit pass: [`DesignRoot::run_analysis`]
//! visits every registered component with an [`AnalysisContext`], instead of
//! a process-wide subscription list.

use std::cell::RefCell;
use std::rc::Rc;

use vireo_common::LogicVec;
use vireo_diagnostics::DiagnosticSink;

use crate::error::HwError;
use crate::kernel::SimKernel;
use crate::signal::{PortUsage, SignalId};

/// Allocates signals for named ports on behalf of a transaction site.
///
/// For each requested port `(usage, name, initial_value)` the binder returns
/// a signal of the initial value's width.
pub trait AutoBinder {
    /// Binds one named port, returning its signal.
    fn bind(&mut self, usage: PortUsage, name: &str, init: LogicVec) -> SignalId;
}

/// An [`AutoBinder`] that allocates into a kernel's signal pool, prefixing
/// every port name with the component instance name.
pub struct KernelBinder<'a> {
    kernel: &'a mut SimKernel,
    prefix: String,
}

impl<'a> KernelBinder<'a> {
    /// Creates a binder allocating under `prefix` (the component name).
    pub fn new(kernel: &'a mut SimKernel, prefix: impl Into<String>) -> Self {
        Self {
            kernel,
            prefix: prefix.into(),
        }
    }
}

impl AutoBinder for KernelBinder<'_> {
    fn bind(&mut self, usage: PortUsage, name: &str, init: LogicVec) -> SignalId {
        let full = format!("{}.{name}", self.prefix);
        self.kernel.add_signal(&full, usage, init)
    }
}

/// State threaded through the explicit analysis pass.
pub struct AnalysisContext<'a> {
    /// Diagnostics emitted during analysis.
    pub sink: &'a DiagnosticSink,
    visited: Vec<String>,
}

impl<'a> AnalysisContext<'a> {
    /// Creates a fresh analysis context reporting into `sink`.
    pub fn new(sink: &'a DiagnosticSink) -> Self {
        Self {
            sink,
            visited: Vec::new(),
        }
    }

    /// Records that a component was visited.
    pub fn record(&mut self, name: &str) {
        self.visited.push(name.to_string());
    }

    /// The component names visited so far, in visit order.
    pub fn visited(&self) -> &[String] {
        &self.visited
    }
}

/// A hardware component with the two-phase initialization lifecycle.
pub trait Component {
    /// The component instance name.
    fn name(&self) -> &str;

    /// Allocates the component's signals. Width and configuration
    /// preconditions are checked here; a violation fails with
    /// [`HwError::InvalidConfiguration`].
    fn pre_initialize(&mut self, binder: &mut dyn AutoBinder) -> Result<(), HwError>;

    /// Registers the component's processes with the simulation kernel.
    /// The configuration is immutable afterwards.
    fn initialize(&mut self, kernel: &mut SimKernel) -> Result<(), HwError>;

    /// Called once per analysis pass. The default does nothing.
    fn on_analysis(&mut self, ctx: &mut AnalysisContext<'_>) {
        let _ = ctx;
    }
}

/// The root of a design: owns the registered components and drives the
/// analysis pass over them.
#[derive(Default)]
pub struct DesignRoot {
    components: Vec<Rc<RefCell<dyn Component>>>,
}

impl DesignRoot {
    /// Creates an empty design root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a component with the design.
    pub fn add(&mut self, component: Rc<RefCell<dyn Component>>) {
        self.components.push(component);
    }

    /// Returns the registered components in registration order.
    pub fn components(&self) -> &[Rc<RefCell<dyn Component>>] {
        &self.components
    }

    /// Returns the number of registered components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if no components are registered.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Runs the analysis pass: visits every component in registration
    /// order, recording it in the context and invoking its hook.
    pub fn run_analysis(&self, ctx: &mut AnalysisContext<'_>) {
        for component in &self.components {
            let name = component.borrow().name().to_string();
            ctx.record(&name);
            component.borrow_mut().on_analysis(ctx);
        }
    }

    /// Runs `pre_initialize` then `initialize` for every component against
    /// the given kernel, binding each component's ports under its own name.
    pub fn elaborate(&self, kernel: &mut SimKernel) -> Result<(), HwError> {
        for component in &self.components {
            let mut c = component.borrow_mut();
            let name = c.name().to_string();
            let mut binder = KernelBinder::new(kernel, name);
            c.pre_initialize(&mut binder)?;
            c.initialize(kernel)?;
        }
        Ok(())
    }
}
