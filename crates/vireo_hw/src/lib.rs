//! Hardware model for the Vireo HLS mid-end.
//!
//! This crate implements the timed hardware semantics that the mapping
//! layer targets: signal cells with current/next values, a delta-cycle
//! simulation kernel, the component lifecycle with automatic port binding,
//! transaction verbs, and the two functional units of the core — the
//! branch control unit (BCU) and the 2-to-1 multiplexer (MUX2).
//!
//! # Architecture
//!
//! Signals live in a flat [`SignalPool`](signal::SignalPool) keyed by
//! [`SignalId`](signal::SignalId). Components allocate their ports during
//! `pre_initialize` through an [`AutoBinder`](component::AutoBinder) and
//! register closures as simulation processes during `initialize`. The
//! [`SimKernel`](kernel::SimKernel) advances time in delta cycles until a
//! fixed point, waking processes by value or edge sensitivity.
//!
//! Transaction sites produce [`TaVerb`](verb::TaVerb)s — one cycle's worth
//! of signal drives — which the scheduler applies cycle-by-cycle.
//!
//! # Modules
//!
//! - `signal` — Signal cells and the flat pool
//! - `kernel` — Delta-cycle simulation kernel
//! - `component` — Lifecycle, port binding, analysis pass
//! - `verb` — Transaction verbs and sites
//! - `bcu` — Branch control unit
//! - `mux` — 2-to-1 multiplexer
//! - `error` — Hardware-model error types

#![warn(missing_docs)]

pub mod bcu;
pub mod component;
pub mod error;
pub mod kernel;
pub mod mux;
pub mod signal;
pub mod verb;

pub use bcu::{BranchLabel, Bcu, BcuPorts, BcuTransactionSite};
pub use component::{AnalysisContext, AutoBinder, Component, DesignRoot, KernelBinder};
pub use error::HwError;
pub use kernel::{Edge, ProcessId, Sensitivity, SimKernel, SimTime};
pub use mux::{Mux2, Mux2Ports, Mux2TransactionSite};
pub use signal::{PortUsage, SignalCell, SignalId, SignalPool};
pub use verb::{Drive, SignalSource, TaVerb, TransactionSite, VerbMode};
