//! XIL instruction set and functional-unit mapping layer.
//!
//! This crate sits between the behavioral middle-end and the timed
//! hardware model in `vireo_hw`. Instruction selectors describe work as
//! abstract [`XilInstr`]s; [`XilMapper`]s bind those instructions to
//! functional units, yielding [`XilMapping`]s whose `realize` produces the
//! per-cycle verb sequences that drive the unit's ports.
//!
//! # Modules
//!
//! - `instr` — XIL opcodes, instructions, and the canonical factory
//! - `types` — Type descriptors and wire-width lowering
//! - `disjoint` — Union-find for coalescing equivalence classes
//! - `mapping` — Mapping objects and their `realize` semantics
//! - `mapper` — The mapper trait, `BcuMapper`, and `Mux2Mapper`
//! - `intrinsic` — The decompiler breakpoint intrinsic
//! - `error` — Mapping-layer error types

#![warn(missing_docs)]

pub mod disjoint;
pub mod error;
pub mod instr;
pub mod intrinsic;
pub mod mapper;
pub mod mapping;
pub mod types;

pub use disjoint::DisjointSets;
pub use error::XilError;
pub use instr::{InstructionSet, XilInstr, XilOpcode};
pub use mapper::{BcuMapper, FuSite, Mux2Mapper, Project, XilMapper};
pub use mapping::{BcuMapping, BcuMappingKind, Mux2Mapping, ResourceKind, XilMapping};
pub use types::{DefaultLowering, TypeDesc, TypeLowering};
