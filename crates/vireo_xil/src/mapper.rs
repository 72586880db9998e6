//! Mappers: bind XIL opcodes to functional units.
//!
//! A mapper advertises the instructions it understands, yields candidate
//! [`XilMapping`]s for an already-allocated functional-unit site
//! (`try_map`), and can allocate a fresh unit when none is available
//! (`try_allocate`). Declining is the normal protocol — a mapper that does
//! not handle an instruction yields an empty sequence (or `None`), and the
//! instruction selector tries the next mapper.

use std::cell::RefCell;
use std::rc::Rc;

use vireo_hw::{Bcu, DesignRoot, Mux2};

use crate::error::XilError;
use crate::instr::{InstructionSet, XilInstr, XilOpcode};
use crate::mapping::{BcuMapping, BcuMappingKind, Mux2Mapping, XilMapping};
use crate::types::{TypeDesc, TypeLowering};

/// A handle to an already-allocated functional-unit site.
///
/// The set of functional-unit kinds in this core is closed, so the handle
/// is a tagged variant rather than a trait object.
#[derive(Clone)]
pub enum FuSite {
    /// A branch control unit.
    Bcu(Rc<RefCell<Bcu>>),
    /// A 2-to-1 multiplexer.
    Mux2(Rc<RefCell<Mux2>>),
}

/// An opaque project container threaded through allocation.
///
/// Out-of-scope collaborators (resource budgeting, floorplanning) hang
/// their state off the project; this core passes it through without
/// introspection.
#[derive(Debug, Default)]
pub struct Project {
    _private: (),
}

impl Project {
    /// Creates an empty project container.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Binds abstract XIL instructions to concrete functional units.
pub trait XilMapper {
    /// Enumerates the instructions this mapper understands.
    fn supported_instructions(&self) -> Vec<XilInstr>;

    /// Yields zero or more ways to realize `instr` on the given
    /// already-allocated site. An empty yield means "not applicable";
    /// candidates are yielded in declaration order and the caller
    /// chooses.
    fn try_map(
        &self,
        site: &FuSite,
        instr: &XilInstr,
        operand_types: &[TypeDesc],
        result_types: &[TypeDesc],
    ) -> Result<Vec<XilMapping>, XilError>;

    /// Allocates a new functional unit for `instr` if necessary and
    /// returns a mapping onto it, or `None` if this mapper does not
    /// handle the instruction.
    fn try_allocate(
        &self,
        root: &mut DesignRoot,
        instr: &XilInstr,
        operand_types: &[TypeDesc],
        result_types: &[TypeDesc],
        project: &mut Project,
    ) -> Result<Option<XilMapping>, XilError>;
}

/// Maps the control-transfer opcodes onto one specific BCU.
///
/// A datapath has exactly one branch control unit, so the mapper is bound
/// to its host at construction: `try_map` only yields mappings when the
/// offered site *is* that BCU, and `try_allocate` never creates another
/// one.
pub struct BcuMapper {
    host: Rc<RefCell<Bcu>>,
}

impl BcuMapper {
    /// Creates a mapper bound to `host`.
    pub fn new(host: Rc<RefCell<Bcu>>) -> Self {
        Self { host }
    }

    /// The bound BCU.
    pub fn host(&self) -> &Rc<RefCell<Bcu>> {
        &self.host
    }
}

impl XilMapper for BcuMapper {
    fn supported_instructions(&self) -> Vec<XilInstr> {
        let origin = vireo_hw::BranchLabel::new(0);
        vec![
            InstructionSet::goto(origin),
            InstructionSet::branch_if_true(origin),
            InstructionSet::branch_if_false(origin),
        ]
    }

    fn try_map(
        &self,
        site: &FuSite,
        instr: &XilInstr,
        _operand_types: &[TypeDesc],
        _result_types: &[TypeDesc],
    ) -> Result<Vec<XilMapping>, XilError> {
        let FuSite::Bcu(host) = site else {
            return Ok(Vec::new());
        };
        if !Rc::ptr_eq(host, &self.host) {
            return Ok(Vec::new());
        }
        if !instr.opcode.is_branch() {
            return Ok(Vec::new());
        }
        // Past the family gate every arm must resolve; falling through
        // here is a programming error in the instruction selector.
        let kind = match (instr.opcode, instr.target) {
            (XilOpcode::Goto, Some(target)) => BcuMappingKind::Goto(target),
            (XilOpcode::BranchIfTrue, Some(target)) => BcuMappingKind::BranchIf(target),
            (XilOpcode::BranchIfFalse, Some(target)) => BcuMappingKind::BranchIfNot(target),
            (opcode, _) => return Err(XilError::NotImplemented { opcode }),
        };
        Ok(vec![XilMapping::Bcu(BcuMapping::new(
            self.host.clone(),
            kind,
        ))])
    }

    fn try_allocate(
        &self,
        _root: &mut DesignRoot,
        instr: &XilInstr,
        operand_types: &[TypeDesc],
        result_types: &[TypeDesc],
        _project: &mut Project,
    ) -> Result<Option<XilMapping>, XilError> {
        // Never creates a BCU; only maps onto the bound host.
        let site = FuSite::Bcu(self.host.clone());
        let mut mappings = self.try_map(&site, instr, operand_types, result_types)?;
        if mappings.is_empty() {
            Ok(None)
        } else {
            Ok(Some(mappings.remove(0)))
        }
    }
}

/// Maps `Select` onto 2-to-1 multiplexers, allocating new ones on demand.
pub struct Mux2Mapper {
    lowering: Box<dyn TypeLowering>,
}

impl Mux2Mapper {
    /// Creates a mapper using the given type lowering.
    pub fn new(lowering: Box<dyn TypeLowering>) -> Self {
        Self { lowering }
    }

    /// The wire width a `Select` needs: the width of the *second* operand
    /// type. The `Select` ABI is `(cond, then, else)` — the condition is
    /// operand 0, the data operands are 1 and 2.
    fn select_width(&self, operand_types: &[TypeDesc]) -> Option<u32> {
        operand_types.get(1).map(|ty| self.lowering.wire_width(ty))
    }
}

impl XilMapper for Mux2Mapper {
    fn supported_instructions(&self) -> Vec<XilInstr> {
        vec![InstructionSet::select()]
    }

    fn try_map(
        &self,
        site: &FuSite,
        instr: &XilInstr,
        operand_types: &[TypeDesc],
        _result_types: &[TypeDesc],
    ) -> Result<Vec<XilMapping>, XilError> {
        if instr.opcode != XilOpcode::Select {
            return Ok(Vec::new());
        }
        let FuSite::Mux2(host) = site else {
            return Ok(Vec::new());
        };
        let Some(width) = self.select_width(operand_types) else {
            return Ok(Vec::new());
        };
        // Width-matched instances are interchangeable (lightweight
        // resource), so any equal-width mux will do.
        if host.borrow().width() != width {
            return Ok(Vec::new());
        }
        Ok(vec![XilMapping::Mux2(Mux2Mapping::new(host.clone()))])
    }

    fn try_allocate(
        &self,
        root: &mut DesignRoot,
        instr: &XilInstr,
        operand_types: &[TypeDesc],
        _result_types: &[TypeDesc],
        _project: &mut Project,
    ) -> Result<Option<XilMapping>, XilError> {
        if instr.opcode != XilOpcode::Select {
            return Ok(None);
        }
        let Some(width) = self.select_width(operand_types) else {
            return Ok(None);
        };
        let name = format!("mux2_w{width}_{}", root.len());
        let mux = Rc::new(RefCell::new(Mux2::new(name, width)));
        root.add(mux.clone());
        Ok(Some(XilMapping::Mux2(Mux2Mapping::new(mux))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::ResourceKind;
    use crate::types::DefaultLowering;
    use vireo_common::LogicVec;
    use vireo_hw::BranchLabel;

    fn bcu_rc(latency: u32) -> Rc<RefCell<Bcu>> {
        Rc::new(RefCell::new(
            Bcu::new("bcu0", 4, LogicVec::zeros(4), latency).unwrap(),
        ))
    }

    fn bit() -> TypeDesc {
        TypeDesc::Bit
    }

    fn u(width: u32) -> TypeDesc {
        TypeDesc::Unsigned { width }
    }

    #[test]
    fn bcu_mapper_supported_instructions() {
        let mapper = BcuMapper::new(bcu_rc(1));
        let supported = mapper.supported_instructions();
        let opcodes: Vec<XilOpcode> = supported.iter().map(|i| i.opcode).collect();
        assert_eq!(
            opcodes,
            vec![
                XilOpcode::Goto,
                XilOpcode::BranchIfTrue,
                XilOpcode::BranchIfFalse
            ]
        );
    }

    #[test]
    fn bcu_mapper_maps_goto_on_bound_host() {
        let host = bcu_rc(2);
        let mapper = BcuMapper::new(host.clone());
        let site = FuSite::Bcu(host);
        let instr = InstructionSet::goto(BranchLabel::new(4));
        let mappings = mapper.try_map(&site, &instr, &[], &[]).unwrap();
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].resource_kind(), ResourceKind::Exclusive);
        assert_eq!(mappings[0].latency(), 2);
        assert_eq!(mappings[0].initiation_interval(), 1);
    }

    #[test]
    fn bcu_mapper_declines_foreign_bcu() {
        let mapper = BcuMapper::new(bcu_rc(1));
        let other = FuSite::Bcu(bcu_rc(1));
        let instr = InstructionSet::goto(BranchLabel::new(0));
        assert!(mapper.try_map(&other, &instr, &[], &[]).unwrap().is_empty());
    }

    #[test]
    fn bcu_mapper_declines_mux_site() {
        let mapper = BcuMapper::new(bcu_rc(1));
        let site = FuSite::Mux2(Rc::new(RefCell::new(Mux2::new("m", 4))));
        let instr = InstructionSet::goto(BranchLabel::new(0));
        assert!(mapper.try_map(&site, &instr, &[], &[]).unwrap().is_empty());
    }

    #[test]
    fn bcu_mapper_declines_select() {
        let host = bcu_rc(1);
        let mapper = BcuMapper::new(host.clone());
        let site = FuSite::Bcu(host);
        let instr = InstructionSet::select();
        assert!(mapper.try_map(&site, &instr, &[], &[]).unwrap().is_empty());
    }

    #[test]
    fn bcu_mapper_rejects_branch_without_target() {
        let host = bcu_rc(1);
        let mapper = BcuMapper::new(host.clone());
        let site = FuSite::Bcu(host);
        let malformed = XilInstr {
            opcode: XilOpcode::Goto,
            target: None,
        };
        let err = mapper.try_map(&site, &malformed, &[], &[]).unwrap_err();
        assert!(matches!(
            err,
            XilError::NotImplemented {
                opcode: XilOpcode::Goto
            }
        ));
    }

    #[test]
    fn bcu_mapper_yields_each_branch_kind() {
        let host = bcu_rc(1);
        let mapper = BcuMapper::new(host.clone());
        let site = FuSite::Bcu(host);
        let label = BranchLabel::new(9);
        for instr in [
            InstructionSet::goto(label),
            InstructionSet::branch_if_true(label),
            InstructionSet::branch_if_false(label),
        ] {
            let mappings = mapper.try_map(&site, &instr, &[bit()], &[]).unwrap();
            assert_eq!(mappings.len(), 1, "no mapping for {}", instr.opcode);
        }
    }

    #[test]
    fn bcu_try_allocate_reuses_bound_host() {
        let host = bcu_rc(1);
        let mapper = BcuMapper::new(host.clone());
        let mut root = DesignRoot::new();
        let mut project = Project::new();
        let instr = InstructionSet::goto(BranchLabel::new(1));
        let mapping = mapper
            .try_allocate(&mut root, &instr, &[], &[], &mut project)
            .unwrap()
            .unwrap();
        // No new component was registered; the mapping is on the bound host.
        assert!(root.is_empty());
        let XilMapping::Bcu(m) = mapping else {
            panic!("expected a BCU mapping");
        };
        assert!(Rc::ptr_eq(m.host(), &host));
    }

    #[test]
    fn bcu_try_allocate_declines_select() {
        let mapper = BcuMapper::new(bcu_rc(1));
        let mut root = DesignRoot::new();
        let mut project = Project::new();
        let instr = InstructionSet::select();
        assert!(mapper
            .try_allocate(&mut root, &instr, &[], &[], &mut project)
            .unwrap()
            .is_none());
    }

    #[test]
    fn mux_mapper_supported_instructions() {
        let mapper = Mux2Mapper::new(Box::new(DefaultLowering));
        let supported = mapper.supported_instructions();
        assert_eq!(supported.len(), 1);
        assert_eq!(supported[0].opcode, XilOpcode::Select);
    }

    #[test]
    fn mux_mapper_allocates_width_from_second_operand() {
        let mapper = Mux2Mapper::new(Box::new(DefaultLowering));
        let mut root = DesignRoot::new();
        let mut project = Project::new();
        let instr = InstructionSet::select();
        let mapping = mapper
            .try_allocate(
                &mut root,
                &instr,
                &[bit(), u(16), u(16)],
                &[u(16)],
                &mut project,
            )
            .unwrap()
            .unwrap();
        assert_eq!(root.len(), 1);
        assert_eq!(mapping.latency(), 0);
        let XilMapping::Mux2(m) = mapping else {
            panic!("expected a MUX2 mapping");
        };
        assert_eq!(m.host().borrow().width(), 16);
    }

    #[test]
    fn mux_mapper_maps_equal_width_site() {
        let mapper = Mux2Mapper::new(Box::new(DefaultLowering));
        let site = FuSite::Mux2(Rc::new(RefCell::new(Mux2::new("m", 8))));
        let instr = InstructionSet::select();
        let mappings = mapper
            .try_map(&site, &instr, &[bit(), u(8), u(8)], &[u(8)])
            .unwrap();
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].resource_kind(), ResourceKind::Lightweight);
    }

    #[test]
    fn mux_mapper_declines_width_mismatch() {
        let mapper = Mux2Mapper::new(Box::new(DefaultLowering));
        let site = FuSite::Mux2(Rc::new(RefCell::new(Mux2::new("m", 8))));
        let instr = InstructionSet::select();
        assert!(mapper
            .try_map(&site, &instr, &[bit(), u(16), u(16)], &[u(16)])
            .unwrap()
            .is_empty());
    }

    #[test]
    fn mux_mapper_declines_branches() {
        let mapper = Mux2Mapper::new(Box::new(DefaultLowering));
        let mut root = DesignRoot::new();
        let mut project = Project::new();
        let instr = InstructionSet::goto(BranchLabel::new(0));
        assert!(mapper
            .try_allocate(&mut root, &instr, &[], &[], &mut project)
            .unwrap()
            .is_none());
        assert!(root.is_empty());
    }

    #[test]
    fn mux_mapper_allocation_names_are_unique() {
        let mapper = Mux2Mapper::new(Box::new(DefaultLowering));
        let mut root = DesignRoot::new();
        let mut project = Project::new();
        let instr = InstructionSet::select();
        let types = [bit(), u(4), u(4)];
        let a = mapper
            .try_allocate(&mut root, &instr, &types, &[u(4)], &mut project)
            .unwrap()
            .unwrap();
        let b = mapper
            .try_allocate(&mut root, &instr, &types, &[u(4)], &mut project)
            .unwrap()
            .unwrap();
        assert_eq!(root.len(), 2);
        assert_ne!(a.site_name(), b.site_name());
    }
}
