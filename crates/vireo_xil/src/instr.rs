//! The XIL abstract instruction set.
//!
//! XIL is the instruction IR of the HLS middle-end: an instruction selector
//! hands [`XilInstr`]s to mappers, which bind them to functional units.
//! This core recognizes the control-flow opcodes (`Goto`, `BranchIfTrue`,
//! `BranchIfFalse`) and the data-steering `Select`.

use serde::{Deserialize, Serialize};
use std::fmt;
use vireo_hw::BranchLabel;

/// The opcode of an abstract XIL instruction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum XilOpcode {
    /// Unconditional jump to the operand label.
    Goto,
    /// Jump to the operand label when the condition operand is `'1'`.
    BranchIfTrue,
    /// Jump to the operand label when the condition operand is `'0'`.
    BranchIfFalse,
    /// Steer one of two data operands to the result, chosen by a
    /// condition operand.
    Select,
}

impl XilOpcode {
    /// Returns `true` for the control-transfer opcode family handled by
    /// the branch control unit.
    pub fn is_branch(self) -> bool {
        matches!(
            self,
            XilOpcode::Goto | XilOpcode::BranchIfTrue | XilOpcode::BranchIfFalse
        )
    }
}

impl fmt::Display for XilOpcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            XilOpcode::Goto => "Goto",
            XilOpcode::BranchIfTrue => "BranchIfTrue",
            XilOpcode::BranchIfFalse => "BranchIfFalse",
            XilOpcode::Select => "Select",
        };
        write!(f, "{name}")
    }
}

/// An abstract XIL instruction: an opcode plus, for branches, the target
/// label.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct XilInstr {
    /// The opcode.
    pub opcode: XilOpcode,
    /// The branch target; `None` for non-branch instructions.
    pub target: Option<BranchLabel>,
}

/// Factory for canonical [`XilInstr`] values.
///
/// Instruction selectors construct instructions through this factory so
/// that operand conventions stay in one place.
pub struct InstructionSet;

impl InstructionSet {
    /// An unconditional jump to `label`.
    pub fn goto(label: BranchLabel) -> XilInstr {
        XilInstr {
            opcode: XilOpcode::Goto,
            target: Some(label),
        }
    }

    /// A jump to `label` taken when the condition operand is `'1'`.
    pub fn branch_if_true(label: BranchLabel) -> XilInstr {
        XilInstr {
            opcode: XilOpcode::BranchIfTrue,
            target: Some(label),
        }
    }

    /// A jump to `label` taken when the condition operand is `'0'`.
    pub fn branch_if_false(label: BranchLabel) -> XilInstr {
        XilInstr {
            opcode: XilOpcode::BranchIfFalse,
            target: Some(label),
        }
    }

    /// A select: operand 0 is the condition, operands 1 and 2 are the
    /// data inputs, producing `operand 1` when the condition is `'1'` and
    /// `operand 2` otherwise.
    pub fn select() -> XilInstr {
        XilInstr {
            opcode: XilOpcode::Select,
            target: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_family() {
        assert!(XilOpcode::Goto.is_branch());
        assert!(XilOpcode::BranchIfTrue.is_branch());
        assert!(XilOpcode::BranchIfFalse.is_branch());
        assert!(!XilOpcode::Select.is_branch());
    }

    #[test]
    fn factory_sets_targets() {
        let label = BranchLabel::new(7);
        assert_eq!(InstructionSet::goto(label).target, Some(label));
        assert_eq!(InstructionSet::branch_if_true(label).target, Some(label));
        assert_eq!(InstructionSet::branch_if_false(label).target, Some(label));
        assert_eq!(InstructionSet::select().target, None);
    }

    #[test]
    fn factory_sets_opcodes() {
        let label = BranchLabel::new(0);
        assert_eq!(InstructionSet::goto(label).opcode, XilOpcode::Goto);
        assert_eq!(
            InstructionSet::branch_if_true(label).opcode,
            XilOpcode::BranchIfTrue
        );
        assert_eq!(
            InstructionSet::branch_if_false(label).opcode,
            XilOpcode::BranchIfFalse
        );
        assert_eq!(InstructionSet::select().opcode, XilOpcode::Select);
    }

    #[test]
    fn opcode_display() {
        assert_eq!(format!("{}", XilOpcode::Goto), "Goto");
        assert_eq!(format!("{}", XilOpcode::Select), "Select");
    }

    #[test]
    fn serde_roundtrip() {
        let instr = InstructionSet::branch_if_true(BranchLabel::new(3));
        let json = serde_json::to_string(&instr).unwrap();
        let back: XilInstr = serde_json::from_str(&json).unwrap();
        assert_eq!(instr, back);
    }
}
