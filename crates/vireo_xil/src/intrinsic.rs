//! Debug intrinsic recognized by the decompiler front-end.
//!
//! Behavioral models call [`debug_break`] at points where the author wants
//! the decompiler to plant a breakpoint. The decompiler recognizes the call
//! by [`DEBUG_BREAK_NAME`]; during native execution of the behavioral model
//! the function does nothing. The core depends only on the intrinsic's
//! presence, not on how the front-end detects it.

/// The fully qualified name the decompiler matches call sites against.
pub const DEBUG_BREAK_NAME: &str = "vireo::intrinsic::debug_break";

/// A decompiler breakpoint marker. No-op at run time.
#[inline(never)]
pub fn debug_break() {}
