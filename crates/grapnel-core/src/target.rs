//! # Collaborator Interfaces
//!
//! The unwind engine touches the debugged process only through the traits in
//! this module. The surrounding debugger supplies implementations backed by
//! its symbol tables, its unwind-info parsers, and its live-target plumbing;
//! tests supply scripted fakes. Every operation is synchronous and returns
//! the crate [`Result`] so collaborator failures degrade the same way local
//! ones do.

use std::sync::Arc;

use crate::error::{Result, UnwindError};
use crate::plan::UnwindPlan;
use crate::types::{Address, GenericRegister, RegisterInfo, RegisterKind, RegisterSet, RegisterValue};

/// The thread's canonical register catalog
///
/// Enumerates registers and register sets, and converts register numbers
/// between numbering kinds. Pure and side-effect-free; conversion may fail
/// with "no mapping".
pub trait RegisterCatalog
{
    /// Number of registers in the catalog.
    fn register_count(&self) -> usize;

    /// Metadata for the register with debugger-kind number `regnum`.
    fn register_info(&self, regnum: u32) -> Option<&RegisterInfo>;

    /// Number of register sets.
    fn register_set_count(&self) -> usize;

    /// The register set at `index`.
    fn register_set(&self, index: usize) -> Option<&RegisterSet>;

    /// Convert `num` from one numbering kind to another.
    ///
    /// Must be bidirectionally consistent: if `(from, num)` maps to `to_num`,
    /// then `(to, to_num)` maps back to `num`.
    fn convert_between_kinds(&self, from: RegisterKind, num: u32, to: RegisterKind) -> Option<u32>;

    /// Debugger-kind number of a role-based register, if the target has one.
    fn generic_register(&self, role: GenericRegister) -> Option<u32>
    {
        self.convert_between_kinds(RegisterKind::Generic, role.number(), RegisterKind::Debugger)
    }
}

/// Register access against the real, stopped thread
///
/// Only frame 0's registers are directly observable; everything older is
/// reconstructed. Fails if the thread is not stopped or the register is
/// unsupported.
pub trait ThreadRegisters
{
    /// Read the live value of the register with debugger-kind number `regnum`.
    fn read_register(&self, regnum: u32) -> Result<RegisterValue>;

    /// Write a live register of the stopped thread.
    fn write_register(&mut self, regnum: u32, value: &RegisterValue) -> Result<()>;
}

/// Byte-level access to the inferior's memory
///
/// Fails on unmapped or unreadable addresses.
pub trait InferiorMemory
{
    /// Fill `buf` from inferior memory starting at `address`.
    fn read(&self, address: Address, buf: &mut [u8]) -> Result<()>;

    /// Write `bytes` to inferior memory starting at `address`.
    fn write(&mut self, address: Address, bytes: &[u8]) -> Result<()>;
}

/// Source of pre-parsed unwind plans
///
/// The engine never inspects binaries or debug info; whoever implements this
/// trait has already turned them into [`UnwindPlan`] tables.
pub trait UnwindPlanSource
{
    /// A minimal plan for the function containing `pc`, covering only the
    /// registers needed to find the next frame. Optional per function.
    fn fast_plan(&self, pc: Address) -> Option<Arc<UnwindPlan>>;

    /// The full plan for the function containing `pc`.
    fn full_plan(&self, pc: Address) -> Option<Arc<UnwindPlan>>;

    /// The architecture-default heuristic plan (frame-pointer chasing or
    /// equivalent), valid at any address.
    fn fallback_plan(&self) -> Option<Arc<UnwindPlan>>;
}

/// Symbol-context queries the frame state machine needs
pub trait SymbolQuery
{
    /// Half-open `[start, end)` bounds of the function containing `pc`.
    fn function_bounds(&self, pc: Address) -> Option<(Address, Address)>;

    /// Whether the routine containing `pc` is an asynchronous signal/trap
    /// handler.
    fn is_trap_handler(&self, pc: Address) -> bool;
}

/// Saved-register records for debugger-injected function calls
///
/// When the debugger itself pushed a call onto the inferior's stack, the
/// caller's registers were recorded at injection time; such frames bypass
/// plan-based resolution entirely.
pub trait InjectedCallRegisters
{
    /// Whether `pc` lies inside a debugger-injected call.
    fn is_injected_call(&self, pc: Address) -> bool;

    /// The caller's register values recorded when the call was injected,
    /// as `(debugger-kind number, value)` pairs.
    fn saved_registers(&self, pc: Address) -> Option<Vec<(u32, RegisterValue)>>;
}

/// Implementation for targets that never inject calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInjectedCalls;

impl InjectedCallRegisters for NoInjectedCalls
{
    fn is_injected_call(&self, _pc: Address) -> bool
    {
        false
    }

    fn saved_registers(&self, _pc: Address) -> Option<Vec<(u32, RegisterValue)>>
    {
        None
    }
}

/// Borrowed bundle of everything the engine needs from the debugger
///
/// The session holds one of these for its lifetime; all collaborator access
/// goes through it.
pub struct Target<'a>
{
    /// The thread's register catalog.
    pub catalog: &'a dyn RegisterCatalog,
    /// Live register access for the stopped thread.
    pub thread: &'a mut dyn ThreadRegisters,
    /// Inferior memory access.
    pub memory: &'a mut dyn InferiorMemory,
    /// Pre-parsed unwind plans.
    pub plans: &'a dyn UnwindPlanSource,
    /// Function bounds and trap-handler classification.
    pub symbols: &'a dyn SymbolQuery,
    /// Records for debugger-injected calls.
    pub injected: &'a dyn InjectedCallRegisters,
}

impl Target<'_>
{
    /// Debugger-kind number of the program counter register.
    ///
    /// Every supported target has one; a catalog without it cannot be
    /// unwound at all.
    pub(crate) fn pc_regnum(&self) -> Result<u32>
    {
        self.catalog.generic_register(GenericRegister::Pc).ok_or(UnwindError::NoMapping {
            kind: RegisterKind::Generic,
            num: GenericRegister::Pc.number(),
        })
    }
}
