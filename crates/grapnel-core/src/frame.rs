//! Per-frame state: classification, identity, and the resolved-location cache.

use std::collections::BTreeMap;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::plan::UnwindPlan;
use crate::types::Address;

/// Classification of a materialized stack frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType
{
    /// An ordinary call frame
    Normal,
    /// A frame belonging to an asynchronous signal/trap handler; the
    /// interrupted frame above it has its complete register state saved
    TrapHandler,
    /// A debugger-injected function call; caller registers come from the
    /// debugger's own record rather than unwinding
    DebuggerCall,
    /// The unwind produced a bogus frame but may get back on track, so one
    /// of these is tolerated before giving up
    Skip,
    /// This frame is invalid - most likely the walk ran past the top (end)
    /// of the stack. Terminal.
    Invalid,
}

/// Where a register's value for a frame can be obtained - never the value
/// itself
///
/// Locations are cached per frame once resolved and never recomputed. The
/// chain-walking search resolves `SameAsCaller` indirections, so facade-level
/// reads only ever see the concrete variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterLocation
{
    /// The value cannot be determined for this frame (distinct from "not yet
    /// computed": this is a definitive, cached answer)
    Unavailable,
    /// Identical to the named register's value in the frame this location is
    /// cached for; resolving continues toward frame 0
    SameAsCaller(u32),
    /// Stored in inferior memory at `CFA + offset` of the owning frame
    AtCfaOffset(i64),
    /// Stored in inferior memory at an absolute address
    AtAddress(Address),
    /// Held live in a register of the real thread (frame 0 only)
    InLiveRegister(u32),
    /// The value equals the owning frame's CFA
    IsCfa,
    /// Fixed by convention; the bytes are the value
    Constant(SmallVec<[u8; 8]>),
}

/// Policy knobs for the one-bad-frame tolerance
///
/// "Looks unreliable" for the second frame of a walk is a heuristic, not a
/// law; these switches document the chosen triggers. Both default to on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipPolicy
{
    /// Treat a CFA that fails to strictly increase over the frame below as
    /// unreliable
    pub require_monotonic_cfa: bool,
    /// Treat a PC that resolves to no known function as unreliable
    pub require_known_function: bool,
}

impl Default for SkipPolicy
{
    fn default() -> Self
    {
        Self {
            require_monotonic_cfa: true,
            require_known_function: true,
        }
    }
}

/// One materialized stack level
///
/// Frames live in the session's arena, indexed by frame number (0 =
/// innermost/live). A frame's CFA, once settled, is stable for its lifetime;
/// the location cache only grows.
#[derive(Debug)]
pub struct Frame
{
    pub(crate) number: u32,
    pub(crate) frame_type: FrameType,
    pub(crate) cfa: Option<Address>,
    pub(crate) start_pc: Option<Address>,
    pub(crate) current_pc: Option<Address>,
    // How far into the function we have executed; None if unknown.
    pub(crate) current_offset: Option<u64>,
    // Same, backed up by one byte on non-zeroth frames where the return
    // address points past the call instruction. Used only for symbol
    // lookups, never for register resolution.
    pub(crate) current_offset_backed_up_one: Option<u64>,
    pub(crate) function_known: bool,
    // False once only non-volatile registers are guaranteed recoverable.
    pub(crate) all_registers_available: bool,
    pub(crate) fast_plan: Option<Arc<UnwindPlan>>,
    pub(crate) full_plan: Option<Arc<UnwindPlan>>,
    pub(crate) fallback_plan: Option<Arc<UnwindPlan>>,
    // Where to find register values for this frame, by debugger-kind number.
    pub(crate) locations: BTreeMap<u32, RegisterLocation>,
}

impl Frame
{
    pub(crate) fn new(number: u32) -> Self
    {
        Self {
            number,
            frame_type: FrameType::Normal,
            cfa: None,
            start_pc: None,
            current_pc: None,
            current_offset: None,
            current_offset_backed_up_one: None,
            function_known: false,
            all_registers_available: number == 0,
            fast_plan: None,
            full_plan: None,
            fallback_plan: None,
            locations: BTreeMap::new(),
        }
    }

    /// Frame number; 0 is the innermost, live frame.
    pub fn number(&self) -> u32
    {
        self.number
    }

    /// The frame's classification.
    pub fn frame_type(&self) -> FrameType
    {
        self.frame_type
    }

    /// Canonical frame address; `None` only if computation failed.
    pub fn cfa(&self) -> Option<Address>
    {
        self.cfa
    }

    /// Entry address of the frame's function, when symbols resolved it.
    pub fn start_pc(&self) -> Option<Address>
    {
        self.start_pc
    }

    /// The frame's current PC (the return address, for non-zeroth frames).
    pub fn current_pc(&self) -> Option<Address>
    {
        self.current_pc
    }

    /// True unless the frame was classified [`FrameType::Invalid`].
    pub fn is_valid(&self) -> bool
    {
        self.frame_type != FrameType::Invalid
    }

    // The plan actually governing this frame's CFA and register rules:
    // fallback once adopted, else full.
    pub(crate) fn active_plan(&self) -> Option<&Arc<UnwindPlan>>
    {
        self.fallback_plan.as_ref().or(self.full_plan.as_ref())
    }
}
