//! # Unwind Session
//!
//! The session owns the frame chain and everything that grows it: the
//! zeroth/non-zeroth frame initialization state machine, unwind-plan
//! selection with fallback, loop detection, and the register-location
//! resolver that later register reads go through.
//!
//! Frames are materialized strictly inside-out. Frame 0 is read straight off
//! the live thread; every older frame is reconstructed by asking the frames
//! below it where the caller's registers were saved. The chain is an
//! index-based arena (`Vec<Frame>`, frame number == index), so "the frame
//! below" is plain index arithmetic.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{Result, UnwindError};
use crate::frame::{Frame, FrameType, RegisterLocation, SkipPolicy};
use crate::plan::{CfaRule, SavedRegisterRule, UnwindPlan};
use crate::target::Target;
use crate::types::{Address, GenericRegister, RegisterKind, RegisterValue};

/// A register location pinned to the frame whose CFA (or live state) anchors
/// it. This is what the chain-walking search returns: always one of the
/// concrete [`RegisterLocation`] variants, never `SameAsCaller`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedLocation
{
    pub(crate) frame: usize,
    pub(crate) location: RegisterLocation,
}

// State saved when a frame provisionally adopts its fallback plan, so the
// full-plan result can be restored if the fallback does no better.
struct PlanSnapshot
{
    cfa: Option<Address>,
    locations: std::collections::BTreeMap<u32, RegisterLocation>,
}

/// The unwind session for one suspended thread
///
/// Created around a [`Target`] bundle; frames are materialized on demand via
/// [`materialize_next_frame`](Self::materialize_next_frame) or driven to
/// completion with [`walk`](Self::walk). All register reads and writes for a
/// frame go through [`frame_context`](Self::frame_context).
pub struct UnwindSession<'a>
{
    pub(crate) target: Target<'a>,
    policy: SkipPolicy,
    pub(crate) frames: Vec<Frame>,
    complete: bool,
    // Why the most recent frame candidate was rejected; promoted to
    // `stop_reason` when the walk completes on it.
    last_failure: Option<UnwindError>,
    stop_reason: Option<UnwindError>,
}

impl<'a> UnwindSession<'a>
{
    /// Create a session with the default [`SkipPolicy`].
    pub fn new(target: Target<'a>) -> Self
    {
        Self::with_policy(target, SkipPolicy::default())
    }

    /// Create a session with an explicit skip-frame policy.
    pub fn with_policy(target: Target<'a>, policy: SkipPolicy) -> Self
    {
        Self {
            target,
            policy,
            frames: Vec::new(),
            complete: false,
            last_failure: None,
            stop_reason: None,
        }
    }

    /// Why the walk stopped, once it has.
    ///
    /// `None` both while frames can still be materialized and after a clean
    /// end of stack; a truncated walk reports the terminating condition
    /// ([`UnwindError::LoopDetected`], [`UnwindError::PlanSelection`], or
    /// [`UnwindError::InvalidFrame`]).
    pub fn stop_reason(&self) -> Option<&UnwindError>
    {
        self.stop_reason.as_ref()
    }

    /// Number of frames materialized so far.
    pub fn frame_count(&self) -> usize
    {
        self.frames.len()
    }

    /// The materialized frames, innermost first.
    pub fn frames(&self) -> &[Frame]
    {
        &self.frames
    }

    /// The frame at `index`, if materialized.
    pub fn frame(&self, index: usize) -> Option<&Frame>
    {
        self.frames.get(index)
    }

    /// `(pc, cfa)` of the frame at `index`, if materialized and settled.
    pub fn frame_info_at(&self, index: usize) -> Option<(Address, Address)>
    {
        let frame = self.frames.get(index)?;
        Some((frame.current_pc?, frame.cfa?))
    }

    /// A register context for the frame at `index`.
    pub fn frame_context(&mut self, index: usize) -> Option<crate::context::FrameRegisterContext<'_, 'a>>
    {
        if index < self.frames.len() {
            Some(crate::context::FrameRegisterContext::new(self, index))
        } else {
            None
        }
    }

    /// Materialize frames until the walk completes or `max_frames` is
    /// reached. Returns the resulting frame count.
    pub fn walk(&mut self, max_frames: usize) -> usize
    {
        while self.frames.len() < max_frames {
            if self.materialize_next_frame().is_none() {
                break;
            }
        }
        self.frames.len()
    }

    /// Materialize the next older frame.
    ///
    /// Returns the new frame's number, or `None` once the walk has completed
    /// - cleanly at the end of the stack, or because the next frame could
    /// not be trusted. A bad stack truncates the backtrace; it never errors
    /// out of the session.
    pub fn materialize_next_frame(&mut self) -> Option<u32>
    {
        if self.complete {
            return None;
        }

        if self.frames.is_empty() {
            let frame = self.init_zeroth_frame();
            if !frame.is_valid() {
                self.complete = true;
                self.stop_reason = self.last_failure.take();
            }
            self.frames.push(frame);
            return Some(0);
        }

        let number = self.frames.len() as u32;
        let below = self.frames.len() - 1;
        let mut candidate = self.init_non_zeroth_frame(number);

        if !candidate.is_valid() || candidate.frame_type() == FrameType::Skip {
            // The advance out of the frame below went wrong. Give the frame
            // below one shot on the architecture-default plan and redo the
            // advance; if that is no better, it stays on its full plan.
            if let Some(snapshot) = self.adopt_fallback_plan(below) {
                let retry = self.init_non_zeroth_frame(number);
                if retry.is_valid() && retry.frame_type() != FrameType::Skip {
                    candidate = retry;
                } else {
                    debug!(frame = below, "fallback unwind plan did no better, restoring full plan");
                    self.revert_fallback_plan(below, snapshot);
                }
            }
        }

        if self.frames[below].frame_type() == FrameType::Skip {
            let skip_cfa = self.frames[below].cfa;
            let recovered = candidate.is_valid()
                && candidate.frame_type() != FrameType::Skip
                && candidate.cfa > skip_cfa;
            if !recovered {
                // Two unreliable frames in a row: drop the provisional frame
                // as well and end the walk.
                debug!(frame = below, "skip frame not confirmed by the frame above it");
                self.frames.pop();
                self.complete = true;
                self.stop_reason = Some(UnwindError::InvalidFrame(below as u32));
                return None;
            }
        }

        if !candidate.is_valid() {
            self.complete = true;
            self.stop_reason = self.last_failure.take();
            return None;
        }

        self.last_failure = None;
        self.frames.push(candidate);
        Some(number)
    }

    // ------------------------------------------------------------------
    // Frame initialization state machine
    // ------------------------------------------------------------------

    fn init_zeroth_frame(&mut self) -> Frame
    {
        let mut frame = Frame::new(0);

        let pc = self
            .target
            .pc_regnum()
            .and_then(|regnum| self.target.thread.read_register(regnum))
            .ok()
            .and_then(|value| value.as_u64())
            .map(Address::from);
        let Some(pc) = pc else {
            debug!("could not read the live pc; no frames");
            frame.frame_type = FrameType::Invalid;
            self.last_failure = Some(UnwindError::InvalidFrame(0));
            return frame;
        };
        frame.current_pc = Some(pc);

        if let Some((start, _end)) = self.target.symbols.function_bounds(pc) {
            frame.start_pc = Some(start);
            frame.function_known = true;
            frame.current_offset = Some(pc.value().wrapping_sub(start.value()));
            frame.current_offset_backed_up_one = frame.current_offset;
        }

        if self.target.injected.is_injected_call(pc) {
            frame.frame_type = FrameType::DebuggerCall;
        } else if self.target.symbols.is_trap_handler(pc) {
            frame.frame_type = FrameType::TrapHandler;
        }

        self.select_plans(&mut frame, pc);
        self.settle_cfa(&mut frame);

        match frame.cfa {
            Some(cfa) => {
                debug!(frame = 0, %pc, %cfa, plan = frame.active_plan().map_or("<none>", |p| p.source()),
                       "initialized zeroth frame");
            }
            None => {
                debug!(frame = 0, %pc, "no unwind plan yields a CFA for the zeroth frame");
                frame.frame_type = FrameType::Invalid;
                self.last_failure = Some(UnwindError::PlanSelection(pc));
            }
        }
        frame
    }

    fn init_non_zeroth_frame(&mut self, number: u32) -> Frame
    {
        let mut frame = Frame::new(number);
        let below = (number - 1) as usize;

        // The frame a trap handler or injected call interrupted has its
        // complete register state on record, volatiles included.
        frame.all_registers_available = matches!(
            self.frames[below].frame_type(),
            FrameType::TrapHandler | FrameType::DebuggerCall
        );

        let Some(pc) = self.read_caller_pc(below) else {
            trace!(frame = number, "no saved return address below; end of stack");
            frame.frame_type = FrameType::Invalid;
            self.last_failure = None;
            return frame;
        };
        if pc == Address::ZERO {
            trace!(frame = number, "saved return address is zero; end of stack");
            frame.frame_type = FrameType::Invalid;
            self.last_failure = None;
            return frame;
        }
        frame.current_pc = Some(pc);

        // The return address points past the call instruction, so symbol and
        // plan lookups back up one byte; register resolution does not. A
        // frame interrupted by a trap has its exact pc, nothing to back up.
        let backed_up = !frame.all_registers_available;
        let lookup_pc = if backed_up { pc - 1 } else { pc };

        if let Some((start, _end)) = self.target.symbols.function_bounds(lookup_pc) {
            frame.start_pc = Some(start);
            frame.function_known = true;
            frame.current_offset = Some(pc.value().wrapping_sub(start.value()));
            frame.current_offset_backed_up_one = Some(lookup_pc.value().wrapping_sub(start.value()));
        }

        if self.target.injected.is_injected_call(pc) {
            frame.frame_type = FrameType::DebuggerCall;
        } else if self.target.symbols.is_trap_handler(lookup_pc) {
            frame.frame_type = FrameType::TrapHandler;
        }

        self.select_plans(&mut frame, lookup_pc);
        self.settle_cfa(&mut frame);

        let Some(cfa) = frame.cfa else {
            debug!(frame = number, %pc, "no unwind plan yields a CFA; ending walk");
            frame.frame_type = FrameType::Invalid;
            self.last_failure = Some(UnwindError::PlanSelection(pc));
            return frame;
        };

        if self.check_if_looping_stack(cfa) {
            // LoopDetected: reported as an invalid frame, with its own note
            // so diagnostics can tell the two apart.
            debug!(frame = number, %cfa, "stack loop detected; ending walk");
            frame.frame_type = FrameType::Invalid;
            self.last_failure = Some(UnwindError::LoopDetected(cfa));
            return frame;
        }

        // Reliability assessment. Trap handlers legitimately run on side
        // stacks, so the monotonic-CFA requirement does not apply across
        // them.
        let below_cfa = self.frames[below].cfa;
        let across_trap = frame.frame_type == FrameType::TrapHandler
            || self.frames[below].frame_type() == FrameType::TrapHandler;
        let monotonic = below_cfa.is_none_or(|below_cfa| cfa > below_cfa);
        let unreliable = (self.policy.require_monotonic_cfa && !monotonic && !across_trap)
            || (self.policy.require_known_function && !frame.function_known);

        if unreliable && frame.frame_type == FrameType::Normal {
            if number == 1 {
                // One bogus frame out of frame 0 is tolerated; following the
                // frame pointer chain often gets back on track.
                debug!(frame = number, %pc, %cfa, "frame looks unreliable; provisionally keeping it");
                frame.frame_type = FrameType::Skip;
            } else {
                debug!(frame = number, %pc, %cfa, "frame looks unreliable; ending walk");
                frame.frame_type = FrameType::Invalid;
                self.last_failure = Some(UnwindError::InvalidFrame(number));
                return frame;
            }
        }

        debug!(frame = number, %pc, %cfa, plan = frame.active_plan().map_or("<none>", |p| p.source()),
               "initialized frame");
        frame
    }

    // Same CFA recurring anywhere in the chain means the unwind is going in
    // circles; scan outward-to-inward.
    fn check_if_looping_stack(&self, cfa: Address) -> bool
    {
        self.frames.iter().rev().any(|frame| frame.cfa == Some(cfa))
    }

    // ------------------------------------------------------------------
    // Unwind plan selection
    // ------------------------------------------------------------------

    fn select_plans(&mut self, frame: &mut Frame, lookup_pc: Address)
    {
        frame.fast_plan = self.target.plans.fast_plan(lookup_pc);
        if let Some(full) = self.target.plans.full_plan(lookup_pc) {
            if self.validate_plan_for_frame(&full, lookup_pc, frame).is_some() {
                frame.full_plan = Some(full);
            } else {
                trace!(frame = frame.number, plan = full.source(), "full plan rejected for current pc");
            }
        }
    }

    /// Check that `lookup_pc` falls within a row of `plan` and that the row
    /// can produce a CFA. Returns the matching row's offset.
    fn validate_plan_for_frame(&self, plan: &UnwindPlan, lookup_pc: Address, frame: &Frame) -> Option<u64>
    {
        if !plan.covers_pc(lookup_pc) {
            return None;
        }
        let row = plan.row_for_offset(frame.current_offset.unwrap_or(0))?;
        if matches!(row.cfa(), CfaRule::Unsupported) {
            return None;
        }
        Some(row.offset())
    }

    // Compute the frame's CFA from the first plan that manages it: fast,
    // then full, then the architecture default (which the frame adopts).
    fn settle_cfa(&mut self, frame: &mut Frame)
    {
        let number = frame.number;
        let offset = frame.current_offset.unwrap_or(0);

        for plan in [frame.fast_plan.clone(), frame.full_plan.clone()].into_iter().flatten() {
            if let Some(cfa) = self.compute_cfa(number, &plan, offset) {
                frame.cfa = Some(cfa);
                return;
            }
        }
        if let Some(fallback) = self.target.plans.fallback_plan() {
            if let Some(cfa) = self.compute_cfa(number, &fallback, offset) {
                debug!(frame = number, plan = fallback.source(), "adopting fallback unwind plan");
                frame.fallback_plan = Some(fallback);
                frame.cfa = Some(cfa);
            }
        }
    }

    // CFA = base register + offset, with the base read live (frame 0) or
    // resolved out of the frames below. A zero CFA is never valid.
    fn compute_cfa(&mut self, number: u32, plan: &Arc<UnwindPlan>, row_offset: u64) -> Option<Address>
    {
        let row = plan.row_for_offset(row_offset)?;
        let CfaRule::RegisterPlusOffset { regnum, offset } = *row.cfa() else {
            return None;
        };
        let base_regnum = self.to_debugger_kind(plan.register_kind(), regnum)?;
        let base = self.read_gpr_for_frame(number, base_regnum).ok()?;
        let cfa = Address::from(base).checked_add_signed(offset)?;
        if cfa == Address::ZERO {
            return None;
        }
        Some(cfa)
    }

    /// Substitute the architecture-default plan for the frame at `index` and
    /// recompute its CFA. Returns the replaced state for a possible revert,
    /// or `None` when there is no fallback to try (or it computes no CFA).
    fn adopt_fallback_plan(&mut self, index: usize) -> Option<PlanSnapshot>
    {
        if self.frames[index].fallback_plan.is_some() {
            return None;
        }
        let fallback = self.target.plans.fallback_plan()?;
        let number = self.frames[index].number;
        let offset = self.frames[index].current_offset.unwrap_or(0);
        let cfa = self.compute_cfa(number, &fallback, offset)?;

        let frame = &mut self.frames[index];
        let snapshot = PlanSnapshot {
            cfa: frame.cfa,
            locations: std::mem::take(&mut frame.locations),
        };
        frame.fallback_plan = Some(fallback);
        frame.cfa = Some(cfa);
        debug!(frame = number, %cfa, "retrying advance on the fallback unwind plan");
        Some(snapshot)
    }

    fn revert_fallback_plan(&mut self, index: usize, snapshot: PlanSnapshot)
    {
        let frame = &mut self.frames[index];
        frame.fallback_plan = None;
        frame.cfa = snapshot.cfa;
        frame.locations = snapshot.locations;
    }

    // ------------------------------------------------------------------
    // Register location resolution
    // ------------------------------------------------------------------

    /// Where did the frame at `index` save its CALLER's copy of `regnum`?
    ///
    /// `Some` is a definitive, memoized answer (including `Unavailable` for
    /// explicitly-undefined registers); `None` means the frame's plans leave
    /// the register unspecified and the search should keep descending.
    pub(crate) fn saved_location_for_register(&mut self, index: usize, regnum: u32) -> Option<RegisterLocation>
    {
        if let Some(cached) = self.frames[index].locations.get(&regnum) {
            return Some(cached.clone());
        }

        // Debugger-injected call frames bypass plan-based resolution: the
        // caller's registers were recorded when the call was pushed.
        if self.frames[index].frame_type() == FrameType::DebuggerCall {
            let pc = self.frames[index].current_pc?;
            let location = self
                .target
                .injected
                .saved_registers(pc)
                .and_then(|saved| {
                    saved
                        .into_iter()
                        .find(|(num, _)| *num == regnum)
                        .map(|(_, value)| RegisterLocation::Constant(value.bytes().into()))
                })
                .unwrap_or(RegisterLocation::Unavailable);
            self.frames[index].locations.insert(regnum, location.clone());
            return Some(location);
        }

        let offset = self.frames[index].current_offset.unwrap_or(0);
        let mut rule = None;
        let mut unspecified = false;

        // A fast plan only covers the registers needed to reach the next
        // frame; absence of a rule there says nothing, so fall through to
        // the frame's active (full or adopted-fallback) plan. A plan that
        // covers all registers makes absence definitive.
        if let Some(fast) = self.frames[index].fast_plan.clone() {
            rule = self.rule_in_plan(&fast, offset, regnum);
            unspecified = rule.is_none() && fast.covers_all_registers();
        }
        if rule.is_none() && !unspecified {
            if let Some(plan) = self.frames[index].active_plan().cloned() {
                rule = self.rule_in_plan(&plan, offset, regnum);
            }
        }

        let location = match rule {
            Some((plan, rule)) => Some(self.location_from_rule(&plan, rule, regnum)),
            None => {
                // The caller's stack pointer needs no rule: it is this
                // frame's CFA by definition.
                let sp = self.target.catalog.generic_register(GenericRegister::Sp);
                if sp == Some(regnum) {
                    Some(RegisterLocation::IsCfa)
                } else {
                    None
                }
            }
        }?;

        trace!(frame = index, regnum, ?location, "resolved saved register location");
        self.frames[index].locations.insert(regnum, location.clone());
        Some(location)
    }

    // The rule for `regnum` (debugger kind) in `plan`'s row at `offset`,
    // paired with the plan for later register-kind translation.
    #[allow(clippy::type_complexity)]
    fn rule_in_plan(&self, plan: &Arc<UnwindPlan>, offset: u64, regnum: u32) -> Option<(Arc<UnwindPlan>, SavedRegisterRule)>
    {
        let plan_num = self.from_debugger_kind(plan.register_kind(), regnum)?;
        let rule = plan.row_for_offset(offset)?.rule_for(plan_num)?.clone();
        Some((Arc::clone(plan), rule))
    }

    fn location_from_rule(&self, plan: &UnwindPlan, rule: SavedRegisterRule, regnum: u32) -> RegisterLocation
    {
        match rule {
            SavedRegisterRule::Undefined => RegisterLocation::Unavailable,
            SavedRegisterRule::SameValue => RegisterLocation::SameAsCaller(regnum),
            SavedRegisterRule::AtCfaOffset(offset) => RegisterLocation::AtCfaOffset(offset),
            SavedRegisterRule::AtAddress(address) => RegisterLocation::AtAddress(address),
            SavedRegisterRule::IsCfa => RegisterLocation::IsCfa,
            SavedRegisterRule::InRegister(plan_num) => {
                match self.to_debugger_kind(plan.register_kind(), plan_num) {
                    Some(other) => RegisterLocation::SameAsCaller(other),
                    None => RegisterLocation::Unavailable,
                }
            }
            SavedRegisterRule::Constant(bytes) => RegisterLocation::Constant(bytes),
        }
    }

    /// Walk from `starting_index` toward frame 0 looking for where the
    /// caller's copy of `regnum` was preserved.
    ///
    /// A concrete rule wins. A volatile register with no rule is never
    /// floated up from a newer frame - the intervening calls may have
    /// clobbered it - so the search stops with `Unavailable` unless the
    /// frame has the complete interrupted state on record. A non-volatile
    /// register with no rule anywhere pins to frame 0's live value.
    /// Searches for the pc never descend more than one level: a deeper
    /// frame's saved pc belongs to a different call.
    pub(crate) fn search_for_saved_location(
        &mut self,
        regnum: u32,
        starting_index: usize,
        pc_search: bool,
    ) -> ResolvedLocation
    {
        let mut want = regnum;
        let mut index = starting_index;
        loop {
            if let Some(location) = self.saved_location_for_register(index, want) {
                match location {
                    RegisterLocation::SameAsCaller(next) => {
                        if index == 0 {
                            return ResolvedLocation {
                                frame: 0,
                                location: RegisterLocation::InLiveRegister(next),
                            };
                        }
                        want = next;
                        index -= 1;
                        continue;
                    }
                    concrete => {
                        return ResolvedLocation {
                            frame: index,
                            location: concrete,
                        }
                    }
                }
            }

            if pc_search {
                return ResolvedLocation {
                    frame: index,
                    location: RegisterLocation::Unavailable,
                };
            }

            let volatile = self
                .target
                .catalog
                .register_info(want)
                .is_none_or(|info| info.is_volatile);

            if index == 0 {
                let location = if volatile {
                    RegisterLocation::Unavailable
                } else {
                    RegisterLocation::InLiveRegister(want)
                };
                self.frames[0].locations.insert(want, location.clone());
                return ResolvedLocation { frame: 0, location };
            }
            if volatile && !self.frames[index].all_registers_available {
                return ResolvedLocation {
                    frame: index,
                    location: RegisterLocation::Unavailable,
                };
            }
            index -= 1;
        }
    }

    // ------------------------------------------------------------------
    // Reading and writing through locations
    // ------------------------------------------------------------------

    pub(crate) fn read_location(
        &mut self,
        resolved: &ResolvedLocation,
        regnum: u32,
        byte_size: usize,
    ) -> Result<RegisterValue>
    {
        let unavailable = UnwindError::Unavailable {
            regnum,
            frame: resolved.frame as u32,
        };
        match &resolved.location {
            RegisterLocation::Unavailable | RegisterLocation::SameAsCaller(_) => Err(unavailable),
            RegisterLocation::AtCfaOffset(offset) => {
                let cfa = self.frames[resolved.frame].cfa.ok_or(unavailable)?;
                let address = cfa.checked_add_signed(*offset).ok_or(UnwindError::Memory {
                    address: cfa,
                    len: byte_size,
                })?;
                self.read_memory_value(address, byte_size)
            }
            RegisterLocation::AtAddress(address) => self.read_memory_value(*address, byte_size),
            RegisterLocation::InLiveRegister(live) => self.target.thread.read_register(*live),
            RegisterLocation::IsCfa => {
                let cfa = self.frames[resolved.frame].cfa.ok_or(unavailable)?;
                Ok(RegisterValue::from_u64(cfa.value(), byte_size))
            }
            RegisterLocation::Constant(bytes) => Ok(RegisterValue::from_bytes(bytes)),
        }
    }

    pub(crate) fn write_location(
        &mut self,
        resolved: &ResolvedLocation,
        regnum: u32,
        value: &RegisterValue,
    ) -> Result<()>
    {
        let unavailable = UnwindError::Unavailable {
            regnum,
            frame: resolved.frame as u32,
        };
        match &resolved.location {
            RegisterLocation::AtCfaOffset(offset) => {
                let cfa = self.frames[resolved.frame].cfa.ok_or(unavailable)?;
                let address = cfa.checked_add_signed(*offset).ok_or(UnwindError::Memory {
                    address: cfa,
                    len: value.byte_size(),
                })?;
                self.target.memory.write(address, value.bytes())
            }
            RegisterLocation::AtAddress(address) => self.target.memory.write(*address, value.bytes()),
            RegisterLocation::InLiveRegister(live) => self.target.thread.write_register(*live, value),
            RegisterLocation::Unavailable
            | RegisterLocation::SameAsCaller(_)
            | RegisterLocation::IsCfa
            | RegisterLocation::Constant(_) => Err(unavailable),
        }
    }

    fn read_memory_value(&mut self, address: Address, byte_size: usize) -> Result<RegisterValue>
    {
        let mut buf = [0u8; 16];
        let len = byte_size.min(buf.len());
        self.target.memory.read(address, &mut buf[..len])?;
        Ok(RegisterValue::from_bytes(&buf[..len]))
    }

    /// Address-sized register read for the frame numbered `number`, live for
    /// frame 0 and resolved out of the frames below otherwise. Used by CFA
    /// computation and exposed through the facade.
    pub(crate) fn read_gpr_for_frame(&mut self, number: u32, regnum: u32) -> Result<u64>
    {
        let value = if number == 0 {
            self.target.thread.read_register(regnum)?
        } else {
            let pc_search = self.target.pc_regnum().ok() == Some(regnum);
            let resolved = self.search_for_saved_location(regnum, number as usize - 1, pc_search);
            let byte_size = self.register_byte_size(regnum);
            self.read_location(&resolved, regnum, byte_size)?
        };
        value.as_u64().ok_or(UnwindError::Unavailable {
            regnum,
            frame: number,
        })
    }

    fn read_caller_pc(&mut self, below: usize) -> Option<Address>
    {
        let pc_regnum = self.target.pc_regnum().ok()?;
        let resolved = self.search_for_saved_location(pc_regnum, below, true);
        let byte_size = self.register_byte_size(pc_regnum);
        let value = self.read_location(&resolved, pc_regnum, byte_size).ok()?;
        value.as_u64().map(Address::from)
    }

    // ------------------------------------------------------------------
    // Register kind translation helpers
    // ------------------------------------------------------------------

    pub(crate) fn to_debugger_kind(&self, kind: RegisterKind, num: u32) -> Option<u32>
    {
        if kind == RegisterKind::Debugger {
            return Some(num);
        }
        self.target.catalog.convert_between_kinds(kind, num, RegisterKind::Debugger)
    }

    fn from_debugger_kind(&self, kind: RegisterKind, num: u32) -> Option<u32>
    {
        if kind == RegisterKind::Debugger {
            return Some(num);
        }
        self.target.catalog.convert_between_kinds(RegisterKind::Debugger, num, kind)
    }

    pub(crate) fn register_byte_size(&self, regnum: u32) -> usize
    {
        self.target.catalog.register_info(regnum).map_or(8, |info| info.byte_size)
    }
}
