//! # Frame Register Context
//!
//! The facade the rest of the debugger talks to: register read/write and
//! register-set enumeration for one materialized frame, plus the frame's
//! identity queries (validity, CFA, PCs) and register-kind conversion.
//!
//! Frame 0 reads come straight off the live thread. Everything older goes
//! through the session's location resolver, which may consult any newer
//! frame's unwind rules and caches what it learns along the way.

use crate::error::{Result, UnwindError};
use crate::frame::FrameType;
use crate::regnum::RegisterNumber;
use crate::session::UnwindSession;
use crate::types::{Address, RegisterInfo, RegisterKind, RegisterSet, RegisterValue};

/// Register context for one frame of an [`UnwindSession`]
///
/// Obtained from [`UnwindSession::frame_context`]. Borrows the session
/// mutably because register resolution fills per-frame caches as it works.
pub struct FrameRegisterContext<'s, 'a>
{
    session: &'s mut UnwindSession<'a>,
    index: usize,
}

impl<'s, 'a> FrameRegisterContext<'s, 'a>
{
    pub(crate) fn new(session: &'s mut UnwindSession<'a>, index: usize) -> Self
    {
        Self { session, index }
    }

    /// This context's frame number; 0 is the innermost, live frame.
    pub fn frame_number(&self) -> u32
    {
        self.index as u32
    }

    // ------------------------------------------------------------------
    // Static catalog queries; these never fail.
    // ------------------------------------------------------------------

    /// Number of registers in the thread's catalog.
    pub fn register_count(&self) -> usize
    {
        self.session.target.catalog.register_count()
    }

    /// Catalog metadata for the register with debugger-kind number `regnum`.
    pub fn register_info_at(&self, regnum: u32) -> Option<&RegisterInfo>
    {
        self.session.target.catalog.register_info(regnum)
    }

    /// Number of register sets in the thread's catalog.
    pub fn register_set_count(&self) -> usize
    {
        self.session.target.catalog.register_set_count()
    }

    /// The register set at `index`.
    pub fn register_set_at(&self, index: usize) -> Option<&RegisterSet>
    {
        self.session.target.catalog.register_set(index)
    }

    // ------------------------------------------------------------------
    // Frame identity
    // ------------------------------------------------------------------

    /// True unless the frame was classified invalid.
    pub fn is_valid(&self) -> bool
    {
        self.session.frames[self.index].is_valid()
    }

    /// The frame's classification.
    pub fn frame_type(&self) -> FrameType
    {
        self.session.frames[self.index].frame_type()
    }

    /// Whether this frame belongs to an asynchronous signal/trap handler.
    pub fn is_trap_handler_frame(&self) -> bool
    {
        self.frame_type() == FrameType::TrapHandler
    }

    /// Whether this frame was provisionally accepted as possibly-incorrect.
    pub fn is_skip_frame(&self) -> bool
    {
        self.frame_type() == FrameType::Skip
    }

    /// Canonical frame address; `None` only if computation failed.
    pub fn cfa(&self) -> Option<Address>
    {
        self.session.frames[self.index].cfa()
    }

    /// Entry address of the frame's function, when symbols resolved it.
    pub fn start_pc(&self) -> Option<Address>
    {
        self.session.frames[self.index].start_pc()
    }

    /// The frame's current PC within its function.
    pub fn read_pc(&self) -> Option<Address>
    {
        self.session.frames[self.index].current_pc()
    }

    // ------------------------------------------------------------------
    // Register kind conversion
    // ------------------------------------------------------------------

    /// Map an externally supplied `(kind, number)` pair to this frame's
    /// native (debugger-kind) register number.
    pub fn convert_register_kind(&self, kind: RegisterKind, num: u32) -> Option<u32>
    {
        self.register_number(kind, num).as_kind(RegisterKind::Debugger)
    }

    /// A [`RegisterNumber`] translator bound to this frame's catalog.
    pub fn register_number(&self, kind: RegisterKind, num: u32) -> RegisterNumber<'a>
    {
        RegisterNumber::new(self.session.target.catalog, kind, num)
    }

    // ------------------------------------------------------------------
    // Register access
    // ------------------------------------------------------------------

    /// Read the frame's value of the register with debugger-kind number
    /// `regnum`.
    ///
    /// Frame 0 reads the live thread. Older frames resolve where the value
    /// was preserved - inferior memory, another frame's register, a
    /// constant - and read from there. Fails with
    /// [`UnwindError::Unavailable`] when no location can be determined.
    pub fn read_register(&mut self, regnum: u32) -> Result<RegisterValue>
    {
        self.check_valid()?;
        if self.index == 0 {
            return self.session.target.thread.read_register(regnum);
        }
        let pc_search = self.session.target.pc_regnum().ok() == Some(regnum);
        let resolved = self.session.search_for_saved_location(regnum, self.index - 1, pc_search);
        let byte_size = self.session.register_byte_size(regnum);
        self.session.read_location(&resolved, regnum, byte_size)
    }

    /// Write the frame's value of the register with debugger-kind number
    /// `regnum`.
    ///
    /// Writable only when the resolved location is a concrete memory address
    /// or, for frame 0, a live register; a location that merely aliases
    /// another frame's register recurses to the storage that ultimately owns
    /// it. CFA-derived and constant locations are not writable.
    pub fn write_register(&mut self, regnum: u32, value: &RegisterValue) -> Result<()>
    {
        self.check_valid()?;
        if self.index == 0 {
            return self.session.target.thread.write_register(regnum, value);
        }
        let pc_search = self.session.target.pc_regnum().ok() == Some(regnum);
        let resolved = self.session.search_for_saved_location(regnum, self.index - 1, pc_search);
        self.session.write_location(&resolved, regnum, value)
    }

    /// Read an address-sized register as a `u64`, accepting any numbering
    /// kind.
    pub fn read_gpr_value(&mut self, kind: RegisterKind, num: u32) -> Result<u64>
    {
        self.check_valid()?;
        let regnum = self
            .convert_register_kind(kind, num)
            .ok_or(UnwindError::NoMapping { kind, num })?;
        self.session.read_gpr_for_frame(self.index as u32, regnum)
    }

    /// Drop every cached register location for this frame, forcing
    /// re-resolution on the next read. Frame identity (CFA, PC, type) is
    /// not recomputed.
    pub fn invalidate_all_registers(&mut self)
    {
        self.session.frames[self.index].locations.clear();
    }

    /// Resolve and read every register in the catalog.
    ///
    /// The result is indexed by debugger-kind register number; registers
    /// whose value cannot be determined for this frame are `None`.
    pub fn read_all_register_values(&mut self) -> Vec<Option<RegisterValue>>
    {
        (0..self.register_count() as u32)
            .map(|regnum| self.read_register(regnum).ok())
            .collect()
    }

    /// Write back a register snapshot produced by
    /// [`read_all_register_values`](Self::read_all_register_values).
    ///
    /// `None` entries are skipped. Fails on the first register whose
    /// resolved location is not writable; earlier writes are not undone.
    pub fn write_all_register_values(&mut self, values: &[Option<RegisterValue>]) -> Result<()>
    {
        for (regnum, value) in values.iter().enumerate() {
            if let Some(value) = value {
                self.write_register(regnum as u32, value)?;
            }
        }
        Ok(())
    }

    fn check_valid(&self) -> Result<()>
    {
        if self.is_valid() {
            Ok(())
        } else {
            Err(UnwindError::InvalidFrame(self.frame_number()))
        }
    }
}
