//! # Unwind Plans
//!
//! An unwind plan is an ordered table mapping program-counter ranges within a
//! function to rules for computing the CFA and locating saved registers. The
//! engine consumes plans read-only; it never builds them from binaries -
//! providers hand over finished tables through
//! [`UnwindPlanSource`](crate::target::UnwindPlanSource).
//!
//! Three flavours reach a frame: a *fast* plan covering only the registers
//! needed to find the next frame, a *full* plan covering everything the
//! function's unwind info describes, and an architecture-default *fallback*
//! plan (typically frame-pointer chasing) used when the full plan misbehaves.

use smallvec::SmallVec;

use crate::types::{Address, RegisterKind};

/// How a row computes the canonical frame address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CfaRule
{
    /// CFA = value of `regnum` (in the plan's register kind) plus `offset`
    RegisterPlusOffset
    {
        /// Base register, numbered in the plan's [`RegisterKind`]
        regnum: u32,
        /// Signed byte offset added to the base register's value
        offset: i64,
    },
    /// The row cannot produce a CFA (e.g. the original unwind info used an
    /// expression form the provider could not translate)
    Unsupported,
}

/// How a row locates the caller's copy of one register
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavedRegisterRule
{
    /// Explicitly unrecoverable at this point in the function
    Undefined,
    /// The register has not been modified; the caller's value is this
    /// frame's value
    SameValue,
    /// Stored in memory at `CFA + offset`
    AtCfaOffset(i64),
    /// Stored in memory at an absolute address (trap-handler contexts and
    /// the like)
    AtAddress(Address),
    /// The caller's value *is* the CFA (frame-pointer-like registers)
    IsCfa,
    /// Currently held in another register, numbered in the plan's kind
    InRegister(u32),
    /// Fixed by convention (e.g. forced-zero registers)
    Constant(SmallVec<[u8; 8]>),
}

/// One row of a plan: active from `offset` bytes into the function until the
/// next row's offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnwindPlanRow
{
    offset: u64,
    cfa: CfaRule,
    rules: Vec<(u32, SavedRegisterRule)>,
}

impl UnwindPlanRow
{
    /// Build a row active from `offset` bytes into the function.
    pub fn new(offset: u64, cfa: CfaRule) -> Self
    {
        Self {
            offset,
            cfa,
            rules: Vec::new(),
        }
    }

    /// Add a saved-register rule; builder-style for table construction.
    pub fn with_rule(mut self, regnum: u32, rule: SavedRegisterRule) -> Self
    {
        self.set_rule(regnum, rule);
        self
    }

    /// Add or replace the rule for `regnum`.
    pub fn set_rule(&mut self, regnum: u32, rule: SavedRegisterRule)
    {
        match self.rules.iter_mut().find(|(num, _)| *num == regnum) {
            Some(slot) => slot.1 = rule,
            None => self.rules.push((regnum, rule)),
        }
    }

    /// Function offset at which this row becomes active.
    pub fn offset(&self) -> u64
    {
        self.offset
    }

    /// The row's CFA computation rule.
    pub fn cfa(&self) -> &CfaRule
    {
        &self.cfa
    }

    /// The rule for `regnum`, or `None` when the row leaves it unspecified.
    pub fn rule_for(&self, regnum: u32) -> Option<&SavedRegisterRule>
    {
        self.rules.iter().find(|(num, _)| *num == regnum).map(|(_, rule)| rule)
    }
}

/// An ordered, PC-range-indexed unwind table for one function (or one
/// architecture default)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnwindPlan
{
    register_kind: RegisterKind,
    source: String,
    covers_all_registers: bool,
    valid_range: Option<(Address, Address)>,
    rows: Vec<UnwindPlanRow>,
}

impl UnwindPlan
{
    /// Create an empty plan whose rules are numbered in `register_kind`.
    ///
    /// `source` is a short human-readable provenance tag for diagnostics
    /// ("debug_frame", "arch default", ...). Fast plans set
    /// `covers_all_registers` to `false`: they only describe the registers
    /// needed to reach the next frame, so an absent rule in a fast plan says
    /// nothing about where a register is saved.
    pub fn new(register_kind: RegisterKind, source: impl Into<String>, covers_all_registers: bool) -> Self
    {
        Self {
            register_kind,
            source: source.into(),
            covers_all_registers,
            valid_range: None,
            rows: Vec::new(),
        }
    }

    /// Restrict the plan to a half-open `[start, end)` address range.
    pub fn with_valid_range(mut self, start: Address, end: Address) -> Self
    {
        self.valid_range = Some((start, end));
        self
    }

    /// Append a row; rows must be pushed in increasing offset order.
    pub fn push_row(&mut self, row: UnwindPlanRow)
    {
        debug_assert!(
            self.rows.last().is_none_or(|last| last.offset() < row.offset()),
            "unwind plan rows must be pushed in increasing offset order"
        );
        self.rows.push(row);
    }

    /// Builder-style [`push_row`](Self::push_row).
    pub fn with_row(mut self, row: UnwindPlanRow) -> Self
    {
        self.push_row(row);
        self
    }

    /// The numbering kind used by this plan's CFA and register rules.
    pub fn register_kind(&self) -> RegisterKind
    {
        self.register_kind
    }

    /// Provenance tag for diagnostics.
    pub fn source(&self) -> &str
    {
        &self.source
    }

    /// Whether an absent rule means "unspecified" rather than "not covered".
    pub fn covers_all_registers(&self) -> bool
    {
        self.covers_all_registers
    }

    /// The address range the plan claims to describe, if bounded.
    pub fn valid_range(&self) -> Option<(Address, Address)>
    {
        self.valid_range
    }

    /// Whether `pc` falls inside the plan's claimed range.
    ///
    /// Unbounded plans (architecture defaults) cover every address.
    pub fn covers_pc(&self, pc: Address) -> bool
    {
        match self.valid_range {
            Some((start, end)) => pc >= start && pc < end,
            None => true,
        }
    }

    /// The row active `offset` bytes into the function: the last row whose
    /// own offset does not exceed `offset`.
    pub fn row_for_offset(&self, offset: u64) -> Option<&UnwindPlanRow>
    {
        let idx = self.rows.partition_point(|row| row.offset() <= offset);
        idx.checked_sub(1).and_then(|idx| self.rows.get(idx))
    }
}
