//! # Error Types
//!
//! General error handling for the unwind engine.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.
//!
//! Nothing in this crate is fatal to the surrounding debugger: a bad stack
//! yields a short or partial backtrace, never a crash. The taxonomy below
//! separates the recoverable per-register failures (`Unavailable`) from the
//! chain-terminating ones (`InvalidFrame`, `LoopDetected`).

use thiserror::Error;

use crate::types::{Address, RegisterKind};

/// Main error type for unwind operations
///
/// This enum represents all the ways register resolution or frame
/// materialization can fail.
///
/// ## Error Categories
///
/// 1. **Resolution errors**: Unavailable, NoMapping - recoverable, scoped to
///    a single register query
/// 2. **Frame errors**: InvalidFrame, PlanSelection, LoopDetected - terminate
///    the walk at that frame, leaving a truncated backtrace
/// 3. **Collaborator errors**: Memory, Thread - failures reported by the
///    surrounding debugger's live-target accessors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnwindError
{
    /// The value of a register could not be determined for a frame
    ///
    /// This is the normal outcome for a volatile (caller-saved) register
    /// queried mid-stack with no save rule: the intervening calls may have
    /// clobbered it, so no value is reported rather than a stale one.
    #[error("no value available for register {regnum} at frame {frame}")]
    Unavailable
    {
        /// Debugger-kind register number that was requested
        regnum: u32,
        /// Frame the request was made against
        frame: u32,
    },

    /// The frame is not a valid frame
    ///
    /// Classification reached `FrameType::Invalid`, most likely because the
    /// walk ran past the end of the stack. Terminal for this frame and all
    /// older frames.
    #[error("frame {0} is not a valid frame")]
    InvalidFrame(u32),

    /// Neither the full nor the fallback unwind plan could compute a CFA
    ///
    /// Propagates to frame classification as `Invalid`; the debugger user
    /// sees a short backtrace, not a hard error.
    #[error("no unwind plan yields a CFA at pc {0}")]
    PlanSelection(Address),

    /// The same CFA recurred while walking the stack
    ///
    /// Treated identically to `InvalidFrame` once detected; kept as its own
    /// variant so diagnostics can name the repeating address.
    #[error("stack loop detected: CFA {0} repeats")]
    LoopDetected(Address),

    /// Reading or writing inferior memory failed
    ///
    /// Reported by the [`InferiorMemory`](crate::target::InferiorMemory)
    /// collaborator for unmapped or unreadable addresses.
    #[error("memory access failed at {address} ({len} bytes)")]
    Memory
    {
        /// Address of the failed access
        address: Address,
        /// Length of the failed access in bytes
        len: usize,
    },

    /// Reading or writing a live thread register failed
    ///
    /// Reported by the [`ThreadRegisters`](crate::target::ThreadRegisters)
    /// collaborator when the thread is not stopped or the register is
    /// unsupported.
    #[error("live register access failed for register {0}")]
    Thread(u32),

    /// A register number has no equivalent in the requested numbering kind
    #[error("register {num} has no mapping from {kind:?}")]
    NoMapping
    {
        /// Numbering kind the number was given in
        kind: RegisterKind,
        /// The unmappable register number
        num: u32,
    },
}

/// Convenience type alias for `Result<T, UnwindError>`
///
/// ```rust
/// use grapnel_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, UnwindError>;
