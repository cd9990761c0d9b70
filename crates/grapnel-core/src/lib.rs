//! # grapnel-core
//!
//! Per-frame register resolution and stack unwinding for Grapnel.
//!
//! Given a suspended thread, this crate reconstructs the call stack frame by
//! frame and, for each frame, determines the values of machine registers as
//! they existed when that frame was executing - even though only the
//! innermost frame's registers are directly observable. It provides:
//!
//! - Frame-by-frame materialization with loop and garbage-frame detection
//! - Competing unwind strategies (fast / full / architecture-default
//!   fallback plans) with per-frame fallback retry
//! - A register-location resolver that distinguishes "value unavailable"
//!   from "value provably unchanged since an outer frame"
//! - Register-numbering translation between debugger, DWARF, ABI, and
//!   generic kinds, memoized per use
//!
//! ## What this crate does not do
//!
//! It never parses binaries or debug info, never touches a real process, and
//! never decodes instructions. Unwind tables, symbols, and live thread and
//! memory access all arrive through the traits in [`target`]; the
//! surrounding debugger (or a test fixture) implements them.
//!
//! ## Walking a stack
//!
//! ```rust,ignore
//! use grapnel_core::{Target, UnwindSession};
//!
//! let target = Target { catalog, thread, memory, plans, symbols, injected };
//! let mut session = UnwindSession::new(target);
//! let depth = session.walk(64);
//! for index in 0..depth {
//!     let (pc, cfa) = session.frame_info_at(index).unwrap();
//!     println!("frame #{index}: pc={pc} cfa={cfa}");
//! }
//! ```

pub mod context;
pub mod error;
pub mod frame;
pub mod plan;
pub mod regnum;
pub mod session;
pub mod target;
pub mod types;

pub use context::FrameRegisterContext;
// Re-export commonly used types
pub use error::{Result, UnwindError};
pub use frame::{Frame, FrameType, RegisterLocation, SkipPolicy};
pub use plan::{CfaRule, SavedRegisterRule, UnwindPlan, UnwindPlanRow};
pub use regnum::RegisterNumber;
pub use session::UnwindSession;
pub use target::Target;
pub use types::{Address, GenericRegister, RegisterKind, RegisterValue};
