//! Core type definitions shared across the unwind engine.

mod address;
mod registers;

pub use address::Address;
pub use registers::{GenericRegister, RegisterInfo, RegisterKind, RegisterSet, RegisterValue};
