//! Memory address type.

use std::fmt;
use std::ops::{Add, Sub};

/// Strongly typed memory address
///
/// This wrapper around `u64` provides type safety when working with memory
/// addresses. It prevents accidentally mixing addresses with other `u64`
/// values (like sizes, offsets, or register numbers), which matters in a
/// codebase whose central computation is `CFA + offset` arithmetic.
///
/// ## Example
///
/// ```rust
/// use grapnel_core::types::Address;
///
/// let cfa = Address::from(0x7fff_0000_1000);
/// let slot = cfa + 0x10;
/// assert_eq!(slot.value(), 0x7fff_0000_1010);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u64);

impl Address
{
    /// The null address (0x0)
    ///
    /// Used as the end-of-stack sentinel: a return address of zero means the
    /// walk has run off the top of the stack.
    pub const ZERO: Self = Address(0);

    /// Create a new address from a `u64` value
    ///
    /// Equivalent to `Address::from(value)` but usable in const contexts.
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Get the raw `u64` value of this address
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Add an offset to this address, checking for overflow
    pub fn checked_add(self, offset: u64) -> Option<Self>
    {
        self.0.checked_add(offset).map(Address)
    }

    /// Subtract an offset from this address, checking for underflow
    pub fn checked_sub(self, offset: u64) -> Option<Self>
    {
        self.0.checked_sub(offset).map(Address)
    }

    /// Add a signed offset to this address, checking for overflow
    ///
    /// Register save locations are expressed as signed offsets from the CFA,
    /// so this is the form the resolver uses.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use grapnel_core::types::Address;
    ///
    /// let cfa = Address::from(0x1000);
    /// assert_eq!(cfa.checked_add_signed(-8), Some(Address::from(0xff8)));
    /// assert_eq!(Address::ZERO.checked_add_signed(-1), None);
    /// ```
    pub fn checked_add_signed(self, offset: i64) -> Option<Self>
    {
        self.0.checked_add_signed(offset).map(Address)
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:016x}", self.0)
    }
}

impl Add<u64> for Address
{
    type Output = Address;

    fn add(self, rhs: u64) -> Self::Output
    {
        Address(self.0.wrapping_add(rhs))
    }
}

impl Sub<u64> for Address
{
    type Output = Address;

    fn sub(self, rhs: u64) -> Self::Output
    {
        Address(self.0.wrapping_sub(rhs))
    }
}
