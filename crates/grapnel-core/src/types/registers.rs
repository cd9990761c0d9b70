//! Register catalog vocabulary: numbering kinds, metadata, and values.

use std::fmt;

use smallvec::SmallVec;

/// A register numbering scheme
///
/// The same physical register carries different numbers depending on who is
/// asking: the debugger's own catalog index, the DWARF unwind-info numbering,
/// the platform ABI numbering, or the role-based generic numbering (PC, SP,
/// ...). Every register number in this crate travels with its kind, and the
/// [`RegisterNumber`](crate::regnum::RegisterNumber) translator converts
/// between them.
///
/// ## Example
///
/// ```rust
/// use grapnel_core::types::RegisterKind;
///
/// // rbp is register 6 in DWARF numbering but may be catalog index 7
/// let kind = RegisterKind::Dwarf;
/// assert_ne!(kind, RegisterKind::Debugger);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegisterKind
{
    /// The debugger's internal catalog numbering (the index space of
    /// [`RegisterCatalog::register_info`](crate::target::RegisterCatalog::register_info))
    Debugger,
    /// DWARF unwind/debug-info register numbering
    Dwarf,
    /// Platform ABI register numbering
    Abi,
    /// Role-based numbering: program counter, stack pointer, and friends
    ///
    /// See [`GenericRegister`] for the defined roles.
    Generic,
}

/// Role-based register selectors for [`RegisterKind::Generic`]
///
/// These name the architecture-independent roles the unwinder cares about.
/// `GenericRegister::Pc.number()` is the register number to pass alongside
/// `RegisterKind::Generic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericRegister
{
    /// Program counter / instruction pointer
    Pc,
    /// Stack pointer
    Sp,
    /// Frame pointer
    Fp,
    /// Return address register (the link register on architectures that
    /// have one)
    Ra,
    /// Condition flags
    Flags,
}

impl GenericRegister
{
    /// The register number of this role under [`RegisterKind::Generic`].
    pub const fn number(self) -> u32
    {
        match self {
            GenericRegister::Pc => 0,
            GenericRegister::Sp => 1,
            GenericRegister::Fp => 2,
            GenericRegister::Ra => 3,
            GenericRegister::Flags => 4,
        }
    }
}

/// Static metadata for one register in a thread's catalog
///
/// The catalog owns one of these per register; the engine never constructs
/// them. `regnum` is the register's number under [`RegisterKind::Debugger`]
/// and doubles as its catalog index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterInfo
{
    /// Display name ("rip", "x29", ...)
    pub name: String,
    /// Debugger-kind register number == catalog index
    pub regnum: u32,
    /// Width of the register in bytes
    pub byte_size: usize,
    /// Whether the register is volatile (caller-saved) under the target ABI
    ///
    /// Volatile registers queried mid-stack with no save rule resolve to
    /// "unavailable" rather than inheriting the live value - the intervening
    /// calls may have clobbered them.
    pub is_volatile: bool,
}

/// A named grouping of catalog registers ("General Purpose Registers", ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterSet
{
    /// Display name of the set
    pub name: String,
    /// Debugger-kind numbers of the member registers
    pub registers: Vec<u32>,
}

/// A register value as raw little-endian bytes
///
/// Register values move through the engine as byte sequences because reads
/// may come from live thread state, inferior memory, or a constant baked into
/// an unwind rule; the common address-sized case is accessible through the
/// `u64` helpers. Storage is inline for values up to 16 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegisterValue
{
    bytes: SmallVec<[u8; 16]>,
}

impl RegisterValue
{
    /// Build a value from raw little-endian bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self
    {
        Self {
            bytes: SmallVec::from_slice(bytes),
        }
    }

    /// Build an address-sized value, truncated to `byte_size` bytes.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use grapnel_core::types::RegisterValue;
    ///
    /// let value = RegisterValue::from_u64(0x1122_3344, 8);
    /// assert_eq!(value.as_u64(), Some(0x1122_3344));
    /// ```
    pub fn from_u64(value: u64, byte_size: usize) -> Self
    {
        let le = value.to_le_bytes();
        let len = byte_size.min(le.len());
        Self {
            bytes: SmallVec::from_slice(&le[..len]),
        }
    }

    /// Raw little-endian bytes of the value.
    pub fn bytes(&self) -> &[u8]
    {
        &self.bytes
    }

    /// Width of the value in bytes.
    pub fn byte_size(&self) -> usize
    {
        self.bytes.len()
    }

    /// Interpret the value as a little-endian `u64`.
    ///
    /// Returns `None` for values wider than 8 bytes, which cannot be an
    /// address or general-purpose register on any supported target.
    pub fn as_u64(&self) -> Option<u64>
    {
        if self.bytes.is_empty() || self.bytes.len() > 8 {
            return None;
        }
        let mut le = [0u8; 8];
        le[..self.bytes.len()].copy_from_slice(&self.bytes);
        Some(u64::from_le_bytes(le))
    }
}

impl fmt::Display for RegisterValue
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x")?;
        for byte in self.bytes.iter().rev() {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}
