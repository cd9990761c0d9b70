//! # Register Number Translation
//!
//! Bridging between register numbering schemes is a constant chore in the
//! resolver: unwind plans speak DWARF or ABI numbers, the catalog speaks its
//! own indices, and callers may hand us generic role numbers. Having a small
//! object that encloses one `(kind, number)` pair and caches every conversion
//! it performs keeps that chore in one place.

use std::collections::BTreeMap;
use std::fmt;

use crate::target::RegisterCatalog;
use crate::types::RegisterKind;

/// A register number tagged with its numbering kind, bound to a catalog
///
/// Conversions go through the catalog's bidirectional mapping and are
/// memoized per instance, so repeated lookups of the same kind are free.
/// The display name is resolved once at construction.
///
/// An invalid `RegisterNumber` (no number) never equals another translator,
/// even one built from the same nominal request.
pub struct RegisterNumber<'a>
{
    catalog: &'a dyn RegisterCatalog,
    kind: RegisterKind,
    num: Option<u32>,
    kind_map: BTreeMap<RegisterKind, u32>,
    name: Option<String>,
}

impl<'a> RegisterNumber<'a>
{
    /// Bind a `(kind, number)` pair to a catalog.
    pub fn new(catalog: &'a dyn RegisterCatalog, kind: RegisterKind, num: u32) -> Self
    {
        let mut this = Self {
            catalog,
            kind,
            num: Some(num),
            kind_map: BTreeMap::new(),
            name: None,
        };
        if let Some(debugger_num) = this.as_kind(RegisterKind::Debugger) {
            this.name = catalog.register_info(debugger_num).map(|info| info.name.clone());
        }
        this
    }

    /// A placeholder with no number; never equal to anything.
    pub fn invalid(catalog: &'a dyn RegisterCatalog) -> Self
    {
        Self {
            catalog,
            kind: RegisterKind::Debugger,
            num: None,
            kind_map: BTreeMap::new(),
            name: None,
        }
    }

    /// Whether this translator holds a number at all.
    pub fn is_valid(&self) -> bool
    {
        self.num.is_some()
    }

    /// The numbering kind the instance was constructed with.
    pub fn kind(&self) -> RegisterKind
    {
        self.kind
    }

    /// The number in its native kind.
    pub fn number(&self) -> Option<u32>
    {
        self.num
    }

    /// Display name from the catalog, if the register resolved to one.
    pub fn name(&self) -> Option<&str>
    {
        self.name.as_deref()
    }

    /// The equivalent number under `kind`, memoizing the conversion.
    ///
    /// Returns `None` when the catalog has no mapping.
    pub fn as_kind(&mut self, kind: RegisterKind) -> Option<u32>
    {
        let num = self.num?;
        if kind == self.kind {
            return Some(num);
        }
        if let Some(&cached) = self.kind_map.get(&kind) {
            return Some(cached);
        }
        let converted = self.catalog.convert_between_kinds(self.kind, num, kind)?;
        self.kind_map.insert(kind, converted);
        Some(converted)
    }

    // Conversion without the cache, so equality can stay a `&self` operation.
    // The catalog mapping is pure, so this always agrees with `as_kind`.
    fn convert(&self, kind: RegisterKind) -> Option<u32>
    {
        let num = self.num?;
        if kind == self.kind {
            return Some(num);
        }
        if let Some(&cached) = self.kind_map.get(&kind) {
            return Some(cached);
        }
        self.catalog.convert_between_kinds(self.kind, num, kind)
    }
}

impl PartialEq for RegisterNumber<'_>
{
    /// Two translators are equal when both are valid and agree when compared
    /// in either one's native kind.
    fn eq(&self, rhs: &Self) -> bool
    {
        if !self.is_valid() || !rhs.is_valid() {
            return false;
        }
        if self.kind == rhs.kind {
            return self.num == rhs.num;
        }
        if let Some(rhs_num) = rhs.convert(self.kind) {
            return self.num == Some(rhs_num);
        }
        if let Some(lhs_num) = self.convert(rhs.kind) {
            return Some(lhs_num) == rhs.num;
        }
        false
    }
}

impl fmt::Debug for RegisterNumber<'_>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("RegisterNumber")
            .field("kind", &self.kind)
            .field("num", &self.num)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
