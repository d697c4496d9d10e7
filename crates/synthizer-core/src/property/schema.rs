//! Static per-object-kind property schemas.

use super::value::{PropertyKind, PropertyValue};

/// Describes one property slot: its name, wire kind, and an optional
/// validator run at `set` time. Tables of these are declared `const` per
/// object kind (see `source`/`generator`/`effect` modules).
#[derive(Clone, Copy)]
pub struct PropertySlotDesc {
    /// Stable name, used in error messages and host-facing lookup.
    pub name: &'static str,
    /// Expected value kind.
    pub kind: PropertyKind,
    /// Default value installed at object construction.
    pub default: PropertyValue,
    /// Optional validator; `None` accepts any value of the right kind.
    pub validator: Option<fn(&PropertyValue) -> bool>,
}

/// A named, ordered collection of [`PropertySlotDesc`]s for one object kind.
pub type PropertyTable = &'static [PropertySlotDesc];

/// Looks up a slot index by name within `table`.
pub fn index_of(table: PropertyTable, name: &str) -> Option<usize> {
    table.iter().position(|slot| slot.name == name)
}
