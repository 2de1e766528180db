//! Column set — the ordered list of displayed columns, derived from the
//! field catalog's display flags plus the prior column order.
//!
//! The column list is never allowed to end up empty: [`reconcile`] signals
//! [`Reconciled::NeedsSourceFallback`] instead of returning an empty set, and
//! the caller restores the `_source` column.

use crate::field_catalog::FieldCatalog;
use crate::types::SOURCE_FIELD;

/// Outcome of a reconcile pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    /// The intersected, order-preserving column list. Never empty.
    Columns(Vec<String>),
    /// Every current column lost its display flag; the caller must restore
    /// `_source` rather than commit an empty list.
    NeedsSourceFallback,
}

/// Intersect `current` with `displayed`, preserving `current`'s order.
pub fn reconcile(displayed: &[String], current: &[String]) -> Reconciled {
    let kept: Vec<String> = current
        .iter()
        .filter(|name| displayed.contains(name))
        .cloned()
        .collect();

    if kept.is_empty() {
        Reconciled::NeedsSourceFallback
    } else {
        Reconciled::Columns(kept)
    }
}

/// Flip the display flag of `name` and toggle it in or out of `columns`.
///
/// Special case: when the columns are exactly `["_source"]` and a specific
/// field is chosen, the view switches out of raw-source mode — the new field
/// replaces `_source` in the columns and `_source`'s own display flag is
/// forced off. A reconcile pass always follows this call.
///
/// Panics on an unknown field name; like
/// [`FieldCatalog::formatter_for`], that indicates a stale catalog reference.
pub fn toggle_field(catalog: &mut FieldCatalog, columns: &[String], name: &str) -> Vec<String> {
    let field = catalog
        .get_mut(name)
        .unwrap_or_else(|| panic!("toggle_field: unknown field {name:?} (stale catalog?)"));
    field.display = !field.display;

    let mut columns = columns.to_vec();
    if columns == [SOURCE_FIELD] && name != SOURCE_FIELD {
        toggle_in_out(&mut columns, name);
        toggle_in_out(&mut columns, SOURCE_FIELD);
        if let Some(source) = catalog.get_mut(SOURCE_FIELD) {
            source.display = false;
        }
    } else {
        toggle_in_out(&mut columns, name);
    }
    columns
}

fn toggle_in_out(columns: &mut Vec<String>, name: &str) {
    if let Some(pos) = columns.iter().position(|c| c == name) {
        columns.remove(pos);
    } else {
        columns.push(name.to_string());
    }
}
