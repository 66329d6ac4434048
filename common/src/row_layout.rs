//! Packs a section's fields into display rows.

use crate::{
    form_schema::{FieldSchema, SectionSchema},
    search_const::ROW_SPAN_CAPACITY,
};

/// Greedy, order-preserving row packing.
///
/// Items are appended to the current row until the next one would push the
/// summed span past `capacity`; that item then opens a new row. An item wider
/// than `capacity` ends up alone on its row.
pub fn pack_rows<T>(items: &[T], capacity: u16, span_of: impl Fn(&T) -> u16) -> Vec<Vec<&T>> {
    let mut rows = Vec::new();
    let mut current: Vec<&T> = Vec::new();
    let mut current_span: u32 = 0;

    for item in items {
        let span = u32::from(span_of(item));
        if !current.is_empty() && current_span + span > u32::from(capacity) {
            rows.push(std::mem::take(&mut current));
            current_span = 0;
        }
        current.push(item);
        current_span += span;
    }
    if !current.is_empty() {
        rows.push(current);
    }
    rows
}

pub fn pack_field_rows(fields: &[FieldSchema]) -> Vec<Vec<&FieldSchema>> {
    pack_rows(fields, ROW_SPAN_CAPACITY, |f| f.column_span)
}

impl SectionSchema {
    pub fn rows(&self) -> Vec<Vec<&FieldSchema>> {
        pack_field_rows(&self.fields)
    }
}
