//! Canonical ordering for persisted records.
//!
//! Hash-map iteration order is arbitrary, so every save sorts its records
//! with [`compare`] before writing. Labels compare case-insensitively first
//! and by exact code points second; tuples compare element by element, with
//! a strict prefix sorting first. Two values compare `Equal` only when they
//! are structurally identical, which makes the order total and the output of
//! a save a fixed point of load-then-save.

use std::cmp::Ordering;

use crate::value::Value;

/// Case-insensitive comparison with the exact label as tie-break.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Structural comparison; atoms sort before tuples.
pub fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Atom(x), Value::Atom(y)) => compare_labels(x, y),
        (Value::Atom(_), Value::Tuple(_)) => Ordering::Less,
        (Value::Tuple(_), Value::Atom(_)) => Ordering::Greater,
        (Value::Tuple(xs), Value::Tuple(ys)) => {
            for (x, y) in xs.iter().zip(ys) {
                match compare(x, y) {
                    Ordering::Equal => continue,
                    decided => return decided,
                }
            }
            xs.len().cmp(&ys.len())
        }
    }
}

/// Sort records into canonical order.
///
/// `sort_by` is a stable merge sort, so records that compare equal keep
/// their relative order.
pub fn canonical_sort(records: &mut [Value]) {
    records.sort_by(compare);
}

/// Sort plain labels (family or style names) into canonical order.
pub fn sort_labels(labels: &mut [String]) {
    labels.sort_by(|a, b| compare_labels(a, b));
}
