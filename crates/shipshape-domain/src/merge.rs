//! Field-level override rules used by every `Check::merge`.
//!
//! An incoming value only replaces the current one when it is actually set:
//! `Some` for options, non-empty for strings and sequences. Sequences are
//! replaced as a whole, never unioned.

pub fn merge_option<T: Clone>(target: &mut Option<T>, incoming: &Option<T>) {
    if let Some(value) = incoming {
        *target = Some(value.clone());
    }
}

pub fn merge_string(target: &mut String, incoming: &str) {
    if !incoming.is_empty() {
        *target = incoming.to_string();
    }
}

/// Replaces `target` with `incoming` (duplicates removed, first occurrence
/// kept) when `incoming` is non-empty.
pub fn merge_vec<T: Clone + PartialEq>(target: &mut Vec<T>, incoming: &[T]) {
    merge_vec_by_key(target, incoming, |v| v.clone());
}

/// Like [`merge_vec`], with duplicates identified by `key`.
pub fn merge_vec_by_key<T, K, F>(target: &mut Vec<T>, incoming: &[T], key: F)
where
    T: Clone,
    K: PartialEq,
    F: Fn(&T) -> K,
{
    if incoming.is_empty() {
        return;
    }
    let mut keys: Vec<K> = Vec::with_capacity(incoming.len());
    let mut merged = Vec::with_capacity(incoming.len());
    for item in incoming {
        let k = key(item);
        if !keys.contains(&k) {
            keys.push(k);
            merged.push(item.clone());
        }
    }
    *target = merged;
}
