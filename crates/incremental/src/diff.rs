//! Keyed diff between two visible sequences.
//!
//! Items are matched by key. The longest common subsequence of keys is kept in
//! place; every other item is removed, inserted or moved. Items kept or moved
//! whose fields changed additionally get an `Update`.
//!
//! Operations are emitted in four phases so every index is valid at the point
//! it is applied:
//!
//! 1. `Remove` for items missing from the new sequence, highest index first.
//! 2. `Move` for common items outside the LCS, in new-sequence order, each
//!    placed directly after its predecessor in the new sequence.
//! 3. `Insert` for items missing from the old sequence, lowest index first.
//! 4. `Update` for changed items, at their index in the new sequence.

use crate::edit_script::{EditOp, EditScript};
use crate::keyed::Keyed;
use crate::lcs::lcs_anchors;
use hashbrown::{HashMap, HashSet};

/// Computes the minimal edit script turning `old` into `new`.
///
/// Keys must be unique within each sequence. Identical sequences produce an
/// empty script.
pub fn diff<T: Keyed + Clone>(old: &[T], new: &[T]) -> EditScript<T> {
    let mut script = EditScript::new();

    let old_keys: Vec<T::Key> = old.iter().map(Keyed::key).collect();
    let new_keys: Vec<T::Key> = new.iter().map(Keyed::key).collect();
    let old_pos: HashMap<T::Key, usize> = old_keys.iter().enumerate().map(|(i, k)| (*k, i)).collect();
    let new_pos: HashMap<T::Key, usize> = new_keys.iter().enumerate().map(|(j, k)| (*k, j)).collect();

    for index in (0..old.len()).rev() {
        if !new_pos.contains_key(&old_keys[index]) {
            script.push(EditOp::Remove { index });
        }
    }

    let anchors: HashSet<T::Key> = lcs_anchors(&old_keys, &new_keys)
        .into_iter()
        .map(|(i, _)| old_keys[i])
        .collect();

    // After the removals the sequence holds exactly the common items in old order.
    let mut working: Vec<T::Key> = old_keys
        .iter()
        .copied()
        .filter(|k| new_pos.contains_key(k))
        .collect();
    let target: Vec<T::Key> = new_keys
        .iter()
        .copied()
        .filter(|k| old_pos.contains_key(k))
        .collect();

    for (t, key) in target.iter().enumerate() {
        if anchors.contains(key) {
            continue;
        }
        let Some(from) = working.iter().position(|k| k == key) else {
            continue;
        };
        working.remove(from);
        let to = match t.checked_sub(1) {
            None => 0,
            Some(prev) => match working.iter().position(|k| *k == target[prev]) {
                Some(pos) => pos + 1,
                None => 0,
            },
        };
        working.insert(to, *key);
        if from != to {
            script.push(EditOp::Move { from, to });
        }
    }

    for (index, item) in new.iter().enumerate() {
        if !old_pos.contains_key(&new_keys[index]) {
            script.push(EditOp::Insert {
                index,
                item: item.clone(),
            });
        }
    }

    for (index, item) in new.iter().enumerate() {
        if let Some(&i) = old_pos.get(&new_keys[index]) {
            let fields = old[i].changed_fields(item);
            if !fields.is_empty() {
                script.push(EditOp::Update {
                    index,
                    item: item.clone(),
                    fields,
                });
            }
        }
    }

    script
}
