//! Edit scripts over positional sequences.
//!
//! An `EditScript` is applied operation by operation; every index refers to
//! the sequence as it stands after all preceding operations.

use roster_core::FieldMask;
use thiserror::Error;

/// A single positional edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditOp<T> {
    /// Inserts `item` so that it ends up at `index`.
    Insert { index: usize, item: T },
    /// Removes the item at `index`.
    Remove { index: usize },
    /// Removes the item at `from`, then inserts it at `to`.
    Move { from: usize, to: usize },
    /// Replaces the item at `index` with a newer version of itself.
    Update {
        index: usize,
        item: T,
        fields: FieldMask,
    },
}

/// Error returned when a script does not fit the sequence it is applied to.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("edit operation #{op} is out of bounds for a sequence of length {len}")]
pub struct ApplyError {
    /// Position of the offending operation in the script.
    pub op: usize,
    /// Length of the sequence when the operation was reached.
    pub len: usize,
}

/// An ordered list of edits turning an old sequence into a new one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditScript<T> {
    ops: Vec<EditOp<T>>,
}

impl<T> Default for EditScript<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EditScript<T> {
    /// Creates an empty script.
    #[inline]
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Creates a script from a list of operations.
    pub fn from_ops(ops: Vec<EditOp<T>>) -> Self {
        Self { ops }
    }

    /// Returns true if there is nothing to do.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Returns the number of operations.
    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[inline]
    pub fn ops(&self) -> &[EditOp<T>] {
        &self.ops
    }

    pub fn iter(&self) -> impl Iterator<Item = &EditOp<T>> + '_ {
        self.ops.iter()
    }

    pub(crate) fn push(&mut self, op: EditOp<T>) {
        self.ops.push(op);
    }

    pub fn into_ops(self) -> Vec<EditOp<T>> {
        self.ops
    }

    pub fn insert_count(&self) -> usize {
        self.count(|op| matches!(op, EditOp::Insert { .. }))
    }

    pub fn remove_count(&self) -> usize {
        self.count(|op| matches!(op, EditOp::Remove { .. }))
    }

    pub fn move_count(&self) -> usize {
        self.count(|op| matches!(op, EditOp::Move { .. }))
    }

    pub fn update_count(&self) -> usize {
        self.count(|op| matches!(op, EditOp::Update { .. }))
    }

    fn count(&self, pred: impl Fn(&EditOp<T>) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }

    /// Returns true if the script only appends items at the end.
    pub fn is_pure_append(&self, old_len: usize) -> bool {
        let mut expected = old_len;
        self.ops.iter().all(|op| match op {
            EditOp::Insert { index, .. } if *index == expected => {
                expected += 1;
                true
            }
            _ => false,
        })
    }
}

impl<T: Clone> EditScript<T> {
    /// Applies the script to `old`, returning the edited sequence.
    pub fn apply(&self, old: &[T]) -> Result<Vec<T>, ApplyError> {
        let mut seq = old.to_vec();
        for (op_index, op) in self.ops.iter().enumerate() {
            let len = seq.len();
            let out_of_bounds = ApplyError { op: op_index, len };
            match op {
                EditOp::Insert { index, item } => {
                    if *index > len {
                        return Err(out_of_bounds);
                    }
                    seq.insert(*index, item.clone());
                }
                EditOp::Remove { index } => {
                    if *index >= len {
                        return Err(out_of_bounds);
                    }
                    seq.remove(*index);
                }
                EditOp::Move { from, to } => {
                    if *from >= len || *to >= len {
                        return Err(out_of_bounds);
                    }
                    let item = seq.remove(*from);
                    seq.insert(*to, item);
                }
                EditOp::Update { index, item, .. } => {
                    let slot = seq.get_mut(*index).ok_or(out_of_bounds)?;
                    *slot = item.clone();
                }
            }
        }
        Ok(seq)
    }
}

impl<T> IntoIterator for EditScript<T> {
    type Item = EditOp<T>;
    type IntoIter = std::vec::IntoIter<EditOp<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}
