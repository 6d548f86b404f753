//! Append-only operation log for one edit session.

use super::operation::DrawOperation;

/// Ordered list of annotation operations (first = bottom layer, last = top layer).
///
/// Entries are never edited in place: the only mutations are append, undo
/// (pop the tail) and clear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationLog {
    operations: Vec<DrawOperation>,
}

impl OperationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an operation, enforcing a maximum count when `max` > 0.
    ///
    /// Returns `true` if the operation was stored.
    pub fn try_push(&mut self, operation: DrawOperation, max: usize) -> bool {
        if max == 0 || self.operations.len() < max {
            self.operations.push(operation);
            true
        } else {
            false
        }
    }

    /// Removes the most recent operation; no-op on an empty log.
    pub fn undo(&mut self) -> Option<DrawOperation> {
        self.operations.pop()
    }

    pub fn clear(&mut self) {
        self.operations.clear();
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn operations(&self) -> &[DrawOperation] {
        &self.operations
    }
}
