//! # Stored bases
//!
//! A branch and bound layer explores subproblems that differ from their parent only in some
//! bounds. Starting each of them from the optimal basis of the parent saves most of the work; the
//! stack keeps those bases around.
use crate::algorithm::simplex::basis::Basis;

/// A stack of basis snapshots.
#[derive(Clone, Debug, Default)]
pub struct BasisStack {
    snapshots: Vec<Basis>,
}

impl BasisStack {
    /// An empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a copy of a basis on top of the stack.
    ///
    /// # Return value
    ///
    /// The new level, which is the number of stored snapshots.
    pub fn push(&mut self, basis: &Basis) -> usize {
        self.snapshots.push(basis.clone());
        self.snapshots.len()
    }

    /// Copy the top snapshot into a basis without removing it.
    ///
    /// # Return value
    ///
    /// Whether there was a snapshot to restore. The target is untouched if not.
    pub fn restore(&self, target: &mut Basis) -> bool {
        match self.snapshots.last() {
            Some(top) => {
                debug_assert_eq!(top.nr_variables(), target.nr_variables());
                target.clone_from(top);
                true
            },
            None => false,
        }
    }

    /// Remove the top snapshot.
    pub fn pop(&mut self) -> Option<Basis> {
        self.snapshots.pop()
    }

    /// Remove the top snapshot and restore the one below it.
    ///
    /// # Return value
    ///
    /// Whether a snapshot was removed and another one restored.
    pub fn pop_and_restore(&mut self, target: &mut Basis) -> bool {
        self.snapshots.pop().is_some() && self.restore(target)
    }

    /// Whether a basis equals the top snapshot, up to the order of the basic variables.
    #[must_use]
    pub fn is_same_as_top(&self, basis: &Basis) -> bool {
        self.snapshots.last().is_some_and(|top| top.same_as(basis))
    }

    /// Remove all snapshots.
    ///
    /// # Return value
    ///
    /// The number of snapshots removed.
    pub fn unload(&mut self) -> usize {
        let level = self.snapshots.len();
        self.snapshots.clear();
        level
    }

    /// Number of stored snapshots.
    #[must_use]
    pub fn level(&self) -> usize {
        self.snapshots.len()
    }
}
