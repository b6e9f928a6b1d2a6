//! Operation bracketing and undo history.
//!
//! An open operation holds a snapshot of the scene taken at
//! `start_operation`. Committing turns the snapshot into one undo entry;
//! aborting puts the snapshot back.

use crate::error::{Result, SceneError};

/// One committed operation.
#[derive(Debug, Clone)]
pub struct UndoEntry<S> {
    /// Operation name shown in the undo menu.
    pub name: String,
    /// State before the operation ran.
    pub before: S,
}

/// Open operation plus committed history over a snapshot type `S`.
#[derive(Debug, Clone)]
pub struct Journal<S> {
    open: Option<UndoEntry<S>>,
    history: Vec<UndoEntry<S>>,
}

impl<S> Default for Journal<S> {
    fn default() -> Self {
        Self {
            open: None,
            history: Vec::new(),
        }
    }
}

impl<S> Journal<S> {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the open operation, if any.
    pub fn open_operation(&self) -> Option<&str> {
        self.open.as_ref().map(|e| e.name.as_str())
    }

    /// Open an operation. Nested operations are rejected.
    pub fn start(&mut self, name: &str, before: S) -> Result<()> {
        if let Some(open) = &self.open {
            return Err(SceneError::OperationOpen(open.name.clone()));
        }
        self.open = Some(UndoEntry {
            name: name.to_string(),
            before,
        });
        Ok(())
    }

    /// Close the open operation and record it as one undo entry.
    pub fn commit(&mut self) -> Result<()> {
        let entry = self.open.take().ok_or(SceneError::NoOperation)?;
        self.history.push(entry);
        Ok(())
    }

    /// Close the open operation and hand back its snapshot for restoring.
    pub fn abort(&mut self) -> Result<S> {
        self.open
            .take()
            .map(|e| e.before)
            .ok_or(SceneError::NoOperation)
    }

    /// Pop the most recent committed entry.
    pub fn pop(&mut self) -> Option<UndoEntry<S>> {
        self.history.pop()
    }

    /// Names of committed operations, oldest first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(|e| e.name.as_str())
    }

    /// Number of committed operations.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// True if nothing has been committed.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
