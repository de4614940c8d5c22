//! Undo/redo history layered over a single owned [`Canvas`].

use crate::canvas::{Canvas, Snapshot};
use crate::error::CoreError;

/// Owns exactly one canvas and its undo/redo stacks.
///
/// [`History::apply`] captures the pre-mutation snapshot *before* invoking
/// the mutator, so a mutator that fails leaves both stacks and the canvas
/// untouched.
pub struct History {
    canvas: Canvas,
    undo: Vec<Snapshot>,
    redo: Vec<Snapshot>,
}

impl History {
    pub fn new(canvas: Canvas) -> Self {
        History {
            canvas,
            undo: Vec::new(),
            redo: Vec::new(),
        }
    }

    /// A read-only borrow of the owned canvas, for operations (`get_pixel`,
    /// `export`) that bypass history.
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// A mutable borrow, for operations (e.g. rendering) that need to clear
    /// the dirty flag without going through undo/redo.
    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    /// Runs `mutate` against the owned canvas. On success, pushes the
    /// pre-mutation snapshot onto `undo` and clears `redo`. On failure,
    /// discards the snapshot and leaves both stacks untouched.
    pub fn apply<F>(&mut self, mutate: F) -> Result<(), CoreError>
    where
        F: FnOnce(&mut Canvas) -> Result<(), CoreError>,
    {
        let snapshot = self.canvas.snapshot();
        mutate(&mut self.canvas)?;
        self.undo.push(snapshot);
        self.redo.clear();
        Ok(())
    }

    pub fn undo(&mut self) -> Result<(), CoreError> {
        let Some(previous) = self.undo.pop() else {
            return Err(CoreError::NoHistory("nothing to undo".to_string()));
        };
        let current = self.canvas.snapshot();
        self.canvas
            .restore(&previous)
            .expect("undo snapshots always match canvas dimensions");
        self.redo.push(current);
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), CoreError> {
        let Some(next) = self.redo.pop() else {
            return Err(CoreError::NoHistory("nothing to redo".to_string()));
        };
        let current = self.canvas.snapshot();
        self.canvas
            .restore(&next)
            .expect("redo snapshots always match canvas dimensions");
        self.undo.push(current);
        Ok(())
    }

    #[cfg(test)]
    fn undo_len(&self) -> usize {
        self.undo.len()
    }

    #[cfg(test)]
    fn redo_len(&self) -> usize {
        self.redo.len()
    }
}
