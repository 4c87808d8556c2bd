//! Import stack. The top entry is always the open script, entries below it
//! remember where their script stopped so it can resume after the import.

use std::fmt::Display;

use log::{debug, error, warn};

use crate::storage::{Storage, StorageError};

/// Default limit for nested imports
pub const DEFAULT_MAX_DEPTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: String,
    /// Resume offset, saved when another script is pushed on top
    pub pos: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Outcome of [`ScriptStack::open_next_file`]
pub enum Next {
    /// The parent script is open again at the offset it stopped at
    Resumed,
    /// The last script finished
    Finished,
}

#[derive(Debug)]
pub enum NavigationError {
    Storage(StorageError),
    /// Pop with nothing on the stack
    EmptyStack,
    /// Import nesting limit reached
    TooDeep { depth: usize, max: usize },
}

impl Display for NavigationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NavigationError::Storage(e) => f.write_fmt(format_args!("Storage error, {}", e)),
            NavigationError::EmptyStack => f.write_str("No script on the stack"),
            NavigationError::TooDeep { depth, max } => f.write_fmt(format_args!("Import depth {} reached the limit of {}", depth, max)),
        }
    }
}

impl std::error::Error for NavigationError {}

impl From<StorageError> for NavigationError {
    fn from(value: StorageError) -> Self {
        NavigationError::Storage(value)
    }
}

pub struct ScriptStack<S: Storage> {
    storage: S,
    stack: Vec<Entry>,
    max_depth: usize,
}

impl<S: Storage> ScriptStack<S> {
    pub fn new(storage: S) -> ScriptStack<S> {
        ScriptStack::with_max_depth(storage, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(storage: S, max_depth: usize) -> ScriptStack<S> {
        ScriptStack { storage, stack: Vec::new(), max_depth }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Entry of the open script
    pub fn current(&self) -> Option<&Entry> {
        self.stack.last()
    }

    /// Open `path`.
    ///
    /// With `push` the caller's offset is saved into the current top and
    /// `path` becomes the new top. When the new script cannot be opened the
    /// push is undone and the caller is reopened where it stopped. Without
    /// `push` the top entry is replaced.
    pub fn open(&mut self, path: &str, push: bool) -> Result<(), NavigationError> {
        if push && self.stack.len() >= self.max_depth {
            warn!("Not opening {}, import depth limit {} reached", path, self.max_depth);
            return Err(NavigationError::TooDeep { depth: self.stack.len(), max: self.max_depth });
        }

        if push {
            let pos = self.storage.position();
            if let Some(top) = self.stack.last_mut() {
                top.pos = pos;
                debug!("Saved {} at {}", top.path, pos);
            }
        }

        self.storage.close();
        if let Err(e) = self.storage.open(path) {
            if push {
                self.reopen_top();
            }
            return Err(e.into());
        }

        let entry = Entry { path: path.to_string(), pos: 0 };
        if push || self.stack.is_empty() {
            self.stack.push(entry);
        } else if let Some(top) = self.stack.last_mut() {
            *top = entry;
        }
        debug!("Opened {}, stack size {}", path, self.stack.len());
        Ok(())
    }

    fn reopen_top(&mut self) {
        let Some(top) = self.stack.last() else {
            return;
        };
        let reopened = self.storage.open(&top.path).and_then(|_| self.storage.seek(top.pos));
        match reopened {
            Ok(()) => debug!("Back in {} at {}", top.path, top.pos),
            Err(e) => error!("Unable to reopen {}, {}", top.path, e),
        }
    }

    /// Close the finished script and resume its parent.
    ///
    /// Popping an empty stack is a caller bug and reported as [`NavigationError::EmptyStack`].
    pub fn open_next_file(&mut self) -> Result<Next, NavigationError> {
        let Some(done) = self.stack.pop() else {
            return Err(NavigationError::EmptyStack);
        };
        self.storage.close();
        debug!("Finished {}, stack size {}", done.path, self.stack.len());

        let Some(top) = self.stack.last() else {
            return Ok(Next::Finished);
        };
        self.storage.open(&top.path)?;
        self.storage.seek(top.pos)?;
        debug!("Resumed {} at {}", top.path, top.pos);
        Ok(Next::Resumed)
    }

    pub fn position(&self) -> u64 {
        self.storage.position()
    }

    pub fn seek(&mut self, pos: u64) -> Result<(), NavigationError> {
        Ok(self.storage.seek(pos)?)
    }

    pub fn read_line(&mut self, buf: &mut [u8]) -> Result<usize, NavigationError> {
        Ok(self.storage.read_line(buf)?)
    }

    /// Close the open script and forget every entry
    pub fn clear(&mut self) {
        self.storage.close();
        self.stack.clear();
    }
}
