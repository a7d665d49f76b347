//! Scoped frame stack
//!
//! This module provides the scope chain used during semantic analysis and code
//! generation:
//! - [`FrameStack`]: the active scope chain plus every frame ever created
//! - [`Frame`]: one lexical scope with its own [`Symtable`]
//! - [`FrameArray`]: the id-indexed arena all frames live in
//! - [`builtins`]: signatures registered into the global frame at init
//!
//! # Frames outlive the stack discipline
//!
//! Popping a frame only moves `top` back to the enclosing frame. The popped
//! frame stays in the arena, addressable by its id, until [`FrameStack::destroy_all`].
//! The AST stores frame ids, and code generation maps them back to the tables
//! that were active when the nodes were analyzed, long after the stack unwound.
//!
//! # Lookup rules
//!
//! [`FrameStack::find_item`] walks from the innermost frame outwards and stops at
//! the first *search-stop* frame (a function boundary). The global frame is
//! always consulted afterwards, so globals stay visible from inside functions
//! while enclosing block scopes do not:
//!
//! ```text
//! frame 3 (block)      <- top, search starts here
//! frame 2 (function)   <- search-stop: the walk ends here
//! frame 1 (block)      <- never visible from frame 3
//! frame 0 (global)     <- always checked last
//! ```
//!
//! [`FrameStack::get_id`] deliberately ignores this rule and scans the raw chain.

pub mod builtins;

use crate::constants::{FRAME_ARRAY_EXPAND_FACTOR, FRAME_ARRAY_INIT_SIZE, GLOBAL_FRAME_ID};
use crate::error::CompileError;
use crate::symtable::{
    FunctionData, PrintOptions, SymbolData, SymbolState, Symtable, SymtableError, SymtableItem,
};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Index of a frame in the frame array
pub type FrameId = usize;

/// Frame stack errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameStackError {
    #[error("frame stack is not initialized")]
    NotInitialized,
    #[error("cannot pop the global frame")]
    PopGlobal,
    #[error("'{0}' does not exist")]
    ItemDoesntExist(String),
    #[error("'{0}' already exists")]
    ItemAlreadyExists(String),
}

impl From<FrameStackError> for CompileError {
    fn from(err: FrameStackError) -> Self {
        match err {
            FrameStackError::ItemDoesntExist(name) => CompileError::undefined(name),
            FrameStackError::ItemAlreadyExists(name) => CompileError::redefinition(name),
            other => CompileError::internal(other.to_string()),
        }
    }
}

/// Lifecycle of a frame stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStackState {
    Uninitialized,
    Active,
    TornDown,
}

/// One lexical scope
#[derive(Debug, Clone)]
pub struct Frame {
    pub frame_id: FrameId,
    /// Function boundary: lookups do not continue past this frame
    pub search_stop: bool,
    /// Enclosing frame
    pub next: Option<FrameId>,
    pub table: Symtable,
}

impl Frame {
    fn new(frame_id: FrameId, search_stop: bool, next: Option<FrameId>) -> Self {
        Frame {
            frame_id,
            search_stop,
            next,
            table: Symtable::new(),
        }
    }

    fn print<W: fmt::Write>(&self, out: &mut W, opts: PrintOptions) -> fmt::Result {
        write!(out, "Frame ID: {:<10}", self.frame_id)?;
        if self.search_stop {
            write!(out, "is searchStop frame")?;
        }
        writeln!(out)?;
        self.table.print(out, opts)?;
        writeln!(out)
    }
}

/// Arena of every frame created during one compilation, indexed by id
#[derive(Debug, Clone, Default)]
pub struct FrameArray {
    frames: Vec<Frame>,
    allocated: usize,
}

impl FrameArray {
    fn with_capacity(capacity: usize) -> Result<Self, CompileError> {
        let mut frames = Vec::new();
        frames
            .try_reserve_exact(capacity)
            .map_err(|_| CompileError::internal("failed to allocate frame array"))?;
        Ok(FrameArray {
            frames,
            allocated: capacity,
        })
    }

    /// Append a frame, multiplying the capacity once when it is full
    fn push(&mut self, frame: Frame) -> Result<(), CompileError> {
        if self.frames.len() + 1 > self.allocated {
            let new_allocated = self.allocated.max(1) * FRAME_ARRAY_EXPAND_FACTOR;
            self.frames
                .try_reserve_exact(new_allocated - self.frames.len())
                .map_err(|_| CompileError::internal("failed to grow frame array"))?;
            debug!(from = self.allocated, to = new_allocated, "frame array grown");
            self.allocated = new_allocated;
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn get(&self, id: FrameId) -> Option<&Frame> {
        self.frames.get(id)
    }

    pub fn get_mut(&mut self, id: FrameId) -> Option<&mut Frame> {
        self.frames.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of frame slots allocated
    pub fn capacity(&self) -> usize {
        self.allocated
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }
}

/// Stack of active scopes over an arena of all scopes
#[derive(Debug, Clone)]
pub struct FrameStack {
    array: FrameArray,
    top: Option<FrameId>,
    bottom: Option<FrameId>,
    current_id: FrameId,
    state: FrameStackState,
}

impl FrameStack {
    /// Create an uninitialized frame stack; call [`FrameStack::init`] before use
    pub fn new() -> Self {
        FrameStack {
            array: FrameArray::default(),
            top: None,
            bottom: None,
            current_id: GLOBAL_FRAME_ID,
            state: FrameStackState::Uninitialized,
        }
    }

    /// Create the global frame and register the built-in functions into it
    ///
    /// Calling `init` on an active stack does nothing.
    pub fn init(&mut self) -> Result<(), CompileError> {
        if self.state == FrameStackState::Active {
            return Ok(());
        }

        let mut array = FrameArray::with_capacity(FRAME_ARRAY_INIT_SIZE)?;
        array.push(Frame::new(GLOBAL_FRAME_ID, true, None))?;
        self.array = array;
        self.top = Some(GLOBAL_FRAME_ID);
        self.bottom = Some(GLOBAL_FRAME_ID);
        self.current_id = GLOBAL_FRAME_ID;
        self.state = FrameStackState::Active;

        for builtin in builtins::BUILTIN_FUNCTIONS {
            self.add_function(&builtin.qualified_name(), builtin.function_data())
                .map_err(|e| {
                    CompileError::internal(format!(
                        "failed to register built-in '{}': {}",
                        builtin.qualified_name(),
                        e
                    ))
                })?;
        }

        debug!(builtins = builtins::BUILTIN_FUNCTIONS.len(), "frame stack initialized");
        Ok(())
    }

    /// Open a new scope on top of the current one
    ///
    /// `is_function` marks the new frame as a function boundary.
    pub fn push(&mut self, is_function: bool) -> Result<FrameId, CompileError> {
        let Some(top) = self.top else {
            return Err(CompileError::internal("push on an uninitialized frame stack"));
        };

        let frame_id = self.current_id + 1;
        self.array.push(Frame::new(frame_id, is_function, Some(top)))?;
        self.current_id = frame_id;
        self.top = Some(frame_id);

        debug!(frame_id, search_stop = is_function, "frame pushed");
        Ok(frame_id)
    }

    /// Close the innermost scope; the frame itself stays in the arena
    pub fn pop(&mut self) -> Result<(), FrameStackError> {
        let top = self.top.ok_or(FrameStackError::NotInitialized)?;
        let next = self
            .array
            .get(top)
            .and_then(|frame| frame.next)
            .ok_or(FrameStackError::PopGlobal)?;

        self.top = Some(next);
        debug!(frame_id = top, new_top = next, "frame popped");
        Ok(())
    }

    /// Find a visible symbol, honouring function boundaries
    pub fn find_item<K: AsRef<[u8]> + ?Sized>(
        &self,
        key: &K,
    ) -> Result<&SymtableItem, FrameStackError> {
        let id = self.locate(key)?;
        self.array.frames[id]
            .table
            .find_item(key)
            .ok_or_else(|| not_found(key))
    }

    /// Mutable counterpart of [`FrameStack::find_item`]
    pub fn find_item_mut<K: AsRef<[u8]> + ?Sized>(
        &mut self,
        key: &K,
    ) -> Result<&mut SymtableItem, FrameStackError> {
        let id = self.locate(key)?;
        self.array.frames[id]
            .table
            .find_item_mut(key)
            .ok_or_else(|| not_found(key))
    }

    /// Declare `key` in the innermost scope
    ///
    /// Fails with `ItemAlreadyExists` if the name is visible from the top
    /// frame; shadowing is not allowed.
    pub fn add_item<K: AsRef<[u8]> + ?Sized>(
        &mut self,
        key: &K,
    ) -> Result<&mut SymtableItem, FrameStackError> {
        match self.locate(key) {
            Ok(_) => {
                return Err(FrameStackError::ItemAlreadyExists(lossy(key)));
            }
            Err(FrameStackError::ItemDoesntExist(_)) => {}
            Err(e) => return Err(e),
        }

        let top = self.top.ok_or(FrameStackError::NotInitialized)?;
        self.array.frames[top]
            .table
            .add_item(key)
            .map_err(|SymtableError::AlreadyExists(name)| FrameStackError::ItemAlreadyExists(name))
    }

    /// Declare `key` and fill in the item in one step
    pub fn add_item_express<K: AsRef<[u8]> + ?Sized>(
        &mut self,
        key: &K,
        state: SymbolState,
        constant: bool,
        data: SymbolData,
    ) -> Result<&mut SymtableItem, FrameStackError> {
        let item = self.add_item(key)?;
        item.symbol_state = state;
        item.constant = constant;
        item.data = data;
        Ok(item)
    }

    /// Declare a function symbol with its signature
    pub fn add_function(&mut self, name: &str, data: FunctionData) -> Result<(), FrameStackError> {
        self.add_item_express(name, SymbolState::Function, false, SymbolData::Function(data))?;
        Ok(())
    }

    /// Id of the frame holding `key`, scanning the raw chain from the top
    ///
    /// Unlike [`FrameStack::find_item`] this does not stop at function
    /// boundaries. It answers "which frame holds this name right now", not
    /// "is this name visible".
    pub fn get_id<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> Option<FrameId> {
        let mut current = self.top;
        while let Some(id) = current {
            let frame = self.array.get(id)?;
            if frame.table.contains(key) {
                return Some(frame.frame_id);
            }
            current = frame.next;
        }
        None
    }

    /// Frame by id, including frames that were already popped
    pub fn frame(&self, id: FrameId) -> Option<&Frame> {
        self.array.get(id)
    }

    pub fn frame_mut(&mut self, id: FrameId) -> Option<&mut Frame> {
        self.array.get_mut(id)
    }

    pub fn top_frame(&self) -> Option<&Frame> {
        self.top.and_then(|id| self.array.get(id))
    }

    pub fn global_frame(&self) -> Option<&Frame> {
        self.bottom.and_then(|id| self.array.get(id))
    }

    pub fn top_id(&self) -> Option<FrameId> {
        self.top
    }

    /// Highest frame id issued so far
    pub fn current_id(&self) -> FrameId {
        self.current_id
    }

    /// Number of frames in the arena
    pub fn frame_count(&self) -> usize {
        self.array.len()
    }

    /// Allocated frame slots
    pub fn capacity(&self) -> usize {
        self.array.capacity()
    }

    /// Number of frames on the active chain
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.top;
        while let Some(id) = current {
            depth += 1;
            current = self.array.get(id).and_then(|f| f.next);
        }
        depth
    }

    pub fn state(&self) -> FrameStackState {
        self.state
    }

    /// Free every frame and reset the stack
    pub fn destroy_all(&mut self) {
        if self.state != FrameStackState::Active {
            return;
        }
        debug!(frames = self.array.len(), "frame stack destroyed");
        self.array = FrameArray::default();
        self.top = None;
        self.bottom = None;
        self.current_id = GLOBAL_FRAME_ID;
        self.state = FrameStackState::TornDown;
    }

    /// Dump the active chain from the top frame down to the global frame
    pub fn print<W: fmt::Write>(&self, out: &mut W, opts: PrintOptions) -> fmt::Result {
        let mut current = self.top;
        while let Some(id) = current {
            let Some(frame) = self.array.get(id) else {
                break;
            };
            frame.print(out, opts)?;
            current = frame.next;
        }
        Ok(())
    }

    /// Dump every frame in the arena in id order
    pub fn print_array<W: fmt::Write>(&self, out: &mut W, opts: PrintOptions) -> fmt::Result {
        for frame in self.array.iter() {
            frame.print(out, opts)?;
        }
        Ok(())
    }

    /// Frame id holding a visible `key`
    fn locate<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> Result<FrameId, FrameStackError> {
        let mut id = self.top.ok_or(FrameStackError::NotInitialized)?;

        loop {
            let frame = &self.array.frames[id];
            if frame.table.contains(key) {
                return Ok(id);
            }
            if frame.search_stop {
                if frame.frame_id == GLOBAL_FRAME_ID {
                    return Err(not_found(key));
                }
                break;
            }
            match frame.next {
                Some(next) => id = next,
                None => break,
            }
        }

        // Crossed a function boundary: globals are still visible
        let global = self.bottom.ok_or(FrameStackError::NotInitialized)?;
        if self.array.frames[global].table.contains(key) {
            Ok(global)
        } else {
            Err(not_found(key))
        }
    }
}

impl Default for FrameStack {
    fn default() -> Self {
        Self::new()
    }
}

fn lossy<K: AsRef<[u8]> + ?Sized>(key: &K) -> String {
    String::from_utf8_lossy(key.as_ref()).into_owned()
}

fn not_found<K: AsRef<[u8]> + ?Sized>(key: &K) -> FrameStackError {
    FrameStackError::ItemDoesntExist(lossy(key))
}
