//! Growable byte string used for identifiers and literal text
//!
//! [`DString`] is the text carrier shared by every other module: the symbol
//! table keys on it, AST nodes own their identifiers and string literals as
//! `DString`s, and the token interface hands literal text over in one.
//!
//! The buffer tracks its own `capacity` instead of relying on `Vec`'s growth
//! policy. One slot is always kept free for the terminator of the target
//! language's string representation, so `len() < capacity()` holds at all
//! times, and a full string grows by a fixed [`STRING_RESIZE_INCREMENT`].

use crate::constants::{STRING_INIT_SIZE, STRING_RESIZE_INCREMENT};
use std::borrow::{Borrow, Cow};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Dynamic string errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DStringError {
    #[error("failed to grow dynamic string")]
    Resize,
    #[error("failed to copy dynamic string")]
    Copy,
}

/// Owned, growable byte buffer
#[derive(Clone)]
pub struct DString {
    buf: Vec<u8>,
    capacity: usize,
}

impl DString {
    /// Create an empty string with the initial capacity
    pub fn init() -> Self {
        DString {
            buf: Vec::with_capacity(STRING_INIT_SIZE),
            capacity: STRING_INIT_SIZE,
        }
    }

    /// Create a string holding a copy of `lit`, `None` for an empty literal
    pub fn from_literal(lit: &str) -> Option<Self> {
        if lit.is_empty() {
            return None;
        }
        Some(Self::from(lit))
    }

    /// Append one byte, growing the buffer by the fixed increment when full
    pub fn append_char(&mut self, c: u8) -> Result<(), DStringError> {
        if self.buf.len() + 1 >= self.capacity {
            self.resize(STRING_RESIZE_INCREMENT)?;
        }
        self.buf.push(c);
        Ok(())
    }

    /// Append every byte of `s`
    pub fn append_str(&mut self, s: &str) -> Result<(), DStringError> {
        for byte in s.bytes() {
            self.append_char(byte)?;
        }
        Ok(())
    }

    /// Replace the contents of `self` with a deep copy of `src`
    ///
    /// The destination is resized to exactly fit the source plus the
    /// terminator slot.
    pub fn copy_from(&mut self, src: &DString) -> Result<(), DStringError> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(src.len())
            .map_err(|_| DStringError::Copy)?;
        buf.extend_from_slice(&src.buf);
        self.buf = buf;
        self.capacity = src.len() + 1;
        Ok(())
    }

    /// Deep-copy `src` into `dst`
    pub fn copy(src: Option<&DString>, dst: Option<&mut DString>) -> Result<(), DStringError> {
        match (src, dst) {
            (Some(src), Some(dst)) => dst.copy_from(src),
            _ => Err(DStringError::Copy),
        }
    }

    /// Byte-wise equality; a missing string is never equal to anything
    pub fn compare(a: Option<&DString>, b: Option<&DString>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => a.len() == b.len() && a.buf == b.buf,
            _ => false,
        }
    }

    /// Byte-wise equality against a string literal
    pub fn compare_with_literal(a: Option<&DString>, lit: &str) -> bool {
        match a {
            Some(a) => a.len() == lit.len() && a.buf == lit.as_bytes(),
            None => false,
        }
    }

    /// Owned copy of the text, `None` for a missing, empty or non-UTF-8 string
    pub fn to_owned_cstr(a: Option<&DString>) -> Option<String> {
        let a = a?;
        if a.is_empty() {
            return None;
        }
        String::from_utf8(a.buf.clone()).ok()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Allocated size, always strictly greater than `len()`
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Text view, `None` if the bytes are not valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.buf).ok()
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.buf)
    }

    fn resize(&mut self, increment: usize) -> Result<(), DStringError> {
        let new_capacity = self.buf.len() + increment;
        let additional = new_capacity.saturating_sub(self.buf.len());
        self.buf
            .try_reserve_exact(additional)
            .map_err(|_| DStringError::Resize)?;
        self.capacity = new_capacity;
        Ok(())
    }
}

impl Default for DString {
    fn default() -> Self {
        Self::init()
    }
}

impl From<&str> for DString {
    fn from(s: &str) -> Self {
        let mut buf = Vec::with_capacity(s.len());
        buf.extend_from_slice(s.as_bytes());
        DString {
            buf,
            capacity: s.len() + 1,
        }
    }
}

impl From<&[u8]> for DString {
    fn from(bytes: &[u8]) -> Self {
        DString {
            buf: bytes.to_vec(),
            capacity: bytes.len() + 1,
        }
    }
}

impl PartialEq for DString {
    fn eq(&self, other: &Self) -> bool {
        self.buf == other.buf
    }
}

impl Eq for DString {}

impl PartialEq<str> for DString {
    fn eq(&self, other: &str) -> bool {
        self.buf == other.as_bytes()
    }
}

impl PartialEq<&str> for DString {
    fn eq(&self, other: &&str) -> bool {
        self.buf == other.as_bytes()
    }
}

// Must agree with `[u8]`'s hash so lookups through `Borrow<[u8]>` work
impl Hash for DString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.buf.as_slice().hash(state);
    }
}

impl Borrow<[u8]> for DString {
    fn borrow(&self) -> &[u8] {
        &self.buf
    }
}

impl AsRef<[u8]> for DString {
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}

impl PartialOrd for DString {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DString {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.buf.cmp(&other.buf)
    }
}

impl fmt::Display for DString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.to_string_lossy())
    }
}

impl fmt::Debug for DString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DString({:?})", self.to_string_lossy())
    }
}
