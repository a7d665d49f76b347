//! Symbol table of one scope
//!
//! A [`Symtable`] maps identifiers to [`SymtableItem`]s. Every frame of the
//! [`crate::frame_stack::FrameStack`] owns exactly one table; the frame stack is
//! the only component that decides which table an identifier goes into.
//!
//! # Items
//!
//! An item starts out [`SymbolState::Empty`] right after insertion and is filled
//! in by the caller (semantic analysis) once the declaration is understood:
//! - variables: `Variable(type)`, constness, optional compile-time value
//! - functions: `Function` with a [`FunctionData`] signature
//!
//! The map itself is an `FxHashMap` keyed by [`DString`]; lookups accept any
//! byte-slice-like key, so `&str` works as well as `&DString`.

use crate::dstring::DString;
use rustc_hash::FxHashMap;
use std::fmt;
use thiserror::Error;
use tracing::trace;

/// Symbol table errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymtableError {
    #[error("symbol '{0}' already exists in this table")]
    AlreadyExists(String),
}

/// Types a symbol can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymbolType {
    /// Not known yet, or accepts anything (`ifj.write` parameter)
    #[default]
    Unknown,
    Int,
    IntOrNull,
    Double,
    DoubleOrNull,
    String,
    StringOrNull,
    Bool,
    Void,
    Null,
}

impl SymbolType {
    pub fn is_nullable(self) -> bool {
        matches!(
            self,
            SymbolType::IntOrNull
                | SymbolType::DoubleOrNull
                | SymbolType::StringOrNull
                | SymbolType::Null
        )
    }
}

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SymbolType::Unknown => "any",
            SymbolType::Int => "i32",
            SymbolType::IntOrNull => "?i32",
            SymbolType::Double => "f64",
            SymbolType::DoubleOrNull => "?f64",
            SymbolType::String => "[]u8",
            SymbolType::StringOrNull => "?[]u8",
            SymbolType::Bool => "bool",
            SymbolType::Void => "void",
            SymbolType::Null => "null",
        };
        write!(f, "{}", name)
    }
}

/// What an identifier currently denotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymbolState {
    #[default]
    Empty,
    Variable(SymbolType),
    Function,
}

/// Compile-time known scalar value of a constant
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Int(i32),
    Double(f64),
    Str(DString),
}

/// Function parameter in a signature
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionParam {
    pub id: Option<DString>,
    pub param_type: SymbolType,
}

/// Function signature stored with a function symbol
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionData {
    pub params: Vec<FunctionParam>,
    pub return_type: SymbolType,
}

impl FunctionData {
    /// Signature with `arity` unnamed, untyped parameters
    pub fn with_arity(arity: usize) -> Self {
        FunctionData {
            params: (0..arity)
                .map(|_| FunctionParam {
                    id: None,
                    param_type: SymbolType::Unknown,
                })
                .collect(),
            return_type: SymbolType::Unknown,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Payload of a symbol
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SymbolData {
    #[default]
    None,
    Value(ScalarValue),
    Function(FunctionData),
}

/// One entry of a symbol table
#[derive(Debug, Clone, PartialEq)]
pub struct SymtableItem {
    pub key: DString,
    pub symbol_state: SymbolState,
    pub constant: bool,
    pub known_value: bool,
    pub used: bool,
    pub changed: bool,
    pub data: SymbolData,
}

impl SymtableItem {
    pub fn new(key: DString) -> Self {
        SymtableItem {
            key,
            symbol_state: SymbolState::Empty,
            constant: false,
            known_value: false,
            used: false,
            changed: false,
            data: SymbolData::None,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self.symbol_state, SymbolState::Function)
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.symbol_state, SymbolState::Variable(_))
    }

    /// Signature of a function symbol
    pub fn function_data(&self) -> Option<&FunctionData> {
        match &self.data {
            SymbolData::Function(data) => Some(data),
            _ => None,
        }
    }
}

/// Options for the debug dumps of tables and frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintOptions {
    /// Print item payloads, not just keys and states
    pub print_data: bool,
    /// Elide string payloads to their length
    pub cut_data: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        PrintOptions {
            print_data: false,
            cut_data: true,
        }
    }
}

/// Symbol table of one scope
#[derive(Debug, Clone, Default)]
pub struct Symtable {
    items: FxHashMap<DString, SymtableItem>,
}

impl Symtable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh, empty item under `key`
    pub fn add_item<K: AsRef<[u8]> + ?Sized>(
        &mut self,
        key: &K,
    ) -> Result<&mut SymtableItem, SymtableError> {
        let bytes = key.as_ref();
        if self.items.contains_key(bytes) {
            return Err(SymtableError::AlreadyExists(
                String::from_utf8_lossy(bytes).into_owned(),
            ));
        }
        let key = DString::from(bytes);
        trace!(key = %key, "symtable insert");
        Ok(self
            .items
            .entry(key.clone())
            .or_insert_with(|| SymtableItem::new(key)))
    }

    pub fn find_item<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> Option<&SymtableItem> {
        self.items.get(key.as_ref())
    }

    pub fn find_item_mut<K: AsRef<[u8]> + ?Sized>(&mut self, key: &K) -> Option<&mut SymtableItem> {
        self.items.get_mut(key.as_ref())
    }

    pub fn contains<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> bool {
        self.items.contains_key(key.as_ref())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items sorted by key
    pub fn items(&self) -> Vec<&SymtableItem> {
        let mut items: Vec<&SymtableItem> = self.items.values().collect();
        items.sort_by(|a, b| a.key.cmp(&b.key));
        items
    }

    /// Keys of variables that were declared but never read, sorted
    pub fn unused_variables(&self) -> Vec<&DString> {
        self.items()
            .into_iter()
            .filter(|item| item.is_variable() && !item.used)
            .map(|item| &item.key)
            .collect()
    }

    /// Debug dump of the table, one item per line
    pub fn print<W: fmt::Write>(&self, out: &mut W, opts: PrintOptions) -> fmt::Result {
        if self.items.is_empty() {
            return writeln!(out, "  (empty)");
        }
        for item in self.items() {
            write!(out, "  {:<20} {}", item.key, describe_state(item.symbol_state))?;
            if item.constant {
                write!(out, " const")?;
            }
            if item.used {
                write!(out, " used")?;
            }
            if opts.print_data {
                write!(out, " = {}", describe_data(&item.data, opts.cut_data))?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

fn describe_state(state: SymbolState) -> String {
    match state {
        SymbolState::Empty => "empty".to_string(),
        SymbolState::Variable(t) => format!("var {}", t),
        SymbolState::Function => "function".to_string(),
    }
}

fn describe_data(data: &SymbolData, cut: bool) -> String {
    match data {
        SymbolData::None => "-".to_string(),
        SymbolData::Value(ScalarValue::Int(n)) => n.to_string(),
        SymbolData::Value(ScalarValue::Double(d)) => format!("{:?}", d),
        SymbolData::Value(ScalarValue::Str(s)) if cut => format!("<{} bytes>", s.len()),
        SymbolData::Value(ScalarValue::Str(s)) => format!("\"{}\"", s),
        SymbolData::Function(f) => {
            let params: Vec<String> = f
                .params
                .iter()
                .map(|p| match &p.id {
                    Some(id) => format!("{}: {}", id, p.param_type),
                    None => p.param_type.to_string(),
                })
                .collect();
            format!("fn({}) {}", params.join(", "), f.return_type)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_find() {
        let mut table = Symtable::new();
        let item = table.add_item("horse").unwrap();
        assert_eq!(item.symbol_state, SymbolState::Empty);
        item.symbol_state = SymbolState::Variable(SymbolType::Int);

        let found = table.find_item("horse").unwrap();
        assert_eq!(found.symbol_state, SymbolState::Variable(SymbolType::Int));
        assert!(table.find_item("pony").is_none());

        // Lookup by DString key works the same
        assert!(table.find_item(&DString::from("horse")).is_some());
    }

    #[test]
    fn test_duplicate_add_fails() {
        let mut table = Symtable::new();
        table.add_item("x").unwrap();
        assert_eq!(
            table.add_item("x").unwrap_err(),
            SymtableError::AlreadyExists("x".to_string())
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_unused_variables() {
        let mut table = Symtable::new();
        table.add_item("b").unwrap().symbol_state = SymbolState::Variable(SymbolType::Int);
        table.add_item("a").unwrap().symbol_state = SymbolState::Variable(SymbolType::Double);
        table.add_item("f").unwrap().symbol_state = SymbolState::Function;
        table.find_item_mut("b").unwrap().used = true;

        let unused = table.unused_variables();
        assert_eq!(unused.len(), 1);
        assert_eq!(*unused[0], "a");
    }

    #[test]
    fn test_function_data_arity() {
        let data = FunctionData::with_arity(3);
        assert_eq!(data.arity(), 3);
        assert!(data.params.iter().all(|p| p.param_type == SymbolType::Unknown));
    }

    #[test]
    fn test_print() {
        let mut table = Symtable::new();
        let item = table.add_item("s").unwrap();
        item.symbol_state = SymbolState::Variable(SymbolType::String);
        item.constant = true;
        item.data = SymbolData::Value(ScalarValue::Str(DString::from("hello")));

        let mut out = String::new();
        table.print(&mut out, PrintOptions { print_data: true, cut_data: true }).unwrap();
        assert!(out.contains("var []u8 const = <5 bytes>"));

        let mut out = String::new();
        table.print(&mut out, PrintOptions { print_data: true, cut_data: false }).unwrap();
        assert!(out.contains("= \"hello\""));
    }
}
