//! Catalog of built-in functions
//!
//! Every built-in lives in the reserved `ifj` namespace and is registered into
//! the global frame when the frame stack is initialized. The same catalog is
//! consulted by semantic analysis (arity and parameter types of `ifj.*` calls)
//! and by the target code emitter, which provides bodies for these names.

use crate::constants::{BUILTIN_NAMESPACE, BUILTIN_SEPARATOR};
use crate::dstring::DString;
use crate::symtable::{FunctionData, FunctionParam, SymbolType};
use crate::symtable::SymbolType as T;

/// Signature of one built-in function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinSignature {
    /// Name without the namespace prefix
    pub name: &'static str,
    pub params: &'static [(&'static str, SymbolType)],
    pub return_type: SymbolType,
}

impl BuiltinSignature {
    /// Name as written in source code, e.g. `ifj.write`
    pub fn qualified_name(&self) -> String {
        format!("{}{}{}", BUILTIN_NAMESPACE, BUILTIN_SEPARATOR, self.name)
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Symbol table payload for this signature
    pub fn function_data(&self) -> FunctionData {
        FunctionData {
            params: self
                .params
                .iter()
                .map(|(id, param_type)| FunctionParam {
                    id: DString::from_literal(id),
                    param_type: *param_type,
                })
                .collect(),
            return_type: self.return_type,
        }
    }
}

pub static BUILTIN_FUNCTIONS: &[BuiltinSignature] = &[
    BuiltinSignature { name: "readstr", params: &[], return_type: T::StringOrNull },
    BuiltinSignature { name: "readi32", params: &[], return_type: T::IntOrNull },
    BuiltinSignature { name: "readf64", params: &[], return_type: T::DoubleOrNull },
    BuiltinSignature { name: "write", params: &[("term", T::Unknown)], return_type: T::Void },
    BuiltinSignature { name: "i2f", params: &[("term", T::Int)], return_type: T::Double },
    BuiltinSignature { name: "f2i", params: &[("term", T::Double)], return_type: T::Int },
    BuiltinSignature { name: "string", params: &[("term", T::Unknown)], return_type: T::String },
    BuiltinSignature { name: "length", params: &[("s", T::String)], return_type: T::Int },
    BuiltinSignature {
        name: "concat",
        params: &[("s1", T::String), ("s2", T::String)],
        return_type: T::String,
    },
    BuiltinSignature {
        name: "substring",
        params: &[("s", T::String), ("i", T::Int), ("j", T::Int)],
        return_type: T::StringOrNull,
    },
    BuiltinSignature {
        name: "strcmp",
        params: &[("s1", T::String), ("s2", T::String)],
        return_type: T::Int,
    },
    BuiltinSignature {
        name: "ord",
        params: &[("s", T::String), ("i", T::Int)],
        return_type: T::Int,
    },
    BuiltinSignature { name: "chr", params: &[("i", T::Int)], return_type: T::String },
];

/// Look up a built-in by bare (`length`) or qualified (`ifj.length`) name
pub fn builtin_signature(name: &str) -> Option<&'static BuiltinSignature> {
    let bare = name
        .strip_prefix(BUILTIN_NAMESPACE)
        .and_then(|rest| rest.strip_prefix(BUILTIN_SEPARATOR))
        .unwrap_or(name);
    BUILTIN_FUNCTIONS.iter().find(|sig| sig.name == bare)
}

pub fn is_builtin(name: &str) -> bool {
    builtin_signature(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_both_names() {
        let sig = builtin_signature("ifj.substring").unwrap();
        assert_eq!(sig.arity(), 3);
        assert_eq!(sig.return_type, SymbolType::StringOrNull);
        assert_eq!(builtin_signature("substring"), Some(sig));
        assert!(!is_builtin("ifj.printf"));
    }

    #[test]
    fn test_function_data() {
        let data = builtin_signature("ord").unwrap().function_data();
        assert_eq!(data.arity(), 2);
        assert_eq!(data.params[0].id, Some(DString::from("s")));
        assert_eq!(data.params[1].param_type, SymbolType::Int);
        assert_eq!(data.return_type, SymbolType::Int);
    }

    #[test]
    fn test_qualified_names_are_unique() {
        let mut names: Vec<String> = BUILTIN_FUNCTIONS.iter().map(|b| b.qualified_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), BUILTIN_FUNCTIONS.len());
        assert!(names.iter().all(|n| n.starts_with("ifj.")));
    }
}
