//! Parsed module representation
//!
//! A `Module` is the root artifact of one load call: the functions it
//! declares, in declaration order, plus the named-type table built
//! during the parse. It is never mutated after the parse completes.

use crate::types::{Type, TypeTable};
use irsig_common::SourceSpan;
use serde::{Deserialize, Serialize};

/// Reserved namespace prefix for compiler intrinsics
pub const RESERVED_INTRINSIC_PREFIX: &str = "llvm.";

/// A parsed IR module
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// Path the module was loaded from
    pub name: String,
    /// `source_filename` declared in the module text, if any
    pub source_filename: Option<String>,
    /// Functions in declaration order
    pub functions: Vec<Function>,
    /// Named type definitions
    pub types: TypeTable,
}

impl Module {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            source_filename: None,
            functions: Vec::new(),
            types: TypeTable::new(),
        }
    }
}

/// A function declaration or definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    /// Name without the `@` sigil
    pub name: String,
    pub return_type: Type,
    /// Fixed parameter types, in order
    pub params: Vec<Type>,
    pub is_vararg: bool,
    /// True for `define`, false for `declare`
    pub is_definition: bool,
    pub span: SourceSpan,
}

impl Function {
    /// Whether this function belongs to the reserved intrinsic
    /// namespace. Intrinsics are excluded from the signature listing.
    pub fn is_intrinsic(&self) -> bool {
        self.name.starts_with(RESERVED_INTRINSIC_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function(name: &str) -> Function {
        Function {
            name: name.to_string(),
            return_type: Type::Void,
            params: vec![],
            is_vararg: false,
            is_definition: false,
            span: SourceSpan::dummy(),
        }
    }

    #[test]
    fn test_intrinsic_predicate() {
        assert!(function("llvm.dbg.value").is_intrinsic());
        assert!(function("llvm.memcpy.p0i8.p0i8.i64").is_intrinsic());
        assert!(!function("main").is_intrinsic());
        assert!(!function("llvm_helper").is_intrinsic());
        assert!(!function("my.llvm.thing").is_intrinsic());
    }

    #[test]
    fn test_new_module_is_empty() {
        let module = Module::new("input.ll");
        assert_eq!(module.name, "input.ll");
        assert!(module.functions.is_empty());
        assert!(module.types.is_empty());
        assert!(module.source_filename.is_none());
    }
}
