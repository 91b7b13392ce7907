//! Signature Renderer
//!
//! Walks a parsed module's functions in declaration order and writes
//! one line per non-intrinsic function:
//!
//! ```text
//! <return-type> <name>(<param-type>, <param-type>, ...)
//! ```
//!
//! Intrinsics are skipped entirely. Write errors propagate to the
//! caller.

use crate::module::{Function, Module};
use std::io::{self, Write};

/// Render the signatures of all non-intrinsic functions
pub fn render_signatures<W: Write>(module: &Module, out: &mut W) -> io::Result<()> {
    render_signatures_with(module, out, Function::is_intrinsic)
}

/// Render signatures, skipping every function for which `skip` returns
/// true. The filter is a plain predicate on the function so callers are
/// not tied to the reserved-prefix convention.
pub fn render_signatures_with<W, P>(module: &Module, out: &mut W, skip: P) -> io::Result<()>
where
    W: Write,
    P: Fn(&Function) -> bool,
{
    for function in &module.functions {
        if skip(function) {
            continue;
        }
        write!(out, "{} {}(", function.return_type, function.name)?;
        for (i, param) in function.params.iter().enumerate() {
            if i > 0 {
                write!(out, ", ")?;
            }
            write!(out, "{}", param)?;
        }
        writeln!(out, ")")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Type;
    use irsig_common::SourceSpan;
    use pretty_assertions::assert_eq;

    fn function(name: &str, return_type: Type, params: Vec<Type>) -> Function {
        Function {
            name: name.to_string(),
            return_type,
            params,
            is_vararg: false,
            is_definition: true,
            span: SourceSpan::dummy(),
        }
    }

    fn render(module: &Module) -> String {
        let mut out = Vec::new();
        render_signatures(module, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_render_single_function() {
        let mut module = Module::new("test.ll");
        module.functions.push(function(
            "foo",
            Type::Integer(32),
            vec![
                Type::Integer(32),
                Type::Pointer(Box::new(Type::Integer(8))),
            ],
        ));

        assert_eq!(render(&module), "i32 foo(i32, i8*)\n");
    }

    #[test]
    fn test_render_zero_parameters() {
        let mut module = Module::new("test.ll");
        module
            .functions
            .push(function("main", Type::Integer(32), vec![]));

        assert_eq!(render(&module), "i32 main()\n");
    }

    #[test]
    fn test_render_empty_module() {
        let module = Module::new("test.ll");
        assert_eq!(render(&module), "");
    }

    #[test]
    fn test_intrinsics_skipped() {
        let mut module = Module::new("test.ll");
        module.functions.push(function(
            "llvm.dbg.value",
            Type::Void,
            vec![Type::Metadata, Type::Metadata, Type::Metadata],
        ));
        module.functions.push(function(
            "foo",
            Type::Integer(32),
            vec![
                Type::Integer(32),
                Type::Pointer(Box::new(Type::Integer(8))),
            ],
        ));
        module.functions.push(function(
            "llvm.memcpy.p0i8.p0i8.i64",
            Type::Void,
            vec![],
        ));

        // No blank line or placeholder for the skipped intrinsics
        assert_eq!(render(&module), "i32 foo(i32, i8*)\n");
    }

    #[test]
    fn test_only_intrinsics_renders_nothing() {
        let mut module = Module::new("test.ll");
        module
            .functions
            .push(function("llvm.assume", Type::Void, vec![Type::Integer(1)]));

        assert_eq!(render(&module), "");
    }

    #[test]
    fn test_render_preserves_declaration_order() {
        let mut module = Module::new("test.ll");
        for name in ["zeta", "alpha", "beta"] {
            module.functions.push(function(name, Type::Void, vec![]));
        }

        assert_eq!(render(&module), "void zeta()\nvoid alpha()\nvoid beta()\n");
    }

    #[test]
    fn test_custom_skip_predicate() {
        let mut module = Module::new("test.ll");
        module.functions.push(function("keep", Type::Void, vec![]));
        module
            .functions
            .push(function("__rust_alloc", Type::Void, vec![]));

        let mut out = Vec::new();
        render_signatures_with(&module, &mut out, |f| f.name.starts_with("__rust_")).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "void keep()\n");
    }

    #[test]
    fn test_render_is_deterministic() {
        let mut module = Module::new("test.ll");
        module.functions.push(function(
            "f",
            Type::Double,
            vec![Type::Named("struct.Foo".to_string())],
        ));

        assert_eq!(render(&module), render(&module));
        assert_eq!(render(&module), "double f(%struct.Foo)\n");
    }
}
