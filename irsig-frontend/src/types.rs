//! IR type model
//!
//! Types are parsed once and treated as opaque printable values from
//! then on: the only operation the tool needs is the canonical textual
//! form, provided through `Display`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// An IR first-class type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Type {
    Void,
    /// Arbitrary-width integer (i1, i8, i32, ...)
    Integer(u32),
    Half,
    BFloat,
    Float,
    Double,
    Fp128,
    X86Fp80,
    PpcFp128,
    /// Opaque pointer (`ptr`)
    Ptr,
    /// Typed pointer (`i8*`)
    Pointer(Box<Type>),
    Array {
        size: u64,
        element: Box<Type>,
    },
    Vector {
        size: u64,
        element: Box<Type>,
        scalable: bool,
    },
    Struct {
        fields: Vec<Type>,
        packed: bool,
    },
    /// Reference to a named type (`%struct.Foo`), printed by name
    Named(String),
    Function {
        return_type: Box<Type>,
        params: Vec<Type>,
        is_vararg: bool,
    },
    Label,
    Metadata,
    Token,
    /// Body of an opaque named type (`%t = type opaque`)
    Opaque,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Integer(bits) => write!(f, "i{}", bits),
            Type::Half => write!(f, "half"),
            Type::BFloat => write!(f, "bfloat"),
            Type::Float => write!(f, "float"),
            Type::Double => write!(f, "double"),
            Type::Fp128 => write!(f, "fp128"),
            Type::X86Fp80 => write!(f, "x86_fp80"),
            Type::PpcFp128 => write!(f, "ppc_fp128"),
            Type::Ptr => write!(f, "ptr"),
            Type::Pointer(inner) => write!(f, "{}*", inner),
            Type::Array { size, element } => write!(f, "[{} x {}]", size, element),
            Type::Vector {
                size,
                element,
                scalable,
            } => {
                if *scalable {
                    write!(f, "<vscale x {} x {}>", size, element)
                } else {
                    write!(f, "<{} x {}>", size, element)
                }
            }
            Type::Struct { fields, packed } => {
                let (open, close) = if *packed { ("<{", "}>") } else { ("{", "}") };
                if fields.is_empty() {
                    return write!(f, "{}{}", open, close);
                }
                write!(f, "{} ", open)?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", field)?;
                }
                write!(f, " {}", close)
            }
            Type::Named(name) => write!(f, "%{}", name),
            Type::Function {
                return_type,
                params,
                is_vararg,
            } => {
                write!(f, "{} (", return_type)?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                if *is_vararg {
                    if !params.is_empty() {
                        write!(f, ", ")?;
                    }
                    write!(f, "...")?;
                }
                write!(f, ")")
            }
            Type::Label => write!(f, "label"),
            Type::Metadata => write!(f, "metadata"),
            Type::Token => write!(f, "token"),
            Type::Opaque => write!(f, "opaque"),
        }
    }
}

impl Type {
    /// Interpret a bare word as a primitive type, if it is one
    pub fn from_word(word: &str) -> Option<Type> {
        match word {
            "void" => Some(Type::Void),
            "half" => Some(Type::Half),
            "bfloat" => Some(Type::BFloat),
            "float" => Some(Type::Float),
            "double" => Some(Type::Double),
            "fp128" => Some(Type::Fp128),
            "x86_fp80" => Some(Type::X86Fp80),
            "ppc_fp128" => Some(Type::PpcFp128),
            "ptr" => Some(Type::Ptr),
            "label" => Some(Type::Label),
            "metadata" => Some(Type::Metadata),
            "token" => Some(Type::Token),
            _ => {
                let bits = word.strip_prefix('i')?;
                let bits: u32 = bits.parse().ok()?;
                if bits == 0 {
                    return None;
                }
                Some(Type::Integer(bits))
            }
        }
    }
}

/// Named type definitions for one module
///
/// Each parse builds its own table; nothing is shared across load
/// calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeTable {
    definitions: HashMap<String, Type>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a named type. Returns false if the name was already
    /// defined (the caller reports the duplicate).
    pub fn define(&mut self, name: &str, ty: Type) -> bool {
        self.definitions.insert(name.to_string(), ty).is_none()
    }

    /// Look up a named type's definition
    pub fn get(&self, name: &str) -> Option<&Type> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_primitive_display() {
        assert_eq!(Type::Void.to_string(), "void");
        assert_eq!(Type::Integer(32).to_string(), "i32");
        assert_eq!(Type::Integer(1).to_string(), "i1");
        assert_eq!(Type::Double.to_string(), "double");
        assert_eq!(Type::Ptr.to_string(), "ptr");
    }

    #[test]
    fn test_pointer_display() {
        let ty = Type::Pointer(Box::new(Type::Integer(8)));
        assert_eq!(ty.to_string(), "i8*");

        let ty = Type::Pointer(Box::new(ty));
        assert_eq!(ty.to_string(), "i8**");
    }

    #[test]
    fn test_aggregate_display() {
        let arr = Type::Array {
            size: 4,
            element: Box::new(Type::Integer(32)),
        };
        assert_eq!(arr.to_string(), "[4 x i32]");

        let vec = Type::Vector {
            size: 4,
            element: Box::new(Type::Float),
            scalable: false,
        };
        assert_eq!(vec.to_string(), "<4 x float>");

        let svec = Type::Vector {
            size: 2,
            element: Box::new(Type::Integer(64)),
            scalable: true,
        };
        assert_eq!(svec.to_string(), "<vscale x 2 x i64>");

        let st = Type::Struct {
            fields: vec![
                Type::Integer(32),
                Type::Pointer(Box::new(Type::Integer(8))),
            ],
            packed: false,
        };
        assert_eq!(st.to_string(), "{ i32, i8* }");

        let packed = Type::Struct {
            fields: vec![Type::Integer(8)],
            packed: true,
        };
        assert_eq!(packed.to_string(), "<{ i8 }>");

        let empty = Type::Struct {
            fields: vec![],
            packed: false,
        };
        assert_eq!(empty.to_string(), "{}");
    }

    #[test]
    fn test_function_type_display() {
        let ty = Type::Function {
            return_type: Box::new(Type::Integer(32)),
            params: vec![Type::Pointer(Box::new(Type::Integer(8)))],
            is_vararg: true,
        };
        assert_eq!(ty.to_string(), "i32 (i8*, ...)");

        let fnptr = Type::Pointer(Box::new(Type::Function {
            return_type: Box::new(Type::Void),
            params: vec![],
            is_vararg: false,
        }));
        assert_eq!(fnptr.to_string(), "void ()*");
    }

    #[test]
    fn test_named_display() {
        assert_eq!(
            Type::Named("struct.Foo".to_string()).to_string(),
            "%struct.Foo"
        );
    }

    #[test]
    fn test_from_word() {
        assert_eq!(Type::from_word("i32"), Some(Type::Integer(32)));
        assert_eq!(Type::from_word("i1"), Some(Type::Integer(1)));
        assert_eq!(Type::from_word("void"), Some(Type::Void));
        assert_eq!(Type::from_word("x86_fp80"), Some(Type::X86Fp80));
        assert_eq!(Type::from_word("i0"), None);
        assert_eq!(Type::from_word("internal"), None);
        assert_eq!(Type::from_word("inbounds"), None);
    }

    #[test]
    fn test_type_table() {
        let mut table = TypeTable::new();
        assert!(table.is_empty());

        assert!(table.define(
            "struct.Foo",
            Type::Struct {
                fields: vec![Type::Integer(32)],
                packed: false,
            },
        ));
        assert!(table.contains("struct.Foo"));
        assert_eq!(table.len(), 1);

        // Redefinition is flagged
        assert!(!table.define("struct.Foo", Type::Opaque));
    }
}
