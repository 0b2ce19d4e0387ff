//! Type shape classification: can a value of a field type be compared with
//! `nil`, or with its zero value?
//!
//! Named types of the scanned package are resolved through a process-wide
//! cache keyed by `<package id>::<Name>`. A type being resolved is marked in
//! progress first; a recursive reference that meets the marker reads it as
//! comparable, so self-referential types terminate.

use std::collections::{BTreeSet, HashMap};

use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::trace;

use crate::golang::{parse_file, TypeDecl, TypeExpr};

/// How a type may be compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub nil: bool,
    pub zero: bool,
}

impl Shape {
    const NILABLE: Shape = Shape {
        nil: true,
        zero: false,
    };
    const NILABLE_COMPARABLE: Shape = Shape {
        nil: true,
        zero: true,
    };
    const COMPARABLE: Shape = Shape {
        nil: false,
        zero: true,
    };
    const OPAQUE: Shape = Shape {
        nil: false,
        zero: false,
    };
}

#[derive(Debug, Clone, Copy)]
enum CacheEntry {
    InProgress,
    Resolved(Shape),
}

static TYPE_SHAPES: Lazy<DashMap<String, CacheEntry>> = Lazy::new(DashMap::new);

const BASIC_TYPES: &[&str] = &[
    "bool",
    "string",
    "int",
    "int8",
    "int16",
    "int32",
    "int64",
    "uint",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "uintptr",
    "byte",
    "rune",
    "float32",
    "float64",
    "complex64",
    "complex128",
];

/// Classifies field types against the declarations of one package.
pub struct ShapeResolver<'p> {
    package_id: &'p str,
    decls: &'p HashMap<String, TypeDecl>,
    type_params: BTreeSet<String>,
}

impl<'p> ShapeResolver<'p> {
    pub fn new(package_id: &'p str, decls: &'p HashMap<String, TypeDecl>) -> Self {
        ShapeResolver {
            package_id,
            decls,
            type_params: BTreeSet::new(),
        }
    }

    /// Treat these names as type parameters of the declaration being scanned.
    pub fn with_type_params(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.type_params = names.into_iter().collect();
        self
    }

    pub fn classify(&self, ty: &str) -> Shape {
        let ty = ty.trim();
        if self.type_params.contains(ty) {
            return Shape::OPAQUE;
        }
        if ty.starts_with('*') || starts_with_keyword(ty, "chan") || ty.starts_with("<-") {
            return Shape::NILABLE_COMPARABLE;
        }
        if ty.starts_with("[]") || ty.starts_with("map[") {
            return Shape::NILABLE;
        }
        if let Some(rest) = ty.strip_prefix('[') {
            let elem = rest.split_once(']').map_or("", |(_, elem)| elem);
            return Shape {
                nil: false,
                zero: self.classify(elem).zero,
            };
        }
        if starts_with_keyword(ty, "func") {
            return Shape::NILABLE;
        }
        if starts_with_keyword(ty, "interface") || ty == "any" || ty == "error" {
            return Shape::NILABLE_COMPARABLE;
        }
        if starts_with_keyword(ty, "struct") {
            return self.inline_struct(ty);
        }
        if BASIC_TYPES.contains(&ty) {
            return Shape::COMPARABLE;
        }

        let base = ty.split('[').next().unwrap_or(ty);
        if base.contains('.') {
            // Foreign named types are assumed comparable (time.Time).
            return Shape::COMPARABLE;
        }
        match self.decls.get(base) {
            Some(decl) => self.named(decl),
            None => Shape::COMPARABLE,
        }
    }

    fn named(&self, decl: &TypeDecl) -> Shape {
        let key = format!("{}::{}", self.package_id, decl.name);
        let cached = TYPE_SHAPES.get(&key).map(|entry| *entry);
        match cached {
            Some(CacheEntry::Resolved(shape)) => return shape,
            Some(CacheEntry::InProgress) => return Shape::COMPARABLE,
            None => {}
        }

        TYPE_SHAPES.insert(key.clone(), CacheEntry::InProgress);
        let inner = ShapeResolver::new(self.package_id, self.decls).with_type_params(
            decl.type_params
                .iter()
                .flat_map(|group| group.names.iter().cloned()),
        );
        let shape = match &decl.ty {
            TypeExpr::Struct(fields) => Shape {
                nil: false,
                zero: fields.iter().all(|f| inner.classify(&f.ty).zero),
            },
            TypeExpr::Other(underlying) => inner.classify(underlying),
        };
        trace!(%key, ?shape, "resolved type shape");
        TYPE_SHAPES.insert(key, CacheEntry::Resolved(shape));
        shape
    }

    fn inline_struct(&self, ty: &str) -> Shape {
        let src = format!("package p\ntype _ {ty}\n");
        let zero = match parse_file(&src) {
            Ok(file) => match file.types.first().map(|decl| &decl.ty) {
                Some(TypeExpr::Struct(fields)) => {
                    fields.iter().all(|f| self.classify(&f.ty).zero)
                }
                _ => false,
            },
            Err(_) => false,
        };
        Shape { nil: false, zero }
    }
}

/// `ty` begins with `keyword` as a whole word (`func(`, not `funcs`).
fn starts_with_keyword(ty: &str, keyword: &str) -> bool {
    ty.strip_prefix(keyword)
        .is_some_and(|rest| !rest.starts_with(|c: char| c == '_' || c.is_alphanumeric()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decls(src: &str) -> HashMap<String, TypeDecl> {
        parse_file(src)
            .unwrap()
            .types
            .into_iter()
            .map(|d| (d.name.clone(), d))
            .collect()
    }

    #[test]
    fn test_builtin_shapes() {
        let decls = HashMap::new();
        let r = ShapeResolver::new("shape_test_builtin", &decls);
        assert_eq!(r.classify("*int"), Shape::NILABLE_COMPARABLE);
        assert_eq!(r.classify("[]int"), Shape::NILABLE);
        assert_eq!(r.classify("map[string]int"), Shape::NILABLE);
        assert_eq!(r.classify("func()"), Shape::NILABLE);
        assert_eq!(r.classify("error"), Shape::NILABLE_COMPARABLE);
        assert_eq!(r.classify("<-chan int"), Shape::NILABLE_COMPARABLE);
        assert_eq!(r.classify("[4]int"), Shape::COMPARABLE);
        assert_eq!(r.classify("[4][]int"), Shape::OPAQUE);
        assert_eq!(r.classify("channel"), Shape::COMPARABLE);
        assert_eq!(r.classify("time.Time"), Shape::COMPARABLE);
        assert_eq!(r.classify("struct { A int; B string }"), Shape::COMPARABLE);
        assert_eq!(r.classify("struct { A []int }"), Shape::OPAQUE);
    }

    #[test]
    fn test_named_types_resolve_through_package() {
        let decls = decls(
            "package p\ntype IDs []int\ntype Handler func()\ntype Point struct { X, Y int }\ntype Bag struct { Items []string }\n",
        );
        let r = ShapeResolver::new("shape_test_named", &decls);
        assert_eq!(r.classify("IDs"), Shape::NILABLE);
        assert_eq!(r.classify("Handler"), Shape::NILABLE);
        assert_eq!(r.classify("Point"), Shape::COMPARABLE);
        assert_eq!(r.classify("Bag"), Shape::OPAQUE);
        assert_eq!(r.classify("[2]Point"), Shape::COMPARABLE);
    }

    #[test]
    fn test_recursive_types_terminate() {
        let decls = decls("package p\ntype Node struct { Next *Node; Self Tree }\ntype Tree struct { Root Node }\n");
        let r = ShapeResolver::new("shape_test_recursive", &decls);
        assert_eq!(r.classify("Node"), Shape::COMPARABLE);
        assert_eq!(r.classify("Tree"), Shape::COMPARABLE);
    }

    #[test]
    fn test_type_params_are_opaque() {
        let decls = HashMap::new();
        let r = ShapeResolver::new("shape_test_params", &decls).with_type_params(["T".to_string()]);
        assert_eq!(r.classify("T"), Shape::OPAQUE);
        assert_eq!(r.classify("*T"), Shape::NILABLE_COMPARABLE);
    }
}
