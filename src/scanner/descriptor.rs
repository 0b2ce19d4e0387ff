use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;

use crate::structtag::StructTag;

/// Everything a generator knows about one requested type.
#[derive(Debug, Clone, Serialize)]
pub struct StructDescriptor {
    pub type_name: String,
    /// Import path of the declaring package as requested, usually empty
    pub import: String,
    pub package_name: String,
    /// Type parameter list with constraints: `[K comparable, V any]`
    pub generic_declaration: String,
    /// Type parameter names only: `[K, V]`
    pub generic_params: String,
    pub kind: DeclKind,
    pub fields: Vec<FieldDescriptor>,
    /// Constants typed with this type, in declaration order
    pub constants: Vec<EnumConstant>,
    /// Import lines of the declaring file in Go syntax
    pub file_imports: BTreeSet<String>,
    pub source_file: PathBuf,
    pub doc: Option<String>,
}

impl StructDescriptor {
    /// `true` for structs and aliases of structs.
    pub fn is_struct(&self) -> bool {
        matches!(self.kind, DeclKind::Struct | DeclKind::Alias { .. })
    }

    /// Underlying type text for named non-struct declarations.
    pub fn underlying(&self) -> Option<&str> {
        match &self.kind {
            DeclKind::Named { underlying } => Some(underlying),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclKind {
    Struct,
    /// `type A B` or `type A = B` resolved to the struct `B`
    Alias { target: String },
    /// Any non-struct declaration
    Named { underlying: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Slice,
    Map,
    Array,
    Pointer,
    Other,
}

impl TypeKind {
    /// Classify a Go type expression by its outermost constructor.
    pub fn of(ty: &str) -> TypeKind {
        let ty = ty.trim();
        if ty.starts_with("[]") {
            TypeKind::Slice
        } else if ty.starts_with('[') {
            TypeKind::Array
        } else if ty.starts_with("map[") {
            TypeKind::Map
        } else if ty.starts_with('*') {
            TypeKind::Pointer
        } else {
            TypeKind::Other
        }
    }
}

/// One struct field, one entry per declared name.
#[derive(Debug, Clone, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: String,
    pub tag: StructTag,
    pub doc_comment: Option<String>,
    pub line_comment: Option<String>,
    pub embedded: bool,
    pub exported: bool,
    pub can_compare_with_nil: bool,
    pub can_compare_with_zero: bool,
    pub type_kind: TypeKind,
}

impl FieldDescriptor {
    /// Element type of a slice (`[]T` -> `T`).
    pub fn slice_elem(&self) -> Option<&str> {
        self.ty.strip_prefix("[]").map(str::trim)
    }

    /// Key and value types of a map (`map[K]V` -> (`K`, `V`)).
    pub fn map_types(&self) -> Option<(&str, &str)> {
        let rest = self.ty.strip_prefix("map[")?;
        let mut depth = 1usize;
        for (idx, ch) in rest.char_indices() {
            match ch {
                '[' => depth += 1,
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some((rest[..idx].trim(), rest[idx + 1..].trim()));
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// `true` when `key` carries the skip marker `"-"`.
    pub fn is_ignored_by(&self, key: &str) -> bool {
        self.tag.get(key).is_some_and(|t| t.is_ignored())
    }
}

/// A constant of an enum-like named type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumConstant {
    pub name: String,
    pub value: i128,
    pub line_comment: Option<String>,
}

/// `true` for Go exported identifiers.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}
