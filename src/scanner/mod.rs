//! # Source Scanner
//!
//! Loads one Go package, finds the declarations named by the requested
//! [`TypeSpec`]s and turns each into a [`StructDescriptor`].
//!
//! ```text
//! patterns -> package::load -> (optional) rewrite::fill_db_tags -> describe
//! ```

pub mod descriptor;
pub mod package;
pub mod rewrite;
pub mod shape;

#[cfg(test)]
mod tests;

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{GenError, Result};
use crate::golang::{BuildContext, ConstSpec, TypeDecl, TypeExpr};
use crate::structtag::StructTag;
use crate::typespec::TypeSpec;

pub use descriptor::{
    is_exported, DeclKind, EnumConstant, FieldDescriptor, StructDescriptor, TypeKind,
};
pub use package::{LoadedFile, Package};
pub use rewrite::SourceRewrite;
use shape::ShapeResolver;

/// Knobs for one scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Extra build tags (`--tags`)
    pub build_tags: Vec<String>,
    /// Minor Go version used for `go1.N` build tags
    pub go_minor: u32,
    /// Keep unexported fields (`--unexported`)
    pub include_unexported: bool,
    /// Rewrite sources so every field has a `db` tag
    pub fill_db_tags: bool,
}

/// One requested type with its descriptor.
#[derive(Debug, Clone, Serialize)]
pub struct ScannedType {
    pub spec: TypeSpec,
    pub descriptor: StructDescriptor,
}

/// Output of [`scan`], in request order.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub package_name: String,
    pub dir: PathBuf,
    pub types: Vec<ScannedType>,
    /// Sources changed by tag rewriting; empty unless requested
    #[serde(skip)]
    pub rewrites: Vec<SourceRewrite>,
}

impl ScanResult {
    /// `true` when tag rewriting modified at least one input file.
    pub fn file_changed(&self) -> bool {
        !self.rewrites.is_empty()
    }

    pub fn get(&self, type_name: &str) -> Option<&StructDescriptor> {
        self.types
            .iter()
            .find(|t| t.descriptor.type_name == type_name)
            .map(|t| &t.descriptor)
    }
}

/// Scan the package named by `patterns` for the `wanted` types.
///
/// # Errors
///
/// `Load` for unreadable, unparseable or constraint-excluded packages and
/// for malformed struct tags or enum constants, `AmbiguousPackage` when the
/// patterns span packages, `NotFound` for a missing type.
pub fn scan(patterns: &[String], wanted: &[TypeSpec], options: &ScanOptions) -> Result<ScanResult> {
    let ctx = BuildContext::host(options.build_tags.iter().cloned(), options.go_minor);
    let mut package = package::load(patterns, &ctx)?;

    let rewrites = if options.fill_db_tags {
        let names: Vec<String> = wanted.iter().map(|spec| spec.name.clone()).collect();
        rewrite::fill_db_tags(&mut package, &names, options.include_unexported)?
    } else {
        Vec::new()
    };

    let index = DeclIndex::build(&package)?;
    let package_id = package.id();
    let constants = evaluate_constants(&package);

    let mut types = Vec::with_capacity(wanted.len());
    for spec in wanted {
        let (file_idx, decl) = index.get(&spec.name).ok_or_else(|| GenError::NotFound {
            type_name: spec.name.clone(),
            package: package.name.clone(),
        })?;
        let descriptor = Describer {
            package: &package,
            index: &index,
            package_id: &package_id,
            options,
        }
        .describe(spec, *file_idx, decl, &constants)?;
        debug!(
            type_name = %spec.name,
            fields = descriptor.fields.len(),
            constants = descriptor.constants.len(),
            "scanned declaration"
        );
        types.push(ScannedType {
            spec: spec.clone(),
            descriptor,
        });
    }

    info!(package = %package.name, types = types.len(), "scanned package");
    Ok(ScanResult {
        package_name: package.name,
        dir: package.dir,
        types,
        rewrites,
    })
}

/// Type declarations of the whole package by name.
struct DeclIndex {
    decls: HashMap<String, TypeDecl>,
    files: HashMap<String, usize>,
}

impl DeclIndex {
    fn build(package: &Package) -> Result<Self> {
        let mut decls = HashMap::new();
        let mut files = HashMap::new();
        for (idx, file) in package.files.iter().enumerate() {
            for decl in &file.ast.types {
                if decl.name == "_" {
                    continue;
                }
                if decls.insert(decl.name.clone(), decl.clone()).is_some() {
                    return Err(GenError::load(
                        &file.path,
                        decl.line,
                        format!("{} redeclared in this package", decl.name),
                    ));
                }
                files.insert(decl.name.clone(), idx);
            }
        }
        Ok(DeclIndex { decls, files })
    }

    fn get(&self, name: &str) -> Option<(&usize, &TypeDecl)> {
        Some((self.files.get(name)?, self.decls.get(name)?))
    }

    /// The struct a named or aliased declaration refers to, followed once.
    fn struct_target(&self, decl: &TypeDecl) -> Option<&TypeDecl> {
        let TypeExpr::Other(text) = &decl.ty else {
            return None;
        };
        let base = text.split('[').next().unwrap_or(text).trim();
        if base == decl.name || base.contains('.') {
            return None;
        }
        self.decls
            .get(base)
            .filter(|target| matches!(target.ty, TypeExpr::Struct(_)))
    }
}

/// A constant with its evaluated value, or why evaluation failed.
struct EvaluatedConst<'p> {
    file_idx: usize,
    spec: &'p ConstSpec,
    value: std::result::Result<i128, String>,
}

/// Evaluate every constant of the package.
///
/// A constant may refer to one declared later or in another file, so
/// evaluation repeats until a pass resolves nothing new. Whatever is left
/// keeps the error of its last attempt.
fn evaluate_constants(package: &Package) -> Vec<EvaluatedConst<'_>> {
    let mut out: Vec<EvaluatedConst<'_>> = package
        .files
        .iter()
        .enumerate()
        .flat_map(|(file_idx, file)| {
            file.ast.consts.iter().map(move |spec| EvaluatedConst {
                file_idx,
                spec,
                value: Err(format!("missing value for constant {}", spec.name)),
            })
        })
        .collect();

    let mut env = HashMap::new();
    loop {
        let mut resolved = false;
        for c in out.iter_mut().filter(|c| c.value.is_err()) {
            let Some(expr) = &c.spec.value else {
                continue;
            };
            c.value = expr.eval(c.spec.iota, &env);
            if let Ok(v) = &c.value {
                if c.spec.name != "_" {
                    env.insert(c.spec.name.clone(), *v);
                }
                resolved = true;
            }
        }
        if !resolved {
            break;
        }
    }
    out
}

struct Describer<'a> {
    package: &'a Package,
    index: &'a DeclIndex,
    package_id: &'a str,
    options: &'a ScanOptions,
}

impl<'a> Describer<'a> {
    fn describe(
        &self,
        spec: &TypeSpec,
        file_idx: usize,
        decl: &TypeDecl,
        constants: &[EvaluatedConst<'_>],
    ) -> Result<StructDescriptor> {
        let file = &self.package.files[file_idx];

        let mut file_imports: BTreeSet<String> =
            file.ast.imports.iter().map(|i| i.to_go()).collect();

        let (kind, fields) = match (&decl.ty, self.index.struct_target(decl)) {
            (TypeExpr::Struct(_), _) => (DeclKind::Struct, self.fields(decl, file_idx)?),
            (_, Some(target)) => {
                let target_file = self.index.files.get(&target.name).copied().unwrap_or(file_idx);
                // Field types are written against the target's imports.
                file_imports.extend(
                    self.package.files[target_file]
                        .ast
                        .imports
                        .iter()
                        .map(|i| i.to_go()),
                );
                (
                    DeclKind::Alias {
                        target: target.name.clone(),
                    },
                    self.fields(target, target_file)?,
                )
            }
            (TypeExpr::Other(underlying), None) => (
                DeclKind::Named {
                    underlying: underlying.clone(),
                },
                Vec::new(),
            ),
        };

        let (generic_declaration, generic_params) = generics(decl);

        Ok(StructDescriptor {
            type_name: decl.name.clone(),
            import: spec.import.clone(),
            package_name: self.package.name.clone(),
            generic_declaration,
            generic_params,
            kind,
            fields,
            constants: self.enum_constants(&decl.name, constants)?,
            file_imports,
            source_file: file.path.clone(),
            doc: decl.doc.clone(),
        })
    }

    fn fields(&self, decl: &TypeDecl, file_idx: usize) -> Result<Vec<FieldDescriptor>> {
        let TypeExpr::Struct(fields) = &decl.ty else {
            return Ok(Vec::new());
        };
        let path = &self.package.files[file_idx].path;
        let resolver = ShapeResolver::new(self.package_id, &self.index.decls).with_type_params(
            decl.type_params
                .iter()
                .flat_map(|group| group.names.iter().cloned()),
        );

        let mut out = Vec::new();
        for field in fields {
            for name in &field.names {
                let exported = is_exported(name);
                if !exported && !self.options.include_unexported {
                    continue;
                }
                let tag = match &field.tag {
                    Some(raw) => StructTag::parse(&raw.value).map_err(|err| {
                        GenError::load(path, field.line, format!("field {name}: {err}"))
                    })?,
                    None => StructTag::default(),
                };
                let shape = resolver.classify(&field.ty);
                out.push(FieldDescriptor {
                    name: name.clone(),
                    ty: field.ty.clone(),
                    tag,
                    doc_comment: field.doc.clone(),
                    line_comment: field.line_comment.clone(),
                    embedded: field.embedded,
                    exported,
                    can_compare_with_nil: shape.nil,
                    can_compare_with_zero: shape.zero,
                    type_kind: TypeKind::of(&field.ty),
                });
            }
        }
        Ok(out)
    }

    /// Constants typed with `type_name`, explicitly or through a conversion.
    fn enum_constants(
        &self,
        type_name: &str,
        constants: &[EvaluatedConst<'_>],
    ) -> Result<Vec<EnumConstant>> {
        let mut out = Vec::new();
        for c in constants {
            let typed = c.spec.ty.as_deref() == Some(type_name)
                || c.spec
                    .value
                    .as_ref()
                    .and_then(|v| v.conversion_type())
                    == Some(type_name);
            if !typed || c.spec.name == "_" {
                continue;
            }
            let value = c.value.clone().map_err(|message| {
                GenError::load(
                    &self.package.files[c.file_idx].path,
                    c.spec.line,
                    format!("constant {}: {message}", c.spec.name),
                )
            })?;
            out.push(EnumConstant {
                name: c.spec.name.clone(),
                value,
                line_comment: c.spec.line_comment.clone(),
            });
        }
        Ok(out)
    }
}

/// `([K comparable, V any], [K, V])`, or two empty strings.
fn generics(decl: &TypeDecl) -> (String, String) {
    if decl.type_params.is_empty() {
        return (String::new(), String::new());
    }
    let declaration = decl
        .type_params
        .iter()
        .map(|group| format!("{} {}", group.names.join(", "), group.constraint))
        .collect::<Vec<_>>()
        .join(", ");
    let params = decl
        .type_params
        .iter()
        .flat_map(|group| group.names.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(", ");
    (format!("[{declaration}]"), format!("[{params}]"))
}
