//! Syntax-tree schema extraction
//!
//! A [`SourceTree`] holds parsed source files with the module path of every
//! item. It describes named structs as schema trees and traits as method sets
//! by reading declarations directly, with no annotations involved.
//!
//! Types declared in the tree are spelled with their full module path
//! (`atlas_sdk::Resource`) so that two trees, or a tree and a compile-time
//! description, spell the same type the same way.

use super::InterfaceMethod;
use super::locate::module_segments;
use crate::config::ShortNames;
use crate::error::{GenError, GenResult};
use crate::naming::initials;
use quote::ToTokens;
use schemabridge_core::{DataField, DataType, FunctionSignature, NAMESPACE_SEPARATOR, NamedType, Type};
use std::path::{Path, PathBuf};
use syn::ext::IdentExt;
use syn::{Fields, FnArg, Item, ReturnType, TraitItem};
use tracing::debug;

/// Parsed sources of one crate, or of a single file.
#[derive(Debug, Default)]
pub struct SourceTree {
    files: Vec<SourceFile>,
    modules: Vec<Module>,
}

#[derive(Debug)]
struct SourceFile {
    label: String,
    text: String,
}

#[derive(Debug)]
struct Module {
    path: String,
    file: usize,
    items: Vec<Item>,
}

impl SourceTree {
    /// Parse `text` as the contents of `module`.
    pub fn from_source(module: &str, text: &str) -> GenResult<Self> {
        let mut tree = Self::default();
        tree.add_file(module, module.to_string(), text.to_string())?;
        Ok(tree)
    }

    /// Parse the file at `path` as the contents of `module`.
    pub fn from_file(path: impl AsRef<Path>, module: &str) -> GenResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
        let mut tree = Self::default();
        tree.add_file(module, path.display().to_string(), text)?;
        Ok(tree)
    }

    /// Parse every `.rs` file below `src_dir`, the source root of `crate_name`.
    pub fn from_crate(crate_name: &str, src_dir: impl AsRef<Path>) -> GenResult<Self> {
        let src_dir = src_dir.as_ref();
        let mut files = Vec::new();
        collect_rust_files(src_dir, &mut files)?;
        files.sort();

        let mut tree = Self::default();
        for file in files {
            let relative = file.strip_prefix(src_dir).unwrap_or(&file);
            let mut module = vec![crate_name.replace('-', "_")];
            module.extend(module_segments(relative));
            let text = std::fs::read_to_string(&file).map_err(|e| GenError::io(&file, e))?;
            tree.add_file(&module.join(NAMESPACE_SEPARATOR), file.display().to_string(), text)?;
        }
        debug!(crate_name, files = tree.files.len(), modules = tree.modules.len(), "parsed crate");
        Ok(tree)
    }

    fn add_file(&mut self, module: &str, label: String, text: String) -> GenResult<()> {
        let parsed = syn::parse_file(&text).map_err(|source| GenError::Parse {
            path: label.clone(),
            source,
        })?;
        let file = self.files.len();
        self.files.push(SourceFile { label, text });
        self.add_module(module.to_string(), file, parsed.items);
        Ok(())
    }

    fn add_module(&mut self, path: String, file: usize, items: Vec<Item>) {
        let mut own = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Item::Mod(inline) if inline.content.is_some() => {
                    let child = format!("{path}{NAMESPACE_SEPARATOR}{}", inline.ident.unraw());
                    let items = inline.content.map(|(_, items)| items).unwrap_or_default();
                    self.add_module(child, file, items);
                }
                other => own.push(other),
            }
        }
        self.modules.push(Module { path, file, items: own });
    }

    /// Module paths in the tree, in parse order.
    pub fn module_paths(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|module| module.path.as_str())
    }

    /// Find the struct carrying `annotation`, returned as `(module, name)`.
    ///
    /// A struct matches when one of its doc comments contains the annotation,
    /// or when it is the first struct declared below a comment line that does.
    pub fn find_annotated_type(&self, annotation: &str) -> GenResult<(String, String)> {
        for (index, file) in self.files.iter().enumerate() {
            let structs: Vec<(&str, &syn::ItemStruct)> = self
                .modules
                .iter()
                .filter(|module| module.file == index)
                .flat_map(|module| {
                    module.items.iter().filter_map(move |item| match item {
                        Item::Struct(item) => Some((module.path.as_str(), item)),
                        _ => None,
                    })
                })
                .collect();

            if let Some((module, item)) = structs
                .iter()
                .find(|(_, item)| doc_lines(&item.attrs).any(|doc| doc.contains(annotation)))
            {
                return Ok((module.to_string(), item.ident.unraw().to_string()));
            }

            let comment_lines = file.text.lines().enumerate().filter_map(|(idx, line)| {
                let comment = &line[line.find("//")?..];
                comment.contains(annotation).then_some(idx + 1)
            });
            for line in comment_lines {
                let below = structs
                    .iter()
                    .filter(|(_, item)| item.struct_token.span.start().line > line)
                    .min_by_key(|(_, item)| item.struct_token.span.start().line);
                if let Some((module, item)) = below {
                    debug!(file = %file.label, line, name = %item.ident, "found annotated type");
                    return Ok((module.to_string(), item.ident.unraw().to_string()));
                }
            }
        }
        Err(GenError::AnnotatedTypeNotFound(annotation.to_string()))
    }

    /// Describe the struct `name` declared in `module`.
    ///
    /// The root binding is named after the struct's initials; nested struct
    /// bindings take their field names.
    pub fn describe_type(&self, module: &str, name: &str) -> GenResult<DataType> {
        let not_found = || GenError::DeclarationNotFound {
            module: module.to_string(),
            name: name.to_string(),
        };
        match self.declared(module, name).ok_or_else(not_found)? {
            Item::Struct(item) if matches!(item.fields, Fields::Named(_)) => {
                self.describe_struct(&initials(name), module, item, &mut Vec::new())
            }
            _ => Err(GenError::UnsupportedType(format!(
                "{module}{NAMESPACE_SEPARATOR}{name} is not a struct with named fields"
            ))),
        }
    }

    /// Describe the receiver methods of trait `name` declared in `module`.
    ///
    /// Parameter names come from `short_names`. A `Result<T, E>` return gives
    /// the values of `T` followed by the error slot.
    pub fn describe_interface(
        &self,
        module: &str,
        name: &str,
        short_names: &ShortNames,
    ) -> GenResult<Vec<InterfaceMethod>> {
        let Some(Item::Trait(item)) = self.declared(module, name) else {
            return Err(GenError::DeclarationNotFound {
                module: module.to_string(),
                name: name.to_string(),
            });
        };

        let mut methods = Vec::new();
        for trait_item in &item.items {
            let TraitItem::Fn(method) = trait_item else {
                continue;
            };
            let sig = &method.sig;
            let Some(receiver) = sig.receiver() else {
                continue;
            };
            let method_name = sig.ident.unraw().to_string();

            let arg_types: Vec<Type> = sig
                .inputs
                .iter()
                .filter_map(|arg| match arg {
                    FnArg::Typed(pat) => Some(Type::new(self.spell(module, &pat.ty))),
                    FnArg::Receiver(_) => None,
                })
                .collect();

            let ReturnType::Type(_, output) = &sig.output else {
                return Err(GenError::MissingReturn(method_name));
            };
            let (values, error) = split_result(output);
            let value_types: Vec<Type> = values.iter().map(|ty| Type::new(self.spell(module, ty))).collect();
            let mut returns = short_names.name_all(&value_types);
            if error.is_some() {
                returns.push(NamedType::new(short_names.error_name(), Type::error()));
            }
            if returns.is_empty() {
                return Err(GenError::MissingReturn(method_name));
            }

            let mut signature = FunctionSignature::new(method_name, short_names.name_all(&arg_types), returns)
                .with_async(sig.asyncness.is_some());
            if let Some(error) = error {
                signature = signature.with_error_type(self.spell(module, error));
            }
            methods.push(InterfaceMethod {
                signature,
                mutable_receiver: receiver.reference.is_some() && receiver.mutability.is_some(),
            });
        }
        Ok(methods)
    }

    fn describe_struct(
        &self,
        binding: &str,
        module: &str,
        item: &syn::ItemStruct,
        stack: &mut Vec<String>,
    ) -> GenResult<DataType> {
        let qualified = format!("{module}{NAMESPACE_SEPARATOR}{}", item.ident.unraw());
        if stack.contains(&qualified) {
            return Err(GenError::RecursiveType(qualified));
        }
        stack.push(qualified.clone());

        let mut fields = Vec::new();
        for field in &item.fields {
            let Some(ident) = &field.ident else {
                continue;
            };
            if !matches!(field.vis, syn::Visibility::Public(_)) || is_skipped(&field.attrs) {
                continue;
            }
            let field_name = ident.unraw().to_string();
            let data = self.describe_field(&field_name, module, &field.ty, stack)?;
            fields.push(DataField::from_data(field_name, data));
        }

        stack.pop();
        Ok(DataType::new_struct(NamedType::new(binding, qualified), fields))
    }

    fn describe_field(
        &self,
        binding: &str,
        module: &str,
        ty: &syn::Type,
        stack: &mut Vec<String>,
    ) -> GenResult<DataType> {
        let (module, ty) = self.expand_alias(module, ty);
        if let Some(inner) = option_inner(ty) {
            return Ok(self.describe_field(binding, module, inner, stack)?.into_pointer());
        }

        if let syn::Type::Path(path) = ty
            && path.qself.is_none()
            && let Some((decl_module, Item::Struct(item))) = self.resolve(module, &path.path)
        {
            match &item.fields {
                Fields::Named(_) => return self.describe_struct(binding, decl_module, item, stack),
                Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
                    let qualified = Type::new(self.spell(module, ty));
                    let inner = Type::new(self.spell(decl_module, &unnamed.unnamed[0].ty));
                    let data = DataType::simple(NamedType::new(binding, qualified.clone()));
                    return Ok(if inner.is_builtin() && inner != qualified {
                        data.with_primitive(inner)
                    } else {
                        data
                    });
                }
                _ => {}
            }
        }

        Ok(DataType::simple(NamedType::new(binding, self.spell(module, ty))))
    }

    /// Spell `ty` as written in `module`, with a leading pointer marker for
    /// each outer `Option`.
    pub fn spell(&self, module: &str, ty: &syn::Type) -> String {
        let (module, ty) = self.expand_alias(module, ty);
        match option_inner(ty) {
            Some(inner) => format!("*{}", self.spell(module, inner)),
            None => self.spell_inner(module, ty),
        }
    }

    fn spell_inner(&self, module: &str, ty: &syn::Type) -> String {
        let (module, ty) = self.expand_alias(module, ty);
        match ty {
            syn::Type::Reference(reference) => format!(
                "&{}{}",
                if reference.mutability.is_some() { "mut " } else { "" },
                self.spell_inner(module, &reference.elem)
            ),
            syn::Type::Path(path) if path.qself.is_none() => {
                if let Some((decl_module, item)) = self.resolve(module, &path.path)
                    && let Some(ident) = item_ident(item)
                {
                    let args = path
                        .path
                        .segments
                        .last()
                        .map(|segment| self.spell_args(module, &segment.arguments))
                        .unwrap_or_default();
                    return format!("{decl_module}{NAMESPACE_SEPARATOR}{ident}{args}");
                }
                path.path
                    .segments
                    .iter()
                    .map(|segment| format!("{}{}", segment.ident, self.spell_args(module, &segment.arguments)))
                    .collect::<Vec<_>>()
                    .join(NAMESPACE_SEPARATOR)
            }
            syn::Type::Tuple(tuple) => {
                let elems: Vec<String> = tuple.elems.iter().map(|elem| self.spell_inner(module, elem)).collect();
                if elems.len() == 1 {
                    format!("({},)", elems[0])
                } else {
                    format!("({})", elems.join(", "))
                }
            }
            syn::Type::Slice(slice) => format!("[{}]", self.spell_inner(module, &slice.elem)),
            syn::Type::Array(array) => format!(
                "[{}; {}]",
                self.spell_inner(module, &array.elem),
                array.len.to_token_stream()
            ),
            syn::Type::Paren(paren) => self.spell_inner(module, &paren.elem),
            syn::Type::Group(group) => self.spell_inner(module, &group.elem),
            other => other.to_token_stream().to_string(),
        }
    }

    fn spell_args(&self, module: &str, arguments: &syn::PathArguments) -> String {
        let syn::PathArguments::AngleBracketed(args) = arguments else {
            return String::new();
        };
        let spelled: Vec<String> = args
            .args
            .iter()
            .filter_map(|arg| match arg {
                syn::GenericArgument::Type(ty) => Some(self.spell_inner(module, ty)),
                syn::GenericArgument::Lifetime(_) => None,
                other => Some(other.to_token_stream().to_string()),
            })
            .collect();
        if spelled.is_empty() {
            String::new()
        } else {
            format!("<{}>", spelled.join(", "))
        }
    }

    /// Follow non-generic type aliases declared in the tree to the type they
    /// stand for, along with the module that type is written in.
    fn expand_alias<'a>(&'a self, module: &'a str, ty: &'a syn::Type) -> (&'a str, &'a syn::Type) {
        let (mut module, mut ty) = (module, ty);
        let mut seen: Vec<String> = Vec::new();
        while let syn::Type::Path(path) = ty
            && path.qself.is_none()
            && let Some((decl_module, Item::Type(alias))) = self.resolve(module, &path.path)
            && alias.generics.params.is_empty()
        {
            let qualified = format!("{decl_module}{NAMESPACE_SEPARATOR}{}", alias.ident.unraw());
            if seen.contains(&qualified) {
                break;
            }
            seen.push(qualified);
            module = decl_module;
            ty = alias.ty.as_ref();
        }
        (module, ty)
    }

    /// Declaration a path refers to from `module`, with the declaring module.
    fn resolve<'t>(&'t self, module: &str, path: &syn::Path) -> Option<(&'t str, &'t Item)> {
        let segments: Vec<String> = path.segments.iter().map(|segment| segment.ident.unraw().to_string()).collect();
        let (name, prefix) = segments.split_last()?;

        if prefix.is_empty() {
            if let Some(found) = self.declared_with_module(module, name) {
                return Some(found);
            }
            let mut candidates = self
                .modules
                .iter()
                .filter_map(|candidate| self.declared_with_module(&candidate.path, name));
            let first = candidates.next()?;
            return candidates.next().is_none().then_some(first);
        }

        let root = module.split(NAMESPACE_SEPARATOR).next().unwrap_or(module);
        let (mut target, rest): (Vec<&str>, &[String]) = match prefix[0].as_str() {
            "crate" => (vec![root], &prefix[1..]),
            "self" => (module.split(NAMESPACE_SEPARATOR).collect(), &prefix[1..]),
            "super" => {
                let mut parts: Vec<&str> = module.split(NAMESPACE_SEPARATOR).collect();
                parts.pop();
                (parts, &prefix[1..])
            }
            _ => {
                let relative = format!("{module}{NAMESPACE_SEPARATOR}{}", prefix.join(NAMESPACE_SEPARATOR));
                if let Some(found) = self.declared_with_module(&relative, name) {
                    return Some(found);
                }
                (Vec::new(), prefix)
            }
        };
        for segment in rest {
            if segment == "super" {
                target.pop();
            } else {
                target.push(segment.as_str());
            }
        }
        self.declared_with_module(&target.join(NAMESPACE_SEPARATOR), name)
    }

    fn declared(&self, module: &str, name: &str) -> Option<&Item> {
        self.declared_with_module(module, name).map(|(_, item)| item)
    }

    fn declared_with_module(&self, module: &str, name: &str) -> Option<(&str, &Item)> {
        self.modules
            .iter()
            .filter(|candidate| candidate.path == module)
            .flat_map(|candidate| candidate.items.iter().map(move |item| (candidate.path.as_str(), item)))
            .find(|(_, item)| item_ident(item).is_some_and(|ident| ident == name))
    }
}

fn collect_rust_files(dir: &Path, files: &mut Vec<PathBuf>) -> GenResult<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| GenError::io(dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| GenError::io(dir, e))?.path();
        if path.is_dir() {
            collect_rust_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            files.push(path);
        }
    }
    Ok(())
}

fn item_ident(item: &Item) -> Option<String> {
    match item {
        Item::Struct(item) => Some(item.ident.unraw().to_string()),
        Item::Enum(item) => Some(item.ident.unraw().to_string()),
        Item::Trait(item) => Some(item.ident.unraw().to_string()),
        Item::Type(item) => Some(item.ident.unraw().to_string()),
        Item::Union(item) => Some(item.ident.unraw().to_string()),
        _ => None,
    }
}

/// The `T` of `Option<T>`.
fn option_inner(ty: &syn::Type) -> Option<&syn::Type> {
    let syn::Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(inner) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

/// Split `Result<T, E>` into the values of `T` and `E`.
fn split_result(ty: &syn::Type) -> (Vec<&syn::Type>, Option<&syn::Type>) {
    if let syn::Type::Path(path) = ty
        && let Some(segment) = path.path.segments.last()
        && segment.ident == "Result"
        && let syn::PathArguments::AngleBracketed(args) = &segment.arguments
    {
        let types: Vec<&syn::Type> = args
            .args
            .iter()
            .filter_map(|arg| match arg {
                syn::GenericArgument::Type(ty) => Some(ty),
                _ => None,
            })
            .collect();
        if let [ok, err] = types.as_slice() {
            return (expand_tuple(ok), Some(*err));
        }
    }
    (expand_tuple(ty), None)
}

fn expand_tuple(ty: &syn::Type) -> Vec<&syn::Type> {
    match ty {
        syn::Type::Tuple(tuple) => tuple.elems.iter().collect(),
        syn::Type::Paren(paren) => expand_tuple(&paren.elem),
        other => vec![other],
    }
}

fn doc_lines(attrs: &[syn::Attribute]) -> impl Iterator<Item = String> + '_ {
    attrs.iter().filter_map(|attr| {
        if !attr.path().is_ident("doc") {
            return None;
        }
        let syn::Meta::NameValue(meta) = &attr.meta else {
            return None;
        };
        match &meta.value {
            syn::Expr::Lit(syn::ExprLit {
                lit: syn::Lit::Str(doc), ..
            }) => Some(doc.value()),
            _ => None,
        }
    })
}

/// `#[describe(skip)]`, shared with the derive macro.
fn is_skipped(attrs: &[syn::Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("describe")
            && attr
                .meta
                .require_list()
                .is_ok_and(|list| list.tokens.to_string().split(',').any(|arg| arg.trim() == "skip"))
    })
}
