//! Compile-time mirror of `relink_core::TypeDecl`
//!
//! Parameter and return types are classified here while the macro runs, so
//! the expansion can both emit the declaration table and decide which
//! methods get a typed proxy method.

use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, ToTokens};
use std::collections::HashSet;
use syn::{GenericArgument, PathArguments, Type};

/// Structural shape of a declared type
pub enum Shape {
    Named(String),
    Generic(String, Vec<Shape>),
    Array(Box<Shape>),
    Variable(String),
    Wildcard,
}

impl Shape {
    /// Classify a type
    ///
    /// `generics` holds the names of the method's type parameters; any path
    /// rooted at one of them is a type variable. References are looked
    /// through, slices and arrays become sequences, and `impl Trait` and `_`
    /// are wildcards.
    pub fn of(ty: &Type, generics: &HashSet<String>) -> Shape {
        match ty {
            Type::Reference(r) => Shape::of(&r.elem, generics),
            Type::Paren(p) => Shape::of(&p.elem, generics),
            Type::Group(g) => Shape::of(&g.elem, generics),
            Type::Slice(s) => Shape::Array(Box::new(Shape::of(&s.elem, generics))),
            Type::Array(a) => Shape::Array(Box::new(Shape::of(&a.elem, generics))),
            Type::ImplTrait(_) | Type::Infer(_) => Shape::Wildcard,
            Type::Tuple(t) if t.elems.is_empty() => Shape::Named("()".to_string()),
            Type::Tuple(t) => Shape::Generic(
                "()".to_string(),
                t.elems.iter().map(|e| Shape::of(e, generics)).collect(),
            ),
            Type::Path(p) => {
                if let Some(qself) = &p.qself {
                    return match Shape::of(&qself.ty, generics) {
                        Shape::Variable(_) => Shape::Variable(type_string(ty)),
                        _ => Shape::Named(type_string(ty)),
                    };
                }

                let rooted_at_generic = p
                    .path
                    .segments
                    .first()
                    .map(|s| generics.contains(&s.ident.to_string()))
                    .unwrap_or(false);
                if rooted_at_generic {
                    return Shape::Variable(type_string(ty));
                }

                let Some(last) = p.path.segments.last() else {
                    return Shape::Named(type_string(ty));
                };
                let raw = last.ident.to_string();

                let args: Vec<Shape> = match &last.arguments {
                    PathArguments::AngleBracketed(angle) => angle
                        .args
                        .iter()
                        .filter_map(|arg| match arg {
                            GenericArgument::Type(t) => Some(Shape::of(t, generics)),
                            _ => None,
                        })
                        .collect(),
                    _ => Vec::new(),
                };

                if args.is_empty() {
                    Shape::Named(raw)
                } else {
                    Shape::Generic(raw, args)
                }
            }
            _ => Shape::Named(type_string(ty)),
        }
    }

    pub fn is_resolvable(&self) -> bool {
        match self {
            Shape::Named(_) => true,
            Shape::Generic(_, args) => args.iter().all(Shape::is_resolvable),
            Shape::Array(element) => element.is_resolvable(),
            Shape::Variable(_) | Shape::Wildcard => false,
        }
    }
}

impl ToTokens for Shape {
    fn to_tokens(&self, tokens: &mut TokenStream2) {
        let expanded = match self {
            Shape::Named(name) => quote! { ::relink::core::TypeDecl::named(#name) },
            Shape::Generic(raw, args) => quote! {
                ::relink::core::TypeDecl::generic(#raw, ::std::vec![#(#args),*])
            },
            Shape::Array(element) => quote! { ::relink::core::TypeDecl::array(#element) },
            Shape::Variable(name) => quote! { ::relink::core::TypeDecl::variable(#name) },
            Shape::Wildcard => quote! { ::relink::core::TypeDecl::Wildcard },
        };
        tokens.extend(expanded);
    }
}

/// Source-like rendering of a type: `Vec < u8 >` becomes `Vec<u8>`, while
/// `dyn Listener` keeps its space
pub fn type_string(ty: &Type) -> String {
    let spaced = ty.to_token_stream().to_string();
    let chars: Vec<char> = spaced.chars().collect();
    let word = |c: char| c.is_alphanumeric() || c == '_';

    let mut out = String::with_capacity(chars.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' {
            let prev = i.checked_sub(1).and_then(|j| chars.get(j)).copied();
            let next = chars.get(i + 1).copied();
            if matches!((prev, next), (Some(p), Some(n)) if word(p) && word(n)) {
                out.push(' ');
            }
            continue;
        }
        out.push(c);
    }
    out
}
