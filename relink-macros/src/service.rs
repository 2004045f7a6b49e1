//! Service procedural macro implementation
//!
//! Expands a trait annotated with `#[service]` into three items:
//!
//! 1. The trait itself, with the relink helper attributes removed
//! 2. `<snake_trait>_declaration()`, building the trait's `ServiceDecl`
//! 3. `<Trait>Proxy<T>`, a typed wrapper over `ServiceProxy<T>`
//!
//! # Code Generation Example
//!
//! Input:
//! ```ignore
//! #[service(target = "calculator")]
//! pub trait Calculator {
//!     #[operation("add")]
//!     fn add(&self, #[param("a")] a: i32, #[param("b")] b: i32) -> i32;
//! }
//! ```
//!
//! Generated output (abridged):
//! ```ignore
//! pub trait Calculator {
//!     fn add(&self, a: i32, b: i32) -> i32;
//! }
//!
//! pub fn calculator_declaration() -> ::relink::core::ServiceDecl {
//!     ::relink::core::ServiceDecl::new("Calculator")
//!         .attr(::relink::core::ServiceAttr::Target("calculator".to_string()))
//!         .method(/* add */)
//! }
//!
//! pub struct CalculatorProxy<T> {
//!     proxy: ::relink::client::ServiceProxy<T>,
//! }
//!
//! impl<T: ::relink::core::Transport> CalculatorProxy<T> {
//!     pub fn add(&self, __arg0: i32, __arg1: i32) -> ::relink::core::Result<i32> {
//!         self.proxy.request("add", vec![/* serialized args */])
//!     }
//! }
//! ```

use crate::shape::Shape;
use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2, TokenTree};
use quote::{format_ident, quote, ToTokens};
use std::collections::HashSet;
use syn::{
    parse_macro_input, Attribute, FnArg, GenericParam, Ident, ItemTrait, LitStr, ReturnType,
    TraitItem, TraitItemFn, Type,
};

/// Implementation of the service attribute macro
pub fn service_impl(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut target: Option<LitStr> = None;
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("target") {
            target = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported service property, expected `target`"))
        }
    });
    parse_macro_input!(args with parser);

    let item_trait = parse_macro_input!(input as ItemTrait);

    match expand(item_trait, target) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

/// One trait method, as far as the expansion is concerned
struct MethodInfo {
    decl: TokenStream2,
    proxy: Option<TokenStream2>,
}

fn expand(mut item_trait: ItemTrait, target: Option<LitStr>) -> syn::Result<TokenStream2> {
    if let Some(param) = item_trait.generics.type_params().next() {
        return Err(syn::Error::new_spanned(
            param,
            "service traits cannot have type parameters",
        ));
    }

    let trait_ident = item_trait.ident.clone();
    let trait_name = trait_ident.to_string();
    let vis = item_trait.vis.clone();

    let mut methods = Vec::new();
    for item in item_trait.items.iter_mut() {
        if let TraitItem::Fn(method) = item {
            methods.push(method_info(method)?);
        }
    }

    let target_attr = target.map(|lit| {
        quote! { .attr(::relink::core::ServiceAttr::Target(#lit.to_string())) }
    });
    let other_attrs = item_trait
        .attrs
        .iter()
        .map(|attr| {
            let path = attr_path(attr);
            quote! { .attr(::relink::core::ServiceAttr::Other(#path.to_string())) }
        })
        .collect::<Vec<_>>();
    let method_decls = methods.iter().map(|m| &m.decl);
    let proxy_methods = methods.iter().filter_map(|m| m.proxy.as_ref());

    let decl_fn = format_ident!("{}_declaration", snake_case(&trait_name));
    let proxy_ident = format_ident!("{}Proxy", trait_ident);
    let decl_doc = format!("Declaration table for [`{}`]", trait_name);
    let proxy_doc = format!("Typed proxy for [`{}`] over a relink transport", trait_name);

    Ok(quote! {
        #item_trait

        #[doc = #decl_doc]
        #vis fn #decl_fn() -> ::relink::core::ServiceDecl {
            ::relink::core::ServiceDecl::new(#trait_name)
                #target_attr
                #(#other_attrs)*
                #(.method(#method_decls))*
        }

        #[doc = #proxy_doc]
        #vis struct #proxy_ident<T> {
            proxy: ::relink::client::ServiceProxy<T>,
        }

        impl<T: ::relink::core::Transport> #proxy_ident<T> {
            /// Bind every method and wrap the transport
            pub fn new(transport: T) -> ::relink::core::Result<Self> {
                let decl = #decl_fn();
                ::std::result::Result::Ok(Self {
                    proxy: ::relink::client::ServiceProxy::new(&decl, transport)?,
                })
            }

            /// Wrap a proxy built elsewhere, e.g. with `ProxyBuilder`
            pub fn from_proxy(proxy: ::relink::client::ServiceProxy<T>) -> Self {
                Self { proxy }
            }

            /// The untyped proxy underneath
            pub fn inner(&self) -> &::relink::client::ServiceProxy<T> {
                &self.proxy
            }

            #(#proxy_methods)*
        }
    })
}

fn method_info(method: &mut TraitItemFn) -> syn::Result<MethodInfo> {
    let name = method.sig.ident.to_string();

    let generics: HashSet<String> = method
        .sig
        .generics
        .params
        .iter()
        .filter_map(|p| match p {
            GenericParam::Type(t) => Some(t.ident.to_string()),
            _ => None,
        })
        .collect();
    let only_lifetimes = method
        .sig
        .generics
        .params
        .iter()
        .all(|p| matches!(p, GenericParam::Lifetime(_)));

    // Method attributes
    let mut method_attrs = Vec::new();
    let mut kept = Vec::new();
    for attr in method.attrs.drain(..) {
        if attr.path().is_ident("operation") {
            let lit: LitStr = attr.parse_args()?;
            method_attrs.push(quote! { .attr(::relink::core::MethodAttr::Operation(#lit.to_string())) });
        } else {
            let path = attr_path(&attr);
            method_attrs.push(quote! { .attr(::relink::core::MethodAttr::Other(#path.to_string())) });
            kept.push(attr);
        }
    }
    method.attrs = kept;

    // Parameters
    let has_receiver = method.sig.receiver().is_some();
    let mut param_decls = Vec::new();
    let mut param_types: Vec<Type> = Vec::new();
    let mut all_resolvable = true;

    for input in method.sig.inputs.iter_mut() {
        let FnArg::Typed(pat_type) = input else {
            continue;
        };

        let shape = Shape::of(&pat_type.ty, &generics);
        all_resolvable &= shape.is_resolvable();

        let mut attrs = Vec::new();
        let mut kept = Vec::new();
        for attr in pat_type.attrs.drain(..) {
            if attr.path().is_ident("param") {
                let lit: LitStr = attr.parse_args()?;
                attrs.push(quote! { .attr(::relink::core::ParamAttr::Name(#lit.to_string())) });
            } else if attr.path().is_ident("callback") {
                attr.meta.require_path_only()?;
                attrs.push(quote! { .attr(::relink::core::ParamAttr::Callback) });
            } else {
                let path = attr_path(&attr);
                attrs.push(quote! { .attr(::relink::core::ParamAttr::Other(#path.to_string())) });
                kept.push(attr);
            }
        }
        pat_type.attrs = kept;

        param_decls.push(quote! {
            ::relink::core::ParamDecl::new(#shape) #(#attrs)*
        });
        param_types.push((*pat_type.ty).clone());
    }

    let decl = quote! {
        ::relink::core::MethodDecl::new(#name)
            #(#method_attrs)*
            #(.param(#param_decls))*
    };

    let return_type: Type = match &method.sig.output {
        ReturnType::Default => syn::parse_quote! { () },
        ReturnType::Type(_, ty) => (**ty).clone(),
    };
    let self_typed = param_types
        .iter()
        .map(ToTokens::to_token_stream)
        .chain(Some(return_type.to_token_stream()))
        .chain(method.sig.generics.where_clause.as_ref().map(ToTokens::to_token_stream))
        .any(mentions_self);

    let callable = has_receiver
        && only_lifetimes
        && all_resolvable
        && !self_typed
        && Shape::of(&return_type, &generics).is_resolvable();
    let proxy = if callable {
        Some(proxy_method(method, &name, &param_types, &return_type))
    } else {
        None
    };

    Ok(MethodInfo { decl, proxy })
}

fn proxy_method(
    method: &TraitItemFn,
    name: &str,
    param_types: &[Type],
    return_type: &Type,
) -> TokenStream2 {
    let ident = &method.sig.ident;
    let generics = &method.sig.generics;
    let where_clause = &method.sig.generics.where_clause;
    let docs = method.attrs.iter().filter(|a| a.path().is_ident("doc"));

    let args: Vec<Ident> = (0..param_types.len())
        .map(|i| Ident::new(&format!("__arg{}", i), Span::call_site()))
        .collect();

    quote! {
        #(#docs)*
        pub fn #ident #generics (&self, #(#args: #param_types),*) -> ::relink::core::Result<#return_type> #where_clause {
            let arguments = ::std::vec![
                #(::relink::__private::to_argument(&#args)?),*
            ];
            self.proxy.request(#name, arguments)
        }
    }
}

fn attr_path(attr: &Attribute) -> String {
    attr.path()
        .segments
        .iter()
        .map(|s| s.ident.to_string())
        .collect::<Vec<_>>()
        .join("::")
}

/// True if `Self` occurs anywhere in the tokens, nested groups included
fn mentions_self(tokens: TokenStream2) -> bool {
    tokens.into_iter().any(|tree| match tree {
        TokenTree::Ident(ident) => ident == "Self",
        TokenTree::Group(group) => mentions_self(group.stream()),
        _ => false,
    })
}

/// `UserService` → `user_service`, `HTTPServer` → `http_server`
fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|j| chars[j]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                None => false,
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) => p.is_uppercase() && next.map(char::is_lowercase).unwrap_or(false),
            };
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
