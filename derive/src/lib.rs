//! `#[derive(Reflect)]` for `json-typeschema`.
//!
//! Generates a `Reflect` impl that builds the type's descriptor:
//!
//! - named-field structs become `StructInfo`s, one field per member, with the
//!   member's `#[schema(...)]` keys as annotations;
//! - newtype structs are transparent to their inner type;
//! - enums with only unit variants become their list of variant names;
//! - everything else is described as an open type.
mod attr;
mod case;

use proc_macro2::{TokenStream, TokenTree};
use quote::{quote, ToTokens};
use syn::ext::IdentExt;
use syn::{parse_macro_input, parse_quote, Data, DataEnum, DeriveInput, Fields, Ident, Result, Type};

use crate::attr::{ContainerAttrs, MemberAttrs};
use crate::case::RenameRule;

#[proc_macro_derive(Reflect, attributes(schema))]
pub fn derive_reflect(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_impl(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_impl(mut input: DeriveInput) -> Result<TokenStream> {
    if let Some(attr) = input.attrs.iter().find(|a| a.path().is_ident("schema")) {
        return Err(syn::Error::new_spanned(
            attr,
            "schema attributes belong on fields and variants",
        ));
    }

    let container = ContainerAttrs::from_attrs(&input.attrs)?;

    // Field types the generated body asks for a descriptor.
    let mut reflected = Vec::new();
    let body = match &input.data {
        Data::Struct(data) => struct_body(&data.fields, container.rename_all, &mut reflected)?,
        Data::Enum(data) => enum_body(data, container.rename_all)?,
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Reflect cannot be derived for unions",
            ));
        }
    };

    // Only parameters that reach a reflected field need the bound.
    for param in input.generics.type_params_mut() {
        if reflected.iter().any(|ty| mentions(ty, &param.ident)) {
            param.bounds.push(parse_quote!(::json_typeschema::Reflect));
        }
    }

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::json_typeschema::Reflect for #ident #ty_generics #where_clause {
            fn type_info() -> ::json_typeschema::TypeInfo {
                #body
            }
        }
    })
}

fn struct_body(
    fields: &Fields,
    rename_all: Option<RenameRule>,
    reflected: &mut Vec<Type>,
) -> Result<TokenStream> {
    match fields {
        Fields::Named(named) => {
            let mut calls = Vec::with_capacity(named.named.len());
            for field in &named.named {
                let attrs = MemberAttrs::from_attrs(&field.attrs)?;
                // Excluded members are never described, so their types need no impl.
                if attrs.is_excluded() {
                    continue;
                }
                let Some(ident) = &field.ident else { continue };
                let declared = ident.unraw().to_string();
                let ty = &field.ty;
                reflected.push(ty.clone());

                let name = match (attrs.name(), rename_all) {
                    (Some(name), _) => Some(name.to_owned()),
                    (None, Some(rule)) => Some(rule.apply_to_field(&declared)),
                    (None, None) => None,
                };
                let name_tag = name.map(|name| {
                    quote!(.with(::json_typeschema::TagKey::Name, #name))
                });
                let tags = attrs.tags.iter().map(|(variant, text)| {
                    quote!(.with(::json_typeschema::TagKey::#variant, #text))
                });

                calls.push(quote! {
                    .field::<#ty>(
                        #declared,
                        ::json_typeschema::Annotations::new() #name_tag #(#tags)*
                    )
                });
            }
            Ok(quote! {
                ::json_typeschema::StructInfo::of::<Self>()
                    #(#calls)*
                    .into()
            })
        }
        Fields::Unnamed(unnamed) => {
            for field in &unnamed.unnamed {
                let attrs = MemberAttrs::from_attrs(&field.attrs)?;
                if attrs.has_constraints() || attrs.name().is_some() {
                    return Err(syn::Error::new_spanned(
                        field,
                        "schema attributes are not supported on tuple fields",
                    ));
                }
            }
            if unnamed.unnamed.len() == 1 {
                let ty = &unnamed.unnamed[0].ty;
                reflected.push(ty.clone());
                Ok(quote!(<#ty as ::json_typeschema::Reflect>::type_info()))
            } else {
                Ok(quote!(::json_typeschema::TypeInfo::Sequence(::json_typeschema::reflect::open)))
            }
        }
        Fields::Unit => Ok(quote!(::json_typeschema::TypeInfo::Open)),
    }
}

fn enum_body(data: &DataEnum, rename_all: Option<RenameRule>) -> Result<TokenStream> {
    if data.variants.iter().any(|v| !matches!(v.fields, Fields::Unit)) {
        return Ok(quote!(::json_typeschema::TypeInfo::Open));
    }

    let mut names = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        let attrs = MemberAttrs::from_attrs(&variant.attrs)?;
        if attrs.has_constraints() {
            return Err(syn::Error::new_spanned(
                variant,
                "only rename and skip are supported on enum variants",
            ));
        }
        if attrs.is_excluded() {
            continue;
        }
        let declared = variant.ident.unraw().to_string();
        let name = match (attrs.name(), rename_all) {
            (Some(name), _) => name.to_owned(),
            (None, Some(rule)) => rule.apply_to_variant(&declared),
            (None, None) => declared,
        };
        names.push(name);
    }

    Ok(quote!(::json_typeschema::TypeInfo::Variants(vec![#(#names),*])))
}

/// Whether `param` occurs anywhere in `ty`. `PhantomData` describes itself
/// without its parameter, so it never counts.
fn mentions(ty: &Type, param: &Ident) -> bool {
    fn scan(tokens: TokenStream, param: &Ident) -> bool {
        tokens.into_iter().any(|tree| match tree {
            TokenTree::Ident(ident) => ident == *param,
            TokenTree::Group(group) => scan(group.stream(), param),
            _ => false,
        })
    }
    if let Type::Path(path) = ty {
        if path.path.segments.last().is_some_and(|seg| seg.ident == "PhantomData") {
            return false;
        }
    }
    scan(ty.to_token_stream(), param)
}
