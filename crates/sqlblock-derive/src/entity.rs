//! Entity derive macro implementation

use crate::common::syn_types::{option_inner, vec_inner};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

/// Parsed field-level `#[entity(...)]` attribute.
#[derive(Default)]
struct FieldAttr {
    column: Option<String>,
    ignore: bool,
    skip: bool,
    nested: bool,
    relation: bool,
}

impl syn::parse::Parse for FieldAttr {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            match ident.to_string().as_str() {
                "ignore" => attr.ignore = true,
                "skip" => attr.skip = true,
                "nested" => attr.nested = true,
                "relation" => attr.relation = true,
                "column" => {
                    let _: syn::Token![=] = input.parse()?;
                    let value: syn::LitStr = input.parse()?;
                    attr.column = Some(value.value());
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown entity attribute `{other}`"),
                    ));
                }
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        if attr.nested && attr.relation {
            return Err(input.error("`nested` and `relation` are mutually exclusive"));
        }
        Ok(attr)
    }
}

fn field_attr(field: &syn::Field) -> Result<FieldAttr> {
    let mut merged = FieldAttr::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }
        let parsed: FieldAttr = attr.parse_args()?;
        merged.column = parsed.column.or(merged.column);
        merged.ignore |= parsed.ignore;
        merged.skip |= parsed.skip;
        merged.nested |= parsed.nested;
        merged.relation |= parsed.relation;
    }
    Ok(merged)
}

/// Extract table name from struct-level `#[entity(table = "...")]`.
fn table_name(input: &DeriveInput) -> Result<Option<String>> {
    for attr in &input.attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }
        let nested = attr.parse_args::<syn::MetaNameValue>()?;
        if !nested.path.is_ident("table") {
            return Err(syn::Error::new_spanned(
                &nested.path,
                "expected #[entity(table = \"table_name\")]",
            ));
        }
        if let syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Str(lit),
            ..
        }) = &nested.value
        {
            return Ok(Some(lit.value()));
        }
        return Err(syn::Error::new_spanned(&nested.value, "table must be a string literal"));
    }
    Ok(None)
}

/// Expression converting `value` (a reference) into a `Value`.
fn to_value(value: TokenStream, attr: &FieldAttr) -> TokenStream {
    if attr.nested {
        quote! { ::sqlblock::Value::Nested(::sqlblock::Entity::data_map(#value)) }
    } else if attr.relation {
        quote! {
            ::sqlblock::Value::List(
                (#value)
                    .iter()
                    .map(|item| ::sqlblock::Value::Nested(::sqlblock::Entity::data_map(item)))
                    .collect(),
            )
        }
    } else {
        quote! { ::sqlblock::Value::from(::std::clone::Clone::clone(#value)) }
    }
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Entity can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Entity can only be derived for structs",
            ));
        }
    };

    let mut inserts = Vec::new();
    let mut ignored = Vec::new();

    for field in fields {
        let attr = field_attr(field)?;
        if attr.skip {
            continue;
        }
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let key = attr.column.clone().unwrap_or_else(|| ident.to_string());

        let is_vec = vec_inner(&field.ty)
            .or_else(|| option_inner(&field.ty).and_then(vec_inner))
            .is_some();
        if attr.relation && !is_vec {
            return Err(syn::Error::new_spanned(
                &field.ty,
                "#[entity(relation)] requires a Vec<T> or Option<Vec<T>> field",
            ));
        }

        let insert = if option_inner(&field.ty).is_some() {
            let value = to_value(quote! { value }, &attr);
            quote! {
                if let ::std::option::Option::Some(value) = &self.#ident {
                    map.insert(#key, #value);
                }
            }
        } else {
            let value = to_value(quote! { &self.#ident }, &attr);
            quote! { map.insert(#key, #value); }
        };
        inserts.push(insert);

        if attr.ignore {
            ignored.push(key);
        }
    }

    let table_fn = table_name(&input)?.map(|table| {
        quote! {
            fn table_name(&self) -> &str {
                #table
            }
        }
    });

    let ignore_fn = (!ignored.is_empty()).then(|| {
        quote! {
            fn ignore_fields(&self) -> ::std::vec::Vec<::std::string::String> {
                ::std::vec![#(::std::string::String::from(#ignored)),*]
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::sqlblock::Entity for #name #ty_generics #where_clause {
            #table_fn

            fn data_map(&self) -> ::sqlblock::DataMap {
                let mut map = ::sqlblock::DataMap::new();
                #(#inserts)*
                map
            }

            #ignore_fn
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_field_attr_parsing() {
        let field: syn::Field = parse_quote! {
            #[entity(column = "user_id", ignore)]
            owner: i64
        };
        let attr = field_attr(&field).unwrap();
        assert_eq!(attr.column.as_deref(), Some("user_id"));
        assert!(attr.ignore);
        assert!(!attr.skip);
    }

    #[test]
    fn test_unknown_attribute_is_rejected() {
        let field: syn::Field = parse_quote! {
            #[entity(primary)]
            id: i64
        };
        assert!(field_attr(&field).is_err());
    }

    #[test]
    fn test_expand_table_and_ignore() {
        let input: DeriveInput = parse_quote! {
            #[entity(table = "users")]
            struct User {
                id: i64,
                #[entity(ignore)]
                created_at: String,
                nickname: Option<String>,
                #[entity(skip)]
                cache: u8,
            }
        };
        let out = expand(input).unwrap().to_string();
        assert!(out.contains("\"users\""));
        assert!(out.contains("\"created_at\""));
        assert!(out.contains("\"nickname\""));
        assert!(!out.contains("\"cache\""));
        assert!(out.contains("ignore_fields"));
    }

    #[test]
    fn test_relation_requires_vec() {
        let input: DeriveInput = parse_quote! {
            struct User {
                #[entity(relation)]
                roles: String,
            }
        };
        assert!(expand(input).is_err());
    }

    #[test]
    fn test_tuple_struct_is_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Pair(i64, i64);
        };
        assert!(expand(input).is_err());
    }
}
