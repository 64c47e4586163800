use std::collections::HashMap;

use proc_macro::{Span, TokenStream};
use quote::{ToTokens, format_ident, quote};
use syn::{
    Data, DeriveInput, Error, ExprClosure, Field, Fields, GenericArgument, Ident, LitStr, Pat,
    PathArguments, Result, Token, Type,
    parse::{Parse, ParseStream},
    spanned::Spanned,
};

/// Primitives published by `FromRecord` methods.
const PRIMITIVES: [&str; 4] = ["i64", "u64", "f64", "bool"];

pub(crate) fn expand_from_record(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new(
            input.span(),
            "`FromRecord` may only be derived on structs.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new(
            input.span(),
            "`FromRecord` may only be derived on structs with named fields.",
        ))?
    };

    let fields = fields
        .named
        .iter()
        .map(FieldMetadata::parse)
        .map(Result::transpose)
        .flatten() // Skip fields without an attribute.
        .collect::<Result<Vec<_>>>()?;

    type Case = (Ident, Option<(Type, ExprClosure)>);
    let mut field_methods: HashMap<String, HashMap<String, (LitStr, Case)>> = HashMap::new();
    let mut timestamp_method: Option<Case> = None;

    for field in fields {
        let assignment = (field.name, field.handler);

        match field.identifier {
            FieldIdentifier::Name(name) => {
                let existing = field_methods
                    .entry(field.primitive)
                    .or_default()
                    .insert(name.value(), (name.clone(), assignment));

                if existing.is_some() {
                    Err(Error::new(name.span(), "Field names must be unique."))?
                }
            }
            FieldIdentifier::Timestamp => {
                let existing = timestamp_method.replace(assignment);

                if existing.is_some() {
                    Err(Error::new(
                        field.span.into(),
                        "Field names must be unique.",
                    ))?;
                }
            }
        }
    }

    let field_methods = field_methods.into_iter().map(|(primitive, fields)| {
        let cases = fields.into_values().map(|(name_lit, (name, handler))| {
            let assignment = if let Some((field_type, handler)) = handler {
                let body = handler.body;
                let acc = &handler.inputs[0];
                let val = &handler.inputs[1];

                quote! {
                    (|#acc: &mut #field_type, #val| {#body})(&mut self.#name, value)
                }
            } else {
                quote! {
                    self.#name = Some(value)
                }
            };

            quote! { #name_lit => { #assignment } }
        });

        let primitive = format_ident!("{}", primitive);
        let method = format_ident!("add_{}", primitive);

        quote! {
            fn #method(&mut self, field: &str, value: #primitive) {
                match field {
                    #(#cases)*
                    _ => {}
                };
            }
        }
    });

    let timestamp_method = timestamp_method.map(|(name, handler)| {
        let assignment = if let Some((field_type, handler)) = handler {
            let body = handler.body;
            let acc = &handler.inputs[0];
            let val = &handler.inputs[1];

            quote! {
                (|#acc: &mut #field_type, #val| #body)(&mut self.#name, timestamp)
            }
        } else {
            quote! { self.#name = Some(timestamp) }
        };

        quote! {
            fn add_timestamp(&mut self, timestamp: u64) {
                #assignment;
            }
        }
    });

    let name = &input.ident;

    let expanded = quote! {
        impl FromRecord for #name {
            #(#field_methods)*
            #timestamp_method
        }
    };

    Ok(expanded.into())
}

#[derive(Debug)]
struct FieldMetadata {
    name: Ident,
    primitive: String,
    identifier: FieldIdentifier,
    handler: Option<(Type, ExprClosure)>,
    span: Span,
}

#[derive(Debug)]
enum FieldIdentifier {
    Name(LitStr),
    Timestamp,
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Option<Self>> {
        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("field")) else {
            return Ok(None);
        };

        let Some(name) = field.ident.clone() else {
            Err(Error::new_spanned(field, "Field must be named."))?
        };

        let span = attr.span().unwrap();

        let FieldAttribute {
            identifier,
            handler,
        } = attr.meta.require_list()?.parse_args()?;

        let primitive = if let Some(handler) = &handler {
            if handler.inputs.len() != 2 {
                Err(Error::new_spanned(
                    handler,
                    "Handler closure must have two parameters.",
                ))?
            }

            let parameter = &handler.inputs[1];

            let Pat::Type(pat_type) = parameter else {
                Err(Error::new_spanned(
                    parameter,
                    "Handler closure's second parameter must be annotated with the expected primitive type.",
                ))?
            };

            (*pat_type.ty).clone()
        } else {
            option_inner_type(&field.ty)?
        };

        let primitive_name = primitive.to_token_stream().to_string();

        let expected = match identifier {
            FieldIdentifier::Name(_) => PRIMITIVES.contains(&primitive_name.as_str()),
            FieldIdentifier::Timestamp => primitive_name == "u64",
        };

        if !expected {
            Err(Error::new_spanned(
                &primitive,
                match identifier {
                    FieldIdentifier::Name(_) => {
                        "Field primitive must be one of `i64`, `u64`, `f64` or `bool`."
                    }
                    FieldIdentifier::Timestamp => "Timestamp primitive must be `u64`.",
                },
            ))?
        }

        let handler = handler.map(|h| (field.ty.clone(), h));

        Ok(Some(Self {
            name,
            primitive: primitive_name,
            identifier,
            handler,
            span,
        }))
    }
}

/// Extract `T` from a field of type `Option<T>`.
fn option_inner_type(ty: &Type) -> Result<Type> {
    let Type::Path(path) = ty else {
        Err(Error::new_spanned(ty, "Field must have a type annotation."))?
    };

    let Some(segment) = path.path.segments.last() else {
        Err(Error::new_spanned(
            &path.path.segments,
            "Field must have a type annotation.",
        ))?
    };

    if segment.ident != "Option" {
        Err(Error::new_spanned(
            &segment.ident,
            "Field without a handler must have type `Option<T>`.",
        ))?
    }

    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        Err(Error::new_spanned(
            &segment.arguments,
            "Field of type `Option<T>` must have a generic parameter.",
        ))?
    };

    let Some(GenericArgument::Type(inner_type)) = arguments.args.first() else {
        Err(Error::new_spanned(
            &arguments.args,
            "Generic argument of a field of type `Option<T>` must be a type.",
        ))?
    };

    Ok(inner_type.clone())
}

#[derive(Debug)]
struct FieldAttribute {
    identifier: FieldIdentifier,
    handler: Option<ExprClosure>,
}

impl Parse for FieldAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let identifier = if input.peek(LitStr) {
            FieldIdentifier::Name(input.parse()?)
        } else {
            let ident = input.parse::<Ident>()?;
            if ident != "timestamp" {
                Err(Error::new_spanned(
                    ident,
                    "Field identifier must be a string literal or `timestamp`.",
                ))?
            }
            FieldIdentifier::Timestamp
        };

        let handler = if !input.is_empty() {
            input.parse::<Token![,]>()?;
            Some(input.parse::<ExprClosure>()?)
        } else {
            None
        };

        Ok(Self {
            identifier,
            handler,
        })
    }
}
