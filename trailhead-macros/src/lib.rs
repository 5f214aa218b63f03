//! Procedural macros for Trailhead
//!
//! - `mutation_payload!` - Generate GraphQL mutation payload types

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse::Parse, parse::ParseStream, parse_macro_input, Ident, Token, Type};

/// Generate a GraphQL mutation payload wrapping the record a mutation produced.
///
/// # Usage
///
/// ```ignore
/// mutation_payload!(CreateTrailPayload, trail: Trail);
/// mutation_payload!(AddFriendPayload, friend: Friend);
/// ```
///
/// # Generated Code
///
/// For `mutation_payload!(CreateTrailPayload, trail: Trail)`:
///
/// ```ignore
/// #[derive(Debug, Clone, async_graphql::SimpleObject)]
/// pub struct CreateTrailPayload {
///     pub trail: Trail,
/// }
///
/// impl From<Trail> for CreateTrailPayload {
///     fn from(trail: Trail) -> Self {
///         Self { trail }
///     }
/// }
/// ```
#[proc_macro]
pub fn mutation_payload(input: TokenStream) -> TokenStream {
    let parsed = parse_macro_input!(input as MutationPayloadInput);

    let struct_name = &parsed.name;
    let field_name = &parsed.field_name;
    let field_type = &parsed.field_type;

    let output = quote! {
        #[derive(Debug, Clone, async_graphql::SimpleObject)]
        pub struct #struct_name {
            pub #field_name: #field_type,
        }

        impl From<#field_type> for #struct_name {
            fn from(#field_name: #field_type) -> Self {
                Self { #field_name }
            }
        }
    };
    output.into()
}

/// Input for mutation_payload! macro
struct MutationPayloadInput {
    name: Ident,
    field_name: Ident,
    field_type: Type,
}

impl Parse for MutationPayloadInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let name: Ident = input.parse()?;
        input.parse::<Token![,]>()?;
        let field_name: Ident = input.parse()?;
        input.parse::<Token![:]>()?;
        let field_type: Type = input.parse()?;

        // Allow a trailing comma
        if input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
        }

        Ok(MutationPayloadInput {
            name,
            field_name,
            field_type,
        })
    }
}
