use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Error, Fields};

pub(crate) fn handle_derive_bit(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let Data::Enum(data) = &input.data else {
        return Error::new_spanned(name, "Bit can be derived only for enums")
            .to_compile_error()
            .into();
    };

    if data.variants.len() > 64 {
        return Error::new_spanned(name, "Bit supports at most 64 variants")
            .to_compile_error()
            .into();
    }

    let mut variants = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Error::new_spanned(
                &variant.ident,
                "Bit supports only fieldless enum variants",
            )
            .to_compile_error()
            .into();
        }
        variants.push(&variant.ident);
    }

    let index_arms = variants.iter().enumerate().map(|(i, v)| {
        let idx = u32::try_from(i).unwrap_or(u32::MAX);
        quote! { #name::#v => #idx }
    });
    let from_index_arms = variants.iter().enumerate().map(|(i, v)| {
        let idx = u32::try_from(i).unwrap_or(u32::MAX);
        quote! { #idx => ::core::option::Option::Some(#name::#v) }
    });

    let expanded = quote! {
        impl ::keysticks_bit_mask::Bitable for #name {
            #[inline]
            fn bit(&self) -> u64 {
                1u64 << ::keysticks_bit_mask::Bitable::index(self)
            }

            #[inline]
            fn index(&self) -> u32 {
                match self { #( #index_arms, )* }
            }

            #[inline]
            fn from_index(index: u32) -> ::core::option::Option<Self> {
                match index {
                    #( #from_index_arms, )*
                    _ => ::core::option::Option::None,
                }
            }
        }
    };

    TokenStream::from(expanded)
}
