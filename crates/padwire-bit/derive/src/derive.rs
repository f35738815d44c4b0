use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Error, Fields};

const MAX_VARIANTS: usize = 64;

pub(crate) fn handle_derive_bit(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand(input: &DeriveInput) -> Result<proc_macro2::TokenStream, Error> {
    let name = &input.ident;

    // Declaration order defines the bit index.
    let Data::Enum(data) = &input.data else {
        return Err(Error::new_spanned(name, "Bit can be derived only for enums"));
    };
    let mut variants = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(Error::new_spanned(
                variant,
                "Bit supports only fieldless enum variants",
            ));
        }
        variants.push(&variant.ident);
    }
    if variants.len() > MAX_VARIANTS {
        return Err(Error::new_spanned(
            name,
            "Bit supports at most 64 variants",
        ));
    }

    let count = variants.len();
    let bit_arms = variants.iter().enumerate().map(|(i, v)| {
        let idx = i as u32;
        quote! { #name::#v => #idx }
    });
    let all = variants.iter().map(|v| quote! { #name::#v });

    Ok(quote! {
        impl ::padwire_bit_mask::Bitable for #name {
            #[inline]
            fn bit(&self) -> u64 {
                1u64 << ::padwire_bit_mask::Bitable::index(self)
            }

            #[inline]
            fn index(&self) -> u32 {
                match self { #( #bit_arms, )* }
            }
        }

        impl #name {
            /// Number of variants, i.e. the number of bits in use.
            pub const COUNT: usize = #count;
            /// All variants in bit order.
            pub const ALL: [#name; #count] = [ #( #all, )* ];
        }
    })
}
