mod derive;

use proc_macro::TokenStream;

use crate::derive::handle_derive_bit;

/// Implements `padwire_bit_mask::Bitable` for a fieldless enum.
///
/// Variants get consecutive bit positions in declaration order. The enum
/// also gains `COUNT` and `ALL` associated constants.
#[proc_macro_derive(Bit)]
pub fn derive_bit(input: TokenStream) -> TokenStream {
    handle_derive_bit(input)
}
