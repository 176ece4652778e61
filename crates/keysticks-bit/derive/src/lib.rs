mod derive;

use proc_macro::TokenStream;

use crate::derive::handle_derive_bit;

/// Implements `keysticks_bit_mask::Bitable` for a fieldless enum.
/// Bits are assigned by declaration order, not by discriminant.
#[proc_macro_derive(Bit)]
pub fn derive_bit(input: TokenStream) -> TokenStream {
    handle_derive_bit(input)
}
