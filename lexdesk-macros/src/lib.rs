use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::{
    Attribute, Data, DeriveInput, Error, Expr, ExprLit, Field, Fields, Generics, Ident, Lit, LitStr, Meta, Path,
    Result, Token, parse_macro_input, spanned::Spanned,
};

mod parsed;

use parsed::ParsedRecord;

/// Generates a `FieldAssign` implementation: one assignment slot per field.
///
/// Field options, all under `#[assign(...)]`:
///
/// - `rename = "wireName"`: key looked up in the source map. Without it the
///   `#[serde(rename)]` / container `#[serde(rename_all)]` name is used, and
///   then the field name.
/// - `readonly`: input for this field is reported as unsettable.
/// - `default = path::to::fn`: default provider used instead of the type default.
/// - `no_default`: absent or rejected input leaves the field untouched.
/// - `skip`: no slot is generated.
#[proc_macro_derive(FieldAssign, attributes(assign))]
pub fn derive_field_assign(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match ParsedRecord::from_input(&input, "FieldAssign") {
        Ok(parsed) => parsed.emit_field_assign().into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Generates an `UpdateFields` implementation for a request whose fields are
/// all `Nullable<T>`: present fields are copied into the update map under
/// their wire names, absent ones are left out.
#[proc_macro_derive(UpdateFields, attributes(assign))]
pub fn derive_update_fields(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match ParsedRecord::from_input(&input, "UpdateFields") {
        Ok(parsed) => parsed.emit_update_fields().into(),
        Err(err) => err.to_compile_error().into(),
    }
}
