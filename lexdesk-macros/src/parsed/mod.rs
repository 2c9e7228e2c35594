#[allow(unused_imports)]
use super::*;

mod field;
mod record;

pub(crate) use field::{DefaultSpec, ParsedField, RenameRule};
pub(crate) use record::ParsedRecord;

/// Extracts `rename = "..."` / `rename_all = "..."` style string options from a
/// `#[serde(...)]` attribute. Other serde options are ignored.
pub(crate) fn serde_string_option(attr: &Attribute, key: &str) -> Result<Option<LitStr>> {
    let metas = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
    for meta in metas {
        if let Meta::NameValue(pair) = meta
            && pair.path.is_ident(key)
            && let Expr::Lit(ExprLit { lit: Lit::Str(value), .. }) = pair.value
        {
            return Ok(Some(value));
        }
    }
    Ok(None)
}
