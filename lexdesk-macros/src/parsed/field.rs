#[allow(unused_imports)]
use super::*;

/// Where a slot takes its value from when input is absent or rejected.
pub(crate) enum DefaultSpec {
    Type,
    Custom(Path),
    Disabled,
}

/// Container-level `#[serde(rename_all = "...")]` casing.
#[derive(Clone, Copy)]
pub(crate) enum RenameRule {
    None,
    Lower,
    Upper,
    Camel,
    Pascal,
    Snake,
    ScreamingSnake,
    Kebab,
}

impl RenameRule {
    pub(crate) fn from_lit(lit: &LitStr) -> Result<Self> {
        let rule = match lit.value().as_str() {
            "lowercase" => RenameRule::Lower,
            "UPPERCASE" => RenameRule::Upper,
            "camelCase" => RenameRule::Camel,
            "PascalCase" => RenameRule::Pascal,
            "snake_case" => RenameRule::Snake,
            "SCREAMING_SNAKE_CASE" => RenameRule::ScreamingSnake,
            "kebab-case" => RenameRule::Kebab,
            other => {
                return Err(Error::new(
                    lit.span(),
                    format!("unsupported rename_all rule `{other}`"),
                ));
            }
        };
        Ok(rule)
    }

    /// Applies the rule to a snake_case field name.
    pub(crate) fn apply(&self, field: &str) -> String {
        match self {
            RenameRule::None | RenameRule::Snake => field.to_string(),
            RenameRule::Lower => field.to_ascii_lowercase(),
            RenameRule::Upper => field.to_ascii_uppercase(),
            RenameRule::ScreamingSnake => field.to_ascii_uppercase(),
            RenameRule::Kebab => field.replace('_', "-"),
            RenameRule::Camel | RenameRule::Pascal => {
                let mut out = String::with_capacity(field.len());
                let mut upper_next = matches!(self, RenameRule::Pascal);
                for ch in field.chars() {
                    if ch == '_' {
                        upper_next = true;
                    } else if upper_next {
                        out.push(ch.to_ascii_uppercase());
                        upper_next = false;
                    } else {
                        out.push(ch);
                    }
                }
                out
            }
        }
    }
}

pub(crate) struct ParsedField {
    pub(crate) ident: Ident,
    pub(crate) name: String,
    pub(crate) wire_name: String,
    pub(crate) readonly: bool,
    pub(crate) skip: bool,
    pub(crate) default: DefaultSpec,
}

impl ParsedField {
    pub(crate) fn from_field(field: &Field, rename_rule: RenameRule) -> Result<Self> {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| Error::new(field.span(), "expected a named field"))?;
        let name = ident.unraw().to_string();

        let mut rename: Option<String> = None;
        let mut serde_rename: Option<String> = None;
        let mut readonly = false;
        let mut skip = false;
        let mut default = DefaultSpec::Type;

        for attr in &field.attrs {
            if attr.path().is_ident("assign") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename") {
                        let value: LitStr = meta.value()?.parse()?;
                        rename = Some(value.value());
                    } else if meta.path.is_ident("readonly") {
                        readonly = true;
                    } else if meta.path.is_ident("skip") {
                        skip = true;
                    } else if meta.path.is_ident("default") {
                        if matches!(default, DefaultSpec::Disabled) {
                            return Err(meta.error("`default = ...` conflicts with `no_default`"));
                        }
                        let provider: Path = meta.value()?.parse()?;
                        default = DefaultSpec::Custom(provider);
                    } else if meta.path.is_ident("no_default") {
                        if matches!(default, DefaultSpec::Custom(_)) {
                            return Err(meta.error("`no_default` conflicts with `default = ...`"));
                        }
                        default = DefaultSpec::Disabled;
                    } else {
                        return Err(meta.error(
                            "unknown assign option, expected rename, readonly, skip, default or no_default",
                        ));
                    }
                    Ok(())
                })?;
            } else if attr.path().is_ident("serde")
                && let Some(value) = serde_string_option(attr, "rename")?
            {
                serde_rename = Some(value.value());
            }
        }

        let wire_name = rename
            .or(serde_rename)
            .unwrap_or_else(|| rename_rule.apply(&name));

        Ok(Self {
            ident,
            name,
            wire_name,
            readonly,
            skip,
            default,
        })
    }

    pub(crate) fn fallback_tokens(&self) -> TokenStream2 {
        match &self.default {
            DefaultSpec::Type => quote!(::lexdesk::assign::Fallback::Type),
            DefaultSpec::Custom(provider) => quote!(::lexdesk::assign::Fallback::Custom(#provider)),
            DefaultSpec::Disabled => quote!(::lexdesk::assign::Fallback::Disabled),
        }
    }
}
