#[allow(unused_imports)]
use super::*;

pub(crate) struct ParsedRecord {
    name: Ident,
    generics: Generics,
    fields: Vec<ParsedField>,
}

impl ParsedRecord {
    pub(crate) fn from_input(input: &DeriveInput, derive: &str) -> Result<Self> {
        let mut rename_rule = RenameRule::None;
        for attr in &input.attrs {
            if attr.path().is_ident("serde")
                && let Some(value) = serde_string_option(attr, "rename_all")?
            {
                rename_rule = RenameRule::from_lit(&value)?;
            }
        }

        let fields = match &input.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(named) => named
                    .named
                    .iter()
                    .map(|field| ParsedField::from_field(field, rename_rule))
                    .collect::<Result<Vec<_>>>()?,
                _ => {
                    return Err(Error::new(
                        input.ident.span(),
                        format!("{derive} requires named fields"),
                    ));
                }
            },
            _ => {
                return Err(Error::new(
                    input.ident.span(),
                    format!("{derive} can only be derived for structs"),
                ));
            }
        };

        let mut seen: Vec<&str> = Vec::new();
        for field in fields.iter().filter(|field| !field.skip) {
            if seen.contains(&field.wire_name.as_str()) {
                return Err(Error::new(
                    field.ident.span(),
                    format!("duplicate wire name `{}`", field.wire_name),
                ));
            }
            seen.push(&field.wire_name);
        }

        Ok(Self {
            name: input.ident.clone(),
            generics: input.generics.clone(),
            fields,
        })
    }

    fn active_fields(&self) -> impl Iterator<Item = &ParsedField> {
        self.fields.iter().filter(|field| !field.skip)
    }

    pub(crate) fn emit_field_assign(&self) -> TokenStream2 {
        let name = &self.name;
        let (impl_generics, ty_generics, where_clause) = self.generics.split_for_impl();

        let slots = self.active_fields().map(|field| {
            let ident = &field.ident;
            let name_lit = LitStr::new(&field.name, Span::call_site());
            let wire_lit = LitStr::new(&field.wire_name, Span::call_site());
            let settable = !field.readonly;
            let fallback = field.fallback_tokens();
            quote! {
                ::lexdesk::assign::FieldSlot::<Self>::new(#name_lit, #wire_lit, #settable, |record, input, scope| {
                    ::lexdesk::assign::assign_slot(&mut record.#ident, input, #fallback, scope)
                })
            }
        });

        quote! {
            impl #impl_generics ::lexdesk::assign::FieldAssign for #name #ty_generics #where_clause {
                fn field_slots() -> ::std::vec::Vec<::lexdesk::assign::FieldSlot<Self>> {
                    ::std::vec![#(#slots),*]
                }
            }
        }
    }

    pub(crate) fn emit_update_fields(&self) -> TokenStream2 {
        let name = &self.name;
        let (impl_generics, ty_generics, where_clause) = self.generics.split_for_impl();

        let puts = self.active_fields().map(|field| {
            let ident = &field.ident;
            let wire_lit = LitStr::new(&field.wire_name, Span::call_site());
            quote! {
                ::lexdesk::mapping::put_present(&mut map, #wire_lit, &self.#ident)?;
            }
        });

        quote! {
            impl #impl_generics ::lexdesk::mapping::UpdateFields for #name #ty_generics #where_clause {
                #[allow(unused_mut)]
                fn update_fields_to_map(
                    &self,
                ) -> ::std::result::Result<::lexdesk::mapping::UpdateMap, ::lexdesk::errors::MappingError> {
                    let mut map = ::lexdesk::mapping::UpdateMap::new();
                    #(#puts)*
                    ::std::result::Result::Ok(map)
                }
            }
        }
    }
}
