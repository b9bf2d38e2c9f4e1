use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Lit, LitStr, Meta, Type};

/// Derive macro that describes the CSV columns of a record struct.
///
/// For each field, extracts:
/// - Column name (respects `#[serde(rename = "...")]` and the container's
///   `#[serde(rename_all = "...")]`)
/// - Required (true if not `Option<T>`)
/// - Description (from doc comments)
///
/// Generates `csv_schema() -> &'static [CsvField]` and `csv_header() -> &'static str`.
/// A `CsvField` type must be in scope where the derive is used.
#[proc_macro_derive(CsvSchema, attributes(serde))]
pub fn derive_csv_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return syn::Error::new_spanned(name, "CsvSchema only supports named fields")
                    .to_compile_error()
                    .into()
            }
        },
        _ => {
            return syn::Error::new_spanned(name, "CsvSchema only supports structs")
                .to_compile_error()
                .into()
        }
    };

    let rename_all = serde_str_arg(&input.attrs, "rename_all");

    let columns: Vec<(String, bool, String)> = fields
        .iter()
        .filter_map(|field| {
            let ident = field.ident.as_ref()?.to_string();
            let column = serde_str_arg(&field.attrs, "rename")
                .unwrap_or_else(|| apply_rename_all(&ident, rename_all.as_deref()));
            Some((column, !is_option_type(&field.ty), get_doc_comment(&field.attrs)))
        })
        .collect();

    let header = columns
        .iter()
        .map(|(column, _, _)| column.as_str())
        .collect::<Vec<_>>()
        .join(",");

    let field_entries = columns.iter().map(|(column, required, desc)| {
        quote! {
            CsvField {
                name: #column,
                required: #required,
                description: #desc,
            }
        }
    });

    let expanded = quote! {
        impl #name {
            pub fn csv_schema() -> &'static [CsvField] {
                static SCHEMA: &[CsvField] = &[
                    #(#field_entries),*
                ];
                SCHEMA
            }

            pub fn csv_header() -> &'static str {
                #header
            }
        }
    };

    TokenStream::from(expanded)
}

/// Finds `key = "value"` inside `#[serde(...)]` attributes.
fn serde_str_arg(attrs: &[Attribute], key: &str) -> Option<String> {
    let mut found = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident(key) {
                let value: LitStr = meta.value()?.parse()?;
                found = Some(value.value());
            } else if meta.input.peek(syn::Token![=]) {
                let _: syn::Expr = meta.value()?.parse()?;
            }
            Ok(())
        });
    }
    found
}

fn apply_rename_all(field: &str, rule: Option<&str>) -> String {
    match rule {
        Some("camelCase") => {
            let mut out = String::with_capacity(field.len());
            for (i, part) in field.split('_').filter(|p| !p.is_empty()).enumerate() {
                if i == 0 {
                    out.push_str(part);
                } else {
                    let mut chars = part.chars();
                    if let Some(first) = chars.next() {
                        out.extend(first.to_uppercase());
                        out.push_str(chars.as_str());
                    }
                }
            }
            out
        }
        Some("kebab-case") => field.replace('_', "-"),
        Some("UPPERCASE") | Some("SCREAMING_SNAKE_CASE") => field.to_uppercase(),
        _ => field.to_string(),
    }
}

fn get_doc_comment(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .filter_map(|attr| {
            if !attr.path().is_ident("doc") {
                return None;
            }
            if let Meta::NameValue(meta) = &attr.meta {
                if let syn::Expr::Lit(expr_lit) = &meta.value {
                    if let Lit::Str(lit_str) = &expr_lit.lit {
                        return Some(lit_str.value().trim().to_string());
                    }
                }
            }
            None
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_option_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "Option";
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_columns() {
        assert_eq!(apply_rename_all("total_income", Some("camelCase")), "totalIncome");
        assert_eq!(apply_rename_all("wht", Some("camelCase")), "wht");
    }

    #[test]
    fn kebab_case_columns() {
        assert_eq!(apply_rename_all("k_receipt", Some("kebab-case")), "k-receipt");
    }

    #[test]
    fn no_rule_keeps_field_name() {
        assert_eq!(apply_rename_all("total_income", None), "total_income");
    }

    #[test]
    fn serde_arg_found_among_other_options() {
        let input: DeriveInput = syn::parse_quote! {
            #[serde(deny_unknown_fields, rename_all = "camelCase")]
            struct Record {
                #[serde(default, rename = "gross")]
                total_income: u64,
            }
        };
        assert_eq!(
            serde_str_arg(&input.attrs, "rename_all").as_deref(),
            Some("camelCase")
        );

        let Data::Struct(data) = &input.data else {
            panic!("expected a struct");
        };
        let field = data.fields.iter().next().unwrap();
        assert_eq!(serde_str_arg(&field.attrs, "rename").as_deref(), Some("gross"));
    }

    #[test]
    fn nested_serde_forms_are_skipped() {
        let input: DeriveInput = syn::parse_quote! {
            #[serde(rename(serialize = "out"))]
            struct Record;
        };
        assert_eq!(serde_str_arg(&input.attrs, "rename"), None);
    }
}
