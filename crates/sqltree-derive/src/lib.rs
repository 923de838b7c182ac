//! Derive macros for SQL table definitions.
//!
//! This crate provides the `#[derive(Table)]` macro, which implements
//! `sqltree_core::schema::Table` for a struct and adds helpers that build
//! relation and column nodes with the right names.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit, Meta};

/// Derives `sqltree_core::schema::Table` for a struct.
///
/// # Attributes
///
/// - `#[table(name = "table_name")]` - Specifies the SQL table name (optional,
///   defaults to snake_case of struct name)
/// - `#[table(schema = "schema_name")]` - Qualifies the table with a schema
///
/// # Field Attributes
///
/// - `#[column(primary_key)]` - Marks the field as primary key
/// - `#[column(name = "column_name")]` - Specifies the SQL column name
///   (optional, defaults to field name)
/// - `#[column(skip)]` - Leaves the field out of the column list
///
/// # Generated Items
///
/// For a struct `User` with fields `id` and `email`:
///
/// - `impl Table for User` with `NAME`, `SCHEMA`, `COLUMNS` and `PRIMARY_KEY`
/// - `User::table()` returning the relation node
/// - `User::id()` and `User::email()` returning qualified column nodes
#[proc_macro_derive(Table, attributes(table, column))]
pub fn derive_table(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_table_impl(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_table_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let table_attrs = parse_table_attrs(&input.attrs)?;
    let table_name = table_attrs
        .name
        .unwrap_or_else(|| to_snake_case(&struct_name.to_string()));

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Table derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Table derive only supports structs",
            ));
        }
    };

    let mut columns: Vec<ColumnInfo> = Vec::new();
    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        let attrs = parse_column_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let bare_name = field_name.unraw().to_string();
        if bare_name == "table" {
            return Err(syn::Error::new_spanned(
                field_name,
                "field `table` clashes with the generated `table()` accessor; \
                 rename the field and keep the column with #[column(name = \"table\")]",
            ));
        }
        columns.push(ColumnInfo {
            field_name: field_name.clone(),
            column_name: attrs.name.unwrap_or(bare_name),
            is_primary_key: attrs.primary_key,
        });
    }

    let primary_keys: Vec<&ColumnInfo> = columns.iter().filter(|c| c.is_primary_key).collect();
    if primary_keys.len() > 1 {
        return Err(syn::Error::new_spanned(
            &primary_keys[1].field_name,
            "only one field can be marked #[column(primary_key)]",
        ));
    }
    let primary_key = match primary_keys.first() {
        Some(pk) => {
            let name = &pk.column_name;
            quote! { Some(#name) }
        }
        None => quote! { None },
    };

    let schema = match &table_attrs.schema {
        Some(schema) => quote! { Some(#schema) },
        None => quote! { None },
    };

    let column_names: Vec<&str> = columns.iter().map(|c| c.column_name.as_str()).collect();

    let accessors: Vec<TokenStream2> = columns
        .iter()
        .map(|info| {
            let method_name = &info.field_name;
            let column_name = &info.column_name;
            quote! {
                /// Returns this column, qualified by the table.
                #[must_use]
                pub fn #method_name() -> ::sqltree_core::ast::Expr {
                    Self::table().col(#column_name)
                }
            }
        })
        .collect();

    Ok(quote! {
        impl ::sqltree_core::schema::Table for #struct_name {
            const NAME: &'static str = #table_name;
            const SCHEMA: Option<&'static str> = #schema;
            const COLUMNS: &'static [&'static str] = &[#(#column_names),*];
            const PRIMARY_KEY: Option<&'static str> = #primary_key;
        }

        impl #struct_name {
            /// Returns the relation node for this table.
            #[must_use]
            pub fn table() -> ::sqltree_core::ast::Table {
                <Self as ::sqltree_core::schema::Table>::relation()
            }

            #(#accessors)*
        }
    })
}

struct ColumnInfo {
    field_name: Ident,
    column_name: String,
    is_primary_key: bool,
}

#[derive(Default)]
struct TableAttrs {
    name: Option<String>,
    schema: Option<String>,
}

#[derive(Default)]
struct ColumnAttrs {
    name: Option<String>,
    primary_key: bool,
    skip: bool,
}

fn string_value(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<String> {
    let value: Expr = meta.value()?.parse()?;
    match value {
        Expr::Lit(syn::ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.value()),
        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
    }
}

fn parse_table_attrs(attrs: &[Attribute]) -> syn::Result<TableAttrs> {
    let mut result = TableAttrs::default();
    for attr in attrs {
        if !attr.path().is_ident("table") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                result.name = Some(string_value(&meta)?);
            } else if meta.path.is_ident("schema") {
                result.schema = Some(string_value(&meta)?);
            } else {
                return Err(meta.error("unsupported table attribute"));
            }
            Ok(())
        })?;
    }
    Ok(result)
}

fn parse_column_attrs(attrs: &[Attribute]) -> syn::Result<ColumnAttrs> {
    let mut result = ColumnAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("column") {
            continue;
        }
        // Handle empty attribute like #[column]
        if matches!(attr.meta, Meta::Path(_)) {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("primary_key") {
                result.primary_key = true;
            } else if meta.path.is_ident("skip") {
                result.skip = true;
            } else if meta.path.is_ident("name") {
                result.name = Some(string_value(&meta)?);
            } else {
                return Err(meta.error("unsupported column attribute"));
            }
            Ok(())
        })?;
    }

    Ok(result)
}

/// `UserAccount` -> `user_account`, `HTTPLog` -> `http_log`.
fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = i > 0 && !chars[i - 1].is_uppercase() && chars[i - 1] != '_';
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let prev_upper = i > 0 && chars[i - 1].is_uppercase();
            if i > 0 && (prev_lower || (prev_upper && next_lower)) {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}
