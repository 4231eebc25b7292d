//! Derive macros for sqlblock
//!
//! Provides `#[derive(Entity)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod common;
mod entity;

/// Derive `sqlblock::Entity` for a struct with named fields.
///
/// # Example
///
/// ```ignore
/// use sqlblock::Entity;
///
/// #[derive(Entity)]
/// #[entity(table = "users")]
/// struct User {
///     id: i64,
///     name: String,
///     #[entity(column = "email_address")]
///     email: Option<String>,
///     #[entity(ignore)]
///     created_at: chrono::NaiveDateTime,
///     #[entity(relation)]
///     roles: Vec<Role>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[entity(table = "name")]` - Table name; defaults to the snake_cased type name
/// - `#[entity(column = "name")]` - Map field to a different column name
/// - `#[entity(ignore)]` - Keep the field out of INSERT / UPDATE / MERGE
/// - `#[entity(skip)]` - Leave the field out of the data map entirely
/// - `#[entity(nested)]` - Field is itself an `Entity`, stored as a nested relation
/// - `#[entity(relation)]` - `Vec` of entities, stored as a to-many relation
///
/// `Option` fields only appear in the data map when `Some`.
#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
