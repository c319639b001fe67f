//! Typed parameter objects for every inbound form of the to-do list app.
//!
//! Each operation module exposes a `Params` struct that can only be
//! constructed from valid input, an `InvalidParams` error describing why a
//! form was rejected, and a `TryFrom<&Form>` conversion used by the server.

pub use form::{Form, FormParseError};

pub mod create_list;
pub mod create_list_item;
pub mod edit_list_item;
pub mod login;
pub mod register;

mod form;

pub(crate) fn missing_field_message(field: &str) -> String {
    format!("missing form field: '{}'", field)
}

pub(crate) fn empty_field_message(field: &str) -> String {
    format!("'{}' can not be empty or whitespace", field)
}
