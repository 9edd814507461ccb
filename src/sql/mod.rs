//! SQL text utilities
//!
//! Identifier/literal quoting and the form-driven statement builders.

pub mod ddl;

pub use ddl::{
    build_create_table, build_create_view, is_valid_identifier, normalize_ddl, qualified,
    quote_ident, quote_literal, ColumnSpec,
};
