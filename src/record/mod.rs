//! Row-level handling of incoming CSV records
//!
//! - [`parser`] - splits a raw line into positional fields
//! - [`validator`] - per-field validation rules
//! - [`row`] - turns one parsed row into a [`User`](crate::models::User) plus its issues

pub mod parser;
pub mod row;
pub mod validator;

pub use parser::parse_record;
pub use row::{RowResult, process_row};
