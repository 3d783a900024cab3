//! Parser for the minimal Prolog surface syntax.
//!
//! Produces [`Term`](crate::logic::Term)s and
//! [`Clause`](crate::logic::Clause)s from text; the resolver never sees
//! source text. Operator forms (`X is E`, `A = B`, arithmetic) construct
//! ordinary compounds interpreted by the built-in library.

mod grammar;

pub use grammar::{parse_program, parse_query};

use thiserror::Error;

/// A parse failure: byte offset into the input plus a message.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("parse error at offset {offset}: {message}")]
pub struct ParseError {
    pub offset: usize,
    pub message: String,
}
