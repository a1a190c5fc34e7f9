//! Token system for SADL
//!
//! [`Token`] values are produced one at a time by the scanner and consumed by the
//! parser through a [`TokenStream`], which hides block comments and lets the
//! parser push back the last couple of tokens it consumed.
//!
//! Newlines and line comments are significant: newlines terminate statements and
//! line comments become documentation attached to the next definition.

pub mod token;
pub mod token_stream;

pub use token::{Token, TokenClass, TokenKind};
pub use token_stream::TokenStream;
