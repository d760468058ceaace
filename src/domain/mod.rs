//! Search domain parsing for record-oriented RPC backends.
//!
//! Syntax:
//!   ('field','op','value')              - a single term
//!   [term, term, ...]                   - list of units
//!   '&', term, term                     - AND of the next two terms
//!   '|', term, term                     - OR of the next two terms
//!   '!', term                           - NOT of the next term
//!
//! Operators: = != > >= < <= =? =like like "not like" ilike "not ilike"
//! =ilike in "not in" child_of parent_of

mod args;
mod ast;
mod builder;
mod error;
mod lexer;
mod parser;

pub use args::{DomainArg, domain_list, domain_strings};
pub use ast::*;
pub use builder::Filter;
pub use error::{ArgError, SyntaxError};
pub use parser::{parse_domain, validate};
