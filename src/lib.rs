//! Parser and argument builder for Odoo-style search domains.

pub mod domain;

pub use domain::{
    ArgError, CombinatorKind, Comparison, Domain, DomainArg, Filter, FilterNode, Operator,
    SyntaxError, domain_list, domain_strings, parse_domain, validate,
};
