//! Fluent construction of domains in code.

use serde_json::Value;

use super::ast::{Comparison, Domain, FilterNode, Operator};
use super::error::ArgError;

/// Builds a [`Domain`] unit by unit.
///
/// ```
/// use odoo_domain::{ArgError, Comparison, Filter, Operator};
///
/// fn main() -> Result<(), ArgError> {
///     let mut filter = Filter::new();
///     filter
///         .add_term("active", Operator::Eq, "True")?
///         .or(
///             Comparison::new("name", Operator::ILike, "acme")?,
///             Comparison::new("ref", Operator::ILike, "acme")?,
///         );
///
///     assert_eq!(
///         filter.into_domain().to_string(),
///         "[('active','=','True'),'|',('name','ilike','acme'),('ref','ilike','acme')]"
///     );
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    nodes: Vec<FilterNode>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_term(
        &mut self,
        field: &str,
        operator: Operator,
        value: &str,
    ) -> Result<&mut Self, ArgError> {
        let term = Comparison::new(field, operator, value)?;
        Ok(self.add(term))
    }

    pub fn add(&mut self, term: Comparison) -> &mut Self {
        self.nodes.push(FilterNode::Comparison(term));
        self
    }

    pub fn and(&mut self, left: Comparison, right: Comparison) -> &mut Self {
        self.nodes.push(FilterNode::and(left, right));
        self
    }

    pub fn or(&mut self, left: Comparison, right: Comparison) -> &mut Self {
        self.nodes.push(FilterNode::or(left, right));
        self
    }

    pub fn not(&mut self, term: Comparison) -> &mut Self {
        self.nodes.push(FilterNode::not(term));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Argument value, same shape as [`Domain::to_args`].
    pub fn to_list(&self) -> Value {
        Domain::new(self.nodes.clone()).to_args()
    }

    pub fn into_domain(self) -> Domain {
        Domain::new(self.nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parse_domain;
    use serde_json::json;

    fn term(field: &str, value: &str) -> Comparison {
        Comparison::new(field, Operator::Eq, value).unwrap()
    }

    #[test]
    fn test_builder_matches_parsed_text() {
        let mut filter = Filter::new();
        filter
            .add_term("name", Operator::Eq, "My Name")
            .unwrap()
            .and(term("a", "1"), term("b", "2"))
            .not(term("c", "3"));

        let parsed = parse_domain(
            "[('name','=','My Name'),'&',('a','=','1'),('b','=','2'),'!',('c','=','3')]",
        )
        .unwrap();
        assert_eq!(filter.into_domain(), parsed);
    }

    #[test]
    fn test_to_list() {
        let mut filter = Filter::new();
        filter.or(term("a", "1"), term("b", "2"));
        assert_eq!(
            filter.to_list(),
            json!([["|", ["a", "=", "1"], ["b", "=", "2"]]])
        );
    }

    #[test]
    fn test_add_term_rejects_invalid_field() {
        let mut filter = Filter::new();
        assert!(filter.add_term("partner_id.name", Operator::Eq, "x").is_err());
        assert!(filter.is_empty());
    }
}
