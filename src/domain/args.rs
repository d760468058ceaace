//! Conversion between domains and RPC argument values.
//!
//! On the wire a domain is a list of units. A term is `[field, operator,
//! value]`; a combinator is `["&", term, term]`, `["|", term, term]` or
//! `["!", term]`.

use serde_json::Value;

use super::ast::{CombinatorKind, Comparison, Domain, FilterNode, Operator};
use super::error::ArgError;
use super::parser::parse_domain;

impl Domain {
    /// Nested-list argument value for this domain.
    pub fn to_args(&self) -> Value {
        Value::Array(self.iter().map(node_to_value).collect())
    }

    /// Read a domain back from its nested-list form.
    pub fn from_args(value: &Value) -> Result<Domain, ArgError> {
        let Value::Array(items) = value else {
            return Err(ArgError::NotAList(kind_of(value).to_string()));
        };

        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                node_from_value(item).map_err(|reason| ArgError::InvalidNode { index, reason })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Domain::new)
    }
}

fn comparison_to_value(c: &Comparison) -> Value {
    Value::Array(vec![
        Value::String(c.field().to_string()),
        Value::String(c.operator().as_str().to_string()),
        Value::String(c.value().to_string()),
    ])
}

fn node_to_value(node: &FilterNode) -> Value {
    match node {
        FilterNode::Comparison(c) => comparison_to_value(c),
        FilterNode::And(_) | FilterNode::Or(_) | FilterNode::Not(_) => {
            let operands = node.comparisons();
            let mut items = Vec::with_capacity(operands.len() + 1);
            if let Some(kind) = node.kind() {
                items.push(Value::String(kind.marker().to_string()));
            }
            items.extend(operands.iter().map(comparison_to_value));
            Value::Array(items)
        }
    }
}

fn node_from_value(value: &Value) -> Result<FilterNode, String> {
    let Value::Array(items) = value else {
        return Err(format!("expected a list, got {}", kind_of(value)));
    };

    match items.first() {
        Some(Value::String(marker)) if items.len() != 3 || is_marker_list(items) => {
            let kind = CombinatorKind::from_marker(marker)
                .ok_or_else(|| format!("unknown combinator {marker:?}"))?;
            let operands = items[1..]
                .iter()
                .map(comparison_from_value)
                .collect::<Result<Vec<_>, _>>()?;
            FilterNode::combinator(kind, operands).map_err(|operands| {
                format!(
                    "'{kind}' takes {} term(s), got {}",
                    kind.arity(),
                    operands.len()
                )
            })
        }
        _ => comparison_from_value(value).map(FilterNode::Comparison),
    }
}

/// A three-element list is a term unless it is `[marker, [..], [..]]`.
fn is_marker_list(items: &[Value]) -> bool {
    items[1..].iter().all(Value::is_array)
}

fn comparison_from_value(value: &Value) -> Result<Comparison, String> {
    let parts = match value {
        Value::Array(items) if items.len() == 3 => items
            .iter()
            .map(|v| v.as_str().ok_or_else(|| format!("expected string, got {}", kind_of(v))))
            .collect::<Result<Vec<_>, _>>()?,
        other => return Err(format!("expected [field, operator, value], got {other}")),
    };

    let operator: Operator = parts[1].parse()?;
    Comparison::new(parts[0], operator, parts[2]).map_err(|e| e.to_string())
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// A caller-supplied filter in any of its accepted shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainArg {
    /// Already parsed
    Parsed(Domain),
    /// Nested list in argument form, passed through
    Raw(Value),
    /// Domain text to parse
    Text(String),
}

impl From<Domain> for DomainArg {
    fn from(value: Domain) -> Self {
        DomainArg::Parsed(value)
    }
}

impl From<Value> for DomainArg {
    fn from(value: Value) -> Self {
        DomainArg::Raw(value)
    }
}

impl From<&str> for DomainArg {
    fn from(value: &str) -> Self {
        DomainArg::Text(value.to_string())
    }
}

impl From<String> for DomainArg {
    fn from(value: String) -> Self {
        DomainArg::Text(value)
    }
}

/// Normalize filters into the domain argument of a search call.
///
/// Only the first filter is used. No filters, an empty list, or empty text
/// all mean "no filter" and yield `[]`.
pub fn domain_list<I>(filters: I) -> Result<Value, ArgError>
where
    I: IntoIterator,
    I::Item: Into<DomainArg>,
{
    let Some(first) = filters.into_iter().next() else {
        return Ok(Value::Array(Vec::new()));
    };

    match first.into() {
        DomainArg::Parsed(domain) => Ok(domain.to_args()),
        DomainArg::Text(text) => Ok(parse_domain(&text)?.to_args()),
        DomainArg::Raw(value @ Value::Array(_)) => Ok(value),
        DomainArg::Raw(other) => Err(ArgError::NotAList(kind_of(&other).to_string())),
    }
}

/// Normalize a field/attribute name list. No names, or a single empty name,
/// yield an empty list; anything else passes through unchanged.
pub fn domain_strings<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let values: Vec<String> = values.into_iter().map(Into::into).collect();
    match values.as_slice() {
        [only] if only.is_empty() => Vec::new(),
        _ => values,
    }
}
