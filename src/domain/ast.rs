//! AST types for search domains.

use std::fmt;
use std::str::FromStr;

use serde::ser::{Serialize, SerializeSeq, Serializer};

use super::error::ArgError;

/// Comparison operator of a domain term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,          // =
    Ne,          // !=
    Gt,          // >
    Ge,          // >=
    Lt,          // <
    Le,          // <=
    EqOrUnset,   // =?
    EqLike,      // =like
    Like,        // like
    NotLike,     // not like
    ILike,       // ilike
    NotILike,    // not ilike
    EqILike,     // =ilike
    In,          // in
    NotIn,       // not in
    ChildOf,     // child_of
    ParentOf,    // parent_of
}

impl Operator {
    pub const ALL: [Operator; 17] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Ge,
        Operator::Lt,
        Operator::Le,
        Operator::EqOrUnset,
        Operator::EqLike,
        Operator::Like,
        Operator::NotLike,
        Operator::ILike,
        Operator::NotILike,
        Operator::EqILike,
        Operator::In,
        Operator::NotIn,
        Operator::ChildOf,
        Operator::ParentOf,
    ];

    /// The operator as written inside a term, e.g. `not ilike`.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::EqOrUnset => "=?",
            Operator::EqLike => "=like",
            Operator::Like => "like",
            Operator::NotLike => "not like",
            Operator::ILike => "ilike",
            Operator::NotILike => "not ilike",
            Operator::EqILike => "=ilike",
            Operator::In => "in",
            Operator::NotIn => "not in",
            Operator::ChildOf => "child_of",
            Operator::ParentOf => "parent_of",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.as_str() == value)
            .ok_or_else(|| format!("unknown operator: {value}"))
    }
}

/// Logical combinator written in prefix position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombinatorKind {
    And, // &
    Or,  // |
    Not, // !
}

impl CombinatorKind {
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "&" => Some(CombinatorKind::And),
            "|" => Some(CombinatorKind::Or),
            "!" => Some(CombinatorKind::Not),
            _ => None,
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            CombinatorKind::And => "&",
            CombinatorKind::Or => "|",
            CombinatorKind::Not => "!",
        }
    }

    /// Number of comparisons the combinator takes.
    pub fn arity(self) -> usize {
        match self {
            CombinatorKind::And | CombinatorKind::Or => 2,
            CombinatorKind::Not => 1,
        }
    }
}

impl fmt::Display for CombinatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// Leaf filter condition: `('field','operator','value')`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Comparison {
    field: String,
    operator: Operator,
    value: String,
}

impl Comparison {
    /// Build a comparison, checking that field and value are expressible in
    /// domain text. The value is trimmed like a parsed one.
    pub fn new(
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<String>,
    ) -> Result<Self, ArgError> {
        let field = field.into();
        let value = value.into();
        if !is_field(&field) {
            return Err(ArgError::InvalidTerm(format!(
                "field must be non-empty word characters, got {field:?}"
            )));
        }
        if !is_value(&value) {
            return Err(ArgError::InvalidTerm(format!(
                "value must be word characters and spaces, got {value:?}"
            )));
        }
        Ok(Self::from_parts(field, operator, value.trim().to_string()))
    }

    /// Caller guarantees field and value already satisfy the grammar.
    pub(crate) fn from_parts(field: String, operator: Operator, value: String) -> Self {
        Comparison {
            field,
            operator,
            value,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "('{}','{}','{}')", self.field, self.operator, self.value)
    }
}

impl Serialize for Comparison {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(3))?;
        seq.serialize_element(&self.field)?;
        seq.serialize_element(self.operator.as_str())?;
        seq.serialize_element(&self.value)?;
        seq.end()
    }
}

/// One unit of a domain. Combinator arity is fixed by the variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterNode {
    /// Standalone term
    Comparison(Comparison),

    /// `'&', term, term`
    And([Comparison; 2]),

    /// `'|', term, term`
    Or([Comparison; 2]),

    /// `'!', term`
    Not(Comparison),
}

impl FilterNode {
    pub fn and(left: Comparison, right: Comparison) -> Self {
        FilterNode::And([left, right])
    }

    pub fn or(left: Comparison, right: Comparison) -> Self {
        FilterNode::Or([left, right])
    }

    pub fn not(inner: Comparison) -> Self {
        FilterNode::Not(inner)
    }

    /// Build a combinator from operands collected at runtime. Returns the
    /// operands back when their count does not match `kind.arity()`.
    pub fn combinator(
        kind: CombinatorKind,
        operands: Vec<Comparison>,
    ) -> Result<Self, Vec<Comparison>> {
        match kind {
            CombinatorKind::And => <[Comparison; 2]>::try_from(operands).map(FilterNode::And),
            CombinatorKind::Or => <[Comparison; 2]>::try_from(operands).map(FilterNode::Or),
            CombinatorKind::Not => <[Comparison; 1]>::try_from(operands)
                .map(|[inner]| FilterNode::Not(inner)),
        }
    }

    /// `None` for a standalone comparison.
    pub fn kind(&self) -> Option<CombinatorKind> {
        match self {
            FilterNode::Comparison(_) => None,
            FilterNode::And(_) => Some(CombinatorKind::And),
            FilterNode::Or(_) => Some(CombinatorKind::Or),
            FilterNode::Not(_) => Some(CombinatorKind::Not),
        }
    }

    /// Every comparison in the node, operands in order.
    pub fn comparisons(&self) -> &[Comparison] {
        match self {
            FilterNode::Comparison(c) | FilterNode::Not(c) => std::slice::from_ref(c),
            FilterNode::And(operands) | FilterNode::Or(operands) => operands,
        }
    }
}

impl From<Comparison> for FilterNode {
    fn from(value: Comparison) -> Self {
        FilterNode::Comparison(value)
    }
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            FilterNode::Comparison(c) => return write!(f, "{c}"),
            FilterNode::And(_) => CombinatorKind::And,
            FilterNode::Or(_) => CombinatorKind::Or,
            FilterNode::Not(_) => CombinatorKind::Not,
        };
        write!(f, "'{kind}'")?;
        for operand in self.comparisons() {
            write!(f, ",{operand}")?;
        }
        Ok(())
    }
}

impl Serialize for FilterNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kind = match self {
            FilterNode::Comparison(c) => return c.serialize(serializer),
            FilterNode::And(_) => CombinatorKind::And,
            FilterNode::Or(_) => CombinatorKind::Or,
            FilterNode::Not(_) => CombinatorKind::Not,
        };
        let operands = self.comparisons();
        let mut seq = serializer.serialize_seq(Some(operands.len() + 1))?;
        seq.serialize_element(kind.marker())?;
        for operand in operands {
            seq.serialize_element(operand)?;
        }
        seq.end()
    }
}

/// Parsed search domain: units in textual order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Domain(Vec<FilterNode>);

impl Domain {
    pub fn new(nodes: Vec<FilterNode>) -> Self {
        Domain(nodes)
    }

    pub fn nodes(&self) -> &[FilterNode] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FilterNode> {
        self.0.iter()
    }

    pub fn into_nodes(self) -> Vec<FilterNode> {
        self.0
    }
}

impl From<Vec<FilterNode>> for Domain {
    fn from(value: Vec<FilterNode>) -> Self {
        Domain(value)
    }
}

impl IntoIterator for Domain {
    type Item = FilterNode;
    type IntoIter = std::vec::IntoIter<FilterNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Domain {
    type Item = &'a FilterNode;
    type IntoIter = std::slice::Iter<'a, FilterNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Canonical text form. An empty domain renders as the empty string, which
/// parses back to an empty domain.
impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        f.write_str("[")?;
        for (i, node) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{node}")?;
        }
        f.write_str("]")
    }
}

impl Serialize for Domain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for node in &self.0 {
            seq.serialize_element(node)?;
        }
        seq.end()
    }
}

/// `\w` as the domain grammar uses it: ASCII letters, digits, underscore.
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub(crate) fn is_field(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_word_char)
}

/// Word characters and ASCII whitespace, with at least one word character so
/// the trimmed value is never empty.
pub(crate) fn is_value(s: &str) -> bool {
    s.chars().any(is_word_char) && s.chars().all(|c| is_word_char(c) || c.is_ascii_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_eq(value: &str) -> Comparison {
        Comparison::new("name", Operator::Eq, value).unwrap()
    }

    #[test]
    fn test_operator_round_trips_through_text() {
        for op in Operator::ALL {
            assert_eq!(op.as_str().parse::<Operator>(), Ok(op));
        }
        assert!("".parse::<Operator>().is_err());
        assert!("==".parse::<Operator>().is_err());
    }

    #[test]
    fn test_combinator_markers() {
        assert_eq!(CombinatorKind::from_marker("&"), Some(CombinatorKind::And));
        assert_eq!(CombinatorKind::from_marker("|"), Some(CombinatorKind::Or));
        assert_eq!(CombinatorKind::from_marker("!"), Some(CombinatorKind::Not));
        assert_eq!(CombinatorKind::from_marker("^"), None);
        assert_eq!(CombinatorKind::Not.arity(), 1);
        assert_eq!(CombinatorKind::Or.arity(), 2);
    }

    #[test]
    fn test_comparison_rejects_punctuation() {
        assert!(Comparison::new("", Operator::Eq, "x").is_err());
        assert!(Comparison::new("partner.name", Operator::Eq, "x").is_err());
        assert!(Comparison::new("name", Operator::Eq, "O'Brien").is_err());
        assert!(Comparison::new("name", Operator::Eq, "").is_err());
        assert!(Comparison::new("name", Operator::Eq, "   ").is_err());
    }

    #[test]
    fn test_comparison_trims_value() {
        assert_eq!(name_eq("  My Name ").value(), "My Name");
    }

    #[test]
    fn test_display() {
        let domain = Domain::new(vec![
            name_eq("A").into(),
            FilterNode::or(name_eq("B"), name_eq("C")),
            FilterNode::not(name_eq("D")),
        ]);
        assert_eq!(
            domain.to_string(),
            "[('name','=','A'),'|',('name','=','B'),('name','=','C'),'!',('name','=','D')]"
        );
        assert_eq!(Domain::default().to_string(), "");
    }

    #[test]
    fn test_comparisons_of_node() {
        let node = FilterNode::and(name_eq("A"), name_eq("B"));
        let values: Vec<_> = node.comparisons().iter().map(|c| c.value()).collect();
        assert_eq!(values, ["A", "B"]);
        assert_eq!(node.kind(), Some(CombinatorKind::And));
        assert_eq!(FilterNode::from(name_eq("A")).kind(), None);
    }

    #[test]
    fn test_combinator_checks_arity() {
        let built = FilterNode::combinator(CombinatorKind::Or, vec![name_eq("A"), name_eq("B")]);
        assert_eq!(built, Ok(FilterNode::or(name_eq("A"), name_eq("B"))));

        let rejected = FilterNode::combinator(CombinatorKind::Not, vec![name_eq("A"), name_eq("B")]);
        assert_eq!(rejected, Err(vec![name_eq("A"), name_eq("B")]));
        assert!(FilterNode::combinator(CombinatorKind::And, vec![name_eq("A")]).is_err());
    }
}
