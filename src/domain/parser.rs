//! Parser for domain text.
//!
//! Grammar (in rough EBNF):
//!
//! domain   = "" | term | "[" unit ("," unit)* "]"
//! unit     = term | binary | unary
//! binary   = ("'&'" | "'|'") "," term "," term
//! unary    = "'!'" "," term
//! term     = "(" FIELD "," OPERATOR "," VALUE ")"
//! FIELD    = "'" \w+ "'"
//! OPERATOR = "'" ( "=" | "!=" | ... | "parent_of" ) "'"
//! VALUE    = "'" (\w | \s)+ "'"
//!
//! Whitespace is allowed between tokens. Combinator operands must be terms;
//! a combinator cannot wrap another combinator.

use super::ast::{CombinatorKind, Comparison, Domain, FilterNode, Operator, is_field, is_value};
use super::error::SyntaxError;
use super::lexer::{Span, Token, tokenize};

/// Parser state.
struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<(Token, Span)>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).map_or(&Token::Eof, |(tok, _)| tok)
    }

    /// Span of the token at `index`, or of `Eof` past the end.
    fn span_at(&self, index: usize) -> Span {
        self.tokens
            .get(index)
            .or_else(|| self.tokens.last())
            .map_or(Span { start: 0, end: 0 }, |(_, span)| *span)
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        self.pos += 1;
        tok
    }

    /// Error pointing at the current token.
    fn error(&self, message: impl Into<String>) -> SyntaxError {
        let span = self.span_at(self.pos);
        SyntaxError::new(span.start, span.end, message)
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<(), SyntaxError> {
        if *self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("expected {what}, got {}", describe(self.peek()))))
        }
    }

    /// Parse the top-level domain: a lone term or a bracketed unit list.
    fn parse_domain(&mut self) -> Result<Vec<FilterNode>, SyntaxError> {
        let nodes = match self.peek() {
            Token::LParen => vec![FilterNode::Comparison(self.parse_term()?)],
            Token::LBracket => self.parse_list()?,
            other => {
                return Err(self.error(format!("expected '(' or '[', got {}", describe(other))));
            }
        };

        // Ensure we consumed all tokens
        if !matches!(self.peek(), Token::Eof) {
            return Err(self.error(format!(
                "unexpected {} after domain",
                describe(self.peek())
            )));
        }
        Ok(nodes)
    }

    /// Parse list: "[" unit ("," unit)* "]"
    fn parse_list(&mut self) -> Result<Vec<FilterNode>, SyntaxError> {
        self.expect(Token::LBracket, "'['")?;
        let mut nodes = vec![self.parse_unit()?];

        loop {
            match self.peek() {
                Token::Comma => {
                    self.advance();
                    nodes.push(self.parse_unit()?);
                }
                Token::RBracket => {
                    self.advance();
                    return Ok(nodes);
                }
                other => {
                    return Err(self.error(format!("expected ',' or ']', got {}", describe(other))));
                }
            }
        }
    }

    /// Parse unit: a term, or a combinator marker followed by its operands.
    fn parse_unit(&mut self) -> Result<FilterNode, SyntaxError> {
        match self.peek().clone() {
            Token::LParen => Ok(FilterNode::Comparison(self.parse_term()?)),
            Token::Quoted(marker) => {
                let kind = CombinatorKind::from_marker(&marker).ok_or_else(|| {
                    self.error(format!("unknown combinator '{marker}', expected '&', '|' or '!'"))
                })?;
                self.advance(); // consume marker

                let mut operands = Vec::with_capacity(kind.arity());
                for _ in 0..kind.arity() {
                    self.expect(Token::Comma, "','")?;
                    if !matches!(self.peek(), Token::LParen) {
                        return Err(self.error(format!(
                            "'{kind}' must be followed by {} term(s), got {}",
                            kind.arity(),
                            describe(self.peek())
                        )));
                    }
                    operands.push(self.parse_term()?);
                }
                FilterNode::combinator(kind, operands)
                    .map_err(|_| self.error(format!("wrong operand count for '{kind}'")))
            }
            other => Err(self.error(format!(
                "expected term or combinator, got {}",
                describe(&other)
            ))),
        }
    }

    /// Parse term: "(" FIELD "," OPERATOR "," VALUE ")"
    fn parse_term(&mut self) -> Result<Comparison, SyntaxError> {
        self.expect(Token::LParen, "'('")?;

        let field = self.parse_quoted("field")?;
        if !is_field(&field) {
            return Err(self.previous_error(format!(
                "field must be non-empty word characters, got '{field}'"
            )));
        }
        self.expect(Token::Comma, "','")?;

        let op = self.parse_quoted("operator")?;
        let operator: Operator = op
            .parse()
            .map_err(|e: String| self.previous_error(e))?;
        self.expect(Token::Comma, "','")?;

        let value = self.parse_quoted("value")?;
        if !is_value(&value) {
            return Err(self.previous_error(format!(
                "value must be word characters and spaces, got '{value}'"
            )));
        }
        self.expect(Token::RParen, "')'")?;

        Ok(Comparison::from_parts(
            field,
            operator,
            value.trim().to_string(),
        ))
    }

    fn parse_quoted(&mut self, what: &str) -> Result<String, SyntaxError> {
        if let Token::Quoted(s) = self.peek().clone() {
            self.advance();
            Ok(s)
        } else {
            Err(self.error(format!(
                "expected quoted {what}, got {}",
                describe(self.peek())
            )))
        }
    }

    /// Error pointing at the token just consumed.
    fn previous_error(&self, message: impl Into<String>) -> SyntaxError {
        let span = self.span_at(self.pos.saturating_sub(1));
        SyntaxError::new(span.start, span.end, message)
    }
}

fn describe(tok: &Token) -> String {
    match tok {
        Token::LBracket => "'['".into(),
        Token::RBracket => "']'".into(),
        Token::LParen => "'('".into(),
        Token::RParen => "')'".into(),
        Token::Comma => "','".into(),
        Token::Quoted(s) => format!("quoted '{s}'"),
        Token::Eof => "end of input".into(),
    }
}

/// Parse domain text into a [`Domain`].
///
/// The empty string is the empty domain. Anything that does not match the
/// grammar yields a [`SyntaxError`] and no partial result.
///
/// Values are trimmed of surrounding whitespace, so a value made only of
/// whitespace, such as `('name','=','   ')`, is rejected rather than decoded
/// to an empty string that could not be written back as domain text.
pub fn parse_domain(input: &str) -> Result<Domain, SyntaxError> {
    if input.is_empty() {
        return Ok(Domain::default());
    }

    let tokens = tokenize(input)?;
    let mut parser = Parser::new(tokens);
    let nodes = parser.parse_domain()?;

    tracing::debug!(nodes = nodes.len(), "parsed domain");
    Ok(Domain::new(nodes))
}

/// Whether `input` is a legal domain.
pub fn validate(input: &str) -> bool {
    parse_domain(input).is_ok()
}

impl std::str::FromStr for Domain {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_domain(s)
    }
}
