//! Lexer/tokenizer for domain text.

use winnow::combinator::{alt, delimited};
use winnow::prelude::*;
use winnow::token::take_while;

use super::error::SyntaxError;

/// Token types for domain text.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Punctuation
    LBracket, // [
    RBracket, // ]
    LParen,   // (
    RParen,   // )
    Comma,    // ,

    /// Single-quoted literal, quotes stripped. Field names, operators, values
    /// and combinator markers are all quoted.
    Quoted(String),

    // End of input
    Eof,
}

/// Half-open byte range of a token in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

// Manually define PResult for resilience against winnow version changes
type PResult<T> = Result<T, winnow::error::ErrMode<winnow::error::ContextError>>;

/// Skip `\s*`: ASCII space, tab, newline, form feed, carriage return.
fn skip_space(input: &mut &str) -> PResult<()> {
    take_while(0.., |c: char| c.is_ascii_whitespace())
        .void()
        .parse_next(input)
}

/// Lex a quoted literal. There is no escaping: the literal ends at the next
/// single quote.
fn lex_quoted(input: &mut &str) -> PResult<Token> {
    delimited('\'', take_while(0.., |c: char| c != '\''), '\'')
        .map(|s: &str| Token::Quoted(s.to_string()))
        .parse_next(input)
}

/// Lex a single token.
fn lex_token(input: &mut &str) -> PResult<Token> {
    alt((
        "[".value(Token::LBracket),
        "]".value(Token::RBracket),
        "(".value(Token::LParen),
        ")".value(Token::RParen),
        ",".value(Token::Comma),
        lex_quoted,
    ))
    .parse_next(input)
}

/// Tokenize the entire input. The result always ends with `Token::Eof`.
pub fn tokenize(input: &str) -> Result<Vec<(Token, Span)>, SyntaxError> {
    let mut remaining = input;
    let mut tokens = Vec::new();
    let offset = |rest: &str| input.len() - rest.len();

    loop {
        skip_space(&mut remaining)
            .map_err(|_| {
                let at = offset(remaining);
                SyntaxError::new(at, at, "invalid whitespace")
            })?;
        let start = offset(remaining);
        if remaining.is_empty() {
            tokens.push((Token::Eof, Span { start, end: start }));
            break;
        }

        let before = remaining;
        match lex_token(&mut remaining) {
            Ok(tok) => {
                let end = offset(remaining);
                tokens.push((tok, Span { start, end }));
            }
            Err(_) => {
                let (end, message) = match before.chars().next() {
                    Some('\'') => (input.len(), "unterminated quoted literal".to_string()),
                    Some(c) => (start + c.len_utf8(), format!("unexpected character {c:?}")),
                    None => (start, "unexpected end of input".to_string()),
                };
                return Err(SyntaxError::new(start, end, message));
            }
        }
    }

    tracing::trace!(count = tokens.len(), "tokenized domain text");
    Ok(tokens)
}
