use std::iter::Peekable;

use crate::{
    error::ParseError,
    interpreter::lexer::{SourceToken, Token},
};

use super::core::ParseResult;

/// Renders a token for use in error messages.
///
/// Literal payloads are shown with their value; everything else uses the
/// variant name.
#[must_use]
pub fn describe_token(token: &Token) -> String {
    match token {
        Token::Number(n) => format!("number {n}"),
        Token::Str(s) => format!("string \"{s}\""),
        Token::Identifier(name) => format!("identifier '{name}'"),
        Token::Eof => "end of input".to_string(),
        other => format!("{other:?}"),
    }
}

/// Consumes the next token, which must match `expected`.
///
/// Returns the position of the consumed token so callers can attach it to
/// AST nodes.
///
/// # Errors
/// Returns [`ParseError::ExpectedToken`] when the next token differs, or
/// [`ParseError::UnexpectedEndOfInput`] when the stream is exhausted.
pub fn expect<'a, I>(tokens: &mut Peekable<I>,
                     expected: &Token,
                     description: &str)
                     -> ParseResult<(usize, usize)>
    where I: Iterator<Item = &'a SourceToken>
{
    match tokens.next() {
        Some(tok) if tok.kind == *expected => Ok((tok.line, tok.column)),
        Some(tok) => Err(ParseError::ExpectedToken { expected: description.to_string(),
                                                     found:    describe_token(&tok.kind),
                                                     line:     tok.line,
                                                     column:   tok.column, }),
        None => Err(ParseError::UnexpectedEndOfInput { line: 0 }),
    }
}

/// Parses a plain identifier and returns its name.
///
/// # Errors
/// Returns a `ParseError` if the next token is not an identifier or the
/// input ends unexpectedly.
pub fn parse_identifier<'a, I>(tokens: &mut Peekable<I>, what: &str) -> ParseResult<String>
    where I: Iterator<Item = &'a SourceToken>
{
    match tokens.next() {
        Some(SourceToken { kind: Token::Identifier(name),
                           .. }) => Ok(name.clone()),
        Some(tok) => Err(ParseError::ExpectedToken { expected: what.to_string(),
                                                     found:    describe_token(&tok.kind),
                                                     line:     tok.line,
                                                     column:   tok.column, }),
        None => Err(ParseError::UnexpectedEndOfInput { line: 0 }),
    }
}

/// Parses a comma-separated list of items until a closing token.
///
/// Shared by call argument lists, parameter lists, and list literals. The
/// closing token is consumed. An immediately encountered closing token
/// produces an empty list.
///
/// Grammar (simplified): `list := (item ("," item)*)? closing`
///
/// # Errors
/// Returns a `ParseError` if an item fails to parse, an unexpected token
/// appears between items, or the stream ends before the closing token.
pub fn parse_comma_separated<'a, I, T>(tokens: &mut Peekable<I>,
                                       parse_item: impl Fn(&mut Peekable<I>) -> ParseResult<T>,
                                       closing: &Token)
                                       -> ParseResult<Vec<T>>
    where I: Iterator<Item = &'a SourceToken> + Clone
{
    let mut items = Vec::new();
    if let Some(tok) = tokens.peek()
       && tok.kind == *closing
    {
        tokens.next();

        return Ok(items);
    }
    loop {
        items.push(parse_item(tokens)?);
        match tokens.peek() {
            Some(SourceToken { kind: Token::Comma, .. }) => {
                tokens.next();
            },
            Some(tok) if tok.kind == *closing => {
                tokens.next();
                break;
            },
            Some(tok) => {
                return Err(ParseError::ExpectedToken { expected:
                                                           format!("',' or {closing:?}"),
                                                       found:    describe_token(&tok.kind),
                                                       line:     tok.line,
                                                       column:   tok.column, });
            },
            None => return Err(ParseError::UnexpectedEndOfInput { line: 0 }),
        }
    }
    Ok(items)
}
