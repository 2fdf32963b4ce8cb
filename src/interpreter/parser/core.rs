use std::iter::Peekable;

use crate::{
    ast::{BinaryOperator, Expr, Literal, UnaryOperator},
    error::ParseError,
    interpreter::{
        lexer::{SourceToken, Token},
        parser::utils::{describe_token, expect, parse_comma_separated, parse_identifier},
    },
};

pub type ParseResult<T> = Result<T, ParseError>;

/// Parses a full expression.
///
/// This is the entry point for expression parsing. It begins at the
/// lowest-precedence level, assignment, and recursively descends through the
/// precedence hierarchy:
///
/// assignment → logical or → logical and → equality → comparison →
/// additive → multiplicative → unary → call/get/index → primary
///
/// # Parameters
/// - `tokens`: Token iterator with lookahead.
///
/// # Returns
/// The parsed expression node.
pub fn parse_expression<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a SourceToken> + Clone
{
    parse_assignment(tokens)
}

/// Parses an assignment expression.
///
/// Assignment is right-associative: `a = b = 1` assigns `1` to both names.
/// The left-hand side must be a variable, a property access, or an index
/// expression; the parser rewrites those into the matching store node.
/// Anything else (such as `f() = 1`) is an invalid assignment target.
fn parse_assignment<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a SourceToken> + Clone
{
    let expr = parse_logical_or(tokens)?;

    if let Some(SourceToken { kind: Token::Equal, .. }) = tokens.peek() {
        let (line, column) = match tokens.next() {
            Some(tok) => (tok.line, tok.column),
            None => return Err(ParseError::UnexpectedEndOfInput { line: 0 }),
        };
        let value = Box::new(parse_assignment(tokens)?);

        return match expr {
            Expr::Variable { name, .. } => Ok(Expr::Assign { name, value, line }),
            Expr::Get { object, name, .. } => Ok(Expr::Set { object,
                                                             name,
                                                             value,
                                                             line }),
            Expr::Index { object, index, .. } => Ok(Expr::IndexSet { object,
                                                                     index,
                                                                     value,
                                                                     line }),
            _ => Err(ParseError::InvalidAssignmentTarget { line, column }),
        };
    }

    Ok(expr)
}

/// Parses left-associative chains of `||` (or `or`).
///
/// Grammar: `logical_or := logical_and ("||" logical_and)*`
fn parse_logical_or<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a SourceToken> + Clone
{
    let mut left = parse_logical_and(tokens)?;
    while let Some(SourceToken { kind: Token::OrOr,
                                 line,
                                 .. }) = tokens.peek()
    {
        let line = *line;
        tokens.next();
        let right = parse_logical_and(tokens)?;
        left = Expr::Binary { left: Box::new(left),
                              op: BinaryOperator::Or,
                              right: Box::new(right),
                              line };
    }
    Ok(left)
}

/// Parses left-associative chains of `&&` (or `and`).
///
/// Grammar: `logical_and := equality ("&&" equality)*`
fn parse_logical_and<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a SourceToken> + Clone
{
    let mut left = parse_equality(tokens)?;
    while let Some(SourceToken { kind: Token::AndAnd,
                                 line,
                                 .. }) = tokens.peek()
    {
        let line = *line;
        tokens.next();
        let right = parse_equality(tokens)?;
        left = Expr::Binary { left: Box::new(left),
                              op: BinaryOperator::And,
                              right: Box::new(right),
                              line };
    }
    Ok(left)
}

/// Parses equality expressions: `==` (or `equals`) and `!=`.
///
/// Grammar: `equality := comparison (("==" | "!=") comparison)*`
fn parse_equality<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a SourceToken> + Clone
{
    let mut left = parse_comparison(tokens)?;
    loop {
        let (op, line) = match tokens.peek() {
            Some(SourceToken { kind: Token::EqualEqual,
                               line,
                               .. }) => (BinaryOperator::Equal, *line),
            Some(SourceToken { kind: Token::BangEqual,
                               line,
                               .. }) => (BinaryOperator::NotEqual, *line),
            _ => break,
        };
        tokens.next();
        let right = parse_comparison(tokens)?;
        left = Expr::Binary { left: Box::new(left),
                              op,
                              right: Box::new(right),
                              line };
    }
    Ok(left)
}

/// Parses relational expressions: `<`, `<=`, `>`, `>=`.
///
/// Grammar: `comparison := additive (("<" | "<=" | ">" | ">=") additive)*`
fn parse_comparison<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a SourceToken> + Clone
{
    let mut left = parse_additive(tokens)?;
    loop {
        let (op, line) = match tokens.peek() {
            Some(SourceToken { kind: Token::Less, line, .. }) => (BinaryOperator::Less, *line),
            Some(SourceToken { kind: Token::LessEqual,
                               line,
                               .. }) => (BinaryOperator::LessEqual, *line),
            Some(SourceToken { kind: Token::Greater,
                               line,
                               .. }) => (BinaryOperator::Greater, *line),
            Some(SourceToken { kind: Token::GreaterEqual,
                               line,
                               .. }) => (BinaryOperator::GreaterEqual, *line),
            _ => break,
        };
        tokens.next();
        let right = parse_additive(tokens)?;
        left = Expr::Binary { left: Box::new(left),
                              op,
                              right: Box::new(right),
                              line };
    }
    Ok(left)
}

/// Parses addition and subtraction expressions.
///
/// Grammar: `additive := multiplicative (("+" | "-") multiplicative)*`
fn parse_additive<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a SourceToken> + Clone
{
    let mut left = parse_multiplicative(tokens)?;
    loop {
        let (op, line) = match tokens.peek() {
            Some(SourceToken { kind: Token::Plus, line, .. }) => (BinaryOperator::Add, *line),
            Some(SourceToken { kind: Token::Minus, line, .. }) => (BinaryOperator::Sub, *line),
            _ => break,
        };
        tokens.next();
        let right = parse_multiplicative(tokens)?;
        left = Expr::Binary { left: Box::new(left),
                              op,
                              right: Box::new(right),
                              line };
    }
    Ok(left)
}

/// Parses multiplication-level expressions: `*`, `/`, `%`.
///
/// Grammar: `multiplicative := unary (("*" | "/" | "%") unary)*`
fn parse_multiplicative<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a SourceToken> + Clone
{
    let mut left = parse_unary(tokens)?;
    loop {
        let (op, line) = match tokens.peek() {
            Some(SourceToken { kind: Token::Star, line, .. }) => (BinaryOperator::Mul, *line),
            Some(SourceToken { kind: Token::Slash, line, .. }) => (BinaryOperator::Div, *line),
            Some(SourceToken { kind: Token::Percent,
                               line,
                               .. }) => (BinaryOperator::Mod, *line),
            _ => break,
        };
        tokens.next();
        let right = parse_unary(tokens)?;
        left = Expr::Binary { left: Box::new(left),
                              op,
                              right: Box::new(right),
                              line };
    }
    Ok(left)
}

/// Parses prefix unary expressions: `!` (or `not`) and `-`.
///
/// Grammar: `unary := ("!" | "-") unary | call`
fn parse_unary<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a SourceToken> + Clone
{
    let (op, line) = match tokens.peek() {
        Some(SourceToken { kind: Token::Bang, line, .. }) => (UnaryOperator::Not, *line),
        Some(SourceToken { kind: Token::Minus, line, .. }) => (UnaryOperator::Negate, *line),
        _ => return parse_call(tokens),
    };
    tokens.next();
    let expr = parse_unary(tokens)?;
    Ok(Expr::Unary { op,
                     expr: Box::new(expr),
                     line })
}

/// Parses a primary expression followed by any number of postfix forms:
/// call argument lists, `.name` property access, and `[index]` access.
///
/// Grammar: `call := primary ("(" args? ")" | "." IDENT | "[" expr "]")*`
fn parse_call<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a SourceToken> + Clone
{
    let mut expr = parse_primary(tokens)?;

    loop {
        match tokens.peek() {
            Some(SourceToken { kind: Token::LParen,
                               line,
                               .. }) => {
                let line = *line;
                tokens.next();
                let args = parse_comma_separated(tokens, parse_expression, &Token::RParen)?;
                expr = Expr::Call { callee: Box::new(expr),
                                    args,
                                    line };
            },
            Some(SourceToken { kind: Token::Dot, line, .. }) => {
                let line = *line;
                tokens.next();
                let name = parse_identifier(tokens, "property name after '.'")?;
                expr = Expr::Get { object: Box::new(expr),
                                   name,
                                   line };
            },
            Some(SourceToken { kind: Token::LBracket,
                               line,
                               .. }) => {
                let line = *line;
                tokens.next();
                let index = parse_expression(tokens)?;
                expect(tokens, &Token::RBracket, "']'")?;
                expr = Expr::Index { object: Box::new(expr),
                                     index: Box::new(index),
                                     line };
            },
            _ => break,
        }
    }

    Ok(expr)
}

/// Parses a primary expression.
///
/// Primaries are literals, `this`, identifiers, parenthesized groups, list
/// and dict literals, and `new` followed by a call expression. The `new`
/// keyword is accepted for readability and has no effect: `new C(7)` parses
/// to the same tree as `C(7)`.
fn parse_primary<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a SourceToken> + Clone
{
    let tok = match tokens.next() {
        Some(tok) => tok,
        None => return Err(ParseError::UnexpectedEndOfInput { line: 0 }),
    };
    let line = tok.line;

    match &tok.kind {
        Token::False => Ok(Expr::Literal { value: Literal::Bool(false),
                                           line }),
        Token::True => Ok(Expr::Literal { value: Literal::Bool(true),
                                          line }),
        Token::Null => Ok(Expr::Literal { value: Literal::Null,
                                          line }),
        Token::Number(n) => Ok(Expr::Literal { value: Literal::Number(*n),
                                               line }),
        Token::Str(s) => Ok(Expr::Literal { value: Literal::Str(s.clone()),
                                            line }),
        Token::This => Ok(Expr::Variable { name: "this".to_string(),
                                           line }),
        Token::Identifier(name) => Ok(Expr::Variable { name: name.clone(),
                                                       line }),
        Token::New => parse_call(tokens),
        Token::LParen => {
            let expr = parse_expression(tokens)?;
            expect(tokens, &Token::RParen, "')'")?;
            Ok(Expr::Grouping { expr: Box::new(expr),
                                line })
        },
        Token::LBracket => {
            let elements = parse_comma_separated(tokens, parse_expression, &Token::RBracket)?;
            Ok(Expr::ListLiteral { elements, line })
        },
        Token::LBrace => parse_dict_literal(tokens, line),
        other => Err(ParseError::ExpectedExpression { found:  describe_token(other),
                                                      line,
                                                      column: tok.column, }),
    }
}

/// Parses the body of a dict literal after its opening `{`.
///
/// Grammar: `dict := "{" (STRING ":" expression ("," STRING ":" expression)*)? "}"`
///
/// Keys must be string literals.
fn parse_dict_literal<'a, I>(tokens: &mut Peekable<I>, line: usize) -> ParseResult<Expr>
    where I: Iterator<Item = &'a SourceToken> + Clone
{
    let entries = parse_comma_separated(tokens,
                                        |tokens| {
                                            let key = match tokens.next() {
                Some(SourceToken { kind: Token::Str(key), .. }) => key.clone(),
                Some(tok) => {
                    return Err(ParseError::ExpectedToken {
                        expected: "string key in dict literal".to_string(),
                        found: describe_token(&tok.kind),
                        line: tok.line,
                        column: tok.column,
                    });
                },
                None => return Err(ParseError::UnexpectedEndOfInput { line: 0 }),
            };
                                            expect(tokens, &Token::Colon, "':'")?;
                                            let value = parse_expression(tokens)?;
                                            Ok((key, value))
                                        },
                                        &Token::RBrace)?;

    Ok(Expr::DictLiteral { entries, line })
}
