use std::{iter::Peekable, rc::Rc};

use crate::{
    ast::{Expr, FunctionDecl, Literal, Stmt},
    error::ParseError,
    interpreter::{
        lexer::{SourceToken, Token},
        parser::{
            core::{ParseResult, parse_expression},
            utils::{describe_token, expect, parse_comma_separated, parse_identifier},
        },
    },
};

/// Parses a whole program: a sequence of declarations ending at the
/// end-of-file token.
///
/// # Parameters
/// - `tokens`: Token iterator with lookahead.
///
/// # Returns
/// The statements of the program in source order.
pub fn parse_program<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Vec<Stmt>>
    where I: Iterator<Item = &'a SourceToken> + Clone
{
    let mut statements = Vec::new();
    while let Some(tok) = tokens.peek() {
        if tok.kind == Token::Eof {
            break;
        }
        statements.push(parse_declaration(tokens)?);
    }
    Ok(statements)
}

/// Parses a declaration or, failing that, a statement.
///
/// Declarations are `let`, `func`, `class`, `struct`, `union`, and `import`.
/// Everything else falls through to [`parse_statement`].
pub fn parse_declaration<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Stmt>
    where I: Iterator<Item = &'a SourceToken> + Clone
{
    let tok = match tokens.peek() {
        Some(tok) => tok,
        None => return Err(ParseError::UnexpectedEndOfInput { line: 0 }),
    };
    let line = tok.line;

    match tok.kind {
        Token::Let => {
            tokens.next();
            parse_let(tokens, line)
        },
        Token::Func => {
            tokens.next();
            let name = parse_identifier(tokens, "function name")?;
            Ok(Stmt::Function(Rc::new(parse_function_body(tokens, name, line)?)))
        },
        Token::Class => {
            tokens.next();
            parse_class(tokens, line)
        },
        Token::Struct => {
            tokens.next();
            parse_fieldish(tokens, line, false)
        },
        Token::Union => {
            tokens.next();
            parse_fieldish(tokens, line, true)
        },
        Token::Import => {
            tokens.next();
            parse_import(tokens, line)
        },
        _ => parse_statement(tokens),
    }
}

/// Parses the remainder of a `let` declaration.
///
/// Supported forms:
///
/// - `let a;` and `let a = expr;`
/// - `let a, b, c;` — every name defined as `null`
/// - `let a, b, c = expr;` — positional unpacking of a list at runtime
fn parse_let<'a, I>(tokens: &mut Peekable<I>, line: usize) -> ParseResult<Stmt>
    where I: Iterator<Item = &'a SourceToken> + Clone
{
    let mut names = vec![parse_identifier(tokens, "variable name")?];
    while let Some(SourceToken { kind: Token::Comma, .. }) = tokens.peek() {
        tokens.next();
        names.push(parse_identifier(tokens, "variable name")?);
    }

    if let Some(SourceToken { kind: Token::Equal, .. }) = tokens.peek() {
        tokens.next();
        let value = parse_expression(tokens)?;
        expect(tokens, &Token::Semicolon, "';'")?;

        if names.len() == 1 {
            let name = names.remove(0);
            return Ok(Stmt::Let { name,
                                  initializer: value,
                                  line });
        }
        return Ok(Stmt::MultiAssign { names, value, line });
    }

    expect(tokens, &Token::Semicolon, "';'")?;
    if names.len() == 1 {
        let name = names.remove(0);
        return Ok(Stmt::Let { name,
                              initializer: Expr::Literal { value: Literal::Null,
                                                           line },
                              line });
    }
    Ok(Stmt::MultiLet { names, line })
}

/// Parses a parameter list and body block into a [`FunctionDecl`].
///
/// The function or method name has already been consumed by the caller.
fn parse_function_body<'a, I>(tokens: &mut Peekable<I>,
                              name: String,
                              line: usize)
                              -> ParseResult<FunctionDecl>
    where I: Iterator<Item = &'a SourceToken> + Clone
{
    expect(tokens, &Token::LParen, "'('")?;
    let params = parse_comma_separated(tokens,
                                       |tokens| parse_identifier(tokens, "parameter name"),
                                       &Token::RParen)?;
    let body = parse_block_statements(tokens)?;
    Ok(FunctionDecl { name,
                      params,
                      body,
                      line })
}

/// Parses a class declaration: a name followed by a braced list of `func`
/// methods.
fn parse_class<'a, I>(tokens: &mut Peekable<I>, line: usize) -> ParseResult<Stmt>
    where I: Iterator<Item = &'a SourceToken> + Clone
{
    let name = parse_identifier(tokens, "class name")?;
    expect(tokens, &Token::LBrace, "'{'")?;

    let mut methods = Vec::new();
    loop {
        match tokens.peek() {
            Some(SourceToken { kind: Token::RBrace, .. }) => {
                tokens.next();
                break;
            },
            Some(SourceToken { kind: Token::Func,
                               line: method_line,
                               .. }) => {
                let method_line = *method_line;
                tokens.next();
                let method_name = parse_identifier(tokens, "method name")?;
                methods.push(Rc::new(parse_function_body(tokens, method_name, method_line)?));
            },
            Some(tok) => {
                return Err(ParseError::ExpectedToken { expected: "method or '}'".to_string(),
                                                       found:    describe_token(&tok.kind),
                                                       line:     tok.line,
                                                       column:   tok.column, });
            },
            None => return Err(ParseError::UnexpectedEndOfInput { line }),
        }
    }

    Ok(Stmt::Class { name, methods, line })
}

/// Parses a `struct` or `union` declaration.
///
/// Both share the grammar `name '{' (IDENT ';')* '}'`; only the recorded
/// meaning of the identifiers differs (fields vs. tags).
fn parse_fieldish<'a, I>(tokens: &mut Peekable<I>,
                         line: usize,
                         is_union: bool)
                         -> ParseResult<Stmt>
    where I: Iterator<Item = &'a SourceToken> + Clone
{
    let what = if is_union { "tag name" } else { "field name" };
    let name = parse_identifier(tokens, if is_union { "union name" } else { "struct name" })?;
    expect(tokens, &Token::LBrace, "'{'")?;

    let mut entries = Vec::new();
    loop {
        match tokens.peek() {
            Some(SourceToken { kind: Token::RBrace, .. }) => {
                tokens.next();
                break;
            },
            Some(_) => {
                entries.push(parse_identifier(tokens, what)?);
                expect(tokens, &Token::Semicolon, "';'")?;
            },
            None => return Err(ParseError::UnexpectedEndOfInput { line }),
        }
    }

    if is_union {
        Ok(Stmt::Union { name,
                         tags: entries,
                         line })
    } else {
        Ok(Stmt::Struct { name,
                          fields: entries,
                          line })
    }
}

/// Parses an `import "path";` statement.
fn parse_import<'a, I>(tokens: &mut Peekable<I>, line: usize) -> ParseResult<Stmt>
    where I: Iterator<Item = &'a SourceToken> + Clone
{
    let path = match tokens.next() {
        Some(SourceToken { kind: Token::Str(path), .. }) => path.clone(),
        Some(tok) => {
            return Err(ParseError::ExpectedToken { expected:
                                                       "string path after import".to_string(),
                                                   found:    describe_token(&tok.kind),
                                                   line:     tok.line,
                                                   column:   tok.column, });
        },
        None => return Err(ParseError::UnexpectedEndOfInput { line }),
    };
    expect(tokens, &Token::Semicolon, "';'")?;
    Ok(Stmt::Import { path, line })
}

/// Parses a statement.
///
/// A statement may be `if`, `while`, `for`, a braced block, `return`, the
/// bare multi-assign `a, b = expr;`, or an expression statement. Multi-assign
/// is recognized with lookahead: the parser saves its position, commits once
/// it sees `IDENT ,`, and rewinds otherwise.
pub fn parse_statement<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Stmt>
    where I: Iterator<Item = &'a SourceToken> + Clone
{
    let tok = match tokens.peek() {
        Some(tok) => tok,
        None => return Err(ParseError::UnexpectedEndOfInput { line: 0 }),
    };
    let line = tok.line;

    match tok.kind {
        Token::If => {
            tokens.next();
            parse_if(tokens, line)
        },
        Token::While => {
            tokens.next();
            parse_while(tokens, line)
        },
        Token::For => {
            tokens.next();
            parse_for(tokens, line)
        },
        Token::LBrace => {
            let statements = parse_block_statements(tokens)?;
            Ok(Stmt::Block { statements, line })
        },
        Token::Return => {
            tokens.next();
            let value = match tokens.peek() {
                Some(SourceToken { kind: Token::Semicolon, .. }) => None,
                _ => Some(parse_expression(tokens)?),
            };
            expect(tokens, &Token::Semicolon, "';'")?;
            Ok(Stmt::Return { value, line })
        },
        Token::Identifier(_) => {
            if let Some(stmt) = parse_multi_assign(tokens, line)? {
                return Ok(stmt);
            }
            parse_expression_statement(tokens, line)
        },
        _ => parse_expression_statement(tokens, line),
    }
}

/// Attempts to parse the bare multi-assign form `a, b, c = expr;`.
///
/// The token stream is cloned before the attempt; if the second token is not
/// a comma the clone is restored and `Ok(None)` is returned so the caller
/// can parse an ordinary expression statement instead. Once a comma has been
/// seen the form is committed and any further mismatch is a hard error.
fn parse_multi_assign<'a, I>(tokens: &mut Peekable<I>, line: usize) -> ParseResult<Option<Stmt>>
    where I: Iterator<Item = &'a SourceToken> + Clone
{
    let saved = tokens.clone();

    let first = parse_identifier(tokens, "identifier")?;
    if !matches!(tokens.peek(), Some(SourceToken { kind: Token::Comma, .. })) {
        *tokens = saved;
        return Ok(None);
    }

    let mut names = vec![first];
    while let Some(SourceToken { kind: Token::Comma, .. }) = tokens.peek() {
        tokens.next();
        names.push(parse_identifier(tokens, "identifier in multi-assign")?);
    }
    expect(tokens, &Token::Equal, "'=' in multi-assign")?;
    let value = parse_expression(tokens)?;
    expect(tokens, &Token::Semicolon, "';'")?;

    Ok(Some(Stmt::MultiAssign { names, value, line }))
}

/// Parses an expression statement terminated by `;`.
fn parse_expression_statement<'a, I>(tokens: &mut Peekable<I>, line: usize) -> ParseResult<Stmt>
    where I: Iterator<Item = &'a SourceToken> + Clone
{
    let expr = parse_expression(tokens)?;
    expect(tokens, &Token::Semicolon, "';'")?;
    Ok(Stmt::Expression { expr, line })
}

/// Parses a braced block and returns its statements.
///
/// The opening `{` has not been consumed yet.
fn parse_block_statements<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Vec<Stmt>>
    where I: Iterator<Item = &'a SourceToken> + Clone
{
    let (line, _) = expect(tokens, &Token::LBrace, "'{'")?;

    let mut statements = Vec::new();
    loop {
        match tokens.peek() {
            Some(SourceToken { kind: Token::RBrace, .. }) => {
                tokens.next();
                break;
            },
            Some(SourceToken { kind: Token::Eof, .. }) | None => {
                return Err(ParseError::UnexpectedEndOfInput { line });
            },
            Some(_) => statements.push(parse_declaration(tokens)?),
        }
    }
    Ok(statements)
}

/// Parses an `if` statement with optional `else` branch.
///
/// Grammar: `if := "if" "(" expression ")" statement ("else" statement)?`
fn parse_if<'a, I>(tokens: &mut Peekable<I>, line: usize) -> ParseResult<Stmt>
    where I: Iterator<Item = &'a SourceToken> + Clone
{
    expect(tokens, &Token::LParen, "'('")?;
    let condition = parse_expression(tokens)?;
    expect(tokens, &Token::RParen, "')'")?;
    let then_branch = Box::new(parse_statement(tokens)?);

    let else_branch = if let Some(SourceToken { kind: Token::Else, .. }) = tokens.peek() {
        tokens.next();
        Some(Box::new(parse_statement(tokens)?))
    } else {
        None
    };

    Ok(Stmt::If { condition,
                  then_branch,
                  else_branch,
                  line })
}

/// Parses a `while` statement.
///
/// Grammar: `while := "while" "(" expression ")" statement`
fn parse_while<'a, I>(tokens: &mut Peekable<I>, line: usize) -> ParseResult<Stmt>
    where I: Iterator<Item = &'a SourceToken> + Clone
{
    expect(tokens, &Token::LParen, "'('")?;
    let condition = parse_expression(tokens)?;
    expect(tokens, &Token::RParen, "')'")?;
    let body = Box::new(parse_statement(tokens)?);
    Ok(Stmt::While { condition, body, line })
}

/// Parses a `for (name in iterable)` statement.
///
/// Grammar: `for := "for" "(" IDENT "in" expression ")" statement`
fn parse_for<'a, I>(tokens: &mut Peekable<I>, line: usize) -> ParseResult<Stmt>
    where I: Iterator<Item = &'a SourceToken> + Clone
{
    expect(tokens, &Token::LParen, "'('")?;
    let var = parse_identifier(tokens, "loop variable")?;
    expect(tokens, &Token::In, "'in'")?;
    let iterable = parse_expression(tokens)?;
    expect(tokens, &Token::RParen, "')'")?;
    let body = Box::new(parse_statement(tokens)?);
    Ok(Stmt::For { var,
                   iterable,
                   body,
                   line })
}
