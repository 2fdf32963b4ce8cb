use logos::Logos;

use crate::error::ParseError;

/// Represents a lexical token in the source input.
/// A token is a minimal but meaningful unit of text produced by the lexer.
/// This enum defines all recognized tokens in the language.
///
/// The textual operators `not`, `and`, `or` and `equals` are alternate
/// spellings of `!`, `&&`, `||` and `==` and lex to the same token kinds, so
/// no later phase has to distinguish them.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(extras = LexerExtras)]
pub enum Token {
    /// Numeric literal tokens, such as `42` or `3.14`. There is a single
    /// numeric type; every literal is a double.
    #[regex(r"[0-9]+(\.[0-9]+)?", parse_number)]
    Number(f64),
    /// String literal tokens. The bytes between the quotes are copied
    /// verbatim; there is no escape processing.
    #[regex(r#""[^"]*""#, parse_string)]
    Str(String),
    /// Identifier tokens; variable, function, or property names such as `x`
    /// or `greet`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),
    /// `let`
    #[token("let")]
    Let,
    /// `func`
    #[token("func")]
    Func,
    /// `class`
    #[token("class")]
    Class,
    /// `struct`
    #[token("struct")]
    Struct,
    /// `union`
    #[token("union")]
    Union,
    /// `return`
    #[token("return")]
    Return,
    /// `if`
    #[token("if")]
    If,
    /// `else`
    #[token("else")]
    Else,
    /// `while`
    #[token("while")]
    While,
    /// `for`
    #[token("for")]
    For,
    /// `in`
    #[token("in")]
    In,
    /// `true`
    #[token("true")]
    True,
    /// `false`
    #[token("false")]
    False,
    /// `null`
    #[token("null")]
    Null,
    /// `this`
    #[token("this")]
    This,
    /// `new`
    #[token("new")]
    New,
    /// `import`
    #[token("import")]
    Import,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `,`
    #[token(",")]
    Comma,
    /// `.`
    #[token(".")]
    Dot,
    /// `;`
    #[token(";")]
    Semicolon,
    /// `:`
    #[token(":")]
    Colon,
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `%`
    #[token("%")]
    Percent,
    /// `!` or its textual alias `not`
    #[token("!")]
    #[token("not")]
    Bang,
    /// `=`
    #[token("=")]
    Equal,
    /// `<`
    #[token("<")]
    Less,
    /// `>`
    #[token(">")]
    Greater,
    /// `!=`
    #[token("!=")]
    BangEqual,
    /// `==` or its textual alias `equals`
    #[token("==")]
    #[token("equals")]
    EqualEqual,
    /// `<=`
    #[token("<=")]
    LessEqual,
    /// `>=`
    #[token(">=")]
    GreaterEqual,
    /// `&&` or its textual alias `and`. A single `&` is a lex error.
    #[token("&&")]
    #[token("and")]
    AndAnd,
    /// `||` or its textual alias `or`. A single `|` is a lex error.
    #[token("||")]
    #[token("or")]
    OrOr,
    /// `// Comments.`
    #[regex(r"//[^\n\r]*", logos::skip, allow_greedy = true)]
    Comment,
    /// Newlines advance the line counter and are otherwise skipped.
    #[token("\n", newline)]
    Newline,
    /// Spaces, tabs and feeds.
    #[regex(r"[ \t\r\f]+", logos::skip)]
    Ignored,
    /// End of input. Appended by [`scan`]; never produced while text remains.
    #[token("\0")]
    Eof,
}

/// Additional information carried by the lexer during tokenization.
///
/// Tracks the current line number and the byte offset where that line starts
/// so that token columns can be derived from spans.
pub struct LexerExtras {
    /// The current line number in the source being tokenized.
    pub line:       usize,
    /// Byte offset of the first character of the current line.
    pub line_start: usize,
}

impl Default for LexerExtras {
    fn default() -> Self {
        Self { line:       1,
               line_start: 0, }
    }
}

/// A token together with its source position.
pub struct SourceToken {
    /// The token kind, including any literal payload.
    pub kind:   Token,
    /// 1-based source line.
    pub line:   usize,
    /// 1-based source column of the token's first character.
    pub column: usize,
}

/// Parses a numeric literal from the current token slice.
fn parse_number(lex: &logos::Lexer<Token>) -> Option<f64> {
    lex.slice().parse().ok()
}

/// Copies the bytes of a string literal, dropping the surrounding quotes.
///
/// Literals may span lines; the line counter is advanced for every newline
/// inside the literal.
fn parse_string(lex: &mut logos::Lexer<Token>) -> String {
    let slice = lex.slice();
    let newlines = slice.chars().filter(|&c| c == '\n').count();
    if newlines > 0 {
        lex.extras.line += newlines;
        if let Some(last) = slice.rfind('\n') {
            lex.extras.line_start = lex.span().start + last + 1;
        }
    }
    slice[1..slice.len() - 1].to_string()
}

/// Skips a newline while advancing the position bookkeeping.
fn newline(lex: &mut logos::Lexer<Token>) -> logos::Skip {
    lex.extras.line += 1;
    lex.extras.line_start = lex.span().end;
    logos::Skip
}

/// Tokenizes a complete source text.
///
/// Produces the token stream consumed by the parser, with line and column
/// attached to every token, and a final [`Token::Eof`] marker.
///
/// # Errors
/// Returns a [`ParseError`] for unterminated string literals and for any
/// character (such as a lone `&` or `|`) that does not begin a token.
pub fn scan(source: &str) -> Result<Vec<SourceToken>, ParseError> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer_with_extras(source, LexerExtras::default());

    while let Some(item) = lexer.next() {
        let line = lexer.extras.line;
        let column = lexer.span().start.saturating_sub(lexer.extras.line_start) + 1;

        match item {
            Ok(kind) => tokens.push(SourceToken { kind, line, column }),
            Err(()) => {
                let slice = lexer.slice();
                return Err(if slice.starts_with('"') {
                               ParseError::UnterminatedString { line, column }
                           } else {
                               ParseError::UnexpectedCharacter { found: slice.to_string(),
                                                                 line,
                                                                 column }
                           });
            },
        }
    }

    let column = source.len().saturating_sub(lexer.extras.line_start) + 1;
    tokens.push(SourceToken { kind: Token::Eof,
                              line: lexer.extras.line,
                              column });
    Ok(tokens)
}
