use logos::Logos;
use std::fmt;
use std::ops::Range;

/// Consume a `/* ... */` comment; unterminated comments are a lexer error
fn block_comment(lexer: &mut logos::Lexer<Token>) -> bool {
    match lexer.remainder().find("*/") {
        Some(end) => {
            lexer.bump(end + 2);
            true
        }
        None => false,
    }
}

/// Token types for module source text
///
/// Trivia (whitespace, newlines, comments) is lexed rather than skipped so the
/// parser can apply automatic semicolon insertion. Template literals, regular
/// expressions and JSX text are context dependent and are scanned by the parser
/// directly from the source.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    #[regex(r"[ \t\x0B\x0C\x{A0}\x{FEFF}]+")]
    Whitespace,

    #[regex(r"\r\n|\n|\r|\x{2028}|\x{2029}")]
    Newline,

    #[regex(r"//[^\r\n]*")]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    // Keywords are identifiers; the parser decides by text
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*")]
    Ident,

    #[regex(r"#[a-zA-Z_$][a-zA-Z0-9_$]*")]
    PrivateName,

    #[regex(r"[0-9][0-9_]*(\.[0-9_]*)?([eE][+-]?[0-9_]+)?n?")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?")]
    #[regex(r"0[xX][0-9a-fA-F_]+n?")]
    #[regex(r"0[bB][01_]+n?")]
    #[regex(r"0[oO][0-7_]+n?")]
    Number,

    #[regex(r#""([^"\\\r\n]|\\[^\r\n]|\\\r?\n)*""#)]
    #[regex(r"'([^'\\\r\n]|\\[^\r\n]|\\\r?\n)*'")]
    String,

    #[token("`")]
    Backtick,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("...")]
    Ellipsis,

    #[token("?.")]
    QuestionDot,

    #[token("?")]
    Question,

    #[token(":")]
    Colon,

    #[token("=>")]
    Arrow,

    #[token("=")]
    Eq,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("/")]
    Slash,

    #[token("/=")]
    SlashEq,

    #[token("!")]
    Bang,

    #[token("*")]
    Star,

    #[token("@")]
    At,

    // Remaining punctuators; the parser distinguishes them by text
    #[token("==")]
    #[token("===")]
    #[token("!=")]
    #[token("!==")]
    #[token("<=")]
    #[token(">=")]
    #[token("+")]
    #[token("-")]
    #[token("%")]
    #[token("**")]
    #[token("++")]
    #[token("--")]
    #[token("<<")]
    #[token(">>")]
    #[token(">>>")]
    #[token("&")]
    #[token("|")]
    #[token("^")]
    #[token("~")]
    #[token("&&")]
    #[token("||")]
    #[token("??")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("%=")]
    #[token("**=")]
    #[token("<<=")]
    #[token(">>=")]
    #[token(">>>=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token("&&=")]
    #[token("||=")]
    #[token("??=")]
    Operator,
}

impl Token {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Token::Whitespace | Token::Newline | Token::LineComment | Token::BlockComment
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Whitespace => write!(f, "whitespace"),
            Token::Newline => write!(f, "newline"),
            Token::LineComment | Token::BlockComment => write!(f, "comment"),
            Token::Ident => write!(f, "identifier"),
            Token::PrivateName => write!(f, "private name"),
            Token::Number => write!(f, "number"),
            Token::String => write!(f, "string"),
            Token::Backtick => write!(f, "`"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
            Token::Ellipsis => write!(f, "..."),
            Token::QuestionDot => write!(f, "?."),
            Token::Question => write!(f, "?"),
            Token::Colon => write!(f, ":"),
            Token::Arrow => write!(f, "=>"),
            Token::Eq => write!(f, "="),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::Slash => write!(f, "/"),
            Token::SlashEq => write!(f, "/="),
            Token::Bang => write!(f, "!"),
            Token::Star => write!(f, "*"),
            Token::At => write!(f, "@"),
            Token::Operator => write!(f, "operator"),
        }
    }
}

/// A significant token together with its location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme {
    /// `None` at end of input
    pub token: Option<Token>,
    pub start: usize,
    pub end: usize,
    /// A line terminator appears between the previous token and this one
    pub newline_before: bool,
}

impl Lexeme {
    pub fn is(&self, token: Token) -> bool {
        self.token == Some(token)
    }

    pub fn is_eof(&self) -> bool {
        self.token.is_none()
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Lex the next significant token at or after `pos`
///
/// Returns the offset of the first character that could not be lexed on failure.
pub fn lex_at(source: &str, pos: usize) -> Result<Lexeme, usize> {
    let mut lexer = Token::lexer(&source[pos..]);
    let mut newline_before = false;

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let (start, end) = (pos + span.start, pos + span.end);
        match result {
            Ok(Token::Newline) => newline_before = true,
            Ok(Token::BlockComment) => {
                if lexer.slice().contains('\n') {
                    newline_before = true;
                }
            }
            Ok(token) if token.is_trivia() => {}
            Ok(token) => {
                return Ok(Lexeme {
                    token: Some(token),
                    start,
                    end,
                    newline_before,
                })
            }
            Err(()) => return Err(start),
        }
    }

    Ok(Lexeme {
        token: None,
        start: source.len(),
        end: source.len(),
        newline_before: true,
    })
}

/// Tokenize a whole fragment, dropping trivia
///
/// Context-free: `/` is always division and backticks are single tokens, so this
/// is only meant for inspection and diagnostics.
pub fn tokenize(source: &str) -> Vec<(Token, Range<usize>)> {
    Token::lexer(source)
        .spanned()
        .filter_map(|(result, span)| match result {
            Ok(token) if !token.is_trivia() => Some((token, span)),
            _ => None,
        })
        .collect()
}
