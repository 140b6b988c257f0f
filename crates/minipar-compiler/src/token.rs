//! Token model: lexical categories, scanner rules, and the intrinsic table.

use std::fmt;
use std::ops::Range;

use logos::Logos;

use crate::ast::Type;

/// Lexical category of a token.
///
/// Keywords and type words are explicit `#[token]` rules; longest-match
/// semantics keep identifiers like `func_name` from being split at a keyword
/// prefix. Trivia (whitespace, comments, newlines) is produced by the raw
/// scanner and filtered by [`crate::lexer::TokenStream`], which also uses the
/// newline tokens to maintain the line counter.
#[derive(Logos, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    #[token("func")]
    KwFunc,

    #[token("while")]
    KwWhile,

    #[token("if")]
    KwIf,

    #[token("else")]
    KwElse,

    #[token("return")]
    KwReturn,

    #[token("break")]
    KwBreak,

    #[token("continue")]
    KwContinue,

    #[token("par")]
    KwPar,

    #[token("seq")]
    KwSeq,

    #[token("c_channel")]
    KwCChannel,

    #[token("s_channel")]
    KwSChannel,

    #[token("true")]
    True,

    #[token("false")]
    False,

    /// One of the four type words; the lexeme disambiguates.
    #[token("number")]
    #[token("string")]
    #[token("bool")]
    #[token("void")]
    TypeName,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    /// Integer or decimal literal (`12`, `3.14`, `.5`).
    #[regex(r"[0-9]+\.[0-9]+|\.[0-9]+|[0-9]+")]
    Number,

    /// Double-quoted string literal, no escapes.
    #[regex(r#""[^"]*""#)]
    Str,

    #[token("->")]
    Arrow,

    #[token("||")]
    OrOr,

    #[token("&&")]
    AndAnd,

    #[token("==")]
    EqEq,

    #[token("!=")]
    NotEq,

    #[token("<=")]
    LtEq,

    #[token(">=")]
    GtEq,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("=")]
    Eq,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("!")]
    Bang,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[regex(r"#[^\n]*", allow_greedy = true)]
    LineComment,

    #[regex(r"/\*(?:[^*]|\*[^/])*\*/")]
    BlockComment,

    #[regex(r"[ \t\r\f]+")]
    Whitespace,

    #[token("\n")]
    #[token("\r\n")]
    Newline,

    /// A character matched by no scanner rule. The lexer itself never fails;
    /// unknown characters surface here and become parse errors downstream.
    Unknown,

    /// End of input, synthesized by the parser when the stream is exhausted.
    Eof,
}

impl TokenKind {
    /// Category name used by the token dump and in diagnostics.
    pub fn tag(self) -> &'static str {
        match self {
            TokenKind::KwFunc => "FUNC",
            TokenKind::KwWhile => "WHILE",
            TokenKind::KwIf => "IF",
            TokenKind::KwElse => "ELSE",
            TokenKind::KwReturn => "RETURN",
            TokenKind::KwBreak => "BREAK",
            TokenKind::KwContinue => "CONTINUE",
            TokenKind::KwPar => "PAR",
            TokenKind::KwSeq => "SEQ",
            TokenKind::KwCChannel => "C_CHANNEL",
            TokenKind::KwSChannel => "S_CHANNEL",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::TypeName => "TYPE",
            TokenKind::Ident => "ID",
            TokenKind::Number => "NUMBER",
            TokenKind::Str => "STRING",
            TokenKind::Arrow => "->",
            TokenKind::OrOr => "||",
            TokenKind::AndAnd => "&&",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Eq => "=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Bang => "!",
            TokenKind::Colon => ":",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::LineComment => "COMMENT",
            TokenKind::BlockComment => "COMMENT",
            TokenKind::Whitespace => "WHITESPACE",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Unknown => "UNKNOWN",
            TokenKind::Eof => "EOF",
        }
    }
}

/// A token with its raw text, 1-based line, and byte span in the source.
///
/// String literals carry their text with the surrounding quotes stripped.
#[derive(Clone, Debug, PartialEq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    pub line: u32,
    pub span: Range<usize>,
}

impl Token<'_> {
    /// How the token reads in an error message.
    pub fn describe(&self) -> &str {
        match self.kind {
            TokenKind::Eof => "end of input",
            TokenKind::Str | TokenKind::Ident | TokenKind::Number | TokenKind::Unknown => self.text,
            _ => self.kind.tag(),
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.kind {
            TokenKind::Unknown => self.text,
            kind => kind.tag(),
        };
        write!(f, "{{{}, {}}}", self.text, tag)
    }
}

/// Intrinsic function names and their declared return types.
///
/// Consumed in three places: the parser pre-seeds these names as `FUNC`
/// symbols in the global scope, the semantic analyzer types calls to them,
/// and the runtime dispatches on the names.
pub const INTRINSICS: &[(&str, Type)] = &[
    ("print", Type::Void),
    ("input", Type::String),
    ("to_number", Type::Number),
    ("to_string", Type::String),
    ("to_bool", Type::Bool),
    ("sleep", Type::Void),
    ("send", Type::String),
    ("close", Type::Void),
    ("len", Type::Number),
    ("isalpha", Type::Bool),
    ("isnum", Type::Bool),
];

/// Declared return type of an intrinsic, or `None` for unknown names.
pub fn intrinsic_return_type(name: &str) -> Option<Type> {
    INTRINSICS
        .iter()
        .find(|(intrinsic, _)| *intrinsic == name)
        .map(|&(_, ty)| ty)
}
