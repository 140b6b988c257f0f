//! Lazy token stream over source text with line tracking.

use logos::Logos;

use crate::token::{Token, TokenKind};

/// Single-pass iterator over the tokens of a source text.
///
/// Wraps the raw scanner, filtering out whitespace and comments and keeping
/// a 1-based line counter: newline tokens advance it, block comments advance
/// it by the number of newlines they contain. Each yielded token carries the
/// line on which it starts.
pub struct TokenStream<'src> {
    lexer: logos::Lexer<'src, TokenKind>,
    line: u32,
}

impl<'src> TokenStream<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            lexer: TokenKind::lexer(source),
            line: 1,
        }
    }

    /// Current line of the scan position.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// The end-of-input token, positioned after the last byte of the source.
    pub fn eof(&self) -> Token<'src> {
        let end = self.lexer.source().len();
        Token {
            kind: TokenKind::Eof,
            text: "",
            line: self.line,
            span: end..end,
        }
    }
}

impl<'src> Iterator for TokenStream<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Token<'src>> {
        loop {
            let kind = match self.lexer.next()? {
                Ok(kind) => kind,
                Err(()) => TokenKind::Unknown,
            };
            let text = self.lexer.slice();

            match kind {
                TokenKind::Whitespace | TokenKind::LineComment => continue,
                TokenKind::Newline => {
                    self.line += 1;
                    continue;
                }
                TokenKind::BlockComment => {
                    self.line += text.matches('\n').count() as u32;
                    continue;
                }
                TokenKind::Str => {
                    // Quotes are stripped from the token value.
                    return Some(Token {
                        kind,
                        text: &text[1..text.len() - 1],
                        line: self.line,
                        span: self.lexer.span(),
                    });
                }
                _ => {
                    return Some(Token {
                        kind,
                        text,
                        line: self.line,
                        span: self.lexer.span(),
                    });
                }
            }
        }
    }
}
