//! Recursive-descent parser with one token of lookahead.
//!
//! Tokens are pulled lazily from the [`TokenStream`]; the symbol table is
//! maintained during parsing so reference-before-use and duplicate
//! declarations are reported as syntax errors with line information.

mod grammar;

use indexmap::IndexMap;

use crate::ast::{Module, Type};
use crate::error::SyntaxError;
use crate::lexer::TokenStream;
use crate::symtab::{SymTable, Symbol};
use crate::token::{INTRINSICS, Token, TokenKind};

/// Parses a source text into a [`Module`].
pub fn parse(source: &str) -> Result<Module, SyntaxError> {
    Parser::new(source).parse_module()
}

/// Parser state: the token stream, one token of lookahead, and the
/// compile-time symbol table (discarded once parsing completes).
pub struct Parser<'src> {
    tokens: TokenStream<'src>,
    lookahead: Token<'src>,
    symtable: SymTable,
    /// Declared return types by function name, so call nodes carry their
    /// real type tag. A signature registers before its body parses, which
    /// lets recursive calls resolve.
    return_types: IndexMap<String, Type>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        let mut tokens = TokenStream::new(source);
        let lookahead = tokens.next().unwrap_or_else(|| tokens.eof());

        // Intrinsic function names are visible in the global scope.
        let mut symtable = SymTable::new();
        let mut return_types = IndexMap::new();
        for &(name, ty) in INTRINSICS {
            symtable.insert(Symbol::new(name, Type::Func));
            return_types.insert(name.to_owned(), ty);
        }

        Self {
            tokens,
            lookahead,
            symtable,
            return_types,
        }
    }

    /// Parses the whole input: `program = stmt*`.
    pub fn parse_module(mut self) -> Result<Module, SyntaxError> {
        let stmts = self.stmts()?;
        if self.lookahead.kind != TokenKind::Eof {
            return Err(self.error(format!(
                "unexpected `{}` at top level",
                self.lookahead.describe()
            )));
        }
        Ok(Module { stmts })
    }

    /// Consumes the lookahead, returning it and pulling the next token.
    fn advance(&mut self) -> Token<'src> {
        let next = self.tokens.next().unwrap_or_else(|| self.tokens.eof());
        std::mem::replace(&mut self.lookahead, next)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.lookahead.kind == kind
    }

    /// Consumes the lookahead if it has the given kind.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            return true;
        }
        false
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token<'src>, SyntaxError> {
        if self.at(kind) {
            return Ok(self.advance());
        }
        Err(self.error(format!(
            "expected `{}`, found `{}`",
            kind.tag(),
            self.lookahead.describe()
        )))
    }

    /// A syntax error located at the lookahead token.
    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.lookahead.line, self.lookahead.span.clone(), message)
    }
}
