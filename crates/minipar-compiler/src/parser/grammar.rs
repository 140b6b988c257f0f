//! Grammar productions and the symbol discipline applied while parsing.

use crate::ast::{
    ArithmeticOp, Body, CChannelDecl, Expr, FuncDef, LogicalOp, Param, Params, RelationalOp,
    SChannelDecl, Stmt, Type, UnaryOp,
};
use crate::error::SyntaxError;
use crate::symtab::Symbol;
use crate::token::TokenKind;

use super::Parser;

fn is_stmt_start(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Ident
            | TokenKind::KwFunc
            | TokenKind::KwReturn
            | TokenKind::KwBreak
            | TokenKind::KwContinue
            | TokenKind::KwIf
            | TokenKind::KwWhile
            | TokenKind::KwSeq
            | TokenKind::KwPar
            | TokenKind::KwCChannel
            | TokenKind::KwSChannel
    )
}

impl<'src> Parser<'src> {
    /// `stmts = stmt*`, ending at `}` or end of input.
    pub(super) fn stmts(&mut self) -> Result<Body, SyntaxError> {
        let mut body = Body::new();
        while is_stmt_start(self.lookahead.kind) {
            body.push(self.stmt()?);
        }
        if !matches!(self.lookahead.kind, TokenKind::RBrace | TokenKind::Eof) {
            return Err(self.error(format!(
                "`{}` does not start a valid statement",
                self.lookahead.describe()
            )));
        }
        Ok(body)
    }

    fn stmt(&mut self) -> Result<Stmt, SyntaxError> {
        match self.lookahead.kind {
            // assignment = local ("=" disjunction)?  ; a bare call needs no `=`
            TokenKind::Ident => {
                let left = self.local()?;
                if let Expr::Call { .. } = left {
                    return Ok(Stmt::Expr(left));
                }
                if !self.eat(TokenKind::Eq) {
                    return Err(self.error(format!(
                        "expected `=`, found `{}`",
                        self.lookahead.describe()
                    )));
                }
                let right = self.disjunction()?;
                Ok(Stmt::Assign { left, right })
            }
            TokenKind::KwFunc => self.func_def(),
            TokenKind::KwReturn => {
                let token = self.advance();
                let expr = self.disjunction()?;
                Ok(Stmt::Return {
                    expr,
                    line: token.line,
                })
            }
            TokenKind::KwBreak => {
                let token = self.advance();
                Ok(Stmt::Break { line: token.line })
            }
            TokenKind::KwContinue => {
                let token = self.advance();
                Ok(Stmt::Continue { line: token.line })
            }
            TokenKind::KwIf => self.if_stmt(),
            TokenKind::KwWhile => self.while_stmt(),
            TokenKind::KwSeq => {
                self.advance();
                Ok(Stmt::Seq {
                    body: self.block(None)?,
                })
            }
            TokenKind::KwPar => {
                self.advance();
                Ok(Stmt::Par {
                    body: self.block(None)?,
                })
            }
            TokenKind::KwCChannel => self.c_channel(),
            TokenKind::KwSChannel => self.s_channel(),
            _ => Err(self.error(format!(
                "`{}` does not start a valid statement",
                self.lookahead.describe()
            ))),
        }
    }

    /// `funcdef = "func" ID "(" params? ")" "->" TYPE block`
    ///
    /// The function name is bound before the body is parsed, so recursive
    /// calls resolve.
    fn func_def(&mut self) -> Result<Stmt, SyntaxError> {
        let line = self.lookahead.line;
        self.advance();
        let name = self.declare_name(Type::Func)?;
        let params = self.params()?;
        if !self.eat(TokenKind::Arrow) {
            return Err(self.error(format!(
                "expected `->`, found `{}`",
                self.lookahead.describe()
            )));
        }
        if !self.at(TokenKind::TypeName) {
            return Err(self.error(format!(
                "invalid return type `{}`",
                self.lookahead.describe()
            )));
        }
        let return_type = self.type_name()?;
        self.return_types.insert(name.clone(), return_type);
        let body = self.block(Some(&params))?;
        Ok(Stmt::FuncDef(FuncDef {
            name,
            return_type,
            params,
            body,
            line,
        }))
    }

    fn if_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        self.advance();
        self.expect(TokenKind::LParen)?;
        let condition = self.disjunction()?;
        self.expect(TokenKind::RParen)?;
        let body = self.block(None)?;
        let else_body = if self.eat(TokenKind::KwElse) {
            Some(self.block(None)?)
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            body,
            else_body,
        })
    }

    fn while_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        self.advance();
        self.expect(TokenKind::LParen)?;
        let condition = self.disjunction()?;
        self.expect(TokenKind::RParen)?;
        let body = self.block(None)?;
        Ok(Stmt::While { condition, body })
    }

    /// `cchan = "c_channel" ID "{" ari "," ari "}"`
    fn c_channel(&mut self) -> Result<Stmt, SyntaxError> {
        let line = self.lookahead.line;
        self.advance();
        let name = self.declare_name(Type::CChannel)?;
        self.expect(TokenKind::LBrace)?;
        let host = self.ari()?;
        self.expect(TokenKind::Comma)?;
        let port = self.ari()?;
        self.expect(TokenKind::RBrace)?;
        Ok(Stmt::CChannel(CChannelDecl {
            name,
            host,
            port,
            line,
        }))
    }

    /// `schan = "s_channel" ID "{" ID "," ari "," ari "," ari "}"`
    ///
    /// The first field references an already-declared function.
    fn s_channel(&mut self) -> Result<Stmt, SyntaxError> {
        let line = self.lookahead.line;
        self.advance();
        let name = self.declare_name(Type::SChannel)?;
        self.expect(TokenKind::LBrace)?;
        let func_name = self.func_ref()?;
        self.expect(TokenKind::Comma)?;
        let description = self.ari()?;
        self.expect(TokenKind::Comma)?;
        let host = self.ari()?;
        self.expect(TokenKind::Comma)?;
        let port = self.ari()?;
        self.expect(TokenKind::RBrace)?;
        Ok(Stmt::SChannel(SChannelDecl {
            name,
            func_name,
            description,
            host,
            port,
            line,
        }))
    }

    /// `block = "{" stmts "}"`, with a fresh scope. Function formals are
    /// seeded into the scope before the body is parsed.
    fn block(&mut self, params: Option<&Params>) -> Result<Body, SyntaxError> {
        if !self.eat(TokenKind::LBrace) {
            return Err(self.error(format!(
                "expected `{{`, found `{}`",
                self.lookahead.describe()
            )));
        }

        self.symtable.push_scope();
        if let Some(params) = params {
            for (name, param) in params {
                self.symtable.insert(Symbol::new(name.clone(), param.ty));
            }
        }

        let body = self.stmts()?;

        if !self.eat(TokenKind::RBrace) {
            return Err(self.error(format!(
                "expected `}}`, found `{}`",
                self.lookahead.describe()
            )));
        }
        self.symtable.pop_scope();
        Ok(body)
    }

    /// `params = param ("," param)*`, possibly empty, parenthesized.
    fn params(&mut self) -> Result<Params, SyntaxError> {
        self.expect(TokenKind::LParen)?;
        let mut params = Params::new();
        if !self.at(TokenKind::RParen) {
            self.param(&mut params)?;
            while self.eat(TokenKind::Comma) {
                self.param(&mut params)?;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(params)
    }

    /// `param = ID ":" TYPE ("=" disjunction)?`
    fn param(&mut self, params: &mut Params) -> Result<(), SyntaxError> {
        let token = self.lookahead.clone();
        if !self.eat(TokenKind::Ident) {
            return Err(self.error(format!(
                "invalid parameter name `{}`",
                token.describe()
            )));
        }
        if !self.eat(TokenKind::Colon) {
            return Err(self.error(format!(
                "expected `:`, found `{}`",
                self.lookahead.describe()
            )));
        }
        let ty = self.type_name()?;
        let default = if self.eat(TokenKind::Eq) {
            Some(self.disjunction()?)
        } else {
            None
        };
        if params.contains_key(token.text) {
            return Err(SyntaxError::new(
                token.line,
                token.span,
                format!(
                    "parameter `{}` was already declared in this function",
                    token.text
                ),
            ));
        }
        params.insert(token.text.to_owned(), Param { ty, default });
        Ok(())
    }

    /// Comma-separated call arguments, possibly empty; the closing `)` is
    /// consumed by the caller.
    fn args(&mut self) -> Result<Vec<Expr>, SyntaxError> {
        let mut args = Vec::new();
        if !self.at(TokenKind::RParen) {
            args.push(self.disjunction()?);
            while self.eat(TokenKind::Comma) {
                args.push(self.disjunction()?);
            }
        }
        Ok(args)
    }

    /// Consumes a TYPE token and maps it to its tag.
    fn type_name(&mut self) -> Result<Type, SyntaxError> {
        if !self.at(TokenKind::TypeName) {
            return Err(self.error(format!(
                "expected a type, found `{}`",
                self.lookahead.describe()
            )));
        }
        let token = self.advance();
        match Type::from_keyword(token.text) {
            Some(ty) => Ok(ty),
            None => Err(SyntaxError::new(
                token.line,
                token.span,
                format!("invalid type `{}`", token.text),
            )),
        }
    }

    /// Binds a fresh name with the given kind. The name must not resolve in
    /// any visible scope.
    fn declare_name(&mut self, kind: Type) -> Result<String, SyntaxError> {
        let token = self.lookahead.clone();
        if !self.eat(TokenKind::Ident) {
            return Err(self.error(format!(
                "expected an identifier, found `{}`",
                token.describe()
            )));
        }
        if let Some(existing) = self.symtable.find(token.text) {
            return Err(SyntaxError::new(
                token.line,
                token.span,
                format!(
                    "name `{}` with type {} already exists",
                    token.text, existing.kind
                ),
            ));
        }
        self.symtable.insert(Symbol::new(token.text, kind));
        Ok(token.text.to_owned())
    }

    /// Consumes an identifier that must already resolve to a binding.
    fn func_ref(&mut self) -> Result<String, SyntaxError> {
        let token = self.lookahead.clone();
        if !self.eat(TokenKind::Ident) {
            return Err(self.error(format!(
                "expected an identifier, found `{}`",
                token.describe()
            )));
        }
        if self.symtable.find(token.text).is_none() {
            return Err(SyntaxError::new(
                token.line,
                token.span,
                format!("function `{}` is not declared", token.text),
            ));
        }
        Ok(token.text.to_owned())
    }

    /// `local = ID (":" TYPE | ("[" ari "]" | "." ID)* ("(" args? ")")?)`
    ///
    /// The declaration form inserts the name into the innermost scope; any
    /// other form requires a visible binding. Accumulated `.name` segments
    /// become the method operator of a trailing call.
    pub(super) fn local(&mut self) -> Result<Expr, SyntaxError> {
        let token = self.lookahead.clone();
        if !self.eat(TokenKind::Ident) {
            return Err(self.error(format!(
                "expected an identifier, found `{}`",
                token.describe()
            )));
        }

        // Declaration form: `name : type`.
        if self.at(TokenKind::Colon) {
            self.advance();
            let ty = self.type_name()?;
            if !self.symtable.insert(Symbol::new(token.text, ty)) {
                return Err(SyntaxError::new(
                    token.line,
                    token.span,
                    format!("variable `{}` was already declared in this scope", token.text),
                ));
            }
            return Ok(Expr::Id {
                ty,
                name: token.text.to_owned(),
                decl: true,
                line: token.line,
            });
        }

        let Some(symbol) = self.symtable.find(token.text) else {
            return Err(SyntaxError::new(
                token.line,
                token.span,
                format!("variable `{}` is not declared", token.text),
            ));
        };
        let ty = symbol.kind;

        let mut expr = Expr::Id {
            ty,
            name: token.text.to_owned(),
            decl: false,
            line: token.line,
        };
        let mut method = String::new();
        loop {
            if self.at(TokenKind::LBracket) {
                self.advance();
                let index = self.ari()?;
                self.expect(TokenKind::RBracket)?;
                expr = Expr::Access {
                    ty,
                    base: Box::new(expr),
                    index: Box::new(index),
                    line: token.line,
                };
            }
            if self.at(TokenKind::Dot) {
                self.advance();
                let name = self.lookahead.clone();
                if !self.eat(TokenKind::Ident) {
                    return Err(self.error(format!(
                        "expected an identifier, found `{}`",
                        name.describe()
                    )));
                }
                method.push_str(name.text);
            }
            if self.at(TokenKind::LParen) {
                self.advance();
                let args = self.args()?;
                self.expect(TokenKind::RParen)?;
                let func_name = if method.is_empty() {
                    token.text
                } else {
                    method.as_str()
                };
                // Unresolved names keep the FUNC placeholder; the analyzer
                // rejects them before the tag can matter.
                let ty = self
                    .return_types
                    .get(func_name)
                    .copied()
                    .unwrap_or(Type::Func);
                expr = Expr::Call {
                    ty,
                    callee: token.text.to_owned(),
                    method: if method.is_empty() {
                        None
                    } else {
                        Some(method)
                    },
                    args,
                    line: token.line,
                };
                break;
            } else if !matches!(self.lookahead.kind, TokenKind::LBracket | TokenKind::Dot) {
                break;
            }
        }
        Ok(expr)
    }

    /// `disjunction = conjunction ("||" conjunction)*`
    pub(super) fn disjunction(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.conjunction()?;
        while self.at(TokenKind::OrOr) {
            let line = self.lookahead.line;
            self.advance();
            let right = self.conjunction()?;
            left = Expr::Logical {
                op: LogicalOp::Or,
                left: Box::new(left),
                right: Box::new(right),
                line,
            };
        }
        Ok(left)
    }

    /// `conjunction = equality ("&&" equality)*`
    fn conjunction(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.equality()?;
        while self.at(TokenKind::AndAnd) {
            let line = self.lookahead.line;
            self.advance();
            let right = self.equality()?;
            left = Expr::Logical {
                op: LogicalOp::And,
                left: Box::new(left),
                right: Box::new(right),
                line,
            };
        }
        Ok(left)
    }

    /// `equality = comparison (("==" | "!=") comparison)*`
    fn equality(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.comparison()?;
        loop {
            let op = match self.lookahead.kind {
                TokenKind::EqEq => RelationalOp::Eq,
                TokenKind::NotEq => RelationalOp::Ne,
                _ => break,
            };
            let line = self.lookahead.line;
            self.advance();
            let right = self.comparison()?;
            left = Expr::Relational {
                op,
                left: Box::new(left),
                right: Box::new(right),
                line,
            };
        }
        Ok(left)
    }

    /// `comparison = ari ((">" | "<" | ">=" | "<=") ari)*`
    fn comparison(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.ari()?;
        loop {
            let op = match self.lookahead.kind {
                TokenKind::Lt => RelationalOp::Lt,
                TokenKind::Gt => RelationalOp::Gt,
                TokenKind::LtEq => RelationalOp::Le,
                TokenKind::GtEq => RelationalOp::Ge,
                _ => break,
            };
            let line = self.lookahead.line;
            self.advance();
            let right = self.ari()?;
            left = Expr::Relational {
                op,
                left: Box::new(left),
                right: Box::new(right),
                line,
            };
        }
        Ok(left)
    }

    /// `ari = term (("+" | "-") term)*`
    pub(super) fn ari(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.term()?;
        loop {
            let op = match self.lookahead.kind {
                TokenKind::Plus => ArithmeticOp::Add,
                TokenKind::Minus => ArithmeticOp::Sub,
                _ => break,
            };
            let line = self.lookahead.line;
            self.advance();
            let right = self.term()?;
            left = Expr::Arithmetic {
                ty: left.ty(),
                op,
                left: Box::new(left),
                right: Box::new(right),
                line,
            };
        }
        Ok(left)
    }

    /// `term = unary (("*" | "/" | "%") unary)*`
    fn term(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.unary()?;
        loop {
            let op = match self.lookahead.kind {
                TokenKind::Star => ArithmeticOp::Mul,
                TokenKind::Slash => ArithmeticOp::Div,
                TokenKind::Percent => ArithmeticOp::Rem,
                _ => break,
            };
            let line = self.lookahead.line;
            self.advance();
            let right = self.unary()?;
            left = Expr::Arithmetic {
                ty: left.ty(),
                op,
                left: Box::new(left),
                right: Box::new(right),
                line,
            };
        }
        Ok(left)
    }

    /// `unary = ("!" | "-") unary | primary`
    fn unary(&mut self) -> Result<Expr, SyntaxError> {
        let op = match self.lookahead.kind {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            _ => None,
        };
        let Some(op) = op else {
            return self.primary();
        };
        let line = self.lookahead.line;
        self.advance();
        let expr = self.unary()?;
        Ok(Expr::Unary {
            op,
            expr: Box::new(expr),
            line,
        })
    }

    /// `primary = "(" disjunction ")" | local | NUMBER | STRING | TRUE | FALSE`
    fn primary(&mut self) -> Result<Expr, SyntaxError> {
        match self.lookahead.kind {
            TokenKind::LParen => {
                self.advance();
                let expr = self.disjunction()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::Ident => self.local(),
            TokenKind::Number => {
                let token = self.advance();
                Ok(Expr::Constant {
                    ty: Type::Number,
                    lexeme: token.text.to_owned(),
                    line: token.line,
                })
            }
            TokenKind::Str => {
                let token = self.advance();
                Ok(Expr::Constant {
                    ty: Type::String,
                    lexeme: token.text.to_owned(),
                    line: token.line,
                })
            }
            TokenKind::True | TokenKind::False => {
                let token = self.advance();
                Ok(Expr::Constant {
                    ty: Type::Bool,
                    lexeme: token.text.to_owned(),
                    line: token.line,
                })
            }
            _ => Err(self.error(format!(
                "expected an expression, found `{}`",
                self.lookahead.describe()
            ))),
        }
    }
}
