//! Semantic analysis: type rules and context rules over the AST.
//!
//! The analyzer asserts and annotates nothing; the tree is left untouched.
//! An explicit context stack tracks the ancestor chain so `return`,
//! `break`/`continue`, and nested function definitions can be validated.

use indexmap::IndexMap;

use crate::ast::{ArithmeticOp, Expr, FuncDef, Module, RelationalOp, Stmt, Type, UnaryOp};
use crate::error::SemanticError;
use crate::token::intrinsic_return_type;

/// Checks a module, failing on the first rule violation.
pub fn analyze(module: &Module) -> Result<(), SemanticError> {
    SemanticAnalyzer::default().check_module(module)
}

/// One frame of the ancestor chain.
#[derive(Clone, Copy, Debug)]
enum Context<'a> {
    Function { name: &'a str, return_type: Type },
    Loop,
    Conditional,
    Par,
}

#[derive(Default)]
pub struct SemanticAnalyzer<'a> {
    context: Vec<Context<'a>>,
    /// Declared functions, registered in visit order so later `s_channel`
    /// and call references resolve.
    functions: IndexMap<&'a str, &'a FuncDef>,
}

impl<'a> SemanticAnalyzer<'a> {
    pub fn check_module(mut self, module: &'a Module) -> Result<(), SemanticError> {
        self.check_block(&module.stmts)
    }

    fn check_block(&mut self, body: &'a [Stmt]) -> Result<(), SemanticError> {
        for stmt in body {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    fn check_stmt(&mut self, stmt: &'a Stmt) -> Result<(), SemanticError> {
        match stmt {
            Stmt::Assign { left, right } => {
                let left_ty = self.type_of(left)?;
                let right_ty = self.type_of(right)?;
                let Expr::Id { name, .. } = left else {
                    return Err(SemanticError::new("assignment must target a variable"));
                };
                if left_ty != right_ty {
                    return Err(SemanticError::new(format!(
                        "variable `{name}` expects {left_ty}, found {right_ty}"
                    )));
                }
                Ok(())
            }
            Stmt::Return { expr, .. } => {
                let enclosing = self.context.iter().rev().find_map(|frame| match frame {
                    Context::Function { name, return_type } => Some((*name, *return_type)),
                    _ => None,
                });
                let Some((name, return_type)) = enclosing else {
                    return Err(SemanticError::new(
                        "`return` outside of a function definition",
                    ));
                };
                let expr_ty = self.type_of(expr)?;
                if expr_ty != return_type {
                    return Err(SemanticError::new(format!(
                        "return in `{name}` has type {expr_ty}, expected {return_type}"
                    )));
                }
                Ok(())
            }
            Stmt::Break { .. } => self.require_loop("break"),
            Stmt::Continue { .. } => self.require_loop("continue"),
            Stmt::Expr(expr) => {
                self.type_of(expr)?;
                Ok(())
            }
            Stmt::FuncDef(func) => self.check_func_def(func),
            Stmt::If {
                condition,
                body,
                else_body,
            } => {
                self.check_condition(condition)?;
                self.context.push(Context::Conditional);
                let result = self.check_block(body).and_then(|()| match else_body {
                    Some(body) => self.check_block(body),
                    None => Ok(()),
                });
                self.context.pop();
                result
            }
            Stmt::While { condition, body } => {
                self.check_condition(condition)?;
                self.context.push(Context::Loop);
                let result = self.check_block(body);
                self.context.pop();
                result
            }
            Stmt::Par { body } => {
                for stmt in body {
                    if !matches!(stmt, Stmt::Expr(Expr::Call { .. })) {
                        return Err(SemanticError::new(
                            "only calls are allowed inside a par block",
                        ));
                    }
                }
                self.context.push(Context::Par);
                let result = self.check_block(body);
                self.context.pop();
                result
            }
            Stmt::Seq { body } => self.check_block(body),
            Stmt::CChannel(chan) => {
                self.expect_type(&chan.host, Type::String, || {
                    format!("host in `{}` must be STRING", chan.name)
                })?;
                self.expect_type(&chan.port, Type::Number, || {
                    format!("port in `{}` must be NUMBER", chan.name)
                })
            }
            Stmt::SChannel(chan) => {
                let Some(&func) = self.functions.get(chan.func_name.as_str()) else {
                    return Err(SemanticError::new(format!(
                        "function `{}` is not declared",
                        chan.func_name
                    )));
                };
                if func.return_type != Type::String {
                    return Err(SemanticError::new(format!(
                        "function bound to `{}` must return STRING",
                        chan.name
                    )));
                }
                let single_string = func.params.len() == 1
                    && func.params.values().next().is_some_and(|p| p.ty == Type::String);
                if !single_string {
                    return Err(SemanticError::new(format!(
                        "function bound to `{}` must take exactly one STRING parameter",
                        chan.name
                    )));
                }
                self.expect_type(&chan.description, Type::String, || {
                    format!("description in `{}` must be STRING", chan.name)
                })?;
                self.expect_type(&chan.host, Type::String, || {
                    format!("host in `{}` must be STRING", chan.name)
                })?;
                self.expect_type(&chan.port, Type::Number, || {
                    format!("port in `{}` must be NUMBER", chan.name)
                })
            }
            Stmt::NoOp => Ok(()),
            Stmt::Assert { condition, message } => {
                self.expect_type(condition, Type::Bool, || {
                    "assert condition must be BOOL".to_owned()
                })?;
                if let Some(message) = message {
                    self.expect_type(message, Type::String, || {
                        "assert message must be STRING".to_owned()
                    })?;
                }
                Ok(())
            }
        }
    }

    fn check_func_def(&mut self, func: &'a FuncDef) -> Result<(), SemanticError> {
        let nested = self
            .context
            .iter()
            .any(|frame| matches!(frame, Context::Conditional | Context::Loop | Context::Par));
        if nested {
            return Err(SemanticError::new(
                "cannot define functions inside local scopes",
            ));
        }

        self.functions.entry(func.name.as_str()).or_insert(func);

        for (name, param) in &func.params {
            if let Some(default) = &param.default {
                let default_ty = self.type_of(default)?;
                if default_ty != param.ty {
                    return Err(SemanticError::new(format!(
                        "default for parameter `{name}` has type {default_ty}, expected {}",
                        param.ty
                    )));
                }
            }
        }

        self.context.push(Context::Function {
            name: func.name.as_str(),
            return_type: func.return_type,
        });
        let result = self.check_block(&func.body);
        self.context.pop();
        result
    }

    fn require_loop(&self, what: &str) -> Result<(), SemanticError> {
        if self
            .context
            .iter()
            .any(|frame| matches!(frame, Context::Loop))
        {
            return Ok(());
        }
        Err(SemanticError::new(format!("`{what}` outside of a loop")))
    }

    fn check_condition(&mut self, condition: &'a Expr) -> Result<(), SemanticError> {
        let ty = self.type_of(condition)?;
        if ty != Type::Bool {
            return Err(SemanticError::new(format!(
                "expected BOOL condition, found {ty}"
            )));
        }
        Ok(())
    }

    fn expect_type(
        &mut self,
        expr: &'a Expr,
        expected: Type,
        message: impl FnOnce() -> String,
    ) -> Result<(), SemanticError> {
        let ty = self.type_of(expr)?;
        if ty != expected {
            return Err(SemanticError::new(format!("{}, found {ty}", message())));
        }
        Ok(())
    }

    /// Computes and validates the type of an expression. Parse-time tags on
    /// `Constant` and `Id` nodes are authoritative.
    fn type_of(&mut self, expr: &'a Expr) -> Result<Type, SemanticError> {
        match expr {
            Expr::Constant { ty, .. } | Expr::Id { ty, .. } => Ok(*ty),
            Expr::Access { ty, index, .. } => {
                if *ty != Type::String {
                    return Err(SemanticError::new("indexing is only valid on strings"));
                }
                let index_ty = self.type_of(index)?;
                if index_ty != Type::Number {
                    return Err(SemanticError::new(format!(
                        "string index must be NUMBER, found {index_ty}"
                    )));
                }
                Ok(Type::String)
            }
            Expr::Logical {
                op, left, right, ..
            } => {
                let left_ty = self.type_of(left)?;
                let right_ty = self.type_of(right)?;
                if left_ty != Type::Bool || right_ty != Type::Bool {
                    return Err(SemanticError::new(format!(
                        "expected BOOL operands, found {left_ty} and {right_ty} in operation `{op}`"
                    )));
                }
                Ok(Type::Bool)
            }
            Expr::Relational {
                op, left, right, ..
            } => {
                let left_ty = self.type_of(left)?;
                let right_ty = self.type_of(right)?;
                match op {
                    RelationalOp::Eq | RelationalOp::Ne => {
                        if left_ty != right_ty {
                            return Err(SemanticError::new(format!(
                                "expected equal types, found {left_ty} and {right_ty} in operation `{op}`"
                            )));
                        }
                    }
                    _ => {
                        if left_ty != Type::Number || right_ty != Type::Number {
                            return Err(SemanticError::new(format!(
                                "expected NUMBER operands, found {left_ty} and {right_ty} in operation `{op}`"
                            )));
                        }
                    }
                }
                Ok(Type::Bool)
            }
            Expr::Arithmetic {
                op, left, right, ..
            } => {
                let left_ty = self.type_of(left)?;
                let right_ty = self.type_of(right)?;
                if *op == ArithmeticOp::Add {
                    // `+` is overloaded for string concatenation.
                    if left_ty != right_ty {
                        return Err(SemanticError::new(format!(
                            "expected equal types, found {left_ty} and {right_ty} in operation `{op}`"
                        )));
                    }
                } else if left_ty != Type::Number || right_ty != Type::Number {
                    return Err(SemanticError::new(format!(
                        "expected NUMBER operands, found {left_ty} and {right_ty} in operation `{op}`"
                    )));
                }
                Ok(left_ty)
            }
            Expr::Unary { op, expr, .. } => {
                let ty = self.type_of(expr)?;
                match op {
                    UnaryOp::Neg if ty != Type::Number => Err(SemanticError::new(format!(
                        "expected NUMBER, found {ty} in operation `-`"
                    ))),
                    UnaryOp::Not if ty != Type::Bool => Err(SemanticError::new(format!(
                        "expected BOOL, found {ty} in operation `!`"
                    ))),
                    _ => Ok(ty),
                }
            }
            Expr::Call {
                callee,
                method,
                args,
                ..
            } => {
                let func_name = method.as_deref().unwrap_or(callee);
                for arg in args {
                    self.type_of(arg)?;
                }
                if let Some(&func) = self.functions.get(func_name) {
                    let required = func
                        .params
                        .values()
                        .filter(|param| param.default.is_none())
                        .count();
                    if args.len() < required {
                        return Err(SemanticError::new(format!(
                            "`{func_name}` expects at least {required} arguments, found {}",
                            args.len()
                        )));
                    }
                    Ok(func.return_type)
                } else if let Some(ty) = intrinsic_return_type(func_name) {
                    Ok(ty)
                } else {
                    Err(SemanticError::new(format!(
                        "function `{func_name}` is not declared"
                    )))
                }
            }
            Expr::Cast { target, expr, .. } => {
                self.type_of(expr)?;
                Ok(*target)
            }
        }
    }
}
