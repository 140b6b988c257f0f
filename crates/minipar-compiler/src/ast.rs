//! Abstract syntax tree: tagged statement and expression variants.
//!
//! The tree is immutable once built; no later phase rewrites nodes. Every
//! expression carries the type tag assigned at parse time and the source
//! line of its introducing token.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

/// Type tag of the language.
///
/// The four primitive tags plus the pseudo-kinds used for identifier
/// binding (functions and channel names). Checking is tag equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Type {
    Number,
    String,
    Bool,
    Void,
    Func,
    CChannel,
    SChannel,
}

impl Type {
    /// Maps a type word lexeme (`number`, `string`, `bool`, `void`) to its tag.
    pub fn from_keyword(word: &str) -> Option<Type> {
        match word {
            "number" => Some(Type::Number),
            "string" => Some(Type::String),
            "bool" => Some(Type::Bool),
            "void" => Some(Type::Void),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Type::Number => "NUMBER",
            Type::String => "STRING",
            Type::Bool => "BOOL",
            Type::Void => "VOID",
            Type::Func => "FUNC",
            Type::CChannel => "C_CHANNEL",
            Type::SChannel => "S_CHANNEL",
        };
        f.write_str(tag)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RelationalOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Not,
    Neg,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
        })
    }
}

impl fmt::Display for RelationalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RelationalOp::Eq => "==",
            RelationalOp::Ne => "!=",
            RelationalOp::Lt => "<",
            RelationalOp::Gt => ">",
            RelationalOp::Le => "<=",
            RelationalOp::Ge => ">=",
        })
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Sub => "-",
            ArithmeticOp::Mul => "*",
            ArithmeticOp::Div => "/",
            ArithmeticOp::Rem => "%",
        })
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
        })
    }
}

/// A statement body.
pub type Body = Vec<Stmt>;

/// Function parameters in declaration order.
///
/// Insertion order equals declaration order; call binding and arity checks
/// rely on it.
pub type Params = IndexMap<String, Param>;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Param {
    pub ty: Type,
    pub default: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Expr {
    /// Number, string, or boolean literal. The lexeme is kept raw and
    /// interpreted by the executor according to the type tag.
    Constant { ty: Type, lexeme: String, line: u32 },
    /// An identifier occurrence; `decl` marks a declaration site (`x : type`).
    Id {
        ty: Type,
        name: String,
        decl: bool,
        line: u32,
    },
    /// String indexing, `base[index]`, 0-based.
    Access {
        ty: Type,
        base: Box<Expr>,
        index: Box<Expr>,
        line: u32,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
        line: u32,
    },
    Relational {
        op: RelationalOp,
        left: Box<Expr>,
        right: Box<Expr>,
        line: u32,
    },
    Arithmetic {
        ty: Type,
        op: ArithmeticOp,
        left: Box<Expr>,
        right: Box<Expr>,
        line: u32,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
        line: u32,
    },
    /// A call statement or expression. `callee` is the leading identifier;
    /// for method-style calls on channel names (`conn.send(x)`) it is the
    /// receiver and `method` carries the operation name. `ty` is the
    /// declared return type of the resolved function.
    Call {
        ty: Type,
        callee: String,
        method: Option<String>,
        args: Vec<Expr>,
        line: u32,
    },
    /// Type conversion to `target`. Has no surface syntax; constructed
    /// programmatically.
    Cast {
        target: Type,
        expr: Box<Expr>,
        line: u32,
    },
}

impl Expr {
    /// The parse-time type tag of the expression.
    pub fn ty(&self) -> Type {
        match self {
            Expr::Constant { ty, .. }
            | Expr::Id { ty, .. }
            | Expr::Access { ty, .. }
            | Expr::Arithmetic { ty, .. }
            | Expr::Call { ty, .. } => *ty,
            Expr::Logical { .. } | Expr::Relational { .. } => Type::Bool,
            Expr::Unary { expr, .. } => expr.ty(),
            Expr::Cast { target, .. } => *target,
        }
    }

    /// Source line of the expression's introducing token.
    pub fn line(&self) -> u32 {
        match self {
            Expr::Constant { line, .. }
            | Expr::Id { line, .. }
            | Expr::Access { line, .. }
            | Expr::Logical { line, .. }
            | Expr::Relational { line, .. }
            | Expr::Arithmetic { line, .. }
            | Expr::Unary { line, .. }
            | Expr::Call { line, .. }
            | Expr::Cast { line, .. } => *line,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FuncDef {
    pub name: String,
    pub return_type: Type,
    pub params: Params,
    pub body: Body,
    pub line: u32,
}

/// Client channel declaration: `c_channel name { host, port }`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CChannelDecl {
    pub name: String,
    pub host: Expr,
    pub port: Expr,
    pub line: u32,
}

/// Server channel declaration:
/// `s_channel name { func, description, host, port }`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SChannelDecl {
    pub name: String,
    pub func_name: String,
    pub description: Expr,
    pub host: Expr,
    pub port: Expr,
    pub line: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Stmt {
    Assign { left: Expr, right: Expr },
    Return { expr: Expr, line: u32 },
    Break { line: u32 },
    Continue { line: u32 },
    /// A bare expression statement; the parser only produces calls here.
    Expr(Expr),
    FuncDef(FuncDef),
    If {
        condition: Expr,
        body: Body,
        else_body: Option<Body>,
    },
    While { condition: Expr, body: Body },
    Par { body: Body },
    Seq { body: Body },
    CChannel(CChannelDecl),
    SChannel(SChannelDecl),
    NoOp,
    /// Condition check with an optional message. No surface syntax;
    /// constructed programmatically.
    Assert {
        condition: Expr,
        message: Option<Expr>,
    },
}

/// Root of the tree: the statement list of a source file.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Module {
    pub stmts: Body,
}

/// Renders the tree as an indented dump, one node per line.
pub fn format_ast(module: &Module) -> String {
    let mut out = String::new();
    out.push_str("Module\n");
    for stmt in &module.stmts {
        fmt_stmt(&mut out, stmt, 1);
    }
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn fmt_stmt(out: &mut String, stmt: &Stmt, depth: usize) {
    indent(out, depth);
    match stmt {
        Stmt::Assign { left, right } => {
            out.push_str("Assign\n");
            fmt_expr(out, left, depth + 1);
            fmt_expr(out, right, depth + 1);
        }
        Stmt::Return { expr, .. } => {
            out.push_str("Return\n");
            fmt_expr(out, expr, depth + 1);
        }
        Stmt::Break { .. } => out.push_str("Break\n"),
        Stmt::Continue { .. } => out.push_str("Continue\n"),
        Stmt::Expr(expr) => {
            out.push_str("Expr\n");
            fmt_expr(out, expr, depth + 1);
        }
        Stmt::FuncDef(func) => {
            out.push_str(&format!("FuncDef {} -> {}\n", func.name, func.return_type));
            for (name, param) in &func.params {
                indent(out, depth + 1);
                out.push_str(&format!("Param {} {}\n", name, param.ty));
                if let Some(default) = &param.default {
                    fmt_expr(out, default, depth + 2);
                }
            }
            for stmt in &func.body {
                fmt_stmt(out, stmt, depth + 1);
            }
        }
        Stmt::If {
            condition,
            body,
            else_body,
        } => {
            out.push_str("If\n");
            fmt_expr(out, condition, depth + 1);
            for stmt in body {
                fmt_stmt(out, stmt, depth + 1);
            }
            if let Some(else_body) = else_body {
                indent(out, depth);
                out.push_str("Else\n");
                for stmt in else_body {
                    fmt_stmt(out, stmt, depth + 1);
                }
            }
        }
        Stmt::While { condition, body } => {
            out.push_str("While\n");
            fmt_expr(out, condition, depth + 1);
            for stmt in body {
                fmt_stmt(out, stmt, depth + 1);
            }
        }
        Stmt::Par { body } => {
            out.push_str("Par\n");
            for stmt in body {
                fmt_stmt(out, stmt, depth + 1);
            }
        }
        Stmt::Seq { body } => {
            out.push_str("Seq\n");
            for stmt in body {
                fmt_stmt(out, stmt, depth + 1);
            }
        }
        Stmt::CChannel(chan) => {
            out.push_str(&format!("CChannel {}\n", chan.name));
            fmt_expr(out, &chan.host, depth + 1);
            fmt_expr(out, &chan.port, depth + 1);
        }
        Stmt::SChannel(chan) => {
            out.push_str(&format!("SChannel {} -> {}\n", chan.name, chan.func_name));
            fmt_expr(out, &chan.description, depth + 1);
            fmt_expr(out, &chan.host, depth + 1);
            fmt_expr(out, &chan.port, depth + 1);
        }
        Stmt::NoOp => out.push_str("NoOp\n"),
        Stmt::Assert { condition, message } => {
            out.push_str("Assert\n");
            fmt_expr(out, condition, depth + 1);
            if let Some(message) = message {
                fmt_expr(out, message, depth + 1);
            }
        }
    }
}

fn fmt_expr(out: &mut String, expr: &Expr, depth: usize) {
    indent(out, depth);
    match expr {
        Expr::Constant { ty, lexeme, .. } => {
            out.push_str(&format!("Constant {} {}\n", ty, lexeme));
        }
        Expr::Id { ty, name, decl, .. } => {
            if *decl {
                out.push_str(&format!("Id {} {} (decl)\n", ty, name));
            } else {
                out.push_str(&format!("Id {} {}\n", ty, name));
            }
        }
        Expr::Access { base, index, .. } => {
            out.push_str("Access\n");
            fmt_expr(out, base, depth + 1);
            fmt_expr(out, index, depth + 1);
        }
        Expr::Logical {
            op, left, right, ..
        } => {
            out.push_str(&format!("Logical {}\n", op));
            fmt_expr(out, left, depth + 1);
            fmt_expr(out, right, depth + 1);
        }
        Expr::Relational {
            op, left, right, ..
        } => {
            out.push_str(&format!("Relational {}\n", op));
            fmt_expr(out, left, depth + 1);
            fmt_expr(out, right, depth + 1);
        }
        Expr::Arithmetic {
            op, left, right, ..
        } => {
            out.push_str(&format!("Arithmetic {}\n", op));
            fmt_expr(out, left, depth + 1);
            fmt_expr(out, right, depth + 1);
        }
        Expr::Unary { op, expr, .. } => {
            out.push_str(&format!("Unary {}\n", op));
            fmt_expr(out, expr, depth + 1);
        }
        Expr::Call {
            callee,
            method,
            args,
            ..
        } => {
            match method {
                Some(method) => out.push_str(&format!("Call {}.{}\n", callee, method)),
                None => out.push_str(&format!("Call {}\n", callee)),
            }
            for arg in args {
                fmt_expr(out, arg, depth + 1);
            }
        }
        Expr::Cast { target, expr, .. } => {
            out.push_str(&format!("Cast {}\n", target));
            fmt_expr(out, expr, depth + 1);
        }
    }
}
