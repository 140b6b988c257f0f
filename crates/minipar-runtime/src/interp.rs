//! Tree-walking executor.
//!
//! Evaluates the checked AST directly: lexically nested variable frames, a
//! function table filled as definitions execute, `par` blocks on OS threads
//! with snapshot frames, and channel statements backed by blocking sockets.

use std::cmp::Ordering;
use std::io::{self, Write};
use std::net::{Shutdown, TcpListener};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use indexmap::IndexMap;

use minipar_compiler::ast::{
    ArithmeticOp, CChannelDecl, Expr, FuncDef, LogicalOp, Module, RelationalOp, SChannelDecl,
    Stmt, Type, UnaryOp,
};
use minipar_compiler::token::intrinsic_return_type;

use crate::channel::{Connections, read_message};
use crate::error::RuntimeError;
use crate::frame::VarTable;
use crate::value::Value;

/// Result of running a statement or block: execution either falls through
/// or an explicit control-flow signal propagates to the enclosing loop or
/// function frame. Plain expression results never cut a block short.
#[derive(Clone, Debug, PartialEq)]
pub enum Flow {
    Normal,
    Break,
    Continue,
    Return(Option<Value>),
}

/// Destination of `print` and channel logging.
///
/// Shared between `par` branches; every line is written under the lock so
/// output lines never interleave mid-line.
#[derive(Clone)]
pub struct Output {
    sink: Arc<Mutex<dyn Write + Send>>,
}

impl Output {
    pub fn stdout() -> Self {
        Self::from_writer(io::stdout())
    }

    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(writer)),
        }
    }

    /// An output writing into a shared buffer, for tests and embedding.
    pub fn capture() -> (Self, Arc<Mutex<Vec<u8>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        (Self::from_writer(CaptureWriter(buffer.clone())), buffer)
    }

    fn write_line(&self, line: &str) {
        let mut sink = self.sink.lock().expect("output sink poisoned");
        let _ = writeln!(sink, "{line}");
        let _ = sink.flush();
    }
}

struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("capture buffer poisoned").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Executor state: the current variable frames, the function table, the
/// shared connection table, and the output sink.
pub struct Executor<'a> {
    vars: VarTable,
    functions: IndexMap<String, &'a FuncDef>,
    connections: Connections,
    out: Output,
}

impl<'a> Executor<'a> {
    pub fn new() -> Self {
        Self::with_output(Output::stdout())
    }

    pub fn with_output(out: Output) -> Self {
        Self {
            vars: VarTable::new(),
            functions: IndexMap::new(),
            connections: Connections::new(),
            out,
        }
    }

    /// Runs a module to completion.
    pub fn run(&mut self, module: &'a Module) -> Result<(), RuntimeError> {
        for stmt in &module.stmts {
            self.exec(stmt)?;
        }
        Ok(())
    }

    fn exec(&mut self, stmt: &'a Stmt) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Assign { left, right } => {
                let value = self.eval_value(right)?;
                let Expr::Id { name, decl, .. } = left else {
                    return Err(RuntimeError::new("assignment must target a variable"));
                };
                if *decl {
                    self.vars.declare(name, value);
                } else {
                    self.vars.assign(name, value);
                }
                Ok(Flow::Normal)
            }
            Stmt::Return { expr, .. } => Ok(Flow::Return(self.eval(expr)?)),
            Stmt::Break { .. } => Ok(Flow::Break),
            Stmt::Continue { .. } => Ok(Flow::Continue),
            Stmt::Expr(expr) => {
                self.eval(expr)?;
                Ok(Flow::Normal)
            }
            Stmt::FuncDef(func) => {
                self.functions.entry(func.name.clone()).or_insert(func);
                Ok(Flow::Normal)
            }
            Stmt::If {
                condition,
                body,
                else_body,
            } => {
                let chosen = if self.eval_value(condition)?.truthy() {
                    Some(body)
                } else {
                    else_body.as_ref()
                };
                let Some(body) = chosen else {
                    return Ok(Flow::Normal);
                };
                self.vars.push_scope();
                let flow = self.exec_block(body);
                self.vars.pop_scope();
                flow
            }
            Stmt::While { condition, body } => {
                self.vars.push_scope();
                let flow = self.exec_while(condition, body);
                self.vars.pop_scope();
                flow
            }
            Stmt::Par { body } => self.exec_par(body),
            // A sequential block is transparent grouping; serial execution
            // is the default everywhere.
            Stmt::Seq { body } => self.exec_block(body),
            Stmt::CChannel(chan) => {
                self.exec_cchannel(chan)?;
                Ok(Flow::Normal)
            }
            Stmt::SChannel(chan) => {
                self.exec_schannel(chan)?;
                Ok(Flow::Normal)
            }
            Stmt::NoOp => Ok(Flow::Normal),
            Stmt::Assert { condition, message } => {
                if self.eval_value(condition)?.truthy() {
                    return Ok(Flow::Normal);
                }
                let message = match message {
                    Some(expr) => self.eval_value(expr)?.to_string(),
                    None => "assertion failed".to_owned(),
                };
                Err(RuntimeError::new(message))
            }
        }
    }

    /// Runs the statements of a block in order; only control-flow signals
    /// cut it short.
    fn exec_block(&mut self, body: &'a [Stmt]) -> Result<Flow, RuntimeError> {
        for stmt in body {
            match self.exec(stmt)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_while(&mut self, condition: &'a Expr, body: &'a [Stmt]) -> Result<Flow, RuntimeError> {
        while self.eval_value(condition)?.truthy() {
            match self.exec_block(body)? {
                Flow::Normal | Flow::Continue => {}
                Flow::Break => break,
                flow @ Flow::Return(_) => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    /// Spawns one OS thread per statement of the block and joins them all
    /// before returning.
    ///
    /// Each branch runs against a snapshot of the variable frames and
    /// function table taken at spawn time; branch writes stay invisible to
    /// the parent and to sibling branches. The connection table and output
    /// sink are shared. When branches fail, the first error (in source
    /// order) wins, reported only after every branch has joined.
    fn exec_par(&mut self, body: &'a [Stmt]) -> Result<Flow, RuntimeError> {
        let errors: Vec<RuntimeError> = thread::scope(|scope| {
            let handles: Vec<_> = body
                .iter()
                .map(|stmt| {
                    let mut branch = Executor {
                        vars: self.vars.clone(),
                        functions: self.functions.clone(),
                        connections: self.connections.clone(),
                        out: self.out.clone(),
                    };
                    scope.spawn(move || branch.exec(stmt).map(|_| ()))
                })
                .collect();
            handles
                .into_iter()
                .filter_map(|handle| match handle.join() {
                    Ok(Ok(())) => None,
                    Ok(Err(err)) => Some(err),
                    Err(_) => Some(RuntimeError::new("par branch panicked")),
                })
                .collect()
        });
        match errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(Flow::Normal),
        }
    }

    /// Opens the client side of a channel and prints the server's banner.
    fn exec_cchannel(&mut self, chan: &'a CChannelDecl) -> Result<(), RuntimeError> {
        let host = self.eval_string(&chan.host, "host")?;
        let port = self.eval_port(&chan.port)?;
        let banner = self.connections.connect(&chan.name, &host, port)?;
        self.out.write_line(&banner);
        Ok(())
    }

    /// Binds and listens, accepts a single connection, sends the
    /// description, then serves request/response rounds until the peer
    /// closes (zero-length read).
    fn exec_schannel(&mut self, chan: &'a SChannelDecl) -> Result<(), RuntimeError> {
        let host = self.eval_string(&chan.host, "host")?;
        let port = self.eval_port(&chan.port)?;
        let description = self.eval_string(&chan.description, "description")?;
        let Some(&func) = self.functions.get(chan.func_name.as_str()) else {
            return Err(RuntimeError::new(format!(
                "function `{}` is not declared",
                chan.func_name
            )));
        };

        let listener = TcpListener::bind((host.as_str(), port)).map_err(|err| {
            RuntimeError::new(format!(
                "cannot bind `{}` to {host}:{port}: {err}",
                chan.name
            ))
        })?;
        let (mut stream, _) = listener.accept().map_err(|err| {
            RuntimeError::new(format!("accept failed on `{}`: {err}", chan.name))
        })?;

        if !description.is_empty() {
            stream.write_all(description.as_bytes()).map_err(|err| {
                RuntimeError::new(format!("send failed on `{}`: {err}", chan.name))
            })?;
        }

        loop {
            let request = read_message(&mut stream).map_err(|err| {
                RuntimeError::new(format!("receive failed on `{}`: {err}", chan.name))
            })?;
            if request.is_empty() {
                let _ = stream.shutdown(Shutdown::Both);
                return Ok(());
            }
            self.out.write_line(&format!("received: {request}"));

            let reply = match self.call_function(func, vec![Value::Str(request)])? {
                Some(value) => value.to_string(),
                None => {
                    return Err(RuntimeError::new(format!(
                        "function `{}` returned no value",
                        chan.func_name
                    )));
                }
            };
            stream.write_all(reply.as_bytes()).map_err(|err| {
                RuntimeError::new(format!("send failed on `{}`: {err}", chan.name))
            })?;
        }
    }

    /// Evaluates an expression. `None` is the result of a void call.
    fn eval(&mut self, expr: &'a Expr) -> Result<Option<Value>, RuntimeError> {
        match expr {
            Expr::Constant { ty, lexeme, .. } => match ty {
                Type::Number => Value::parse_number(lexeme).map(Some),
                Type::String => Ok(Some(Value::Str(lexeme.clone()))),
                Type::Bool => Ok(Some(Value::Bool(lexeme == "true"))),
                other => Err(RuntimeError::new(format!(
                    "invalid constant of type {other}"
                ))),
            },
            Expr::Id { name, .. } => match self.vars.get(name) {
                Some(value) => Ok(Some(value.clone())),
                None => Err(RuntimeError::new(format!(
                    "variable `{name}` is not defined"
                ))),
            },
            Expr::Access { base, index, .. } => {
                let string = match self.eval_value(base)? {
                    Value::Str(s) => s,
                    other => {
                        return Err(RuntimeError::new(format!(
                            "indexing is only valid on strings, found {}",
                            other.type_name()
                        )));
                    }
                };
                let index = self.eval_index(index)?;
                match string.chars().nth(index) {
                    Some(c) => Ok(Some(Value::Str(c.to_string()))),
                    None => Err(RuntimeError::new("string index out of range")),
                }
            }
            Expr::Logical {
                op, left, right, ..
            } => {
                let left = self.eval_value(left)?;
                let result = match op {
                    LogicalOp::And => {
                        if left.truthy() {
                            self.eval_value(right)?
                        } else {
                            left
                        }
                    }
                    LogicalOp::Or => {
                        if left.truthy() {
                            left
                        } else {
                            self.eval_value(right)?
                        }
                    }
                };
                Ok(Some(result))
            }
            Expr::Relational {
                op, left, right, ..
            } => {
                let left = self.eval_value(left)?;
                let right = self.eval_value(right)?;
                let result = match op {
                    RelationalOp::Eq => left.equals(&right),
                    RelationalOp::Ne => !left.equals(&right),
                    RelationalOp::Lt => left.compare(&right)? == Ordering::Less,
                    RelationalOp::Gt => left.compare(&right)? == Ordering::Greater,
                    RelationalOp::Le => left.compare(&right)? != Ordering::Greater,
                    RelationalOp::Ge => left.compare(&right)? != Ordering::Less,
                };
                Ok(Some(Value::Bool(result)))
            }
            Expr::Arithmetic {
                op, left, right, ..
            } => {
                let left = self.eval_value(left)?;
                let right = self.eval_value(right)?;
                let result = match op {
                    ArithmeticOp::Add => left.add(&right)?,
                    ArithmeticOp::Sub => left.sub(&right)?,
                    ArithmeticOp::Mul => left.mul(&right)?,
                    ArithmeticOp::Div => left.div(&right)?,
                    ArithmeticOp::Rem => left.rem(&right)?,
                };
                Ok(Some(result))
            }
            Expr::Unary { op, expr, .. } => {
                let value = self.eval_value(expr)?;
                let result = match op {
                    UnaryOp::Not => Value::Bool(!value.truthy()),
                    UnaryOp::Neg => value.neg()?,
                };
                Ok(Some(result))
            }
            Expr::Call { .. } => self.eval_call(expr),
            Expr::Cast { target, expr, .. } => {
                let value = self.eval_value(expr)?;
                let converted = match target {
                    Type::Number => value.to_number()?,
                    Type::String => Value::Str(value.to_string()),
                    Type::Bool => Value::Bool(value.truthy()),
                    other => {
                        return Err(RuntimeError::new(format!("cannot cast to {other}")));
                    }
                };
                Ok(Some(converted))
            }
        }
    }

    /// Evaluates an expression that must produce a value.
    fn eval_value(&mut self, expr: &'a Expr) -> Result<Value, RuntimeError> {
        match self.eval(expr)? {
            Some(value) => Ok(value),
            None => Err(RuntimeError::new("void value used in an expression")),
        }
    }

    fn eval_call(&mut self, expr: &'a Expr) -> Result<Option<Value>, RuntimeError> {
        let Expr::Call {
            callee,
            method,
            args,
            ..
        } = expr
        else {
            return Err(RuntimeError::new("expected a call expression"));
        };
        let func_name = method.as_deref().unwrap_or(callee);

        // `send` and `close` take the channel name from the method
        // receiver rather than the argument list.
        match func_name {
            "send" => {
                let data = match args.first() {
                    Some(arg) => match self.eval_value(arg)? {
                        Value::Str(s) => s,
                        other => {
                            return Err(RuntimeError::new(format!(
                                "send expects STRING data, found {}",
                                other.type_name()
                            )));
                        }
                    },
                    None => return Err(RuntimeError::new("send expects the data to write")),
                };
                let reply = self.connections.send(callee, &data)?;
                return Ok(Some(Value::Str(reply)));
            }
            "close" => {
                self.connections.close(callee)?;
                return Ok(None);
            }
            _ => {}
        }

        if intrinsic_return_type(func_name).is_some() {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(self.eval_value(arg)?);
            }
            return self.call_intrinsic(func_name, values);
        }

        let Some(&func) = self.functions.get(func_name) else {
            return Err(RuntimeError::new(format!(
                "function `{func_name}` is not declared"
            )));
        };
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_value(arg)?);
        }
        self.call_function(func, values)
    }

    /// Calls a user function. Arguments are already evaluated in the caller
    /// scope; defaults bind first (evaluated in the fresh scope), then the
    /// positional values override them in declaration order. A body without
    /// an executed `return` yields no value.
    fn call_function(
        &mut self,
        func: &'a FuncDef,
        args: Vec<Value>,
    ) -> Result<Option<Value>, RuntimeError> {
        self.vars.push_scope();
        let result = self.bind_and_run(func, args);
        self.vars.pop_scope();
        result
    }

    fn bind_and_run(
        &mut self,
        func: &'a FuncDef,
        args: Vec<Value>,
    ) -> Result<Option<Value>, RuntimeError> {
        for (name, param) in &func.params {
            if let Some(default) = &param.default {
                let value = self.eval_value(default)?;
                self.vars.declare(name, value);
            }
        }
        for ((name, _), value) in func.params.iter().zip(args) {
            self.vars.declare(name, value);
        }
        match self.exec_block(&func.body)? {
            Flow::Return(value) => Ok(value),
            _ => Ok(None),
        }
    }

    fn call_intrinsic(
        &mut self,
        name: &str,
        args: Vec<Value>,
    ) -> Result<Option<Value>, RuntimeError> {
        match name {
            "print" => {
                let line = args
                    .iter()
                    .map(Value::to_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                self.out.write_line(&line);
                Ok(None)
            }
            "input" => {
                let mut line = String::new();
                io::stdin()
                    .read_line(&mut line)
                    .map_err(|err| RuntimeError::new(format!("cannot read input: {err}")))?;
                while line.ends_with('\n') || line.ends_with('\r') {
                    line.pop();
                }
                Ok(Some(Value::Str(line)))
            }
            "to_number" => one_arg(name, args)?.to_number().map(Some),
            "to_string" => Ok(Some(Value::Str(one_arg(name, args)?.to_string()))),
            "to_bool" => Ok(Some(Value::Bool(one_arg(name, args)?.truthy()))),
            "sleep" => {
                let seconds = match one_arg(name, args)? {
                    Value::Int(n) => n as f64,
                    Value::Float(f) => f,
                    other => {
                        return Err(RuntimeError::new(format!(
                            "sleep expects NUMBER seconds, found {}",
                            other.type_name()
                        )));
                    }
                };
                if seconds < 0.0 || !seconds.is_finite() {
                    return Err(RuntimeError::new("sleep expects a non-negative duration"));
                }
                thread::sleep(Duration::from_secs_f64(seconds));
                Ok(None)
            }
            "len" => match one_arg(name, args)? {
                Value::Str(s) => Ok(Some(Value::Int(s.chars().count() as i64))),
                other => Err(RuntimeError::new(format!(
                    "len expects a STRING, found {}",
                    other.type_name()
                ))),
            },
            "isalpha" => {
                let text = one_arg(name, args)?.to_string();
                Ok(Some(Value::Bool(
                    !text.is_empty() && text.chars().all(char::is_alphabetic),
                )))
            }
            "isnum" => {
                let text = one_arg(name, args)?.to_string();
                Ok(Some(Value::Bool(
                    !text.is_empty() && text.chars().all(char::is_numeric),
                )))
            }
            _ => Err(RuntimeError::new(format!(
                "function `{name}` is not declared"
            ))),
        }
    }

    fn eval_string(&mut self, expr: &'a Expr, what: &str) -> Result<String, RuntimeError> {
        match self.eval_value(expr)? {
            Value::Str(s) => Ok(s),
            other => Err(RuntimeError::new(format!(
                "channel {what} must be STRING, found {}",
                other.type_name()
            ))),
        }
    }

    fn eval_port(&mut self, expr: &'a Expr) -> Result<u16, RuntimeError> {
        let port = match self.eval_value(expr)? {
            Value::Int(n) => n,
            Value::Float(f) if f.fract() == 0.0 => f as i64,
            other => {
                return Err(RuntimeError::new(format!(
                    "channel port must be NUMBER, found {}",
                    other.type_name()
                )));
            }
        };
        u16::try_from(port).map_err(|_| RuntimeError::new(format!("invalid port {port}")))
    }

    fn eval_index(&mut self, expr: &'a Expr) -> Result<usize, RuntimeError> {
        match self.eval_value(expr)? {
            Value::Int(n) if n >= 0 => Ok(n as usize),
            Value::Int(_) => Err(RuntimeError::new("string index must be non-negative")),
            other => Err(RuntimeError::new(format!(
                "string index must be an integer, found {}",
                other.type_name()
            ))),
        }
    }
}

impl Default for Executor<'_> {
    fn default() -> Self {
        Self::new()
    }
}

fn one_arg(name: &str, mut args: Vec<Value>) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError::new(format!(
            "{name} expects exactly 1 argument, found {}",
            args.len()
        )));
    }
    Ok(args.remove(0))
}
