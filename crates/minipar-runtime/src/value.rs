//! Runtime values and their operator semantics.

use std::cmp::Ordering;
use std::fmt;

use crate::error::RuntimeError;

/// A tagged runtime value.
///
/// `Int` and `Float` are both `NUMBER` at the type level; literals without a
/// decimal point parse as integers, arithmetic promotes to float on mixed
/// operands, and `/` always produces a float (true division).
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl Value {
    /// Parses a `NUMBER` literal.
    pub fn parse_number(lexeme: &str) -> Result<Value, RuntimeError> {
        if !lexeme.contains('.') {
            if let Ok(n) = lexeme.parse::<i64>() {
                return Ok(Value::Int(n));
            }
        }
        lexeme
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| RuntimeError::new(format!("invalid number literal `{lexeme}`")))
    }

    /// Type tag name, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) | Value::Float(_) => "NUMBER",
            Value::Str(_) => "STRING",
            Value::Bool(_) => "BOOL",
        }
    }

    /// Zero numbers and empty strings are false.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Loose equality: numbers compare across the int/float split.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Numeric ordering for the comparison operators.
    pub fn compare(&self, other: &Value) -> Result<Ordering, RuntimeError> {
        if let (Value::Int(a), Value::Int(b)) = (self, other) {
            return Ok(a.cmp(b));
        }
        let (Some(a), Some(b)) = (self.as_f64(), other.as_f64()) else {
            return Err(RuntimeError::new(format!(
                "comparison requires NUMBER operands, found {} and {}",
                self.type_name(),
                other.type_name()
            )));
        };
        a.partial_cmp(&b)
            .ok_or_else(|| RuntimeError::new("comparison is undefined for NaN"))
    }

    /// `+`: numeric addition or string concatenation.
    pub fn add(&self, other: &Value) -> Result<Value, RuntimeError> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_add(*b)
                .map(Value::Int)
                .ok_or_else(|| RuntimeError::new("integer overflow in `+`")),
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
            _ => self.float_op(other, "+", |a, b| a + b),
        }
    }

    pub fn sub(&self, other: &Value) -> Result<Value, RuntimeError> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_sub(*b)
                .map(Value::Int)
                .ok_or_else(|| RuntimeError::new("integer overflow in `-`")),
            _ => self.float_op(other, "-", |a, b| a - b),
        }
    }

    pub fn mul(&self, other: &Value) -> Result<Value, RuntimeError> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a
                .checked_mul(*b)
                .map(Value::Int)
                .ok_or_else(|| RuntimeError::new("integer overflow in `*`")),
            _ => self.float_op(other, "*", |a, b| a * b),
        }
    }

    /// True division: the result is always a float.
    pub fn div(&self, other: &Value) -> Result<Value, RuntimeError> {
        let (Some(a), Some(b)) = (self.as_f64(), other.as_f64()) else {
            return Err(self.type_error(other, "/"));
        };
        if b == 0.0 {
            return Err(RuntimeError::new("division by zero"));
        }
        Ok(Value::Float(a / b))
    }

    /// `%`: the remainder.
    pub fn rem(&self, other: &Value) -> Result<Value, RuntimeError> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => {
                if *b == 0 {
                    return Err(RuntimeError::new("modulo by zero"));
                }
                Ok(Value::Int(a % b))
            }
            _ => {
                let (Some(a), Some(b)) = (self.as_f64(), other.as_f64()) else {
                    return Err(self.type_error(other, "%"));
                };
                if b == 0.0 {
                    return Err(RuntimeError::new("modulo by zero"));
                }
                Ok(Value::Float(a % b))
            }
        }
    }

    /// Arithmetic negation.
    pub fn neg(&self) -> Result<Value, RuntimeError> {
        match self {
            Value::Int(n) => n
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| RuntimeError::new("integer overflow in `-`")),
            Value::Float(f) => Ok(Value::Float(-f)),
            other => Err(RuntimeError::new(format!(
                "expected NUMBER, found {} in operation `-`",
                other.type_name()
            ))),
        }
    }

    /// Conversion to `NUMBER`: strings parse as integer first, then float.
    pub fn to_number(&self) -> Result<Value, RuntimeError> {
        match self {
            Value::Int(_) | Value::Float(_) => Ok(self.clone()),
            Value::Bool(b) => Ok(Value::Int(*b as i64)),
            Value::Str(s) => {
                let text = s.trim();
                if let Ok(n) = text.parse::<i64>() {
                    return Ok(Value::Int(n));
                }
                text.parse::<f64>()
                    .map(Value::Float)
                    .map_err(|_| RuntimeError::new(format!("cannot convert `{s}` to a number")))
            }
        }
    }

    fn float_op(
        &self,
        other: &Value,
        op: &str,
        apply: impl FnOnce(f64, f64) -> f64,
    ) -> Result<Value, RuntimeError> {
        let (Some(a), Some(b)) = (self.as_f64(), other.as_f64()) else {
            return Err(self.type_error(other, op));
        };
        Ok(Value::Float(apply(a, b)))
    }

    fn type_error(&self, other: &Value, op: &str) -> RuntimeError {
        RuntimeError::new(format!(
            "unsupported operand types for `{op}`: {} and {}",
            self.type_name(),
            other.type_name()
        ))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::Bool(true) => f.write_str("true"),
            Value::Bool(false) => f.write_str("false"),
        }
    }
}
