use crate::{
    ast::{BinaryOperator, Expr, UnaryOperator},
    error::RuntimeError,
    interpreter::{
        evaluator::core::{EvalResult, Interpreter},
        value::core::Value,
    },
};

impl Interpreter {
    /// Evaluates a binary expression.
    ///
    /// The logical operators short-circuit: the right operand is only
    /// evaluated when the left one does not decide the result, and the
    /// outcome is canonicalized to a boolean. All other operators evaluate
    /// both operands left to right and then apply [`apply_binary`].
    pub(crate) fn eval_binary_expr(&mut self,
                                   left: &Expr,
                                   op: BinaryOperator,
                                   right: &Expr,
                                   line: usize)
                                   -> EvalResult<Value> {
        match op {
            BinaryOperator::And => {
                let left = self.evaluate(left)?;
                if !left.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                let right = self.evaluate(right)?;
                Ok(Value::Bool(right.is_truthy()))
            },
            BinaryOperator::Or => {
                let left = self.evaluate(left)?;
                if left.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                let right = self.evaluate(right)?;
                Ok(Value::Bool(right.is_truthy()))
            },
            _ => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                apply_binary(op, &left, &right, line)
            },
        }
    }

    /// Applies a unary operator to an evaluated operand.
    pub(crate) fn eval_unary(op: UnaryOperator, value: &Value, line: usize) -> EvalResult<Value> {
        match op {
            UnaryOperator::Not => Ok(Value::Bool(!value.is_truthy())),
            UnaryOperator::Negate => {
                Ok(Value::Number(-value.as_number("operand of unary '-'", line)?))
            },
        }
    }
}

/// Applies a strict (non-short-circuiting) binary operator to two evaluated
/// operands.
///
/// `+` is overloaded: numeric addition when both sides are numbers, string
/// concatenation when either side is a string (the other side rendered by
/// the display rule). `- * / %` are numeric only, with distinct errors for
/// division and modulo by zero. `== !=` compare kind-then-value and never
/// error; the orderings are numeric only.
pub(crate) fn apply_binary(op: BinaryOperator,
                           left: &Value,
                           right: &Value,
                           line: usize)
                           -> EvalResult<Value> {
    match op {
        BinaryOperator::Add => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            _ if left.is_str() || right.is_str() => Ok(Value::Str(format!("{left}{right}"))),
            _ => Err(RuntimeError::TypeError { details: format!("'+' needs numbers or strings, got {} and {}",
                                                                left.type_name(),
                                                                right.type_name()),
                                               line }),
        },
        BinaryOperator::Sub => {
            let (a, b) = numeric(left, right, op, line)?;
            Ok(Value::Number(a - b))
        },
        BinaryOperator::Mul => {
            let (a, b) = numeric(left, right, op, line)?;
            Ok(Value::Number(a * b))
        },
        BinaryOperator::Div => {
            let (a, b) = numeric(left, right, op, line)?;
            if b == 0.0 {
                return Err(RuntimeError::DivisionByZero { line });
            }
            Ok(Value::Number(a / b))
        },
        BinaryOperator::Mod => {
            let (a, b) = numeric(left, right, op, line)?;
            if b == 0.0 {
                return Err(RuntimeError::ModuloByZero { line });
            }
            Ok(Value::Number(a % b))
        },
        BinaryOperator::Equal => Ok(Value::Bool(left == right)),
        BinaryOperator::NotEqual => Ok(Value::Bool(left != right)),
        BinaryOperator::Less => {
            let (a, b) = numeric(left, right, op, line)?;
            Ok(Value::Bool(a < b))
        },
        BinaryOperator::LessEqual => {
            let (a, b) = numeric(left, right, op, line)?;
            Ok(Value::Bool(a <= b))
        },
        BinaryOperator::Greater => {
            let (a, b) = numeric(left, right, op, line)?;
            Ok(Value::Bool(a > b))
        },
        BinaryOperator::GreaterEqual => {
            let (a, b) = numeric(left, right, op, line)?;
            Ok(Value::Bool(a >= b))
        },
        // The short-circuit forms are handled before operand evaluation;
        // reaching them here means both sides were already evaluated.
        BinaryOperator::And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        BinaryOperator::Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
    }
}

/// Extracts two numeric operands or reports which operator needed them.
fn numeric(left: &Value,
           right: &Value,
           op: BinaryOperator,
           line: usize)
           -> EvalResult<(f64, f64)> {
    let what = format!("operand of '{op}'");
    Ok((left.as_number(&what, line)?, right.as_number(&what, line)?))
}
