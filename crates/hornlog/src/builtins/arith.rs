//! Arithmetic evaluation (`is/2`) and order comparisons.

use super::BuiltinSink;
use crate::error::Result;
use crate::logic::{ordering, Substitution, Term};
use crate::unification::unify;
use std::cmp::Ordering;

/// A number in the evaluator's two-type tower.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn to_term(self) -> Term {
        match self {
            Number::Int(i) => Term::Integer(i),
            Number::Float(f) => Term::Float(f),
        }
    }
}

/// Evaluate an arithmetic expression under the current bindings.
///
/// Returns `None` for anything that does not evaluate: unbound variables,
/// non-numeric leaves, unknown operators, overflow, division or modulo by
/// zero. The caller turns `None` into ordinary goal failure.
pub fn eval(term: &Term, bindings: &Substitution) -> Option<Number> {
    match term {
        Term::Integer(value) => Some(Number::Int(*value)),
        Term::Float(value) => Some(Number::Float(*value)),
        Term::Variable(_) => {
            let resolved = bindings.resolve(term);
            if resolved.is_variable() {
                return None;
            }
            // a variable may be bound to a number or to a further expression
            eval(&resolved.clone(), bindings)
        }
        Term::Compound { functor, args } => match (functor.as_str(), args.as_slice()) {
            ("+", [a, b]) => binary(a, b, bindings, i64::checked_add, |x, y| x + y),
            ("-", [a, b]) => binary(a, b, bindings, i64::checked_sub, |x, y| x - y),
            ("*", [a, b]) => binary(a, b, bindings, i64::checked_mul, |x, y| x * y),
            ("/", [a, b]) => {
                let x = eval(a, bindings)?;
                let y = eval(b, bindings)?;
                if y.as_f64() == 0.0 {
                    return None;
                }
                // true division is always a float, even for exact integer quotients
                Some(Number::Float(x.as_f64() / y.as_f64()))
            }
            ("//", [a, b]) => {
                let (x, y) = int_pair(a, b, bindings)?;
                if y == 0 {
                    return None;
                }
                Some(Number::Int(floor_div(x, y)))
            }
            ("mod", [a, b]) => {
                let (x, y) = int_pair(a, b, bindings)?;
                if y == 0 {
                    return None;
                }
                Some(Number::Int(x - floor_div(x, y).checked_mul(y)?))
            }
            ("-", [a]) => match eval(a, bindings)? {
                Number::Int(i) => Some(Number::Int(i.checked_neg()?)),
                Number::Float(f) => Some(Number::Float(-f)),
            },
            ("abs", [a]) => match eval(a, bindings)? {
                Number::Int(i) => Some(Number::Int(i.checked_abs()?)),
                Number::Float(f) => Some(Number::Float(f.abs())),
            },
            _ => None,
        },
        _ => None,
    }
}

fn binary(
    a: &Term,
    b: &Term,
    bindings: &Substitution,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Option<Number> {
    let x = eval(a, bindings)?;
    let y = eval(b, bindings)?;
    match (x, y) {
        (Number::Int(i), Number::Int(j)) => int_op(i, j).map(Number::Int),
        _ => Some(Number::Float(float_op(x.as_f64(), y.as_f64()))),
    }
}

fn int_pair(a: &Term, b: &Term, bindings: &Substitution) -> Option<(i64, i64)> {
    match (eval(a, bindings)?, eval(b, bindings)?) {
        (Number::Int(x), Number::Int(y)) => Some((x, y)),
        _ => None,
    }
}

/// Division rounding towards negative infinity.
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    if a % b != 0 && (a < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

/// `is/2`: evaluate the right-hand side and unify the result with the left.
pub fn builtin_is(args: &[Term], bindings: &Substitution, sink: &mut dyn BuiltinSink) -> Result<bool> {
    let Some(value) = eval(&args[1], bindings) else {
        return Ok(true);
    };
    match unify(&args[0], &value.to_term(), bindings) {
        Ok(unified) => sink.solution(unified),
        Err(_) => Ok(true),
    }
}

fn compare_goal(
    args: &[Term],
    bindings: &Substitution,
    sink: &mut dyn BuiltinSink,
    accept: fn(Ordering) -> bool,
) -> Result<bool> {
    let left = bindings.apply(&args[0]);
    let right = bindings.apply(&args[1]);
    if accept(ordering::compare(&left, &right)) {
        sink.solution(bindings.clone())
    } else {
        Ok(true)
    }
}

pub fn builtin_lt(args: &[Term], bindings: &Substitution, sink: &mut dyn BuiltinSink) -> Result<bool> {
    compare_goal(args, bindings, sink, Ordering::is_lt)
}

pub fn builtin_gt(args: &[Term], bindings: &Substitution, sink: &mut dyn BuiltinSink) -> Result<bool> {
    compare_goal(args, bindings, sink, Ordering::is_gt)
}

pub fn builtin_le(args: &[Term], bindings: &Substitution, sink: &mut dyn BuiltinSink) -> Result<bool> {
    compare_goal(args, bindings, sink, Ordering::is_le)
}

pub fn builtin_ge(args: &[Term], bindings: &Substitution, sink: &mut dyn BuiltinSink) -> Result<bool> {
    compare_goal(args, bindings, sink, Ordering::is_ge)
}
