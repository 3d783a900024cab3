//! Type-checking built-ins.

use super::BuiltinSink;
use crate::error::Result;
use crate::logic::{Substitution, Term};

fn check(
    args: &[Term],
    bindings: &Substitution,
    sink: &mut dyn BuiltinSink,
    accept: fn(&Term) -> bool,
) -> Result<bool> {
    if accept(bindings.resolve(&args[0])) {
        sink.solution(bindings.clone())
    } else {
        Ok(true)
    }
}

pub fn builtin_var(args: &[Term], bindings: &Substitution, sink: &mut dyn BuiltinSink) -> Result<bool> {
    check(args, bindings, sink, |t| matches!(t, Term::Variable(_)))
}

pub fn builtin_nonvar(args: &[Term], bindings: &Substitution, sink: &mut dyn BuiltinSink) -> Result<bool> {
    check(args, bindings, sink, |t| !matches!(t, Term::Variable(_)))
}

pub fn builtin_atom(args: &[Term], bindings: &Substitution, sink: &mut dyn BuiltinSink) -> Result<bool> {
    check(args, bindings, sink, |t| matches!(t, Term::Atom(_)))
}

pub fn builtin_integer(args: &[Term], bindings: &Substitution, sink: &mut dyn BuiltinSink) -> Result<bool> {
    check(args, bindings, sink, |t| matches!(t, Term::Integer(_)))
}

pub fn builtin_float(args: &[Term], bindings: &Substitution, sink: &mut dyn BuiltinSink) -> Result<bool> {
    check(args, bindings, sink, |t| matches!(t, Term::Float(_)))
}

pub fn builtin_number(args: &[Term], bindings: &Substitution, sink: &mut dyn BuiltinSink) -> Result<bool> {
    check(args, bindings, sink, |t| {
        matches!(t, Term::Integer(_) | Term::Float(_))
    })
}

pub fn builtin_compound(args: &[Term], bindings: &Substitution, sink: &mut dyn BuiltinSink) -> Result<bool> {
    check(args, bindings, sink, |t| matches!(t, Term::Compound { .. }))
}

/// `ground/1` must look below the surface: the argument is fully
/// substituted before the check.
pub fn builtin_ground(args: &[Term], bindings: &Substitution, sink: &mut dyn BuiltinSink) -> Result<bool> {
    if bindings.apply(&args[0]).is_ground() {
        sink.solution(bindings.clone())
    } else {
        Ok(true)
    }
}
