//! List built-ins: `append/3`, `member/2`, `length/2`.

use super::BuiltinSink;
use crate::error::Result;
use crate::logic::{Substitution, Term};
use crate::resolver::next_id;
use crate::unification::unify;

/// The elements of a proper list, if the term is one.
fn proper_list(term: &Term) -> Option<&[Term]> {
    match term {
        Term::List { items, tail: None } => Some(items),
        _ => None,
    }
}

/// `append/3`.
///
/// Two modes: with the first two arguments proper lists the concatenation
/// unifies with the third; with the third a proper list the splits are
/// enumerated front-first (`[] ++ L`, `[e1] ++ rest`, ...). Anything else
/// fails.
pub fn builtin_append(args: &[Term], bindings: &Substitution, sink: &mut dyn BuiltinSink) -> Result<bool> {
    let front = bindings.apply(&args[0]);
    let back = bindings.apply(&args[1]);
    let whole = bindings.apply(&args[2]);

    if let (Some(a), Some(b)) = (proper_list(&front), proper_list(&back)) {
        let concat = Term::list(a.iter().chain(b.iter()).cloned().collect());
        return match unify(&whole, &concat, bindings) {
            Ok(unified) => sink.solution(unified),
            Err(_) => Ok(true),
        };
    }

    if let Some(items) = proper_list(&whole) {
        for split in 0..=items.len() {
            let head = Term::list(items[..split].to_vec());
            let tail = Term::list(items[split..].to_vec());
            let Ok(s1) = unify(&front, &head, bindings) else {
                continue;
            };
            let Ok(s2) = unify(&back, &tail, &s1) else {
                continue;
            };
            if !sink.solution(s2)? {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// `member/2`: succeeds once per element of the (proper) list that unifies
/// with the first argument, in element order.
pub fn builtin_member(args: &[Term], bindings: &Substitution, sink: &mut dyn BuiltinSink) -> Result<bool> {
    let element = bindings.apply(&args[0]);
    let list = bindings.apply(&args[1]);
    let Some(items) = proper_list(&list) else {
        return Ok(true);
    };
    for item in items {
        if let Ok(unified) = unify(&element, item, bindings) {
            if !sink.solution(unified)? {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// `length/2`.
///
/// List bound: its length unifies with the second argument. Length bound to
/// a non-negative integer: a proper list of that many fresh variables
/// unifies with the first. Both unbound: fails.
pub fn builtin_length(args: &[Term], bindings: &Substitution, sink: &mut dyn BuiltinSink) -> Result<bool> {
    let list = bindings.apply(&args[0]);
    let count = bindings.apply(&args[1]);

    if let Some(items) = proper_list(&list) {
        return match unify(&count, &Term::int(items.len() as i64), bindings) {
            Ok(unified) => sink.solution(unified),
            Err(_) => Ok(true),
        };
    }

    if list.is_variable() {
        if let Term::Integer(n) = count {
            if n >= 0 {
                let fresh: Vec<Term> = (0..n)
                    .map(|_| Term::var(format!("_L{}", next_id())))
                    .collect();
                return match unify(&list, &Term::list(fresh), bindings) {
                    Ok(unified) => sink.solution(unified),
                    Err(_) => Ok(true),
                };
            }
        }
    }
    Ok(true)
}
