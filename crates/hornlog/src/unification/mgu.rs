//! Robinson unification with occurs check.

use crate::logic::{Substitution, Term};
use thiserror::Error;

/// Result of a unification attempt.
pub type UnificationResult = Result<Substitution, UnificationError>;

/// Why two terms failed to unify. The resolver treats every variant as
/// ordinary failure; the distinctions exist for diagnostics and tests.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnificationError {
    #[error("occurs check: {var} occurs in {term}")]
    OccursCheck { var: String, term: Term },
    #[error("functor clash: {left} vs {right}")]
    FunctorClash { left: String, right: String },
    #[error("arity mismatch: {left} vs {right}")]
    ArityMismatch { left: usize, right: usize },
    #[error("cannot unify {left} with {right}")]
    Clash { left: Term, right: Term },
}

/// Unify two terms under an existing substitution, returning the extended
/// substitution on success. Inputs are never mutated.
pub fn unify(left: &Term, right: &Term, bindings: &Substitution) -> UnificationResult {
    let mut subst = bindings.clone();
    unify_terms(left, right, &mut subst)?;
    Ok(subst)
}

fn unify_terms(
    left: &Term,
    right: &Term,
    subst: &mut Substitution,
) -> Result<(), UnificationError> {
    let t1 = subst.resolve(left).clone();
    let t2 = subst.resolve(right).clone();

    match (&t1, &t2) {
        (Term::Variable(a), Term::Variable(b)) if a == b => Ok(()),

        (Term::Variable(name), other) | (other, Term::Variable(name)) => {
            if occurs(name, other, subst) {
                Err(UnificationError::OccursCheck {
                    var: name.clone(),
                    term: other.clone(),
                })
            } else {
                subst.bind(name.clone(), other.clone());
                Ok(())
            }
        }

        (Term::Atom(a), Term::Atom(b)) if a == b => Ok(()),
        (Term::Integer(a), Term::Integer(b)) if a == b => Ok(()),
        (Term::Float(a), Term::Float(b)) if a.to_bits() == b.to_bits() => Ok(()),
        (Term::Str(a), Term::Str(b)) if a == b => Ok(()),

        (
            Term::Compound { functor: f1, args: a1 },
            Term::Compound { functor: f2, args: a2 },
        ) => {
            if f1 != f2 {
                return Err(UnificationError::FunctorClash {
                    left: f1.clone(),
                    right: f2.clone(),
                });
            }
            if a1.len() != a2.len() {
                return Err(UnificationError::ArityMismatch {
                    left: a1.len(),
                    right: a2.len(),
                });
            }
            for (x, y) in a1.iter().zip(a2.iter()) {
                unify_terms(x, y, subst)?;
            }
            Ok(())
        }

        (
            Term::List { items: i1, tail: l1 },
            Term::List { items: i2, tail: l2 },
        ) => unify_lists(i1, l1.as_deref(), i2, l2.as_deref(), subst),

        _ => Err(UnificationError::Clash { left: t1, right: t2 }),
    }
}

/// Unify two lists. With equal element counts the elements pair off and the
/// tails unify (a missing tail stands for `[]`). With unequal counts the
/// shorter list must carry a tail, which absorbs the longer list's residue:
/// `[H | T] = [a, b]` binds `H = a, T = [b]`.
fn unify_lists(
    items1: &[Term],
    tail1: Option<&Term>,
    items2: &[Term],
    tail2: Option<&Term>,
    subst: &mut Substitution,
) -> Result<(), UnificationError> {
    let shared = items1.len().min(items2.len());
    for (x, y) in items1[..shared].iter().zip(items2[..shared].iter()) {
        unify_terms(x, y, subst)?;
    }

    if items1.len() == items2.len() {
        return match (tail1, tail2) {
            (None, None) => Ok(()),
            (Some(a), Some(b)) => unify_terms(a, b, subst),
            (Some(a), None) => unify_terms(a, &Term::nil(), subst),
            (None, Some(b)) => unify_terms(&Term::nil(), b, subst),
        };
    }

    let (short_tail, long_items, long_tail) = if items1.len() < items2.len() {
        (tail1, items2, tail2)
    } else {
        (tail2, items1, tail1)
    };
    let Some(short_tail) = short_tail else {
        return Err(UnificationError::ArityMismatch {
            left: items1.len(),
            right: items2.len(),
        });
    };
    let residue_items = long_items[shared..].to_vec();
    let residue = match long_tail {
        None => Term::list(residue_items),
        Some(t) => Term::list_with_tail(residue_items, t.clone()),
    };
    unify_terms(short_tail, &residue, subst)
}

/// Occurs check: does `name` occur in `term` once bindings are followed?
pub fn occurs(name: &str, term: &Term, subst: &Substitution) -> bool {
    match subst.resolve(term) {
        Term::Variable(v) => v == name,
        Term::Atom(_) | Term::Integer(_) | Term::Float(_) | Term::Str(_) => false,
        Term::Compound { args, .. } => args.iter().any(|a| occurs(name, a, subst)),
        Term::List { items, tail } => {
            items.iter().any(|i| occurs(name, i, subst))
                || tail.as_ref().is_some_and(|t| occurs(name, t, subst))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> Substitution {
        Substitution::new()
    }

    #[test]
    fn test_unify_variable_with_constant() {
        let s = unify(&Term::var("X"), &Term::atom("a"), &empty()).unwrap();
        assert_eq!(s.lookup("X"), Some(&Term::atom("a")));
    }

    #[test]
    fn test_unify_same_variable_adds_nothing() {
        let s = unify(&Term::var("X"), &Term::var("X"), &empty()).unwrap();
        assert!(s.is_empty());
    }

    #[test]
    fn test_unify_compounds_pairwise() {
        let t1 = Term::compound("f", vec![Term::var("X"), Term::atom("b")]);
        let t2 = Term::compound("f", vec![Term::atom("a"), Term::var("Y")]);
        let s = unify(&t1, &t2, &empty()).unwrap();
        assert_eq!(s.apply(&t1), s.apply(&t2));
    }

    #[test]
    fn test_functor_and_arity_clashes() {
        let f = Term::compound("f", vec![Term::atom("a")]);
        let g = Term::compound("g", vec![Term::atom("a")]);
        let f2 = Term::compound("f", vec![Term::atom("a"), Term::atom("b")]);
        assert!(matches!(
            unify(&f, &g, &empty()),
            Err(UnificationError::FunctorClash { .. })
        ));
        assert!(matches!(
            unify(&f, &f2, &empty()),
            Err(UnificationError::ArityMismatch { .. })
        ));
    }

    #[test]
    fn test_integer_float_do_not_unify() {
        assert!(unify(&Term::int(1), &Term::float(1.0), &empty()).is_err());
    }

    #[test]
    fn test_occurs_check_direct() {
        let fx = Term::compound("f", vec![Term::var("X")]);
        assert!(matches!(
            unify(&Term::var("X"), &fx, &empty()),
            Err(UnificationError::OccursCheck { .. })
        ));
    }

    #[test]
    fn test_occurs_check_through_bindings() {
        // X = Y first, then Y = f(X) must fail: the cycle is only visible
        // through the binding chain.
        let s = unify(&Term::var("X"), &Term::var("Y"), &empty()).unwrap();
        let fy = Term::compound("f", vec![Term::var("X")]);
        assert!(unify(&Term::var("Y"), &fy, &s).is_err());
    }

    #[test]
    fn test_list_cons_splits() {
        // [H | T] = [a, b]
        let pattern = Term::list_with_tail(vec![Term::var("H")], Term::var("T"));
        let list = Term::list(vec![Term::atom("a"), Term::atom("b")]);
        let s = unify(&pattern, &list, &empty()).unwrap();
        assert_eq!(s.apply(&Term::var("H")), Term::atom("a"));
        assert_eq!(s.apply(&Term::var("T")), Term::list(vec![Term::atom("b")]));
    }

    #[test]
    fn test_list_tail_binds_to_empty() {
        // [a | T] = [a]
        let pattern = Term::list_with_tail(vec![Term::atom("a")], Term::var("T"));
        let list = Term::list(vec![Term::atom("a")]);
        let s = unify(&pattern, &list, &empty()).unwrap();
        assert_eq!(s.apply(&Term::var("T")), Term::nil());
    }

    #[test]
    fn test_cons_never_matches_empty_list() {
        let pattern = Term::list_with_tail(vec![Term::var("H")], Term::var("T"));
        assert!(unify(&pattern, &Term::nil(), &empty()).is_err());
    }

    #[test]
    fn test_list_against_partial_list() {
        // [a, b | T1] = [a | T2] leaves T2 = [b | T1]
        let left = Term::list_with_tail(vec![Term::atom("a"), Term::atom("b")], Term::var("T1"));
        let right = Term::list_with_tail(vec![Term::atom("a")], Term::var("T2"));
        let s = unify(&left, &right, &empty()).unwrap();
        assert_eq!(
            s.apply(&Term::var("T2")),
            Term::list_with_tail(vec![Term::atom("b")], Term::var("T1"))
        );
    }

    #[test]
    fn test_unify_threads_existing_bindings() {
        let mut start = Substitution::new();
        start.bind("X", Term::atom("a"));
        // f(X) = f(Y) under {X -> a} must bind Y to a
        let s = unify(
            &Term::compound("f", vec![Term::var("X")]),
            &Term::compound("f", vec![Term::var("Y")]),
            &start,
        )
        .unwrap();
        assert_eq!(s.apply(&Term::var("Y")), Term::atom("a"));
    }
}
