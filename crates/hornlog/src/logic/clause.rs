//! Clauses: facts and rules of the knowledge base.

use super::term::Term;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Predicate identifier: functor name plus arity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PredicateKey {
    pub name: String,
    pub arity: usize,
}

impl PredicateKey {
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        PredicateKey {
            name: name.into(),
            arity,
        }
    }

    /// The predicate a term belongs to: atoms have arity 0, compounds their
    /// own arity, every other shape is not callable.
    pub fn of_term(term: &Term) -> Option<PredicateKey> {
        term.functor_arity()
            .map(|(name, arity)| PredicateKey::new(name, arity))
    }
}

impl fmt::Display for PredicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// A Horn clause: a head with a (possibly empty) body of goals.
///
/// A fact is a clause with an empty body: `parent(tom, bob).`
/// A rule carries goals: `grandparent(X, Z) :- parent(X, Y), parent(Y, Z).`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    pub head: Term,
    pub body: Vec<Term>,
}

impl Clause {
    /// Create a fact.
    pub fn fact(head: Term) -> Self {
        Clause {
            head,
            body: Vec::new(),
        }
    }

    /// Create a rule.
    pub fn rule(head: Term, body: Vec<Term>) -> Self {
        Clause { head, body }
    }

    pub fn is_fact(&self) -> bool {
        self.body.is_empty()
    }

    /// The predicate this clause defines.
    pub fn predicate_key(&self) -> Option<PredicateKey> {
        PredicateKey::of_term(&self.head)
    }

    /// Rename every variable in the clause by appending `suffix`.
    ///
    /// Occurrences of the same variable in head and body map to the same
    /// renamed variable, so sharing is preserved exactly.
    pub fn rename(&self, suffix: &str) -> Clause {
        Clause {
            head: self.head.rename(suffix),
            body: self.body.iter().map(|g| g.rename(suffix)).collect(),
        }
    }

    /// Variable names of head and body in first-occurrence order.
    pub fn variables(&self) -> Vec<String> {
        let mut vars = Vec::new();
        self.head.collect_variables(&mut vars);
        for goal in &self.body {
            goal.collect_variables(&mut vars);
        }
        vars
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head)?;
        if !self.body.is_empty() {
            write!(f, " :- ")?;
            for (i, goal) in self.body.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{goal}")?;
            }
        }
        write!(f, ".")
    }
}
