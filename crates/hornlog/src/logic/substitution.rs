//! Variable substitutions: the binding store threaded through resolution.

use super::term::Term;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A mapping from variable names to terms.
///
/// The binding graph is acyclic: unification's occurs check refuses any
/// binding that would close a cycle, so chain-following always terminates.
/// Equality is by key/value set; the insertion order kept by the map only
/// affects iteration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Substitution {
    map: IndexMap<String, Term>,
}

impl Substitution {
    /// Create an empty substitution.
    pub fn new() -> Self {
        Substitution {
            map: IndexMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Bind a variable to a term. Identity bindings (`X` to itself) are
    /// dropped so application cannot loop.
    pub fn bind(&mut self, name: impl Into<String>, term: Term) {
        let name = name.into();
        if let Term::Variable(v) = &term {
            if *v == name {
                return;
            }
        }
        self.map.insert(name, term);
    }

    /// The direct binding of a variable, if any.
    pub fn lookup(&self, name: &str) -> Option<&Term> {
        self.map.get(name)
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Term)> {
        self.map.iter()
    }

    /// Follow a variable's binding chain until a non-variable or an unbound
    /// variable is reached. Non-variable terms come back unchanged.
    pub fn resolve<'a>(&'a self, term: &'a Term) -> &'a Term {
        let mut current = term;
        while let Term::Variable(name) = current {
            match self.map.get(name) {
                Some(bound) => current = bound,
                None => break,
            }
        }
        current
    }

    /// Apply the substitution to a term, recursively replacing every bound
    /// variable. Returns a fresh term; the input is untouched.
    pub fn apply(&self, term: &Term) -> Term {
        match term {
            Term::Variable(name) => match self.map.get(name) {
                Some(bound) => self.apply(bound),
                None => term.clone(),
            },
            Term::Compound { functor, args } => Term::Compound {
                functor: functor.clone(),
                args: args.iter().map(|a| self.apply(a)).collect(),
            },
            Term::List { items, tail } => {
                let items = items.iter().map(|i| self.apply(i)).collect();
                match tail {
                    None => Term::list(items),
                    // list_with_tail splices a tail that resolved to a list
                    Some(t) => Term::list_with_tail(items, self.apply(t)),
                }
            }
            other => other.clone(),
        }
    }

    /// Apply the substitution to a sequence of terms.
    pub fn apply_all(&self, terms: &[Term]) -> Vec<Term> {
        terms.iter().map(|t| self.apply(t)).collect()
    }

    /// Compose with another substitution.
    ///
    /// The result `s` satisfies `s.apply(t) == other.apply(self.apply(t))`
    /// for every term `t`: bindings of `self` come first, bindings of
    /// `other` not shadowed by `self` are added with `self` applied to their
    /// images, and finally `other` is applied to every image.
    pub fn compose(&self, other: &Substitution) -> Substitution {
        let mut result = self.clone();
        for (name, term) in &other.map {
            if !result.map.contains_key(name) {
                let image = self.apply(term);
                result.bind(name.clone(), image);
            }
        }
        let mut finished = IndexMap::new();
        for (name, term) in result.map {
            let image = other.apply(&term);
            if matches!(&image, Term::Variable(v) if *v == name) {
                continue;
            }
            finished.insert(name, image);
        }
        Substitution { map: finished }
    }

    /// Restrict to the given variable names, fully applying the bindings.
    /// Unbound names are left out.
    pub fn restrict(&self, names: &[String]) -> Substitution {
        let mut restricted = Substitution::new();
        for name in names {
            if self.map.contains_key(name) {
                restricted.bind(name.clone(), self.apply(&Term::Variable(name.clone())));
            }
        }
        restricted
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, term)) in self.map.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name} -> {term}")?;
        }
        write!(f, "}}")
    }
}
