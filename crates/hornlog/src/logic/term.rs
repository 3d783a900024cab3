//! Terms: the value representation for Prolog data and goals.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A Prolog term.
///
/// Terms are immutable values. Lists keep their elements in a vector with an
/// optional explicit tail; the constructors maintain the invariant that a
/// list tail is never itself a list, so `[a | [b, c]]` and `[a, b, c]` have
/// one representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Term {
    /// Symbolic constant: `foo`, `'quoted atom'`
    Atom(String),
    /// Logical variable: `X`, `_Rest`
    Variable(String),
    /// Signed 64-bit integer
    Integer(i64),
    /// IEEE 754 double
    Float(f64),
    /// Double-quoted string
    Str(String),
    /// Compound term: `functor(arg1, ..., argN)`, arity >= 1
    Compound { functor: String, args: Vec<Term> },
    /// List: `[e1, ..., eN]` when `tail` is absent, `[e1, ..., eN | T]` otherwise
    List {
        items: Vec<Term>,
        tail: Option<Box<Term>>,
    },
}

impl Term {
    /// Create an atom term.
    pub fn atom(name: impl Into<String>) -> Self {
        Term::Atom(name.into())
    }

    /// Create a variable term.
    pub fn var(name: impl Into<String>) -> Self {
        Term::Variable(name.into())
    }

    /// Create an integer term.
    pub fn int(value: i64) -> Self {
        Term::Integer(value)
    }

    /// Create a float term.
    pub fn float(value: f64) -> Self {
        Term::Float(value)
    }

    /// Create a string term.
    pub fn string(value: impl Into<String>) -> Self {
        Term::Str(value.into())
    }

    /// Create a compound term.
    pub fn compound(functor: impl Into<String>, args: Vec<Term>) -> Self {
        Term::Compound {
            functor: functor.into(),
            args,
        }
    }

    /// Create a proper list.
    pub fn list(items: Vec<Term>) -> Self {
        Term::List { items, tail: None }
    }

    /// Create a list with an explicit tail, splicing list tails so that the
    /// tail of the result is never itself a list.
    pub fn list_with_tail(mut items: Vec<Term>, tail: Term) -> Self {
        match tail {
            Term::List {
                items: tail_items,
                tail: rest,
            } => {
                items.extend(tail_items);
                Term::List { items, tail: rest }
            }
            other if items.is_empty() => other,
            other => Term::List {
                items,
                tail: Some(Box::new(other)),
            },
        }
    }

    /// The empty list `[]`.
    pub fn nil() -> Self {
        Term::list(Vec::new())
    }

    /// Returns true if this term is a variable.
    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }

    /// Returns true if this term can head a clause.
    pub fn is_callable(&self) -> bool {
        matches!(self, Term::Atom(_) | Term::Compound { .. })
    }

    /// Returns true if this term contains no variables.
    pub fn is_ground(&self) -> bool {
        match self {
            Term::Variable(_) => false,
            Term::Atom(_) | Term::Integer(_) | Term::Float(_) | Term::Str(_) => true,
            Term::Compound { args, .. } => args.iter().all(Term::is_ground),
            Term::List { items, tail } => {
                items.iter().all(Term::is_ground)
                    && tail.as_ref().map_or(true, |t| t.is_ground())
            }
        }
    }

    /// Predicate name and arity of this term, when it has one.
    ///
    /// Atoms are arity-0 predicates; other non-compound shapes are not
    /// callable and yield `None`.
    pub fn functor_arity(&self) -> Option<(&str, usize)> {
        match self {
            Term::Atom(name) => Some((name.as_str(), 0)),
            Term::Compound { functor, args } => Some((functor.as_str(), args.len())),
            _ => None,
        }
    }

    /// First argument of a compound term, used by the clause indexer.
    pub fn first_arg(&self) -> Option<&Term> {
        match self {
            Term::Compound { args, .. } => args.first(),
            _ => None,
        }
    }

    /// Variable names in first-occurrence order, duplicates removed.
    ///
    /// Names starting with `_` (the anonymous variable and its parser-fresh
    /// instances) are not collected; they never appear in solutions.
    pub fn variables(&self) -> Vec<String> {
        let mut vars = Vec::new();
        self.collect_variables(&mut vars);
        vars
    }

    pub(crate) fn collect_variables(&self, vars: &mut Vec<String>) {
        match self {
            Term::Variable(name) => {
                if !name.starts_with('_') && !vars.iter().any(|v| v == name) {
                    vars.push(name.clone());
                }
            }
            Term::Compound { args, .. } => {
                for arg in args {
                    arg.collect_variables(vars);
                }
            }
            Term::List { items, tail } => {
                for item in items {
                    item.collect_variables(vars);
                }
                if let Some(t) = tail {
                    t.collect_variables(vars);
                }
            }
            _ => {}
        }
    }

    /// Rename every variable by appending `suffix`. Occurrences of the same
    /// variable stay shared because they keep the same renamed name.
    pub fn rename(&self, suffix: &str) -> Term {
        match self {
            Term::Variable(name) => Term::Variable(format!("{name}{suffix}")),
            Term::Compound { functor, args } => Term::Compound {
                functor: functor.clone(),
                args: args.iter().map(|a| a.rename(suffix)).collect(),
            },
            Term::List { items, tail } => Term::List {
                items: items.iter().map(|i| i.rename(suffix)).collect(),
                tail: tail.as_ref().map(|t| Box::new(t.rename(suffix))),
            },
            other => other.clone(),
        }
    }
}

// Structural equality; floats compare by bit pattern so that Eq and Hash
// agree and NaN does not break reflexivity.
impl PartialEq for Term {
    fn eq(&self, other: &Term) -> bool {
        match (self, other) {
            (Term::Atom(a), Term::Atom(b)) => a == b,
            (Term::Variable(a), Term::Variable(b)) => a == b,
            (Term::Integer(a), Term::Integer(b)) => a == b,
            (Term::Float(a), Term::Float(b)) => a.to_bits() == b.to_bits(),
            (Term::Str(a), Term::Str(b)) => a == b,
            (
                Term::Compound { functor: f1, args: a1 },
                Term::Compound { functor: f2, args: a2 },
            ) => f1 == f2 && a1 == a2,
            (
                Term::List { items: i1, tail: t1 },
                Term::List { items: i2, tail: t2 },
            ) => i1 == i2 && t1 == t2,
            _ => false,
        }
    }
}

impl Eq for Term {}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Term::Atom(name) => {
                state.write_u8(0);
                name.hash(state);
            }
            Term::Variable(name) => {
                state.write_u8(1);
                name.hash(state);
            }
            Term::Integer(value) => {
                state.write_u8(2);
                value.hash(state);
            }
            Term::Float(value) => {
                state.write_u8(3);
                value.to_bits().hash(state);
            }
            Term::Str(value) => {
                state.write_u8(4);
                value.hash(state);
            }
            Term::Compound { functor, args } => {
                state.write_u8(5);
                functor.hash(state);
                args.hash(state);
            }
            Term::List { items, tail } => {
                state.write_u8(6);
                items.hash(state);
                tail.hash(state);
            }
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Atom(name) => write!(f, "{name}"),
            Term::Variable(name) => write!(f, "{name}"),
            Term::Integer(value) => write!(f, "{value}"),
            // Debug formatting keeps the decimal point: 4.0, not 4
            Term::Float(value) => write!(f, "{value:?}"),
            Term::Str(value) => write_quoted(f, value),
            Term::Compound { functor, args } => {
                write!(f, "{functor}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Term::List { items, tail } => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                if let Some(t) = tail {
                    write!(f, " | {t}")?;
                }
                write!(f, "]")
            }
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in value.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            '\r' => write!(f, "\\r")?,
            other => write!(f, "{other}")?,
        }
    }
    write!(f, "\"")
}
