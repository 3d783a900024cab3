//! The clause database: append-only storage with predicate and
//! first-argument indexing.

use crate::logic::{Clause, PredicateKey, Term};
use indexmap::IndexMap;

/// Index key derived from a clause head's first argument.
///
/// Atomic values key by value (floats by bit pattern so the key is hashable
/// and agrees with term equality), compounds by principal functor and arity.
/// Variables and lists yield no key: variable-headed clauses must stay
/// visible to every lookup, and list-headed clauses are reached through the
/// predicate index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArgKey {
    Atom(String),
    Integer(i64),
    Float(u64),
    Str(String),
    Functor(String, usize),
}

impl ArgKey {
    /// The key for a term, when it has one.
    pub fn of_term(term: &Term) -> Option<ArgKey> {
        match term {
            Term::Atom(name) => Some(ArgKey::Atom(name.clone())),
            Term::Integer(value) => Some(ArgKey::Integer(*value)),
            Term::Float(value) => Some(ArgKey::Float(value.to_bits())),
            Term::Str(value) => Some(ArgKey::Str(value.clone())),
            Term::Compound { functor, args } => {
                Some(ArgKey::Functor(functor.clone(), args.len()))
            }
            Term::Variable(_) | Term::List { .. } => None,
        }
    }
}

/// Ordered clause storage. Insertion order is resolution order; the indices
/// hold positions into the clause vector and never reorder them.
#[derive(Debug, Clone, Default)]
pub struct Database {
    clauses: Vec<Clause>,
    predicate_index: IndexMap<PredicateKey, Vec<usize>>,
    first_arg_index: IndexMap<(PredicateKey, ArgKey), Vec<usize>>,
    /// Clauses whose head first argument is a variable, per predicate.
    /// Always merged into first-argument lookups.
    var_head_index: IndexMap<PredicateKey, Vec<usize>>,
}

impl Database {
    pub fn new() -> Self {
        Database::default()
    }

    /// Append a clause, updating all indices. Clauses without a callable
    /// head are ignored.
    pub fn add_clause(&mut self, clause: Clause) {
        let Some(key) = clause.predicate_key() else {
            return;
        };
        let position = self.clauses.len();
        self.predicate_index.entry(key.clone()).or_default().push(position);

        if let Some(first_arg) = clause.head.first_arg() {
            match ArgKey::of_term(first_arg) {
                Some(arg_key) => self
                    .first_arg_index
                    .entry((key.clone(), arg_key))
                    .or_default()
                    .push(position),
                None => {
                    if first_arg.is_variable() {
                        self.var_head_index.entry(key).or_default().push(position);
                    }
                }
            }
        }

        self.clauses.push(clause);
    }

    /// Append a parsed program in input order.
    pub fn load_program(&mut self, clauses: Vec<Clause>) {
        for clause in clauses {
            self.add_clause(clause);
        }
    }

    /// Clauses that can possibly resolve `goal`, using first-argument
    /// indexing when the goal's first argument is bound to an indexable
    /// shape. The result preserves insertion order and always includes the
    /// variable-headed clauses of the predicate.
    pub fn matching_clauses(&self, goal: &Term) -> Vec<Clause> {
        let Some(key) = PredicateKey::of_term(goal) else {
            return Vec::new();
        };
        let arg_key = goal.first_arg().and_then(ArgKey::of_term);
        let Some(arg_key) = arg_key else {
            return self.clauses_for_key(&key);
        };

        let indexed = self
            .first_arg_index
            .get(&(key.clone(), arg_key))
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let var_headed = self
            .var_head_index
            .get(&key)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let mut positions: Vec<usize> = indexed.iter().chain(var_headed).copied().collect();
        positions.sort_unstable();
        positions.dedup();
        positions.into_iter().map(|p| self.clauses[p].clone()).collect()
    }

    /// All clauses of the goal's predicate in insertion order, bypassing
    /// first-argument indexing. The resolver uses this path when indexing is
    /// disabled; both paths must yield the same solutions.
    pub fn clauses_for_goal(&self, goal: &Term) -> Vec<Clause> {
        match PredicateKey::of_term(goal) {
            Some(key) => self.clauses_for_key(&key),
            None => Vec::new(),
        }
    }

    fn clauses_for_key(&self, key: &PredicateKey) -> Vec<Clause> {
        self.predicate_index
            .get(key)
            .map(|positions| positions.iter().map(|&p| self.clauses[p].clone()).collect())
            .unwrap_or_default()
    }

    /// Whether any clause defines the predicate.
    pub fn defines(&self, key: &PredicateKey) -> bool {
        self.predicate_index.contains_key(key)
    }

    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    pub fn predicate_count(&self) -> usize {
        self.predicate_index.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    pub fn clear(&mut self) {
        self.clauses.clear();
        self.predicate_index.clear();
        self.first_arg_index.clear();
        self.var_head_index.clear();
    }
}
