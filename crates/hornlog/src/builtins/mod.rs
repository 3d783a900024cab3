//! The built-in predicate library.
//!
//! Built-ins replace clause lookup for registered `(name, arity)` pairs and
//! are dispatched by the resolver before the database is consulted. A
//! handler receives the goal's arguments (already carrying the caller's
//! bindings), the current substitution, and a sink through which it emits
//! each solution; the sink's `false` return demands early termination.
//!
//! Two control constructs live outside this table's reach: the resolver
//! interprets `!` before dispatch (cut needs the clause barrier) and
//! `\+/1` itself (negation needs resolver re-entry). The `!/0` entry here
//! only backs the degenerate meta-call case, where it succeeds once.

pub mod arith;
pub mod io;
pub mod lists;
pub mod types;

use crate::error::Result;
use crate::logic::{Substitution, Term};
use crate::unification::unify;
use indexmap::IndexMap;
use std::io::Write;
use std::sync::OnceLock;

/// Receiver for built-in solutions, plus the session output stream used by
/// the I-O predicates.
pub trait BuiltinSink {
    /// Report one solution. Returns false when the caller wants no more.
    fn solution(&mut self, bindings: Substitution) -> Result<bool>;

    /// The output stream `write/1` and `nl/0` print to.
    fn out(&mut self) -> &mut dyn Write;
}

/// A built-in predicate implementation.
pub type BuiltinHandler = fn(&[Term], &Substitution, &mut dyn BuiltinSink) -> Result<bool>;

/// Immutable `(name, arity)`-keyed handler table, built once per process.
pub struct BuiltinTable {
    handlers: IndexMap<String, BuiltinHandler>,
}

impl BuiltinTable {
    /// The process-wide table with the standard library registered.
    pub fn standard() -> &'static BuiltinTable {
        static TABLE: OnceLock<BuiltinTable> = OnceLock::new();
        TABLE.get_or_init(|| {
            let mut table = BuiltinTable {
                handlers: IndexMap::new(),
            };

            // Control
            table.register("true", 0, builtin_true);
            table.register("fail", 0, builtin_fail);
            table.register("!", 0, builtin_true);

            // Unification and structural comparison
            table.register("=", 2, builtin_unify);
            table.register("\\=", 2, builtin_not_unify);
            table.register("==", 2, builtin_structural_eq);
            table.register("\\==", 2, builtin_structural_neq);

            // Arithmetic
            table.register("is", 2, arith::builtin_is);
            table.register("<", 2, arith::builtin_lt);
            table.register(">", 2, arith::builtin_gt);
            table.register("=<", 2, arith::builtin_le);
            table.register(">=", 2, arith::builtin_ge);

            // Lists
            table.register("append", 3, lists::builtin_append);
            table.register("member", 2, lists::builtin_member);
            table.register("length", 2, lists::builtin_length);

            // Type checks
            table.register("var", 1, types::builtin_var);
            table.register("nonvar", 1, types::builtin_nonvar);
            table.register("atom", 1, types::builtin_atom);
            table.register("integer", 1, types::builtin_integer);
            table.register("float", 1, types::builtin_float);
            table.register("number", 1, types::builtin_number);
            table.register("compound", 1, types::builtin_compound);
            table.register("ground", 1, types::builtin_ground);

            // I-O
            table.register("write", 1, io::builtin_write);
            table.register("nl", 0, io::builtin_nl);

            table
        })
    }

    fn register(&mut self, name: &str, arity: usize, handler: BuiltinHandler) {
        self.handlers.insert(Self::key(name, arity), handler);
    }

    /// Look up the handler for a predicate.
    pub fn get(&self, name: &str, arity: usize) -> Option<BuiltinHandler> {
        self.handlers.get(&Self::key(name, arity)).copied()
    }

    pub fn contains(&self, name: &str, arity: usize) -> bool {
        self.handlers.contains_key(&Self::key(name, arity))
    }

    fn key(name: &str, arity: usize) -> String {
        format!("{name}/{arity}")
    }
}

fn builtin_true(_args: &[Term], bindings: &Substitution, sink: &mut dyn BuiltinSink) -> Result<bool> {
    sink.solution(bindings.clone())
}

fn builtin_fail(
    _args: &[Term],
    _bindings: &Substitution,
    _sink: &mut dyn BuiltinSink,
) -> Result<bool> {
    Ok(true)
}

fn builtin_unify(args: &[Term], bindings: &Substitution, sink: &mut dyn BuiltinSink) -> Result<bool> {
    match unify(&args[0], &args[1], bindings) {
        Ok(unified) => sink.solution(unified),
        Err(_) => Ok(true),
    }
}

fn builtin_not_unify(
    args: &[Term],
    bindings: &Substitution,
    sink: &mut dyn BuiltinSink,
) -> Result<bool> {
    if unify(&args[0], &args[1], bindings).is_err() {
        sink.solution(bindings.clone())
    } else {
        Ok(true)
    }
}

fn builtin_structural_eq(
    args: &[Term],
    bindings: &Substitution,
    sink: &mut dyn BuiltinSink,
) -> Result<bool> {
    if bindings.apply(&args[0]) == bindings.apply(&args[1]) {
        sink.solution(bindings.clone())
    } else {
        Ok(true)
    }
}

fn builtin_structural_neq(
    args: &[Term],
    bindings: &Substitution,
    sink: &mut dyn BuiltinSink,
) -> Result<bool> {
    if bindings.apply(&args[0]) != bindings.apply(&args[1]) {
        sink.solution(bindings.clone())
    } else {
        Ok(true)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Sink that collects solutions and optionally stops after a limit.
    pub struct CollectSink {
        pub solutions: Vec<Substitution>,
        pub limit: Option<usize>,
        pub output: Vec<u8>,
    }

    impl CollectSink {
        pub fn new() -> Self {
            CollectSink {
                solutions: Vec::new(),
                limit: None,
                output: Vec::new(),
            }
        }

        pub fn with_limit(limit: usize) -> Self {
            CollectSink {
                solutions: Vec::new(),
                limit: Some(limit),
                output: Vec::new(),
            }
        }
    }

    impl BuiltinSink for CollectSink {
        fn solution(&mut self, bindings: Substitution) -> Result<bool> {
            self.solutions.push(bindings);
            Ok(self.limit.map_or(true, |l| self.solutions.len() < l))
        }

        fn out(&mut self) -> &mut dyn Write {
            &mut self.output
        }
    }
}
