//! The SLD resolver: depth-first proof search with backtracking, cut,
//! negation as failure, and a streaming solution callback.

use crate::builtins::{BuiltinSink, BuiltinTable};
use crate::database::Database;
use crate::error::Result;
use crate::logic::{Substitution, Term};
use crate::unification::unify;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide monotonic counter backing clause renaming, cut barriers,
/// and fresh variable generation. Atomic so that resolver re-entry (from
/// `\+`) and concurrent queries never reuse an id.
static NEXT_ID: AtomicU64 = AtomicU64::new(0);

pub(crate) fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Resolver tuning knobs.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Recursion depth at which a branch silently fails (spec default 1000).
    pub max_depth: usize,
    /// Use the first-argument index for clause lookup. Disabling it falls
    /// back to the full predicate scan; both must yield the same solutions.
    pub first_arg_indexing: bool,
    /// Print depth-indented resolution events to stderr.
    pub trace: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            max_depth: 1000,
            first_arg_indexing: true,
            trace: false,
        }
    }
}

/// A goal prepared for execution. Cut literals are tagged at clause
/// instantiation time with the barrier (clause-call frame) they commit to,
/// so a `!` reached through any nesting still prunes exactly the right
/// choice points.
#[derive(Debug, Clone)]
enum Goal {
    Call(Term),
    Cut(u64),
}

/// Outcome of resolving a goal list. Replaces the mutable
/// cut/termination flags of a callback design: cut scoping is explicit in
/// the value the recursion returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Solved {
    /// Subtree exhausted without a solution.
    Fail,
    /// Subtree exhausted; at least one solution was reported.
    Success,
    /// A cut fired. Every clause loop the signal crosses stops iterating;
    /// the loop whose frame equals `barrier` absorbs the signal and demotes
    /// it to `Success`/`Fail` according to `found`.
    Cut { barrier: u64, found: bool },
    /// The solution callback asked for termination.
    Aborted,
}

/// SLD proof search over a goal list against a read-only database.
pub struct Resolver<'a> {
    database: &'a Database,
    config: ResolverConfig,
    out: Box<dyn Write + 'a>,
}

impl<'a> Resolver<'a> {
    pub fn new(database: &'a Database) -> Self {
        Resolver::with_config(database, ResolverConfig::default())
    }

    pub fn with_config(database: &'a Database, config: ResolverConfig) -> Self {
        Resolver {
            database,
            config,
            out: Box::new(std::io::stdout()),
        }
    }

    /// Redirect `write/1` output, mainly for tests.
    pub fn with_output(mut self, out: Box<dyn Write + 'a>) -> Self {
        self.out = out;
        self
    }

    /// Prove the goal conjunction, invoking `sink` with the full bindings
    /// of every solution in depth-first order. The search unwinds promptly
    /// when `sink` returns false.
    pub fn solve(
        &mut self,
        goals: &[Term],
        bindings: &Substitution,
        sink: &mut dyn FnMut(&Substitution) -> bool,
    ) -> Result<()> {
        let prepared = prepare_goals(goals, next_id());
        self.solve_goals(&prepared, bindings, 0, sink)?;
        Ok(())
    }

    fn solve_goals(
        &mut self,
        goals: &[Goal],
        bindings: &Substitution,
        depth: usize,
        sink: &mut dyn FnMut(&Substitution) -> bool,
    ) -> Result<Solved> {
        if depth > self.config.max_depth {
            self.trace(depth, "depth limit exceeded, failing branch");
            return Ok(Solved::Fail);
        }

        let Some((first, rest)) = goals.split_first() else {
            return Ok(if sink(bindings) {
                Solved::Success
            } else {
                Solved::Aborted
            });
        };

        match first {
            Goal::Cut(barrier) => match self.solve_goals(rest, bindings, depth, sink)? {
                Solved::Fail => Ok(Solved::Cut {
                    barrier: *barrier,
                    found: false,
                }),
                Solved::Success => Ok(Solved::Cut {
                    barrier: *barrier,
                    found: true,
                }),
                // a later cut in the same body already carries this barrier
                signal @ Solved::Cut { .. } => Ok(signal),
                Solved::Aborted => Ok(Solved::Aborted),
            },
            Goal::Call(term) => {
                let goal = bindings.apply(term);

                if let Term::Compound { functor, args } = &goal {
                    if functor == "\\+" && args.len() == 1 {
                        return self.solve_negation(&args[0], rest, bindings, depth, sink);
                    }
                }

                if let Some((name, arity)) = goal.functor_arity() {
                    if let Some(handler) = BuiltinTable::standard().get(name, arity) {
                        self.trace(depth, &format!("builtin {goal}"));
                        return self.solve_builtin(handler, &goal, rest, bindings, depth, sink);
                    }
                }

                self.solve_clauses(&goal, rest, bindings, depth, sink)
            }
        }
    }

    /// Negation as failure: prove the inner goal up to its first solution
    /// with the nested bindings discarded.
    fn solve_negation(
        &mut self,
        inner: &Term,
        rest: &[Goal],
        bindings: &Substitution,
        depth: usize,
        sink: &mut dyn FnMut(&Substitution) -> bool,
    ) -> Result<Solved> {
        self.trace(depth, &format!("negation \\+ {inner}"));
        let prepared = prepare_goals(std::slice::from_ref(inner), next_id());
        let mut found = false;
        self.solve_goals(&prepared, bindings, depth + 1, &mut |_: &Substitution| {
            found = true;
            false
        })?;
        if found {
            Ok(Solved::Fail)
        } else {
            self.solve_goals(rest, bindings, depth, sink)
        }
    }

    fn solve_builtin(
        &mut self,
        handler: crate::builtins::BuiltinHandler,
        goal: &Term,
        rest: &[Goal],
        bindings: &Substitution,
        depth: usize,
        sink: &mut dyn FnMut(&Substitution) -> bool,
    ) -> Result<Solved> {
        let no_args: [Term; 0] = [];
        let args: &[Term] = match goal {
            Term::Compound { args, .. } => args,
            _ => &no_args,
        };

        let mut gsink = GoalSink {
            resolver: self,
            rest,
            depth,
            sink,
            pending: None,
            found: false,
        };
        handler(args, bindings, &mut gsink)?;
        let GoalSink { pending, found, .. } = gsink;

        if let Some(signal) = pending {
            return Ok(signal);
        }
        Ok(if found { Solved::Success } else { Solved::Fail })
    }

    fn solve_clauses(
        &mut self,
        goal: &Term,
        rest: &[Goal],
        bindings: &Substitution,
        depth: usize,
        sink: &mut dyn FnMut(&Substitution) -> bool,
    ) -> Result<Solved> {
        let candidates = if self.config.first_arg_indexing {
            self.database.matching_clauses(goal)
        } else {
            self.database.clauses_for_goal(goal)
        };
        self.trace(
            depth,
            &format!("goal {goal}: {} candidate clause(s)", candidates.len()),
        );

        let mut found = false;
        for clause in candidates {
            let frame = next_id();
            let renamed = clause.rename(&format!("_{depth}_{frame}"));

            let Ok(extended) = unify(goal, &renamed.head, bindings) else {
                continue;
            };
            self.trace(depth, &format!("unified with head {}", renamed.head));

            let mut new_goals = prepare_goals(&renamed.body, frame);
            new_goals.extend_from_slice(rest);

            match self.solve_goals(&new_goals, &extended, depth + 1, sink)? {
                Solved::Fail => {}
                Solved::Success => found = true,
                Solved::Cut { barrier, found: cut_found } => {
                    found |= cut_found;
                    if barrier == frame {
                        // the cut belongs to this clause: drop the remaining
                        // alternatives and report a plain outcome
                        return Ok(if found { Solved::Success } else { Solved::Fail });
                    }
                    // a cut from an enclosing clause body: stop here too and
                    // let the owning loop absorb it
                    return Ok(Solved::Cut { barrier, found });
                }
                Solved::Aborted => return Ok(Solved::Aborted),
            }
        }

        Ok(if found { Solved::Success } else { Solved::Fail })
    }

    fn trace(&self, depth: usize, message: &str) {
        if self.config.trace {
            eprintln!("{:indent$}{message}", "", indent = depth * 2);
        }
    }
}

fn prepare_goals(terms: &[Term], barrier: u64) -> Vec<Goal> {
    terms
        .iter()
        .map(|t| match t {
            Term::Atom(name) if name == "!" => Goal::Cut(barrier),
            other => Goal::Call(other.clone()),
        })
        .collect()
}

/// Adapter handed to built-in handlers: resolves the remaining goals for
/// every solution the handler emits and records any cut/abort signal that
/// must outlive the handler call.
struct GoalSink<'r, 'db> {
    resolver: &'r mut Resolver<'db>,
    rest: &'r [Goal],
    depth: usize,
    sink: &'r mut dyn FnMut(&Substitution) -> bool,
    pending: Option<Solved>,
    found: bool,
}

impl BuiltinSink for GoalSink<'_, '_> {
    fn solution(&mut self, bindings: Substitution) -> Result<bool> {
        match self
            .resolver
            .solve_goals(self.rest, &bindings, self.depth + 1, &mut *self.sink)?
        {
            Solved::Fail => Ok(true),
            Solved::Success => {
                self.found = true;
                Ok(true)
            }
            Solved::Cut { barrier, found } => {
                self.found |= found;
                self.pending = Some(Solved::Cut {
                    barrier,
                    found: self.found,
                });
                Ok(false)
            }
            Solved::Aborted => {
                self.pending = Some(Solved::Aborted);
                Ok(false)
            }
        }
    }

    fn out(&mut self) -> &mut dyn Write {
        self.resolver.out.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_program, parse_query};

    fn database(program: &str) -> Database {
        let mut db = Database::new();
        db.load_program(parse_program(program).unwrap());
        db
    }

    fn run(db: &Database, query: &str) -> Vec<Substitution> {
        run_config(db, query, ResolverConfig::default())
    }

    fn run_config(db: &Database, query: &str, config: ResolverConfig) -> Vec<Substitution> {
        let goals = parse_query(query).unwrap();
        let mut resolver = Resolver::with_config(db, config);
        let mut collected = Vec::new();
        resolver
            .solve(&goals, &Substitution::new(), &mut |bindings| {
                collected.push(bindings.clone());
                true
            })
            .unwrap();
        collected
    }

    fn values_of(solutions: &[Substitution], name: &str) -> Vec<Term> {
        solutions
            .iter()
            .map(|s| s.apply(&Term::var(name)))
            .collect()
    }

    #[test]
    fn test_single_fact() {
        let db = database("parent(tom, bob).");
        let solutions = run(&db, "parent(tom, X)");
        assert_eq!(values_of(&solutions, "X"), vec![Term::atom("bob")]);
    }

    #[test]
    fn test_conjunction_through_rule() {
        let db = database(
            "parent(tom, bob). parent(bob, ann).
             grandparent(X, Z) :- parent(X, Y), parent(Y, Z).",
        );
        let solutions = run(&db, "grandparent(tom, Z)");
        assert_eq!(values_of(&solutions, "Z"), vec![Term::atom("ann")]);
    }

    #[test]
    fn test_cut_commits_to_first_solution() {
        let db = database("p(a). p(b). q(X) :- p(X), !.");
        let solutions = run(&db, "q(X)");
        assert_eq!(values_of(&solutions, "X"), vec![Term::atom("a")]);
    }

    #[test]
    fn test_cut_prunes_on_failure_too() {
        // after the cut commits to p(a), the trailing fail must not retry
        // p(b) or any other clause of q
        let db = database("p(a). p(b). q(X) :- p(X), !, fail. q(z).");
        let solutions = run(&db, "q(X)");
        assert!(solutions.is_empty());
    }

    #[test]
    fn test_cut_is_local_to_its_clause() {
        let db = database(
            "p(a). p(b).
             r(c). r(d).
             first(Y) :- r(Y), !.
             pair(X, Y) :- p(X), first(Y).",
        );
        // the cut inside first/1 must not prune p/1's choice points
        let solutions = run(&db, "pair(X, Y)");
        let xs = values_of(&solutions, "X");
        let ys = values_of(&solutions, "Y");
        assert_eq!(xs, vec![Term::atom("a"), Term::atom("b")]);
        assert_eq!(ys, vec![Term::atom("c"), Term::atom("c")]);
    }

    #[test]
    fn test_cut_after_builtin_choice_point() {
        let db = database("q(X) :- member(X, [1, 2, 3]), !.");
        let solutions = run(&db, "q(X)");
        assert_eq!(values_of(&solutions, "X"), vec![Term::int(1)]);
    }

    #[test]
    fn test_negation_as_failure() {
        let db = database("fruit(apple). fruit(pear).");
        assert_eq!(run(&db, "\\+ fruit(carrot)").len(), 1);
        assert!(run(&db, "\\+ fruit(apple)").is_empty());
    }

    #[test]
    fn test_negation_discards_inner_bindings() {
        let db = database("p(a).");
        let solutions = run(&db, "\\+ fail, p(X)");
        assert_eq!(values_of(&solutions, "X"), vec![Term::atom("a")]);
        // X must not leak from the negated proof
        let solutions = run(&db, "\\+ \\+ p(X)");
        assert_eq!(solutions.len(), 1);
        assert!(solutions[0].is_empty());
    }

    #[test]
    fn test_unknown_predicate_fails_quietly() {
        let db = database("p(a).");
        assert!(run(&db, "missing(X)").is_empty());
    }

    #[test]
    fn test_depth_guard_fails_branch_only() {
        let db = database("count :- count. a :- count. a.");
        let config = ResolverConfig {
            max_depth: 64,
            ..ResolverConfig::default()
        };
        // the unbounded recursion bottoms out silently
        assert!(run_config(&db, "count", config.clone()).is_empty());
        // and a sibling clause of a guarded branch still answers
        assert_eq!(run_config(&db, "a", config).len(), 1);
    }

    #[test]
    fn test_early_termination_stops_promptly() {
        let db = database("p(a). p(b). p(c).");
        let goals = parse_query("p(X)").unwrap();
        let mut resolver = Resolver::new(&db);
        let mut seen = 0;
        resolver
            .solve(&goals, &Substitution::new(), &mut |_| {
                seen += 1;
                false
            })
            .unwrap();
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_solution_order_is_deterministic() {
        let db = database(
            "edge(a, b). edge(a, c). edge(b, d).
             reach(X, Y) :- edge(X, Y).
             reach(X, Z) :- edge(X, Y), reach(Y, Z).",
        );
        let first = values_of(&run(&db, "reach(a, W)"), "W");
        let second = values_of(&run(&db, "reach(a, W)"), "W");
        assert_eq!(first, second);
        assert_eq!(
            first,
            vec![Term::atom("b"), Term::atom("c"), Term::atom("d")]
        );
    }

    #[test]
    fn test_indexing_on_and_off_agree() {
        let db = database(
            "p(a, 1). p(b, 2). p(X, 0) :- q(X). q(c).
             r(Y) :- p(a, Y).
             r(Y) :- p(c, Y).",
        );
        let indexed = run_config(&db, "r(Y)", ResolverConfig::default());
        let scanned = run_config(
            &db,
            "r(Y)",
            ResolverConfig {
                first_arg_indexing: false,
                ..ResolverConfig::default()
            },
        );
        assert_eq!(values_of(&indexed, "Y"), values_of(&scanned, "Y"));
        assert_eq!(values_of(&indexed, "Y"), vec![Term::int(1), Term::int(0)]);
    }

    #[test]
    fn test_write_goes_to_configured_output() {
        let db = database("greet(X) :- write(hello), nl, write(X).");
        let goals = parse_query("greet(world)").unwrap();
        let mut buffer = Vec::new();
        {
            let mut resolver = Resolver::new(&db).with_output(Box::new(&mut buffer));
            resolver
                .solve(&goals, &Substitution::new(), &mut |_| true)
                .unwrap();
        }
        assert_eq!(String::from_utf8(buffer).unwrap(), "hello\nworld");
    }

    #[test]
    fn test_occurs_check_blocks_cyclic_query() {
        let db = Database::new();
        assert!(run(&db, "X = f(X)").is_empty());
    }
}
