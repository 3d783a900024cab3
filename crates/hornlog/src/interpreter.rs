//! The interpreter façade: owns the database and drives queries.

use crate::database::Database;
use crate::error::Result;
use crate::logic::{Substitution, Term};
use crate::parser::{parse_program, parse_query};
use crate::resolver::{Resolver, ResolverConfig};
use crate::solution::Solution;
use std::fs;
use std::path::Path;

/// Database size counters, for the `:stats` directive and callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterStats {
    pub clause_count: usize,
    pub predicate_count: usize,
}

/// A loaded knowledge base plus resolver configuration.
///
/// ```
/// use hornlog::Interpreter;
///
/// let mut interpreter = Interpreter::new();
/// interpreter.load_str("parent(tom, bob).").unwrap();
/// let solutions = interpreter.query("parent(tom, X)").unwrap();
/// assert_eq!(solutions[0].to_string(), "X = bob");
/// ```
#[derive(Debug, Default)]
pub struct Interpreter {
    database: Database,
    config: ResolverConfig,
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter {
            database: Database::new(),
            config: ResolverConfig::default(),
        }
    }

    pub fn with_config(config: ResolverConfig) -> Self {
        Interpreter {
            database: Database::new(),
            config,
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn config_mut(&mut self) -> &mut ResolverConfig {
        &mut self.config
    }

    /// Parse program text and append its clauses. Returns how many clauses
    /// were added.
    pub fn load_str(&mut self, source: &str) -> Result<usize> {
        let clauses = parse_program(source)?;
        let added = clauses.len();
        self.database.load_program(clauses);
        Ok(added)
    }

    /// Consult a file.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let source = fs::read_to_string(path)?;
        self.load_str(&source)
    }

    /// Run a query and collect every solution in depth-first order.
    pub fn query(&self, text: &str) -> Result<Vec<Solution>> {
        let mut solutions = Vec::new();
        self.query_streaming(text, |solution| {
            solutions.push(solution.clone());
            true
        })?;
        Ok(solutions)
    }

    /// Run a query, handing each solution to `callback` as it is found.
    /// Resolution stops as soon as the callback returns false.
    pub fn query_streaming(
        &self,
        text: &str,
        mut callback: impl FnMut(&Solution) -> bool,
    ) -> Result<()> {
        let goals = parse_query(text)?;
        let variables = query_variables(&goals);
        let mut resolver = Resolver::with_config(&self.database, self.config.clone());
        resolver.solve(&goals, &Substitution::new(), &mut |bindings| {
            let solution = Solution::new(variables.clone(), bindings.restrict(&variables));
            callback(&solution)
        })
    }

    /// True when the query has at least one solution. Stops at the first.
    pub fn ask(&self, text: &str) -> Result<bool> {
        let mut provable = false;
        self.query_streaming(text, |_| {
            provable = true;
            false
        })?;
        Ok(provable)
    }

    pub fn clear(&mut self) {
        self.database.clear();
    }

    pub fn stats(&self) -> InterpreterStats {
        InterpreterStats {
            clause_count: self.database.clause_count(),
            predicate_count: self.database.predicate_count(),
        }
    }
}

/// Variables of a goal conjunction in first-occurrence order.
fn query_variables(goals: &[Term]) -> Vec<String> {
    let mut variables = Vec::new();
    for goal in goals {
        goal.collect_variables(&mut variables);
    }
    variables
}
