//! Solutions: query-variable bindings reported to the caller.

use crate::logic::{Substitution, Term};
use serde::Serialize;
use std::fmt;

/// One answer to a query: the final substitution restricted to the query's
/// variables, plus those variable names in declaration order to drive
/// printing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    variables: Vec<String>,
    bindings: Substitution,
}

impl Solution {
    pub(crate) fn new(variables: Vec<String>, bindings: Substitution) -> Self {
        Solution {
            variables,
            bindings,
        }
    }

    /// The query's variable names in declaration order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn bindings(&self) -> &Substitution {
        &self.bindings
    }

    /// The term a query variable was bound to, if it was bound at all.
    pub fn get(&self, name: &str) -> Option<&Term> {
        self.bindings.lookup(name)
    }

    /// True when the query succeeded without binding any of its variables.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bindings.is_empty() {
            return write!(f, "true");
        }
        let mut first = true;
        for name in &self.variables {
            if let Some(term) = self.bindings.lookup(name) {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{name} = {term}")?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_in_declaration_order() {
        let mut bindings = Substitution::new();
        bindings.bind("Y", Term::atom("b"));
        bindings.bind("X", Term::atom("a"));
        let solution = Solution::new(vec!["X".to_string(), "Y".to_string()], bindings);
        assert_eq!(solution.to_string(), "X = a, Y = b");
    }

    #[test]
    fn test_empty_solution_renders_true() {
        let solution = Solution::new(vec![], Substitution::new());
        assert!(solution.is_empty());
        assert_eq!(solution.to_string(), "true");
    }

    #[test]
    fn test_unbound_variables_are_skipped() {
        let mut bindings = Substitution::new();
        bindings.bind("X", Term::int(1));
        let solution = Solution::new(vec!["X".to_string(), "Unbound".to_string()], bindings);
        assert_eq!(solution.to_string(), "X = 1");
    }
}
