//! Robinson unification over terms, threading a substitution.

pub mod mgu;


pub use mgu::{occurs, unify, UnificationError, UnificationResult};
