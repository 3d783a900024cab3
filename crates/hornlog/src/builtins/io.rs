//! I-O built-ins: `write/1` and `nl/0`.

use super::BuiltinSink;
use crate::error::Result;
use crate::logic::{Substitution, Term};
use std::io::Write as _;

/// `write/1`: print the fully-substituted argument in canonical syntax.
/// Write errors propagate to the host.
pub fn builtin_write(args: &[Term], bindings: &Substitution, sink: &mut dyn BuiltinSink) -> Result<bool> {
    let term = bindings.apply(&args[0]);
    write!(sink.out(), "{term}").map_err(crate::error::EngineError::from)?;
    sink.solution(bindings.clone())
}

/// `nl/0`: print a newline.
pub fn builtin_nl(_args: &[Term], bindings: &Substitution, sink: &mut dyn BuiltinSink) -> Result<bool> {
    writeln!(sink.out()).map_err(crate::error::EngineError::from)?;
    sink.solution(bindings.clone())
}
