use crate::language::location::SourceLocation;
use crate::runtime::error::RuntimeError;

/// The one diagnostic format for static errors, used by both the lexer and
/// the parser: `ERROR file:line:column: message`, one per line on stderr.
pub fn report_error(location: &SourceLocation, message: &str) {
    eprintln!("ERROR {location}: {message}");
}

pub fn report_runtime_error(error: &RuntimeError) {
    eprintln!("runtime error: {error}");
}

pub fn report_exit_summary(error_count: usize) {
    let noun = if error_count == 1 { "error" } else { "errors" };
    eprintln!("exiting with {error_count} {noun}");
}
