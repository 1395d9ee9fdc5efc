//! Conformance test infrastructure for the Hydrogen interpreter
//!
//! Every test case is a script whose expected stdout is embedded in its own
//! comments. A case passes when the interpreter prints exactly those lines and
//! exits with status 0 before the deadline.

pub mod discovery;
pub mod expectation;
pub mod harness;
pub mod reporter;
pub mod runner;
pub mod validate;

pub use harness::Harness;
pub use reporter::ConsoleReporter;
pub use runner::ProcessRunner;
