//! Solver-agnostic constraint terms and the solver interface the
//! synthesizer is written against, with a z3 backend.

pub mod smtlib;
pub mod solver;
pub mod terms;
pub mod z3_backend;

pub use solver::{Model, ModelValue, SatResult, SmtSolver};
pub use terms::{SmtSort, SmtTerm};
pub use z3_backend::{SolverConfig, Z3Solver};
