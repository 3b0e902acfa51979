//! Component-based, tree-bounded program synthesis.
//!
//! Given input/output examples and a multiset of building blocks, the
//! synthesizer compiles "some tree of at most `bound` applications over these
//! blocks fits every example" into one SMT query and decodes a program from
//! its model.

pub mod component;
pub mod error;
pub mod expr;
pub mod smt;
pub mod synth;

pub use component::{components, Component, Hole, Operator};
pub use error::{EvalError, SynthesisError};
pub use expr::{Constant, Expression, Leaf, Node, Parameter, ProgramVariable, Sort};
pub use synth::{
    ComponentMultiset, Synthesized, Synthesizer, TbsConfig, TestCase, TreeBoundedSynthesis,
};
