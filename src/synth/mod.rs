pub mod config;
pub mod decode;
pub mod multiset;
pub mod skeleton;
pub mod tree_bounded;

use std::collections::HashMap;
use std::fmt;

use crate::error::SynthesisError;
use crate::expr::{Constant, Expression, Parameter, ProgramVariable};

pub use config::TbsConfig;
pub use multiset::ComponentMultiset;
pub use tree_bounded::TreeBoundedSynthesis;

/// An input assignment paired with the output the program must produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    id: Option<String>,
    inputs: HashMap<ProgramVariable, Constant>,
    output: Constant,
}

impl TestCase {
    pub fn of_assignment(inputs: HashMap<ProgramVariable, Constant>, output: Constant) -> Self {
        Self {
            id: None,
            inputs,
            output,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn input(&self, var: &ProgramVariable) -> Option<Constant> {
        self.inputs.get(var).copied()
    }

    pub fn output(&self) -> Constant {
        self.output
    }

    /// Whether `expr` produces the expected output on this input.
    pub fn accepts(&self, expr: &Expression, parameters: &HashMap<Parameter, Constant>) -> bool {
        expr.evaluate(&self.inputs, parameters)
            .map(|v| v == self.output)
            .unwrap_or(false)
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(id) = self.id() {
            return f.write_str(id);
        }

        let mut inputs: Vec<_> = self.inputs.iter().collect();
        inputs.sort();
        write!(f, "(")?;
        for (idx, (var, val)) in inputs.into_iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={val}", var.name())?;
        }
        write!(f, ") -> {}", self.output)
    }
}

/// A synthesized program and the values the solver chose for its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesized {
    pub expression: Expression,
    pub parameters: HashMap<Parameter, Constant>,
}

impl Synthesized {
    /// The program with parameters replaced by their values.
    pub fn semantics(&self) -> Expression {
        self.expression.instantiate(&self.parameters)
    }
}

impl fmt::Display for Synthesized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)?;

        let mut params: Vec<_> = self.parameters.iter().collect();
        params.sort();
        for (p, v) in params {
            write!(f, " [{} = {v}]", p.name())?;
        }

        Ok(())
    }
}

/// Something that can turn a test suite and a palette of components into
/// a program. `Ok(None)` means no program exists within the synthesizer's
/// bounds.
pub trait Synthesizer {
    fn synthesize(
        &mut self,
        tests: &[TestCase],
        components: &ComponentMultiset,
    ) -> Result<Option<Synthesized>, SynthesisError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::components;

    #[test]
    fn accepts_checks_the_expected_output() {
        let x = ProgramVariable::int("x");
        let test = TestCase::of_assignment(HashMap::from([(x.clone(), Constant::Int(2))]), Constant::Int(-2))
            .with_id("neg");
        let neg = Expression::apply(components::minus(), [Expression::leaf(x.clone())]);

        assert!(test.accepts(&neg, &HashMap::new()));
        assert!(!test.accepts(&Expression::leaf(x), &HashMap::new()));
        assert_eq!(test.id(), Some("neg"));
        assert_eq!(test.to_string(), "neg");
    }

    #[test]
    fn display_without_id_lists_inputs() {
        let test = TestCase::of_assignment(
            HashMap::from([
                (ProgramVariable::int("y"), Constant::Int(2)),
                (ProgramVariable::int("x"), Constant::Int(1)),
            ]),
            Constant::Int(3),
        );

        assert_eq!(test.to_string(), "(x=1, y=2) -> 3");
    }
}
