use log::{debug, info, trace};

use crate::error::SynthesisError;
use crate::smt::{smtlib, Model, SatResult, SmtSolver};
use crate::synth::config::TbsConfig;
use crate::synth::decode::decode;
use crate::synth::multiset::ComponentMultiset;
use crate::synth::skeleton::{encode, Skeleton};
use crate::synth::{Synthesized, Synthesizer, TestCase};

/// Tree-bounded synthesis: one encoding, one solver query and one decoding
/// per call.
pub struct TreeBoundedSynthesis<S> {
    solver: S,
    config: TbsConfig,
}

impl<S: SmtSolver> TreeBoundedSynthesis<S> {
    pub fn new(solver: S, config: TbsConfig) -> Self {
        Self { solver, config }
    }

    pub fn config(&self) -> &TbsConfig {
        &self.config
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// The SMT-LIB script `synthesize` would hand to the solver.
    pub fn query(
        &self,
        tests: &[TestCase],
        components: &ComponentMultiset,
    ) -> Result<String, SynthesisError> {
        self.check_patterns()?;
        let skeleton = encode(tests, components, &self.config)?;

        Ok(render(&skeleton))
    }

    pub fn synthesize(
        &mut self,
        tests: &[TestCase],
        components: &ComponentMultiset,
    ) -> Result<Option<Synthesized>, SynthesisError> {
        self.check_patterns()?;
        let skeleton = encode(tests, components, &self.config)?;
        trace!("Synthesis query:\n{}", render(&skeleton));

        let model = match self.solve(&skeleton)? {
            Some(model) => model,
            None => {
                info!(
                    "No program over {components} within {} applications",
                    self.config.bound
                );
                return Ok(None);
            }
        };

        let res = decode(&skeleton, &model)?;
        self.check_solution(&res, tests, components)?;
        info!("Synthesized: {res}");

        Ok(Some(res))
    }

    /// Malformed patterns are a caller error. Patterns naming components
    /// outside the multiset are fine and simply never match.
    fn check_patterns(&self) -> Result<(), SynthesisError> {
        for pattern in &self.config.forbidden {
            pattern
                .validate()
                .map_err(|reason| SynthesisError::MalformedPattern {
                    pattern: pattern.to_string(),
                    reason,
                })?;
        }

        Ok(())
    }

    fn solve(&mut self, skeleton: &Skeleton) -> Result<Option<Model>, SynthesisError> {
        let failure = |e: S::Error| SynthesisError::SolverFailure(e.to_string());

        self.solver.reset().map_err(failure)?;
        for (name, sort) in &skeleton.declarations {
            self.solver.declare_var(name, *sort).map_err(failure)?;
        }
        for term in &skeleton.assertions {
            self.solver.assert(term).map_err(failure)?;
        }

        let (verdict, model) = self
            .solver
            .check_sat_with_model(&skeleton.decision_variables())
            .map_err(failure)?;
        debug!("Solver verdict: {verdict:?}");

        match verdict {
            SatResult::Sat => model
                .map(Some)
                .ok_or_else(|| SynthesisError::SolverFailure("SAT without a model".into())),
            SatResult::Unsat => Ok(None),
            SatResult::Unknown(reason) => Err(SynthesisError::Timeout(reason)),
        }
    }

    /// Re-checks a decoded program against everything the encoding promised.
    fn check_solution(
        &self,
        res: &Synthesized,
        tests: &[TestCase],
        components: &ComponentMultiset,
    ) -> Result<(), SynthesisError> {
        let inconsistent =
            |msg: String| -> Result<(), SynthesisError> { Err(SynthesisError::InconsistentModel(msg)) };
        let expr = &res.expression;

        if let Some(test) = tests.iter().find(|t| !t.accepts(expr, &res.parameters)) {
            return inconsistent(format!("{expr} fails test {test}"));
        }
        if expr.size() > self.config.bound {
            return inconsistent(format!(
                "{expr} has more than {} applications",
                self.config.bound
            ));
        }
        if !components.admits(&expr.usage(), self.config.unique_usage) {
            return inconsistent(format!("{expr} does not fit the multiset {components}"));
        }
        if let Some(pattern) = self.config.forbidden.iter().find(|p| expr.contains(p)) {
            return inconsistent(format!("{expr} contains forbidden {pattern}"));
        }

        Ok(())
    }
}

impl<S: SmtSolver> Synthesizer for TreeBoundedSynthesis<S> {
    fn synthesize(
        &mut self,
        tests: &[TestCase],
        components: &ComponentMultiset,
    ) -> Result<Option<Synthesized>, SynthesisError> {
        TreeBoundedSynthesis::synthesize(self, tests, components)
    }
}

fn render(skeleton: &Skeleton) -> String {
    smtlib::script(
        skeleton
            .declarations
            .iter()
            .map(|(name, sort)| (name.as_str(), *sort)),
        &skeleton.assertions,
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io;

    use super::*;
    use crate::component::{components, Hole};
    use crate::expr::{Constant, Expression, ProgramVariable};
    use crate::smt::{ModelValue, SmtSort, SmtTerm};

    /// Answers every check with a fixed verdict and model.
    struct ScriptedSolver {
        verdict: Result<SatResult, String>,
        model: Option<Model>,
        resets: usize,
        asserted: usize,
    }

    impl ScriptedSolver {
        fn answering(verdict: SatResult, model: Option<Model>) -> Self {
            Self {
                verdict: Ok(verdict),
                model,
                resets: 0,
                asserted: 0,
            }
        }

        fn failing(msg: &str) -> Self {
            Self {
                verdict: Err(msg.to_string()),
                model: None,
                resets: 0,
                asserted: 0,
            }
        }
    }

    impl SmtSolver for ScriptedSolver {
        type Error = io::Error;

        fn declare_var(&mut self, _name: &str, _sort: SmtSort) -> Result<(), io::Error> {
            Ok(())
        }

        fn assert(&mut self, _term: &SmtTerm) -> Result<(), io::Error> {
            self.asserted += 1;
            Ok(())
        }

        fn check_sat_with_model(
            &mut self,
            _vars: &[(&str, SmtSort)],
        ) -> Result<(SatResult, Option<Model>), io::Error> {
            match &self.verdict {
                Ok(v) => Ok((v.clone(), self.model.clone())),
                Err(msg) => Err(io::Error::other(msg.clone())),
            }
        }

        fn reset(&mut self) -> Result<(), io::Error> {
            self.resets += 1;
            self.asserted = 0;
            Ok(())
        }
    }

    fn x() -> ProgramVariable {
        ProgramVariable::int("x")
    }

    fn palette() -> ComponentMultiset {
        ComponentMultiset::new().with(x()).with(components::minus())
    }

    fn negation_test() -> Vec<TestCase> {
        vec![TestCase::of_assignment(
            HashMap::from([(x(), Constant::Int(3))]),
            Constant::Int(-3),
        )]
    }

    /// Leaf x is source 0, slot 0 is source 1.
    fn negation_model() -> Model {
        Model {
            values: HashMap::from([
                ("root".to_string(), ModelValue::Int(1)),
                ("slot0_is0".to_string(), ModelValue::Bool(true)),
                ("slot0_hole0".to_string(), ModelValue::Int(0)),
            ]),
        }
    }

    #[test]
    fn unsat_is_no_solution() {
        let solver = ScriptedSolver::answering(SatResult::Unsat, None);
        let mut synth = TreeBoundedSynthesis::new(solver, TbsConfig::new(1));

        let res = synth.synthesize(&negation_test(), &palette()).unwrap();
        assert!(res.is_none());
        assert_eq!(synth.solver().resets, 1);
        assert!(synth.solver().asserted > 0);
    }

    #[test]
    fn unknown_is_a_timeout() {
        let solver = ScriptedSolver::answering(SatResult::Unknown("timeout".into()), None);
        let mut synth = TreeBoundedSynthesis::new(solver, TbsConfig::new(1));

        let res = synth.synthesize(&negation_test(), &palette());
        assert!(matches!(res, Err(SynthesisError::Timeout(r)) if r == "timeout"));
    }

    #[test]
    fn backend_errors_are_solver_failures() {
        let mut synth = TreeBoundedSynthesis::new(ScriptedSolver::failing("out of memory"), TbsConfig::new(1));

        let res = synth.synthesize(&negation_test(), &palette());
        assert!(matches!(res, Err(SynthesisError::SolverFailure(m)) if m.contains("out of memory")));
    }

    #[test]
    fn sat_without_model_is_a_solver_failure() {
        let solver = ScriptedSolver::answering(SatResult::Sat, None);
        let mut synth = TreeBoundedSynthesis::new(solver, TbsConfig::new(1));

        assert!(matches!(
            synth.synthesize(&negation_test(), &palette()),
            Err(SynthesisError::SolverFailure(_))
        ));
    }

    #[test]
    fn sat_model_is_decoded_and_checked() {
        let solver = ScriptedSolver::answering(SatResult::Sat, Some(negation_model()));
        let mut synth = TreeBoundedSynthesis::new(solver, TbsConfig::new(1));

        let res = synth.synthesize(&negation_test(), &palette()).unwrap().unwrap();
        assert_eq!(
            res.expression,
            Expression::apply(components::minus(), [Expression::leaf(x())])
        );
    }

    #[test]
    fn wrong_models_are_never_returned() {
        let solver = ScriptedSolver::answering(SatResult::Sat, Some(negation_model()));
        let mut synth = TreeBoundedSynthesis::new(solver, TbsConfig::new(1));
        let wrong = vec![TestCase::of_assignment(
            HashMap::from([(x(), Constant::Int(3))]),
            Constant::Int(3),
        )
        .with_id("identity")];

        let res = synth.synthesize(&wrong, &palette());
        assert!(matches!(res, Err(SynthesisError::InconsistentModel(m)) if m.contains("identity")));

        let neg_x = Expression::apply(components::minus(), [Expression::leaf(x())]);
        let solver = ScriptedSolver::answering(SatResult::Sat, Some(negation_model()));
        let mut synth = TreeBoundedSynthesis::new(solver, TbsConfig::new(1).forbid(neg_x));
        assert!(matches!(
            synth.synthesize(&negation_test(), &palette()),
            Err(SynthesisError::InconsistentModel(_))
        ));
    }

    #[test]
    fn malformed_patterns_fail_before_solving() {
        let minus = components::minus();
        let unbound = Expression::app(minus, Vec::<(Hole, Expression)>::new());
        let solver = ScriptedSolver::answering(SatResult::Unsat, None);
        let mut synth = TreeBoundedSynthesis::new(solver, TbsConfig::new(1).forbid(unbound));

        let res = synth.synthesize(&negation_test(), &palette());
        assert!(matches!(res, Err(SynthesisError::MalformedPattern { .. })));
        assert_eq!(synth.solver().resets, 0);
    }

    #[test]
    fn empty_multiset_is_an_error() {
        let solver = ScriptedSolver::answering(SatResult::Unsat, None);
        let mut synth = TreeBoundedSynthesis::new(solver, TbsConfig::new(1));

        assert!(matches!(
            synth.synthesize(&negation_test(), &ComponentMultiset::new()),
            Err(SynthesisError::EmptyComponents)
        ));
    }

    #[test]
    fn query_renders_smtlib() {
        let synth = TreeBoundedSynthesis::new(ScriptedSolver::answering(SatResult::Unsat, None), TbsConfig::new(1));
        let text = synth.query(&negation_test(), &palette()).unwrap();

        assert!(text.contains("(declare-const root Int)"));
        assert!(text.contains("(declare-const slot0_is0 Bool)"));
        assert!(text.ends_with("(check-sat)\n"));
    }
}
