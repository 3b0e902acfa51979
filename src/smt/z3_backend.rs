use std::collections::HashMap;
use std::time::Duration;

use log::debug;
use thiserror::Error;
use z3::ast::Ast;

use crate::smt::solver::{Model, ModelValue, SatResult, SmtSolver};
use crate::smt::terms::{SmtSort, SmtTerm};

#[derive(Debug, Error)]
pub enum Z3Error {
    #[error("unknown variable: {0}")]
    UnknownVariable(String),
    #[error("variable {0} redeclared with a different sort")]
    Redeclared(String),
    #[error("sort mismatch: {0}")]
    SortMismatch(String),
    #[error("Z3 error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, Default)]
pub struct SolverConfig {
    /// Wall time limit of a single check. `None` means no limit.
    pub timeout: Option<Duration>,
}

impl SolverConfig {
    pub fn no_timeout() -> Self {
        Self { timeout: None }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    pub fn with_timeout_millis(millis: u64) -> Self {
        Self::with_timeout(Duration::from_millis(millis))
    }
}

/// Z3 behind the [`SmtSolver`] interface.
///
/// Declarations and assertions are recorded and only handed to Z3 on
/// [`SmtSolver::check_sat_with_model`], which builds a fresh context for
/// every check. Nothing Z3-side outlives a query.
#[derive(Debug, Clone, Default)]
pub struct Z3Solver {
    config: SolverConfig,
    sorts: HashMap<String, SmtSort>,
    declarations: Vec<(String, SmtSort)>,
    assertions: Vec<SmtTerm>,
}

impl Z3Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn assertion_count(&self) -> usize {
        self.assertions.len()
    }

    fn sort_of(&self, term: &SmtTerm) -> Result<SmtSort, Z3Error> {
        let expect = |t: &SmtTerm, sort: SmtSort| -> Result<(), Z3Error> {
            let found = self.sort_of(t)?;
            if found == sort {
                Ok(())
            } else {
                Err(Z3Error::SortMismatch(format!(
                    "expected {sort}, got {found} in {t:?}"
                )))
            }
        };

        match term {
            SmtTerm::Var(name) => self
                .sorts
                .get(name)
                .copied()
                .ok_or_else(|| Z3Error::UnknownVariable(name.clone())),
            SmtTerm::IntLit(_) => Ok(SmtSort::Int),
            SmtTerm::BoolLit(_) => Ok(SmtSort::Bool),
            SmtTerm::Add(terms) => {
                terms.iter().try_for_each(|t| expect(t, SmtSort::Int))?;
                Ok(SmtSort::Int)
            }
            SmtTerm::Sub(l, r) | SmtTerm::Mul(l, r) => {
                expect(l, SmtSort::Int)?;
                expect(r, SmtSort::Int)?;
                Ok(SmtSort::Int)
            }
            SmtTerm::Neg(inner) => {
                expect(inner, SmtSort::Int)?;
                Ok(SmtSort::Int)
            }
            SmtTerm::Eq(l, r) => {
                let sort = self.sort_of(l)?;
                expect(r, sort)?;
                Ok(SmtSort::Bool)
            }
            SmtTerm::Lt(l, r) | SmtTerm::Le(l, r) | SmtTerm::Gt(l, r) | SmtTerm::Ge(l, r) => {
                expect(l, SmtSort::Int)?;
                expect(r, SmtSort::Int)?;
                Ok(SmtSort::Bool)
            }
            SmtTerm::And(terms) | SmtTerm::Or(terms) => {
                terms.iter().try_for_each(|t| expect(t, SmtSort::Bool))?;
                Ok(SmtSort::Bool)
            }
            SmtTerm::Not(inner) => {
                expect(inner, SmtSort::Bool)?;
                Ok(SmtSort::Bool)
            }
            SmtTerm::Implies(l, r) => {
                expect(l, SmtSort::Bool)?;
                expect(r, SmtSort::Bool)?;
                Ok(SmtSort::Bool)
            }
            SmtTerm::Ite(c, t, e) => {
                expect(c, SmtSort::Bool)?;
                let sort = self.sort_of(t)?;
                expect(e, sort)?;
                Ok(sort)
            }
        }
    }
}

enum Z3Term<'ctx> {
    Int(z3::ast::Int<'ctx>),
    Bool(z3::ast::Bool<'ctx>),
}

impl<'ctx> Z3Term<'ctx> {
    fn into_int(self) -> Result<z3::ast::Int<'ctx>, Z3Error> {
        match self {
            Z3Term::Int(i) => Ok(i),
            Z3Term::Bool(_) => Err(Z3Error::SortMismatch("expected Int, got Bool".into())),
        }
    }

    fn into_bool(self) -> Result<z3::ast::Bool<'ctx>, Z3Error> {
        match self {
            Z3Term::Bool(b) => Ok(b),
            Z3Term::Int(_) => Err(Z3Error::SortMismatch("expected Bool, got Int".into())),
        }
    }
}

/// Per-check translation of [`SmtTerm`]s into one Z3 context.
struct Translator<'ctx> {
    z3: &'ctx z3::Context,
    ints: HashMap<String, z3::ast::Int<'ctx>>,
    bools: HashMap<String, z3::ast::Bool<'ctx>>,
}

impl<'ctx> Translator<'ctx> {
    fn new(z3: &'ctx z3::Context, declarations: &[(String, SmtSort)]) -> Self {
        let mut ints = HashMap::new();
        let mut bools = HashMap::new();

        for (name, sort) in declarations {
            match sort {
                SmtSort::Int => {
                    ints.insert(name.clone(), z3::ast::Int::new_const(z3, name.as_str()));
                }
                SmtSort::Bool => {
                    bools.insert(name.clone(), z3::ast::Bool::new_const(z3, name.as_str()));
                }
            }
        }

        Self { z3, ints, bools }
    }

    fn ints(&self, terms: &[SmtTerm]) -> Result<Vec<z3::ast::Int<'ctx>>, Z3Error> {
        terms.iter().map(|t| self.translate(t)?.into_int()).collect()
    }

    fn bools(&self, terms: &[SmtTerm]) -> Result<Vec<z3::ast::Bool<'ctx>>, Z3Error> {
        terms.iter().map(|t| self.translate(t)?.into_bool()).collect()
    }

    fn int_pair(
        &self,
        l: &SmtTerm,
        r: &SmtTerm,
    ) -> Result<(z3::ast::Int<'ctx>, z3::ast::Int<'ctx>), Z3Error> {
        Ok((self.translate(l)?.into_int()?, self.translate(r)?.into_int()?))
    }

    fn translate(&self, term: &SmtTerm) -> Result<Z3Term<'ctx>, Z3Error> {
        let z3 = self.z3;

        let res = match term {
            SmtTerm::Var(name) => {
                if let Some(v) = self.ints.get(name) {
                    Z3Term::Int(v.clone())
                } else if let Some(v) = self.bools.get(name) {
                    Z3Term::Bool(v.clone())
                } else {
                    return Err(Z3Error::UnknownVariable(name.clone()));
                }
            }
            SmtTerm::IntLit(n) => Z3Term::Int(z3::ast::Int::from_i64(z3, *n)),
            SmtTerm::BoolLit(b) => Z3Term::Bool(z3::ast::Bool::from_bool(z3, *b)),
            SmtTerm::Add(terms) => {
                let ints = self.ints(terms)?;
                if ints.is_empty() {
                    Z3Term::Int(z3::ast::Int::from_i64(z3, 0))
                } else {
                    let refs: Vec<&z3::ast::Int<'ctx>> = ints.iter().collect();
                    Z3Term::Int(z3::ast::Int::add(z3, &refs))
                }
            }
            SmtTerm::Sub(l, r) => {
                let (l, r) = self.int_pair(l, r)?;
                Z3Term::Int(z3::ast::Int::sub(z3, &[&l, &r]))
            }
            SmtTerm::Mul(l, r) => {
                let (l, r) = self.int_pair(l, r)?;
                Z3Term::Int(z3::ast::Int::mul(z3, &[&l, &r]))
            }
            SmtTerm::Neg(inner) => Z3Term::Int(self.translate(inner)?.into_int()?.unary_minus()),
            SmtTerm::Eq(l, r) => match (self.translate(l)?, self.translate(r)?) {
                (Z3Term::Int(l), Z3Term::Int(r)) => Z3Term::Bool(l._eq(&r)),
                (Z3Term::Bool(l), Z3Term::Bool(r)) => Z3Term::Bool(l._eq(&r)),
                _ => return Err(Z3Error::SortMismatch("operands of = differ".into())),
            },
            SmtTerm::Lt(l, r) => {
                let (l, r) = self.int_pair(l, r)?;
                Z3Term::Bool(l.lt(&r))
            }
            SmtTerm::Le(l, r) => {
                let (l, r) = self.int_pair(l, r)?;
                Z3Term::Bool(l.le(&r))
            }
            SmtTerm::Gt(l, r) => {
                let (l, r) = self.int_pair(l, r)?;
                Z3Term::Bool(l.gt(&r))
            }
            SmtTerm::Ge(l, r) => {
                let (l, r) = self.int_pair(l, r)?;
                Z3Term::Bool(l.ge(&r))
            }
            SmtTerm::And(terms) => {
                let bools = self.bools(terms)?;
                let refs: Vec<&z3::ast::Bool<'ctx>> = bools.iter().collect();
                if refs.is_empty() {
                    Z3Term::Bool(z3::ast::Bool::from_bool(z3, true))
                } else {
                    Z3Term::Bool(z3::ast::Bool::and(z3, &refs))
                }
            }
            SmtTerm::Or(terms) => {
                let bools = self.bools(terms)?;
                let refs: Vec<&z3::ast::Bool<'ctx>> = bools.iter().collect();
                if refs.is_empty() {
                    Z3Term::Bool(z3::ast::Bool::from_bool(z3, false))
                } else {
                    Z3Term::Bool(z3::ast::Bool::or(z3, &refs))
                }
            }
            SmtTerm::Not(inner) => Z3Term::Bool(self.translate(inner)?.into_bool()?.not()),
            SmtTerm::Implies(l, r) => {
                let l = self.translate(l)?.into_bool()?;
                let r = self.translate(r)?.into_bool()?;
                Z3Term::Bool(l.implies(&r))
            }
            SmtTerm::Ite(c, t, e) => {
                let c = self.translate(c)?.into_bool()?;
                match (self.translate(t)?, self.translate(e)?) {
                    (Z3Term::Int(t), Z3Term::Int(e)) => Z3Term::Int(c.ite(&t, &e)),
                    (Z3Term::Bool(t), Z3Term::Bool(e)) => Z3Term::Bool(c.ite(&t, &e)),
                    _ => return Err(Z3Error::SortMismatch("branches of ite differ".into())),
                }
            }
        };

        Ok(res)
    }

    fn read_model(
        &self,
        model: &z3::Model<'ctx>,
        vars: &[(&str, SmtSort)],
    ) -> Result<Model, Z3Error> {
        let mut values = HashMap::new();

        for &(name, sort) in vars {
            let value = match sort {
                SmtSort::Int => {
                    let v = self
                        .ints
                        .get(name)
                        .ok_or_else(|| Z3Error::UnknownVariable(name.to_string()))?;
                    let value = model
                        .eval(v, true)
                        .ok_or_else(|| Z3Error::Internal(format!("no integer value for {name}")))?;
                    // Left out of the model; decoding then reports the gap.
                    let Some(n) = value.as_i64() else {
                        debug!("Value of {name} does not fit in i64: {value}");
                        continue;
                    };
                    ModelValue::Int(n)
                }
                SmtSort::Bool => {
                    let v = self
                        .bools
                        .get(name)
                        .ok_or_else(|| Z3Error::UnknownVariable(name.to_string()))?;
                    let b = model
                        .eval(v, true)
                        .and_then(|x| x.as_bool())
                        .ok_or_else(|| Z3Error::Internal(format!("no boolean value for {name}")))?;
                    ModelValue::Bool(b)
                }
            };
            values.insert(name.to_string(), value);
        }

        Ok(Model { values })
    }
}

impl SmtSolver for Z3Solver {
    type Error = Z3Error;

    fn declare_var(&mut self, name: &str, sort: SmtSort) -> Result<(), Z3Error> {
        match self.sorts.get(name) {
            Some(existing) if *existing == sort => Ok(()),
            Some(_) => Err(Z3Error::Redeclared(name.to_string())),
            None => {
                self.sorts.insert(name.to_string(), sort);
                self.declarations.push((name.to_string(), sort));
                Ok(())
            }
        }
    }

    fn assert(&mut self, term: &SmtTerm) -> Result<(), Z3Error> {
        match self.sort_of(term)? {
            SmtSort::Bool => {
                self.assertions.push(term.clone());
                Ok(())
            }
            SmtSort::Int => Err(Z3Error::SortMismatch("asserted an Int term".into())),
        }
    }

    fn check_sat_with_model(
        &mut self,
        vars: &[(&str, SmtSort)],
    ) -> Result<(SatResult, Option<Model>), Z3Error> {
        let cfg = z3::Config::new();
        let z3 = z3::Context::new(&cfg);
        let solver = z3::Solver::new(&z3);

        if let Some(timeout) = self.config.timeout {
            let mut params = z3::Params::new(&z3);
            params.set_u32("timeout", timeout.as_millis().min(u32::MAX as u128) as u32);
            solver.set_params(&params);
        }

        let translator = Translator::new(&z3, &self.declarations);
        for term in &self.assertions {
            solver.assert(&translator.translate(term)?.into_bool()?);
        }

        debug!(
            "Z3 check: {} declarations, {} assertions",
            self.declarations.len(),
            self.assertions.len()
        );

        match solver.check() {
            z3::SatResult::Sat => {
                let model = solver
                    .get_model()
                    .ok_or_else(|| Z3Error::Internal("SAT but no model available".into()))?;
                let model = translator.read_model(&model, vars)?;

                Ok((SatResult::Sat, Some(model)))
            }
            z3::SatResult::Unsat => Ok((SatResult::Unsat, None)),
            z3::SatResult::Unknown => {
                let reason = solver
                    .get_reason_unknown()
                    .unwrap_or_else(|| "Z3 returned unknown".to_string());

                Ok((SatResult::Unknown(reason), None))
            }
        }
    }

    fn reset(&mut self) -> Result<(), Z3Error> {
        self.sorts.clear();
        self.declarations.clear();
        self.assertions.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn z3_model_extraction() -> TestResult {
        let mut solver = Z3Solver::new();

        solver.declare_var("x", SmtSort::Int)?;
        solver.declare_var("y", SmtSort::Int)?;
        solver.assert(&SmtTerm::and(vec![
            SmtTerm::var("x").gt(SmtTerm::int(0)),
            SmtTerm::var("y").gt(SmtTerm::int(0)),
            SmtTerm::var("x").add(SmtTerm::var("y")).eq(SmtTerm::int(3)),
            SmtTerm::var("x").lt(SmtTerm::var("y")),
        ]))?;

        let (result, model) = solver.check_sat_with_model(&[("x", SmtSort::Int), ("y", SmtSort::Int)])?;
        assert_eq!(result, SatResult::Sat);
        let model = model.ok_or("expected a model")?;
        assert_eq!(model.get_int("x"), Some(1));
        assert_eq!(model.get_int("y"), Some(2));
        Ok(())
    }

    #[test]
    fn z3_basic_unsat() -> TestResult {
        let mut solver = Z3Solver::new();

        solver.declare_var("b", SmtSort::Bool)?;
        solver.assert(&SmtTerm::var("b"))?;
        solver.assert(&SmtTerm::var("b").not())?;

        let (result, model) = solver.check_sat_with_model(&[])?;
        assert_eq!(result, SatResult::Unsat);
        assert!(model.is_none());
        Ok(())
    }

    #[test]
    fn reset_forgets_everything() -> TestResult {
        let mut solver = Z3Solver::new();

        solver.declare_var("b", SmtSort::Bool)?;
        solver.assert(&SmtTerm::bool(false))?;
        solver.reset()?;
        assert_eq!(solver.assertion_count(), 0);

        solver.declare_var("b", SmtSort::Int)?;
        solver.assert(&SmtTerm::var("b").eq(SmtTerm::int(2)))?;
        let (result, model) = solver.check_sat_with_model(&[("b", SmtSort::Int)])?;
        assert_eq!(result, SatResult::Sat);
        assert_eq!(model.ok_or("expected a model")?.get_int("b"), Some(2));
        Ok(())
    }

    #[test]
    fn ill_sorted_assertions_are_rejected_early() {
        let mut solver = Z3Solver::new();

        assert!(solver.declare_var("x", SmtSort::Int).is_ok());
        assert!(matches!(
            solver.declare_var("x", SmtSort::Bool),
            Err(Z3Error::Redeclared(_))
        ));
        assert!(matches!(
            solver.assert(&SmtTerm::var("x")),
            Err(Z3Error::SortMismatch(_))
        ));
        assert!(matches!(
            solver.assert(&SmtTerm::var("y").eq(SmtTerm::int(1))),
            Err(Z3Error::UnknownVariable(_))
        ));
        assert!(matches!(
            solver.assert(&SmtTerm::var("x").eq(SmtTerm::bool(true))),
            Err(Z3Error::SortMismatch(_))
        ));
    }

    #[test]
    fn integers_beyond_i64_are_left_out_of_the_model() -> TestResult {
        let mut solver = Z3Solver::new();
        let big = SmtTerm::int(1 << 40).mul(SmtTerm::int(1 << 40));

        solver.declare_var("x", SmtSort::Int)?;
        solver.declare_var("y", SmtSort::Int)?;
        solver.assert(&SmtTerm::var("x").eq(big))?;
        solver.assert(&SmtTerm::var("y").eq(SmtTerm::int(7)))?;

        let (result, model) = solver.check_sat_with_model(&[("x", SmtSort::Int), ("y", SmtSort::Int)])?;
        assert_eq!(result, SatResult::Sat);
        let model = model.ok_or("expected a model")?;
        assert_eq!(model.get_int("x"), None);
        assert_eq!(model.get_int("y"), Some(7));
        Ok(())
    }

    #[test]
    fn nested_ite_and_negation() -> TestResult {
        let mut solver = Z3Solver::with_config(SolverConfig::with_timeout_millis(10_000));

        solver.declare_var("a", SmtSort::Bool)?;
        solver.declare_var("x", SmtSort::Int)?;
        let ite = SmtTerm::var("a").ite(SmtTerm::int(5).neg(), SmtTerm::int(3));
        solver.assert(&SmtTerm::var("x").eq(ite))?;
        solver.assert(&SmtTerm::var("a"))?;

        let (result, model) = solver.check_sat_with_model(&[("x", SmtSort::Int), ("a", SmtSort::Bool)])?;
        assert_eq!(result, SatResult::Sat);
        let model = model.ok_or("expected a model")?;
        assert_eq!(model.get_int("x"), Some(-5));
        assert_eq!(model.get_bool("a"), Some(true));
        Ok(())
    }
}
