//! Encoding of bounded program synthesis into a constraint set.
//!
//! The skeleton has `bound` application slots. Every slot either holds one
//! component of the multiset or is unused. Each hole position of a slot has
//! a choice variable naming its *source*: sources `0..L` are the distinct
//! leaves of the multiset, source `L + j` is the output of slot `j`. A hole of
//! slot `i` may only read slots `j < i`, so the slot graph is acyclic. The
//! program output is a single `root` choice over all sources.
//!
//! Every used slot is consumed exactly once (by one active hole or by the
//! root), which makes the selected graph a tree hanging off the root.

use std::collections::HashSet;

use log::debug;

use crate::component::{Component, Operator};
use crate::error::SynthesisError;
use crate::expr::{Constant, Expression, Leaf, Parameter, Sort};
use crate::smt::{SmtSort, SmtTerm};
use crate::synth::config::TbsConfig;
use crate::synth::multiset::ComponentMultiset;
use crate::synth::TestCase;

#[derive(Debug, Clone)]
pub struct LeafEntry {
    pub leaf: Leaf,
    pub count: usize,
    /// False when some test case gives no value to this (variable) leaf.
    pub usable: bool,
}

#[derive(Debug, Clone)]
pub struct Slot {
    /// One boolean per distinct component: "this slot holds component `c`".
    pub uses: Vec<String>,
    /// One source choice per hole position, up to the largest arity.
    pub holes: Vec<String>,
}

/// The symbolic skeleton of one synthesis query together with the
/// bookkeeping needed to decode a model of it.
#[derive(Debug, Clone)]
pub struct Skeleton {
    pub leaves: Vec<LeafEntry>,
    pub components: Vec<(Component, usize)>,
    pub slots: Vec<Slot>,
    pub root: String,
    pub parameters: Vec<(Parameter, String)>,
    pub declarations: Vec<(String, SmtSort)>,
    pub assertions: Vec<SmtTerm>,
}

impl Skeleton {
    /// Index of the first slot source.
    pub fn slot_base(&self) -> usize {
        self.leaves.len()
    }

    pub fn source_count(&self) -> usize {
        self.leaves.len() + self.slots.len()
    }

    /// The variables whose values determine the program.
    pub fn decision_variables(&self) -> Vec<(&str, SmtSort)> {
        let mut out = vec![(self.root.as_str(), SmtSort::Int)];

        for slot in &self.slots {
            out.extend(slot.uses.iter().map(|u| (u.as_str(), SmtSort::Bool)));
            out.extend(slot.holes.iter().map(|h| (h.as_str(), SmtSort::Int)));
        }
        for (param, name) in &self.parameters {
            out.push((name.as_str(), smt_sort(param.sort())));
        }

        out
    }

    pub fn parameter_var(&self, param: &Parameter) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(p, _)| p == param)
            .map(|(_, name)| name.as_str())
    }
}

fn smt_sort(sort: Sort) -> SmtSort {
    match sort {
        Sort::Int => SmtSort::Int,
        Sort::Bool => SmtSort::Bool,
    }
}

fn sort_tag(sort: Sort) -> &'static str {
    match sort {
        Sort::Int => "int",
        Sort::Bool => "bool",
    }
}

fn literal(c: Constant) -> SmtTerm {
    match c {
        Constant::Int(v) => SmtTerm::int(v),
        Constant::Bool(v) => SmtTerm::bool(v),
    }
}

/// Symbolic counterpart of [`Operator::apply`].
fn symbolic(op: Operator, args: &[SmtTerm]) -> SmtTerm {
    match (op, args) {
        (Operator::Add, [l, r]) => l.clone().add(r.clone()),
        (Operator::Sub, [l, r]) => l.clone().sub(r.clone()),
        (Operator::Mult, [l, r]) => l.clone().mul(r.clone()),
        (Operator::Minus, [a]) => a.clone().neg(),
        (Operator::Ite, [c, t, e]) => c.clone().ite(t.clone(), e.clone()),
        (Operator::Gt, [l, r]) => l.clone().gt(r.clone()),
        (Operator::Ge, [l, r]) => l.clone().ge(r.clone()),
        (Operator::Lt, [l, r]) => l.clone().lt(r.clone()),
        (Operator::Le, [l, r]) => l.clone().le(r.clone()),
        (Operator::Eq, [l, r]) | (Operator::Iff, [l, r]) => l.clone().eq(r.clone()),
        (Operator::Neq, [l, r]) => l.clone().eq(r.clone()).not(),
        (Operator::And, [l, r]) => SmtTerm::and(vec![l.clone(), r.clone()]),
        (Operator::Or, [l, r]) => SmtTerm::or(vec![l.clone(), r.clone()]),
        (Operator::Not, [a]) => a.clone().not(),
        (Operator::Impl, [l, r]) => l.clone().implies(r.clone()),
        (op, args) => unreachable!("{} applied to {} arguments", op.name(), args.len()),
    }
}

struct Encoder<'a> {
    tests: &'a [TestCase],
    config: &'a TbsConfig,
    skeleton: Skeleton,
    /// Sorts a hole at each position can have, over all components.
    hole_sorts: Vec<Vec<Sort>>,
    /// Sorts produced by at least one component.
    result_sorts: Vec<Sort>,
}

/// Builds the constraint set for `tests` over `components`.
///
/// Fails only on an empty multiset; infeasibility is left to the solver.
pub fn encode(
    tests: &[TestCase],
    components: &ComponentMultiset,
    config: &TbsConfig,
) -> Result<Skeleton, SynthesisError> {
    if components.is_empty() {
        return Err(SynthesisError::EmptyComponents);
    }

    let mut encoder = Encoder::new(tests, components, config);
    encoder.declare_structure();
    encoder.structure_constraints();
    encoder.multiplicity_constraints();
    for t in 0..tests.len() {
        encoder.test_constraints(t);
    }
    encoder.forbidden_constraints();

    let skeleton = encoder.skeleton;
    debug!(
        "Skeleton: {} slots, {} leaves, {} components, {} variables, {} assertions",
        skeleton.slots.len(),
        skeleton.leaves.len(),
        skeleton.components.len(),
        skeleton.declarations.len(),
        skeleton.assertions.len(),
    );

    Ok(skeleton)
}

impl<'a> Encoder<'a> {
    fn new(tests: &'a [TestCase], multiset: &ComponentMultiset, config: &'a TbsConfig) -> Self {
        let leaves = multiset
            .leaves()
            .map(|(leaf, count)| {
                let usable = match leaf {
                    Leaf::Variable(v) => tests
                        .iter()
                        .all(|t| t.input(v).is_some_and(|c| c.sort() == v.sort())),
                    Leaf::Parameter(_) | Leaf::Constant(_) => true,
                };
                if !usable {
                    debug!("Leaf {leaf} lacks a value in some test case, excluding it");
                }

                LeafEntry {
                    leaf: leaf.clone(),
                    count,
                    usable,
                }
            })
            .collect::<Vec<_>>();
        let components = multiset
            .components()
            .map(|(c, count)| (c.clone(), count))
            .collect::<Vec<_>>();

        let max_arity = components.iter().map(|(c, _)| c.arity()).max().unwrap_or(0);
        let hole_sorts = (0..max_arity)
            .map(|h| {
                let mut sorts = Vec::new();
                for (c, _) in &components {
                    if let Some(hole) = c.holes().get(h) {
                        if !sorts.contains(&hole.sort()) {
                            sorts.push(hole.sort());
                        }
                    }
                }
                sorts
            })
            .collect();
        let mut result_sorts = Vec::new();
        for (c, _) in &components {
            if !result_sorts.contains(&c.sort()) {
                result_sorts.push(c.sort());
            }
        }

        let parameters = leaves
            .iter()
            .filter_map(|e| match &e.leaf {
                Leaf::Parameter(p) => Some(p.clone()),
                _ => None,
            })
            .enumerate()
            .map(|(idx, p)| (p, format!("param{idx}")))
            .collect();

        Self {
            tests,
            config,
            skeleton: Skeleton {
                leaves,
                components,
                slots: Vec::new(),
                root: "root".to_string(),
                parameters,
                declarations: Vec::new(),
                assertions: Vec::new(),
            },
            hole_sorts,
            result_sorts,
        }
    }

    fn declare(&mut self, name: String, sort: SmtSort) -> String {
        self.skeleton.declarations.push((name.clone(), sort));
        name
    }

    fn assert(&mut self, term: SmtTerm) {
        self.skeleton.assertions.push(term);
    }

    fn leaf_count(&self) -> usize {
        self.skeleton.leaves.len()
    }

    fn max_arity(&self) -> usize {
        self.hole_sorts.len()
    }

    fn choice_is(var: &str, source: usize) -> SmtTerm {
        SmtTerm::var(var).eq(SmtTerm::int(source as i64))
    }

    fn uses(&self, slot: usize, component: usize) -> SmtTerm {
        SmtTerm::var(&self.skeleton.slots[slot].uses[component])
    }

    fn slot_active(&self, slot: usize) -> SmtTerm {
        SmtTerm::or(
            (0..self.skeleton.components.len())
                .map(|c| self.uses(slot, c))
                .collect(),
        )
    }

    /// The hole at `pos` belongs to the component selected at `slot`.
    fn hole_active(&self, slot: usize, pos: usize) -> SmtTerm {
        SmtTerm::or(
            self.skeleton
                .components
                .iter()
                .enumerate()
                .filter(|(_, (c, _))| c.arity() > pos)
                .map(|(idx, _)| self.uses(slot, idx))
                .collect(),
        )
    }

    /// Whether `source` can deliver a value of `sort` (any sort if `None`).
    fn provides(&self, source: usize, sort: Option<Sort>) -> SmtTerm {
        let leaves = self.leaf_count();

        if source < leaves {
            let entry = &self.skeleton.leaves[source];
            return SmtTerm::bool(entry.usable && sort.map_or(true, |s| entry.leaf.sort() == s));
        }

        let slot = source - leaves;
        SmtTerm::or(
            self.skeleton
                .components
                .iter()
                .enumerate()
                .filter(|(_, (c, _))| sort.map_or(true, |s| c.sort() == s))
                .map(|(idx, _)| self.uses(slot, idx))
                .collect(),
        )
    }

    /// Static over-approximation of [`Encoder::provides`], used to skip
    /// value constraints that typing already rules out.
    fn may_provide(&self, source: usize, sort: Sort) -> bool {
        let leaves = self.leaf_count();

        if source < leaves {
            let entry = &self.skeleton.leaves[source];
            entry.usable && entry.leaf.sort() == sort
        } else {
            self.result_sorts.contains(&sort)
        }
    }

    fn declare_structure(&mut self) {
        let components = self.skeleton.components.len();

        for i in 0..self.config.bound {
            let uses = (0..components)
                .map(|c| self.declare(format!("slot{i}_is{c}"), SmtSort::Bool))
                .collect();
            let holes = (0..self.max_arity())
                .map(|h| self.declare(format!("slot{i}_hole{h}"), SmtSort::Int))
                .collect();

            self.skeleton.slots.push(Slot { uses, holes });
        }

        let root = self.skeleton.root.clone();
        self.declare(root, SmtSort::Int);

        for (param, name) in self.skeleton.parameters.clone() {
            self.declare(name, smt_sort(param.sort()));
        }
    }

    fn output_sort(&self) -> Result<Option<Sort>, ()> {
        let mut sorts = self.tests.iter().map(|t| t.output().sort());
        let Some(first) = sorts.next() else {
            return Ok(None);
        };

        if sorts.all(|s| s == first) {
            Ok(Some(first))
        } else {
            Err(())
        }
    }

    fn structure_constraints(&mut self) {
        let leaves = self.leaf_count();
        let slots = self.skeleton.slots.len();

        for i in 0..slots {
            let one_component = SmtTerm::sum(
                (0..self.skeleton.components.len())
                    .map(|c| self.uses(i, c).indicator())
                    .collect(),
            )
            .le(SmtTerm::int(1));
            self.assert(one_component);

            for h in 0..self.max_arity() {
                let choice = self.skeleton.slots[i].holes[h].clone();
                let domain = SmtTerm::and(vec![
                    SmtTerm::int(0).le(SmtTerm::var(&choice)),
                    SmtTerm::var(&choice).lt(SmtTerm::int((leaves + i) as i64)),
                ]);
                let active = self.hole_active(i, h);
                self.assert(active.implies(domain));
            }

            for (c, (component, _)) in self.skeleton.components.clone().iter().enumerate() {
                for (h, hole) in component.holes().iter().enumerate() {
                    let choice = self.skeleton.slots[i].holes[h].clone();
                    let typed = SmtTerm::and(
                        (0..leaves + i)
                            .map(|s| {
                                Self::choice_is(&choice, s).implies(self.provides(s, Some(hole.sort())))
                            })
                            .collect(),
                    );
                    let used = self.uses(i, c);
                    self.assert(used.implies(typed));
                }
            }
        }

        let root = self.skeleton.root.clone();
        let sources = leaves + slots;
        self.assert(SmtTerm::and(vec![
            SmtTerm::int(0).le(SmtTerm::var(&root)),
            SmtTerm::var(&root).lt(SmtTerm::int(sources as i64)),
        ]));

        match self.output_sort() {
            Ok(sort) => {
                for s in 0..sources {
                    let typed = Self::choice_is(&root, s).implies(self.provides(s, sort));
                    self.assert(typed);
                }
            }
            Err(()) => {
                debug!("Test outputs disagree on their sort, no program can satisfy them");
                self.assert(SmtTerm::bool(false));
            }
        }

        // Every used slot feeds exactly one consumer, unused slots feed none.
        for j in 0..slots {
            let mut consumers = Vec::new();
            for i in j + 1..slots {
                for h in 0..self.max_arity() {
                    let choice = &self.skeleton.slots[i].holes[h];
                    consumers.push(
                        SmtTerm::and(vec![
                            self.hole_active(i, h),
                            Self::choice_is(choice, leaves + j),
                        ])
                        .indicator(),
                    );
                }
            }
            consumers.push(Self::choice_is(&root, leaves + j).indicator());

            let consumed = SmtTerm::sum(consumers).eq(self.slot_active(j).indicator());
            self.assert(consumed);
        }
    }

    /// Number of times leaf `l` is picked by an active hole or by the root.
    fn leaf_uses(&self, l: usize) -> SmtTerm {
        let mut uses = Vec::new();
        for i in 0..self.skeleton.slots.len() {
            for h in 0..self.max_arity() {
                let choice = &self.skeleton.slots[i].holes[h];
                uses.push(
                    SmtTerm::and(vec![self.hole_active(i, h), Self::choice_is(choice, l)]).indicator(),
                );
            }
        }
        uses.push(Self::choice_is(&self.skeleton.root, l).indicator());

        SmtTerm::sum(uses)
    }

    fn multiplicity_constraints(&mut self) {
        let bound = |used: SmtTerm, count: usize, exact: bool| {
            if exact {
                used.eq(SmtTerm::int(count as i64))
            } else {
                used.le(SmtTerm::int(count as i64))
            }
        };
        let exact = self.config.unique_usage;

        for l in 0..self.leaf_count() {
            let used = self.leaf_uses(l);
            let count = self.skeleton.leaves[l].count;
            self.assert(bound(used, count, exact));
        }

        for c in 0..self.skeleton.components.len() {
            let used = SmtTerm::sum(
                (0..self.skeleton.slots.len())
                    .map(|i| self.uses(i, c).indicator())
                    .collect(),
            );
            let count = self.skeleton.components[c].1;
            self.assert(bound(used, count, exact));
        }
    }

    fn leaf_value(&self, t: usize, leaf: &Leaf) -> Option<SmtTerm> {
        match leaf {
            Leaf::Constant(c) => Some(literal(*c)),
            Leaf::Variable(v) => self.tests[t].input(v).map(literal),
            Leaf::Parameter(p) => self.skeleton.parameter_var(p).map(SmtTerm::var),
        }
    }

    fn slot_value(t: usize, slot: usize, sort: Sort) -> String {
        format!("test{t}_slot{slot}_{}", sort_tag(sort))
    }

    fn hole_value(t: usize, slot: usize, pos: usize, sort: Sort) -> String {
        format!("test{t}_slot{slot}_hole{pos}_{}", sort_tag(sort))
    }

    fn source_value(&self, t: usize, source: usize, sort: Sort) -> Option<SmtTerm> {
        let leaves = self.leaf_count();

        if source < leaves {
            self.leaf_value(t, &self.skeleton.leaves[source].leaf)
        } else {
            Some(SmtTerm::var(Self::slot_value(t, source - leaves, sort)))
        }
    }

    /// Evaluates the skeleton under test `t` and pins the root to the
    /// expected output. Parameters are shared between all tests.
    fn test_constraints(&mut self, t: usize) {
        let leaves = self.leaf_count();
        let slots = self.skeleton.slots.len();

        for i in 0..slots {
            for sort in self.result_sorts.clone() {
                self.declare(Self::slot_value(t, i, sort), smt_sort(sort));
            }

            for h in 0..self.max_arity() {
                let choice = self.skeleton.slots[i].holes[h].clone();

                for sort in self.hole_sorts[h].clone() {
                    let value = self.declare(Self::hole_value(t, i, h, sort), smt_sort(sort));

                    let sources = (0..leaves + i)
                        .filter(|s| self.may_provide(*s, sort))
                        .collect::<Vec<_>>();
                    for s in sources {
                        let Some(source) = self.source_value(t, s, sort) else {
                            continue;
                        };
                        let link = Self::choice_is(&choice, s).implies(SmtTerm::var(&value).eq(source));
                        self.assert(link);
                    }
                }
            }

            for (c, (component, _)) in self.skeleton.components.clone().iter().enumerate() {
                let args = component
                    .holes()
                    .iter()
                    .enumerate()
                    .map(|(h, hole)| SmtTerm::var(Self::hole_value(t, i, h, hole.sort())))
                    .collect::<Vec<_>>();
                let out = SmtTerm::var(Self::slot_value(t, i, component.sort()));
                let semantics = out.eq(symbolic(component.operator(), &args));
                let used = self.uses(i, c);
                self.assert(used.implies(semantics));
            }
        }

        let expected = self.tests[t].output();
        let root = self.skeleton.root.clone();
        let sources = (0..leaves + slots)
            .filter(|s| self.may_provide(*s, expected.sort()))
            .collect::<Vec<_>>();
        for s in sources {
            let Some(value) = self.source_value(t, s, expected.sort()) else {
                continue;
            };
            let correct = Self::choice_is(&root, s).implies(value.eq(literal(expected)));
            self.assert(correct);
        }
    }

    /// "The subtree rooted at `slot` is exactly `pattern`."
    fn matches_at(&self, slot: usize, pattern: &Expression) -> SmtTerm {
        let Expression::App { component, args } = pattern else {
            return SmtTerm::bool(false);
        };
        let Some(c) = self.skeleton.components.iter().position(|(comp, _)| comp == component) else {
            return SmtTerm::bool(false);
        };

        let mut conjuncts = vec![self.uses(slot, c)];
        for (h, hole) in component.holes().iter().enumerate() {
            let Some(child) = args.get(hole) else {
                return SmtTerm::bool(false);
            };
            conjuncts.push(self.child_matches(slot, h, child));
        }

        SmtTerm::and(conjuncts)
    }

    fn child_matches(&self, slot: usize, pos: usize, pattern: &Expression) -> SmtTerm {
        let choice = &self.skeleton.slots[slot].holes[pos];

        match pattern {
            Expression::Leaf(leaf) => match self.skeleton.leaves.iter().position(|e| &e.leaf == leaf) {
                Some(l) => Self::choice_is(choice, l),
                None => SmtTerm::bool(false),
            },
            Expression::App { .. } => SmtTerm::or(
                (0..slot)
                    .map(|j| {
                        SmtTerm::and(vec![
                            Self::choice_is(choice, self.leaf_count() + j),
                            self.matches_at(j, pattern),
                        ])
                    })
                    .collect(),
            ),
        }
    }

    fn forbidden_constraints(&mut self) {
        let config = self.config;
        let mut seen = HashSet::new();

        for pattern in config.forbidden.iter() {
            if !seen.insert(pattern) {
                continue;
            }

            match pattern {
                Expression::Leaf(leaf) => {
                    let Some(l) = self.skeleton.leaves.iter().position(|e| &e.leaf == leaf) else {
                        debug!("Forbidden leaf {leaf} is not in the multiset");
                        continue;
                    };

                    for i in 0..self.skeleton.slots.len() {
                        for h in 0..self.max_arity() {
                            let choice = &self.skeleton.slots[i].holes[h];
                            let excluded = self
                                .hole_active(i, h)
                                .implies(Self::choice_is(choice, l).not());
                            self.skeleton.assertions.push(excluded);
                        }
                    }
                    let excluded = Self::choice_is(&self.skeleton.root, l).not();
                    self.skeleton.assertions.push(excluded);
                }
                Expression::App { .. } => {
                    for i in 0..self.skeleton.slots.len() {
                        let excluded = self.matches_at(i, pattern).not();
                        self.skeleton.assertions.push(excluded);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::component::components;
    use crate::expr::ProgramVariable;

    fn addition_palette() -> ComponentMultiset {
        ComponentMultiset::new()
            .with(ProgramVariable::int("x"))
            .with(ProgramVariable::int("y"))
            .with(components::add())
    }

    fn single_test() -> Vec<TestCase> {
        vec![TestCase::of_assignment(
            HashMap::from([
                (ProgramVariable::int("x"), Constant::Int(1)),
                (ProgramVariable::int("y"), Constant::Int(1)),
            ]),
            Constant::Int(2),
        )]
    }

    #[test]
    fn empty_multiset_is_rejected() {
        let res = encode(&[], &ComponentMultiset::new(), &TbsConfig::new(2));
        assert!(matches!(res, Err(SynthesisError::EmptyComponents)));
    }

    #[test]
    fn slots_follow_the_bound_and_widest_component() {
        let palette = addition_palette().with(components::ite());
        let skeleton = encode(&single_test(), &palette, &TbsConfig::new(3)).unwrap();

        assert_eq!(skeleton.slots.len(), 3);
        assert!(skeleton.slots.iter().all(|s| s.holes.len() == 3 && s.uses.len() == 2));
        assert_eq!(skeleton.slot_base(), 2);
        assert_eq!(skeleton.source_count(), 5);

        let decisions = skeleton.decision_variables();
        assert_eq!(decisions.len(), 1 + 3 * (2 + 3));
        assert!(decisions
            .iter()
            .all(|(name, _)| skeleton.declarations.iter().any(|(d, _)| d == name)));
    }

    #[test]
    fn declarations_are_unique() {
        let tests = single_test();
        let skeleton = encode(&tests, &addition_palette(), &TbsConfig::new(2)).unwrap();

        let names: HashSet<_> = skeleton.declarations.iter().map(|(n, _)| n).collect();
        assert_eq!(names.len(), skeleton.declarations.len());
    }

    #[test]
    fn unbound_variables_are_unusable() {
        let palette = addition_palette().with(ProgramVariable::int("z"));
        let skeleton = encode(&single_test(), &palette, &TbsConfig::new(1)).unwrap();

        let z = skeleton
            .leaves
            .iter()
            .find(|e| e.leaf == Leaf::Variable(ProgramVariable::int("z")))
            .unwrap();
        assert!(!z.usable);
        assert!(skeleton.leaves.iter().filter(|e| e.usable).count() == 2);
    }

    #[test]
    fn parameters_get_shared_variables() {
        let p = Parameter::int("p");
        let palette = addition_palette().with(p.clone());
        let tests = vec![single_test()[0].clone(), single_test()[0].clone()];
        let skeleton = encode(&tests, &palette, &TbsConfig::new(1)).unwrap();

        assert_eq!(skeleton.parameter_var(&p), Some("param0"));
        assert_eq!(
            skeleton.declarations.iter().filter(|(n, _)| n == "param0").count(),
            1
        );
    }

    #[test]
    fn forbidden_patterns_add_one_exclusion_per_slot() {
        let add = components::add();
        let x = ProgramVariable::int("x");
        let y = ProgramVariable::int("y");
        let xy = Expression::apply(add.clone(), [Expression::leaf(x.clone()), Expression::leaf(y)]);
        let tests = single_test();

        let plain = encode(&tests, &addition_palette(), &TbsConfig::new(2)).unwrap();
        let config = TbsConfig::new(2).forbid(xy.clone()).forbid(xy);
        let forbidden = encode(&tests, &addition_palette(), &config).unwrap();
        assert_eq!(forbidden.assertions.len(), plain.assertions.len() + 2);

        // One exclusion per hole position and slot, plus one for the root.
        let config = TbsConfig::new(2).forbid(Expression::leaf(x));
        let leaf_forbidden = encode(&tests, &addition_palette(), &config).unwrap();
        assert_eq!(leaf_forbidden.assertions.len(), plain.assertions.len() + 2 * 2 + 1);
    }

    #[test]
    fn patterns_over_absent_components_are_inert() {
        let sub = components::sub();
        let x = ProgramVariable::int("x");
        let y = ProgramVariable::int("y");
        let pattern = Expression::apply(sub, [Expression::leaf(x), Expression::leaf(y)]);
        let config = TbsConfig::new(2).forbid(pattern);
        let skeleton = encode(&single_test(), &addition_palette(), &config).unwrap();

        let inert = SmtTerm::bool(false).not();
        assert_eq!(
            skeleton.assertions.iter().rev().take(2).collect::<Vec<_>>(),
            vec![&inert, &inert]
        );
    }
}
