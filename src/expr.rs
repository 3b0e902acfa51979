use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::component::{Component, Hole};
use crate::error::EvalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sort {
    Int,
    Bool,
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sort::Int => write!(f, "Int"),
            Sort::Bool => write!(f, "Bool"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Constant {
    Int(i64),
    Bool(bool),
}

impl Constant {
    pub const TRUE: Constant = Constant::Bool(true);
    pub const FALSE: Constant = Constant::Bool(false);

    pub fn sort(&self) -> Sort {
        match self {
            Constant::Int(_) => Sort::Int,
            Constant::Bool(_) => Sort::Bool,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(v) => write!(f, "{v}"),
            Constant::Bool(v) => write!(f, "{v}"),
        }
    }
}

/// A program input; its value comes from a test case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramVariable {
    name: String,
    sort: Sort,
}

impl ProgramVariable {
    pub fn new(name: impl Into<String>, sort: Sort) -> Self {
        Self {
            name: name.into(),
            sort,
        }
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, Sort::Int)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, Sort::Bool)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }
}

/// A free constant of the synthesized program, chosen by the solver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Parameter {
    name: String,
    sort: Sort,
}

impl Parameter {
    pub fn new(name: impl Into<String>, sort: Sort) -> Self {
        Self {
            name: name.into(),
            sort,
        }
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, Sort::Int)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, Sort::Bool)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Leaf {
    Variable(ProgramVariable),
    Parameter(Parameter),
    Constant(Constant),
}

impl Leaf {
    pub fn sort(&self) -> Sort {
        match self {
            Leaf::Variable(v) => v.sort(),
            Leaf::Parameter(p) => p.sort(),
            Leaf::Constant(c) => c.sort(),
        }
    }
}

impl From<ProgramVariable> for Leaf {
    fn from(v: ProgramVariable) -> Self {
        Leaf::Variable(v)
    }
}

impl From<Parameter> for Leaf {
    fn from(p: Parameter) -> Self {
        Leaf::Parameter(p)
    }
}

impl From<Constant> for Leaf {
    fn from(c: Constant) -> Self {
        Leaf::Constant(c)
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leaf::Variable(v) => f.write_str(v.name()),
            Leaf::Parameter(p) => write!(f, "?{}", p.name()),
            Leaf::Constant(c) => write!(f, "{c}"),
        }
    }
}

/// A building block of the component multiset: a leaf or a component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Node {
    Leaf(Leaf),
    Component(Component),
}

impl From<Leaf> for Node {
    fn from(leaf: Leaf) -> Self {
        Node::Leaf(leaf)
    }
}

impl From<ProgramVariable> for Node {
    fn from(v: ProgramVariable) -> Self {
        Node::Leaf(Leaf::Variable(v))
    }
}

impl From<Parameter> for Node {
    fn from(p: Parameter) -> Self {
        Node::Leaf(Leaf::Parameter(p))
    }
}

impl From<Constant> for Node {
    fn from(c: Constant) -> Self {
        Node::Leaf(Leaf::Constant(c))
    }
}

impl From<Component> for Node {
    fn from(c: Component) -> Self {
        Node::Component(c)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Leaf(l) => write!(f, "{l}"),
            Node::Component(c) => write!(f, "{c}"),
        }
    }
}

/// A concrete program tree. Equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    Leaf(Leaf),
    App {
        component: Component,
        args: BTreeMap<Hole, Expression>,
    },
}

impl Expression {
    pub fn leaf(leaf: impl Into<Leaf>) -> Self {
        Expression::Leaf(leaf.into())
    }

    /// Builds an application from an explicit hole map. The map is not checked
    /// here, see [`Expression::validate`].
    pub fn app(component: Component, args: impl IntoIterator<Item = (Hole, Expression)>) -> Self {
        Expression::App {
            component,
            args: args.into_iter().collect(),
        }
    }

    /// Binds `children` to the component holes in declaration order.
    pub fn apply(component: Component, children: impl IntoIterator<Item = Expression>) -> Self {
        let args = component
            .holes()
            .iter()
            .cloned()
            .zip(children)
            .collect();

        Expression::App { component, args }
    }

    /// Children in hole order. Unbound holes are skipped.
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Leaf(_) => Vec::new(),
            Expression::App { component, args } => component
                .holes()
                .iter()
                .filter_map(|h| args.get(h))
                .collect(),
        }
    }

    /// Checks that every hole of every application is bound exactly once
    /// and nothing else is bound.
    pub fn validate(&self) -> Result<(), EvalError> {
        let Expression::App { component, args } = self else {
            return Ok(());
        };

        if let Some(hole) = component.holes().iter().find(|h| !args.contains_key(h)) {
            return Err(EvalError::UnboundHole {
                component: component.name(),
                hole: hole.name(),
            });
        }
        if let Some(hole) = args.keys().find(|h| component.hole_index(h).is_none()) {
            return Err(EvalError::ForeignHole {
                component: component.name(),
                hole: hole.name(),
            });
        }

        args.values().try_for_each(Expression::validate)
    }

    /// Number of applications in the tree.
    pub fn size(&self) -> usize {
        match self {
            Expression::Leaf(_) => 0,
            Expression::App { args, .. } => 1 + args.values().map(Expression::size).sum::<usize>(),
        }
    }

    pub fn leaves(&self) -> Vec<&Leaf> {
        let mut out = Vec::new();
        self.walk(&mut |e| {
            if let Expression::Leaf(l) = e {
                out.push(l);
            }
        });
        out
    }

    /// Every subtree, the root included, in pre-order.
    pub fn subexpressions(&self) -> Vec<&Expression> {
        let mut out = Vec::new();
        self.walk(&mut |e| out.push(e));
        out
    }

    /// Whether `pattern` occurs as a subtree.
    pub fn contains(&self, pattern: &Expression) -> bool {
        self.subexpressions().into_iter().any(|e| e == pattern)
    }

    /// How many times each leaf and component is used.
    pub fn usage(&self) -> HashMap<Node, usize> {
        let mut out = HashMap::new();
        self.walk(&mut |e| {
            let node = match e {
                Expression::Leaf(l) => Node::Leaf(l.clone()),
                Expression::App { component, .. } => Node::Component(component.clone()),
            };
            *out.entry(node).or_insert(0) += 1;
        });
        out
    }

    pub fn parameters(&self) -> Vec<&Parameter> {
        self.leaves()
            .into_iter()
            .filter_map(|l| match l {
                Leaf::Parameter(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    /// Replaces every parameter leaf that has a value in `parameters`.
    pub fn instantiate(&self, parameters: &HashMap<Parameter, Constant>) -> Expression {
        match self {
            Expression::Leaf(Leaf::Parameter(p)) => match parameters.get(p) {
                Some(c) => Expression::Leaf(Leaf::Constant(*c)),
                None => self.clone(),
            },
            Expression::Leaf(_) => self.clone(),
            Expression::App { component, args } => Expression::App {
                component: component.clone(),
                args: args
                    .iter()
                    .map(|(h, e)| (h.clone(), e.instantiate(parameters)))
                    .collect(),
            },
        }
    }

    pub fn evaluate(
        &self,
        inputs: &HashMap<ProgramVariable, Constant>,
        parameters: &HashMap<Parameter, Constant>,
    ) -> Result<Constant, EvalError> {
        match self {
            Expression::Leaf(Leaf::Constant(c)) => Ok(*c),
            Expression::Leaf(Leaf::Variable(v)) => inputs
                .get(v)
                .copied()
                .ok_or_else(|| EvalError::UnboundVariable(v.name().to_string())),
            Expression::Leaf(Leaf::Parameter(p)) => parameters
                .get(p)
                .copied()
                .ok_or_else(|| EvalError::UnboundParameter(p.name().to_string())),
            Expression::App { component, args } => {
                let values = component
                    .holes()
                    .iter()
                    .map(|h| {
                        args.get(h)
                            .ok_or(EvalError::UnboundHole {
                                component: component.name(),
                                hole: h.name(),
                            })?
                            .evaluate(inputs, parameters)
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                component.eval(&values)
            }
        }
    }

    fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Expression)) {
        f(self);
        if let Expression::App { component, args } = self {
            for hole in component.holes() {
                if let Some(child) = args.get(hole) {
                    child.walk(f);
                }
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Leaf(l) => write!(f, "{l}"),
            Expression::App { component, .. } => {
                write!(f, "{component}(")?;
                for (idx, child) in self.children().into_iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{child}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::components;

    fn x() -> ProgramVariable {
        ProgramVariable::int("x")
    }

    fn y() -> ProgramVariable {
        ProgramVariable::int("y")
    }

    #[test]
    fn structural_equality_respects_argument_order() {
        let xy = Expression::apply(components::add(), [Expression::leaf(x()), Expression::leaf(y())]);
        let yx = Expression::apply(components::add(), [Expression::leaf(y()), Expression::leaf(x())]);

        assert_ne!(xy, yx);
        assert_eq!(xy.to_string(), "Add(x, y)");
    }

    fn holes(c: &Component) -> (Hole, Hole) {
        (c.holes()[0].clone(), c.holes()[1].clone())
    }

    #[test]
    fn app_and_apply_agree() {
        let add = components::add();
        let (left, right) = holes(&add);
        let by_map = Expression::app(
            add.clone(),
            [
                (right, Expression::leaf(y())),
                (left, Expression::leaf(x())),
            ],
        );
        let by_order = Expression::apply(add, [Expression::leaf(x()), Expression::leaf(y())]);

        assert_eq!(by_map, by_order);
    }

    #[test]
    fn evaluate_with_parameters() {
        let p = Parameter::int("p");
        let e = Expression::apply(components::add(), [Expression::leaf(x()), Expression::leaf(p.clone())]);
        let inputs = HashMap::from([(x(), Constant::Int(3))]);
        let params = HashMap::from([(p, Constant::Int(4))]);

        assert_eq!(e.evaluate(&inputs, &params).unwrap(), Constant::Int(7));
        assert!(matches!(
            e.evaluate(&inputs, &HashMap::new()),
            Err(EvalError::UnboundParameter(_))
        ));
        assert_eq!(e.instantiate(&params).to_string(), "Add(x, 4)");
    }

    #[test]
    fn validate_reports_partial_and_foreign_bindings() {
        let add = components::add();
        let (left, right) = holes(&add);
        let partial = Expression::app(add.clone(), [(left.clone(), Expression::leaf(x()))]);
        assert!(matches!(partial.validate(), Err(EvalError::UnboundHole { .. })));

        let ite = components::ite();
        let foreign = Expression::app(
            add.clone(),
            [
                (left, Expression::leaf(x())),
                (right, Expression::leaf(y())),
                (ite.holes()[0].clone(), Expression::leaf(Constant::TRUE)),
            ],
        );
        assert!(matches!(foreign.validate(), Err(EvalError::ForeignHole { .. })));

        let nested = Expression::apply(components::minus(), [partial]);
        assert!(nested.validate().is_err());
    }

    #[test]
    fn size_usage_and_containment() {
        let inner = Expression::apply(components::minus(), [Expression::leaf(x())]);
        let outer = Expression::apply(components::minus(), [inner.clone()]);

        assert_eq!(outer.size(), 2);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert_eq!(outer.usage()[&Node::Component(components::minus())], 2);
        assert_eq!(outer.usage()[&Node::from(x())], 1);
        assert_eq!(outer.leaves().len(), 1);
    }
}
