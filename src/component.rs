use std::fmt;

use crate::error::EvalError;
use crate::expr::{Constant, Sort};

/// A typed argument slot of a component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hole {
    name: &'static str,
    sort: Sort,
}

impl Hole {
    pub const fn new(name: &'static str, sort: Sort) -> Self {
        Self { name, sort }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }
}

impl fmt::Display for Hole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.sort)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operator {
    Add,
    Sub,
    Mult,
    /// Integer negation.
    Minus,
    /// Integer-valued if-then-else.
    Ite,
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Neq,
    And,
    Or,
    Not,
    Impl,
    Iff,
}

impl Operator {
    pub const ALL: [Operator; 16] = [
        Operator::Add,
        Operator::Sub,
        Operator::Mult,
        Operator::Minus,
        Operator::Ite,
        Operator::Gt,
        Operator::Ge,
        Operator::Lt,
        Operator::Le,
        Operator::Eq,
        Operator::Neq,
        Operator::And,
        Operator::Or,
        Operator::Not,
        Operator::Impl,
        Operator::Iff,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operator::Add => "Add",
            Operator::Sub => "Sub",
            Operator::Mult => "Mult",
            Operator::Minus => "Minus",
            Operator::Ite => "ITE",
            Operator::Gt => "Greater",
            Operator::Ge => "GreaterOrEqual",
            Operator::Lt => "Less",
            Operator::Le => "LessOrEqual",
            Operator::Eq => "Equal",
            Operator::Neq => "NotEqual",
            Operator::And => "And",
            Operator::Or => "Or",
            Operator::Not => "Not",
            Operator::Impl => "Impl",
            Operator::Iff => "Iff",
        }
    }

    fn signature(self) -> (Vec<Hole>, Sort) {
        use Sort::{Bool, Int};

        let int_binop = || vec![Hole::new("left", Int), Hole::new("right", Int)];
        let bool_binop = || vec![Hole::new("left", Bool), Hole::new("right", Bool)];

        match self {
            Operator::Add | Operator::Sub | Operator::Mult => (int_binop(), Int),
            Operator::Minus => (vec![Hole::new("arg", Int)], Int),
            Operator::Ite => (
                vec![
                    Hole::new("condition", Bool),
                    Hole::new("then", Int),
                    Hole::new("else", Int),
                ],
                Int,
            ),
            Operator::Gt
            | Operator::Ge
            | Operator::Lt
            | Operator::Le
            | Operator::Eq
            | Operator::Neq => (int_binop(), Bool),
            Operator::And | Operator::Or | Operator::Impl | Operator::Iff => (bool_binop(), Bool),
            Operator::Not => (vec![Hole::new("arg", Bool)], Bool),
        }
    }

    /// Concrete semantics. `args` must follow the component's hole order.
    pub fn apply(self, args: &[Constant]) -> Result<Constant, EvalError> {
        let int = |idx: usize| -> Result<i64, EvalError> {
            match args.get(idx) {
                Some(Constant::Int(v)) => Ok(*v),
                Some(other) => Err(EvalError::SortMismatch {
                    expected: Sort::Int,
                    found: other.sort(),
                }),
                None => Err(EvalError::MalformedApplication(self.name())),
            }
        };
        let boolean = |idx: usize| -> Result<bool, EvalError> {
            match args.get(idx) {
                Some(Constant::Bool(v)) => Ok(*v),
                Some(other) => Err(EvalError::SortMismatch {
                    expected: Sort::Bool,
                    found: other.sort(),
                }),
                None => Err(EvalError::MalformedApplication(self.name())),
            }
        };
        let overflow = || EvalError::Overflow(self.name());

        let res = match self {
            Operator::Add => Constant::Int(int(0)?.checked_add(int(1)?).ok_or_else(overflow)?),
            Operator::Sub => Constant::Int(int(0)?.checked_sub(int(1)?).ok_or_else(overflow)?),
            Operator::Mult => Constant::Int(int(0)?.checked_mul(int(1)?).ok_or_else(overflow)?),
            Operator::Minus => Constant::Int(int(0)?.checked_neg().ok_or_else(overflow)?),
            Operator::Ite => {
                if boolean(0)? {
                    Constant::Int(int(1)?)
                } else {
                    Constant::Int(int(2)?)
                }
            }
            Operator::Gt => Constant::Bool(int(0)? > int(1)?),
            Operator::Ge => Constant::Bool(int(0)? >= int(1)?),
            Operator::Lt => Constant::Bool(int(0)? < int(1)?),
            Operator::Le => Constant::Bool(int(0)? <= int(1)?),
            Operator::Eq => Constant::Bool(int(0)? == int(1)?),
            Operator::Neq => Constant::Bool(int(0)? != int(1)?),
            Operator::And => Constant::Bool(boolean(0)? && boolean(1)?),
            Operator::Or => Constant::Bool(boolean(0)? || boolean(1)?),
            Operator::Not => Constant::Bool(!boolean(0)?),
            Operator::Impl => Constant::Bool(!boolean(0)? || boolean(1)?),
            Operator::Iff => Constant::Bool(boolean(0)? == boolean(1)?),
        };

        Ok(res)
    }
}

/// A named operator with a fixed, ordered list of holes.
///
/// Two components are the same component iff they wrap the same operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Component {
    operator: Operator,
    holes: Vec<Hole>,
    sort: Sort,
}

impl Component {
    pub fn new(operator: Operator) -> Self {
        let (holes, sort) = operator.signature();

        Self {
            operator,
            holes,
            sort,
        }
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn name(&self) -> &'static str {
        self.operator.name()
    }

    pub fn holes(&self) -> &[Hole] {
        &self.holes
    }

    pub fn arity(&self) -> usize {
        self.holes.len()
    }

    /// Sort of the value this component produces.
    pub fn sort(&self) -> Sort {
        self.sort
    }

    pub fn hole(&self, name: &str) -> Option<&Hole> {
        self.holes.iter().find(|h| h.name == name)
    }

    pub fn hole_index(&self, hole: &Hole) -> Option<usize> {
        self.holes.iter().position(|h| h == hole)
    }

    pub fn eval(&self, args: &[Constant]) -> Result<Constant, EvalError> {
        if args.len() != self.arity() {
            return Err(EvalError::MalformedApplication(self.name()));
        }

        self.operator.apply(args)
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The standard component library.
pub mod components {
    use super::{Component, Operator};

    pub fn add() -> Component {
        Component::new(Operator::Add)
    }

    pub fn sub() -> Component {
        Component::new(Operator::Sub)
    }

    pub fn mult() -> Component {
        Component::new(Operator::Mult)
    }

    pub fn minus() -> Component {
        Component::new(Operator::Minus)
    }

    pub fn ite() -> Component {
        Component::new(Operator::Ite)
    }

    pub fn gt() -> Component {
        Component::new(Operator::Gt)
    }

    pub fn ge() -> Component {
        Component::new(Operator::Ge)
    }

    pub fn lt() -> Component {
        Component::new(Operator::Lt)
    }

    pub fn le() -> Component {
        Component::new(Operator::Le)
    }

    pub fn eq() -> Component {
        Component::new(Operator::Eq)
    }

    pub fn neq() -> Component {
        Component::new(Operator::Neq)
    }

    pub fn and() -> Component {
        Component::new(Operator::And)
    }

    pub fn or() -> Component {
        Component::new(Operator::Or)
    }

    pub fn not() -> Component {
        Component::new(Operator::Not)
    }

    pub fn implies() -> Component {
        Component::new(Operator::Impl)
    }

    pub fn iff() -> Component {
        Component::new(Operator::Iff)
    }
}
