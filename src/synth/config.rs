use crate::expr::Expression;

/// Configuration of tree-bounded synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TbsConfig {
    /// Maximum number of component applications in the program. Leaves are
    /// limited only by their multiplicity.
    pub bound: usize,
    /// Require the program to consume the whole multiset.
    pub unique_usage: bool,
    /// Subtrees that must not occur anywhere in the program.
    pub forbidden: Vec<Expression>,
}

impl TbsConfig {
    pub fn new(bound: usize) -> Self {
        Self {
            bound,
            unique_usage: true,
            forbidden: Vec::new(),
        }
    }

    pub fn disable_unique_usage(mut self) -> Self {
        self.unique_usage = false;
        self
    }

    pub fn with_forbidden(mut self, forbidden: Vec<Expression>) -> Self {
        self.forbidden = forbidden;
        self
    }

    pub fn forbid(mut self, pattern: Expression) -> Self {
        if !self.forbidden.contains(&pattern) {
            self.forbidden.push(pattern);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ProgramVariable;

    #[test]
    fn defaults_and_builders() {
        let x = Expression::leaf(ProgramVariable::int("x"));
        let cfg = TbsConfig::new(3);
        assert!(cfg.unique_usage);
        assert!(cfg.forbidden.is_empty());

        let cfg = cfg.disable_unique_usage().forbid(x.clone()).forbid(x.clone());
        assert!(!cfg.unique_usage);
        assert_eq!(cfg.forbidden, vec![x]);
    }
}
