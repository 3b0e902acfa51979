use std::collections::HashMap;
use std::fmt;

use crate::component::Component;
use crate::expr::{Leaf, Node};

/// The palette handed to the synthesizer: distinct leaves and components,
/// each with a multiplicity of at least one. Insertion order is kept so that
/// encodings are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentMultiset {
    entries: Vec<(Node, usize)>,
}

impl ComponentMultiset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: impl Into<Node>) {
        self.add_many(node, 1)
    }

    /// Adds `count` more copies of `node`. Adding zero copies is a no-op.
    pub fn add_many(&mut self, node: impl Into<Node>, count: usize) {
        if count == 0 {
            return;
        }

        let node = node.into();
        match self.entries.iter_mut().find(|(n, _)| *n == node) {
            Some((_, c)) => *c += count,
            None => self.entries.push((node, count)),
        }
    }

    pub fn with(mut self, node: impl Into<Node>) -> Self {
        self.add(node);
        self
    }

    pub fn with_many(mut self, node: impl Into<Node>, count: usize) -> Self {
        self.add_many(node, count);
        self
    }

    pub fn count(&self, node: &Node) -> usize {
        self.entries
            .iter()
            .find(|(n, _)| n == node)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Sum of all multiplicities.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Node, usize)> {
        self.entries.iter().map(|(n, c)| (n, *c))
    }

    pub fn leaves(&self) -> impl Iterator<Item = (&Leaf, usize)> {
        self.entries.iter().filter_map(|(n, c)| match n {
            Node::Leaf(l) => Some((l, *c)),
            Node::Component(_) => None,
        })
    }

    pub fn components(&self) -> impl Iterator<Item = (&Component, usize)> {
        self.entries.iter().filter_map(|(n, c)| match n {
            Node::Component(comp) => Some((comp, *c)),
            Node::Leaf(_) => None,
        })
    }

    /// Whether a program using `usage` fits into this multiset. With `exact`
    /// every entry must be consumed completely.
    pub fn admits(&self, usage: &HashMap<Node, usize>, exact: bool) -> bool {
        let within = usage.iter().all(|(node, used)| *used <= self.count(node));
        if !exact {
            return within;
        }

        within
            && self
                .entries
                .iter()
                .all(|(node, c)| usage.get(node).copied().unwrap_or(0) == *c)
    }
}

impl<N: Into<Node>> FromIterator<N> for ComponentMultiset {
    fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
        let mut out = Self::new();
        for node in iter {
            out.add(node);
        }
        out
    }
}

impl fmt::Display for ComponentMultiset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (idx, (node, count)) in self.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            if count == 1 {
                write!(f, "{node}")?;
            } else {
                write!(f, "{node}:{count}")?;
            }
        }
        write!(f, "}}")
    }
}
