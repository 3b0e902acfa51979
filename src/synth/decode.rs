use std::collections::HashMap;

use log::trace;

use crate::error::SynthesisError;
use crate::expr::{Constant, Expression, Parameter, Sort};
use crate::smt::Model;
use crate::synth::skeleton::Skeleton;
use crate::synth::Synthesized;

struct Decoder<'a> {
    skeleton: &'a Skeleton,
    model: &'a Model,
    consumed: Vec<bool>,
}

/// Rebuilds the program a model of `skeleton` describes, starting at the
/// root and following hole choices down to the leaves.
///
/// Models that violate the tree shape (a slot feeding two holes, a hole
/// reading a later slot, a used slot without a component) are rejected.
pub fn decode(skeleton: &Skeleton, model: &Model) -> Result<Synthesized, SynthesisError> {
    let mut decoder = Decoder {
        skeleton,
        model,
        consumed: vec![false; skeleton.slots.len()],
    };

    let root = decoder.int(&skeleton.root)?;
    let expression = decoder.source(root, skeleton.source_count())?;
    let parameters = decoder.parameters(&expression)?;

    Ok(Synthesized {
        expression,
        parameters,
    })
}

fn inconsistent(msg: String) -> SynthesisError {
    SynthesisError::InconsistentModel(msg)
}

impl<'a> Decoder<'a> {
    fn int(&self, var: &str) -> Result<i64, SynthesisError> {
        self.model
            .get_int(var)
            .ok_or_else(|| inconsistent(format!("no representable value for {var}")))
    }

    fn bool(&self, var: &str) -> Result<bool, SynthesisError> {
        self.model
            .get_bool(var)
            .ok_or_else(|| inconsistent(format!("no representable value for {var}")))
    }

    /// Decodes source `value`, which must be below `limit`.
    fn source(&mut self, value: i64, limit: usize) -> Result<Expression, SynthesisError> {
        let source = usize::try_from(value)
            .ok()
            .filter(|s| *s < limit)
            .ok_or_else(|| inconsistent(format!("source {value} out of range 0..{limit}")))?;

        let base = self.skeleton.slot_base();
        if source < base {
            let leaf = self.skeleton.leaves[source].leaf.clone();
            trace!("Source {source} is leaf {leaf}");
            return Ok(Expression::Leaf(leaf));
        }

        self.slot(source - base)
    }

    fn slot(&mut self, slot: usize) -> Result<Expression, SynthesisError> {
        if std::mem::replace(&mut self.consumed[slot], true) {
            return Err(inconsistent(format!("slot {slot} feeds more than one hole")));
        }

        let uses = &self.skeleton.slots[slot].uses;
        let mut selected = None;
        for (c, var) in uses.iter().enumerate() {
            if self.bool(var)? {
                if selected.is_some() {
                    return Err(inconsistent(format!("slot {slot} holds two components")));
                }
                selected = Some(c);
            }
        }
        let c = selected.ok_or_else(|| inconsistent(format!("slot {slot} is read but unused")))?;
        let component = self.skeleton.components[c].0.clone();
        trace!("Slot {slot} holds {component}");

        // Holes of slot `i` read leaves or slots below `i`.
        let limit = self.skeleton.slot_base() + slot;
        let mut args = Vec::with_capacity(component.arity());
        for (pos, hole) in component.holes().iter().enumerate() {
            let choice = self.int(&self.skeleton.slots[slot].holes[pos])?;
            args.push((hole.clone(), self.source(choice, limit)?));
        }

        Ok(Expression::app(component, args))
    }

    fn parameters(
        &self,
        expression: &Expression,
    ) -> Result<HashMap<Parameter, Constant>, SynthesisError> {
        let mut out = HashMap::new();

        for p in expression.parameters() {
            if out.contains_key(p) {
                continue;
            }

            let var = self
                .skeleton
                .parameter_var(p)
                .ok_or_else(|| inconsistent(format!("parameter {} was never declared", p.name())))?;
            let value = match p.sort() {
                Sort::Int => Constant::Int(self.int(var)?),
                Sort::Bool => Constant::Bool(self.bool(var)?),
            };
            out.insert(p.clone(), value);
        }

        Ok(out)
    }
}
