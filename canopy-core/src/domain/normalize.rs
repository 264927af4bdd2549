//! Author ↔ storage normalization of condition trees
//!
//! The rule editor frames amounts as positive spend ("amount greater than
//! 50" = spent more than $50), while transactions store money leaving the
//! account as negative. Bridging the two means negating the authored value
//! and flipping the comparison so its meaning survives the sign change:
//! `x > v  ⇔  -x < -v`. A $60 expense is stored as -60, and an authored
//! `gt 50` becomes `lt -50`, which -60 satisfies.
//!
//! The transform is applied exactly once in each direction, at the
//! [`DraftConditions`] / [`StoredConditions`] type boundary: normalize on
//! save, invert on load-for-edit. Since negation and the operator flip are
//! both involutions, the inverse is the same rewrite.

use crate::domain::condition::{
    ConditionGroup, ConditionLeaf, ConditionNode, ConditionOp, ConditionValue, DraftConditions,
    RuleField, StoredConditions,
};

/// Flip a comparison operator to preserve its meaning under negation of
/// both sides
///
/// `equals` is its own flip; the non-comparison operators pass through
/// untouched (they never apply to amounts past validation).
pub fn flip_comparison(op: ConditionOp) -> ConditionOp {
    match op {
        ConditionOp::Equals => ConditionOp::Equals,
        ConditionOp::Gt => ConditionOp::Lt,
        ConditionOp::Gte => ConditionOp::Lte,
        ConditionOp::Lt => ConditionOp::Gt,
        ConditionOp::Lte => ConditionOp::Gte,
        ConditionOp::Contains | ConditionOp::In => op,
    }
}

/// Rewrite amount leaves (negate value, flip comparison), recursing through
/// groups and passing string leaves through untouched.
///
/// Amount values are canonicalized to numbers here; an authored numeric
/// string like `"50"` comes back from storage as the number it parsed to.
/// A value that does not parse is left alone — the validator has already
/// reported it, and callers do not normalize invalid trees.
fn transform(node: &ConditionNode) -> ConditionNode {
    match node {
        ConditionNode::Group(group) => {
            let children = group.children().iter().map(transform).collect();
            ConditionNode::Group(ConditionGroup::new(group.op(), children))
        }
        ConditionNode::Leaf(leaf) if leaf.field == RuleField::Amount => {
            match leaf.value.as_amount() {
                Some(amount) => ConditionNode::Leaf(ConditionLeaf {
                    field: leaf.field,
                    op: flip_comparison(leaf.op),
                    value: ConditionValue::Number(-amount),
                }),
                None => ConditionNode::Leaf(leaf.clone()),
            }
        }
        ConditionNode::Leaf(leaf) => ConditionNode::Leaf(leaf.clone()),
    }
}

impl DraftConditions {
    /// Convert to the storage/evaluation representation
    pub fn normalize(&self) -> StoredConditions {
        StoredConditions(transform(self.node()))
    }
}

impl StoredConditions {
    /// Convert back to the author-facing representation (load-for-edit)
    pub fn to_draft(&self) -> DraftConditions {
        DraftConditions(transform(self.node()))
    }
}
