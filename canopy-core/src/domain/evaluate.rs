//! Condition tree evaluation against transactions
//!
//! Operates on [`StoredConditions`] only: trees must be validated and
//! normalized before they get here. A leaf that violates the field/operator
//! type constraints is a bug in the calling code, not user input, and
//! panics — silently misreading a money comparison would be worse.
//!
//! Matching looks at immutable transaction attributes (name, merchant,
//! account, amount), never at the current category, which is what makes
//! repeated rule runs idempotent.

use crate::domain::condition::{
    ConditionLeaf, ConditionNode, ConditionOp, GroupOp, RuleField, StoredConditions,
};
use crate::domain::Transaction;

impl StoredConditions {
    /// Whether this condition tree matches the given transaction
    pub fn matches(&self, tx: &Transaction) -> bool {
        eval_node(self.node(), tx)
    }
}

fn eval_node(node: &ConditionNode, tx: &Transaction) -> bool {
    match node {
        ConditionNode::Group(group) => {
            let children = group.children();
            match group.op() {
                // short-circuits left to right; empty AND is vacuously true
                GroupOp::And => children.iter().all(|child| eval_node(child, tx)),
                GroupOp::Or => children.iter().any(|child| eval_node(child, tx)),
            }
        }
        ConditionNode::Leaf(leaf) => eval_leaf(leaf, tx),
    }
}

fn eval_leaf(leaf: &ConditionLeaf, tx: &Transaction) -> bool {
    if leaf.field == RuleField::Amount {
        let target = leaf
            .value
            .as_amount()
            .unwrap_or_else(|| panic!("unvalidated amount condition reached evaluation: {:?}", leaf));
        return match leaf.op {
            ConditionOp::Equals => tx.amount == target,
            ConditionOp::Gt => tx.amount > target,
            ConditionOp::Gte => tx.amount >= target,
            ConditionOp::Lt => tx.amount < target,
            ConditionOp::Lte => tx.amount <= target,
            ConditionOp::Contains | ConditionOp::In => {
                panic!("operator '{}' on amount reached evaluation", leaf.op.as_str())
            }
        };
    }

    let actual = field_text(tx, leaf.field);
    match leaf.op {
        // exact matches are case-sensitive; `contains` is not, since
        // merchant casing varies between institutions
        ConditionOp::Equals => actual == leaf.value.to_text(),
        ConditionOp::Contains => actual
            .to_lowercase()
            .contains(&leaf.value.to_text().to_lowercase()),
        ConditionOp::In => leaf.value.to_list().iter().any(|v| v == actual),
        ConditionOp::Gt | ConditionOp::Gte | ConditionOp::Lt | ConditionOp::Lte => panic!(
            "operator '{}' on field '{}' reached evaluation",
            leaf.op.as_str(),
            leaf.field.as_str()
        ),
    }
}

/// The transaction attribute a string field reads; missing attributes read
/// as the empty string
fn field_text(tx: &Transaction, field: RuleField) -> &str {
    match field {
        RuleField::Name => &tx.name,
        RuleField::MerchantName => tx.merchant_name.as_deref().unwrap_or(""),
        RuleField::Account => &tx.account_id,
        RuleField::Amount => unreachable!("amount is not a string field"),
    }
}
