//! Condition tree domain model
//!
//! A rule's matching logic is a recursive boolean tree: groups combine
//! children with AND/OR, leaves test one transaction field against a value.
//! The JSON wire shape is `{"and": [...]}` / `{"or": [...]}` for groups and
//! `{"field": ..., "op": ..., "value": ...}` for leaves.
//!
//! A tree exists in one of two representations, tracked by distinct types:
//!
//! - [`DraftConditions`] — the author-facing form ("amount greater than 50"
//!   meaning a $50 spend).
//! - [`StoredConditions`] — the persisted/evaluated form, with amount leaves
//!   rewritten to the signed storage convention (see the normalizer).
//!
//! Keeping the two as separate types means a tree can never be normalized
//! twice or evaluated un-normalized by accident.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Transaction attribute a leaf condition can test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleField {
    Name,
    MerchantName,
    Account,
    Amount,
}

impl RuleField {
    /// Whether this field carries a numeric value
    pub fn is_numeric(self) -> bool {
        matches!(self, RuleField::Amount)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RuleField::Name => "name",
            RuleField::MerchantName => "merchant_name",
            RuleField::Account => "account",
            RuleField::Amount => "amount",
        }
    }
}

/// Comparison operator for a leaf condition
///
/// String fields accept `equals`, `contains` and `in`; `amount` accepts
/// `equals` and the four ordering comparisons. The validator enforces the
/// pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionOp {
    Equals,
    Contains,
    In,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl ConditionOp {
    /// Operators legal on string fields
    pub fn is_string_op(self) -> bool {
        matches!(self, ConditionOp::Equals | ConditionOp::Contains | ConditionOp::In)
    }

    /// Operators legal on the amount field
    pub fn is_numeric_op(self) -> bool {
        matches!(
            self,
            ConditionOp::Equals
                | ConditionOp::Gt
                | ConditionOp::Gte
                | ConditionOp::Lt
                | ConditionOp::Lte
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConditionOp::Equals => "equals",
            ConditionOp::Contains => "contains",
            ConditionOp::In => "in",
            ConditionOp::Gt => "gt",
            ConditionOp::Gte => "gte",
            ConditionOp::Lt => "lt",
            ConditionOp::Lte => "lte",
        }
    }
}

/// Group connective
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOp {
    And,
    Or,
}

impl GroupOp {
    pub fn as_str(self) -> &'static str {
        match self {
            GroupOp::And => "and",
            GroupOp::Or => "or",
        }
    }
}

/// A leaf's comparison value
///
/// Authored values arrive loosely typed (rule editors present free-text
/// inputs): an amount may come in as a number or a numeric string, and an
/// `in` list as either a JSON array or one comma-separated string. The
/// coercion helpers below give the validator and the evaluator one shared
/// reading of the raw value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Number(Decimal),
    Text(String),
    List(Vec<String>),
}

impl ConditionValue {
    /// Coerce to an amount, if possible
    pub fn as_amount(&self) -> Option<Decimal> {
        match self {
            ConditionValue::Number(n) => Some(*n),
            ConditionValue::Text(s) => Decimal::from_str(s.trim()).ok(),
            ConditionValue::List(_) => None,
        }
    }

    /// Coerce to a single string
    pub fn to_text(&self) -> String {
        match self {
            ConditionValue::Text(s) => s.clone(),
            ConditionValue::Number(n) => n.to_string(),
            ConditionValue::List(items) => items.join(","),
        }
    }

    /// Effective list for the `in` operator: an array as-is, anything else
    /// comma-split; entries trimmed, empties dropped
    pub fn to_list(&self) -> Vec<String> {
        let items: Vec<String> = match self {
            ConditionValue::List(items) => items.clone(),
            other => other.to_text().split(',').map(str::to_string).collect(),
        };
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// A single testable predicate against one transaction field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionLeaf {
    pub field: RuleField,
    pub op: ConditionOp,
    pub value: ConditionValue,
}

impl Default for ConditionLeaf {
    /// The editor's starting point: `merchant_name contains ""`
    fn default() -> Self {
        Self {
            field: RuleField::MerchantName,
            op: ConditionOp::Contains,
            value: ConditionValue::Text(String::new()),
        }
    }
}

/// AND/OR combinator over child nodes
///
/// Serialized externally tagged, which reproduces the wire shape
/// `{"and": [...]}` / `{"or": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConditionGroup {
    #[serde(rename = "and")]
    And(Vec<ConditionNode>),
    #[serde(rename = "or")]
    Or(Vec<ConditionNode>),
}

/// One node in the condition tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionNode {
    Group(ConditionGroup),
    Leaf(ConditionLeaf),
}

impl ConditionGroup {
    pub fn new(op: GroupOp, children: Vec<ConditionNode>) -> Self {
        match op {
            GroupOp::And => ConditionGroup::And(children),
            GroupOp::Or => ConditionGroup::Or(children),
        }
    }

    /// A fresh group: AND over a single default leaf
    pub fn seed() -> Self {
        ConditionGroup::And(vec![ConditionNode::default_leaf()])
    }

    pub fn op(&self) -> GroupOp {
        match self {
            ConditionGroup::And(_) => GroupOp::And,
            ConditionGroup::Or(_) => GroupOp::Or,
        }
    }

    pub fn children(&self) -> &[ConditionNode] {
        match self {
            ConditionGroup::And(children) | ConditionGroup::Or(children) => children,
        }
    }

    fn children_mut(&mut self) -> &mut Vec<ConditionNode> {
        match self {
            ConditionGroup::And(children) | ConditionGroup::Or(children) => children,
        }
    }

    /// Switch the connective, keeping the children
    pub fn set_op(&mut self, op: GroupOp) {
        if self.op() != op {
            let children = std::mem::take(self.children_mut());
            *self = ConditionGroup::new(op, children);
        }
    }

    /// Append a default leaf condition
    pub fn add_condition(&mut self) {
        self.children_mut().push(ConditionNode::default_leaf());
    }

    /// Append a nested seed group
    pub fn add_group(&mut self) {
        self.children_mut().push(ConditionNode::Group(ConditionGroup::seed()));
    }

    /// Replace the child at `index`; out-of-range indexes are ignored
    pub fn replace_child(&mut self, index: usize, node: ConditionNode) {
        if let Some(slot) = self.children_mut().get_mut(index) {
            *slot = node;
        }
    }

    /// Remove the child at `index`
    ///
    /// Removing the last child re-seeds a single default leaf; a group is
    /// never left empty through this operation.
    pub fn remove_child(&mut self, index: usize) {
        let children = self.children_mut();
        if index < children.len() {
            children.remove(index);
        }
        if children.is_empty() {
            children.push(ConditionNode::default_leaf());
        }
    }
}

impl ConditionNode {
    /// A fresh default leaf
    pub fn default_leaf() -> Self {
        ConditionNode::Leaf(ConditionLeaf::default())
    }

    pub fn leaf(field: RuleField, op: ConditionOp, value: ConditionValue) -> Self {
        ConditionNode::Leaf(ConditionLeaf { field, op, value })
    }
}

impl fmt::Display for ConditionNode {
    /// Compact single-line rendering for listings, e.g.
    /// `(merchant_name contains "starbucks" and amount lt -50)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionNode::Group(group) => {
                write!(f, "(")?;
                for (i, child) in group.children().iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", group.op().as_str())?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, ")")
            }
            ConditionNode::Leaf(leaf) => {
                let value = match &leaf.value {
                    ConditionValue::Number(n) => n.to_string(),
                    ConditionValue::Text(s) => format!("{:?}", s),
                    ConditionValue::List(items) => format!("[{}]", items.join(", ")),
                };
                write!(f, "{} {} {}", leaf.field.as_str(), leaf.op.as_str(), value)
            }
        }
    }
}

/// An author-facing condition tree, in the representation the rule editor
/// works with (positive "spend" amounts)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftConditions(pub ConditionNode);

impl DraftConditions {
    /// The editor's starting tree: an AND group holding one default leaf
    pub fn seed() -> Self {
        DraftConditions(ConditionNode::Group(ConditionGroup::seed()))
    }

    pub fn node(&self) -> &ConditionNode {
        &self.0
    }
}

/// A normalized condition tree in the storage/evaluation representation
///
/// Obtained only through [`DraftConditions::normalize`] or deserialization
/// of persisted rules; there is deliberately no public constructor from a
/// raw node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredConditions(pub(crate) ConditionNode);

impl StoredConditions {
    pub fn node(&self) -> &ConditionNode {
        &self.0
    }
}
