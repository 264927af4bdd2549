//! Structural validation of condition trees
//!
//! Walks a draft tree depth-first and collects every problem it finds,
//! tagging each message with the path of the offending node
//! (`root/and[1]/or[0]`) so an editor can point at it. Validation never
//! fails as such: the report is always returned, and a tree is usable only
//! when the report carries no errors.
//!
//! Shape errors the JSON layer already rejects (a node that is neither a
//! group nor a leaf, a leaf missing one of field/op/value) never reach this
//! module; deserialization reports those at parse time.

use serde::Serialize;

use crate::domain::condition::{ConditionLeaf, ConditionNode, ConditionOp, DraftConditions, RuleField};

/// Result of validating a condition tree
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Validate a draft condition tree, collecting all errors
pub fn validate(conditions: &DraftConditions) -> ValidationReport {
    let mut errors = Vec::new();
    visit(conditions.node(), "root", &mut errors);
    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}

fn visit(node: &ConditionNode, path: &str, errors: &mut Vec<String>) {
    match node {
        ConditionNode::Group(group) => {
            let key = group.op().as_str();
            if group.children().is_empty() {
                errors.push(format!("{}: {} group must have at least one child", path, key));
                return;
            }
            for (i, child) in group.children().iter().enumerate() {
                visit(child, &format!("{}/{}[{}]", path, key, i), errors);
            }
        }
        ConditionNode::Leaf(leaf) => visit_leaf(leaf, path, errors),
    }
}

fn visit_leaf(leaf: &ConditionLeaf, path: &str, errors: &mut Vec<String>) {
    if leaf.field == RuleField::Amount {
        if !leaf.op.is_numeric_op() {
            errors.push(format!(
                "{}: operator '{}' cannot be used with amount",
                path,
                leaf.op.as_str()
            ));
        }
        if leaf.value.as_amount().is_none() {
            errors.push(format!("{}: amount value must be a number", path));
        }
        return;
    }

    if !leaf.op.is_string_op() {
        errors.push(format!(
            "{}: operator '{}' requires a numeric field",
            path,
            leaf.op.as_str()
        ));
        return;
    }

    if leaf.op == ConditionOp::In {
        if leaf.value.to_list().is_empty() {
            errors.push(format!("{}: 'in' requires at least one value", path));
        }
    } else if leaf.value.to_text().is_empty() {
        errors.push(format!("{}: value must not be empty", path));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::condition::{ConditionGroup, ConditionValue, GroupOp};
    use rust_decimal::Decimal;

    fn draft(node: ConditionNode) -> DraftConditions {
        DraftConditions(node)
    }

    fn text_leaf(field: RuleField, op: ConditionOp, value: &str) -> ConditionNode {
        ConditionNode::leaf(field, op, ConditionValue::Text(value.to_string()))
    }

    #[test]
    fn test_seed_tree_with_value_is_valid() {
        let mut group = ConditionGroup::seed();
        group.replace_child(
            0,
            text_leaf(RuleField::MerchantName, ConditionOp::Contains, "starbucks"),
        );
        let report = validate(&draft(ConditionNode::Group(group)));
        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_seed_tree_empty_value_is_invalid() {
        // the freshly seeded leaf has an empty value, which cannot be saved
        let report = validate(&DraftConditions::seed());
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["root/and[0]: value must not be empty"]);
    }

    #[test]
    fn test_empty_group_yields_single_error() {
        let report = validate(&draft(ConditionNode::Group(ConditionGroup::Or(vec![]))));
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0], "root: or group must have at least one child");
    }

    #[test]
    fn test_amount_value_must_be_numeric() {
        let node = ConditionNode::leaf(
            RuleField::Amount,
            ConditionOp::Gt,
            ConditionValue::Text("fifty".to_string()),
        );
        let report = validate(&draft(node));
        assert_eq!(report.errors, vec!["root: amount value must be a number"]);
    }

    #[test]
    fn test_empty_string_amount_is_not_a_number() {
        let node = ConditionNode::leaf(
            RuleField::Amount,
            ConditionOp::Gt,
            ConditionValue::Text(String::new()),
        );
        let report = validate(&draft(node));
        assert!(!report.valid);
    }

    #[test]
    fn test_in_requires_at_least_one_value() {
        let node = ConditionNode::leaf(
            RuleField::Account,
            ConditionOp::In,
            ConditionValue::Text(" , ,".to_string()),
        );
        let report = validate(&draft(node));
        assert_eq!(report.errors, vec!["root: 'in' requires at least one value"]);
    }

    #[test]
    fn test_in_accepts_comma_separated_string() {
        let node = ConditionNode::leaf(
            RuleField::Account,
            ConditionOp::In,
            ConditionValue::Text("acc_1, acc_2".to_string()),
        );
        assert!(validate(&draft(node)).valid);
    }

    #[test]
    fn test_operator_field_mismatch_is_rejected() {
        let report = validate(&draft(text_leaf(
            RuleField::MerchantName,
            ConditionOp::Gt,
            "starbucks",
        )));
        assert_eq!(
            report.errors,
            vec!["root: operator 'gt' requires a numeric field"]
        );

        let node = ConditionNode::leaf(
            RuleField::Amount,
            ConditionOp::Contains,
            ConditionValue::Number(Decimal::from(50)),
        );
        let report = validate(&draft(node));
        assert_eq!(
            report.errors,
            vec!["root: operator 'contains' cannot be used with amount"]
        );
    }

    #[test]
    fn test_errors_are_collected_across_the_whole_tree() {
        let node = ConditionNode::Group(ConditionGroup::new(
            GroupOp::And,
            vec![
                text_leaf(RuleField::Name, ConditionOp::Equals, ""),
                ConditionNode::Group(ConditionGroup::new(
                    GroupOp::Or,
                    vec![
                        ConditionNode::leaf(
                            RuleField::Amount,
                            ConditionOp::Lte,
                            ConditionValue::Text("abc".to_string()),
                        ),
                        text_leaf(RuleField::Account, ConditionOp::Equals, "acc_1"),
                    ],
                )),
            ],
        ));
        let report = validate(&draft(node));
        assert_eq!(
            report.errors,
            vec![
                "root/and[0]: value must not be empty",
                "root/and[1]/or[0]: amount value must be a number",
            ]
        );
    }

    #[test]
    fn test_nested_path_labels() {
        let node = ConditionNode::Group(ConditionGroup::new(
            GroupOp::And,
            vec![ConditionNode::Group(ConditionGroup::new(GroupOp::Or, vec![]))],
        ));
        let report = validate(&draft(node));
        assert_eq!(
            report.errors,
            vec!["root/and[0]: or group must have at least one child"]
        );
    }
}
