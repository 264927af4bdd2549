//! Core domain entities
//!
//! All business entities and the rule-engine logic are defined here.
//! These are pure data structures and pure functions - no I/O or external
//! dependencies.

mod account;
pub mod category;
pub mod condition;
mod evaluate;
mod item;
mod normalize;
pub mod result;
mod rule;
mod transaction;
mod user;
mod validate;

pub use account::Account;
pub use condition::{
    ConditionGroup, ConditionLeaf, ConditionNode, ConditionOp, ConditionValue, DraftConditions,
    GroupOp, RuleField, StoredConditions,
};
pub use item::Item;
pub use normalize::flip_comparison;
pub use rule::TransactionRule;
pub use transaction::Transaction;
pub use user::User;
pub use validate::{validate, ValidationReport};
