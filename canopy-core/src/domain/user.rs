//! User domain model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The owner of items, transactions and rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
}

impl User {
    pub fn new(id: Uuid, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_creation() {
        let id = Uuid::new_v4();
        let user = User::new(id, "test@example.com");
        assert_eq!(user.id, id);
        assert_eq!(user.email, "test@example.com");
    }
}
