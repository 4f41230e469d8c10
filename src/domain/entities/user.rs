//! User entity owned by the credential store.

use chrono::{DateTime, Utc};

/// A registered user.
///
/// `history` holds URL record ids in creation order. The ids are weak
/// references: nothing prevents a record from disappearing underneath them.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub history: Vec<i64>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Returns true if the record id is already part of the history.
    pub fn owns(&self, record_id: i64) -> bool {
        self.history.contains(&record_id)
    }
}

/// Input data for registering a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_owns() {
        let user = User {
            id: 7,
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            history: vec![3, 9],
            created_at: Utc::now(),
        };

        assert!(user.owns(3));
        assert!(user.owns(9));
        assert!(!user.owns(4));
    }
}
