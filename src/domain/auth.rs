//! Identity of the caller as issued by the auth service.

use serde::{Deserialize, Serialize};

use crate::domain::types::{TypeConstraintError, UserId};

/// Claims carried by the auth service token.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Numeric identifier of the account, used as the owner scope.
    pub sub: String,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
    pub exp: usize,
}

impl AuthenticatedUser {
    /// Owner identifier used to scope every listing.
    pub fn owner_id(&self) -> Result<UserId, TypeConstraintError> {
        let raw = self
            .sub
            .parse::<i32>()
            .map_err(|_| TypeConstraintError::InvalidValue(self.sub.clone()))?;
        UserId::new(raw)
    }
}

/// Returns `true` when `role` is present in `roles`.
pub fn check_role(role: &str, roles: &[String]) -> bool {
    roles.iter().any(|r| r == role)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(sub: &str) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: sub.to_string(),
            email: "owner@example.com".to_string(),
            name: "Owner".to_string(),
            roles: vec!["billing".to_string()],
            exp: 0,
        }
    }

    #[test]
    fn owner_id_parses_subject() {
        assert_eq!(user("42").owner_id().unwrap().get(), 42);
        assert!(user("abc").owner_id().is_err());
        assert_eq!(
            user("0").owner_id(),
            Err(TypeConstraintError::NonPositiveId)
        );
    }

    #[test]
    fn check_role_matches_exactly() {
        let roles = vec!["billing".to_string()];
        assert!(check_role("billing", &roles));
        assert!(!check_role("bill", &roles));
    }
}
