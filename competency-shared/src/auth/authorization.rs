/// Authorization checks
///
/// There are two roles: regular users and superusers. Superusers manage
/// accounts; everyone else may only see and change their own data.
///
/// # Example
///
/// ```no_run
/// use competency_shared::auth::authorization::{require_self_or_superuser, require_superuser};
/// use competency_shared::models::user::User;
/// use uuid::Uuid;
///
/// fn check(caller: &User, target: Uuid) -> Result<(), Box<dyn std::error::Error>> {
///     require_self_or_superuser(caller, target)?;
///     require_superuser(caller)?;
///     Ok(())
/// }
/// ```

use uuid::Uuid;

use crate::models::user::User;

/// Error type for authorization checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    #[error("The user doesn't have enough privileges")]
    NotSuperuser,

    /// Caller is neither the resource owner nor a superuser
    #[error("Not authorized to access this resource")]
    NotAuthorized,
}

/// Checks that the caller is a superuser
pub fn require_superuser(caller: &User) -> Result<(), AuthzError> {
    if !caller.is_superuser {
        return Err(AuthzError::NotSuperuser);
    }

    Ok(())
}

/// Checks that the caller is `target_user_id` or a superuser
pub fn require_self_or_superuser(caller: &User, target_user_id: Uuid) -> Result<(), AuthzError> {
    if caller.id != target_user_id && !caller.is_superuser {
        return Err(AuthzError::NotAuthorized);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(is_superuser: bool) -> User {
        User {
            id: Uuid::new_v4(),
            email: "someone@example.com".to_string(),
            name: "Someone".to_string(),
            password_hash: String::new(),
            department: None,
            position: None,
            is_active: true,
            is_superuser,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_require_superuser() {
        assert!(require_superuser(&user(true)).is_ok());
        assert_eq!(require_superuser(&user(false)), Err(AuthzError::NotSuperuser));
    }

    #[test]
    fn test_require_self_or_superuser() {
        let regular = user(false);
        assert!(require_self_or_superuser(&regular, regular.id).is_ok());
        assert_eq!(
            require_self_or_superuser(&regular, Uuid::new_v4()),
            Err(AuthzError::NotAuthorized)
        );

        let admin = user(true);
        assert!(require_self_or_superuser(&admin, Uuid::new_v4()).is_ok());
    }

    #[test]
    fn test_authz_error_display() {
        assert!(AuthzError::NotSuperuser.to_string().contains("privileges"));
        assert!(AuthzError::NotAuthorized.to_string().contains("Not authorized"));
    }
}
