/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and validation
/// - [`jwt`]: HS256 access token issuing and validation
/// - [`middleware`]: bearer token middleware that resolves the current user
/// - [`authorization`]: superuser and ownership checks
///
/// # Example
///
/// ```no_run
/// use competency_shared::auth::password::{hash_password, verify_password};
/// use competency_shared::auth::jwt::{create_token, validate_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password1")?;
/// assert!(verify_password("user_password1", &hash)?);
///
/// let user_id = Uuid::new_v4();
/// let token = create_token(&Claims::new(user_id), "a-secret-of-at-least-32-characters!")?;
/// let claims = validate_token(&token, "a-secret-of-at-least-32-characters!")?;
/// assert_eq!(claims.sub, user_id);
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
