/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`session`]: HS256 session token issue and validation
/// - [`middleware`]: session resolution and the [`middleware::Session`] extractor
///
/// # Example
///
/// ```no_run
/// use chrono::Duration;
/// use taskdeck_shared::auth::password::{hash_password, verify_password};
/// use taskdeck_shared::auth::session::{create_session_token, SessionClaims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let token = create_session_token(&SessionClaims::new(1, Duration::hours(24)), "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod middleware;
pub mod password;
pub mod session;
