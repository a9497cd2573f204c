//! Sign-in against the backend and the session bookkeeping that follows it.

use crate::backend::{Backend, BackendError, Registration};
use crate::model::UserProfile;
use crate::storage::{Session, StorageError};
use thiserror::Error;
use tracing::{info, instrument};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_USERNAME_LEN: usize = 3;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Please enter a valid email.")]
    InvalidEmail,

    #[error("Username must be at least {MIN_USERNAME_LEN} characters.")]
    UsernameTooShort,

    #[error("Password must be at least {MIN_PASSWORD_LEN} characters.")]
    PasswordTooShort,

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Kind of account created by [`signup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Customer,
    /// Restaurant staff managing a menu and an order board.
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }
}

/// Result of a successful sign-in.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedIn {
    pub user: UserProfile,
    /// Menu link scanned before signing in, to be opened now. Customers only.
    pub pending_menu_url: Option<String>,
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// At least two word characters with at most one inner `.` or `-`.
fn is_word_pair(s: &str) -> bool {
    match s.find(['.', '-']) {
        None => s.chars().count() >= 2 && s.chars().all(is_word),
        Some(i) => {
            let (head, tail) = (&s[..i], &s[i + 1..]);
            !head.is_empty()
                && !tail.is_empty()
                && head.chars().all(is_word)
                && tail.chars().all(is_word)
        }
    }
}

/// One or more `.xx` or `.xxx` labels.
fn is_suffix(s: &str) -> bool {
    let Some(labels) = s.strip_prefix('.') else {
        return false;
    };
    labels
        .split('.')
        .all(|l| (2..=3).contains(&l.len()) && l.chars().all(is_word))
}

/// Accepts `\w+([.-]?\w+)@\w+([.-]?\w+)(\.\w{2,3})+` with ASCII word characters,
/// the shape the sign-in and sign-up forms have always checked.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    is_word_pair(local)
        && domain
            .match_indices('.')
            .any(|(i, _)| is_word_pair(&domain[..i]) && is_suffix(&domain[i..]))
}

/// Validates the credentials, signs in and stores the session.
///
/// The cached restaurant profile is replaced by the one returned with the login, or
/// removed when there is none.
#[instrument(skip(backend, session, password))]
pub async fn login(
    backend: &dyn Backend,
    session: &Session,
    email: &str,
    password: &str,
) -> Result<SignedIn, AuthError> {
    let email = email.trim();
    if !is_valid_email(email) {
        return Err(AuthError::InvalidEmail);
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::PasswordTooShort);
    }

    let login = backend.login(email, password).await?;
    session.sign_in(login.token, &login.user).await?;
    match &login.restaurant {
        Some(restaurant) => session.set_restaurant(restaurant).await?,
        None => session.clear_restaurant().await?,
    }

    let pending_menu_url = if login.user.is_customer() {
        session.take_pending_menu_url().await?
    } else {
        None
    };
    info!(user_id = login.user.id, "Signed in");
    Ok(SignedIn {
        user: login.user,
        pending_menu_url,
    })
}

/// Validates the form and creates the account. The user signs in afterwards with
/// [`login`]; no session is stored here.
#[instrument(skip(backend, email, password))]
pub async fn signup(
    backend: &dyn Backend,
    username: &str,
    email: &str,
    password: &str,
    role: Role,
) -> Result<(), AuthError> {
    let username = username.trim();
    let email = email.trim();
    if !is_valid_email(email) {
        return Err(AuthError::InvalidEmail);
    }
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(AuthError::UsernameTooShort);
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::PasswordTooShort);
    }

    backend
        .register(&Registration {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: role.as_str().to_string(),
        })
        .await?;
    info!(role = role.as_str(), "Account created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{LoginSession, MemoryBackend};
    use crate::model::RestaurantProfile;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn account(role: &str, restaurant: Option<RestaurantProfile>) -> LoginSession {
        LoginSession {
            token: "jwt".into(),
            user: UserProfile {
                id: 3,
                username: Some("sam".into()),
                email: Some("sam@food.io".into()),
                role: Some(role.into()),
            },
            restaurant,
        }
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("sam@food.io"));
        assert!(is_valid_email("a.b@mail.example.com"));
        assert!(!is_valid_email("sam@food"));
        assert!(!is_valid_email("@food.io"));
        assert!(!is_valid_email("sam@food.online"));
        assert!(!is_valid_email("s am@food.io"));
        assert!(is_valid_email("first-last@food-hall.co.uk"));
        assert!(is_valid_email("sam_1@food.c1"));
        assert!(!is_valid_email("a..b@xy.com"));
        assert!(is_valid_email("a.b@xy.com"));
        assert!(!is_valid_email("a.b.c@xy.com"));
        assert!(!is_valid_email(".ab@xy.com"));
        assert!(!is_valid_email("s@food.io"));
        assert!(!is_valid_email("sam@food."));
        assert!(!is_valid_email("sam@@food.io"));
    }

    #[tokio::test]
    async fn signup_validates_before_any_request() {
        let backend = MemoryBackend::new();
        assert!(matches!(
            signup(&backend, "sam", "sam@food", "secret1", Role::Customer).await,
            Err(AuthError::InvalidEmail)
        ));
        assert!(matches!(
            signup(&backend, "sa", "sam@food.io", "secret1", Role::Customer).await,
            Err(AuthError::UsernameTooShort)
        ));
        assert!(matches!(
            signup(&backend, "sam", "sam@food.io", "12345", Role::Customer).await,
            Err(AuthError::PasswordTooShort)
        ));
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn signed_up_account_can_log_in() {
        let backend = MemoryBackend::new();
        let session = Session::new(Arc::new(MemoryStore::new()));
        signup(&backend, " sam ", "sam@food.io", "secret1", Role::Admin).await.unwrap();

        let signed_in = login(&backend, &session, "sam@food.io", "secret1").await.unwrap();
        assert_eq!(signed_in.user.username.as_deref(), Some("sam"));
        assert_eq!(signed_in.user.role.as_deref(), Some("admin"));
    }

    #[tokio::test]
    async fn taken_email_surfaces_backend_message() {
        let backend = MemoryBackend::new();
        signup(&backend, "sam", "sam@food.io", "secret1", Role::Customer).await.unwrap();

        let err = signup(&backend, "sammy", "sam@food.io", "secret1", Role::Customer)
            .await
            .unwrap_err();
        match err {
            AuthError::Backend(BackendError::Status { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Email or Username are already taken");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn validation_happens_before_any_request() {
        let backend = MemoryBackend::new();
        let session = Session::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            login(&backend, &session, "nope", "secret1").await,
            Err(AuthError::InvalidEmail)
        ));
        assert!(matches!(
            login(&backend, &session, "sam@food.io", "12345").await,
            Err(AuthError::PasswordTooShort)
        ));
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn customer_login_resumes_pending_menu() {
        let backend = MemoryBackend::new();
        backend.add_account("sam@food.io", "secret1", account("customer", None));
        let session = Session::new(Arc::new(MemoryStore::new()));
        session.set_pending_menu_url("http://h/api/menu-items").await.unwrap();

        let signed_in = login(&backend, &session, " sam@food.io ", "secret1").await.unwrap();
        assert_eq!(signed_in.pending_menu_url.as_deref(), Some("http://h/api/menu-items"));
        assert_eq!(session.token().await.unwrap().as_deref(), Some("jwt"));
        assert_eq!(session.pending_menu_url().await.unwrap(), None);
    }

    #[tokio::test]
    async fn admin_login_caches_restaurant() {
        let backend = MemoryBackend::new();
        let restaurant = RestaurantProfile {
            id: Some(1),
            document_id: "r1".into(),
            name: Some("Forkcast".into()),
        };
        backend.add_account("sam@food.io", "secret1", account("admin", Some(restaurant.clone())));
        let session = Session::new(Arc::new(MemoryStore::new()));

        let signed_in = login(&backend, &session, "sam@food.io", "secret1").await.unwrap();
        assert_eq!(signed_in.pending_menu_url, None);
        assert_eq!(session.restaurant().await.unwrap(), Some(restaurant));

        assert!(matches!(
            login(&backend, &session, "sam@food.io", "wrong-password").await,
            Err(AuthError::Backend(BackendError::Status { status: 400, .. }))
        ));
    }
}
