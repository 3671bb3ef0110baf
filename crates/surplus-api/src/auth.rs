use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Form, extract::State, response::Redirect};
use tracing::info;

use surplus_db::{IdentityRepository, SessionRepository};
use surplus_types::api::CredentialsForm;
use surplus_types::models::{AuthState, Identity, Session, UserType};
use surplus_types::pages::Page;

use crate::error::{AppError, FILL_ALL_FIELDS};
use crate::state::AppState;

/// Outcome of the page-load guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Proceed,
    /// The page was remembered; send the visitor to login.
    RedirectToLogin,
}

/// Anonymous visitors to a protected page are sent to login, and the page is
/// remembered so login can return them to it.
pub fn guard(sessions: &dyn SessionRepository, page: Page) -> anyhow::Result<GateDecision> {
    if !page.is_protected() {
        return Ok(GateDecision::Proceed);
    }
    let session = sessions.current()?;
    if AuthState::from_session(session.as_ref()) == AuthState::Anonymous {
        sessions.remember_intended_page(page)?;
        return Ok(GateDecision::RedirectToLogin);
    }
    Ok(GateDecision::Proceed)
}

/// Overwrites the session and picks where to go next: the remembered page
/// if there is one, otherwise the role's dashboard.
pub fn sign_in(
    sessions: &dyn SessionRepository,
    username: &str,
    user_type: UserType,
) -> anyhow::Result<Page> {
    sessions.save(&Session::new(username, user_type))?;
    let target = sessions
        .take_intended_page()?
        .unwrap_or_else(|| Page::default_for(user_type));
    info!("{} signed in as {}", username, user_type.as_str());
    Ok(target)
}

fn validate(form: &CredentialsForm) -> Result<UserType, AppError> {
    if form.username.is_empty() || form.password.is_empty() {
        return Err(AppError::MissingFields(FILL_ALL_FIELDS));
    }
    UserType::parse(&form.user_type).ok_or(AppError::MissingFields(FILL_ALL_FIELDS))
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Redirect, AppError> {
    let user_type = validate(&form)?;

    let target = state
        .blocking(move |s| {
            if s.settings.strict_login {
                verify_credentials(s.identities.as_ref(), &form.username, &form.password)?;
            }
            Ok(sign_in(s.sessions.as_ref(), &form.username, user_type)?)
        })
        .await?;
    Ok(Redirect::to(&target.path()))
}

pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Redirect, AppError> {
    let user_type = validate(&form)?;

    let target = state
        .blocking(move |s| {
            // Hash password with Argon2id
            let salt = SaltString::generate(&mut OsRng);
            let password_hash = Argon2::default()
                .hash_password(form.password.as_bytes(), &salt)
                .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?
                .to_string();

            s.identities.register(Identity {
                username: form.username.clone(),
                password: password_hash,
                user_type,
            })?;
            info!("Registered {} ({})", form.username, user_type.as_str());

            Ok(sign_in(s.sessions.as_ref(), &form.username, user_type)?)
        })
        .await?;
    Ok(Redirect::to(&target.path()))
}

pub async fn logout(State(state): State<AppState>) -> Result<Redirect, AppError> {
    state.blocking(|s| Ok(s.sessions.clear()?)).await?;
    Ok(Redirect::to(&Page::Index.path()))
}

fn verify_credentials(
    identities: &dyn IdentityRepository,
    username: &str,
    password: &str,
) -> Result<(), AppError> {
    let identity = identities
        .find(username)?
        .ok_or(AppError::InvalidCredentials)?;

    let parsed_hash = PasswordHash::new(&identity.password)
        .map_err(|e| anyhow::anyhow!("stored hash for {} unreadable: {}", username, e))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use surplus_db::Database;

    #[test]
    fn guard_remembers_protected_page() {
        let db = Database::open_in_memory().unwrap();

        assert_eq!(guard(&db, Page::Index).unwrap(), GateDecision::Proceed);
        assert_eq!(guard(&db, Page::Receiver).unwrap(), GateDecision::RedirectToLogin);
        assert_eq!(db.take_intended_page().unwrap(), Some(Page::Receiver));
    }

    #[test]
    fn guard_lets_any_session_through() {
        let db = Database::open_in_memory().unwrap();
        db.save(&Session::new("rita", UserType::Receiver)).unwrap();
        // Role does not restrict which dashboard may be opened
        assert_eq!(guard(&db, Page::Donor).unwrap(), GateDecision::Proceed);
    }

    #[test]
    fn sign_in_prefers_remembered_page() {
        let db = Database::open_in_memory().unwrap();
        db.remember_intended_page(Page::Receiver).unwrap();

        assert_eq!(sign_in(&db, "dan", UserType::Donor).unwrap(), Page::Receiver);
        assert_eq!(sign_in(&db, "dan", UserType::Donor).unwrap(), Page::Donor);
        assert_eq!(db.current().unwrap().unwrap().username, "dan");
    }

    #[test]
    fn validation_requires_every_field() {
        let form = CredentialsForm {
            username: "x".into(),
            password: "y".into(),
            user_type: String::new(),
        };
        assert!(matches!(validate(&form), Err(AppError::MissingFields(FILL_ALL_FIELDS))));

        let form = CredentialsForm {
            user_type: "donor".into(),
            ..form
        };
        assert_eq!(validate(&form).unwrap(), UserType::Donor);
    }

    #[test]
    fn strict_login_checks_hash() {
        let db = Database::open_in_memory().unwrap();
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(b"hunter22", &salt)
            .unwrap()
            .to_string();
        db.register(Identity {
            username: "eve".into(),
            password: hash,
            user_type: UserType::Receiver,
        })
        .unwrap();

        assert!(verify_credentials(&db, "eve", "hunter22").is_ok());
        assert!(matches!(
            verify_credentials(&db, "eve", "wrong"),
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            verify_credentials(&db, "nobody", "hunter22"),
            Err(AppError::InvalidCredentials)
        ));
    }
}
