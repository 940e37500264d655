//! Accounts, sessions and sign-in.
//!
//! Sessions are opaque bearer tokens kept in process memory. Lookups are
//! synchronous so request extractors can resolve the caller without awaiting.
//! Every sign-in, sign-out and registration is published on a broadcast
//! channel; [`log_events`] is the subscriber started with the server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use actix_web::http::StatusCode;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Duration, Utc};
use derive_more::{Display, Error};
use log::{info, warn};
use rand::distributions::Alphanumeric;
use rand::Rng;
use tokio::sync::broadcast;

use crate::server::controller::error::ApiError;
use crate::server::database::{Repository, Store};
use crate::server::model::config::{AuthConfig, MockAdmin};
use crate::server::model::user::{
    ChangePasswordRequest, FederatedSignInRequest, ProfileUpdate, Provider, RegisterRequest,
    ResetPasswordRequest, Role, SessionView, SignInRequest, User, UserAdminUpdate, UserProfile,
};
use crate::server::util::time::helper;
use crate::server::util::validation::{
    is_valid_email, validate_optional_text, validate_required_text, MAX_NAME_LEN,
    MAX_PASSWORD_LEN, MIN_PASSWORD_LEN,
};

const TOKEN_LEN: usize = 48;
const MAX_FAILED_ATTEMPTS: usize = 5;
const EVENT_CAPACITY: usize = 64;

fn throttle_window() -> Duration {
    Duration::minutes(15)
}

/// How long after signing in sensitive changes are still allowed.
fn recent_login_window() -> Duration {
    Duration::hours(1)
}

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthError {
    #[display("This email is already registered. Please sign in instead.")]
    EmailAlreadyInUse,
    #[display("Please enter a valid email address.")]
    InvalidEmail,
    #[display("Password should be at least 6 characters long.")]
    WeakPassword,
    #[display("This account has been disabled. Please contact support.")]
    UserDisabled,
    #[display("No account found with this email. Please register first.")]
    UserNotFound,
    #[display("Invalid email or password. Please try again.")]
    InvalidCredential,
    #[display("Too many failed attempts. Please try again later.")]
    TooManyRequests,
    #[display("Please sign in again to complete this action.")]
    RequiresRecentLogin,
    #[display("You are not signed in.")]
    NotSignedIn,
    #[display("This sign-in method is not enabled. Please contact support.")]
    OperationNotAllowed,
    #[display("Could not process credentials.")]
    Hashing,
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::EmailAlreadyInUse => "auth/email-already-in-use",
            AuthError::InvalidEmail => "auth/invalid-email",
            AuthError::WeakPassword => "auth/weak-password",
            AuthError::UserDisabled => "auth/user-disabled",
            AuthError::UserNotFound => "auth/user-not-found",
            AuthError::InvalidCredential => "auth/invalid-credential",
            AuthError::TooManyRequests => "auth/too-many-requests",
            AuthError::RequiresRecentLogin => "auth/requires-recent-login",
            AuthError::NotSignedIn => "auth/not-signed-in",
            AuthError::OperationNotAllowed => "auth/operation-not-allowed",
            AuthError::Hashing => "auth/internal-error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::EmailAlreadyInUse => StatusCode::CONFLICT,
            AuthError::InvalidEmail | AuthError::WeakPassword => StatusCode::BAD_REQUEST,
            AuthError::UserDisabled | AuthError::OperationNotAllowed => StatusCode::FORBIDDEN,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::InvalidCredential
            | AuthError::RequiresRecentLogin
            | AuthError::NotSignedIn => StatusCode::UNAUTHORIZED,
            AuthError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            AuthError::Hashing => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(not(test))]
fn hasher() -> Argon2<'static> {
    Argon2::default()
}

#[cfg(test)]
fn hasher() -> Argon2<'static> {
    use argon2::{Algorithm, Params, Version};
    Argon2::new(
        Algorithm::Argon2id,
        Version::V0x13,
        Params::new(8, 1, 1, None).unwrap(),
    )
}

pub(crate) fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    hasher()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            warn!("password hashing failed, {}", e);
            AuthError::Hashing
        })
}

pub(crate) fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    hasher().verify_password(password.as_bytes(), &parsed).is_ok()
}

/// Hashing is CPU bound, keep it off the request workers.
async fn hash_off_thread(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|_| AuthError::Hashing)?
}

async fn verify_off_thread(password: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .unwrap_or(false)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn new_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_new_password(password: &str) -> Result<(), AuthError> {
    let len = password.chars().count();
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Session {
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub signed_in_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AuthEvent {
    Registered { uid: String, email: String },
    SignedIn { uid: String, email: String },
    SignedOut { uid: String },
    PasswordResetRequested { email: String },
}

#[derive(Clone)]
pub(crate) struct AuthService {
    users: Repository<User>,
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    failures: Arc<Mutex<HashMap<String, Vec<DateTime<Utc>>>>>,
    events: broadcast::Sender<AuthEvent>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(store: &Store, config: AuthConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            users: Repository::new(store.clone()),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            failures: Arc::new(Mutex::new(HashMap::new())),
            events,
            config,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: AuthEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let email = normalize_email(email);
        Ok(self
            .users
            .find_all()
            .await?
            .into_iter()
            .find(|u| u.email == email))
    }

    fn open_session(&self, user: &User) -> SessionView {
        let now = helper::get_utc_now();
        let session = Session {
            token: new_token(),
            user_id: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            signed_in_at: now,
            expires_at: now + self.config.session_ttl,
        };
        let view = SessionView {
            token: session.token.clone(),
            expires_at: session.expires_at,
            user: UserProfile::from(user),
        };
        self.sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(session.token.clone(), session);
        self.publish(AuthEvent::SignedIn {
            uid: user.id.clone(),
            email: user.email.clone(),
        });
        view
    }

    /// Resolve a bearer token. Expired sessions are dropped on sight.
    pub fn session(&self, token: &str) -> Result<Session, AuthError> {
        let now = helper::get_utc_now();
        let found = self
            .sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(token)
            .cloned();
        match found {
            Some(session) if session.expires_at > now => Ok(session),
            Some(_) => {
                self.sessions
                    .write()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .remove(token);
                Err(AuthError::NotSignedIn)
            }
            None => Err(AuthError::NotSignedIn),
        }
    }

    fn drop_sessions_of(&self, user_id: &str) {
        self.sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .retain(|_, s| s.user_id != user_id);
    }

    fn check_throttle(&self, email: &str) -> Result<(), AuthError> {
        let cutoff = helper::get_utc_now() - throttle_window();
        let mut failures = self
            .failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(attempts) = failures.get_mut(email) {
            attempts.retain(|t| *t > cutoff);
            if attempts.len() >= MAX_FAILED_ATTEMPTS {
                return Err(AuthError::TooManyRequests);
            }
        }
        Ok(())
    }

    fn record_failure(&self, email: &str) {
        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(email.to_string())
            .or_default()
            .push(helper::get_utc_now());
    }

    fn clear_failures(&self, email: &str) {
        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(email);
    }

    /// Drop expired sessions and failure records older than the throttle
    /// window. Returns how many of each were removed.
    pub fn prune(&self) -> (usize, usize) {
        let now = helper::get_utc_now();
        let sessions = {
            let mut sessions = self
                .sessions
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let before = sessions.len();
            sessions.retain(|_, s| s.expires_at > now);
            before - sessions.len()
        };
        let cutoff = now - throttle_window();
        let mut failures = self
            .failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = failures.len();
        failures.retain(|_, attempts| {
            attempts.retain(|t| *t > cutoff);
            !attempts.is_empty()
        });
        (sessions, before - failures.len())
    }

    /// Create an account. Only an admin may hand out a role other than customer.
    pub async fn create_account(
        &self,
        req: RegisterRequest,
        creator: Option<&Session>,
    ) -> Result<User, ApiError> {
        if !is_valid_email(&req.email) {
            return Err(AuthError::InvalidEmail.into());
        }
        validate_new_password(&req.password)?;
        validate_required_text(&req.display_name, "Display name is required", MAX_NAME_LEN)?;
        if self.find_by_email(&req.email).await?.is_some() {
            return Err(AuthError::EmailAlreadyInUse.into());
        }
        let role = match (req.role, creator) {
            (Some(role), Some(creator)) if creator.role.is_admin() => role,
            _ => Role::Customer,
        };
        let now = helper::get_utc_now();
        let user = self
            .users
            .create(User {
                id: String::new(),
                email: normalize_email(&req.email),
                display_name: req.display_name.trim().to_string(),
                phone: req.phone.trim().to_string(),
                photo_url: String::new(),
                role,
                provider: Provider::Password,
                password_hash: Some(hash_off_thread(req.password).await?),
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;
        self.publish(AuthEvent::Registered {
            uid: user.id.clone(),
            email: user.email.clone(),
        });
        Ok(user)
    }

    /// Self-service sign up; the new account is signed in straight away.
    pub async fn register(&self, req: RegisterRequest) -> Result<SessionView, ApiError> {
        let user = self.create_account(req, None).await?;
        Ok(self.open_session(&user))
    }

    pub async fn sign_in(&self, req: SignInRequest) -> Result<SessionView, ApiError> {
        if !is_valid_email(&req.email) {
            return Err(AuthError::InvalidEmail.into());
        }
        let email = normalize_email(&req.email);
        self.check_throttle(&email)?;

        let Some(user) = self.find_by_email(&email).await? else {
            self.record_failure(&email);
            return Err(AuthError::UserNotFound.into());
        };
        if !user.is_active {
            return Err(AuthError::UserDisabled.into());
        }
        let verified = match user.password_hash.clone() {
            Some(hash) => verify_off_thread(req.password, hash).await,
            None => false,
        };
        if !verified {
            self.record_failure(&email);
            warn!("failed sign-in for {}", email);
            return Err(AuthError::InvalidCredential.into());
        }
        self.clear_failures(&email);
        Ok(self.open_session(&user))
    }

    /// Sign in with an identity a trusted provider has already verified.
    /// Unknown identities become customer accounts.
    pub async fn federated_sign_in(
        &self,
        req: FederatedSignInRequest,
    ) -> Result<SessionView, ApiError> {
        let Some(secret) = self.config.federated_secret.as_deref() else {
            return Err(AuthError::OperationNotAllowed.into());
        };
        if !constant_time_eq(req.assertion.as_bytes(), secret.as_bytes()) {
            return Err(AuthError::InvalidCredential.into());
        }
        if !is_valid_email(&req.email) {
            return Err(AuthError::InvalidEmail.into());
        }
        let user = match self.find_by_email(&req.email).await? {
            Some(user) if !user.is_active => return Err(AuthError::UserDisabled.into()),
            Some(user) => user,
            None => {
                let email = normalize_email(&req.email);
                let display_name = match req.display_name.trim() {
                    "" => email.split('@').next().unwrap_or_default().to_string(),
                    name => name.to_string(),
                };
                let now = helper::get_utc_now();
                let user = self
                    .users
                    .create(User {
                        id: String::new(),
                        email,
                        display_name,
                        phone: String::new(),
                        photo_url: req.photo_url,
                        role: Role::Customer,
                        provider: Provider::Federated,
                        password_hash: None,
                        is_active: true,
                        created_at: now,
                        updated_at: now,
                    })
                    .await?;
                self.publish(AuthEvent::Registered {
                    uid: user.id.clone(),
                    email: user.email.clone(),
                });
                user
            }
        };
        Ok(self.open_session(&user))
    }

    pub fn sign_out(&self, token: &str) -> Result<(), AuthError> {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(token);
        match removed {
            Some(session) => {
                self.publish(AuthEvent::SignedOut {
                    uid: session.user_id,
                });
                Ok(())
            }
            None => Err(AuthError::NotSignedIn),
        }
    }

    async fn user_of(&self, session: &Session) -> Result<User, ApiError> {
        match self.users.find_by_id(&session.user_id).await? {
            Some(user) if user.is_active => Ok(user),
            Some(_) => Err(AuthError::UserDisabled.into()),
            None => Err(AuthError::NotSignedIn.into()),
        }
    }

    pub async fn current_user(&self, session: &Session) -> Result<UserProfile, ApiError> {
        Ok(UserProfile::from(&self.user_of(session).await?))
    }

    pub async fn change_password(
        &self,
        session: &Session,
        req: ChangePasswordRequest,
    ) -> Result<(), ApiError> {
        if helper::get_utc_now() - session.signed_in_at > recent_login_window() {
            return Err(AuthError::RequiresRecentLogin.into());
        }
        validate_new_password(&req.new_password)?;
        let mut user = self.user_of(session).await?;
        let Some(hash) = user.password_hash.clone() else {
            return Err(AuthError::OperationNotAllowed.into());
        };
        if !verify_off_thread(req.current_password, hash).await {
            return Err(AuthError::InvalidCredential.into());
        }
        user.password_hash = Some(hash_off_thread(req.new_password).await?);
        user.updated_at = helper::get_utc_now();
        self.users.update(&user).await?;
        info!("password changed for {}", user.id);
        Ok(())
    }

    pub async fn update_profile(
        &self,
        session: &Session,
        update: ProfileUpdate,
    ) -> Result<UserProfile, ApiError> {
        let mut user = self.user_of(session).await?;
        if let Some(name) = update.display_name {
            validate_required_text(&name, "Display name is required", MAX_NAME_LEN)?;
            user.display_name = name.trim().to_string();
        }
        if let Some(phone) = update.phone {
            validate_optional_text(Some(&phone), "Phone number", 32)?;
            user.phone = phone.trim().to_string();
        }
        if let Some(photo_url) = update.photo_url {
            user.photo_url = photo_url;
        }
        user.updated_at = helper::get_utc_now();
        self.users.update(&user).await?;
        Ok(UserProfile::from(&user))
    }

    /// Delivery of the reset link is outside this service; the request is published as an event.
    pub async fn request_password_reset(&self, req: ResetPasswordRequest) -> Result<(), ApiError> {
        if !is_valid_email(&req.email) {
            return Err(AuthError::InvalidEmail.into());
        }
        let user = self
            .find_by_email(&req.email)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        self.publish(AuthEvent::PasswordResetRequested { email: user.email });
        Ok(())
    }

    /// Create the configured admin account unless it already exists.
    pub async fn ensure_admin(&self, admin: &MockAdmin) -> Result<(), ApiError> {
        if self.find_by_email(&admin.email).await?.is_some() {
            return Ok(());
        }
        let now = helper::get_utc_now();
        let user = self
            .users
            .create(User {
                id: String::new(),
                email: normalize_email(&admin.email),
                display_name: "Administrator".to_string(),
                phone: String::new(),
                photo_url: String::new(),
                role: Role::Admin,
                provider: Provider::Password,
                password_hash: Some(hash_off_thread(admin.password.clone()).await?),
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;
        info!("admin account {} created", user.email);
        Ok(())
    }

    pub async fn list_users(&self) -> Result<Vec<UserProfile>, ApiError> {
        let mut users: Vec<_> = self.users.find_all().await?.iter().map(UserProfile::from).collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    /// Change a user's role or active flag. Open sessions follow the change.
    pub async fn update_user(
        &self,
        actor: &Session,
        id: &str,
        update: UserAdminUpdate,
    ) -> Result<UserProfile, ApiError> {
        let mut user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("User"))?;
        if let Some(role) = update.role {
            let touches_admin = role.is_admin() || user.role.is_admin();
            if touches_admin && !actor.role.is_admin() {
                return Err(ApiError::Forbidden);
            }
            user.role = role;
        }
        if let Some(active) = update.is_active {
            if !active && user.id == actor.user_id {
                return Err(ApiError::validation("You cannot disable your own account"));
            }
            user.is_active = active;
        }
        user.updated_at = helper::get_utc_now();
        self.users.update(&user).await?;

        if user.is_active {
            let mut sessions = self
                .sessions
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            for session in sessions.values_mut().filter(|s| s.user_id == user.id) {
                session.role = user.role;
            }
        } else {
            self.drop_sessions_of(&user.id);
        }
        info!("user {} updated: role {}, active {}", user.id, user.role, user.is_active);
        Ok(UserProfile::from(&user))
    }
}

/// Log every auth event until the service is dropped.
pub(crate) async fn log_events(mut events: broadcast::Receiver<AuthEvent>) {
    loop {
        match events.recv().await {
            Ok(AuthEvent::Registered { uid, email }) => info!("registered {} ({})", email, uid),
            Ok(AuthEvent::SignedIn { uid, email }) => info!("signed in {} ({})", email, uid),
            Ok(AuthEvent::SignedOut { uid }) => info!("signed out {}", uid),
            Ok(AuthEvent::PasswordResetRequested { email }) => {
                info!("password reset requested for {}", email)
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("auth event log skipped {} events", skipped)
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::database::memory::MemoryStore;
    use crate::server::service::testing::now;
    use crate::server::util::time::helper::set_mock_now;

    fn service(secret: Option<&str>) -> AuthService {
        set_mock_now(now());
        AuthService::new(
            &Store::Memory(MemoryStore::new()),
            AuthConfig {
                session_ttl: Duration::hours(12),
                federated_secret: secret.map(str::to_string),
            },
        )
    }

    fn register(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            display_name: "Jane Smith".to_string(),
            phone: String::new(),
            role: None,
        }
    }

    fn sign_in(email: &str, password: &str) -> SignInRequest {
        SignInRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn auth_err(result: Result<impl std::fmt::Debug, ApiError>) -> AuthError {
        match result {
            Err(ApiError::Auth(e)) => e,
            other => panic!("expected an auth error, got {other:?}"),
        }
    }

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("secret1").unwrap();
        assert!(verify_password("secret1", &hash));
        assert!(!verify_password("secret2", &hash));
        assert!(!verify_password("secret1", "not a hash"));
    }

    #[test]
    fn error_dictionary() {
        assert_eq!(AuthError::TooManyRequests.code(), "auth/too-many-requests");
        assert_eq!(AuthError::InvalidCredential.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::WeakPassword.to_string(),
            "Password should be at least 6 characters long."
        );
    }

    #[tokio::test]
    async fn register_then_sign_in() {
        let auth = service(None);
        let mut events = auth.subscribe();
        let view = auth.register(register("Jane@Example.com", "secret1")).await.unwrap();
        assert_eq!(view.user.email, "jane@example.com");
        assert_eq!(view.user.role, Role::Customer);
        assert!(matches!(events.recv().await, Ok(AuthEvent::Registered { .. })));
        assert!(matches!(events.recv().await, Ok(AuthEvent::SignedIn { .. })));

        let view = auth.sign_in(sign_in("jane@example.com", "secret1")).await.unwrap();
        let session = auth.session(&view.token).unwrap();
        assert_eq!(session.expires_at, now() + Duration::hours(12));

        auth.sign_out(&view.token).unwrap();
        assert_eq!(auth.session(&view.token), Err(AuthError::NotSignedIn));
    }

    #[tokio::test]
    async fn registration_rules() {
        let auth = service(None);
        assert_eq!(auth_err(auth.register(register("nope", "secret1")).await), AuthError::InvalidEmail);
        assert_eq!(auth_err(auth.register(register("a@b.co", "12345")).await), AuthError::WeakPassword);
        auth.register(register("a@b.co", "123456")).await.unwrap();
        assert_eq!(
            auth_err(auth.register(register("A@B.co", "123456")).await),
            AuthError::EmailAlreadyInUse
        );
    }

    #[tokio::test]
    async fn only_admins_grant_roles() {
        let auth = service(None);
        let mut req = register("boss@luxestay.com", "secret1");
        req.role = Some(Role::Manager);
        let view = auth.register(req.clone()).await.unwrap();
        assert_eq!(view.user.role, Role::Customer);

        let admin = Session {
            token: String::new(),
            user_id: "uid_admin".to_string(),
            email: "admin@luxestay.com".to_string(),
            role: Role::Admin,
            signed_in_at: now(),
            expires_at: now() + Duration::hours(1),
        };
        req.email = "manager@luxestay.com".to_string();
        let user = auth.create_account(req, Some(&admin)).await.unwrap();
        assert_eq!(user.role, Role::Manager);
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password() {
        let auth = service(None);
        auth.register(register("jane@example.com", "secret1")).await.unwrap();
        assert_eq!(
            auth_err(auth.sign_in(sign_in("john@example.com", "secret1")).await),
            AuthError::UserNotFound
        );
        assert_eq!(
            auth_err(auth.sign_in(sign_in("jane@example.com", "wrong!")).await),
            AuthError::InvalidCredential
        );
    }

    #[tokio::test]
    async fn prune_drops_expired_sessions_and_stale_failures() {
        let auth = service(None);
        let view = auth.register(register("jane@example.com", "secret1")).await.unwrap();
        for email in ["a@example.com", "b@example.com"] {
            let _ = auth.sign_in(sign_in(email, "secret1")).await;
        }
        assert_eq!(auth.prune(), (0, 0));

        set_mock_now(now() + Duration::minutes(20));
        let fresh = auth.sign_in(sign_in("jane@example.com", "secret1")).await.unwrap();
        let _ = auth.sign_in(sign_in("c@example.com", "secret1")).await;
        assert_eq!(auth.prune(), (0, 2));

        set_mock_now(now() + Duration::hours(12));
        assert_eq!(auth.prune(), (1, 1));
        assert_eq!(auth.session(&view.token), Err(AuthError::NotSignedIn));
        assert!(auth.session(&fresh.token).is_ok());
    }

    #[tokio::test]
    async fn throttles_after_five_failures() {
        let auth = service(None);
        auth.register(register("jane@example.com", "secret1")).await.unwrap();
        for _ in 0..5 {
            let _ = auth.sign_in(sign_in("jane@example.com", "wrong!")).await;
        }
        assert_eq!(
            auth_err(auth.sign_in(sign_in("jane@example.com", "secret1")).await),
            AuthError::TooManyRequests
        );
        set_mock_now(now() + Duration::minutes(16));
        assert!(auth.sign_in(sign_in("jane@example.com", "secret1")).await.is_ok());
    }

    #[tokio::test]
    async fn sessions_expire() {
        let auth = service(None);
        let view = auth.register(register("jane@example.com", "secret1")).await.unwrap();
        set_mock_now(now() + Duration::hours(13));
        assert_eq!(auth.session(&view.token), Err(AuthError::NotSignedIn));
    }

    #[tokio::test]
    async fn change_password_needs_recent_login() {
        let auth = service(None);
        let view = auth.register(register("jane@example.com", "secret1")).await.unwrap();
        let session = auth.session(&view.token).unwrap();
        let req = |current: &str| ChangePasswordRequest {
            current_password: current.to_string(),
            new_password: "secret2".to_string(),
        };
        assert_eq!(
            auth_err(auth.change_password(&session, req("wrong!")).await),
            AuthError::InvalidCredential
        );
        auth.change_password(&session, req("secret1")).await.unwrap();
        assert!(auth.sign_in(sign_in("jane@example.com", "secret2")).await.is_ok());

        set_mock_now(now() + Duration::hours(2));
        assert_eq!(
            auth_err(auth.change_password(&session, req("secret2")).await),
            AuthError::RequiresRecentLogin
        );
    }

    #[tokio::test]
    async fn federated_requires_secret() {
        let req = |assertion: &str| FederatedSignInRequest {
            email: "guest@example.com".to_string(),
            display_name: String::new(),
            photo_url: String::new(),
            assertion: assertion.to_string(),
        };
        let auth = service(None);
        assert_eq!(
            auth_err(auth.federated_sign_in(req("anything")).await),
            AuthError::OperationNotAllowed
        );

        let auth = service(Some("shared-secret"));
        assert_eq!(
            auth_err(auth.federated_sign_in(req("guess")).await),
            AuthError::InvalidCredential
        );
        let view = auth.federated_sign_in(req("shared-secret")).await.unwrap();
        assert_eq!(view.user.display_name, "guest");
        assert_eq!(view.user.role, Role::Customer);
        // second sign-in reuses the account
        let again = auth.federated_sign_in(req("shared-secret")).await.unwrap();
        assert_eq!(again.user.uid, view.user.uid);
    }

    #[tokio::test]
    async fn disabling_a_user_ends_sessions() {
        let auth = service(None);
        auth.ensure_admin(&MockAdmin {
            email: "admin@luxestay.com".to_string(),
            password: "admin123".to_string(),
        })
        .await
        .unwrap();
        let admin = auth.sign_in(sign_in("admin@luxestay.com", "admin123")).await.unwrap();
        let admin = auth.session(&admin.token).unwrap();
        let jane = auth.register(register("jane@example.com", "secret1")).await.unwrap();

        let update = UserAdminUpdate {
            role: Some(Role::Receptionist),
            is_active: None,
        };
        auth.update_user(&admin, &jane.user.uid, update).await.unwrap();
        assert_eq!(auth.session(&jane.token).unwrap().role, Role::Receptionist);

        let update = UserAdminUpdate {
            role: None,
            is_active: Some(false),
        };
        auth.update_user(&admin, &jane.user.uid, update).await.unwrap();
        assert_eq!(auth.session(&jane.token), Err(AuthError::NotSignedIn));
        assert_eq!(
            auth_err(auth.sign_in(sign_in("jane@example.com", "secret1")).await),
            AuthError::UserDisabled
        );
        assert_eq!(auth.list_users().await.unwrap().len(), 2);
    }
}
