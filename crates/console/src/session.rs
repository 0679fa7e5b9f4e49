#![forbid(unsafe_code)]

use crate::error::ConsoleError;
use crate::http::{ApiRequest, ApiResponse, Transport};
use serde::{Deserialize, Serialize};
use regex::Regex;
use serde_json::json;
use std::cell::RefCell;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

pub const LOGIN_PATH: &str = "/api/v1/user/login";
pub const REFRESH_PATH: &str = "/api/v1/user/refresh";
pub const REGISTER_PATH: &str = "/api/v1/user/register";
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

static PHONE_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\+?[\d\s-]{10,}$").ok());

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

impl SessionTokens {
    fn is_complete(&self) -> bool {
        !self.token.trim().is_empty() && !self.refresh_token.trim().is_empty()
    }
}

/// Key-value home of the access and refresh tokens.
pub trait TokenStore {
    fn load(&self) -> Result<Option<SessionTokens>, ConsoleError>;
    fn save(&self, tokens: &SessionTokens) -> Result<(), ConsoleError>;
    fn clear(&self) -> Result<(), ConsoleError>;
}

impl<S: TokenStore + ?Sized> TokenStore for &S {
    fn load(&self) -> Result<Option<SessionTokens>, ConsoleError> {
        (**self).load()
    }

    fn save(&self, tokens: &SessionTokens) -> Result<(), ConsoleError> {
        (**self).save(tokens)
    }

    fn clear(&self) -> Result<(), ConsoleError> {
        (**self).clear()
    }
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RefCell<Option<SessionTokens>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(token: &str, refresh_token: &str) -> Self {
        Self {
            tokens: RefCell::new(Some(SessionTokens {
                token: token.to_string(),
                refresh_token: refresh_token.to_string(),
            })),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<SessionTokens>, ConsoleError> {
        Ok(self.tokens.borrow().clone())
    }

    fn save(&self, tokens: &SessionTokens) -> Result<(), ConsoleError> {
        *self.tokens.borrow_mut() = Some(tokens.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), ConsoleError> {
        self.tokens.borrow_mut().take();
        Ok(())
    }
}

/// Tokens persisted as a small JSON file.
#[derive(Clone, Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> ConsoleError {
        ConsoleError::TokenStore {
            path: self.path.clone(),
            source,
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<SessionTokens>, ConsoleError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(err)),
        };
        serde_json::from_str::<SessionTokens>(&text)
            .map(Some)
            .map_err(|source| ConsoleError::TokenStoreCorrupt {
                path: self.path.clone(),
                source,
            })
    }

    fn save(&self, tokens: &SessionTokens) -> Result<(), ConsoleError> {
        let dir = self.path.parent().unwrap_or(Path::new("."));
        std::fs::create_dir_all(dir).map_err(|err| self.io_error(err))?;
        let tmp = self.path.with_extension("json.tmp");
        let text = serde_json::to_string_pretty(tokens).map_err(|source| {
            ConsoleError::TokenStoreCorrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        write_private(&tmp, text.as_bytes()).map_err(|err| self.io_error(err))?;
        std::fs::rename(&tmp, &self.path).map_err(|err| self.io_error(err))?;
        Ok(())
    }

    fn clear(&self) -> Result<(), ConsoleError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_error(err)),
        }
    }
}

/// Creates `path` readable by the owner only; a stale file is replaced so
/// the mode is applied on creation.
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[derive(Debug, Deserialize)]
struct LoginData {
    token: String,
    #[serde(rename = "refreshToken")]
    refresh_token: String,
    #[serde(default)]
    user_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RefreshData {
    #[serde(default)]
    token: Option<String>,
    #[serde(rename = "refreshToken", default)]
    refresh_token: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginOutcome {
    pub user_type: Option<String>,
}

/// Sign-up form. Every field is trimmed before it is checked or sent.
#[derive(Clone, Debug, Default)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    pub accept_terms: bool,
}

impl Registration {
    /// First failing check wins, in form order.
    pub fn validate(&self) -> Result<(), ConsoleError> {
        let invalid = |message| Err(ConsoleError::InvalidInput(message));
        if self.first_name.trim().is_empty() {
            return invalid("First name is required");
        }
        if self.last_name.trim().is_empty() {
            return invalid("Last name is required");
        }
        let email = self.email.trim();
        if email.is_empty() {
            return invalid("Email is required");
        }
        if !is_valid_email(email) {
            return invalid("Please enter a valid email address");
        }
        let phone = self.phone.trim();
        if phone.is_empty() {
            return invalid("Phone number is required");
        }
        if !is_valid_phone(phone) {
            return invalid("Please enter a valid phone number");
        }
        let password = self.password.trim();
        if password.is_empty() {
            return invalid("Password is required");
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return invalid("Password must be at least 6 characters");
        }
        let confirm = self.confirm_password.trim();
        if confirm.is_empty() {
            return invalid("Please confirm your password");
        }
        if confirm != password {
            return invalid("Passwords do not match");
        }
        if !self.accept_terms {
            return invalid("You must agree to the terms and conditions");
        }
        Ok(())
    }

    fn body(&self) -> serde_json::Value {
        json!({
            "first_name": self.first_name.trim(),
            "last_name": self.last_name.trim(),
            "email": self.email.trim(),
            "phone": self.phone.trim(),
            "password": self.password.trim(),
        })
    }
}

/// Authenticated access to the backend.
///
/// Every request carries the stored access token. A 401 triggers one token
/// refresh; when that succeeds the original request is retried exactly once
/// and its response is returned whatever the status. A failed refresh clears
/// the stored tokens.
pub struct AuthSession<T, S> {
    transport: T,
    store: S,
}

impl<T: Transport, S: TokenStore> AuthSession<T, S> {
    pub fn new(transport: T, store: S) -> Self {
        Self { transport, store }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_logged_in(&self) -> Result<bool, ConsoleError> {
        Ok(self.store.load()?.is_some())
    }

    pub fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ConsoleError> {
        let email = email.trim();
        let password = password.trim();
        if email.is_empty() {
            return Err(ConsoleError::InvalidInput("Email is required"));
        }
        if !is_valid_email(email) {
            return Err(ConsoleError::InvalidInput(
                "Please enter a valid email address",
            ));
        }
        if password.is_empty() {
            return Err(ConsoleError::InvalidInput("Password is required"));
        }

        let request = ApiRequest::post(
            LOGIN_PATH,
            json!({ "email": email, "password": password }),
        );
        let response = self.transport.send(&request)?;
        match response.status {
            401 => return Err(ConsoleError::InvalidCredentials),
            403 => return Err(ConsoleError::AccountLocked),
            _ => {}
        }
        let response = response.expect_success(&request)?;
        let data = response
            .envelope::<LoginData>(LOGIN_PATH)?
            .ok_or(ConsoleError::InvalidInput("login response carried no data"))?;
        let tokens = SessionTokens {
            token: data.token,
            refresh_token: data.refresh_token,
        };
        if !tokens.is_complete() {
            return Err(ConsoleError::InvalidInput("login response carried empty tokens"));
        }
        self.store.save(&tokens)?;
        tracing::info!(email, user_type = ?data.user_type, "logged in");
        Ok(LoginOutcome {
            user_type: data.user_type,
        })
    }

    /// Creates an account. Does not log in; stored tokens are left alone.
    pub fn register(&self, registration: &Registration) -> Result<(), ConsoleError> {
        registration.validate()?;
        let request = ApiRequest::post(REGISTER_PATH, registration.body());
        let response = self.transport.send(&request)?;
        if response.status == 409 {
            return Err(ConsoleError::EmailTaken);
        }
        response.expect_success(&request)?;
        tracing::info!(email = registration.email.trim(), "account registered");
        Ok(())
    }

    pub fn logout(&self) -> Result<(), ConsoleError> {
        self.store.clear()
    }

    /// Sends `request` with the stored access token, refreshing once on 401.
    pub fn send(&self, request: ApiRequest) -> Result<ApiResponse, ConsoleError> {
        let tokens = self.store.load()?.ok_or(ConsoleError::NotLoggedIn)?;
        let response = self
            .transport
            .send(&request.clone().with_bearer(&tokens.token))?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        tracing::debug!(path = %request.path, "access token rejected, refreshing");
        let refreshed = self.refresh(&tokens)?;
        let retry = self
            .transport
            .send(&request.with_bearer(&refreshed.token))?;
        Ok(retry)
    }

    fn refresh(&self, tokens: &SessionTokens) -> Result<SessionTokens, ConsoleError> {
        if tokens.refresh_token.trim().is_empty() {
            self.expire("no refresh token available")?;
            return Err(ConsoleError::SessionExpired);
        }
        let request = ApiRequest::get(REFRESH_PATH).with_bearer(&tokens.refresh_token);
        let response = self.transport.send(&request)?;
        if !response.is_success() {
            self.expire("refresh rejected")?;
            return Err(ConsoleError::SessionExpired);
        }
        let data = match response.envelope::<RefreshData>(REFRESH_PATH) {
            Ok(data) => data,
            Err(err) => {
                tracing::debug!(error = %err, "refresh payload not decodable");
                None
            }
        };
        let refreshed = data.and_then(|data| match (data.token, data.refresh_token) {
            (Some(token), Some(refresh_token)) => Some(SessionTokens {
                token,
                refresh_token,
            }),
            _ => None,
        });
        let Some(refreshed) = refreshed.filter(SessionTokens::is_complete) else {
            self.expire("invalid token response")?;
            return Err(ConsoleError::SessionExpired);
        };
        self.store.save(&refreshed)?;
        tracing::debug!("access token refreshed");
        Ok(refreshed)
    }

    fn expire(&self, reason: &str) -> Result<(), ConsoleError> {
        tracing::warn!(reason, "session expired, clearing stored tokens");
        self.store.clear()
    }
}

/// `local@domain.tld` with no whitespace.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(value))
}

/// Optional leading `+`, then at least ten digits, spaces or dashes.
pub fn is_valid_phone(value: &str) -> bool {
    PHONE_RE.as_ref().is_some_and(|re| re.is_match(value))
}
