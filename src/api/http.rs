//! HTTP implementation of the wallet API
//!
//! Endpoints (JSON over HTTP, relative to the configured base URL):
//! - `POST /auth/login {email, password}` → `{token, user}` | `{message}`
//! - `POST /auth/register {email, password}` → `{}` | `{errors: [{msg}]}`
//! - `GET /wallets` (Bearer) → `{wallets: [{address, privateKey}]}`
//! - `POST /wallets` (Bearer) `{address, privateKey}` → `{}` | `{message}`

use super::{
    Credentials, LoginOutcome, RegisterOutcome, SaveWalletOutcome, WalletApi, WalletRecord,
};
use crate::session::{Session, User};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct CredentialsBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SaveWalletBody<'a> {
    address: &'a str,
    #[serde(rename = "privateKey")]
    private_key: &'a str,
}

#[derive(Deserialize)]
struct LoginBody {
    token: String,
    user: User,
}

#[derive(Deserialize)]
struct WalletListBody {
    #[serde(default)]
    wallets: Vec<WalletRecordBody>,
}

#[derive(Deserialize)]
struct WalletRecordBody {
    address: String,
    #[serde(rename = "privateKey")]
    private_key: String,
}

#[derive(Deserialize)]
struct FieldError {
    msg: String,
}

/// Error payload; the API uses either `message` or a list of field `errors`
#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<Vec<FieldError>>,
}

impl ErrorBody {
    fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    fn field_errors(&self) -> Option<String> {
        self.errors
            .as_ref()
            .filter(|errors| !errors.is_empty())
            .map(|errors| {
                errors
                    .iter()
                    .map(|e| e.msg.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
    }
}

fn decode_login(status: StatusCode, body: &str) -> Result<LoginOutcome> {
    if status.is_success() {
        let parsed: LoginBody = serde_json::from_str(body)?;
        return Ok(LoginOutcome::LoggedIn(Session::new(parsed.token, parsed.user)));
    }
    let error = ErrorBody::parse(body);
    let field_errors = error.field_errors();
    let message = error
        .message
        .or(field_errors)
        .unwrap_or_else(|| "Login failed".to_string());
    Ok(LoginOutcome::Rejected { message })
}

fn decode_register(status: StatusCode, body: &str) -> Result<RegisterOutcome> {
    if status.is_success() {
        return Ok(RegisterOutcome::Registered);
    }
    let error = ErrorBody::parse(body);
    tracing::debug!(%status, "Registration rejected");
    let message = error
        .field_errors()
        .or(error.message)
        .unwrap_or_else(|| "Registration failed".to_string());
    Ok(RegisterOutcome::Rejected { message })
}

fn decode_wallet_list(status: StatusCode, body: &str) -> Result<Vec<WalletRecord>> {
    if !status.is_success() {
        let message = ErrorBody::parse(body)
            .message
            .unwrap_or_else(|| format!("Failed to fetch wallets ({})", status));
        return Err(Error::Rejected(message));
    }
    let parsed: WalletListBody = serde_json::from_str(body)?;
    Ok(parsed
        .wallets
        .into_iter()
        .map(|w| WalletRecord::new(w.address, w.private_key))
        .collect())
}

fn decode_save_wallet(status: StatusCode, body: &str) -> Result<SaveWalletOutcome> {
    if status.is_success() {
        return Ok(SaveWalletOutcome::Saved);
    }
    let error = ErrorBody::parse(body);
    let field_errors = error.field_errors();
    let message = error
        .message
        .or(field_errors)
        .unwrap_or_else(|| "Failed to save wallet".to_string());
    Ok(SaveWalletOutcome::Rejected { message })
}

/// reqwest-backed wallet API client
#[derive(Clone)]
pub struct HttpWalletApi {
    client: Client,
    base_url: String,
}

impl HttpWalletApi {
    /// Create a client for the API rooted at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read(response: reqwest::Response) -> Result<(StatusCode, String)> {
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }
}

#[async_trait]
impl WalletApi for HttpWalletApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome> {
        let response = self
            .client
            .post(self.endpoint("/auth/login"))
            .json(&CredentialsBody {
                email: &credentials.email,
                password: credentials.password(),
            })
            .send()
            .await?;
        let (status, body) = Self::read(response).await?;
        tracing::debug!(%status, email = %credentials.email, "Login response");
        decode_login(status, &body)
    }

    async fn register(&self, credentials: &Credentials) -> Result<RegisterOutcome> {
        let response = self
            .client
            .post(self.endpoint("/auth/register"))
            .json(&CredentialsBody {
                email: &credentials.email,
                password: credentials.password(),
            })
            .send()
            .await?;
        let (status, body) = Self::read(response).await?;
        tracing::debug!(%status, email = %credentials.email, "Register response");
        decode_register(status, &body)
    }

    async fn list_wallets(&self, token: &str) -> Result<Vec<WalletRecord>> {
        let response = self
            .client
            .get(self.endpoint("/wallets"))
            .bearer_auth(token)
            .send()
            .await?;
        let (status, body) = Self::read(response).await?;
        decode_wallet_list(status, &body)
    }

    async fn save_wallet(&self, token: &str, record: &WalletRecord) -> Result<SaveWalletOutcome> {
        let response = self
            .client
            .post(self.endpoint("/wallets"))
            .bearer_auth(token)
            .json(&SaveWalletBody {
                address: &record.address,
                private_key: record.private_key(),
            })
            .send()
            .await?;
        let (status, body) = Self::read(response).await?;
        tracing::debug!(%status, address = %record.address, "Save wallet response");
        decode_save_wallet(status, &body)
    }
}
