//! Rally WSAPI user directory.

use std::time::Duration;

use async_trait::async_trait;
use dormant_common::RawUser;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use super::{DirectoryError, DisableConfirmation, UserDirectory};
use crate::config::RallyConfig;

const USER_QUERY: &str = "(ObjectID > 0)";
const USER_FETCH: &str =
    "CreationDate,Disabled,EmailAddress,LastLoginDate,ObjectID,UserName,SubscriptionPermission";

enum Credentials {
    ApiKey(String),
    Basic { username: String, password: String },
}

/// Rally user directory.
///
/// Talks to the WSAPI `user` endpoint of one subscription.
pub struct RallyDirectory {
    http_client: Client,
    base_url: String,
    version: String,
    page_size: u32,
    credentials: Credentials,
    /// Write token for basic-auth sessions, fetched on the first update
    security_token: OnceCell<String>,
}

impl RallyDirectory {
    pub fn new(config: &RallyConfig) -> Result<Self, DirectoryError> {
        let credentials = match (&config.api_key, &config.username, &config.password) {
            (Some(key), _, _) if !key.is_empty() => Credentials::ApiKey(key.clone()),
            (_, Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Credentials::Basic {
                    username: username.clone(),
                    password: password.clone(),
                }
            }
            _ => {
                return Err(DirectoryError::Configuration(
                    "no API key or username/password configured (there is no password prompt)"
                        .to_string(),
                ))
            }
        };

        let mut headers = HeaderMap::new();
        for (name, value) in [
            ("x-rallyintegrationname", &config.integration_name),
            ("x-rallyintegrationvendor", &config.integration_vendor),
            ("x-rallyintegrationversion", &config.integration_version),
        ] {
            let value = HeaderValue::from_str(value).map_err(|e| {
                DirectoryError::Configuration(format!("invalid {} header: {}", name, e))
            })?;
            headers.insert(HeaderName::from_static(name), value);
        }

        let http_client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DirectoryError::Configuration(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: normalize_base_url(&config.base_url),
            version: config.version.clone(),
            page_size: config.page_size,
            credentials,
            security_token: OnceCell::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Log where we are connecting, with the secret masked.
    pub fn log_connection(&self) {
        tracing::info!("Connecting to Rally at:");
        tracing::info!("\tBaseURL  : <{}>", self.base_url);
        match &self.credentials {
            Credentials::ApiKey(key) => {
                tracing::info!("\tAPIKey   : <{}>", mask_secret(key));
            }
            Credentials::Basic { username, password } => {
                tracing::info!("\tUserName : <{}>", username);
                tracing::info!("\tPassword : <{}>", mask_secret(password));
            }
        }
        tracing::info!("\tVersion  : <{}>", self.version);
    }

    fn webservice_url(&self, path: &str) -> String {
        format!("{}/webservice/{}/{}", self.base_url, self.version, path)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.http_client.request(method, url);
        match &self.credentials {
            Credentials::ApiKey(key) => builder.header("ZSESSIONID", key),
            Credentials::Basic { username, password } => {
                builder.basic_auth(username, Some(password))
            }
        }
    }

    /// Security token to attach to writes, `None` for API key sessions.
    async fn write_token(&self) -> Result<Option<&str>, DirectoryError> {
        match self.credentials {
            Credentials::ApiKey(_) => Ok(None),
            Credentials::Basic { .. } => {
                let token = self
                    .security_token
                    .get_or_try_init(|| self.fetch_security_token())
                    .await?;
                Ok(Some(token.as_str()))
            }
        }
    }

    async fn fetch_security_token(&self) -> Result<String, DirectoryError> {
        let url = self.webservice_url("security/authorize");
        tracing::debug!("Requesting Rally security token: {}", url);

        let response = self
            .request(Method::GET, &url)
            .send()
            .await
            .map_err(|e| DirectoryError::Communication(e.to_string()))?;
        let response = check_status(response).await?;

        let body: OperationResponse = response
            .json()
            .await
            .map_err(|e| DirectoryError::InvalidResponse(e.to_string()))?;
        let result = body.operation_result;

        if !result.errors.is_empty() {
            return Err(DirectoryError::Authentication(result.errors.join("; ")));
        }

        result.security_token.ok_or_else(|| {
            DirectoryError::InvalidResponse("authorize response carried no SecurityToken".to_string())
        })
    }
}

// ============================================================================
// Rally WSAPI types
// ============================================================================

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(rename = "QueryResult")]
    query_result: QueryResult,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(rename = "Errors", default)]
    errors: Vec<String>,
    #[serde(rename = "Warnings", default)]
    warnings: Vec<String>,
    #[serde(rename = "TotalResultCount", default)]
    total_result_count: u64,
    #[serde(rename = "Results", default)]
    results: Vec<RallyUser>,
}

#[derive(Debug, Deserialize)]
struct RallyUser {
    #[serde(rename = "ObjectID")]
    object_id: u64,
    #[serde(rename = "UserName")]
    user_name: String,
    #[serde(rename = "EmailAddress", default)]
    email_address: Option<String>,
    #[serde(rename = "CreationDate")]
    creation_date: String,
    #[serde(rename = "LastLoginDate", default)]
    last_login_date: Option<String>,
    #[serde(rename = "SubscriptionPermission", default)]
    subscription_permission: Option<String>,
    #[serde(rename = "Disabled", default)]
    disabled: bool,
}

impl From<RallyUser> for RawUser {
    fn from(user: RallyUser) -> Self {
        RawUser {
            id: user.object_id.to_string(),
            username: user.user_name,
            email: user.email_address.unwrap_or_default(),
            created_at: user.creation_date,
            last_login_at: user.last_login_date,
            subscription_permission: user.subscription_permission.unwrap_or_default(),
            disabled: user.disabled,
        }
    }
}

#[derive(Debug, Serialize)]
struct UpdateRequest {
    #[serde(rename = "User")]
    user: UserUpdate,
}

#[derive(Debug, Serialize)]
struct UserUpdate {
    #[serde(rename = "Disabled")]
    disabled: bool,
}

#[derive(Debug, Deserialize)]
struct OperationResponse {
    #[serde(rename = "OperationResult")]
    operation_result: OperationResult,
}

#[derive(Debug, Deserialize)]
struct OperationResult {
    #[serde(rename = "Errors", default)]
    errors: Vec<String>,
    #[serde(rename = "Warnings", default)]
    warnings: Vec<String>,
    #[serde(rename = "Object", default)]
    object: Option<UpdatedUser>,
    #[serde(rename = "SecurityToken", default)]
    security_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdatedUser {
    #[serde(rename = "Disabled", default)]
    disabled: bool,
}

// ============================================================================
// UserDirectory implementation
// ============================================================================

#[async_trait]
impl UserDirectory for RallyDirectory {
    fn directory_type(&self) -> &'static str {
        "rally"
    }

    async fn fetch_users(&self) -> Result<Vec<RawUser>, DirectoryError> {
        let url = self.webservice_url("user");
        let mut users: Vec<RawUser> = Vec::new();
        let mut start: u64 = 1;

        loop {
            let query = [
                ("query", USER_QUERY.to_string()),
                ("fetch", USER_FETCH.to_string()),
                ("start", start.to_string()),
                ("pagesize", self.page_size.to_string()),
            ];

            let response = self
                .request(Method::GET, &url)
                .query(&query)
                .send()
                .await
                .map_err(|e| DirectoryError::Communication(e.to_string()))?;
            let response = check_status(response).await?;

            let page: QueryResponse = response
                .json()
                .await
                .map_err(|e| DirectoryError::InvalidResponse(e.to_string()))?;
            let result = page.query_result;

            if !result.errors.is_empty() {
                return Err(DirectoryError::Api(result.errors.join("; ")));
            }
            for warning in &result.warnings {
                tracing::warn!("Rally query warning: {}", warning);
            }

            let fetched = result.results.len() as u64;
            users.extend(result.results.into_iter().map(RawUser::from));
            tracing::debug!(
                start,
                fetched,
                total = result.total_result_count,
                "Fetched page of users"
            );

            if fetched == 0 || users.len() as u64 >= result.total_result_count {
                break;
            }
            start += fetched;
        }

        Ok(users)
    }

    async fn disable_user(&self, user_id: &str) -> Result<DisableConfirmation, DirectoryError> {
        let url = self.webservice_url(&format!("user/{}", user_id));
        let body = UpdateRequest {
            user: UserUpdate { disabled: true },
        };

        let mut request = self.request(Method::POST, &url).json(&body);
        if let Some(token) = self.write_token().await? {
            request = request.query(&[("key", token)]);
        }

        tracing::debug!("Sending disable request to Rally: {}", url);

        let response = request
            .send()
            .await
            .map_err(|e| DirectoryError::Communication(e.to_string()))?;
        let response = check_status(response).await?;

        let body: OperationResponse = response
            .json()
            .await
            .map_err(|e| DirectoryError::InvalidResponse(e.to_string()))?;
        let result = body.operation_result;

        if !result.errors.is_empty() {
            return Err(DirectoryError::Rejected(result.errors.join("; ")));
        }
        for warning in &result.warnings {
            tracing::warn!(user_id, "Rally update warning: {}", warning);
        }

        let object = result.object.ok_or_else(|| {
            DirectoryError::InvalidResponse("update response carried no Object".to_string())
        })?;

        Ok(DisableConfirmation {
            disabled: object.disabled,
        })
    }
}

async fn check_status(response: Response) -> Result<Response, DirectoryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(DirectoryError::Authentication(
            format!("{}: {}", status, body),
        )),
        _ => Err(DirectoryError::Api(format!("{}: {}", status, body))),
    }
}

/// Strip a trailing `/` and make sure the URL ends with `/slm`.
pub fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.ends_with("/slm") {
        trimmed.to_string()
    } else {
        format!("{}/slm", trimmed)
    }
}

/// Replace every character of a secret with `*`.
pub fn mask_secret(secret: &str) -> String {
    "*".repeat(secret.chars().count())
}
