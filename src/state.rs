use std::sync::{Arc, PoisonError, RwLock};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::errors::{Result, SgaError};
use crate::guard::{keys, OperationGuard};
use crate::models::profile::Profile;
use crate::models::server_info::ServerInfo;
use crate::services::http::HttpTransport;
use crate::services::transport::{
    missing_key, parse_object, server_message, Form, Method, Transport, WebRequest,
};

#[derive(Debug, Clone, PartialEq)]
pub struct LocalUser {
    pub profile: Arc<Profile>,
    pub session_id: String,
}

#[derive(Clone)]
pub struct SgaClient {
    pub config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    guard: OperationGuard,
    cancel: Arc<RwLock<CancellationToken>>,
    local_user: Arc<RwLock<Option<LocalUser>>>,
}

impl SgaClient {
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        SgaClient {
            config: Arc::new(config),
            transport,
            guard: OperationGuard::new(),
            cancel: Arc::new(RwLock::new(CancellationToken::new())),
            local_user: Arc::new(RwLock::new(None)),
        }
    }

    pub fn http(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    pub fn with_local_user(self, profile: Profile, session_id: impl Into<String>) -> Self {
        self.set_local_user(profile, session_id);
        self
    }

    /// Process-wide guard for operations that are not tied to one entity.
    pub fn guard(&self) -> &OperationGuard {
        &self.guard
    }

    pub fn local_user(&self) -> Option<LocalUser> {
        self.local_user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_local_user(&self, profile: Profile, session_id: impl Into<String>) {
        let mut slot = self.local_user.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(LocalUser {
            profile: Arc::new(profile),
            session_id: session_id.into(),
        });
    }

    pub fn sign_out(&self) {
        let mut slot = self.local_user.write().unwrap_or_else(PoisonError::into_inner);
        if slot.take().is_some() {
            info!("Local user signed out");
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.local_user().is_some()
    }

    /// Fails fast for operations that need the authenticated local user.
    pub fn require_local_user(&self) -> Result<LocalUser> {
        self.local_user().ok_or(SgaError::NotAuthenticated)
    }

    pub fn local_account_id(&self) -> Option<String> {
        self.local_user().map(|u| u.profile.id.clone())
    }

    /// Cancels every request currently awaiting the transport. Later calls
    /// run against a fresh token.
    pub fn cancel_requests(&self) {
        let mut token = self.cancel.write().unwrap_or_else(PoisonError::into_inner);
        token.cancel();
        *token = CancellationToken::new();
        warn!("In-flight requests cancelled");
    }

    pub async fn call(&self, method: Method, relative_url: &str, form: Option<Form>) -> Result<String> {
        let form = match (form, &self.config.timezone) {
            (Some(mut form), Some(tz)) => {
                form.insert("Timezone".to_string(), tz.clone());
                Some(form)
            }
            (form, _) => form,
        };

        let request = WebRequest {
            method: method.resolve(form.as_ref()),
            url: self.config.get_url(relative_url),
            form,
            session: self.local_user().map(|u| u.session_id),
        };

        if self.config.log_debug_info {
            debug!("Sending: {} {} with: {}", request.method.as_str(), request.url, request.form_json());
        }

        let token = self
            .cancel
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => Err(SgaError::Cancelled),
            response = self.transport.call(request) => response,
        };

        if self.config.log_debug_info {
            match &result {
                Ok(body) => debug!("Received: {}", body),
                Err(e) => debug!("Request failed: {}", e),
            }
        }
        result
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Arc<Profile>> {
        let _permit = self.guard.acquire(keys::SESSION_AUTHENTICATE)?;

        let mut form = Form::new();
        form.insert("Username".to_string(), username.to_string());
        form.insert("Password".to_string(), password.to_string());

        let body = self.call(Method::Post, "api/sessions", Some(form)).await?;
        let result = parse_object(&body)?;

        let session_id = match result.get("id") {
            Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => return Err(missing_key(&result, "id")),
        };
        let player = match result.get("player") {
            Some(player) if !player.is_null() => serde_json::from_value::<Profile>(player.clone())?,
            _ => {
                return Err(SgaError::rejected(
                    server_message(&result).unwrap_or_else(|| "Session has no player".to_string()),
                ))
            }
        };

        info!("Authenticated as {} ({})", player.user_name, player.id);
        self.set_local_user(player, session_id);
        self.require_local_user().map(|u| u.profile)
    }

    pub async fn server_info(&self) -> Result<ServerInfo> {
        let body = self.call(Method::Get, "api/server", None).await?;
        if body.trim().is_empty() {
            return Err(SgaError::parse("empty server info"));
        }
        let info: ServerInfo = serde_json::from_str(&body)?;
        info!("{}", info);
        Ok(info)
    }

    /// Keeps the local user's online state alive. A failed ping while
    /// authenticated drops the local session.
    pub async fn ping(&self) -> Result<bool> {
        if !self.is_authenticated() {
            return Ok(false);
        }

        let success = match self.call(Method::Get, "api/server", None).await {
            Ok(body) => parse_object(&body)
                .ok()
                .and_then(|map| map.get("success").and_then(serde_json::Value::as_bool))
                .unwrap_or(false),
            Err(SgaError::Cancelled) => return Err(SgaError::Cancelled),
            Err(e) => {
                warn!("Ping failed: {}", e);
                false
            }
        };

        if !success {
            self.sign_out();
        }
        Ok(success)
    }
}

impl std::fmt::Debug for SgaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SgaClient")
            .field("url_root", &self.config.url_root())
            .field("authenticated", &self.is_authenticated())
            .field("in_flight", &self.guard.in_flight())
            .finish()
    }
}
