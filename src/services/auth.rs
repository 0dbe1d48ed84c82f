use serde_json::json;

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::models::{AuthResponse, LoginInput, MessageResponse, RegisterInput, User};
use crate::transport::RequestDescriptor;

/// Authentication endpoints. Successful login, register and refresh store
/// the returned tokens on the client.
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, input: &LoginInput) -> ApiResult<AuthResponse> {
        let auth: AuthResponse = self
            .client
            .send_json(&RequestDescriptor::post("/auth/login"), input)
            .await?;
        self.store(&auth).await;
        tracing::info!(email = %input.email, "Logged in");
        Ok(auth)
    }

    pub async fn register(&self, input: &RegisterInput) -> ApiResult<AuthResponse> {
        let auth: AuthResponse = self
            .client
            .send_json(&RequestDescriptor::post("/auth/register"), input)
            .await?;
        self.store(&auth).await;
        Ok(auth)
    }

    /// Exchange the stored refresh token, if any, for a new access token.
    pub async fn refresh(&self) -> ApiResult<AuthResponse> {
        let body = match self.client.refresh_token().await {
            Some(token) => json!({ "refresh_token": token }),
            None => json!({}),
        };
        let auth: AuthResponse = self
            .client
            .send_json(&RequestDescriptor::post("/auth/refresh"), &body)
            .await?;
        self.store(&auth).await;
        Ok(auth)
    }

    /// The current user; never served from cache.
    pub async fn me(&self) -> ApiResult<User> {
        self.client
            .fetch(&RequestDescriptor::get("/auth/me").no_cache())
            .await
    }

    /// Tell the server, then forget local tokens and cached reads whatever it answered.
    pub async fn logout(&self) {
        let result: ApiResult<serde_json::Value> = self
            .client
            .send_json(&RequestDescriptor::post("/auth/logout"), &json!({}))
            .await;
        if let Err(e) = result {
            tracing::warn!(error = %e, "Logout request failed, clearing local session anyway");
        }
        self.client.clear_token().await;
    }

    pub async fn forgot_password(&self, email: &str) -> ApiResult<MessageResponse> {
        self.client
            .send_json(
                &RequestDescriptor::post("/auth/forgot-password"),
                &json!({ "email": email }),
            )
            .await
    }

    async fn store(&self, auth: &AuthResponse) {
        self.client.set_token(auth.access_token.clone()).await;
        if let Some(refresh) = &auth.refresh_token {
            self.client.set_refresh_token(refresh.clone()).await;
        }
    }
}
