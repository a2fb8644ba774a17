use crate::core::client::{ApiClient, ApiRequest, MultipartBody};
use crate::domain::model::{AuthResponse, User};
use crate::domain::photo::PhotoEvidence;
use crate::domain::ports::REFRESH_TOKEN_KEY;
use crate::domain::requests::{LoginRequest, ProfileUpdate, RegisterRequest};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use serde::Serialize;

#[derive(Serialize)]
struct LogoutRequest {
    refresh_token: String,
}

impl ApiClient {
    /// Sign in and persist the returned token pair.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        request.validate()?;
        tracing::info!("Logging in as {}", request.email);

        let auth: AuthResponse = self
            .execute(ApiRequest::post("auth/login").anonymous().json(request)?)
            .await?;
        self.token_store().save_tokens(&auth.tokens()).await?;
        Ok(auth)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        request.validate()?;
        tracing::info!("Registering {}", request.email);

        let auth: AuthResponse = self
            .execute(ApiRequest::post("auth/register").anonymous().json(request)?)
            .await?;
        self.token_store().save_tokens(&auth.tokens()).await?;
        Ok(auth)
    }

    /// Invalidate the session server-side and drop local tokens. Local tokens
    /// are removed even when the server call fails.
    pub async fn logout(&self) -> Result<()> {
        let refresh_token = self.token_store().get(REFRESH_TOKEN_KEY).await?;

        let outcome = match refresh_token {
            Some(refresh_token) => {
                let request = ApiRequest::post("auth/logout").json(&LogoutRequest { refresh_token })?;
                self.execute_unit(request).await
            }
            None => Ok(()),
        };

        if let Err(e) = &outcome {
            tracing::warn!("Server-side logout failed: {}", e);
        }
        self.token_store().clear_tokens().await?;
        Ok(())
    }

    pub async fn profile(&self) -> Result<User> {
        self.execute(ApiRequest::get("auth/profile")).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        update.validate()?;
        self.execute(ApiRequest::put("auth/profile").json(update)?)
            .await
    }

    pub async fn upload_profile_photo(&self, photo: PhotoEvidence) -> Result<User> {
        let body = MultipartBody::default().photo("photo", photo);
        self.execute(ApiRequest::post("users/me/photo").multipart(body))
            .await
    }
}
