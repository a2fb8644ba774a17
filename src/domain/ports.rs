use crate::domain::model::TokenPair;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Key-value persistence for credentials.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;

    async fn tokens(&self) -> Result<Option<TokenPair>> {
        let access_token = self.get(ACCESS_TOKEN_KEY).await?;
        let refresh_token = self.get(REFRESH_TOKEN_KEY).await?;
        Ok(match (access_token, refresh_token) {
            (Some(access_token), Some(refresh_token)) => Some(TokenPair {
                access_token,
                refresh_token,
            }),
            _ => None,
        })
    }

    async fn save_tokens(&self, tokens: &TokenPair) -> Result<()> {
        self.set(ACCESS_TOKEN_KEY, &tokens.access_token).await?;
        self.set(REFRESH_TOKEN_KEY, &tokens.refresh_token).await
    }

    async fn clear_tokens(&self) -> Result<()> {
        self.remove(ACCESS_TOKEN_KEY).await?;
        self.remove(REFRESH_TOKEN_KEY).await
    }
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn user_agent(&self) -> &str;
}
