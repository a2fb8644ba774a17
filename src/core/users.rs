use crate::core::client::{ApiClient, ApiRequest};
use crate::domain::model::User;
use crate::domain::requests::{NewUser, UserUpdate};
use crate::utils::error::Result;
use crate::utils::validation::Validate;

impl ApiClient {
    pub async fn users(&self) -> Result<Vec<User>> {
        self.execute(ApiRequest::get("users")).await
    }

    pub async fn user(&self, id: i64) -> Result<User> {
        self.execute(ApiRequest::get(format!("users/{}", id))).await
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<User> {
        user.validate()?;
        self.execute(ApiRequest::post("users").json(user)?).await
    }

    pub async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<User> {
        update.validate()?;
        self.execute(ApiRequest::put(format!("users/{}", id)).json(update)?)
            .await
    }

    pub async fn delete_user(&self, id: i64) -> Result<()> {
        self.execute_unit(ApiRequest::delete(format!("users/{}", id)))
            .await
    }
}
