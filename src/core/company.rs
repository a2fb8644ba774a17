use crate::core::client::{ApiClient, ApiRequest};
use crate::domain::model::Company;
use crate::domain::requests::CompanyProfile;
use crate::utils::error::Result;
use crate::utils::validation::Validate;

impl ApiClient {
    pub async fn company(&self) -> Result<Company> {
        self.execute(ApiRequest::get("company")).await
    }

    pub async fn create_company(&self, profile: &CompanyProfile) -> Result<Company> {
        profile.validate()?;
        self.execute(ApiRequest::post("company").json(profile)?)
            .await
    }

    pub async fn update_company(&self, profile: &CompanyProfile) -> Result<Company> {
        profile.validate()?;
        self.execute(ApiRequest::put("company").json(profile)?)
            .await
    }

    pub async fn delete_company(&self) -> Result<()> {
        self.execute_unit(ApiRequest::delete("company")).await
    }
}
