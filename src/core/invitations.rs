use crate::core::client::{ApiClient, ApiRequest};
use crate::domain::model::{Invitation, InvitationCheck};
use crate::domain::requests::NewInvitation;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, Validate};

impl ApiClient {
    pub async fn invitations(&self) -> Result<Vec<Invitation>> {
        self.execute(ApiRequest::get("invitations")).await
    }

    pub async fn create_invitation(&self, invitation: &NewInvitation) -> Result<Invitation> {
        invitation.validate()?;
        self.execute(ApiRequest::post("invitations").json(invitation)?)
            .await
    }

    pub async fn delete_invitation(&self, id: i64) -> Result<()> {
        self.execute_unit(ApiRequest::delete(format!("invitations/{}", id)))
            .await
    }

    /// Check an invitation code before registering. Does not need a session.
    pub async fn validate_invitation(&self, code: &str) -> Result<InvitationCheck> {
        validate_non_empty_string("invitation_code", code)?;
        self.execute(ApiRequest::get(format!("invitations/validate/{}", code.trim())).anonymous())
            .await
    }
}
