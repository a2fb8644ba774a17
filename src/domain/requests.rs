//! Request payloads sent to the API. Each is validated before it is sent.

use crate::domain::model::{Role, TimeLogStatus};
use crate::domain::photo::PhotoEvidence;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_coordinates, validate_non_empty_string, validate_password_confirmation,
    validate_time_range, Validate,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, validator::Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<()> {
        Ok(validator::Validate::validate(self)?)
    }
}

#[derive(Debug, Clone, Serialize, validator::Validate)]
pub struct RegisterRequest {
    pub name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(skip)]
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitation_code: Option<String>,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("name", &self.name)?;
        validator::Validate::validate(self)?;
        if let Some(code) = &self.invitation_code {
            validate_non_empty_string("invitation_code", code)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, validator::Validate)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
    #[serde(skip)]
    pub confirm_password: Option<String>,
}

impl Validate for ProfileUpdate {
    fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_non_empty_string("name", name)?;
        }
        validator::Validate::validate(self)?;
        if let Some(password) = &self.password {
            validate_password_confirmation(
                password,
                self.confirm_password.as_deref().unwrap_or_default(),
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl Validate for GeoPoint {
    fn validate(&self) -> Result<()> {
        validate_coordinates(self.latitude, self.longitude)
    }
}

/// Evidence attached to a check-in or check-out.
#[derive(Debug, Clone, Default)]
pub struct ClockEvent {
    pub photo: Option<PhotoEvidence>,
    pub location: Option<GeoPoint>,
    pub notes: Option<String>,
}

impl Validate for ClockEvent {
    fn validate(&self) -> Result<()> {
        if let Some(location) = &self.location {
            location.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ManualTimeLogRequest {
    pub user_id: i64,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Validate for ManualTimeLogRequest {
    fn validate(&self) -> Result<()> {
        validate_time_range(self.check_in, self.check_out)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApprovalDecision {
    pub approved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ApprovalDecision {
    pub fn approve() -> Self {
        Self {
            approved: true,
            reason: None,
        }
    }

    pub fn reject(reason: Option<String>) -> Self {
        Self {
            approved: false,
            reason,
        }
    }
}

/// Filters for time-log listing and reports. Unset fields are omitted from
/// the query string.
#[derive(Debug, Clone, Default)]
pub struct TimeLogQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub user_id: Option<i64>,
    pub status: Option<TimeLogStatus>,
}

impl TimeLogQuery {
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(start) = self.start_date {
            pairs.push(("start_date".to_string(), start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("end_date".to_string(), end.format("%Y-%m-%d").to_string()));
        }
        if let Some(user_id) = self.user_id {
            pairs.push(("user_id".to_string(), user_id.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status".to_string(), status.to_string()));
        }
        pairs
    }
}

impl Validate for TimeLogQuery {
    fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(crate::utils::error::ClientError::validation(
                    "end_date",
                    "End date must not be before start date",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, validator::Validate)]
pub struct NewUser {
    pub name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub role: Role,
}

impl Validate for NewUser {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("name", &self.name)?;
        Ok(validator::Validate::validate(self)?)
    }
}

#[derive(Debug, Clone, Default, Serialize, validator::Validate)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Validate for UserUpdate {
    fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_non_empty_string("name", name)?;
        }
        Ok(validator::Validate::validate(self)?)
    }
}

#[derive(Debug, Clone, Serialize, validator::Validate)]
pub struct NewInvitation {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    pub role: Role,
}

impl Validate for NewInvitation {
    fn validate(&self) -> Result<()> {
        Ok(validator::Validate::validate(self)?)
    }
}

#[derive(Debug, Clone, Default, Serialize, validator::Validate)]
pub struct CompanyProfile {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: Option<String>,
}

impl Validate for CompanyProfile {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("name", &self.name)?;
        Ok(validator::Validate::validate(self)?)
    }
}
