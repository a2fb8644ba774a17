use crate::core::client::{ApiClient, ApiRequest, MultipartBody};
use crate::domain::model::{TimeLog, TimeReport};
use crate::domain::requests::{ApprovalDecision, ClockEvent, ManualTimeLogRequest, TimeLogQuery};
use crate::utils::error::Result;
use crate::utils::validation::Validate;

fn clock_form(event: ClockEvent) -> MultipartBody {
    let mut body = MultipartBody::default();
    if let Some(location) = event.location {
        body = body
            .text("latitude", location.latitude)
            .text("longitude", location.longitude);
    }
    if let Some(notes) = event.notes.filter(|notes| !notes.trim().is_empty()) {
        body = body.text("notes", notes);
    }
    if let Some(photo) = event.photo {
        body = body.photo("photo", photo);
    }
    body
}

impl ApiClient {
    pub async fn check_in(&self, event: ClockEvent) -> Result<TimeLog> {
        event.validate()?;
        tracing::info!(
            "Checking in (photo: {}, location: {})",
            event.photo.is_some(),
            event.location.is_some()
        );
        self.execute(ApiRequest::post("timelogs/check-in").multipart(clock_form(event)))
            .await
    }

    pub async fn check_out(&self, event: ClockEvent) -> Result<TimeLog> {
        event.validate()?;
        tracing::info!(
            "Checking out (photo: {}, location: {})",
            event.photo.is_some(),
            event.location.is_some()
        );
        self.execute(ApiRequest::post("timelogs/check-out").multipart(clock_form(event)))
            .await
    }

    /// The caller's open session, or `None` when not checked in.
    pub async fn active_time_log(&self) -> Result<Option<TimeLog>> {
        self.execute(ApiRequest::get("timelogs/active")).await
    }

    pub async fn time_logs(&self, query: &TimeLogQuery) -> Result<Vec<TimeLog>> {
        query.validate()?;
        self.execute(ApiRequest::get("timelogs").query(query.to_pairs()))
            .await
    }

    pub async fn time_report(&self, query: &TimeLogQuery) -> Result<TimeReport> {
        query.validate()?;
        self.execute(ApiRequest::get("timelogs/report").query(query.to_pairs()))
            .await
    }

    pub async fn create_manual_time_log(&self, request: &ManualTimeLogRequest) -> Result<TimeLog> {
        request.validate()?;
        self.execute(ApiRequest::post("timelogs/manual").json(request)?)
            .await
    }

    pub async fn pending_time_logs(&self) -> Result<Vec<TimeLog>> {
        self.execute(ApiRequest::get("timelogs/pending")).await
    }

    pub async fn decide_time_log(&self, id: i64, decision: &ApprovalDecision) -> Result<TimeLog> {
        tracing::info!(
            "{} time log {}",
            if decision.approved { "Approving" } else { "Rejecting" },
            id
        );
        self.execute(ApiRequest::put(format!("timelogs/{}/approval", id)).json(decision)?)
            .await
    }
}
