use crate::core::client::ApiClient;
use crate::domain::model::TimeLog;
use crate::domain::requests::ClockEvent;
use crate::utils::error::{ClientError, Result};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Tracks the signed-in user's open work session across check-in and
/// check-out. The server stays authoritative: state is loaded from it on
/// first use and replaced by every successful clock call.
pub struct ClockSession {
    client: Arc<ApiClient>,
    active: Option<TimeLog>,
    synced: bool,
}

impl ClockSession {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            active: None,
            synced: false,
        }
    }

    pub fn active(&self) -> Option<&TimeLog> {
        self.active.as_ref()
    }

    pub fn is_checked_in(&self) -> bool {
        self.active.is_some()
    }

    /// Time since check-in for the open session.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.active.as_ref().map(|log| now - log.check_in)
    }

    pub async fn sync(&mut self) -> Result<Option<&TimeLog>> {
        self.active = self.client.active_time_log().await?;
        self.synced = true;
        tracing::debug!("Active session: {:?}", self.active.as_ref().map(|log| log.id));
        Ok(self.active.as_ref())
    }

    async fn ensure_synced(&mut self) -> Result<()> {
        if !self.synced {
            self.sync().await?;
        }
        Ok(())
    }

    pub async fn check_in(&mut self, event: ClockEvent) -> Result<&TimeLog> {
        self.ensure_synced().await?;
        if let Some(active) = &self.active {
            return Err(ClientError::invalid_state(format!(
                "Already checked in since {}",
                active.check_in.format("%Y-%m-%d %H:%M UTC")
            )));
        }

        let log = self.client.check_in(event).await?;
        Ok(self.active.insert(log))
    }

    /// Close the open session. On success there is no active session left.
    pub async fn check_out(&mut self, event: ClockEvent) -> Result<TimeLog> {
        self.ensure_synced().await?;
        if self.active.is_none() {
            return Err(ClientError::invalid_state("Not checked in"));
        }

        let log = self.client.check_out(event).await?;
        self.active = None;
        Ok(log)
    }
}
