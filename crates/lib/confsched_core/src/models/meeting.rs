//! Meeting domain models.

use serde::{Deserialize, Serialize};

use crate::timestamp::{TimestampError, UtcOffset, normalize_timestamp};

/// Lobby scope applied to every meeting this service creates.
pub const LOBBY_BYPASS_SCOPE: &str = "organization";

/// Dial-in callers always bypass the lobby.
pub const DIAL_IN_BYPASS_ENABLED: bool = true;

/// Metadata of a meeting created through Graph, as persisted locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MeetingRecord {
    /// Graph's identifier for the online meeting.
    pub call_id: String,
    pub create_time: String,
    pub start_time: String,
    pub end_time: String,
    pub join_url: String,
    pub meeting_code: String,
    pub subject: String,
    pub is_broadcast: bool,
    pub auto_admitted_users: String,
    pub outer_meeting_auto_admitted_users: Option<String>,
    pub is_entry_exit_announced: bool,
    pub allowed_presenters: String,
    pub allow_meeting_chat: String,
    pub allow_teamwork_reactions: bool,
    pub allow_attendee_to_enable_mic: bool,
    pub allow_attendee_to_enable_camera: bool,
    pub record_automatically: bool,
    pub conference_id: String,
    pub toll_number: String,
    pub dial_in_url: String,
    pub host_upn: String,
    pub host_role: String,
}

/// A meeting record together with its store-assigned key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct StoredMeeting {
    pub id: i64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub record: MeetingRecord,
}

/// One form submission, with timestamps already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulingRequest {
    pub start_time: String,
    pub end_time: String,
    pub subject: String,
}

impl SchedulingRequest {
    /// Build a request from raw client input, appending `offset` to any
    /// timestamp that does not carry one yet.
    pub fn new(
        start_time: &str,
        end_time: &str,
        subject: &str,
        offset: &UtcOffset,
    ) -> Result<Self, TimestampError> {
        Ok(Self {
            start_time: normalize_timestamp(start_time, offset)?,
            end_time: normalize_timestamp(end_time, offset)?,
            subject: subject.to_string(),
        })
    }
}

/// `lobbyBypassSettings` body fragment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyBypassSettings {
    pub scope: &'static str,
    pub is_dial_in_bypass_enabled: bool,
}

impl Default for LobbyBypassSettings {
    fn default() -> Self {
        Self {
            scope: LOBBY_BYPASS_SCOPE,
            is_dial_in_bypass_enabled: DIAL_IN_BYPASS_ENABLED,
        }
    }
}

/// Body of `POST /me/onlineMeetings`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetingRequest<'a> {
    pub start_date_time: &'a str,
    pub end_date_time: &'a str,
    pub subject: &'a str,
    pub lobby_bypass_settings: LobbyBypassSettings,
}

impl<'a> From<&'a SchedulingRequest> for CreateMeetingRequest<'a> {
    fn from(request: &'a SchedulingRequest) -> Self {
        Self {
            start_date_time: &request.start_time,
            end_date_time: &request.end_time,
            subject: &request.subject,
            lobby_bypass_settings: LobbyBypassSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_carries_fixed_lobby_policy() {
        let offset: UtcOffset = "-07:00".parse().unwrap();
        let request =
            SchedulingRequest::new("2024-01-01T10:00", "2024-01-01T11:00", "Sync", &offset)
                .unwrap();
        let body = serde_json::to_value(CreateMeetingRequest::from(&request)).unwrap();

        assert_eq!(body["startDateTime"], "2024-01-01T10:00-07:00");
        assert_eq!(body["endDateTime"], "2024-01-01T11:00-07:00");
        assert_eq!(body["subject"], "Sync");
        assert_eq!(body["lobbyBypassSettings"]["scope"], "organization");
        assert_eq!(body["lobbyBypassSettings"]["isDialInBypassEnabled"], true);
    }

    #[test]
    fn invalid_start_time_is_rejected() {
        let offset = UtcOffset::default();
        let err = SchedulingRequest::new("tomorrow", "2024-01-01T11:00", "Sync", &offset);
        assert!(err.is_err());
    }
}
