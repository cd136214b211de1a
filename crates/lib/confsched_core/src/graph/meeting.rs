//! Online-meeting payloads: request building and all-or-nothing extraction.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::ExtractError;
use crate::models::meeting::{CreateMeetingRequest, MeetingRecord, SchedulingRequest};

/// Path of the create-meeting endpoint, relative to the Graph base URL.
pub const ONLINE_MEETINGS_PATH: &str = "/me/onlineMeetings";

/// Build the JSON body for `POST /me/onlineMeetings`.
pub fn create_meeting_payload(request: &SchedulingRequest) -> Result<Value, serde_json::Error> {
    serde_json::to_value(CreateMeetingRequest::from(request))
}

/// Graph `onlineMeeting` resource, restricted to the fields we keep.
///
/// No field has a default: a missing key fails the whole extraction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphOnlineMeeting {
    id: String,
    creation_date_time: String,
    start_date_time: String,
    end_date_time: String,
    join_web_url: String,
    meeting_code: String,
    subject: String,
    is_broadcast: bool,
    auto_admitted_users: String,
    #[serde(deserialize_with = "required_nullable")]
    outer_meeting_auto_admitted_users: Option<String>,
    is_entry_exit_announced: bool,
    allowed_presenters: String,
    allow_meeting_chat: String,
    allow_teamwork_reactions: bool,
    allow_attendee_to_enable_mic: bool,
    allow_attendee_to_enable_camera: bool,
    record_automatically: bool,
    audio_conferencing: GraphAudioConferencing,
    participants: GraphParticipants,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphAudioConferencing {
    conference_id: String,
    toll_number: String,
    #[serde(rename = "dialinUrl")]
    dial_in_url: String,
}

#[derive(Debug, Deserialize)]
struct GraphParticipants {
    organizer: GraphOrganizer,
}

#[derive(Debug, Deserialize)]
struct GraphOrganizer {
    upn: String,
    role: String,
}

/// The key must be present; its value may be `null`.
fn required_nullable<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}

impl From<GraphOnlineMeeting> for MeetingRecord {
    fn from(m: GraphOnlineMeeting) -> Self {
        Self {
            call_id: m.id,
            create_time: m.creation_date_time,
            start_time: m.start_date_time,
            end_time: m.end_date_time,
            join_url: m.join_web_url,
            meeting_code: m.meeting_code,
            subject: m.subject,
            is_broadcast: m.is_broadcast,
            auto_admitted_users: m.auto_admitted_users,
            outer_meeting_auto_admitted_users: m.outer_meeting_auto_admitted_users,
            is_entry_exit_announced: m.is_entry_exit_announced,
            allowed_presenters: m.allowed_presenters,
            allow_meeting_chat: m.allow_meeting_chat,
            allow_teamwork_reactions: m.allow_teamwork_reactions,
            allow_attendee_to_enable_mic: m.allow_attendee_to_enable_mic,
            allow_attendee_to_enable_camera: m.allow_attendee_to_enable_camera,
            record_automatically: m.record_automatically,
            conference_id: m.audio_conferencing.conference_id,
            toll_number: m.audio_conferencing.toll_number,
            dial_in_url: m.audio_conferencing.dial_in_url,
            host_upn: m.participants.organizer.upn,
            host_role: m.participants.organizer.role,
        }
    }
}

/// Extract a [`MeetingRecord`] from a success-shaped Graph body.
pub fn extract_meeting_record(body: Value) -> Result<MeetingRecord, ExtractError> {
    serde_json::from_value::<GraphOnlineMeeting>(body)
        .map(MeetingRecord::from)
        .map_err(|e| ExtractError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn meeting_body() -> Value {
        json!({
            "id": "MSpkYzE3NjU",
            "creationDateTime": "2024-01-01T09:00:00Z",
            "startDateTime": "2024-01-01T17:00:00Z",
            "endDateTime": "2024-01-01T18:00:00Z",
            "joinWebUrl": "https://teams.microsoft.com/l/meetup-join/abc",
            "meetingCode": "2345678",
            "subject": "Sync",
            "isBroadcast": false,
            "autoAdmittedUsers": "everyoneInCompany",
            "outerMeetingAutoAdmittedUsers": null,
            "isEntryExitAnnounced": true,
            "allowedPresenters": "everyone",
            "allowMeetingChat": "enabled",
            "allowTeamworkReactions": true,
            "allowAttendeeToEnableMic": true,
            "allowAttendeeToEnableCamera": true,
            "recordAutomatically": false,
            "audioConferencing": {
                "conferenceId": "C1",
                "tollNumber": "+1-000",
                "dialinUrl": "https://d"
            },
            "participants": {
                "organizer": {"upn": "a@b.com", "role": "presenter"},
                "attendees": []
            }
        })
    }

    #[test]
    fn extracts_nested_fields() {
        let record = extract_meeting_record(meeting_body()).unwrap();
        assert_eq!(record.call_id, "MSpkYzE3NjU");
        assert_eq!(record.conference_id, "C1");
        assert_eq!(record.toll_number, "+1-000");
        assert_eq!(record.dial_in_url, "https://d");
        assert_eq!(record.host_upn, "a@b.com");
        assert_eq!(record.host_role, "presenter");
        assert_eq!(record.outer_meeting_auto_admitted_users, None);
        assert!(record.is_entry_exit_announced);
    }

    #[test]
    fn missing_nested_field_fails() {
        let mut body = meeting_body();
        body["audioConferencing"]
            .as_object_mut()
            .unwrap()
            .remove("tollNumber");
        let err = extract_meeting_record(body).unwrap_err();
        assert!(err.to_string().contains("tollNumber"), "{err}");
    }

    #[test]
    fn nullable_field_must_still_be_present() {
        let mut body = meeting_body();
        body.as_object_mut()
            .unwrap()
            .remove("outerMeetingAutoAdmittedUsers");
        assert!(extract_meeting_record(body).is_err());
    }

    #[test]
    fn payload_matches_graph_shape() {
        let request = SchedulingRequest {
            start_time: "2024-01-01T10:00-07:00".into(),
            end_time: "2024-01-01T11:00-07:00".into(),
            subject: "Sync".into(),
        };
        let payload = create_meeting_payload(&request).unwrap();
        assert_eq!(
            payload,
            json!({
                "startDateTime": "2024-01-01T10:00-07:00",
                "endDateTime": "2024-01-01T11:00-07:00",
                "subject": "Sync",
                "lobbyBypassSettings": {"scope": "organization", "isDialInBypassEnabled": true}
            })
        );
    }

    #[test]
    fn wrong_type_fails() {
        let mut body = meeting_body();
        body["isBroadcast"] = json!("no");
        assert!(extract_meeting_record(body).is_err());
    }
}
