//! Persistence steps plugged into the workflow.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{error, info};

use confsched_core::graph::ExtractError;
use confsched_core::graph::meeting::extract_meeting_record;
use confsched_core::meetings::MeetingStore;
use confsched_core::models::meeting::MeetingRecord;

use crate::error::AppResult;
use crate::services::workflow::PersistStep;
use crate::views::MeetingView;

/// Store a newly created meeting and show its dial-in details.
pub struct PersistMeeting {
    store: Arc<dyn MeetingStore>,
}

impl PersistMeeting {
    pub fn new(store: Arc<dyn MeetingStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PersistStep for PersistMeeting {
    type Record = MeetingRecord;
    type View = MeetingView;

    fn extract(&self, body: Value) -> Result<MeetingRecord, ExtractError> {
        extract_meeting_record(body)
    }

    async fn persist(&self, record: MeetingRecord) -> AppResult<MeetingView> {
        match self.store.save(&record).await {
            Ok(id) => {
                info!(id, call_id = %record.call_id, "meeting recorded");
                Ok(MeetingView::from(&record))
            }
            Err(e) => {
                // The meeting already exists in Teams at this point.
                error!(
                    call_id = %record.call_id,
                    join_url = %record.join_url,
                    "meeting created upstream but not recorded locally, reconcile manually: {e}"
                );
                Err(e.into())
            }
        }
    }
}

/// Show the Graph body as-is; nothing is stored.
pub struct ShowBody;

#[async_trait]
impl PersistStep for ShowBody {
    type Record = Value;
    type View = Value;

    fn extract(&self, body: Value) -> Result<Value, ExtractError> {
        Ok(body)
    }

    async fn persist(&self, record: Value) -> AppResult<Value> {
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use confsched_core::meetings::StoreError;
    use serde_json::json;

    use super::*;
    use crate::error::AppError;

    struct BrokenStore;

    #[async_trait]
    impl MeetingStore for BrokenStore {
        async fn save(&self, _record: &MeetingRecord) -> Result<i64, StoreError> {
            Err(StoreError::DbError(sqlx::Error::PoolClosed))
        }
    }

    fn record() -> MeetingRecord {
        extract_meeting_record(json!({
            "id": "abc",
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
            "audioConferencing": {"conferenceId": "C1", "tollNumber": "+1-000", "dialinUrl": "https://d"},
            "participants": {"organizer": {"upn": "a@b.com", "role": "presenter"}}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn failed_write_is_an_internal_error() {
        let step = PersistMeeting::new(Arc::new(BrokenStore));
        let err = step.persist(record()).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn show_body_passes_through() {
        let body = json!({"value": [{"displayName": "Ada"}]});
        let extracted = ShowBody.extract(body.clone()).unwrap();
        assert_eq!(ShowBody.persist(extracted).await.unwrap(), body);
    }
}
