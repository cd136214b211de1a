//! Meeting-related database queries.

use sqlx::SqlitePool;

use super::StoreError;
use crate::models::meeting::{MeetingRecord, StoredMeeting};

/// Insert a meeting record, returning its row id.
pub async fn insert_meeting(pool: &SqlitePool, record: &MeetingRecord) -> Result<i64, StoreError> {
    let result = sqlx::query(
        "INSERT INTO meetings (\
             call_id, create_time, start_time, end_time, join_url, meeting_code, subject, \
             is_broadcast, auto_admitted_users, outer_meeting_auto_admitted_users, \
             is_entry_exit_announced, allowed_presenters, allow_meeting_chat, \
             allow_teamwork_reactions, allow_attendee_to_enable_mic, \
             allow_attendee_to_enable_camera, record_automatically, \
             conference_id, toll_number, dial_in_url, host_upn, host_role\
         ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&record.call_id)
    .bind(&record.create_time)
    .bind(&record.start_time)
    .bind(&record.end_time)
    .bind(&record.join_url)
    .bind(&record.meeting_code)
    .bind(&record.subject)
    .bind(record.is_broadcast)
    .bind(&record.auto_admitted_users)
    .bind(&record.outer_meeting_auto_admitted_users)
    .bind(record.is_entry_exit_announced)
    .bind(&record.allowed_presenters)
    .bind(&record.allow_meeting_chat)
    .bind(record.allow_teamwork_reactions)
    .bind(record.allow_attendee_to_enable_mic)
    .bind(record.allow_attendee_to_enable_camera)
    .bind(record.record_automatically)
    .bind(&record.conference_id)
    .bind(&record.toll_number)
    .bind(&record.dial_in_url)
    .bind(&record.host_upn)
    .bind(&record.host_role)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Fetch a meeting by its store-assigned id.
pub async fn get_meeting(pool: &SqlitePool, id: i64) -> Result<Option<StoredMeeting>, StoreError> {
    let row = sqlx::query_as::<_, StoredMeeting>("SELECT * FROM meetings WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Count stored meetings.
pub async fn meeting_count(pool: &SqlitePool) -> Result<i64, StoreError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM meetings")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
