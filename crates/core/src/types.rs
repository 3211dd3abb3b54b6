/// Document identifiers are generated UUIDs (v7, time-ordered).
pub type EntityId = uuid::Uuid;

/// Opaque client session key (one active reservation per session).
pub type SessionKey = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh, time-ordered entity id.
pub fn new_id() -> EntityId {
    uuid::Uuid::now_v7()
}
