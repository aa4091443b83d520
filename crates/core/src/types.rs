/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Opaque backend identifier (jobs, uploaded images, users).
pub type RemoteId = String;
