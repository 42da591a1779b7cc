/// Document identifiers are opaque strings assigned by the backing store.
pub type DocId = String;

/// User identifiers are opaque strings assigned by the auth provider.
pub type UserId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
