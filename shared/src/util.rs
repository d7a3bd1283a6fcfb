/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a random resource ID (UUID v4, string form).
///
/// All domain entities use string ids; keys stay opaque to the storage layer.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
