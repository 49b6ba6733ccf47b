//! Small shared utilities

/// Current Unix timestamp in milliseconds.
///
/// All persisted timestamps in the system are i64 millis; calendar math
/// (month boundaries, reminder offsets) converts through chrono at the edges.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_millis_is_recent() {
        let ms = now_millis();
        // 2020-01-01 in millis; anything earlier means a broken clock source
        assert!(ms > 1_577_836_800_000);
    }
}
