//! Database layer (PostgreSQL via sqlx)
//!
//! Each module owns the queries for one aggregate. IDs are snowflake-style
//! i64 values generated here, never by the database.

pub mod dashboard;
pub mod enquiries;
pub mod members;
pub mod payments;
pub mod tour_members;
pub mod tour_packages;
pub mod users;

/// Custom epoch: 2024-01-01T00:00:00Z in Unix milliseconds.
const ID_EPOCH_MS: i64 = 1_704_067_200_000;

/// Generate a time-ordered i64 id: 41 bits of milliseconds since the custom
/// epoch, 12 random bits to avoid same-millisecond collisions.
pub fn snowflake_id() -> i64 {
    let now = shared::util::now_millis();
    let ts = (now - ID_EPOCH_MS) & ((1 << 41) - 1);
    let random: i64 = (rand::random::<u16>() & 0x0FFF) as i64;
    (ts << 12) | random
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_positive_and_time_ordered() {
        let a = snowflake_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = snowflake_id();
        assert!(a > 0);
        assert!(b > a);
    }
}
