use std::time::{Duration, SystemTime, UNIX_EPOCH};

fn since_epoch() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
}

pub fn get_now_unix() -> u64 {
    since_epoch().as_secs()
}

pub fn get_now_unix_millis() -> u128 {
    since_epoch().as_millis()
}
