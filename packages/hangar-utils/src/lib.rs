pub mod http;
pub mod time;

pub use http::{get, http_status_is_ok, with_cache_bust, HttpResult, ResponseData};
pub use time::{get_now_unix, get_now_unix_millis};
pub use hyper::Uri;
