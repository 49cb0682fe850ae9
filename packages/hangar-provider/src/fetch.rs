use std::collections::HashMap;

use hangar_utils::http::{get, http_status_is_ok};
use hangar_utils::Uri;

use crate::error::{ResolveError, ResolveResult};

/// GETs `url` and returns the body, mapping transport and HTTP failures to
/// [`ResolveError::Network`].
pub(crate) async fn fetch_body(url: &str, header_map: &HashMap<String, String>) -> ResolveResult<String> {
    let uri = url
        .parse::<Uri>()
        .map_err(|e| ResolveError::network(url, format!("invalid url: {}", e)))?;
    let rsp = get(uri, header_map)
        .await
        .map_err(|e| ResolveError::network(url, e))?;
    if !http_status_is_ok(rsp.status) {
        return Err(ResolveError::network(url, format!("HTTP status {}", rsp.status)));
    }
    Ok(rsp.text())
}
