//! Query parameters of the access-log and statistics endpoints.

use serde::Deserialize;

/// `?limit=&offset=` of an access-log listing. Bounds are applied by the
/// registry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `?since=` of a statistics request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SinceQuery {
    pub since: Option<String>,
}
