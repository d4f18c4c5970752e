use serde::{Deserialize, Serialize};
use super::constants::DEFAULT_GEO_ENDPOINT;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_GEO_ENDPOINT.to_string(),
            timeout_secs: 5,
        }
    }
}
