//! Mock Trafiklab client for running without an API key.
//!
//! Loads sample departure boards from JSON files and serves them as if
//! they were live API responses.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use super::error::TrafiklabError;
use super::types::DeparturesResponse;

/// Mock client that serves boards from `{site_id}.json` files.
#[derive(Debug, Clone)]
pub struct MockTrafiklabClient {
    boards: Arc<HashMap<String, DeparturesResponse>>,
}

impl MockTrafiklabClient {
    /// Load every `.json` file in `data_dir`, keyed by file stem.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, TrafiklabError> {
        let data_dir = data_dir.as_ref();
        let mut boards = HashMap::new();

        let entries = std::fs::read_dir(data_dir).map_err(|e| {
            TrafiklabError::NotConfigured(format!(
                "failed to read mock data directory {}: {e}",
                data_dir.display()
            ))
        })?;

        for entry in entries {
            let path = entry
                .map_err(|e| {
                    TrafiklabError::NotConfigured(format!("failed to read directory entry: {e}"))
                })?
                .path();

            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let Some(site_id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let json = std::fs::read_to_string(&path).map_err(|e| {
                TrafiklabError::NotConfigured(format!("failed to read {}: {e}", path.display()))
            })?;

            let board: DeparturesResponse =
                serde_json::from_str(&json).map_err(|e| TrafiklabError::Json {
                    message: format!("{}: {e}", path.display()),
                    body: None,
                })?;

            boards.insert(site_id.to_string(), board);
        }

        if boards.is_empty() {
            return Err(TrafiklabError::NotConfigured(format!(
                "no mock board files found in {}",
                data_dir.display()
            )));
        }

        Ok(Self {
            boards: Arc::new(boards),
        })
    }

    /// Mimics [`TrafiklabClient::get_departures`](super::TrafiklabClient::get_departures).
    /// Unknown sites behave like an upstream 404.
    pub async fn get_departures(&self, site_id: &str) -> Result<DeparturesResponse, TrafiklabError> {
        debug!(site_id, "serving mock departures");
        self.boards
            .get(site_id)
            .cloned()
            .ok_or_else(|| TrafiklabError::NotFound {
                site_id: site_id.to_string(),
            })
    }

    /// Sites with mock data, sorted.
    pub fn available_sites(&self) -> Vec<&str> {
        let mut sites: Vec<&str> = self.boards.keys().map(String::as_str).collect();
        sites.sort_unstable();
        sites
    }
}
