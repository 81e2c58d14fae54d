//! Where departure boards come from.

use std::future::Future;

use super::client::TrafiklabClient;
use super::error::TrafiklabError;
use super::mock::MockTrafiklabClient;
use super::types::DeparturesResponse;

/// Anything that can produce a site's raw departure board.
pub trait DepartureSource: Send + Sync {
    fn fetch_departures(
        &self,
        site_id: &str,
    ) -> impl Future<Output = Result<DeparturesResponse, TrafiklabError>> + Send;
}

impl DepartureSource for TrafiklabClient {
    async fn fetch_departures(&self, site_id: &str) -> Result<DeparturesResponse, TrafiklabError> {
        self.get_departures(site_id).await
    }
}

impl DepartureSource for MockTrafiklabClient {
    async fn fetch_departures(&self, site_id: &str) -> Result<DeparturesResponse, TrafiklabError> {
        self.get_departures(site_id).await
    }
}

/// The upstream chosen at startup.
#[derive(Debug, Clone)]
pub enum Upstream {
    Live(TrafiklabClient),
    Mock(MockTrafiklabClient),
}

impl DepartureSource for Upstream {
    async fn fetch_departures(&self, site_id: &str) -> Result<DeparturesResponse, TrafiklabError> {
        match self {
            Upstream::Live(client) => client.get_departures(site_id).await,
            Upstream::Mock(client) => client.get_departures(site_id).await,
        }
    }
}
