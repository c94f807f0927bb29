//! HTTP implementations of the collaborator traits.
//!
//! `HttpJobsApi` speaks the installation company's REST backend;
//! `HttpGeocoder` speaks a Nominatim-style search endpoint. Both convert
//! transport failures into `anyhow` errors with enough context to read
//! in a rollback notice.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::board::models::{BoardColumn, Coordinates, Job, JobId, JobPatch};
use crate::config::{ApiConfig, EnrichmentSettings};

use super::api::{GeocodeMatch, Geocoder, JobsApi};

pub struct HttpJobsApi {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct ColumnUpdateBody<'a> {
    column: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort_key: Option<f64>,
}

#[derive(Serialize)]
struct ReorderBody<'a> {
    ordered_ids: &'a [JobId],
}

impl HttpJobsApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl JobsApi for HttpJobsApi {
    async fn list_jobs(&self) -> Result<Vec<Job>> {
        let resp = self
            .client
            .get(self.url("/jobs"))
            .send()
            .await
            .context("Failed to fetch job list")?
            .error_for_status()
            .context("Job list endpoint returned error status")?;
        resp.json::<Vec<Job>>()
            .await
            .context("Failed to parse job list response")
    }

    async fn update_job_column(
        &self,
        id: JobId,
        column: BoardColumn,
        sort_key: Option<f64>,
    ) -> Result<()> {
        self.client
            .put(self.url(&format!("/jobs/{}/column", id)))
            .json(&ColumnUpdateBody {
                column: column.as_str(),
                sort_key,
            })
            .send()
            .await
            .with_context(|| format!("Failed to send column update for job {}", id))?
            .error_for_status()
            .with_context(|| format!("Column update for job {} rejected", id))?;
        Ok(())
    }

    async fn reorder_column(&self, column: BoardColumn, ordered_ids: &[JobId]) -> Result<()> {
        self.client
            .put(self.url(&format!("/columns/{}/order", column.as_str())))
            .json(&ReorderBody { ordered_ids })
            .send()
            .await
            .with_context(|| format!("Failed to send reorder for column {}", column))?
            .error_for_status()
            .with_context(|| format!("Reorder for column {} rejected", column))?;
        Ok(())
    }

    async fn update_job(&self, id: JobId, patch: JobPatch) -> Result<()> {
        self.client
            .patch(self.url(&format!("/jobs/{}", id)))
            .json(&patch)
            .send()
            .await
            .with_context(|| format!("Failed to send field update for job {}", id))?
            .error_for_status()
            .with_context(|| format!("Field update for job {} rejected", id))?;
        Ok(())
    }

    async fn delete_job(&self, id: JobId) -> Result<()> {
        self.client
            .delete(self.url(&format!("/jobs/{}", id)))
            .send()
            .await
            .with_context(|| format!("Failed to delete job {}", id))?
            .error_for_status()
            .with_context(|| format!("Delete for job {} rejected", id))?;
        Ok(())
    }

    async fn duplicate_job(&self, id: JobId) -> Result<Job> {
        let resp = self
            .client
            .post(self.url(&format!("/jobs/{}/duplicate", id)))
            .send()
            .await
            .with_context(|| format!("Failed to duplicate job {}", id))?
            .error_for_status()
            .with_context(|| format!("Duplicate for job {} rejected", id))?;
        resp.json::<Job>()
            .await
            .context("Failed to parse duplicated job response")
    }
}

/// Raw hit from a Nominatim-style search endpoint. Coordinates come back
/// as strings and are parsed on conversion.
#[derive(Debug, Deserialize)]
struct GeocodeHit {
    lat: String,
    lon: String,
    display_name: String,
}

pub struct HttpGeocoder {
    client: reqwest::Client,
    search_url: String,
}

impl HttpGeocoder {
    pub fn new(settings: &EnrichmentSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("crewboard/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(15))
            .build()
            .context("Failed to build geocoding HTTP client")?;
        Ok(Self {
            client,
            search_url: settings.geocode_url.clone(),
        })
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<GeocodeMatch>> {
        let hits = self
            .client
            .get(&self.search_url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .context("Failed to send geocoding request")?
            .error_for_status()
            .context("Geocoding provider returned error status")?
            .json::<Vec<GeocodeHit>>()
            .await
            .context("Failed to parse geocoding response")?;

        let Some(hit) = hits.into_iter().next() else {
            return Ok(None);
        };
        let lat: f64 = hit
            .lat
            .parse()
            .with_context(|| format!("Invalid latitude '{}' in geocoding response", hit.lat))?;
        let lng: f64 = hit
            .lon
            .parse()
            .with_context(|| format!("Invalid longitude '{}' in geocoding response", hit.lon))?;
        Ok(Some(GeocodeMatch {
            formatted_address: hit.display_name,
            coordinates: Coordinates { lat, lng },
        }))
    }
}
