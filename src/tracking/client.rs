//! HTTP client for the tracking service.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::{multipart, Client};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::config::TrackingConfig;

use super::{PublishedVersion, TrackingService, VersionPublish};

/// Connection timeout for tracking API requests.
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Script-authenticated client for the tracking service's entity API.
pub struct ShotGridClient {
    client: Client,
    base_url: String,
    script_name: String,
    api_key: String,
    project_id: i64,
}

impl ShotGridClient {
    pub fn new(config: &TrackingConfig) -> Self {
        let client = Client::builder()
            .timeout(CONNECTION_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            script_name: config.script_name.clone(),
            api_key: config.api_key.clone(),
            project_id: config.project_id,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    fn auth(&self, req: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        req.header("X-Script-Name", &self.script_name)
            .header("X-Api-Key", &self.api_key)
    }

    /// Find an entity of `kind` by code within the project.
    fn find_one(&self, kind: &str, code: &str) -> Result<Option<i64>> {
        let response = self
            .auth(self.client.get(self.url(&format!("/entity/{kind}"))))
            .query(&[
                ("project_id", self.project_id.to_string()),
                ("code", code.to_string()),
            ])
            .send()
            .with_context(|| format!("Failed to query {kind} '{code}'"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            anyhow::bail!("{kind} lookup failed ({status}): {body}");
        }

        let payload: Value = response.json().context("Malformed entity response")?;
        Ok(payload["data"]
            .as_array()
            .and_then(|rows| rows.first())
            .and_then(|row| row["id"].as_i64()))
    }

    /// Create an entity of `kind`, returning its id.
    fn create(&self, kind: &str, body: Value) -> Result<i64> {
        let response = self
            .auth(self.client.post(self.url(&format!("/entity/{kind}"))))
            .json(&body)
            .send()
            .with_context(|| format!("Failed to create {kind}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().unwrap_or_default();
            anyhow::bail!("{kind} creation failed ({status}): {text}");
        }

        let payload: Value = response.json().context("Malformed creation response")?;
        payload["data"]["id"]
            .as_i64()
            .ok_or_else(|| anyhow::anyhow!("{kind} creation response carried no id"))
    }

    /// Upload a file into an entity field.
    fn upload(&self, kind: &str, id: i64, field: &str, file: &Path) -> Result<()> {
        let form = multipart::Form::new()
            .file("file", file)
            .with_context(|| format!("Failed to read upload file {}", file.display()))?;

        let response = self
            .auth(
                self.client
                    .post(self.url(&format!("/entity/{kind}/{id}/{field}"))),
            )
            .multipart(form)
            .send()
            .with_context(|| format!("Failed to upload {}", file.display()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().unwrap_or_default();
            anyhow::bail!("upload of {} failed ({status}): {text}", file.display());
        }
        Ok(())
    }

    fn ensure_sequence(&self, code: &str) -> Result<i64> {
        if let Some(id) = self.find_one("sequences", code)? {
            return Ok(id);
        }
        info!("sequence '{}' not found, creating it", code);
        self.create(
            "sequences",
            json!({
                "project_id": self.project_id,
                "code": code,
            }),
        )
    }

    fn ensure_shot(&self, code: &str, sequence_id: i64) -> Result<i64> {
        if let Some(id) = self.find_one("shots", code)? {
            return Ok(id);
        }
        info!("shot '{}' not found, creating it", code);
        self.create(
            "shots",
            json!({
                "project_id": self.project_id,
                "code": code,
                "sequence_id": sequence_id,
            }),
        )
    }
}

impl TrackingService for ShotGridClient {
    fn publish_version(&self, publish: &VersionPublish) -> Result<PublishedVersion> {
        let version_name = publish.version_name();
        info!(
            "publishing {} to project {}",
            version_name, self.project_id
        );

        let sequence_id = self.ensure_sequence(&publish.sequence)?;
        let shot_id = self.ensure_shot(&publish.shot, sequence_id)?;

        let version_id = self.create(
            "versions",
            json!({
                "project_id": self.project_id,
                "code": version_name,
                "shot_id": shot_id,
            }),
        )?;
        info!("created version {} (id {})", version_name, version_id);

        if let Some(thumbnail) = publish.thumbnail.as_ref().filter(|t| t.exists()) {
            self.upload("versions", version_id, "image", thumbnail)?;
            info!("thumbnail uploaded: {}", thumbnail.display());
        }

        if let Some(movie) = publish.preferred_movie() {
            self.upload("versions", version_id, "movie", movie)?;
            info!("movie uploaded: {}", movie.display());
        }

        Ok(PublishedVersion {
            version_id,
            version_name,
        })
    }
}
