//! Datasource version history: list, view and restore snapshots.
//!
//! Version numbering is owned by the server; this side only reads snapshots
//! and writes one back over the current datasource.

use anyhow::{Context, Result, bail};
use chrono::DateTime;
use dashgate_types::{DataSource, DataSourceVersion};

use crate::api::{ApiResult, Backend, from_value};
use crate::notice::Notice;

fn datasource_path(uid: &str) -> String {
    format!("/api/datasources/uid/{uid}")
}

fn history_path(uid: &str) -> String {
    format!("/api/datasources/uid/{uid}/history")
}

fn version_path(uid: &str, version: &str) -> String {
    format!("/api/datasources/uid/{uid}/history/{version}")
}

fn update_path(id: i64) -> String {
    format!("/api/datasources/{id}")
}

/// Rejects identifiers that would escape their path segment.
fn check_segment(kind: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() || value.contains(['/', '?', '#']) {
        bail!("Invalid {kind}: {value:?}");
    }
    Ok(())
}

/// Formats a snapshot timestamp (unix seconds) as UTC.
pub fn format_timestamp(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0).map_or_else(
        || secs.to_string(),
        |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

/// Snapshot data pretty-printed when it is JSON, raw otherwise.
pub fn pretty_data(version: &DataSourceVersion) -> String {
    version
        .parsed_data()
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| version.data.clone())
}

pub struct DataSourceHistory<B> {
    backend: B,
    datasource: Option<DataSource>,
    versions: Vec<DataSourceVersion>,
    /// Snapshot currently being viewed.
    version: Option<DataSourceVersion>,
    notices: Vec<Notice>,
}

impl<B: Backend> DataSourceHistory<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            datasource: None,
            versions: Vec::new(),
            version: None,
            notices: Vec::new(),
        }
    }

    pub fn datasource(&self) -> Option<&DataSource> {
        self.datasource.as_ref()
    }

    pub fn versions(&self) -> &[DataSourceVersion] {
        &self.versions
    }

    pub fn viewed(&self) -> Option<&DataSourceVersion> {
        self.version.as_ref()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Loads the datasource `uid` and its history.
    ///
    /// # Errors
    /// Returns an error if either request fails.
    pub async fn load(&mut self, uid: &str) -> Result<&[DataSourceVersion]> {
        check_segment("datasource uid", uid)?;

        let datasource: DataSource = from_value(self.backend.get(&datasource_path(uid), &[]).await?)
            .with_context(|| format!("load datasource '{uid}'"))?;
        self.datasource = Some(datasource);

        self.versions = self
            .fetch_history(uid)
            .await
            .with_context(|| format!("load history for '{uid}'"))?;
        tracing::debug!(uid, versions = self.versions.len(), "history loaded");

        Ok(&self.versions)
    }

    /// Fetches one snapshot for read-only viewing.
    ///
    /// # Errors
    /// Returns an error if nothing is loaded or the request fails.
    pub async fn view(&mut self, version: &str) -> Result<&DataSourceVersion> {
        let uid = self.loaded_uid()?;
        check_segment("version", version)?;

        let snapshot: DataSourceVersion =
            from_value(self.backend.get(&version_path(&uid, version), &[]).await?)
                .with_context(|| format!("load version {version} of '{uid}'"))?;

        Ok(&*self.version.insert(snapshot))
    }

    /// Overwrites the current datasource with `version`'s snapshot, then
    /// reloads the history.
    ///
    /// # Errors
    /// Returns an error if nothing is loaded, the snapshot is not valid JSON,
    /// or the update is rejected.
    pub async fn restore(&mut self, version: &DataSourceVersion) -> Result<()> {
        let Some(current) = self.datasource.as_ref() else {
            bail!("No datasource loaded");
        };
        let (id, uid) = (current.id, current.uid.clone());

        let body = version
            .parsed_data()
            .with_context(|| format!("version {} has no valid snapshot data", version.version))?;

        self.backend
            .put(&update_path(id), &body)
            .await
            .with_context(|| format!("restore version {} of '{uid}'", version.version))?;
        tracing::info!(uid = %uid, version = %version.version, "datasource restored");
        self.notices.push(Notice::success(
            "Datasource restored",
            format!("version {}", version.version),
        ));

        self.load(&uid).await?;
        Ok(())
    }

    /// Finds a listed version by its label.
    pub fn find(&self, version: &str) -> Option<&DataSourceVersion> {
        self.versions.iter().find(|v| v.version == version)
    }

    async fn fetch_history(&self, uid: &str) -> ApiResult<Vec<DataSourceVersion>> {
        let value = self.backend.get(&history_path(uid), &[]).await?;
        if value.is_null() {
            return Ok(Vec::new());
        }
        from_value(value)
    }

    fn loaded_uid(&self) -> Result<String> {
        self.datasource
            .as_ref()
            .map(|ds| ds.uid.clone())
            .context("No datasource loaded")
    }
}
