//! Raw, authenticated round-trips against the Cloud SQL Admin REST API.
//!
//! The `SqlAdminApi` trait is the seam between the restore coordinator and
//! the wire: production uses the reqwest-backed `SqlAdminClient`, tests use
//! the generated mock.

use async_trait::async_trait;
use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::auth::TokenSource;
use crate::error::{RestoreError, Result};
use crate::types::{
    BackupRun, BackupRunsList, Operation, OperationsList, RestoreBackupRequest,
};

pub const SQL_ADMIN_BASE: &str = "https://www.googleapis.com/sql/v1beta4";

#[mockall::automock]
#[async_trait]
pub trait SqlAdminApi: Send + Sync {
    /// First page of backup runs for an instance, in API order.
    async fn list_backup_runs(&self, project_id: &str, instance_id: &str)
        -> Result<Vec<BackupRun>>;

    /// Triggers a restore onto the target instance. The request body names
    /// the source of the backup; the URL names the target.
    async fn restore_backup(
        &self,
        target_project_id: &str,
        target_instance_id: &str,
        request: RestoreBackupRequest,
    ) -> Result<Operation>;

    /// First page of operations for a project, optionally filtered by
    /// instance, capped at `max_results`.
    async fn list_operations<'a>(
        &self,
        project_id: &str,
        instance_id: Option<&'a str>,
        max_results: u32,
    ) -> Result<Vec<Operation>>;

    /// Re-fetches an operation resource by its canonical URL.
    async fn get_operation(&self, self_link: &str) -> Result<Operation>;
}

pub struct SqlAdminClient {
    http: reqwest::Client,
    tokens: TokenSource,
    base_url: String,
}

impl SqlAdminClient {
    pub fn new(tokens: TokenSource) -> Self {
        Self {
            http: reqwest::Client::new(),
            tokens,
            base_url: SQL_ADMIN_BASE.to_string(),
        }
    }

    async fn read_json<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let url = response.url().to_string();
            let message = response.text().await.unwrap_or_default();
            warn!(%url, status = status.as_u16(), %message, "Cloud SQL Admin API request failed");
            return Err(RestoreError::Server {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let token = self.tokens.token().await?;
        let response = self
            .http
            .get(url)
            .query(query)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| {
                warn!(%url, error = %e, "Cloud SQL Admin API request failed");
                e
            })?;
        self.read_json(response).await
    }
}

#[async_trait]
impl SqlAdminApi for SqlAdminClient {
    async fn list_backup_runs(
        &self,
        project_id: &str,
        instance_id: &str,
    ) -> Result<Vec<BackupRun>> {
        let url = format!(
            "{}/projects/{}/instances/{}/backupRuns",
            self.base_url, project_id, instance_id
        );
        let list: BackupRunsList = self.get_json(&url, &[]).await?;
        Ok(list.items)
    }

    async fn restore_backup(
        &self,
        target_project_id: &str,
        target_instance_id: &str,
        request: RestoreBackupRequest,
    ) -> Result<Operation> {
        let url = format!(
            "{}/projects/{}/instances/{}/restoreBackup",
            self.base_url, target_project_id, target_instance_id
        );
        let token = self.tokens.token().await?;
        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(%url, error = %e, "Cloud SQL Admin API request failed");
                e
            })?;
        self.read_json(response).await
    }

    async fn list_operations<'a>(
        &self,
        project_id: &str,
        instance_id: Option<&'a str>,
        max_results: u32,
    ) -> Result<Vec<Operation>> {
        let url = format!("{}/projects/{}/operations", self.base_url, project_id);
        let mut query = vec![("maxResults", max_results.to_string())];
        if let Some(instance_id) = instance_id {
            query.push(("instance", instance_id.to_string()));
        }
        let list: OperationsList = self.get_json(&url, &query).await?;
        Ok(list.items)
    }

    async fn get_operation(&self, self_link: &str) -> Result<Operation> {
        self.get_json(self_link, &[]).await
    }
}
