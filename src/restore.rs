//! Cross-project restore coordination over the Cloud SQL Admin API.

use std::path::Path;

use tracing::info;

use crate::api::{SqlAdminApi, SqlAdminClient};
use crate::auth::{ServiceAccountKey, TokenSource, CLOUD_PLATFORM_SCOPE};
use crate::error::{RestoreError, Result};
use crate::types::{
    BackupRun, BackupRunStatus, Operation, RestoreBackupContext, RestoreBackupRequest,
};

pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// Helper for restoring Cloud SQL backups across projects.
///
/// Construct it once with `authorize`, then call the operations
/// independently; the only state retained between calls is the
/// authenticated client.
pub struct SqlRestore {
    api: Box<dyn SqlAdminApi>,
}

impl SqlRestore {
    /// Builds a client authorized by the service-account key file at `path`.
    ///
    /// Reads and validates the key but performs no network I/O; the bearer
    /// token is acquired lazily on the first request.
    pub fn authorize(path: impl AsRef<Path>) -> Result<Self> {
        let key = ServiceAccountKey::from_file(path)?;
        let tokens = TokenSource::new(key, CLOUD_PLATFORM_SCOPE);
        Ok(Self {
            api: Box::new(SqlAdminClient::new(tokens)),
        })
    }

    /// Builds a coordinator over an arbitrary API implementation.
    pub fn with_api(api: Box<dyn SqlAdminApi>) -> Self {
        Self { api }
    }

    /// Lists backup runs for an instance, exactly as returned by the API.
    /// Order is not guaranteed; only the first page is consumed.
    pub async fn list_backups(&self, project_id: &str, instance_id: &str) -> Result<Vec<BackupRun>> {
        self.api.list_backup_runs(project_id, instance_id).await
    }

    /// Restores a specific backup run from the source instance onto the
    /// target instance. The backup id is not validated client-side; the
    /// service may reject it asynchronously via the returned operation.
    pub async fn restore_backup(
        &self,
        source_project_id: &str,
        source_instance_id: &str,
        target_project_id: &str,
        target_instance_id: &str,
        backup_run_id: &str,
    ) -> Result<Operation> {
        info!(
            backup_run_id,
            source = %format!("{source_project_id}/{source_instance_id}"),
            target = %format!("{target_project_id}/{target_instance_id}"),
            "requesting backup restore"
        );
        let request = RestoreBackupRequest {
            restore_backup_context: RestoreBackupContext {
                backup_run_id: backup_run_id.to_string(),
                project: source_project_id.to_string(),
                instance_id: source_instance_id.to_string(),
            },
        };
        self.api
            .restore_backup(target_project_id, target_instance_id, request)
            .await
    }

    /// Finds the most recent successful backup on the source and restores it
    /// onto the target. Fails with `NoEligibleBackup` when the source has no
    /// successful runs; if listing fails, no restore request is issued.
    pub async fn restore_latest_backup(
        &self,
        source_project_id: &str,
        source_instance_id: &str,
        target_project_id: &str,
        target_instance_id: &str,
    ) -> Result<Operation> {
        let backups = self
            .list_backups(source_project_id, source_instance_id)
            .await?;
        let latest = latest_successful(&backups).ok_or(RestoreError::NoEligibleBackup)?;
        let backup_run_id = latest.id.clone();
        self.restore_backup(
            source_project_id,
            source_instance_id,
            target_project_id,
            target_instance_id,
            &backup_run_id,
        )
        .await
    }

    /// Lists operations for a project, optionally filtered by instance.
    /// `max_results` defaults to `DEFAULT_MAX_RESULTS`.
    pub async fn list_operations(
        &self,
        project_id: &str,
        instance_id: Option<&str>,
        max_results: Option<u32>,
    ) -> Result<Vec<Operation>> {
        self.api
            .list_operations(
                project_id,
                instance_id,
                max_results.unwrap_or(DEFAULT_MAX_RESULTS),
            )
            .await
    }

    /// Re-fetches an operation via its canonical URL. A single point-in-time
    /// check: if the refreshed resource reports errors this fails with the
    /// first error's message and the full list attached; otherwise the
    /// refreshed operation is returned unchanged. Polling loops belong to
    /// the caller.
    pub async fn check_operation_status(&self, operation: &Operation) -> Result<Operation> {
        self.check_operation_url(&operation.self_link).await
    }

    /// Same as `check_operation_status`, for callers that only kept the
    /// operation's canonical URL.
    pub async fn check_operation_url(&self, self_link: &str) -> Result<Operation> {
        let refreshed = self.api.get_operation(self_link).await?;
        let entries = refreshed.error_entries();
        if let Some(first) = entries.first() {
            return Err(RestoreError::OperationFailed {
                message: first.message.clone(),
                errors: entries.to_vec(),
            });
        }
        Ok(refreshed)
    }
}

/// Selects the successful backup run with the greatest start time. Runs in
/// any other status are ignored, even when newer. On a start-time tie the
/// last of the tied entries wins.
pub fn latest_successful(backups: &[BackupRun]) -> Option<&BackupRun> {
    backups
        .iter()
        .filter(|b| b.status == BackupRunStatus::Successful)
        .max_by_key(|b| b.start_time)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(id: &str, start_time: &str, status: BackupRunStatus) -> BackupRun {
        BackupRun {
            id: id.to_string(),
            status,
            start_time: Some(start_time.parse().unwrap()),
            end_time: None,
            backup_type: None,
            instance: None,
            description: None,
            kind: None,
        }
    }

    #[test]
    fn picks_newest_successful_run() {
        let backups = vec![
            run("1", "2020-07-27T14:35:27.206Z", BackupRunStatus::Successful),
            run("2", "2020-07-28T14:35:27.206Z", BackupRunStatus::Successful),
            run("3", "2020-07-26T14:35:27.206Z", BackupRunStatus::Successful),
        ];
        assert_eq!(latest_successful(&backups).unwrap().id, "2");
    }

    #[test]
    fn ignores_newer_failed_run() {
        let backups = vec![
            run("1", "2020-07-27T14:35:27.206Z", BackupRunStatus::Successful),
            run("2", "2020-07-28T14:35:27.206Z", BackupRunStatus::Successful),
            run("3", "2020-07-26T14:35:27.206Z", BackupRunStatus::Successful),
            run("4", "2020-07-29T14:35:27.206Z", BackupRunStatus::Failed),
        ];
        assert_eq!(latest_successful(&backups).unwrap().id, "2");
    }

    #[test]
    fn no_successful_runs_yields_none() {
        let backups = vec![
            run("1", "2020-07-27T14:35:27.206Z", BackupRunStatus::Failed),
            run("2", "2020-07-28T14:35:27.206Z", BackupRunStatus::Enqueued),
        ];
        assert!(latest_successful(&backups).is_none());
        assert!(latest_successful(&[]).is_none());
    }

    #[test]
    fn run_without_start_time_loses_to_dated_runs() {
        let mut undated = run("1", "2020-07-27T14:35:27.206Z", BackupRunStatus::Successful);
        undated.start_time = None;
        let backups = vec![
            undated,
            run("2", "2020-07-26T14:35:27.206Z", BackupRunStatus::Successful),
        ];
        assert_eq!(latest_successful(&backups).unwrap().id, "2");
    }
}
