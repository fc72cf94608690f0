//! Client for restoring Google Cloud SQL backups across projects.
//!
//! Authorizes with a service-account key file, lists backup runs for a
//! source instance, restores a chosen (or the latest successful) backup run
//! onto a target instance, and checks the resulting long-running operations.
//! Everything is a thin, typed layer over the `sql/v1beta4` REST API; retry,
//! polling loops, and timeouts are left to the caller.
//!
//! ```no_run
//! use cloud_sql_restore::SqlRestore;
//!
//! # async fn run() -> cloud_sql_restore::Result<()> {
//! let client = SqlRestore::authorize("service-account.json")?;
//! let operation = client
//!     .restore_latest_backup("source-project", "source-instance", "target-project", "target-instance")
//!     .await?;
//! let refreshed = client.check_operation_status(&operation).await?;
//! println!("{:?}", refreshed.status);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod error;
pub mod restore;
pub mod types;

pub use api::{SqlAdminApi, SqlAdminClient};
pub use auth::{ServiceAccountKey, TokenSource, CLOUD_PLATFORM_SCOPE};
pub use error::{RestoreError, Result};
pub use restore::{latest_successful, SqlRestore, DEFAULT_MAX_RESULTS};
pub use types::{
    BackupRun, BackupRunStatus, Operation, OperationError, OperationStatus,
    RestoreBackupContext, RestoreBackupRequest,
};
