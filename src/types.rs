use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Completion status of a backup run, as reported by the Cloud SQL Admin API.
///
/// Statuses this client does not recognise deserialize to `Unknown` rather
/// than failing the whole list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackupRunStatus {
    Enqueued,
    Overdue,
    Running,
    Failed,
    Successful,
    Skipped,
    DeletionPending,
    DeletionFailed,
    Deleted,
    #[serde(other)]
    Unknown,
}

/// A point-in-time snapshot of a Cloud SQL instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupRun {
    pub id: String,
    pub status: BackupRunStatus,
    #[serde(rename = "startTime", default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(rename = "endTime", default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub backup_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Status of a long-running Admin API operation. DONE is terminal; success
/// and failure are distinguished only by the presence of the error field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Pending,
    Running,
    Done,
    #[serde(other)]
    Unknown,
}

/// A long-running operation resource, returned by restoreBackup and by the
/// operations endpoints. Polled by re-fetching `self_link`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub status: OperationStatus,
    #[serde(rename = "selfLink")]
    pub self_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "operationType", default, skip_serializing_if = "Option::is_none")]
    pub operation_type: Option<String>,
    #[serde(rename = "targetProject", default, skip_serializing_if = "Option::is_none")]
    pub target_project: Option<String>,
    #[serde(rename = "targetId", default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(rename = "insertTime", default, skip_serializing_if = "Option::is_none")]
    pub insert_time: Option<DateTime<Utc>>,
    #[serde(rename = "startTime", default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(rename = "endTime", default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationErrors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Operation {
    /// Nested error entries, empty when the operation has reported none.
    pub fn error_entries(&self) -> &[OperationError] {
        self.error.as_ref().map_or(&[], |e| e.errors.as_slice())
    }
}

/// Error container attached to a failed operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationErrors {
    #[serde(default)]
    pub errors: Vec<OperationError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// A single nested operation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Body of a cross-project restoreBackup POST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreBackupRequest {
    #[serde(rename = "restoreBackupContext")]
    pub restore_backup_context: RestoreBackupContext,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreBackupContext {
    #[serde(rename = "backupRunId")]
    pub backup_run_id: String,
    /// Project owning the backup, which may differ from the target project.
    pub project: String,
    #[serde(rename = "instanceId")]
    pub instance_id: String,
}

/// Envelope of a backupRuns list response. Only the first page is consumed;
/// `next_page_token` is parsed but never followed.
#[derive(Debug, Deserialize)]
pub struct BackupRunsList {
    #[serde(default)]
    pub items: Vec<BackupRun>,
    #[serde(rename = "nextPageToken", default)]
    pub next_page_token: Option<String>,
}

/// Envelope of an operations list response.
#[derive(Debug, Deserialize)]
pub struct OperationsList {
    #[serde(default)]
    pub items: Vec<Operation>,
    #[serde(rename = "nextPageToken", default)]
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn restore_request_serializes_exact_wire_shape() {
        let request = RestoreBackupRequest {
            restore_backup_context: RestoreBackupContext {
                backup_run_id: "1".to_string(),
                project: "dummy-source-project".to_string(),
                instance_id: "dummy-source-instance".to_string(),
            },
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "restoreBackupContext": {
                    "backupRunId": "1",
                    "project": "dummy-source-project",
                    "instanceId": "dummy-source-instance",
                }
            })
        );
    }

    #[test]
    fn backup_run_parses_api_payload() {
        let list: BackupRunsList = serde_json::from_value(json!({
            "kind": "sql#backupRunsList",
            "items": [
                {
                    "kind": "sql#backupRun",
                    "id": "1593959727",
                    "status": "SUCCESSFUL",
                    "startTime": "2020-07-27T14:35:27.206Z",
                    "endTime": "2020-07-27T14:41:02.001Z",
                    "type": "AUTOMATED",
                    "instance": "dummy-source-instance"
                },
                {
                    "id": "1594046127",
                    "status": "FAILED",
                    "startTime": "2020-07-28T14:35:27.206Z"
                }
            ]
        }))
        .unwrap();

        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[0].id, "1593959727");
        assert_eq!(list.items[0].status, BackupRunStatus::Successful);
        assert_eq!(list.items[1].status, BackupRunStatus::Failed);
        assert!(list.items[0].start_time.unwrap() < list.items[1].start_time.unwrap());
        assert!(list.next_page_token.is_none());
    }

    #[test]
    fn backup_run_tolerates_unrecognised_status() {
        let run: BackupRun = serde_json::from_value(json!({
            "id": "7",
            "status": "SQL_BACKUP_RUN_STATUS_UNSPECIFIED"
        }))
        .unwrap();

        assert_eq!(run.status, BackupRunStatus::Unknown);
        assert!(run.start_time.is_none());
    }

    #[test]
    fn empty_list_response_parses_to_empty_items() {
        let list: BackupRunsList =
            serde_json::from_value(json!({ "kind": "sql#backupRunsList" })).unwrap();
        assert!(list.items.is_empty());
    }

    #[test]
    fn operation_parses_with_nested_errors() {
        let op: Operation = serde_json::from_value(json!({
            "kind": "sql#operation",
            "status": "DONE",
            "operationType": "RESTORE_VOLUME",
            "targetProject": "dummy-target-project",
            "selfLink": "https://www.googleapis.com/sql/v1beta4/projects/p/operations/op-1",
            "error": {
                "kind": "sql#operationErrors",
                "errors": [
                    {
                        "kind": "sql#operationError",
                        "code": "UNKNOWN",
                        "message": "Something bad happened, your backup was not restored"
                    }
                ]
            }
        }))
        .unwrap();

        assert_eq!(op.status, OperationStatus::Done);
        assert_eq!(op.error_entries().len(), 1);
        assert_eq!(
            op.error_entries()[0].message,
            "Something bad happened, your backup was not restored"
        );
    }

    #[test]
    fn operation_with_null_error_has_no_entries() {
        let op: Operation = serde_json::from_value(json!({
            "status": "RUNNING",
            "selfLink": "https://www.googleapis.com/sql/v1beta4/projects/p/operations/op-2",
            "error": null
        }))
        .unwrap();

        assert!(op.error.is_none());
        assert!(op.error_entries().is_empty());
    }
}
