use serde::Deserialize;

use crate::platform::types;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AzdoImportRequest {
    import_request_id: u64,
    #[serde(default)]
    status: String,
    detailed_status: Option<AzdoImportDetailedStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzdoImportDetailedStatus {
    error_message: Option<String>,
}

/// `GET _apis/projects` envelope, used only to check the connection.
#[derive(Debug, Deserialize)]
pub(super) struct AzdoProjectList {
    #[serde(default)]
    pub(super) count: usize,
}

fn map_import_status(status: &str) -> types::ImportStatus {
    match status {
        "notSet" => types::ImportStatus::NotSet,
        "queued" => types::ImportStatus::Queued,
        "inProgress" => types::ImportStatus::InProgress,
        "completed" => types::ImportStatus::Completed,
        "failed" => types::ImportStatus::Failed,
        "abandoned" => types::ImportStatus::Abandoned,
        other => types::ImportStatus::Other(other.to_string()),
    }
}

pub(super) fn map_import_request(request: AzdoImportRequest) -> types::ImportRequest {
    types::ImportRequest {
        import_request_id: request.import_request_id,
        status: map_import_status(&request.status),
        error_message: request
            .detailed_status
            .and_then(|d| d.error_message)
            .filter(|m| !m.is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_failed_import() {
        let request: AzdoImportRequest = serde_json::from_value(serde_json::json!({
            "importRequestId": 12,
            "status": "failed",
            "detailedStatus": {"currentStep": 1, "errorMessage": "TF401019: source not reachable"}
        }))
        .unwrap();

        let mapped = map_import_request(request);
        assert_eq!(mapped.import_request_id, 12);
        assert_eq!(mapped.status, types::ImportStatus::Failed);
        assert_eq!(
            mapped.error_message.as_deref(),
            Some("TF401019: source not reachable")
        );
    }

    #[test]
    fn test_map_import_statuses() {
        assert_eq!(map_import_status("inProgress"), types::ImportStatus::InProgress);
        assert_eq!(map_import_status("abandoned"), types::ImportStatus::Abandoned);
        assert_eq!(
            map_import_status("paused"),
            types::ImportStatus::Other("paused".to_string())
        );
    }
}
