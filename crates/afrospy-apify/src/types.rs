use serde::{Deserialize, Serialize};

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Input for the Facebook Ad Library scraper actor.
#[derive(Debug, Clone, Serialize)]
pub struct AdLibraryInput {
    pub urls: Vec<StartUrl>,
    #[serde(rename = "resultsLimit")]
    pub results_limit: u32,
}

/// A start URL entry for actor input.
#[derive(Debug, Clone, Serialize)]
pub struct StartUrl {
    pub url: String,
}

/// Run metadata as returned by `acts/{id}/runs` and `actor-runs/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    pub id: String,
    #[serde(default)]
    pub status: RunStatus,
    #[serde(rename = "defaultDatasetId", default)]
    pub default_dataset_id: Option<String>,
}

/// Remote lifecycle status of an actor run.
///
/// Unknown strings are kept verbatim in [`RunStatus::Other`] and treated as
/// non-terminal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum RunStatus {
    Ready,
    #[default]
    Running,
    Succeeded,
    Failed,
    Aborting,
    Aborted,
    TimingOut,
    TimedOut,
    Other(String),
}

impl From<String> for RunStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "READY" => RunStatus::Ready,
            "RUNNING" => RunStatus::Running,
            "SUCCEEDED" => RunStatus::Succeeded,
            "FAILED" => RunStatus::Failed,
            "ABORTING" => RunStatus::Aborting,
            "ABORTED" => RunStatus::Aborted,
            "TIMING-OUT" => RunStatus::TimingOut,
            "TIMED-OUT" => RunStatus::TimedOut,
            _ => RunStatus::Other(raw),
        }
    }
}

impl RunStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Ready => "READY",
            RunStatus::Running => "RUNNING",
            RunStatus::Succeeded => "SUCCEEDED",
            RunStatus::Failed => "FAILED",
            RunStatus::Aborting => "ABORTING",
            RunStatus::Aborted => "ABORTED",
            RunStatus::TimingOut => "TIMING-OUT",
            RunStatus::TimedOut => "TIMED-OUT",
            RunStatus::Other(raw) => raw,
        }
    }

    /// `FAILED`, `ABORTED` and `TIMED-OUT`: the run is over and produced
    /// nothing usable.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            RunStatus::Failed | RunStatus::Aborted | RunStatus::TimedOut
        )
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        *self == RunStatus::Succeeded || self.is_failure()
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_data_parses_apify_envelope() {
        let body = r#"{"data":{"id":"run-1","status":"SUCCEEDED","defaultDatasetId":"ds-9","actId":"x"}}"#;
        let parsed: ApiResponse<RunData> = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.data.id, "run-1");
        assert_eq!(parsed.data.status, RunStatus::Succeeded);
        assert_eq!(parsed.data.default_dataset_id.as_deref(), Some("ds-9"));
    }

    #[test]
    fn run_data_tolerates_missing_fields() {
        let parsed: RunData = serde_json::from_str(r#"{"id":"run-2"}"#).unwrap();
        assert_eq!(parsed.status, RunStatus::Running);
        assert!(parsed.default_dataset_id.is_none());
    }

    #[test]
    fn unknown_status_is_kept_and_not_terminal() {
        let status = RunStatus::from("PAUSED".to_string());
        assert_eq!(status, RunStatus::Other("PAUSED".to_string()));
        assert_eq!(status.as_str(), "PAUSED");
        assert!(!status.is_terminal());
    }

    #[test]
    fn failure_statuses() {
        assert!(RunStatus::Failed.is_failure());
        assert!(RunStatus::Aborted.is_failure());
        assert!(RunStatus::TimedOut.is_failure());
        assert!(!RunStatus::TimingOut.is_failure());
        assert!(!RunStatus::Succeeded.is_failure());
        assert!(RunStatus::Succeeded.is_terminal());
    }

    #[test]
    fn input_serializes_with_camel_case_limit() {
        let input = AdLibraryInput {
            urls: vec![StartUrl {
                url: "https://example.com".to_string(),
            }],
            results_limit: 30,
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["resultsLimit"], 30);
        assert_eq!(json["urls"][0]["url"], "https://example.com");
    }
}
