use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

/// Work item types requested from the remote tracker. Matching is a WIQL
/// CONTAINS, so compound remote names ("Product Backlog Item") qualify.
const ALLOWED_REMOTE_KINDS: [&str; 4] = ["Backlog", "Feature", "Bug", "Task"];

const WIQL_API_VERSION: &str = "7.1";
const WORK_ITEM_BATCH_SIZE: usize = 200;

#[derive(Debug, Clone, Error)]
pub enum RemoteSourceError {
    #[error("Remote source authentication failed")]
    Auth,
    #[error("Remote source timed out")]
    Timeout,
    #[error("Remote source transport error: {0}")]
    Transport(String),
    #[error("Remote source returned http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Malformed remote payload: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for RemoteSourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteSourceError::Timeout
        } else {
            RemoteSourceError::Transport(err.to_string())
        }
    }
}

/// A work item as reported by the external tracker, before any local
/// mapping. All fields except the id are optional; the reconciler decides
/// what an incomplete record means.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteWorkItem {
    pub id: String,
    pub title: Option<String>,
    pub state: Option<String>,
    pub assignee: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub estimated_hours: Option<f64>,
    pub completed_hours: Option<f64>,
    pub kind: Option<String>,
}

/// Server-side filter compiled into the remote query language.
#[derive(Debug, Clone)]
pub struct WiqlFilter {
    pub project: String,
    pub assignee: String,
}

impl WiqlFilter {
    /// Builds the WIQL query with every caller-provided value passed
    /// through literal escaping. String concatenation of raw identity
    /// values is an injection vector into the remote query language.
    pub fn to_query(&self) -> String {
        let kinds = ALLOWED_REMOTE_KINDS
            .iter()
            .map(|kind| format!("[System.WorkItemType] CONTAINS '{}'", wiql_literal(kind)))
            .collect::<Vec<_>>()
            .join(" OR ");

        format!(
            "SELECT [System.Id], [System.Title], [System.State], [System.AssignedTo], \
             [Microsoft.VSTS.Scheduling.StartDate], [Microsoft.VSTS.Scheduling.FinishDate], \
             [Microsoft.VSTS.Scheduling.OriginalEstimate], [Microsoft.VSTS.Scheduling.CompletedWork] \
             FROM WorkItems \
             WHERE [System.TeamProject] = '{}' \
             AND [System.AssignedTo] = '{}' \
             AND ({})",
            wiql_literal(&self.project),
            wiql_literal(&self.assignee),
            kinds
        )
    }
}

/// Escapes a string for use as a WIQL literal: quotes are doubled and
/// control characters dropped.
fn wiql_literal(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_control())
        .flat_map(|c| {
            if c == '\'' {
                vec!['\'', '\'']
            } else {
                vec![c]
            }
        })
        .collect()
}

#[async_trait]
pub trait WorkItemSource: Send + Sync {
    async fn fetch_assigned(
        &self,
        filter: &WiqlFilter,
    ) -> Result<Vec<RemoteWorkItem>, RemoteSourceError>;
}

/// Azure DevOps Boards client. One WIQL round trip for the matching ids,
/// then chunked detail fetches. The shared reqwest client carries a hard
/// request timeout so a stuck remote cannot block a sync indefinitely.
#[derive(Clone)]
pub struct AzureBoardsClient {
    http: reqwest::Client,
    organization_url: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct WiqlResponse {
    #[serde(default, rename = "workItems")]
    work_items: Vec<WiqlWorkItemRef>,
}

#[derive(Debug, Deserialize)]
struct WiqlWorkItemRef {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct WorkItemsBatch {
    #[serde(default)]
    value: Vec<RawWorkItem>,
}

#[derive(Debug, Deserialize)]
struct RawWorkItem {
    id: i64,
    #[serde(default)]
    fields: serde_json::Map<String, serde_json::Value>,
}

impl AzureBoardsClient {
    pub fn new(http: reqwest::Client, organization_url: &str, access_token: &str) -> Self {
        Self {
            http,
            organization_url: organization_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        }
    }

    async fn query_ids(&self, filter: &WiqlFilter) -> Result<Vec<i64>, RemoteSourceError> {
        let url = format!(
            "{}/_apis/wit/wiql?api-version={}",
            self.organization_url, WIQL_API_VERSION
        );
        let body = serde_json::json!({ "query": filter.to_query() });

        let response = self
            .http
            .post(&url)
            .basic_auth("", Some(&self.access_token))
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;

        let parsed: WiqlResponse = response
            .json()
            .await
            .map_err(|err| RemoteSourceError::Malformed(err.to_string()))?;
        Ok(parsed.work_items.into_iter().map(|item| item.id).collect())
    }

    async fn fetch_details(&self, ids: &[i64]) -> Result<Vec<RemoteWorkItem>, RemoteSourceError> {
        let mut items = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(WORK_ITEM_BATCH_SIZE) {
            let joined = chunk
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(",");
            let url = format!(
                "{}/_apis/wit/workitems?ids={}&$expand=all&api-version={}",
                self.organization_url, joined, WIQL_API_VERSION
            );

            let response = self
                .http
                .get(&url)
                .basic_auth("", Some(&self.access_token))
                .send()
                .await?;
            let response = check_status(response).await?;

            let batch: WorkItemsBatch = response
                .json()
                .await
                .map_err(|err| RemoteSourceError::Malformed(err.to_string()))?;
            items.extend(batch.value.into_iter().map(parse_remote_item));
        }
        Ok(items)
    }
}

#[async_trait]
impl WorkItemSource for AzureBoardsClient {
    async fn fetch_assigned(
        &self,
        filter: &WiqlFilter,
    ) -> Result<Vec<RemoteWorkItem>, RemoteSourceError> {
        let ids = self.query_ids(filter).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch_details(&ids).await
    }
}

async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, RemoteSourceError> {
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(RemoteSourceError::Auth);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RemoteSourceError::Http {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

fn parse_remote_item(raw: RawWorkItem) -> RemoteWorkItem {
    let fields = &raw.fields;
    RemoteWorkItem {
        id: raw.id.to_string(),
        title: field_str(fields, "System.Title"),
        state: field_str(fields, "System.State"),
        assignee: field_assignee(fields),
        start_date: field_date(fields, "Microsoft.VSTS.Scheduling.StartDate"),
        end_date: field_date(fields, "Microsoft.VSTS.Scheduling.FinishDate"),
        estimated_hours: field_f64(fields, "Microsoft.VSTS.Scheduling.OriginalEstimate"),
        completed_hours: field_f64(fields, "Microsoft.VSTS.Scheduling.CompletedWork"),
        kind: field_str(fields, "System.WorkItemType"),
    }
}

fn field_str(
    fields: &serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Option<String> {
    fields
        .get(key)
        .and_then(|value| value.as_str())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn field_f64(fields: &serde_json::Map<String, serde_json::Value>, key: &str) -> Option<f64> {
    match fields.get(key) {
        Some(serde_json::Value::Number(number)) => number.as_f64(),
        Some(serde_json::Value::String(raw)) => raw.trim().parse().ok(),
        _ => None,
    }
}

fn field_date(
    fields: &serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Option<NaiveDate> {
    let raw = fields.get(key)?.as_str()?.trim();
    if let Ok(datetime) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.date_naive());
    }
    NaiveDate::parse_from_str(raw.get(..10).unwrap_or(raw), "%Y-%m-%d").ok()
}

/// The assignee arrives as an identity object in recent API versions and as
/// a bare display string in older ones.
fn field_assignee(fields: &serde_json::Map<String, serde_json::Value>) -> Option<String> {
    match fields.get("System.AssignedTo") {
        Some(serde_json::Value::Object(identity)) => identity
            .get("uniqueName")
            .and_then(|value| value.as_str())
            .map(str::to_string),
        Some(serde_json::Value::String(raw)) if !raw.trim().is_empty() => {
            Some(raw.trim().to_string())
        }
        _ => None,
    }
}
