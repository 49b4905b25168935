use crate::Match;
use crate::sheet::{SheetError, parse_scoring_sheet};
use crate::sheets::{ValueRange, cell_to_string};
use log::{debug, warn};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_SHEETS_URL: &str = "https://sheets.googleapis.com";

/// Cell block read from every scoring sheet.
const SHEET_RANGE: &str = "A1:Z1000";

/// Where scoring sheets are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetsConfig {
    pub base_url: String,
    pub spreadsheet_id: String,
    pub api_key: String,
    /// When set, sheets are read from `{dir}/{sheet}.json` instead of HTTP.
    pub local_dir: Option<PathBuf>,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SHEETS_URL.to_string(),
            spreadsheet_id: String::new(),
            api_key: String::new(),
            local_dir: None,
        }
    }
}

impl SheetsConfig {
    /// True when there is somewhere to read sheets from at all.
    pub fn is_configured(&self) -> bool {
        self.local_dir.is_some() || !self.spreadsheet_id.is_empty()
    }
}

/// Scoring-sheet client backed by the Google Sheets values API.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    client: Client,
    config: SheetsConfig,
    timeout: Duration,
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    NotFound(String),
    Sheet(SheetError),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, what) => write!(f, "Network error for {what}: {e}"),
            ApiError::Api(e, what) => write!(f, "API error for {what}: {e}"),
            ApiError::Parsing(e, what) => write!(f, "Parse error for {what}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Sheet(e) => write!(f, "{e}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<SheetError> for ApiError {
    fn from(e: SheetError) -> Self {
        ApiError::Sheet(e)
    }
}

/// Offline sheet files may hold either bare rows or a saved API response.
#[derive(Deserialize)]
#[serde(untagged)]
enum LocalSheet {
    Rows(Vec<Vec<serde_json::Value>>),
    Range(ValueRange),
}

impl SheetsClient {
    pub fn new(config: SheetsConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent("bracket-tui/0.1 (terminal bracket viewer)")
                .build()
                .unwrap_or_default(),
            config,
            timeout: Duration::from_secs(10),
        }
    }

    /// Fetch a sheet and parse it into matches.
    pub async fn fetch_matches(&self, sheet: &str) -> ApiResult<Vec<Match>> {
        let rows = self.fetch_rows(sheet).await?;
        let matches = parse_scoring_sheet(&rows)?;
        debug!("parsed {} matches from \"{sheet}\"", matches.len());
        Ok(matches)
    }

    /// Raw rows of `sheet`, cells stringified. Errors never carry the request
    /// url since it holds the api key.
    ///
    /// A sheet the key isn't allowed to read comes back as no rows rather than
    /// an error, so a locked round just shows as empty.
    pub async fn fetch_rows(&self, sheet: &str) -> ApiResult<Vec<Vec<String>>> {
        if let Some(dir) = &self.config.local_dir {
            return read_local_sheet(dir.join(format!("{sheet}.json")));
        }

        let url = self.values_url(sheet)?;
        let what = format!("sheet \"{sheet}\"");
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.without_url(), what.clone()))?;

        if response.status() == StatusCode::FORBIDDEN {
            warn!("permission denied for {what}, treating it as empty");
            return Ok(Vec::new());
        }

        match response.error_for_status() {
            Ok(res) => res
                .json::<ValueRange>()
                .await
                .map(ValueRange::into_rows)
                .map_err(|e| ApiError::Parsing(e.without_url(), what)),
            Err(e) if e.status() == Some(StatusCode::NOT_FOUND) => Err(ApiError::NotFound(what)),
            Err(e) => Err(ApiError::Api(e.without_url(), what)),
        }
    }

    fn values_url(&self, sheet: &str) -> ApiResult<Url> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| ApiError::Other(format!("invalid sheets url {}: {e}", self.config.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Other(format!("sheets url can't take a path: {}", self.config.base_url)))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.config.spreadsheet_id.as_str(), "values"])
            .push(&format!("{sheet}!{SHEET_RANGE}"));
        if !self.config.api_key.is_empty() {
            url.query_pairs_mut().append_pair("key", &self.config.api_key);
        }
        Ok(url)
    }
}

fn read_local_sheet(path: PathBuf) -> ApiResult<Vec<Vec<String>>> {
    let shown = path.display().to_string();
    let content = std::fs::read_to_string(&path)
        .map_err(|e| ApiError::NotFound(format!("could not read {shown}: {e}")))?;
    let sheet: LocalSheet = serde_json::from_str(&content)
        .map_err(|e| ApiError::Other(format!("invalid sheet json at {shown}: {e}")))?;
    Ok(match sheet {
        LocalSheet::Rows(rows) => rows
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect(),
        LocalSheet::Range(range) => range.into_rows(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatchStatus;
    use mockito::{Matcher, Server};

    const SHEET_JSON: &str = r#"{
        "range": "'Round 1'!A1:Z1000",
        "majorDimension": "ROWS",
        "values": [
            ["Round 1"],
            ["Arena", "Team 1 Number", "Team 1 Name", "Team 2 Number", "Team 2 Name", "Scoring 1", "Scoring 2"],
            ["1", "101", "Robo Rangers", "202", "Gear Heads", 1, 0],
            ["2", "103", "Bolt Bots"]
        ]
    }"#;

    fn config(base_url: String) -> SheetsConfig {
        SheetsConfig {
            base_url,
            spreadsheet_id: "sheet-id".into(),
            api_key: "k".into(),
            local_dir: None,
        }
    }

    #[test]
    fn values_url_encodes_sheet_name() {
        let client = SheetsClient::new(config("https://example.test/".into()));
        let url = client.values_url("Ali's 32").unwrap();
        assert_eq!(url.path(), "/v4/spreadsheets/sheet-id/values/Ali's%2032!A1:Z1000");
        assert_eq!(url.query(), Some("key=k"));
    }

    #[test]
    fn configured_needs_a_source() {
        assert!(!SheetsConfig::default().is_configured());
        let local = SheetsConfig { local_dir: Some(PathBuf::from("/tmp")), ..Default::default() };
        assert!(local.is_configured());
    }

    #[tokio::test]
    async fn fetches_and_parses_matches() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Regex(r"^/v4/spreadsheets/sheet-id/values/Round.*A1:Z1000".into()))
            .match_query(Matcher::UrlEncoded("key".into(), "k".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(SHEET_JSON)
            .create_async()
            .await;

        let client = SheetsClient::new(config(server.url()));
        let matches = client.fetch_matches("Round 1").await.unwrap();
        mock.assert_async().await;

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].status, MatchStatus::Completed);
        assert_eq!(matches[0].winner.as_deref(), Some("101"));
        assert_eq!(matches[1].team2_number, crate::TBP);
        assert_eq!(matches[1].status, MatchStatus::NotStarted);
    }

    #[tokio::test]
    async fn forbidden_sheet_reads_as_empty() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error": {"code": 403}}"#)
            .create_async()
            .await;

        let client = SheetsClient::new(config(server.url()));
        assert!(client.fetch_rows("Locked").await.unwrap().is_empty());
        assert!(client.fetch_matches("Locked").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_sheet_is_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server.mock("GET", Matcher::Any).with_status(404).create_async().await;

        let client = SheetsClient::new(config(server.url()));
        let err = client.fetch_rows("Nope").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)), "{err}");
    }

    #[tokio::test]
    async fn server_errors_surface() {
        let mut server = Server::new_async().await;
        let _mock = server.mock("GET", Matcher::Any).with_status(500).create_async().await;

        let client = SheetsClient::new(config(server.url()));
        let err = client.fetch_rows("Round 1").await.unwrap_err();
        assert!(matches!(err, ApiError::Api(_, _)), "{err}");
        assert!(!err.to_string().contains("key=k"));
    }

    #[tokio::test]
    async fn headerless_sheet_is_a_sheet_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", Matcher::Any)
            .with_status(200)
            .with_body(r#"{"values": [["Team", "Score"], ["1", "2"]]}"#)
            .create_async()
            .await;

        let client = SheetsClient::new(config(server.url()));
        let err = client.fetch_matches("Round 1").await.unwrap_err();
        assert!(matches!(err, ApiError::Sheet(SheetError::HeaderNotFound)));
        assert_eq!(err.to_string(), "Header row not found");
    }

    #[tokio::test]
    async fn reads_local_sheet_files() {
        let dir = std::env::temp_dir().join(format!("bracket-api-local-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("Round 1.json"), SHEET_JSON).unwrap();
        std::fs::write(dir.join("Bare.json"), r#"[["Arena", "Team 1 Number"], ["3", 7]]"#).unwrap();

        let client = SheetsClient::new(SheetsConfig { local_dir: Some(dir.clone()), ..Default::default() });
        assert_eq!(client.fetch_matches("Round 1").await.unwrap().len(), 2);
        assert_eq!(client.fetch_rows("Bare").await.unwrap()[1], vec!["3", "7"]);
        assert!(matches!(client.fetch_rows("Missing").await, Err(ApiError::NotFound(_))));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
