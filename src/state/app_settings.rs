use bracket_api::client::{DEFAULT_SHEETS_URL, SheetsConfig};
use bracket_api::progress::BracketRound;
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_POLL_SECS: u64 = 10;

/// Sheet (tab) names inside the scoring spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetNames {
    pub round_of_32: String,
    pub round_of_16: String,
    pub quarter_finals: String,
    pub grid: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            round_of_32: "Ali's 32".to_string(),
            round_of_16: "Ali's 16".to_string(),
            quarter_finals: "Ali's 8".to_string(),
            grid: "Ali's 128".to_string(),
        }
    }
}

impl SheetNames {
    pub fn for_round(&self, round: BracketRound) -> &str {
        match round {
            BracketRound::RoundOf32 => &self.round_of_32,
            BracketRound::RoundOf16 => &self.round_of_16,
            BracketRound::QuarterFinals => &self.quarter_finals,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub sheets: SheetsConfig,
    pub sheet_names: SheetNames,
    pub poll_interval: Duration,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: None,
            sheets: SheetsConfig::default(),
            sheet_names: SheetNames::default(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECS),
        }
    }
}

impl AppSettings {
    /// Read settings from `BRACKET_*` environment variables.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = SheetNames::default();

        let poll_secs = get("BRACKET_POLL_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_POLL_SECS);

        Self {
            full_screen: false,
            log_level: get("BRACKET_LOG").and_then(|v| v.parse::<LevelFilter>().ok()),
            sheets: SheetsConfig {
                base_url: get("BRACKET_SHEETS_URL").unwrap_or_else(|| DEFAULT_SHEETS_URL.to_string()),
                spreadsheet_id: get("BRACKET_SPREADSHEET_ID").unwrap_or_default(),
                api_key: get("BRACKET_SHEETS_API_KEY").unwrap_or_default(),
                local_dir: get("BRACKET_SHEETS_DIR").map(PathBuf::from),
            },
            sheet_names: SheetNames {
                round_of_32: get("BRACKET_SHEET_32").unwrap_or(defaults.round_of_32),
                round_of_16: get("BRACKET_SHEET_16").unwrap_or(defaults.round_of_16),
                quarter_finals: get("BRACKET_SHEET_8").unwrap_or(defaults.quarter_finals),
                grid: get("BRACKET_SHEET_128").unwrap_or(defaults.grid),
            },
            poll_interval: Duration::from_secs(poll_secs),
        }
    }
}
