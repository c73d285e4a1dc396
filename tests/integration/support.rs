//! Shared test collaborators

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use folio_feed::provider::{FetchError, MonthlyResponse, SeriesProvider, WeeklyResponse};

/// Provider replaying scripted JSON bodies per symbol, in order.
///
/// A `None` entry stands for a transport failure.
#[derive(Default)]
pub struct ScriptedProvider {
    scripts: Mutex<HashMap<String, VecDeque<Option<String>>>>,
}

impl ScriptedProvider {
    pub fn script(self, symbol: &str, bodies: Vec<Option<String>>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(symbol.to_string(), bodies.into());
        self
    }

    fn next(&self, symbol: &str) -> Result<String, FetchError> {
        let mut scripts = self.scripts.lock().unwrap();
        let queue = scripts
            .get_mut(symbol)
            .unwrap_or_else(|| panic!("no script for symbol {symbol}"));
        match queue.pop_front().expect("script exhausted") {
            Some(body) => Ok(body),
            None => Err(FetchError::Status {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: "scripted outage".to_string(),
            }),
        }
    }
}

#[async_trait]
impl SeriesProvider for ScriptedProvider {
    async fn monthly_adjusted(&self, symbol: &str) -> Result<MonthlyResponse, FetchError> {
        let body = self.next(symbol)?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn weekly_adjusted(&self, symbol: &str) -> Result<WeeklyResponse, FetchError> {
        let body = self.next(symbol)?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

/// Monthly body with `months` observations, one per month, ending 2024-06
pub fn monthly_body(symbol: &str, months: usize) -> Option<String> {
    let mut entries = Vec::new();
    let (mut year, mut month) = (2024_i32, 6_u32);
    for i in 0..months {
        entries.push(format!(
            r#""{year:04}-{month:02}-28": {{
                "1. open": "{i}", "2. high": "{i}", "3. low": "{i}", "4. close": "{i}",
                "5. adjusted close": "{i}", "6. volume": "10", "7. dividend amount": ""
            }}"#
        ));
        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
    }
    Some(format!(
        r#"{{
            "Meta Data": {{"2. Symbol": "{symbol}"}},
            "Monthly Adjusted Time Series": {{{}}}
        }}"#,
        entries.join(",")
    ))
}

/// Weekly body with `weeks` observations, one per Friday, ending 2024-06-28
pub fn weekly_body(symbol: &str, weeks: usize) -> Option<String> {
    let mut entries = Vec::new();
    let mut date = chrono::NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
    for i in 0..weeks {
        entries.push(format!(
            r#""{date}": {{
                "1. open": "{i}", "2. high": "{i}", "3. low": "{i}", "4. close": "{i}",
                "5. adjusted close": "{i}", "6. volume": "10", "7. dividend amount": ""
            }}"#
        ));
        date -= chrono::Duration::days(7);
    }
    Some(format!(
        r#"{{
            "Meta Data": {{"2. Symbol": "{symbol}"}},
            "Weekly Adjusted Time Series": {{{}}}
        }}"#,
        entries.join(",")
    ))
}

/// A rate-limit note body
pub fn note_body() -> Option<String> {
    Some(r#"{"Note": "API call frequency limit reached"}"#.to_string())
}

/// A fatal error-message body
pub fn error_body() -> Option<String> {
    Some(r#"{"Error Message": "Invalid API call"}"#.to_string())
}

pub fn symbols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
