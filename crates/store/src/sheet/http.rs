//! Values-style spreadsheet REST backend.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use leadboard_shared::config::SheetsAuth;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tracing::instrument;

use super::token::TokenSource;
use super::{Row, SheetError, TabularStore};

/// Longest response body kept in a `SheetError::Status`.
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

/// Spreadsheet reached over HTTP.
#[derive(Debug)]
pub struct HttpSheetStore {
    client: reqwest::Client,
    base_url: Url,
    spreadsheet_id: String,
    tokens: TokenSource,
    sheet_ids: RwLock<HashMap<String, i64>>,
}

/// Converts a 1-based column number to its letter (1 → A, 27 → AA).
fn column_letter(mut col: usize) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push(b'A' + u8::try_from(rem).unwrap_or(0));
        col = (col - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// A1 reference to a whole tab, quoted so titles may contain spaces.
fn tab_range(tab: &str) -> String {
    format!("'{}'", tab.replace('\'', "''"))
}

/// A1 reference to one row, `width` columns wide.
fn row_range(tab: &str, index: usize, width: usize) -> String {
    let line = index + 1;
    format!(
        "{}!A{line}:{}{line}",
        tab_range(tab),
        column_letter(width.max(1))
    )
}

fn cell_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl HttpSheetStore {
    /// Creates a store for one spreadsheet document.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or credentials are invalid.
    pub fn new(
        base_url: &str,
        spreadsheet_id: &str,
        auth: &SheetsAuth,
        timeout: Duration,
    ) -> Result<Self, SheetError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| SheetError::Http(format!("invalid base url {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(SheetError::Http(format!("invalid base url {base_url}")));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SheetError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            spreadsheet_id: spreadsheet_id.to_string(),
            tokens: TokenSource::from_config(auth)?,
            sheet_ids: RwLock::new(HashMap::new()),
        })
    }

    /// Builds `{base}/spreadsheets/{id}/{segments...}`.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .push("spreadsheets")
                .push(&self.spreadsheet_id)
                .extend(segments);
        }
        url
    }

    /// Values endpoint for a range, with an optional `:verb` suffix.
    fn values_url(&self, range: &str, verb: Option<&str>) -> Url {
        let segment = verb.map_or_else(|| range.to_string(), |v| format!("{range}:{v}"));
        self.url(&["values", &segment])
    }

    async fn request(&self, method: Method, url: Url) -> Result<RequestBuilder, SheetError> {
        let token = self.tokens.access_token(&self.client).await?;
        Ok(self.client.request(method, url).bearer_auth(token))
    }

    async fn send(builder: RequestBuilder) -> Result<Response, SheetError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Err(SheetError::Status {
            status: status.as_u16(),
            body,
        })
    }

    /// Resolves a tab title to the numeric sheet id row deletion needs.
    async fn sheet_id(&self, tab: &str) -> Result<i64, SheetError> {
        if let Some(id) = self.sheet_ids.read().await.get(tab) {
            return Ok(*id);
        }

        let mut url = self.url(&[]);
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties(sheetId,title)");
        let meta: SpreadsheetMeta = Self::send(self.request(Method::GET, url).await?)
            .await?
            .json()
            .await?;

        let mut ids = self.sheet_ids.write().await;
        ids.clear();
        ids.extend(
            meta.sheets
                .into_iter()
                .map(|s| (s.properties.title, s.properties.sheet_id)),
        );
        ids.get(tab)
            .copied()
            .ok_or_else(|| SheetError::UnknownTab(tab.to_string()))
    }
}

#[async_trait]
impl TabularStore for HttpSheetStore {
    fn backend_tag(&self) -> &'static str {
        "http"
    }

    #[instrument(skip(self), fields(backend = "http"))]
    async fn read_rows(&self, tab: &str) -> Result<Vec<Row>, SheetError> {
        let url = self.values_url(&tab_range(tab), None);
        let range: ValueRange = Self::send(self.request(Method::GET, url).await?)
            .await?
            .json()
            .await?;

        Ok(range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    #[instrument(skip(self, rows), fields(backend = "http", count = rows.len()))]
    async fn append_rows(&self, tab: &str, rows: Vec<Row>) -> Result<(), SheetError> {
        let url = self.values_url(&format!("{}!A1", tab_range(tab)), Some("append"));
        let builder = self
            .request(Method::POST, url)
            .await?
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "values": rows }));
        Self::send(builder).await?;
        Ok(())
    }

    #[instrument(skip(self, row), fields(backend = "http"))]
    async fn update_row(&self, tab: &str, index: usize, row: Row) -> Result<(), SheetError> {
        let range = row_range(tab, index, row.len());
        let url = self.values_url(&range, None);
        let builder = self
            .request(Method::PUT, url)
            .await?
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "range": range, "majorDimension": "ROWS", "values": [row] }));
        Self::send(builder).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(backend = "http"))]
    async fn delete_row(&self, tab: &str, index: usize) -> Result<(), SheetError> {
        let sheet_id = self.sheet_id(tab).await?;
        let mut url = self.url(&[]);
        // batchUpdate hangs off the document id itself: `{id}:batchUpdate`.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop()
                .push(&format!("{}:batchUpdate", self.spreadsheet_id));
        }
        let builder = self.request(Method::POST, url).await?.json(&json!({
            "requests": [{
                "deleteDimension": {
                    "range": {
                        "sheetId": sheet_id,
                        "dimension": "ROWS",
                        "startIndex": index,
                        "endIndex": index + 1,
                    }
                }
            }]
        }));
        Self::send(builder).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> HttpSheetStore {
        HttpSheetStore::new(
            "https://sheets.example.com/v4/",
            "doc-1",
            &SheetsAuth::Bearer {
                token: "t".into(),
            },
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(8), "H");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
        assert_eq!(column_letter(52), "AZ");
        assert_eq!(column_letter(703), "AAA");
    }

    #[test]
    fn test_ranges() {
        assert_eq!(tab_range("Credentials"), "'Credentials'");
        assert_eq!(tab_range("Bob's leads"), "'Bob''s leads'");
        assert_eq!(row_range("Withdrawals", 0, 10), "'Withdrawals'!A1:J1");
        assert_eq!(row_range("T", 4, 0), "'T'!A5:A5");
    }

    #[test]
    fn test_urls() {
        let store = store();

        let url = store.values_url(&tab_range("Utm Summary"), None);
        assert_eq!(
            url.as_str(),
            "https://sheets.example.com/v4/spreadsheets/doc-1/values/'Utm%20Summary'"
        );

        let url = store.values_url("'T'!A1", Some("append"));
        assert!(url.as_str().ends_with("/values/'T'!A1:append"));
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(json!("x")), "x");
        assert_eq!(cell_to_string(json!(12)), "12");
        assert_eq!(cell_to_string(json!(true)), "true");
        assert_eq!(cell_to_string(Value::Null), "");
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let result = HttpSheetStore::new(
            "not a url",
            "doc",
            &SheetsAuth::Bearer { token: "t".into() },
            Duration::from_secs(1),
        );
        assert!(matches!(result, Err(SheetError::Http(_))));
    }
}
