//! Google Sheets v4 REST client: token lists in, measurement rows out.

use crate::{column::column_index_to_letter, IntegrationError, ResultSink, Secrets, TokenSource};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use gcp_auth::{CustomServiceAccount, TokenProvider};
use meta_model::TokenList;
use reqwest::{header, Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};
use url::Url;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets/";
const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const SCOPES: &[&str] = &["https://www.googleapis.com/auth/spreadsheets"];

pub const CLIENT_EMAIL_KEY: &str = "GOOGLE_APIS_CLIENT_EMAIL";
pub const PRIVATE_KEY_KEY: &str = "GOOGLE_APIS_PRIVATE_KEY";
pub const SHEET_ID_KEY: &str = "GOOGLE_APIS_SHEET_ID";

fn default_token_sheet() -> String {
    "Token addresses".to_string()
}

fn default_result_sheet_suffix() -> String {
    " exchange".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SheetsConfig {
    #[serde(default = "default_token_sheet")]
    pub token_sheet: String,
    /// Appended to the network name to get its result sheet (`Polygon exchange`).
    #[serde(default = "default_result_sheet_suffix")]
    pub result_sheet_suffix: String,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        SheetsConfig {
            token_sheet: default_token_sheet(),
            result_sheet_suffix: default_result_sheet_suffix(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

pub struct GoogleSheets {
    client: Client,
    auth: CustomServiceAccount,
    sheet_id: String,
    config: SheetsConfig,
}

impl GoogleSheets {
    pub fn from_secrets(secrets: &Secrets, config: SheetsConfig) -> Result<Self, IntegrationError> {
        let client_email = secrets.require(CLIENT_EMAIL_KEY)?;
        let private_key = decode_private_key(&secrets.require(PRIVATE_KEY_KEY)?)?;
        let sheet_id = secrets.require(SHEET_ID_KEY)?;

        let credentials = json!({
            "type": "service_account",
            "client_email": client_email,
            "private_key": private_key,
            "token_uri": TOKEN_URI,
        });
        let auth = CustomServiceAccount::from_json(&credentials.to_string())?;

        let mut default_header = header::HeaderMap::new();
        default_header.insert("Content-Type", header::HeaderValue::from_static("application/json"));
        let client = reqwest::ClientBuilder::new().default_headers(default_header).build()?;

        Ok(GoogleSheets { client, auth, sheet_id, config })
    }

    async fn bearer(&self) -> Result<String, IntegrationError> {
        let token = self.auth.token(SCOPES).await?;
        Ok(format!("Bearer {}", token.as_str()))
    }

    /// All non-empty rows of one column of a sheet, first cell of each row.
    pub async fn read_column(&self, sheet: &str, letter: &str) -> Result<Vec<String>, IntegrationError> {
        let url = values_url(&self.sheet_id, &format!("'{}'!{}:{}", sheet, letter, letter), None)?;
        let response = self
            .client
            .get(url)
            .header(header::AUTHORIZATION, self.bearer().await?)
            .send()
            .await?;
        let range: ValueRange = check_status(response).await?.json().await?;
        Ok(range.values.into_iter().map(|row| row.into_iter().next().map_or_else(String::new, cell_text)).collect())
    }
}

#[async_trait]
impl TokenSource for GoogleSheets {
    /// Column pairs of the token sheet, left to right, until the first blank header.
    async fn token_lists(&self) -> Result<Vec<TokenList>, IntegrationError> {
        let mut lists = Vec::new();
        for i in 0.. {
            let letter = column_index_to_letter(i * 2);
            let column = self.read_column(&self.config.token_sheet, &letter).await?;
            match parse_token_column(column) {
                Some(list) => {
                    debug!("column {}: {} with {} tokens", letter, list.network, list.tokens.len());
                    lists.push(list);
                }
                None => break,
            }
        }
        info!("loaded token lists for {} networks", lists.len());
        Ok(lists)
    }
}

#[async_trait]
impl ResultSink for GoogleSheets {
    async fn append_rows(&self, network: &str, rows: Vec<Vec<Value>>) -> Result<(), IntegrationError> {
        let range = format!("'{}{}'!A1", network, self.config.result_sheet_suffix);
        let mut url = values_url(&self.sheet_id, &range, Some("append"))?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        let n = rows.len();
        let response = self
            .client
            .post(url)
            .header(header::AUTHORIZATION, self.bearer().await?)
            .json(&json!({ "values": rows }))
            .send()
            .await?;
        check_status(response).await?;
        info!("appended {} rows to {}", n, range);
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response, IntegrationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(IntegrationError::Api { status: status.as_u16(), body })
}

/// `values/{range}` endpoint, optionally with a custom method such as `:append`.
fn values_url(sheet_id: &str, range: &str, method: Option<&str>) -> Result<Url, IntegrationError> {
    let mut url = Url::parse(SHEETS_API)?;
    let last = match method {
        Some(method) => format!("{}:{}", range, method),
        None => range.to_string(),
    };
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend([sheet_id, "values", last.as_str()]);
    Ok(url)
}

fn cell_text(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Header cell names the network, the non-blank cells below are token addresses.
pub fn parse_token_column(column: Vec<String>) -> Option<TokenList> {
    let mut cells = column.into_iter();
    let network = cells.next()?.trim().to_string();
    if network.is_empty() {
        return None;
    }
    let tokens = cells.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()).collect();
    Some(TokenList { network, tokens })
}

/// The key is stored base64 encoded; a raw PEM is accepted as is.
fn decode_private_key(encoded: &str) -> Result<String, IntegrationError> {
    let encoded = encoded.trim();
    if encoded.starts_with("-----BEGIN") {
        return Ok(encoded.to_string());
    }
    let bytes = STANDARD.decode(encoded).map_err(|e| IntegrationError::PrivateKey(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| IntegrationError::PrivateKey(e.to_string()))
}
