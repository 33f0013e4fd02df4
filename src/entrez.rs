use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::config::EntrezSettings;
use crate::domain::Database;
use crate::error::MiningError;

/// Raw E-utilities transport. Each call returns the XML body as text.
pub trait EntrezClient {
    fn esearch(&self, db: Database, term: &str, retmax: usize) -> Result<String, MiningError>;
    fn efetch(&self, db: Database, id: &str) -> Result<String, MiningError>;
    fn esummary(&self, db: Database, id: &str) -> Result<String, MiningError>;
}

#[derive(Clone)]
pub struct EntrezHttpClient {
    client: Client,
    base_url: String,
    credentials: Vec<(&'static str, String)>,
}

impl EntrezHttpClient {
    pub fn new(settings: &EntrezSettings) -> Result<Self, MiningError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("leader-genes/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| MiningError::EntrezHttp(err.to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| MiningError::EntrezHttp(err.to_string()))?;

        let mut credentials = vec![("tool", settings.tool.clone())];
        if let Some(email) = &settings.email {
            credentials.push(("email", email.clone()));
        }
        if let Some(api_key) = &settings.api_key {
            credentials.push(("api_key", api_key.clone()));
        }

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            credentials,
        })
    }

    fn get(&self, utility: &str, params: &[(&str, &str)]) -> Result<String, MiningError> {
        let url = format!("{}/{utility}.fcgi", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&self.credentials)
            .send()
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "Entrez request failed".to_string());
            return Err(MiningError::EntrezStatus { status, message });
        }
        response.text().map_err(map_transport_error)
    }
}

impl EntrezClient for EntrezHttpClient {
    fn esearch(&self, db: Database, term: &str, retmax: usize) -> Result<String, MiningError> {
        let retmax = retmax.to_string();
        self.get(
            "esearch",
            &[("db", db.as_str()), ("term", term), ("retmax", &retmax)],
        )
    }

    fn efetch(&self, db: Database, id: &str) -> Result<String, MiningError> {
        self.get(
            "efetch",
            &[("db", db.as_str()), ("id", id), ("retmode", "xml")],
        )
    }

    fn esummary(&self, db: Database, id: &str) -> Result<String, MiningError> {
        self.get(
            "esummary",
            &[("db", db.as_str()), ("id", id), ("retmode", "xml")],
        )
    }
}

fn map_transport_error(err: reqwest::Error) -> MiningError {
    if err.is_timeout() || err.is_connect() {
        MiningError::EntrezTransient(err.to_string())
    } else {
        MiningError::EntrezHttp(err.to_string())
    }
}
