use std::{path::Path, time::Duration};

use log::{debug, warn};
use reqwest::blocking::{
    multipart::{Form, Part},
    Client,
};

use super::{DocumentExtractor, Extraction, ImportError};

const USER_AGENT: &str = concat!("page-reader/", env!("CARGO_PKG_VERSION"));

/// Client for the PDF extraction service (`POST {api}/api/pdf/extract`).
pub struct HttpExtractor {
    http_client: Client,
    endpoint: String,
}

impl HttpExtractor {
    pub fn new(api_url: &str) -> Result<Self, ImportError> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ImportError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint_for(api_url),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn endpoint_for(api_url: &str) -> String {
    format!("{}/api/pdf/extract", api_url.trim_end_matches('/'))
}

impl DocumentExtractor for HttpExtractor {
    fn extract(&self, path: &Path) -> Result<Extraction, ImportError> {
        let part = Part::file(path)?
            .mime_str("application/pdf")
            .map_err(|e| ImportError::Network(e.to_string()))?;
        let form = Form::new().part("pdf", part);

        debug!("Uploading {} to {}", path.display(), self.endpoint);
        let response = self
            .http_client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .map_err(|e| ImportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!("Extraction service answered {status}");
            return Err(ImportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Extraction>()
            .map_err(|e| ImportError::Parse(e.to_string()))
    }
}
