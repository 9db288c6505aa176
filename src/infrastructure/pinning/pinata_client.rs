use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use super::pinning_interface::{PinRequest, PinningCredentials, PinningError, PinningService};

const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Root segment every uploaded file is placed under
pub const UPLOAD_ROOT: &str = "base";

fn map_http_error(error: reqwest::Error) -> PinningError {
    match error.status() {
        Some(status) => PinningError::request_failed(status.as_u16(), error.to_string()),
        None if error.is_timeout() => PinningError::http(format!("Request timeout: {}", error)),
        None if error.is_connect() => PinningError::http(format!("Connection error: {}", error)),
        None => PinningError::http(error.to_string()),
    }
}

#[derive(Debug, Deserialize)]
struct PinFileResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Client for the Pinata pinning API
pub struct PinataClient {
    client: Client,
    api_url: String,
}

impl PinataClient {
    pub fn new(api_url: impl Into<String>) -> Result<Self, PinningError> {
        let client = Client::builder()
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .timeout(HTTP_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PinningError::http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn authorized(&self, request: RequestBuilder, credentials: &PinningCredentials) -> RequestBuilder {
        request
            .header("pinata_api_key", &credentials.api_key)
            .header("pinata_secret_api_key", &credentials.secret_api_key)
    }

    async fn send_checked(&self, request: RequestBuilder) -> Result<reqwest::Response, PinningError> {
        let response = request.send().await.map_err(map_http_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PinningError::request_failed(status.as_u16(), error_text));
        }

        Ok(response)
    }
}

/// Multipart form of an upload
fn upload_form(request: PinRequest) -> Result<Form, PinningError> {
    let metadata = json!({
        "name": request.name,
        "keyvalues": request.keyvalues,
    });
    let options = json!({ "wrapWithDirectory": false });

    let mut form = Form::new();
    for file in request.files {
        let part = Part::bytes(file.content)
            .file_name(format!("{}/{}", UPLOAD_ROOT, file.path))
            .mime_str("application/octet-stream")
            .map_err(|e| PinningError::http(e.to_string()))?;
        form = form.part("file", part);
    }

    Ok(form
        .text("pinataOptions", options.to_string())
        .text("pinataMetadata", metadata.to_string()))
}

#[async_trait]
impl PinningService for PinataClient {
    async fn pin_file_to_ipfs(
        &self,
        credentials: &PinningCredentials,
        request: PinRequest,
    ) -> Result<String, PinningError> {
        let file_count = request.files.len();
        let url = format!("{}/pinning/pinFileToIPFS", self.api_url);
        let http_request = self
            .authorized(self.client.post(&url), credentials)
            .multipart(upload_form(request)?);

        let response: PinFileResponse = self
            .send_checked(http_request)
            .await?
            .json()
            .await
            .map_err(|e| PinningError::invalid_response(e.to_string()))?;

        debug!("Pinned {} files as {}", file_count, response.ipfs_hash);
        Ok(response.ipfs_hash)
    }

    async fn pin_list(&self, credentials: &PinningCredentials) -> Result<Value, PinningError> {
        let url = format!("{}/data/pinList", self.api_url);
        let request = self
            .authorized(self.client.get(&url), credentials)
            .query(&[("status", "pinned")]);

        self.send_checked(request)
            .await?
            .json()
            .await
            .map_err(|e| PinningError::invalid_response(e.to_string()))
    }

    async fn unpin(
        &self,
        credentials: &PinningCredentials,
        hash: &str,
    ) -> Result<bool, PinningError> {
        let url = format!("{}/pinning/unpin/{}", self.api_url, hash);
        let response = self
            .authorized(self.client.delete(&url), credentials)
            .send()
            .await
            .map_err(map_http_error)?;

        if !response.status().is_success() {
            warn!("Unpin of {} refused with status {}", hash, response.status());
            return Ok(false);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::pinning::pinning_interface::PinFile;

    #[test]
    fn test_api_url_is_trimmed() {
        let client = PinataClient::new("https://api.pinata.cloud/").unwrap();
        assert_eq!(client.api_url, "https://api.pinata.cloud");
    }

    #[test]
    fn test_upload_form_builds() {
        let request = PinRequest {
            files: vec![PinFile {
                path: "src/main.sol".to_string(),
                content: b"contract A {}".to_vec(),
            }],
            name: "dgit - project - 2026-01-01 00:00:00".to_string(),
            keyvalues: json!({"ref": "no commits", "message": "no commits"}),
        };
        assert!(upload_form(request).is_ok());
    }

    #[test]
    fn test_status_codes_map_to_errors() {
        assert!(matches!(
            PinningError::request_failed(401, "bad key"),
            PinningError::Unauthorized { .. }
        ));
        assert!(matches!(
            PinningError::request_failed(500, "boom"),
            PinningError::RequestFailed { status: 500, .. }
        ));
    }
}
