//! Typed client for the pinning service and HTTP gateway.

use std::time::Duration;

use serde::Deserialize;

use hcred_core::Cid;

use crate::config::PinConfig;
use crate::error::PinError;
use crate::metadata::CredentialMetadata;
use crate::{is_allowed_mime, MAX_FILE_BYTES};

/// A file pinned to the content-addressed network.
#[derive(Debug, Clone)]
pub struct PinnedFile {
    /// Content identifier of the pinned bytes.
    pub cid: Cid,
    /// `ipfs://` URI of the file.
    pub ipfs_file_url: String,
    /// Gateway URL for ordinary browser retrieval.
    pub gateway_file_url: String,
    /// MIME type the file was pinned with.
    pub mime_type: String,
}

/// A JSON document pinned to the content-addressed network.
#[derive(Debug, Clone)]
pub struct PinnedJson {
    /// Content identifier of the pinned document.
    pub cid: Cid,
    /// `ipfs://` URI of the document.
    pub ipfs_url: String,
    /// Gateway URL for ordinary browser retrieval.
    pub gateway_url: String,
}

/// Response shape of the pinning service's pin endpoints.
#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Client for the pinning service and gateway.
#[derive(Debug, Clone)]
pub struct PinClient {
    http: reqwest::Client,
    config: PinConfig,
}

impl PinClient {
    /// Create a new pinning client from configuration.
    pub fn new(config: PinConfig) -> Result<Self, PinError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PinError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self { http, config })
    }

    /// The configured gateway base URL.
    pub fn gateway_url(&self) -> &url::Url {
        &self.config.gateway_url
    }

    /// Pin a credential document file.
    ///
    /// Enforces the size cap and MIME allow-list locally before uploading.
    /// Calls `POST {pin_service}/pinning/pinFileToIPFS` as a multipart form
    /// with the file part plus pin metadata/options parts.
    pub async fn pin_file(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        mime_type: &str,
    ) -> Result<PinnedFile, PinError> {
        let endpoint = "POST /pinning/pinFileToIPFS";

        if bytes.len() > MAX_FILE_BYTES {
            return Err(PinError::FileTooLarge {
                size: bytes.len(),
                limit: MAX_FILE_BYTES,
            });
        }
        if !is_allowed_mime(mime_type) {
            return Err(PinError::UnsupportedMediaType(mime_type.to_string()));
        }

        let file_part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime_type)
            .map_err(|e| PinError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text(
                "pinataMetadata",
                serde_json::json!({ "name": filename }).to_string(),
            )
            .text(
                "pinataOptions",
                serde_json::json!({ "cidVersion": 1 }).to_string(),
            );

        let url = self.endpoint_url("pinning/pinFileToIPFS")?;
        let resp = self
            .http
            .post(url)
            .bearer_auth(self.config.api_token.as_str())
            .multipart(form)
            .send()
            .await
            .map_err(|e| PinError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        let pin = self.parse_pin_response(endpoint, resp).await?;
        let cid = Cid::new(&pin.ipfs_hash).map_err(|e| PinError::InvalidCid(e.to_string()))?;
        tracing::debug!(%cid, filename, "file pinned");

        Ok(PinnedFile {
            ipfs_file_url: format!("ipfs://{cid}"),
            gateway_file_url: format!("{}{cid}", self.config.gateway_url),
            mime_type: mime_type.to_string(),
            cid,
        })
    }

    /// Pin a credential metadata document.
    ///
    /// Calls `POST {pin_service}/pinning/pinJSONToIPFS`.
    pub async fn pin_json(&self, metadata: &CredentialMetadata) -> Result<PinnedJson, PinError> {
        let endpoint = "POST /pinning/pinJSONToIPFS";

        let url = self.endpoint_url("pinning/pinJSONToIPFS")?;
        let resp = self
            .http
            .post(url)
            .bearer_auth(self.config.api_token.as_str())
            .json(metadata)
            .send()
            .await
            .map_err(|e| PinError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        let pin = self.parse_pin_response(endpoint, resp).await?;
        let cid = Cid::new(&pin.ipfs_hash).map_err(|e| PinError::InvalidCid(e.to_string()))?;
        tracing::debug!(%cid, "metadata pinned");

        Ok(PinnedJson {
            ipfs_url: format!("ipfs://{cid}"),
            gateway_url: format!("{}{cid}", self.config.gateway_url),
            cid,
        })
    }

    /// Fetch a credential metadata document from its token URI.
    ///
    /// `ipfs://` URIs are resolved through the configured gateway; plain
    /// HTTP(S) URLs are fetched as-is. Transport failure, non-success
    /// status, and malformed content are distinct error variants so the
    /// verification resolver can report which one occurred.
    pub async fn fetch_metadata(&self, token_uri: &str) -> Result<CredentialMetadata, PinError> {
        let endpoint = "GET metadata";
        let url = self.resolve_uri(token_uri)?;

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| PinError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(PinError::Api {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }

        let bytes = resp.bytes().await.map_err(|e| PinError::Http {
            endpoint: endpoint.into(),
            source: e,
        })?;
        serde_json::from_slice(&bytes).map_err(|e| PinError::Deserialization {
            endpoint: endpoint.into(),
            message: e.to_string(),
        })
    }

    /// Resolve a token URI to a fetchable HTTP URL.
    pub fn resolve_uri(&self, uri: &str) -> Result<String, PinError> {
        if let Some(cid) = uri.strip_prefix("ipfs://") {
            if cid.is_empty() {
                return Err(PinError::InvalidUri(uri.to_string()));
            }
            return Ok(format!("{}{cid}", self.config.gateway_url));
        }
        if uri.starts_with("http://") || uri.starts_with("https://") {
            return Ok(uri.to_string());
        }
        Err(PinError::InvalidUri(uri.to_string()))
    }

    fn endpoint_url(&self, path: &str) -> Result<reqwest::Url, PinError> {
        self.config
            .pin_service_url
            .join(path)
            .map_err(|e| PinError::InvalidUri(format!("{path}: {e}")))
    }

    /// Shared status triage + body parsing for the two pin endpoints.
    async fn parse_pin_response(
        &self,
        endpoint: &str,
        resp: reqwest::Response,
    ) -> Result<PinResponse, PinError> {
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(PinError::Api {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }

        resp.json().await.map_err(|e| PinError::Deserialization {
            endpoint: endpoint.into(),
            message: e.to_string(),
        })
    }
}
