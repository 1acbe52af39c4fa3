//! HTTP object-store backend.
//!
//! Objects live at `{base_url}/{name}`. `PUT` uploads the whole artifact and
//! `GET` downloads it; a `404` means the artifact does not exist yet.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::debug;

use super::{ArtifactName, ArtifactStore};
use crate::artifact::ArtifactError;

pub struct HttpStore {
    client: Client,
    base_url: String,
}

impl HttpStore {
    pub fn new(base_url: &str) -> Result<Self, ArtifactError> {
        let client = Client::builder().build().map_err(ArtifactError::store)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, name: &ArtifactName) -> String {
        format!("{}/{}", self.base_url, name)
    }
}

impl ArtifactStore for HttpStore {
    fn put(&self, name: &ArtifactName, bytes: &[u8]) -> Result<(), ArtifactError> {
        let url = self.url(name);
        let response = self
            .client
            .put(&url)
            .body(bytes.to_vec())
            .send()
            .map_err(ArtifactError::store)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ArtifactError::Store(format!("PUT {url} returned {status}")));
        }
        debug!(%url, bytes = bytes.len(), "artifact uploaded");
        Ok(())
    }

    fn get(&self, name: &ArtifactName) -> Result<Option<Vec<u8>>, ArtifactError> {
        let url = self.url(name);
        let response = self.client.get(&url).send().map_err(ArtifactError::store)?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let bytes = response.bytes().map_err(ArtifactError::store)?;
                debug!(%url, bytes = bytes.len(), "artifact downloaded");
                Ok(Some(bytes.to_vec()))
            }
            status => Err(ArtifactError::Store(format!("GET {url} returned {status}"))),
        }
    }
}
