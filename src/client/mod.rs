mod builder;

use crate::error::{ClientError, Result};
pub use builder::ClientBuilder;
use rquest::Client as RquestClient;
use url::Url;

#[derive(Debug)]
pub struct ClientResponse {
    pub status: u16,
    pub content: String,
}

pub struct Client {
    inner: RquestClient,
    base_url: String,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Fetches a path relative to the base URL, or an absolute URL as-is.
    pub async fn get(&self, path: &str) -> Result<ClientResponse> {
        let url = build_url(&self.base_url, path)?;
        self.request(&url).await
    }

    async fn request(&self, url: &str) -> Result<ClientResponse> {
        let response = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::RequestFailed(e.to_string()))?;

        let status = response.status().as_u16();
        let is_success = response.status().is_success();
        let content = response.text().await.map_err(|e| {
            ClientError::RequestFailed(format!("Failed to get response text: {}", e))
        })?;

        if !is_success {
            return Err(ClientError::ResponseError {
                status_code: status,
                message: url.to_string(),
            }
            .into());
        }

        Ok(ClientResponse { status, content })
    }
}

fn build_url(base_url: &str, path: &str) -> Result<String> {
    let base = Url::parse(base_url)
        .map_err(|e| ClientError::InvalidUrl(format!("Invalid base URL: {}", e)))?;

    let full_url = base
        .join(path)
        .map_err(|e| ClientError::InvalidUrl(format!("Invalid path: {}", e)))?;

    Ok(full_url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_relative_paths() {
        assert_eq!(
            build_url("https://timetable.unsw.edu.au", "/2025/subjectSearch.html").unwrap(),
            "https://timetable.unsw.edu.au/2025/subjectSearch.html"
        );
    }

    #[test]
    fn keeps_absolute_urls() {
        assert_eq!(
            build_url(
                "https://timetable.unsw.edu.au",
                "https://timetable.unsw.edu.au/2025/COMP1511.html"
            )
            .unwrap(),
            "https://timetable.unsw.edu.au/2025/COMP1511.html"
        );
    }
}
