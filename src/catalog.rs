/*============================================================
  Synavera Project: Syn-JDK
  Module: synjdk_core::catalog
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    Query the foojay Disco API for runtime packages, resolve
    download redirects and stream archives to disk.

  Security / Safety Notes:
    Performs read-only HTTPS requests to the public catalog.
    No credentials are transmitted.

  Dependencies:
    reqwest for HTTP, serde for response parsing, async-trait
    for the collaborator seams.

  Operational Scope:
    Supplies package candidates and archive bytes to the
    version manager; swapped for in-memory fakes in tests.

  Revision History:
    2026-10-16 COD  Implemented asynchronous Disco client.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Structured response parsing with explicit error paths
    - Configurable timeouts; retries left to callers
============================================================*/

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;

use crate::config::CatalogConfig;
use crate::error::{Result, SynjdkError};
use crate::package_info::PackageDescriptor;
use crate::query::{encode_pairs, PackageQuery};

/// Package search and download-location lookup.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Candidates matching `query`, in catalog order.
    async fn search_packages(&self, query: &PackageQuery) -> Result<Vec<PackageDescriptor>>;

    /// Final download URL for a package after following the catalog redirect.
    async fn resolve_download_url(&self, package_id: &str) -> Result<String>;
}

/// Transport used to fetch archives.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Stream `url` into `dest`, returning the number of bytes written.
    async fn download(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// Distribution summary from the `distributions` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DistributionInfo {
    pub name: String,
    pub api_parameter: String,
    pub maintained: bool,
    pub available: bool,
    pub build_of_openjdk: bool,
    pub build_of_graalvm: bool,
    pub official_uri: Option<String>,
    pub synonyms: Vec<String>,
    pub versions: Vec<String>,
}

/// Major version summary from the `major_versions` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MajorVersionInfo {
    pub major_version: u32,
    pub term_of_support: String,
    pub maintained: bool,
    pub early_access_only: bool,
    pub release_status: String,
    pub versions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DiscoEnvelope<T> {
    result: T,
}

/// Client for the Disco API.
#[derive(Clone)]
pub struct DiscoClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl std::fmt::Debug for DiscoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl DiscoClient {
    /// Construct a new client from configuration.
    ///
    /// Catalog calls get `timeout` as a whole-request deadline. Archive
    /// downloads only fail when the connection stalls for `timeout`.
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout.max(1));
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|err| SynjdkError::Network(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// All distributions known to the catalog.
    pub async fn distributions(&self) -> Result<Vec<DistributionInfo>> {
        let url = self.compose_url(&["distributions"], &[("include_versions", "true".into())]);
        self.fetch_result(&url).await
    }

    /// All major versions known to the catalog.
    pub async fn major_versions(&self, maintained_only: bool) -> Result<Vec<MajorVersionInfo>> {
        let mut pairs = Vec::new();
        if maintained_only {
            pairs.push(("maintained", "true".to_string()));
        }
        let url = self.compose_url(&["major_versions"], &pairs);
        self.fetch_result(&url).await
    }

    fn compose_url(&self, segments: &[&str], pairs: &[(&str, String)]) -> String {
        let mut url = self.base_url.clone();
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        let query = encode_pairs(pairs);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
        url
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response> {
        self.execute(url, self.client.get(url).timeout(self.timeout)).await
    }

    async fn execute(
        &self,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|err| self.map_request_error(url, err))?;
        if !response.status().is_success() {
            return Err(SynjdkError::Network(format!(
                "Request {url} failed with status {}",
                response.status()
            )));
        }
        Ok(response)
    }

    async fn fetch_result<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self
            .send(url)
            .await?
            .text()
            .await
            .map_err(|err| self.map_request_error(url, err))?;
        parse_envelope(&body)
            .map_err(|err| SynjdkError::Serialization(format!("Failed to decode {url}: {err}")))
    }

    fn map_request_error(&self, url: &str, err: reqwest::Error) -> SynjdkError {
        if err.is_timeout() {
            SynjdkError::DeadlineExceeded {
                url: url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            SynjdkError::Network(format!("Request to {url} failed: {err}"))
        }
    }
}

#[async_trait]
impl Catalog for DiscoClient {
    async fn search_packages(&self, query: &PackageQuery) -> Result<Vec<PackageDescriptor>> {
        let url = self.compose_url(&["packages"], &query.to_pairs());
        self.fetch_result(&url).await
    }

    async fn resolve_download_url(&self, package_id: &str) -> Result<String> {
        let url = self.compose_url(&["ids", package_id, "redirect"], &[]);
        // Body is discarded; reqwest has already followed the redirect chain.
        let response = self.send(&url).await?;
        Ok(response.url().to_string())
    }
}

#[async_trait]
impl Downloader for DiscoClient {
    async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let mut response = self.execute(url, self.client.get(url)).await?;
        let mut file = tokio::fs::File::create(dest).await.map_err(|err| {
            SynjdkError::Filesystem(format!(
                "Failed to create download target {}: {err}",
                dest.display()
            ))
        })?;

        let mut written = 0u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|err| self.map_request_error(url, err))?
        {
            file.write_all(&chunk).await?;
            written = written.saturating_add(chunk.len() as u64);
        }
        file.flush().await?;
        Ok(written)
    }
}

fn parse_envelope<T: DeserializeOwned>(body: &str) -> serde_json::Result<T> {
    serde_json::from_str::<DiscoEnvelope<T>>(body).map(|envelope| envelope.result)
}

/// Final path segment of a download URL, ignoring query and fragment.
pub fn archive_filename(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.last()?;
    let decoded = urlencoding::decode(segment).ok()?;
    if decoded.is_empty() {
        None
    } else {
        Some(decoded.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> DiscoClient {
        DiscoClient::new(&CatalogConfig {
            base_url: "https://api.foojay.io/disco/v3.0/".into(),
            ..CatalogConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        assert_eq!(client().base_url(), "https://api.foojay.io/disco/v3.0");
    }

    #[test]
    fn packages_url_carries_query() {
        let query = PackageQuery::new()
            .distribution("zulu")
            .jdk_version(8)
            .with_supported_archive();
        let url = client().compose_url(&["packages"], &query.to_pairs());
        assert_eq!(
            url,
            "https://api.foojay.io/disco/v3.0/packages?jdk_version=8&distribution=zulu&archive_type=zip"
        );
    }

    #[test]
    fn redirect_url_encodes_id() {
        let url = client().compose_url(&["ids", "a b", "redirect"], &[]);
        assert_eq!(url, "https://api.foojay.io/disco/v3.0/ids/a%20b/redirect");
    }

    #[test]
    fn envelope_unwraps_result() {
        let body = r#"{"result":[{"id":"pkg-1","distribution":"zulu","major_version":8}],"message":""}"#;
        let packages: Vec<PackageDescriptor> = parse_envelope(body).unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].id, "pkg-1");
    }

    #[test]
    fn envelope_parses_distributions() {
        let body = r#"{"result":[{"name":"ZuluPrime","api_parameter":"zulu_prime","maintained":true,"synonyms":["zing"],"versions":["21"]}]}"#;
        let distributions: Vec<DistributionInfo> = parse_envelope(body).unwrap();
        assert_eq!(distributions[0].api_parameter, "zulu_prime");
        assert!(distributions[0].maintained);
    }

    /// Serve one response of `chunks` x 1 KiB, pausing `pace` between chunks.
    async fn paced_server(chunks: usize, pace: Duration) -> String {
        use tokio::io::AsyncReadExt;
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                chunks * 1024
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            for _ in 0..chunks {
                tokio::time::sleep(pace).await;
                if socket.write_all(&[b'z'; 1024]).await.is_err() {
                    return;
                }
            }
            let _ = socket.flush().await;
        });
        format!("http://{addr}/zulu8.zip")
    }

    fn short_timeout_client() -> DiscoClient {
        DiscoClient::new(&CatalogConfig {
            timeout: 1,
            ..CatalogConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn download_outlasts_timeout_while_bytes_flow() {
        let url = paced_server(10, Duration::from_millis(300)).await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("zulu8.zip");

        let written = short_timeout_client().download(&url, &dest).await.unwrap();

        assert_eq!(written, 10 * 1024);
        assert_eq!(std::fs::metadata(&dest).unwrap().len(), 10 * 1024);
    }

    #[tokio::test]
    async fn stalled_download_hits_deadline() {
        let url = paced_server(2, Duration::from_secs(5)).await;
        let dir = tempfile::tempdir().unwrap();

        let err = short_timeout_client()
            .download(&url, &dir.path().join("zulu8.zip"))
            .await
            .unwrap_err();

        assert!(matches!(err, SynjdkError::DeadlineExceeded { timeout_secs: 1, .. }));
    }

    #[test]
    fn filename_from_download_url() {
        assert_eq!(
            archive_filename("https://cdn.azul.com/zulu/bin/zulu8.zip").as_deref(),
            Some("zulu8.zip")
        );
        assert_eq!(
            archive_filename("https://cdn.example/zulu11.zip?token=abc#frag").as_deref(),
            Some("zulu11.zip")
        );
        assert_eq!(archive_filename("https://cdn.example/"), None);
        assert_eq!(archive_filename("not a url"), None);
    }
}
