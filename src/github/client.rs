//! GitHub REST client used for tag listing, release creation and asset upload.
//!
//! The core talks to the provider only through [`ReleaseApi`], so tag
//! resolution and upload orchestration can be exercised without a network.

use super::assets::{AssetUpload, UploadedAsset};
use super::release_manager::{ReleaseHandle, ReleaseRequest};
use crate::error::{ConfigError, GitHubError, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderValue, LINK};
use reqwest::{Body, Response, Url};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use tokio_util::io::ReaderStream;

/// Public GitHub API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Public GitHub upload endpoint
pub const DEFAULT_UPLOAD_URL: &str = "https://uploads.github.com";

/// Page size requested when listing tags (GitHub's maximum)
pub const TAGS_PER_PAGE: u32 = 100;

const API_VERSION: &str = "2022-11-28";

/// Owner and name of a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    /// Organization or user
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepoRef {
    /// Create a repository reference
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A tag as returned by the tag listing endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    /// Tag name exactly as published
    pub name: String,
}

/// One page of tags plus the number of the following page, if any
#[derive(Debug, Clone, Default)]
pub struct TagPage {
    /// Tags on this page
    pub tags: Vec<Tag>,
    /// Next page to request; `None` on the last page
    pub next_page: Option<u32>,
}

/// Operations the release workflow needs from the hosting provider.
///
/// Implementations must be usable from several upload tasks at once.
pub trait ReleaseApi: Send + Sync {
    /// Fetch one page of tags (pages start at 1)
    fn list_tags(
        &self,
        repo: &RepoRef,
        page: u32,
    ) -> impl Future<Output = std::result::Result<TagPage, GitHubError>> + Send;

    /// Create a release record
    fn create_release(
        &self,
        request: &ReleaseRequest,
    ) -> impl Future<Output = std::result::Result<ReleaseHandle, GitHubError>> + Send;

    /// Upload one file as an asset of an existing release
    fn upload_asset(
        &self,
        repo: &RepoRef,
        release: &ReleaseHandle,
        asset: AssetUpload,
    ) -> impl Future<Output = std::result::Result<UploadedAsset, GitHubError>> + Send;
}

/// `POST /repos/{owner}/{repo}/releases` body
#[derive(Debug, Serialize)]
struct CreateReleaseBody<'a> {
    tag_name: &'a str,
    name: &'a str,
    body: &'a str,
    draft: bool,
    prerelease: bool,
}

/// Subset of the release object we read back
#[derive(Debug, Deserialize)]
struct ReleaseResponse {
    id: u64,
    #[serde(default)]
    html_url: String,
}

/// GitHub error payload
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// reqwest-backed GitHub client.
///
/// Built once from the access token and shared by reference (or `Arc`) with
/// every component. No request timeout is configured.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    upload_url: String,
}

impl GitHubClient {
    /// Create a client authenticated with `token`
    pub fn new(token: &str, api_url: &str, upload_url: &str) -> Result<Self> {
        let api_url = normalize_base_url(api_url)?;
        let upload_url = normalize_base_url(upload_url)?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
            ConfigError::InvalidArguments {
                reason: "github token contains characters not allowed in an HTTP header"
                    .to_string(),
            }
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| GitHubError::ClientInit(e.to_string()))?;

        Ok(Self {
            http,
            api_url,
            upload_url,
        })
    }

    /// Base URL for API calls, without trailing slash
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Base URL for asset uploads, without trailing slash
    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }
}

impl ReleaseApi for GitHubClient {
    async fn list_tags(
        &self,
        repo: &RepoRef,
        page: u32,
    ) -> std::result::Result<TagPage, GitHubError> {
        const OPERATION: &str = "list tags";

        let url = format!("{}/repos/{}/{}/tags", self.api_url, repo.owner, repo.name);
        let response = self
            .http
            .get(&url)
            .query(&[("per_page", TAGS_PER_PAGE), ("page", page)])
            .send()
            .await
            .map_err(|source| GitHubError::Request {
                operation: OPERATION,
                source,
            })?;
        let response = check_status(response, OPERATION).await?;

        let next_page = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_next_page);

        let tags = response
            .json::<Vec<Tag>>()
            .await
            .map_err(|source| GitHubError::Decode {
                operation: OPERATION,
                source,
            })?;

        Ok(TagPage { tags, next_page })
    }

    async fn create_release(
        &self,
        request: &ReleaseRequest,
    ) -> std::result::Result<ReleaseHandle, GitHubError> {
        const OPERATION: &str = "create release";

        let url = format!(
            "{}/repos/{}/{}/releases",
            self.api_url, request.repo.owner, request.repo.name
        );
        let body = CreateReleaseBody {
            tag_name: &request.tag_name,
            name: &request.name,
            body: &request.body,
            draft: request.draft,
            prerelease: request.prerelease,
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|source| GitHubError::Request {
                operation: OPERATION,
                source,
            })?;
        let response = check_status(response, OPERATION).await?;

        let release = response
            .json::<ReleaseResponse>()
            .await
            .map_err(|source| GitHubError::Decode {
                operation: OPERATION,
                source,
            })?;

        Ok(ReleaseHandle {
            id: release.id,
            html_url: release.html_url,
        })
    }

    async fn upload_asset(
        &self,
        repo: &RepoRef,
        release: &ReleaseHandle,
        asset: AssetUpload,
    ) -> std::result::Result<UploadedAsset, GitHubError> {
        const OPERATION: &str = "upload asset";

        let url = format!(
            "{}/repos/{}/{}/releases/{}/assets",
            self.upload_url, repo.owner, repo.name, release.id
        );

        // GitHub rejects chunked uploads, so the length is sent up front
        // while the body streams from the open file.
        let response = self
            .http
            .post(&url)
            .query(&[("name", asset.name.as_str())])
            .header(CONTENT_TYPE, asset.content_type)
            .header(CONTENT_LENGTH, asset.size)
            .body(Body::wrap_stream(ReaderStream::new(asset.file)))
            .send()
            .await
            .map_err(|source| GitHubError::Request {
                operation: OPERATION,
                source,
            })?;
        let response = check_status(response, OPERATION).await?;

        response
            .json::<UploadedAsset>()
            .await
            .map_err(|source| GitHubError::Decode {
                operation: OPERATION,
                source,
            })
    }
}

/// Turn a non-success response into [`GitHubError::Status`]
async fn check_status(
    response: Response,
    operation: &'static str,
) -> std::result::Result<Response, GitHubError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.message)
        .unwrap_or(text);

    Err(GitHubError::Status {
        operation,
        status: status.as_u16(),
        message,
    })
}

/// Validate a base URL and strip any trailing slash
fn normalize_base_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        }
        .into());
    }

    Ok(url.trim_end_matches('/').to_string())
}

/// Extract the `page` query parameter of the `rel="next"` entry of a `Link`
/// header, e.g.
/// `<https://api.github.com/repositories/1/tags?per_page=100&page=2>; rel="next", <...>; rel="last"`.
pub fn parse_next_page(link: &str) -> Option<u32> {
    link.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| {
            let param = param.trim();
            param == r#"rel="next""# || param == "rel=next"
        });
        if !is_next {
            return None;
        }

        let target = target.strip_prefix('<')?.strip_suffix('>')?;
        let url = Url::parse(target).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReleaseError;
    use crate::github::{resolve_latest_tag, upload_all};
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// A request as received by the loopback server
    #[derive(Debug, Clone)]
    struct SeenRequest {
        line: String,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    }

    impl SeenRequest {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        }
    }

    async fn read_request(stream: &mut TcpStream) -> std::io::Result<SeenRequest> {
        let mut data = Vec::new();
        let mut chunk = [0u8; 4096];
        let head_end = loop {
            if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos;
            }
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                return Err(std::io::ErrorKind::UnexpectedEof.into());
            }
            data.extend_from_slice(&chunk[..n]);
        };

        let head = String::from_utf8_lossy(&data[..head_end]).to_string();
        let mut lines = head.split("\r\n");
        let line = lines.next().unwrap_or_default().to_string();
        let headers: Vec<(String, String)> = lines
            .filter_map(|l| l.split_once(':'))
            .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
            .collect();
        let length = headers
            .iter()
            .find(|(k, _)| k == "content-length")
            .and_then(|(_, v)| v.parse::<usize>().ok())
            .unwrap_or(0);

        let mut body = data[head_end + 4..].to_vec();
        while body.len() < length {
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..n]);
        }

        Ok(SeenRequest {
            line,
            headers,
            body,
        })
    }

    /// Canned GitHub answers keyed on the request line
    fn respond(line: &str) -> (&'static str, &'static str, &'static str) {
        if line.starts_with("GET /repos/o/r/tags?per_page=100&page=1 ") {
            (
                "200 OK",
                "link: <https://api.github.com/repositories/1/tags?per_page=100&page=2>; rel=\"next\"\r\n",
                r#"[{"name":"1.0.0"},{"name":"nightly"}]"#,
            )
        } else if line.starts_with("GET /repos/o/r/tags?per_page=100&page=2 ") {
            ("200 OK", "", r#"[{"name":"v1.1.0"},{"name":"1.1.0-rc.1"}]"#)
        } else if line.starts_with("POST /repos/o/r/releases ") {
            (
                "201 Created",
                "",
                r#"{"id":77,"html_url":"https://github.com/o/r/releases/tag/1.1.0"}"#,
            )
        } else if line.starts_with("POST /repos/o/r/releases/77/assets?") {
            (
                "201 Created",
                "",
                r#"{"id":5,"name":"output.tar.gz","size":5,"browser_download_url":"https://github.com/o/r/releases/download/1.1.0/output.tar.gz"}"#,
            )
        } else {
            ("404 Not Found", "", r#"{"message":"Not Found"}"#)
        }
    }

    /// Start a loopback HTTP server; returns its base URL and the requests it saw
    async fn serve() -> (String, Arc<Mutex<Vec<SeenRequest>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&seen);
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let log = Arc::clone(&log);
                tokio::spawn(async move {
                    let Ok(request) = read_request(&mut stream).await else {
                        return;
                    };
                    let (status, extra, body) = respond(&request.line);
                    let reply = format!(
                        "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n{}\r\n{}",
                        status,
                        body.len(),
                        extra,
                        body
                    );
                    log.lock().unwrap().push(request);
                    let _ = stream.write_all(reply.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        (base, seen)
    }

    #[tokio::test]
    async fn test_http_tags_follow_link_header() {
        let (base, seen) = serve().await;
        let client = GitHubClient::new("t0ken", &base, &base).unwrap();

        let tag = resolve_latest_tag(&client, &RepoRef::new("o", "r")).await.unwrap();
        assert_eq!(tag, "1.1.0");

        let seen = seen.lock().unwrap().clone();
        let lines: Vec<&str> = seen.iter().map(|r| r.line.as_str()).collect();
        assert_eq!(
            lines,
            vec![
                "GET /repos/o/r/tags?per_page=100&page=1 HTTP/1.1",
                "GET /repos/o/r/tags?per_page=100&page=2 HTTP/1.1",
            ]
        );
        assert_eq!(seen[0].header("authorization"), Some("Bearer t0ken"));
        assert_eq!(seen[0].header("accept"), Some("application/vnd.github+json"));
        assert_eq!(seen[0].header("x-github-api-version"), Some(API_VERSION));
    }

    #[tokio::test]
    async fn test_http_create_release_then_upload() {
        let (base, seen) = serve().await;
        let client = Arc::new(GitHubClient::new("t0ken", &base, &base).unwrap());
        let repo = RepoRef::new("o", "r");

        let request = ReleaseRequest {
            repo: repo.clone(),
            tag_name: "1.1.0".to_string(),
            name: "Widgets 1.1.0".to_string(),
            body: String::new(),
            draft: true,
            prerelease: false,
        };
        let release = client.create_release(&request).await.unwrap();
        assert_eq!(release.id, 77);
        assert_eq!(release.html_url, "https://github.com/o/r/releases/tag/1.1.0");

        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("build")).unwrap();
        let path = dir.path().join("build").join("output.tar.gz");
        std::fs::write(&path, b"hello").unwrap();

        let report = upload_all(Arc::clone(&client), &repo, &release, &[path]).await;
        assert!(report.is_complete());
        assert_eq!(report.uploaded[0].name, "output.tar.gz");

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 2);

        let create = &seen[0];
        assert_eq!(create.line, "POST /repos/o/r/releases HTTP/1.1");
        let json: serde_json::Value = serde_json::from_slice(&create.body).unwrap();
        assert_eq!(json["tag_name"], "1.1.0");
        assert_eq!(json["name"], "Widgets 1.1.0");
        assert_eq!(json["draft"], true);
        assert_eq!(json["prerelease"], false);

        let upload = &seen[1];
        assert_eq!(
            upload.line,
            "POST /repos/o/r/releases/77/assets?name=output.tar.gz HTTP/1.1"
        );
        assert_eq!(upload.header("content-length"), Some("5"));
        assert_eq!(upload.header("content-type"), Some("application/gzip"));
        assert_eq!(upload.header("transfer-encoding"), None);
        assert_eq!(upload.body, b"hello");
    }

    #[tokio::test]
    async fn test_http_error_status_carries_message() {
        let (base, _seen) = serve().await;
        let client = GitHubClient::new("t0ken", &base, &base).unwrap();

        let err = resolve_latest_tag(&client, &RepoRef::new("o", "missing"))
            .await
            .unwrap_err();
        match err {
            ReleaseError::GitHub(GitHubError::Status {
                operation,
                status,
                message,
            }) => {
                assert_eq!(operation, "list tags");
                assert_eq!(status, 404);
                assert_eq!(message, "Not Found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_next_page_middle_page() {
        let link = r#"<https://api.github.com/repositories/42/tags?per_page=100&page=1>; rel="prev", <https://api.github.com/repositories/42/tags?per_page=100&page=3>; rel="next", <https://api.github.com/repositories/42/tags?per_page=100&page=5>; rel="last""#;
        assert_eq!(parse_next_page(link), Some(3));
    }

    #[test]
    fn test_parse_next_page_last_page() {
        let link = r#"<https://api.github.com/repositories/42/tags?per_page=100&page=1>; rel="first", <https://api.github.com/repositories/42/tags?per_page=100&page=4>; rel="prev""#;
        assert_eq!(parse_next_page(link), None);
    }

    #[test]
    fn test_parse_next_page_garbage() {
        assert_eq!(parse_next_page(""), None);
        assert_eq!(parse_next_page("not a link header"), None);
        assert_eq!(parse_next_page(r#"<not a url>; rel="next""#), None);
    }

    #[test]
    fn test_repo_ref_display() {
        assert_eq!(RepoRef::new("acme", "widgets").to_string(), "acme/widgets");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client =
            GitHubClient::new("t0ken", "https://ghe.example.com/api/v3/", DEFAULT_UPLOAD_URL)
                .unwrap();
        assert_eq!(client.api_url(), "https://ghe.example.com/api/v3");
        assert_eq!(client.upload_url(), DEFAULT_UPLOAD_URL);
    }

    #[test]
    fn test_client_rejects_bad_urls() {
        assert!(GitHubClient::new("t0ken", "not a url", DEFAULT_UPLOAD_URL).is_err());
        assert!(GitHubClient::new("t0ken", DEFAULT_API_URL, "ftp://uploads.example.com").is_err());
    }

    #[test]
    fn test_client_rejects_header_breaking_token() {
        assert!(GitHubClient::new("bad\ntoken", DEFAULT_API_URL, DEFAULT_UPLOAD_URL).is_err());
    }

    #[test]
    fn test_create_release_body_shape() {
        let body = CreateReleaseBody {
            tag_name: "1.2.0",
            name: "1.2.0",
            body: "",
            draft: true,
            prerelease: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["tag_name"], "1.2.0");
        assert_eq!(json["draft"], true);
        assert_eq!(json["prerelease"], false);
    }
}
