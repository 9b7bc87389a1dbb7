use std::collections::{HashSet, VecDeque};

use reqwest::{Method, StatusCode};
use url::Url;
use vog_sync::{RemoteBody, RemoteFile, RemoteMetadata, RemoteTree, SyncError};

use crate::headers::remote_metadata;
use crate::listing::{self, Link};

const DEFAULT_USER_AGENT: &str = concat!("vog-sync/", env!("CARGO_PKG_VERSION"));

/// Where and how to crawl a published dataset snapshot.
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Share root, e.g. `http://fileshare.csb.univie.ac.at/vog/`.
    pub base_url: String,
    /// Snapshot directory below `base_url`, e.g. `latest` or `vog220`.
    pub version: String,
    pub max_depth: usize,
    pub user_agent: Option<String>,
}

impl HttpSourceConfig {
    pub fn new(base_url: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            version: version.into(),
            max_depth: crate::DEFAULT_MAX_DEPTH,
            user_agent: None,
        }
    }
}

/// A dataset snapshot served as plain directory index pages over HTTP(S).
///
/// Listing crawls the index pages below `base_url/version/` without ever
/// ascending above it. Metadata comes from `HEAD`, content from `GET`.
pub struct HttpRemoteTree {
    client: reqwest::Client,
    root: Url,
    max_depth: usize,
    user_agent: String,
}

impl HttpRemoteTree {
    pub fn new(config: HttpSourceConfig) -> Result<Self, SyncError> {
        let version = vog_sync::validate_version(&config.version)?;

        let mut base = Url::parse(&config.base_url).map_err(|e| {
            SyncError::Config(format!("invalid source URL {:?}: {e}", config.base_url))
        })?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(SyncError::Config(format!(
                "source URL {base} must use http or https"
            )));
        }

        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let root = base
            .join(&format!("{version}/"))
            .map_err(|e| SyncError::Config(format!("cannot join version {version:?}: {e}")))?;

        if !root.as_str().starts_with(base.as_str()) {
            return Err(SyncError::Config(format!(
                "version {version:?} does not resolve below {base}"
            )));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            root,
            max_depth: config.max_depth,
            user_agent: config
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
        })
    }

    /// The version directory every listed file lives under.
    pub fn root(&self) -> &Url {
        &self.root
    }

    fn build_request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("User-Agent", self.user_agent.as_str())
    }

    async fn send(&self, method: Method, url: &str) -> Result<reqwest::Response, SyncError> {
        self.build_request(method, url)
            .send()
            .await
            .map_err(|e| SyncError::network(url, e.to_string()))
    }

    async fn fetch_page(&self, page: &Url) -> Result<String, SyncError> {
        let response = self.send(Method::GET, page.as_str()).await?;

        if !response.status().is_success() {
            return Err(SyncError::network(
                page.as_str(),
                format!("listing returned HTTP {}", response.status()),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| SyncError::network(page.as_str(), format!("failed to read listing: {e}")))
    }
}

#[async_trait::async_trait]
impl RemoteTree for HttpRemoteTree {
    fn label(&self) -> &str {
        self.root.as_str()
    }

    async fn list(&self) -> Result<Vec<RemoteFile>, SyncError> {
        let mut files = Vec::new();
        let mut seen: HashSet<Url> = HashSet::from([self.root.clone()]);
        let mut pending = VecDeque::from([(self.root.clone(), 0usize)]);

        while let Some((page, depth)) = pending.pop_front() {
            tracing::debug!(url = %page, depth, "reading listing");
            let html = self.fetch_page(&page).await?;

            for href in listing::extract_links(&html) {
                match listing::classify(&page, &href, &self.root) {
                    Some(Link::Directory(dir)) => {
                        if depth >= self.max_depth {
                            tracing::debug!(url = %dir, "depth limit reached, not descending");
                        } else if seen.insert(dir.clone()) {
                            pending.push_back((dir, depth + 1));
                        }
                    }
                    Some(Link::File { name, url }) => {
                        if seen.insert(url.clone()) {
                            files.push(RemoteFile::new(name, url.as_str()));
                        }
                    }
                    None => {}
                }
            }
        }

        tracing::debug!(root = %self.root, files = files.len(), "listing complete");
        Ok(files)
    }

    async fn metadata(&self, file: &RemoteFile) -> Result<RemoteMetadata, SyncError> {
        let response = self.send(Method::HEAD, &file.location).await?;
        let status = response.status();

        if status == StatusCode::METHOD_NOT_ALLOWED || status == StatusCode::NOT_IMPLEMENTED {
            tracing::debug!(url = %file.location, %status, "HEAD unsupported, metadata unknown");
            return Ok(RemoteMetadata::unknown());
        }

        if !status.is_success() {
            return Err(SyncError::network(
                &file.location,
                format!("HEAD returned HTTP {status}"),
            ));
        }

        Ok(remote_metadata(response.headers()))
    }

    async fn open(&self, file: &RemoteFile) -> Result<Box<dyn RemoteBody>, SyncError> {
        let response = self.send(Method::GET, &file.location).await?;

        if !response.status().is_success() {
            return Err(SyncError::network(
                &file.location,
                format!("download returned HTTP {}", response.status()),
            ));
        }

        Ok(Box::new(HttpBody {
            metadata: remote_metadata(response.headers()),
            url: file.location.clone(),
            response,
        }))
    }
}

struct HttpBody {
    metadata: RemoteMetadata,
    url: String,
    response: reqwest::Response,
}

#[async_trait::async_trait]
impl RemoteBody for HttpBody {
    fn metadata(&self) -> RemoteMetadata {
        self.metadata
    }

    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, SyncError> {
        let chunk = self
            .response
            .chunk()
            .await
            .map_err(|e| SyncError::network(&self.url, format!("download interrupted: {e}")))?;
        Ok(chunk.map(|bytes| bytes.to_vec()))
    }
}
