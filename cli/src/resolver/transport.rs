//! Fetch single files from Maven 2 layout repositories
//!
//! `http(s)://` repositories go through a blocking reqwest client, one per
//! repository id so that proxies and timeouts stay per repository.
//! `file://` repositories are read straight from disk.
//!
//! Every download is written to a `.part` sibling first and renamed into
//! place, so an interrupted transfer never leaves a truncated artifact in the
//! cache.

use artifetch_core::RemoteRepository;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);
const USER_AGENT: &str = concat!("artifetch/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("not found ({0})")]
    NotFound(String),

    #[error("server error: HTTP {0}")]
    Server(u16),

    #[error("rejected: HTTP {0}")]
    Rejected(u16),

    #[error("{0}")]
    Transport(String),

    #[error("invalid repository URL '{0}'")]
    InvalidUrl(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Whether another attempt might succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::Server(_) | FetchError::Transport(_) | FetchError::Io { .. }
        )
    }
}

#[derive(Default)]
pub struct Transport {
    clients: Mutex<HashMap<String, Client>>,
}

impl Transport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full URL of `path` inside `repository`
    pub fn resource_url(repository: &RemoteRepository, path: &str) -> String {
        format!("{}{}", repository.base_url(), path)
    }

    /// Download `path` from `repository` into `dest`
    #[instrument(skip(self, repository), fields(repository = %repository.id))]
    pub fn fetch(
        &self,
        repository: &RemoteRepository,
        path: &str,
        dest: &Path,
    ) -> Result<(), FetchError> {
        let url = Self::resource_url(repository, path);
        let local_dir = local_repository_dir(&repository.url)?;
        let partial = partial_path(dest);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|source| FetchError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let result = match local_dir {
            Some(dir) => copy_local(&dir.join(path), &partial),
            None => self.download(repository, &url, &partial),
        };

        if let Err(e) = result {
            let _ = fs::remove_file(&partial);
            return Err(e);
        }

        fs::rename(&partial, dest).map_err(|source| FetchError::Io {
            path: dest.to_path_buf(),
            source,
        })?;
        debug!(url = %url, dest = %dest.display(), "downloaded");
        Ok(())
    }

    fn download(
        &self,
        repository: &RemoteRepository,
        url: &str,
        partial: &Path,
    ) -> Result<(), FetchError> {
        let client = self.client_for(repository)?;
        let mut request = client.get(url);
        if let Some(username) = repository.auth.get("username") {
            request = request.basic_auth(username, repository.auth.get("password"));
        }

        let mut response = request
            .send()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(FetchError::NotFound(format!("HTTP {}", status.as_u16())));
        }
        if status.is_server_error() {
            return Err(FetchError::Server(status.as_u16()));
        }
        if !status.is_success() {
            return Err(FetchError::Rejected(status.as_u16()));
        }

        let mut file = File::create(partial).map_err(|source| FetchError::Io {
            path: partial.to_path_buf(),
            source,
        })?;
        response
            .copy_to(&mut file)
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(())
    }

    fn client_for(&self, repository: &RemoteRepository) -> Result<Client, FetchError> {
        let mut clients = self
            .clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(client) = clients.get(&repository.id) {
            return Ok(client.clone());
        }

        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT);
        if let Some(proxy) = &repository.proxy {
            let proxy = reqwest::Proxy::all(proxy.url())
                .map_err(|e| FetchError::Transport(format!("invalid proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        clients.insert(repository.id.clone(), client.clone());
        Ok(client)
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

/// Directory behind a `file://` repository URL, `None` for remote schemes
fn local_repository_dir(repository_url: &str) -> Result<Option<PathBuf>, FetchError> {
    let invalid = || FetchError::InvalidUrl(repository_url.to_string());
    let parsed = Url::parse(repository_url).map_err(|_| invalid())?;
    if parsed.scheme() != "file" {
        return Ok(None);
    }
    parsed.to_file_path().map(Some).map_err(|()| invalid())
}

fn copy_local(source: &Path, partial: &Path) -> Result<(), FetchError> {
    if !source.is_file() {
        return Err(FetchError::NotFound(source.display().to_string()));
    }
    fs::copy(source, partial).map_err(|source| FetchError::Io {
        path: partial.to_path_buf(),
        source,
    })?;
    Ok(())
}
