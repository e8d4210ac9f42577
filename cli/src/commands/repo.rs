//! `artifetch repo`: manage configured remote repositories

use crate::config::{self, ArtifetchConfig};
use anyhow::{Context, Result};
use artifetch_core::{ProxyConfig, RemoteRepository, RepositoryPolicy};
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct RepoAddArgs {
    /// Repository id (e.g., "central", "nexus")
    pub id: String,

    /// Base URL (http, https or file)
    pub url: String,

    /// Repository layout (only "default" is supported)
    #[arg(long, default_value = "default")]
    pub content_type: String,

    /// Do not serve release versions from this repository
    #[arg(long)]
    pub no_releases: bool,

    /// Serve -SNAPSHOT versions from this repository
    #[arg(long)]
    pub snapshots: bool,

    /// How often cached snapshots are refreshed: always, daily, never or interval:<minutes>
    #[arg(long, default_value = "daily")]
    pub update_policy: String,

    /// Username for HTTP basic auth
    #[arg(long, requires = "password")]
    pub username: Option<String>,

    /// Password for HTTP basic auth
    #[arg(long, requires = "username")]
    pub password: Option<String>,

    /// Proxy type (http, https or socks5)
    #[arg(long, default_value = "http")]
    pub proxy_type: String,

    /// Proxy host
    #[arg(long, requires = "proxy_port")]
    pub proxy_host: Option<String>,

    /// Proxy port
    #[arg(long, requires = "proxy_host")]
    pub proxy_port: Option<u16>,
}

impl RepoAddArgs {
    pub fn into_repository(self) -> RemoteRepository {
        let mut repository = RemoteRepository::new(self.id, self.url);
        repository.content_type = self.content_type;
        if self.no_releases {
            repository.releases = Some(RepositoryPolicy::disabled());
        }
        repository.snapshots = Some(RepositoryPolicy {
            enabled: self.snapshots,
            update_policy: self.update_policy,
        });
        if let (Some(username), Some(password)) = (self.username, self.password) {
            repository.auth.insert("username".to_string(), username);
            repository.auth.insert("password".to_string(), password);
        }
        if let (Some(host), Some(port)) = (self.proxy_host, self.proxy_port) {
            repository.proxy = Some(ProxyConfig {
                proxy_type: self.proxy_type,
                host,
                port,
            });
        }
        repository
    }
}

pub fn add(args: RepoAddArgs) -> Result<()> {
    let repository = args.into_repository();
    let id = repository.id.clone();
    let url = repository.url.clone();

    let replaced = config::add_repository(repository).context("Failed to add repository")?;

    if replaced {
        println!("✅ Updated repository: {} → {}", id, url);
    } else {
        println!("✅ Added repository: {} → {}", id, url);
    }
    Ok(())
}

pub fn remove(id: &str) -> Result<()> {
    config::remove_repository(id).context("Failed to remove repository")?;
    println!("✅ Removed repository: {}", id);
    Ok(())
}

pub fn list() -> Result<()> {
    let cfg = config::load_config().context("Failed to load config")?;
    print_repository_list(&cfg);
    Ok(())
}

fn print_repository_list(cfg: &ArtifetchConfig) {
    if cfg.repositories.is_empty() {
        println!("No repositories configured, using Maven Central:");
    } else {
        println!("Configured repositories:");
    }

    for repository in cfg.effective_repositories() {
        println!("  {} → {}", repository.id, repository.url);

        let mut details = Vec::new();
        if repository.content_type != "default" {
            details.push(format!("layout {}", repository.content_type));
        }
        if !repository.accepts(false) {
            details.push("no releases".to_string());
        }
        if repository.accepts(true) {
            details.push(format!("snapshots (update {})", repository.update_policy(true)));
        }
        if let Some(user) = repository.auth.get("username") {
            details.push(format!("user {}", user));
        }
        if let Some(proxy) = &repository.proxy {
            details.push(format!("proxy {}", proxy.url()));
        }
        if !details.is_empty() {
            println!("    {}", details.join(", "));
        }
    }
}
