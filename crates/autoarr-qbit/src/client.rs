//! qBittorrent Web API v2 client.
//!
//! # Design
//! - Reads (`app/defaultSavePath`, `torrents/info`) always hit the client; state-changing
//!   requests are skipped and logged in dry-run mode.
//! - State changes are form-encoded `POST`s keyed by `hashes`.

use std::time::Duration;

use async_trait::async_trait;
use autoarr_core::{DownloadControl, Snapshot, SnapshotSource};
use reqwest::{Client, StatusCode};
use tracing::{debug, info};
use url::Url;

use crate::error::{QbitError, QbitResult};
use crate::model::parse_torrent_list;

const FORBIDDEN_BODY: &str = "Forbidden";

/// HTTP adapter for a qBittorrent instance.
#[derive(Debug, Clone)]
pub struct QbitClient {
    http: Client,
    api: Url,
    dry_run: bool,
}

impl QbitClient {
    /// Build a client for the Web UI at `base_url` (without the `/api/v2` suffix).
    ///
    /// # Errors
    ///
    /// Returns [`QbitError::InvalidUrl`] for an unparseable base URL and
    /// [`QbitError::ClientBuild`] when the HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration, dry_run: bool) -> QbitResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| QbitError::ClientBuild { source })?;
        Ok(Self {
            http,
            api: api_root(base_url)?,
            dry_run,
        })
    }

    /// Root of the v2 API, always ending in `/api/v2/`.
    #[must_use]
    pub const fn api_root(&self) -> &Url {
        &self.api
    }

    /// Fetch the client-wide default save directory.
    ///
    /// # Errors
    ///
    /// Returns [`QbitError::Forbidden`] when access is refused, [`QbitError::Status`] for other
    /// failures, and [`QbitError::Request`] for transport errors.
    pub async fn default_save_path(&self) -> QbitResult<String> {
        let body = self.get_text("app/defaultSavePath", "app.default_save_path").await?;
        Ok(body.trim().to_string())
    }

    /// Fetch every managed download.
    ///
    /// # Errors
    ///
    /// Same as [`QbitClient::default_save_path`], plus the parse errors of
    /// [`crate::model::parse_torrent_list`].
    pub async fn list_downloads(&self) -> QbitResult<Vec<autoarr_core::Download>> {
        let body = self.get_text("torrents/info", "torrents.info").await?;
        parse_torrent_list(&body)
    }

    /// Send a state-changing torrent command.
    ///
    /// # Errors
    ///
    /// Returns [`QbitError::Forbidden`], [`QbitError::Status`] or [`QbitError::Request`] when the
    /// command is not accepted.
    pub async fn torrent_command(
        &self,
        command: &'static str,
        form: &[(&str, &str)],
    ) -> QbitResult<()> {
        let url = self.endpoint(&format!("torrents/{command}"))?;
        if self.dry_run {
            info!(url = %url, form = ?form, "dry run: skipping download client request");
            return Ok(());
        }

        debug!(url = %url, "sending download client command");
        let response = self
            .http
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|source| QbitError::Request {
                operation: command,
                source,
            })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| QbitError::Request {
                operation: command,
                source,
            })?;
        check_status(command, status, &body)
    }

    async fn get_text(&self, path: &str, operation: &'static str) -> QbitResult<String> {
        let url = self.endpoint(path)?;
        debug!(url = %url, "querying download client");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| QbitError::Request { operation, source })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| QbitError::Request { operation, source })?;
        check_status(operation, status, &body)?;
        Ok(body)
    }

    fn endpoint(&self, path: &str) -> QbitResult<Url> {
        self.api.join(path).map_err(|source| QbitError::InvalidUrl {
            value: path.to_string(),
            source,
        })
    }
}

#[async_trait]
impl SnapshotSource for QbitClient {
    async fn snapshot(&self) -> anyhow::Result<Snapshot> {
        let default_save_path = self.default_save_path().await?;
        let downloads = self.list_downloads().await?;
        info!(
            downloads = downloads.len(),
            save_path = %default_save_path,
            "fetched download client snapshot"
        );
        Ok(Snapshot {
            default_save_path,
            downloads,
        })
    }
}

#[async_trait]
impl DownloadControl for QbitClient {
    async fn pause(&self, id: &str) -> anyhow::Result<()> {
        self.torrent_command("pause", &[("hashes", id)]).await?;
        Ok(())
    }

    async fn resume(&self, id: &str) -> anyhow::Result<()> {
        self.torrent_command("resume", &[("hashes", id)]).await?;
        Ok(())
    }

    async fn delete(&self, id: &str, delete_files: bool) -> anyhow::Result<()> {
        let delete_files = if delete_files { "true" } else { "false" };
        self.torrent_command("delete", &[("hashes", id), ("deleteFiles", delete_files)])
            .await?;
        Ok(())
    }

    async fn recheck(&self, id: &str) -> anyhow::Result<()> {
        self.torrent_command("recheck", &[("hashes", id)]).await?;
        Ok(())
    }

    async fn reannounce(&self, id: &str) -> anyhow::Result<()> {
        self.torrent_command("reannounce", &[("hashes", id)]).await?;
        Ok(())
    }
}

fn api_root(base_url: &str) -> QbitResult<Url> {
    let trimmed = base_url.trim();
    let mut base = Url::parse(trimmed).map_err(|source| QbitError::InvalidUrl {
        value: trimmed.to_string(),
        source,
    })?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("api/v2/").map_err(|source| QbitError::InvalidUrl {
        value: trimmed.to_string(),
        source,
    })
}

fn check_status(operation: &'static str, status: StatusCode, body: &str) -> QbitResult<()> {
    if status == StatusCode::FORBIDDEN || body.trim() == FORBIDDEN_BODY {
        return Err(QbitError::Forbidden { operation });
    }
    if !status.is_success() {
        return Err(QbitError::Status {
            operation,
            status: status.as_u16(),
            body: body.trim().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client(server: &MockServer, dry_run: bool) -> QbitResult<QbitClient> {
        QbitClient::new(&server.base_url(), Duration::from_secs(5), dry_run)
    }

    #[test]
    fn api_root_is_normalised() -> anyhow::Result<()> {
        assert_eq!(
            api_root("http://qbit:8080")?.as_str(),
            "http://qbit:8080/api/v2/"
        );
        assert_eq!(
            api_root("http://host/qbittorrent")?.as_str(),
            "http://host/qbittorrent/api/v2/"
        );
        assert_eq!(
            api_root(" http://host/qbittorrent/ ")?.as_str(),
            "http://host/qbittorrent/api/v2/"
        );
        assert!(matches!(
            api_root("qbit"),
            Err(QbitError::InvalidUrl { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn snapshot_combines_save_path_and_listing() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let save_path = server.mock(|when, then| {
            when.method(GET).path("/api/v2/app/defaultSavePath");
            then.status(200).body("/downloads");
        });
        let info = server.mock(|when, then| {
            when.method(GET).path("/api/v2/torrents/info");
            then.status(200).json_body(json!([
                {
                    "hash": "abc",
                    "name": "Show",
                    "category": "tv",
                    "tags": "",
                    "content_path": "/downloads/Show",
                    "total_size": 2048,
                    "state": "stalledUP",
                    "ratio": 0.4
                },
                {
                    "hash": "def",
                    "name": "Leeching",
                    "category": "tv",
                    "tags": "",
                    "content_path": "/downloads/Leeching",
                    "total_size": 10,
                    "state": "downloading"
                }
            ]));
        });

        let snapshot = client(&server, false)?.snapshot().await?;
        save_path.assert();
        info.assert();
        assert_eq!(snapshot.default_save_path, "/downloads");
        assert_eq!(snapshot.downloads.len(), 1);
        assert_eq!(snapshot.downloads[0].id, "abc");
        assert!(snapshot.downloads[0].active);
        Ok(())
    }

    #[tokio::test]
    async fn forbidden_body_is_fatal() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/v2/torrents/info");
            then.status(200).body("Forbidden");
        });

        let err = client(&server, false)?.list_downloads().await.unwrap_err();
        assert!(matches!(
            err,
            QbitError::Forbidden {
                operation: "torrents.info"
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn forbidden_status_is_fatal() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/v2/app/defaultSavePath");
            then.status(403);
        });

        let err = client(&server, false)?
            .default_save_path()
            .await
            .unwrap_err();
        assert!(matches!(err, QbitError::Forbidden { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn error_status_keeps_body() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/v2/torrents/pause");
            then.status(500).body("boom");
        });

        let err = client(&server, false)?
            .torrent_command("pause", &[("hashes", "abc")])
            .await
            .unwrap_err();
        match err {
            QbitError::Status { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => anyhow::bail!("unexpected error: {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn commands_are_form_posts() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let pause = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v2/torrents/pause")
                .body("hashes=abc");
            then.status(200);
        });
        let delete = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v2/torrents/delete")
                .body("hashes=abc&deleteFiles=true");
            then.status(200);
        });
        let reannounce = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v2/torrents/reannounce")
                .body("hashes=abc");
            then.status(200);
        });

        let qbit = client(&server, false)?;
        qbit.pause("abc").await?;
        qbit.delete("abc", true).await?;
        qbit.reannounce("abc").await?;
        pause.assert();
        delete.assert();
        reannounce.assert();
        Ok(())
    }

    #[tokio::test]
    #[allow(deprecated)]
    async fn dry_run_skips_commands_but_still_reads() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let resume = server.mock(|when, then| {
            when.method(POST).path("/api/v2/torrents/resume");
            then.status(200);
        });
        let save_path = server.mock(|when, then| {
            when.method(GET).path("/api/v2/app/defaultSavePath");
            then.status(200).body("/downloads\n");
        });

        let qbit = client(&server, true)?;
        qbit.resume("abc").await?;
        qbit.recheck("abc").await?;
        assert_eq!(qbit.default_save_path().await?, "/downloads");
        assert_eq!(resume.hits(), 0);
        save_path.assert();
        Ok(())
    }
}
