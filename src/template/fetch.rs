use std::future::Future;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use log::{debug, trace, error, info};

use crate::config::TemplateSource;
use crate::error::Error;

/// Downloads a template archive to a local file.
///
/// Implementations must not resolve until every byte is on disk.
pub trait ArchiveFetcher
{   fn fetch(
      &self
    , source: &TemplateSource
    , dest: &Path
    ) -> impl Future<Output = Result<(), Error>> + Send;
}

/// Streams the branch archive over HTTP
#[derive(Debug, Clone, Default)]
pub struct HttpArchiveFetcher
{   http_client: reqwest::Client
}

impl HttpArchiveFetcher
{   pub fn new() -> Self
    {   HttpArchiveFetcher::default()
    }

    pub fn with_client(http_client: reqwest::Client) -> Self
    {   HttpArchiveFetcher
        {   http_client
        }
    }

    async fn download(
      &self
    , url: &str
    , dest: &Path
    ) -> Result<u64, Error>
    {   let mut response = self.http_client
          .get(url)
          .send()
          .await
          .map_err(|e| {
            error!("Archive request failed: {}", e);
            Error::HttpError(e.to_string())
          })?;

        let status = response.status();
        trace!("Archive response status: {}", status);
        if !status.is_success()
        {   error!("Archive download refused: {} {}", status, url);
            return Err(Error::HttpError(
              format!("{} returned {}", url, status)
            ));
        }

        let mut file = tokio::fs::File::create(dest).await
          .map_err(|e| {
            error!("Cannot create {}: {}", dest.display(), e);
            Error::Io(format!("{}: {}", dest.display(), e))
          })?;

        let mut written: u64 = 0;
        // None only once the body is exhausted
        while let Some(chunk) = response.chunk().await
          .map_err(|e| {
            error!("Archive stream interrupted: {}", e);
            Error::HttpError(e.to_string())
          })?
        {   file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        // Writer side: every accepted byte reaches the disk before we return
        file.flush().await?;
        file.sync_all().await?;
        Ok(written)
    }
}

impl ArchiveFetcher for HttpArchiveFetcher
{   async fn fetch(
      &self
    , source: &TemplateSource
    , dest: &Path
    ) -> Result<(), Error>
    {   let url = source.archive_url();
        debug!("Fetching {} into {}", url, dest.display());
        let bytes = self.download(&url, dest).await?;
        info!("Downloaded {} bytes from {}", bytes, url);
        Ok(())
    }
}
