//! Dataset fetcher: download and decompress the IMDB dumps
//!
//! Black-box collaborator of the session: fetch URL -> local `.tsv.gz`,
//! decompress -> local `.tsv`, delete the archive. No retry policy.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use flate2::read::MultiGzDecoder;
use imdb_common::config::SourcesConfig;
use imdb_common::human_units::{format_bytes, format_elapsed};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{EtlError, EtlResult};

const USER_AGENT: &str = concat!("imdb-etl/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Dataset stem for the basics dump
pub const BASICS_NAME: &str = "title_basics";

/// Dataset stem for the ratings dump
pub const RATINGS_NAME: &str = "title_ratings";

/// Decompressed source files inside the raw folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFiles {
    pub basics: PathBuf,
    pub ratings: PathBuf,
}

impl SourceFiles {
    pub fn in_folder(raw_folder: &Path) -> Self {
        Self {
            basics: raw_folder.join(format!("{}.tsv", BASICS_NAME)),
            ratings: raw_folder.join(format!("{}.tsv", RATINGS_NAME)),
        }
    }

    pub fn all_present(&self) -> bool {
        self.basics.is_file() && self.ratings.is_file()
    }
}

/// Byte count and duration of one download
#[derive(Debug, Clone, Copy)]
pub struct FetchReport {
    pub bytes: u64,
    pub elapsed: Duration,
}

/// HTTP downloader for the dataset dumps
pub struct DatasetFetcher {
    http_client: reqwest::Client,
}

impl DatasetFetcher {
    pub fn new() -> EtlResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self { http_client })
    }

    /// Stream `url` into `dest`
    pub async fn fetch(&self, url: &str, dest: &Path) -> EtlResult<FetchReport> {
        let started = Instant::now();
        debug!(url = %url, dest = %dest.display(), "Downloading");

        let mut response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EtlError::Download(format!("{}: HTTP {}", url, status)));
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut bytes = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            bytes += chunk.len() as u64;
        }
        file.flush().await?;

        let report = FetchReport {
            bytes,
            elapsed: started.elapsed(),
        };
        info!(url = %url, bytes, "Download complete");
        Ok(report)
    }

    /// Download and decompress both dumps into `raw_folder`
    ///
    /// `progress` receives operator-facing status lines.
    pub async fn fetch_sources(
        &self,
        sources: &SourcesConfig,
        raw_folder: &Path,
        mut progress: impl FnMut(&str),
    ) -> EtlResult<SourceFiles> {
        imdb_common::config::ensure_dir(raw_folder)?;

        for (name, url) in [
            (BASICS_NAME, sources.basics_url.as_str()),
            (RATINGS_NAME, sources.ratings_url.as_str()),
        ] {
            let archive = raw_folder.join(format!("{}.tsv.gz", name));
            let extracted = raw_folder.join(format!("{}.tsv", name));

            progress(&format!("Downloading {} ...", url));
            let report = self.fetch(url, &archive).await?;
            progress(&format!(
                "Saved {} ({} in {})",
                archive.display(),
                format_bytes(report.bytes),
                format_elapsed(report.elapsed)
            ));

            progress(&format!("Decompressing {} ...", archive.display()));
            let size = gunzip(&archive, &extracted)?;
            progress(&format!(
                "Decompressed to {} ({})",
                extracted.display(),
                format_bytes(size)
            ));

            std::fs::remove_file(&archive)?;
            progress(&format!("Removed archive {}", archive.display()));
        }

        Ok(SourceFiles::in_folder(raw_folder))
    }
}

/// Decompress a (possibly multi-member) gzip file; returns decompressed size
pub fn gunzip(source: &Path, dest: &Path) -> EtlResult<u64> {
    let input = BufReader::new(File::open(source)?);
    let mut decoder = MultiGzDecoder::new(input);
    let mut output = BufWriter::new(File::create(dest)?);

    let bytes = std::io::copy(&mut decoder, &mut output)?;
    output.flush()?;

    debug!(source = %source.display(), bytes, "Decompressed");
    Ok(bytes)
}
