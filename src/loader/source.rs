//! Partition file locations and retrieval

use std::path::{Path, PathBuf};

use itertools::Itertools;

use crate::config::DataSource;
use crate::error::{CohortError, Result};
use crate::models::Entity;
use crate::utils::{log_operation_complete, log_operation_start, validate_directory};

/// Resolves and retrieves the partition files of each entity
#[derive(Debug, Clone)]
pub enum PartitionSource {
    /// Files read in place
    Local { root: PathBuf },
    /// Files downloaded once into `cache_dir` and read from there
    Remote {
        client: reqwest::Client,
        base_url: String,
        cache_dir: PathBuf,
    },
}

impl PartitionSource {
    /// Create the source described by the configuration
    #[must_use]
    pub fn new(source: &DataSource) -> Self {
        match source {
            DataSource::Local(root) => Self::Local { root: root.clone() },
            DataSource::Remote {
                base_url,
                cache_dir,
            } => Self::Remote {
                client: reqwest::Client::new(),
                base_url: base_url.trim_end_matches('/').to_string(),
                cache_dir: cache_dir.clone(),
            },
        }
    }

    /// Partitions holding `entity`
    ///
    /// Configured partitions are used as given. Otherwise a local root is
    /// scanned: `None` stands for a file directly in the root, followed by
    /// every subdirectory holding the entity file, in name order.
    pub fn partitions(&self, configured: &[String], entity: Entity) -> Result<Vec<Option<String>>> {
        if !configured.is_empty() {
            return Ok(configured.iter().cloned().map(Some).collect());
        }

        let Self::Local { root } = self else {
            return Err(CohortError::ConfigError(
                "a remote source needs at least one partition".to_string(),
            ));
        };
        validate_directory(root)?;

        let file_name = entity.file_name();
        let mut partitions = Vec::new();
        if root.join(&file_name).is_file() {
            partitions.push(None);
        }
        let subdirectories = std::fs::read_dir(root)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .filter(|path| path.join(&file_name).is_file())
            .filter_map(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
            .sorted();
        partitions.extend(subdirectories.map(Some));

        if partitions.is_empty() {
            return Err(CohortError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("No {file_name} partition files found under {}", root.display()),
            )));
        }
        Ok(partitions)
    }

    /// Local path of one partition file, downloading it first if needed
    pub async fn fetch(&self, partition: Option<&str>, entity: Entity) -> Result<PathBuf> {
        let file_name = entity.file_name();
        match self {
            Self::Local { root } => {
                let path = partition_path(root, partition, &file_name);
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(CohortError::IoError(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("Partition file not found: {}", path.display()),
                    )))
                }
            }
            Self::Remote {
                client,
                base_url,
                cache_dir,
            } => {
                let path = partition_path(cache_dir, partition, &file_name);
                if path.is_file() {
                    log::debug!("Using cached partition file {}", path.display());
                    return Ok(path);
                }
                let url = match partition {
                    Some(partition) => format!("{base_url}/{partition}/{file_name}"),
                    None => format!("{base_url}/{file_name}"),
                };
                download(client, &url, &path).await?;
                Ok(path)
            }
        }
    }
}

fn partition_path(root: &Path, partition: Option<&str>, file_name: &str) -> PathBuf {
    match partition {
        Some(partition) => root.join(partition).join(file_name),
        None => root.join(file_name),
    }
}

/// Download `url` to `path` via a temporary file in the same directory
async fn download(client: &reqwest::Client, url: &str, path: &Path) -> Result<()> {
    let start = std::time::Instant::now();
    log_operation_start("Downloading", url);

    let http_error = |source| CohortError::HttpError {
        url: url.to_string(),
        source,
    };
    let bytes = client
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(http_error)?
        .bytes()
        .await
        .map_err(http_error)?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let partial = path.with_extension("parquet.part");
    tokio::fs::write(&partial, &bytes).await?;
    tokio::fs::rename(&partial, path).await?;

    log_operation_complete("downloaded", url, bytes.len(), Some(start.elapsed()));
    Ok(())
}
