use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::metrics::MetricsPolicy;
use crate::records::Dataset;

const APP_DIR: &str = ".salesdash";
const DATASET_FILE: &str = "dataset.json";
const POLICY_FILE: &str = "policy.json";

/// `~/.salesdash`
pub fn default_root() -> Result<PathBuf> {
    Ok(dirs::home_dir()
        .ok_or_else(|| Error::Config("cannot determine home directory".into()))?
        .join(APP_DIR))
}

/// `~/.salesdash/data`
pub fn default_data_dir() -> Result<PathBuf> {
    Ok(default_root()?.join("data"))
}

/// `~/.salesdash/policy.json`
pub fn default_policy_path() -> Result<PathBuf> {
    Ok(default_root()?.join(POLICY_FILE))
}

/// Load a snapshot from a single dataset file or a collection directory
/// (`accounts.json`, `opportunities.json`, ...). Collection files are read
/// concurrently and a missing collection is treated as empty.
pub async fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let meta = tokio::fs::metadata(path).await.map_err(|e| {
        Error::Config(format!("cannot read snapshot at {}: {e}", path.display()))
    })?;

    let dataset = if meta.is_file() {
        load_dataset_file(path).await?
    } else if tokio::fs::try_exists(path.join(DATASET_FILE)).await? {
        load_dataset_file(&path.join(DATASET_FILE)).await?
    } else {
        load_collections(path).await?
    };

    log::info!(
        "Loaded {} records ({} accounts, {} opportunities) from {}",
        dataset.record_count(),
        dataset.accounts.len(),
        dataset.opportunities.len(),
        path.display()
    );
    Ok(dataset)
}

async fn load_dataset_file(path: &Path) -> Result<Dataset> {
    log::debug!("Reading dataset file {}", path.display());
    let text = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&text)?)
}

async fn load_collections(dir: &Path) -> Result<Dataset> {
    let (
        accounts,
        account_executives,
        opportunities,
        activities,
        support_tickets,
        stakeholders,
        usage_metrics,
        qbrs,
        account_plans,
        discount_approvals,
        quarter_targets,
        forecast_snapshots,
    ) = tokio::try_join!(
        read_collection(dir, "accounts"),
        read_collection(dir, "account_executives"),
        read_collection(dir, "opportunities"),
        read_collection(dir, "activities"),
        read_collection(dir, "support_tickets"),
        read_collection(dir, "stakeholders"),
        read_collection(dir, "usage_metrics"),
        read_collection(dir, "qbrs"),
        read_collection(dir, "account_plans"),
        read_collection(dir, "discount_approvals"),
        read_collection(dir, "quarter_targets"),
        read_collection(dir, "forecast_snapshots"),
    )?;

    Ok(Dataset {
        accounts,
        account_executives,
        opportunities,
        activities,
        support_tickets,
        stakeholders,
        usage_metrics,
        qbrs,
        account_plans,
        discount_approvals,
        quarter_targets,
        forecast_snapshots,
    })
}

async fn read_collection<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<Vec<T>> {
    let path = dir.join(format!("{name}.json"));
    let text = match tokio::fs::read_to_string(&path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("No {name} collection at {}, treating as empty", path.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    serde_json::from_str(&text)
        .map_err(|e| Error::Config(format!("invalid {}: {e}", path.display())))
}

/// Load the metrics policy.
///
/// An explicit path must exist. Without one, `~/.salesdash/policy.json` is
/// used when present and the built-in defaults otherwise.
pub async fn load_policy(explicit: Option<&Path>) -> Result<MetricsPolicy> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = default_policy_path()?;
            if !tokio::fs::try_exists(&path).await? {
                log::debug!("No policy file at {}, using defaults", path.display());
                return Ok(MetricsPolicy::DEFAULT);
            }
            path
        }
    };

    let text = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| Error::Config(format!("cannot read policy {}: {e}", path.display())))?;
    let policy = MetricsPolicy::from_json(&text)?;
    log::info!("Loaded metrics policy from {}", path.display());
    Ok(policy)
}
