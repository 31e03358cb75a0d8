//! Authoring `deprecation_notice.json` for the current minor version.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use regex::Regex;
use tir_registry::{DeprecationNotice, MINOR_VERSION};
use tracing::info;

use crate::config::DEPRECATION_NOTICE_FILE;
use crate::error::{PublishError, PublishResult};
use crate::store::write_json;

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap())
}

fn deprecation_err(message: impl Into<String>) -> PublishError {
    PublishError::Deprecation {
        message: message.into(),
    }
}

/// Parse `YYYY-MM-DD` as UTC midnight, rejecting impossible dates.
pub fn parse_end_of_life_date(date: &str) -> PublishResult<DateTime<Utc>> {
    let invalid =
        || deprecation_err("Invalid date format. Please use YYYY-MM-DD format (e.g., 2024-12-31)");

    if !date_pattern().is_match(date) {
        return Err(invalid());
    }
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| invalid())?;
    let midnight = day.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
    Ok(Utc.from_utc_datetime(&midnight))
}

/// Write the notice under `root` with `now` as the reference time.
pub async fn add_deprecation_notice_at(
    root: &Path,
    date: &str,
    now: DateTime<Utc>,
) -> PublishResult<(PathBuf, DeprecationNotice)> {
    let path = root.join(DEPRECATION_NOTICE_FILE);
    let exists = tokio::fs::try_exists(&path)
        .await
        .map_err(|e| PublishError::io(&path, e))?;
    if exists {
        return Err(deprecation_err(format!(
            "{DEPRECATION_NOTICE_FILE} already exists; the deprecation date should not change within a minor version"
        )));
    }

    let end_of_life = parse_end_of_life_date(date.trim())?;
    if end_of_life < now {
        return Err(deprecation_err(
            "The provided date is in the past. Deprecation dates must be in the future.",
        ));
    }

    let notice = DeprecationNotice {
        end_of_life: end_of_life.timestamp(),
        version: Some(MINOR_VERSION.to_string()),
    };
    write_json(&path, &notice).await?;

    info!(
        path = %path.display(),
        date = %date,
        epoch = notice.end_of_life,
        "deprecation notice created"
    );
    Ok((path, notice))
}

/// Write the notice under `root`, refusing past dates.
pub async fn add_deprecation_notice(
    root: &Path,
    date: &str,
) -> PublishResult<(PathBuf, DeprecationNotice)> {
    add_deprecation_notice_at(root, date, Utc::now()).await
}
