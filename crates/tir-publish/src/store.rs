//! On-disk issuer records under `issuers/x509_aki/<aki>.json`.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::aggregate::IssuerMap;
use crate::error::{PublishError, PublishResult};

const JSON_EXTENSION: &str = "json";

/// File counts from one [`IssuerStore::reconcile`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub deleted: usize,
    pub created: usize,
    pub updated: usize,
}

impl ReconcileSummary {
    pub fn is_unchanged(&self) -> bool {
        self.deleted == 0 && self.created == 0 && self.updated == 0
    }
}

/// Serialize as 2-space indented JSON with a trailing newline.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> PublishResult<String> {
    let mut text = serde_json::to_string_pretty(value).map_err(|e| PublishError::Json {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    text.push('\n');
    Ok(text)
}

/// Read and parse a JSON file.
pub async fn read_json(path: &Path) -> PublishResult<JsonValue> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| PublishError::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| PublishError::Json {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Write `value` as formatted JSON.
pub async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> PublishResult<()> {
    let text = to_pretty_json(value, path)?;
    tokio::fs::write(path, text)
        .await
        .map_err(|e| PublishError::io(path, e))
}

/// Directory of per-issuer JSON files.
#[derive(Debug, Clone)]
pub struct IssuerStore {
    dir: PathBuf,
}

impl IssuerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, aki: &str) -> PathBuf {
        self.dir.join(format!("{aki}.{JSON_EXTENSION}"))
    }

    /// AKIs with a stored file, sorted.
    pub async fn stored_akis(&self) -> PublishResult<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| PublishError::io(&self.dir, e))?;

        let mut akis = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PublishError::io(&self.dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(JSON_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                akis.push(stem.to_string());
            }
        }
        akis.sort();
        Ok(akis)
    }

    /// Bring the directory in line with `issuers`.
    ///
    /// Files for unknown AKIs are deleted and new AKIs get a full record.
    /// Existing files only have `certificates` replaced, and only when its
    /// serialized form differs; every other stored field is kept.
    pub async fn reconcile(&self, issuers: &IssuerMap) -> PublishResult<ReconcileSummary> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PublishError::io(&self.dir, e))?;

        let mut summary = ReconcileSummary::default();

        for aki in self.stored_akis().await? {
            if issuers.contains_key(&aki) {
                continue;
            }
            let path = self.path_for(&aki);
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| PublishError::io(&path, e))?;
            debug!(aki = %aki, "deleted issuer file");
            summary.deleted += 1;
        }

        for (aki, record) in issuers {
            let path = self.path_for(aki);
            let exists = tokio::fs::try_exists(&path)
                .await
                .map_err(|e| PublishError::io(&path, e))?;

            if !exists {
                write_json(&path, record).await?;
                debug!(aki = %aki, "created issuer file");
                summary.created += 1;
                continue;
            }

            let mut stored = read_json(&path).await?;
            let fresh = serde_json::to_value(&record.certificates).map_err(|e| PublishError::Json {
                path: path.clone(),
                message: e.to_string(),
            })?;
            if serialized(stored.get("certificates")) == serialized(Some(&fresh)) {
                continue;
            }

            let JsonValue::Object(fields) = &mut stored else {
                return Err(PublishError::Json {
                    path,
                    message: "issuer file is not a JSON object".to_string(),
                });
            };
            fields.insert("certificates".to_string(), fresh);
            write_json(&path, &stored).await?;
            debug!(aki = %aki, "updated issuer certificates");
            summary.updated += 1;
        }

        log_summary(&summary);
        Ok(summary)
    }
}

fn serialized(value: Option<&JsonValue>) -> Option<String> {
    value.map(JsonValue::to_string)
}

fn log_summary(summary: &ReconcileSummary) {
    if summary.is_unchanged() {
        info!("No changes made to issuer files");
        return;
    }
    if summary.deleted > 0 {
        info!(count = summary.deleted, "deleted issuer files");
    }
    if summary.created > 0 {
        info!(count = summary.created, "created issuer files");
    }
    if summary.updated > 0 {
        info!(count = summary.updated, "updated issuer files");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tir_registry::{
        CertificateEntry, CertificateFormat, DisplayInfo, EntityMetadata, IssuerRecord,
    };

    fn record(aki: &str, pems: &[&str]) -> IssuerRecord {
        IssuerRecord {
            issuer_id: format!("x509_aki:{aki}"),
            entity_type: "government".to_string(),
            entity_metadata: EntityMetadata {
                country: "US".to_string(),
                region: Some("CA".to_string()),
                government_level: "state".to_string(),
                official_name: "California DMV".to_string(),
            },
            display: DisplayInfo {
                name: "California DMV".to_string(),
            },
            certificates: pems
                .iter()
                .map(|pem| CertificateEntry {
                    data: pem.to_string(),
                    format: CertificateFormat::Pem,
                    trust_lists: vec!["uv".to_string()],
                })
                .collect(),
            signature: None,
            extra: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_reconcile_creates_directory_and_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = IssuerStore::new(tmp.path().join("issuers").join("x509_aki"));

        let mut issuers = IssuerMap::new();
        issuers.insert("AAA".to_string(), record("AAA", &["pem-1"]));

        let summary = store.reconcile(&issuers).await.unwrap();
        assert_eq!(
            summary,
            ReconcileSummary {
                deleted: 0,
                created: 1,
                updated: 0
            }
        );

        let text = std::fs::read_to_string(store.path_for("AAA")).unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.contains("\n  \"issuer_id\": \"x509_aki:AAA\""));
    }

    #[tokio::test]
    async fn test_reconcile_second_run_is_unchanged() {
        let tmp = tempfile::tempdir().unwrap();
        let store = IssuerStore::new(tmp.path());

        let mut issuers = IssuerMap::new();
        issuers.insert("AAA".to_string(), record("AAA", &["pem-1"]));

        store.reconcile(&issuers).await.unwrap();
        let summary = store.reconcile(&issuers).await.unwrap();
        assert!(summary.is_unchanged());
    }

    #[tokio::test]
    async fn test_reconcile_updates_only_certificates() {
        let tmp = tempfile::tempdir().unwrap();
        let store = IssuerStore::new(tmp.path());

        let mut stored = serde_json::to_value(record("AAA", &["pem-1"])).unwrap();
        stored["display"]["name"] = "Hand-edited name".into();
        stored["signature"] = "c2lnbmF0dXJl".into();
        write_json(&store.path_for("AAA"), &stored).await.unwrap();

        let mut issuers = IssuerMap::new();
        issuers.insert("AAA".to_string(), record("AAA", &["pem-1", "pem-2"]));

        let summary = store.reconcile(&issuers).await.unwrap();
        assert_eq!(summary.updated, 1);

        let after = read_json(&store.path_for("AAA")).await.unwrap();
        assert_eq!(after["display"]["name"], "Hand-edited name");
        assert_eq!(after["signature"], "c2lnbmF0dXJl");
        assert_eq!(after["certificates"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_reconcile_deletes_unknown_and_ignores_other_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = IssuerStore::new(tmp.path());
        write_json(&store.path_for("GONE"), &record("GONE", &["pem-x"]))
            .await
            .unwrap();
        std::fs::write(tmp.path().join("README.md"), "notes").unwrap();

        let summary = store.reconcile(&IssuerMap::new()).await.unwrap();
        assert_eq!(summary.deleted, 1);
        assert!(!store.path_for("GONE").exists());
        assert!(tmp.path().join("README.md").exists());
    }
}
