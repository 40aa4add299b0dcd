// crates/contextstream-hooks/src/index_status.rs
// Read-only view of indexed-projects.json, owned by the indexing subsystem

use crate::error::{GateError, Result};
use crate::workspace;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Raw timestamp as written by the various index writers
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawTimestamp {
    Text(String),
    /// Epoch milliseconds
    Millis(i64),
}

impl RawTimestamp {
    /// Parse RFC 3339, naive date-time, plain date or epoch millis
    pub fn parse(&self) -> Option<DateTime<Utc>> {
        match self {
            RawTimestamp::Millis(ms) => Utc.timestamp_millis_opt(*ms).single(),
            RawTimestamp::Text(s) => {
                let s = s.trim();
                if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                    return Some(dt.with_timezone(&Utc));
                }
                for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
                    if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                        return Some(naive.and_utc());
                    }
                }
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|naive| naive.and_utc())
            }
        }
    }
}

/// One indexed project entry
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IndexedProjectInfo {
    #[serde(default, alias = "projectPath")]
    pub project_path: Option<String>,
    #[serde(default, alias = "indexedAt")]
    pub indexed_at: Option<RawTimestamp>,
    /// String or number depending on which client wrote the entry
    #[serde(default, alias = "projectId")]
    pub project_id: Option<serde_json::Value>,
    #[serde(default, alias = "projectName")]
    pub project_name: Option<String>,
}

impl IndexedProjectInfo {
    pub fn indexed_at(&self) -> Option<DateTime<Utc>> {
        self.indexed_at.as_ref().and_then(RawTimestamp::parse)
    }
}

/// `{ "version": 1, "projects": { "<path>": { ... } } }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexStatusFile {
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub projects: BTreeMap<String, IndexedProjectInfo>,
}

/// Result of looking a workspace up in the index
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMatch {
    /// Key of the matching entry
    pub root: PathBuf,
    pub info: IndexedProjectInfo,
    /// `None` when the timestamp is missing or unparsable
    pub age: Option<Duration>,
}

impl IndexMatch {
    /// Indexed longer ago than `stale_days`. Unknown age is not stale.
    pub fn is_stale(&self, stale_days: u64) -> bool {
        let threshold = Duration::days(stale_days.min(36_500) as i64);
        self.age.is_some_and(|age| age > threshold)
    }

    pub fn age_days(&self) -> Option<i64> {
        self.age.map(|a| a.num_days())
    }
}

/// Reader over the index-status file
#[derive(Debug, Clone)]
pub struct IndexStatusReader {
    path: PathBuf,
}

impl IndexStatusReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file. Missing file -> empty; unparsable -> `CorruptState`.
    pub fn read(&self) -> Result<IndexStatusFile> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(IndexStatusFile::default());
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&contents).map_err(|source| GateError::CorruptState {
            path: self.path.clone(),
            source,
        })
    }

    /// Find the entry covering `workspace`: the same path, or an indexed root
    /// that contains it. The most specific root wins.
    pub fn find(&self, workspace: &Path) -> Result<Option<IndexMatch>> {
        Ok(find_in(&self.read()?, workspace, Utc::now()))
    }
}

pub(crate) fn find_in(
    file: &IndexStatusFile,
    workspace_path: &Path,
    now: DateTime<Utc>,
) -> Option<IndexMatch> {
    let target = workspace::normalize(workspace_path);
    file.projects
        .iter()
        .filter(|(key, _)| !key.trim().is_empty())
        .map(|(key, info)| (workspace::normalize_str(key), info))
        .filter(|(root, _)| workspace::is_within(&target, root))
        .max_by_key(|(root, _)| root.as_os_str().len())
        .map(|(root, info)| IndexMatch {
            age: info.indexed_at().map(|at| now.signed_duration_since(at)),
            root,
            info: info.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn indexed(reader: &IndexStatusReader, path: &str) -> bool {
        reader.find(Path::new(path)).unwrap().is_some()
    }

    fn write_status(dir: &TempDir, projects: serde_json::Value) -> IndexStatusReader {
        let path = dir.path().join("indexed-projects.json");
        let json = serde_json::json!({ "version": 1, "projects": projects });
        std::fs::write(&path, json.to_string()).unwrap();
        IndexStatusReader::new(path)
    }

    #[test]
    fn test_no_status_file() {
        let temp_dir = TempDir::new().unwrap();
        let reader = IndexStatusReader::new(temp_dir.path().join("indexed-projects.json"));
        assert!(!indexed(&reader, "/some/project"));
        assert!(reader.find(Path::new("/some/project")).unwrap().is_none());
    }

    #[test]
    fn test_project_not_in_list() {
        let temp_dir = TempDir::new().unwrap();
        let reader = write_status(
            &temp_dir,
            serde_json::json!({ "/other/project": { "indexed_at": "2024-01-01" } }),
        );
        assert!(!indexed(&reader, "/some/project"));
    }

    #[test]
    fn test_project_is_indexed() {
        let temp_dir = TempDir::new().unwrap();
        let reader = write_status(
            &temp_dir,
            serde_json::json!({ "/some/project": { "indexed_at": "2024-01-01" } }),
        );
        assert!(indexed(&reader, "/some/project"));
    }

    #[test]
    fn test_trailing_slash_variations() {
        let temp_dir = TempDir::new().unwrap();
        let reader = write_status(
            &temp_dir,
            serde_json::json!({ "/some/project/": { "indexed_at": "2024-01-01" } }),
        );
        assert!(indexed(&reader, "/some/project"));
        assert!(indexed(&reader, "/some/project/"));
    }

    #[test]
    fn test_subdirectory_of_indexed_root() {
        let temp_dir = TempDir::new().unwrap();
        let reader = write_status(
            &temp_dir,
            serde_json::json!({ "/some/project": { "indexed_at": "2024-01-01" } }),
        );
        assert!(indexed(&reader, "/some/project/src/lib"));
        assert!(!indexed(&reader, "/some/project-two"));
        assert!(!indexed(&reader, "/some"));
    }

    #[test]
    fn test_invalid_json_is_corrupt_state() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("indexed-projects.json");
        std::fs::write(&path, "not valid json").unwrap();
        let reader = IndexStatusReader::new(path);

        assert!(matches!(
            reader.find(Path::new("/some/project")),
            Err(GateError::CorruptState { .. })
        ));
    }

    #[test]
    fn test_reads_all_projects_and_camel_case_fields() {
        let temp_dir = TempDir::new().unwrap();
        let reader = write_status(
            &temp_dir,
            serde_json::json!({
                "/project/a": { "indexed_at": "2024-01-01" },
                "/project/b": { "indexedAt": "2024-01-02T10:00:00Z", "projectName": "b" }
            }),
        );
        let file = reader.read().unwrap();
        assert_eq!(file.version, Some(1));
        assert_eq!(file.projects.len(), 2);
        assert_eq!(file.projects["/project/b"].project_name.as_deref(), Some("b"));
    }

    #[test]
    fn test_timestamp_formats() {
        let date = RawTimestamp::Text("2024-01-01".into()).parse().unwrap();
        assert_eq!(date.to_rfc3339(), "2024-01-01T00:00:00+00:00");

        let rfc = RawTimestamp::Text("2024-01-01T12:30:00+02:00".into())
            .parse()
            .unwrap();
        assert_eq!(rfc.to_rfc3339(), "2024-01-01T10:30:00+00:00");

        let naive = RawTimestamp::Text("2024-01-01T12:30:00.250".into()).parse();
        assert!(naive.is_some());

        let millis = RawTimestamp::Millis(1_704_067_200_000).parse().unwrap();
        assert_eq!(millis, date);

        assert!(RawTimestamp::Text("yesterday".into()).parse().is_none());
    }

    #[test]
    fn test_staleness() {
        let now = Utc::now();
        let file: IndexStatusFile = serde_json::from_value(serde_json::json!({
            "projects": {
                "/fresh": { "indexed_at": now.to_rfc3339() },
                "/old": { "indexed_at": (now - Duration::days(10)).to_rfc3339() },
                "/unknown": {}
            }
        }))
        .unwrap();

        let fresh = find_in(&file, Path::new("/fresh"), now).unwrap();
        assert!(!fresh.is_stale(7));

        let old = find_in(&file, Path::new("/old/src"), now).unwrap();
        assert!(old.is_stale(7));
        assert_eq!(old.age_days(), Some(10));

        let unknown = find_in(&file, Path::new("/unknown"), now).unwrap();
        assert!(!unknown.is_stale(7));
    }

    #[test]
    fn test_most_specific_root_wins() {
        let now = Utc::now();
        let file: IndexStatusFile = serde_json::from_value(serde_json::json!({
            "projects": {
                "/mono": { "project_name": "mono" },
                "/mono/packages/web": { "project_name": "web" }
            }
        }))
        .unwrap();

        let m = find_in(&file, Path::new("/mono/packages/web/src"), now).unwrap();
        assert_eq!(m.info.project_name.as_deref(), Some("web"));
    }
}
