use anyhow::Context;
use std::fs;
use std::path::Path;
use webvault_core::SourceRecord;

const DEMO_CATALOG: &str = include_str!("../data/catalog.json");

/// Reads catalog records from `path`, or the built-in demo catalog.
pub fn load(path: Option<&Path>) -> anyhow::Result<Vec<SourceRecord>> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read catalog {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse catalog {}", path.display()))
        }
        None => serde_json::from_str(DEMO_CATALOG).context("built-in demo catalog is invalid"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn demo_catalog_parses() {
        let records = load(None).unwrap();
        assert!(records.len() >= 5);

        let ids: HashSet<&str> = records.iter().map(|r| r.id().as_str()).collect();
        assert_eq!(ids.len(), records.len());

        assert!(records.iter().any(|r| matches!(r, SourceRecord::Listing(_))));
        assert!(records.iter().any(|r| matches!(r, SourceRecord::Detail(_))));
    }

    #[test]
    fn catalog_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(
            &path,
            r#"[{"kind":"listing","id":"x","title":"X","url":"https://x.test"}]"#,
        )
        .unwrap();

        let records = load(Some(&path)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id().as_str(), "x");
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load(Some(Path::new("/nonexistent/catalog.json"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/catalog.json"));
    }
}
