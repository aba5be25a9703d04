use std::path::{Path, PathBuf};

use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("failed to serialize formula")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write formula to {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Write a recovered formula as indented JSON, replacing any previous file.
pub fn save_formula(path: &Path, formula: &Value) -> Result<(), PersistError> {
    let mut data = serde_json::to_string_pretty(formula)?;
    data.push('\n');
    std::fs::write(path, data).map_err(|source| PersistError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("formulab-{}-{name}", uuid::Uuid::now_v7()))
    }

    #[test]
    fn writes_indented_json_with_unicode_intact() {
        let path = scratch_path("formula.json");
        let formula = json!({"name": "Crème Légère", "spf": 30});

        save_formula(&path, &formula).expect("save");

        let written = std::fs::read_to_string(&path).expect("read back");
        assert!(written.contains("\n  \"name\": \"Crème Légère\""));
        assert_eq!(serde_json::from_str::<Value>(&written).unwrap(), formula);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_directory_reports_write_error() {
        let path = scratch_path("missing-dir").join("formula.json");

        let err = save_formula(&path, &json!({})).expect_err("must fail");

        match err {
            PersistError::Write { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("unexpected error variant: {:?}", other),
        }
    }
}
