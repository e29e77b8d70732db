//! JSON output emission

use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Serializes a value to JSON, pretty-printed or compact.
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

/// Writes rendered output to a file or stdout.
pub fn write_output(rendered: &str, output_file: Option<&Path>) -> std::io::Result<()> {
    match output_file {
        Some(path) => {
            std::fs::write(path, rendered)?;
            info!(path = %path.display(), "results written");
            Ok(())
        }
        None => {
            println!("{}", rendered);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_pretty_vs_compact() {
        let mut value = BTreeMap::new();
        value.insert("key", 1);

        let compact = to_json(&value, false).unwrap();
        let pretty = to_json(&value, true).unwrap();

        assert_eq!(compact, r#"{"key":1}"#);
        assert!(pretty.contains('\n'));
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.json");

        write_output("{}", Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}
