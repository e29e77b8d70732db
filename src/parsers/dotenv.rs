//! .env file key extraction

/// Returns the variable names declared in a dotenv body, in order of
/// appearance. `export`-prefixed declarations are recognized.
pub fn parse_env_keys(content: &str) -> Vec<String> {
    let mut keys = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, _)) = line.split_once('=') else {
            continue;
        };

        let key = key.trim();
        if !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !keys.iter().any(|k| k == key)
        {
            keys.push(key.to_string());
        }
    }

    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keys() {
        let content = "\
# database
POSTGRES_HOST=localhost
POSTGRES_PORT=5432
export AWS_REGION=eu-central-1

invalid line
SPACED_KEY = value
";
        let keys = parse_env_keys(content);
        assert_eq!(
            keys,
            vec!["POSTGRES_HOST", "POSTGRES_PORT", "AWS_REGION", "SPACED_KEY"]
        );
    }

    #[test]
    fn test_duplicates_and_comments_skipped() {
        let keys = parse_env_keys("A=1\nA=2\n# B=3\n");
        assert_eq!(keys, vec!["A"]);
    }
}
