use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::warn;

/// Process-wide settings, read once at startup and never mutated.
#[derive(Clone)]
pub struct Config {
    /// Gemini API key. `None` when unset or empty; the gateway answers with an
    /// instruction message instead of calling the API.
    pub google_api_key: Option<String>,
    pub bot_token: String,
    /// The owner receives an audit copy of every message sent by anyone else.
    /// Usually a user id; a negative group chat id also works as the target.
    pub owner_id: i64,
}

// Hand-written so secrets never end up in logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("google_api_key", &self.google_api_key.as_ref().map(|_| "<redacted>"))
            .field("bot_token", &"<redacted>")
            .field("owner_id", &self.owner_id)
            .finish()
    }
}

impl Config {
    /// Load settings from a dotenv file. Variables already set in the process
    /// environment win over the file, like dotenv does.
    pub fn load(path: &Path) -> Result<Self> {
        let file_vars = if path.exists() {
            read_env_file(path)?
        } else {
            warn!(
                "Env file {} not found, using process environment only",
                path.display()
            );
            HashMap::new()
        };

        Self::from_lookup(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| file_vars.get(key).cloned())
        })
    }

    /// Build a config from any key lookup (environment, parsed file, test map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let google_api_key = lookup("AI_GOOGLE_API").filter(|key| !key.is_empty());

        let bot_token = lookup("BOT_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .context("BOT_TOKEN is not set")?;

        let owner_raw = lookup("OWNER_ID").context("OWNER_ID is not set")?;
        let owner_id = owner_raw
            .trim()
            .parse::<i64>()
            .with_context(|| format!("OWNER_ID must be an integer chat id, got '{}'", owner_raw))?;

        Ok(Self {
            google_api_key,
            bot_token,
            owner_id,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.google_api_key.is_some()
    }
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let entries = dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to read env file: {}", path.display()))?;

    let mut vars = HashMap::new();
    for entry in entries {
        let (key, value) =
            entry.with_context(|| format!("Failed to parse env file: {}", path.display()))?;
        vars.insert(key, value);
    }
    Ok(vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_lookup(lookup_from(&[
            ("AI_GOOGLE_API", "secret-key"),
            ("BOT_TOKEN", "123:abc"),
            ("OWNER_ID", "42"),
        ]))
        .unwrap();

        assert_eq!(config.google_api_key.as_deref(), Some("secret-key"));
        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.owner_id, 42);
        assert!(config.has_api_key());
    }

    #[test]
    fn test_api_key_is_optional() {
        let config =
            Config::from_lookup(lookup_from(&[("BOT_TOKEN", "t"), ("OWNER_ID", "1")])).unwrap();
        assert!(config.google_api_key.is_none());
        assert!(!config.has_api_key());
    }

    #[test]
    fn test_empty_api_key_counts_as_unset() {
        let config = Config::from_lookup(lookup_from(&[
            ("AI_GOOGLE_API", ""),
            ("BOT_TOKEN", "t"),
            ("OWNER_ID", "1"),
        ]))
        .unwrap();
        assert!(config.google_api_key.is_none());
    }

    #[test]
    fn test_whitespace_api_key_is_kept() {
        let config = Config::from_lookup(lookup_from(&[
            ("AI_GOOGLE_API", "  "),
            ("BOT_TOKEN", "t"),
            ("OWNER_ID", "1"),
        ]))
        .unwrap();
        assert_eq!(config.google_api_key.as_deref(), Some("  "));
    }

    #[test]
    fn test_negative_owner_id_for_group_chat() {
        let config = Config::from_lookup(lookup_from(&[
            ("BOT_TOKEN", "t"),
            ("OWNER_ID", "-1001234567890"),
        ]))
        .unwrap();
        assert_eq!(config.owner_id, -1001234567890);
    }

    #[test]
    fn test_missing_bot_token() {
        let err = Config::from_lookup(lookup_from(&[("OWNER_ID", "1")])).unwrap_err();
        assert!(err.to_string().contains("BOT_TOKEN"));
    }

    #[test]
    fn test_missing_owner_id() {
        let err = Config::from_lookup(lookup_from(&[("BOT_TOKEN", "t")])).unwrap_err();
        assert!(err.to_string().contains("OWNER_ID"));
    }

    #[test]
    fn test_non_numeric_owner_id() {
        let err = Config::from_lookup(lookup_from(&[("BOT_TOKEN", "t"), ("OWNER_ID", "me")]))
            .unwrap_err();
        assert!(err.to_string().contains("'me'"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::from_lookup(lookup_from(&[
            ("AI_GOOGLE_API", "secret-key"),
            ("BOT_TOKEN", "123:abc"),
            ("OWNER_ID", "42"),
        ]))
        .unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("secret-key"));
        assert!(!printed.contains("123:abc"));
        assert!(printed.contains("42"));
    }

    #[test]
    fn test_read_env_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# relay settings").unwrap();
        writeln!(file, "AI_GOOGLE_API=file-key").unwrap();
        writeln!(file, "BOT_TOKEN=\"999:xyz\"").unwrap();
        writeln!(file, "OWNER_ID=7").unwrap();

        let vars = read_env_file(file.path()).unwrap();
        assert_eq!(vars.get("AI_GOOGLE_API").map(String::as_str), Some("file-key"));
        assert_eq!(vars.get("BOT_TOKEN").map(String::as_str), Some("999:xyz"));
        assert_eq!(vars.get("OWNER_ID").map(String::as_str), Some("7"));

        let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
        assert_eq!(config.owner_id, 7);
    }
}
