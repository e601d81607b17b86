//! Bot credential loading.

use std::io::ErrorKind;
use std::path::Path;

use crate::config::DiscordConfig;
use crate::error::CoreError;

/// Resolve the bot token: an explicit `DISCORD_TOKEN` wins, otherwise the
/// token file is read and trimmed.
pub fn load_token(config: &DiscordConfig) -> Result<String, CoreError> {
    if let Some(token) = config.token.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(token.to_string());
    }
    read_token_file(&config.token_file)
}

/// Read a token from `path`. Missing and blank files are both errors.
pub fn read_token_file(path: &Path) -> Result<String, CoreError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(CoreError::CredentialMissing(format!(
                "{} (set DISCORD_TOKEN or TOKEN_FILE)",
                path.display()
            )));
        }
        Err(e) => return Err(CoreError::Io(e)),
    };

    let token = raw.trim();
    if token.is_empty() {
        return Err(CoreError::CredentialEmpty(path.display().to_string()));
    }
    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use super::*;

    fn discord(token: Option<&str>, token_file: PathBuf) -> DiscordConfig {
        DiscordConfig {
            token: token.map(String::from),
            token_file,
            api_base: "http://localhost".to_string(),
            channel_name: "general".to_string(),
        }
    }

    #[test]
    fn reads_and_trims_token_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  abc.def.ghi  ").unwrap();
        let token = load_token(&discord(None, file.path().to_path_buf())).unwrap();
        assert_eq!(token, "abc.def.ghi");
    }

    #[test]
    fn env_token_wins_over_file() {
        let token = load_token(&discord(Some("from-env"), PathBuf::from("/nonexistent/token.txt"))).unwrap();
        assert_eq!(token, "from-env");
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_token(&discord(None, dir.path().join("token.txt"))).unwrap_err();
        assert!(matches!(err, CoreError::CredentialMissing(_)));
        assert!(err.to_string().contains("token.txt"));
    }

    #[test]
    fn blank_file_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = read_token_file(file.path()).unwrap_err();
        assert!(matches!(err, CoreError::CredentialEmpty(_)));
    }
}
