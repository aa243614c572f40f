//! Command version extraction.

use std::path::Path;

use tokio::process::Command;

/// Run `cmd <version_flag>` and return the first line of its output.
pub async fn get_command_version(cmd: &Path, version_flag: &str) -> Option<String> {
    let output = Command::new(cmd).arg(version_flag).output().await.ok()?;

    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    // Older interpreters print their version on stderr
    let text = if stdout.trim().is_empty() {
        stderr
    } else {
        stdout
    };

    text.lines().next().map(|s| s.trim().to_string())
}

/// "Python 3.11.6" -> "3.11.6"
pub fn parse_python_version(output: &str) -> Option<String> {
    let version = output.trim().strip_prefix("Python ")?;
    Some(version.split_whitespace().next()?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_python_version() {
        assert_eq!(
            parse_python_version("Python 3.11.6"),
            Some("3.11.6".to_string())
        );
        assert_eq!(
            parse_python_version("Python 3.12.0+ (main)"),
            Some("3.12.0+".to_string())
        );
        assert_eq!(parse_python_version("pypy"), None);
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_missing_command_has_no_version() {
        let version =
            get_command_version(Path::new("/nonexistent/python-ttsdesk"), "--version").await;
        assert!(version.is_none());
    }
}
