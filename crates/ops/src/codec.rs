//! External-command container codec

use async_trait::async_trait;
use nxfw_config::CodecConfig;
use nxfw_errors::{ConfigError, DecodeError, Error};
use nxfw_resolver::ContainerCodec;
use nxfw_types::ContentMetadataRecord;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

const INPUT_PLACEHOLDER: &str = "{input}";
const KEYS_PLACEHOLDER: &str = "{keys}";

/// Decodes metadata blobs by running a configured decoder program
///
/// Each blob is written to a temporary file and the program is run with
/// `args`, where `{input}` is replaced by that file and `{keys}` by the key
/// file. The program must print the record as JSON on stdout.
#[derive(Debug, Clone)]
pub struct CommandCodec {
    command: String,
    args: Vec<String>,
    keys: PathBuf,
}

impl CommandCodec {
    #[must_use]
    pub fn new(command: impl Into<String>, args: Vec<String>, keys: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            args,
            keys: keys.into(),
        }
    }

    /// Build from the `[codec]` configuration section
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingField` if `codec.command` is not set.
    pub fn from_config(config: &CodecConfig, keys: &Path) -> Result<Self, Error> {
        let command = config
            .command
            .clone()
            .ok_or_else(|| ConfigError::MissingField {
                field: "codec.command".to_string(),
            })?;
        Ok(Self::new(command, config.args.clone(), keys))
    }

    fn expand_args(&self, input: &Path) -> Vec<String> {
        let input = input.to_string_lossy();
        let keys = self.keys.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace(INPUT_PLACEHOLDER, &input)
                    .replace(KEYS_PLACEHOLDER, &keys)
            })
            .collect()
    }

    fn failed(&self, message: impl Into<String>) -> DecodeError {
        DecodeError::CommandFailed {
            command: self.command.clone(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl ContainerCodec for CommandCodec {
    async fn decode(&self, blob: &[u8]) -> Result<ContentMetadataRecord, DecodeError> {
        let input = tempfile::Builder::new()
            .prefix("nxfw-")
            .suffix(".cnmt.nca")
            .tempfile()
            .map_err(|e| self.failed(format!("cannot create input file: {e}")))?;
        tokio::fs::write(input.path(), blob)
            .await
            .map_err(|e| self.failed(format!("cannot write input file: {e}")))?;

        let args = self.expand_args(input.path());
        tracing::debug!(command = %self.command, ?args, "running decoder");
        let output = Command::new(&self.command)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.failed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            return Err(self.failed(if stderr.is_empty() {
                output.status.to_string()
            } else {
                format!("{}: {stderr}", output.status)
            }));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| DecodeError::InvalidRecord {
            message: e.to_string(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use nxfw_types::{TitleId, TitleVersion};

    fn shell(script: &str) -> CommandCodec {
        CommandCodec::new(
            "sh",
            vec!["-c".to_string(), script.to_string()],
            "/keys/prod.keys",
        )
    }

    #[test]
    fn test_placeholders_are_expanded() {
        let codec = CommandCodec::new(
            "hactool",
            vec![
                "--keys".to_string(),
                "{keys}".to_string(),
                "--in={input}".to_string(),
            ],
            "/keys/prod.keys",
        );
        assert_eq!(
            codec.expand_args(Path::new("/tmp/blob")),
            vec!["--keys", "/keys/prod.keys", "--in=/tmp/blob"]
        );
    }

    #[test]
    fn test_from_config_requires_command() {
        let err = CommandCodec::from_config(&CodecConfig::default(), Path::new("k")).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingField { .. })
        ));
    }

    #[tokio::test]
    async fn test_decodes_stdout() {
        let record = ContentMetadataRecord::new(TitleId::new(0x0100_0000_0000_0816), TitleVersion::new(7));
        let blob = serde_json::to_vec(&record).unwrap();

        let decoded = shell("cat {input}").decode(&blob).await.unwrap();
        assert_eq!(decoded, record);
    }

    #[tokio::test]
    async fn test_non_zero_exit() {
        let err = shell("echo bad key >&2; exit 3").decode(b"x").await.unwrap_err();
        match err {
            DecodeError::CommandFailed { command, message } => {
                assert_eq!(command, "sh");
                assert!(message.contains("bad key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unparsable_output() {
        let err = shell("echo not json").decode(b"x").await.unwrap_err();
        assert!(matches!(err, DecodeError::InvalidRecord { .. }));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let codec = CommandCodec::new("/nonexistent/decoder", Vec::new(), "k");
        assert!(matches!(
            codec.decode(b"x").await,
            Err(DecodeError::CommandFailed { .. })
        ));
    }
}
