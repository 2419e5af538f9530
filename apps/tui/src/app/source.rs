use ipgeo_view::{IpRecord, ViewError};
use std::io::Read;
use std::path::PathBuf;
use thiserror::Error;

pub const NO_SOURCE_MESSAGE: &str = "No IP data supplied";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Record(#[from] ViewError),
}

impl From<SourceError> for ViewError {
    fn from(error: SourceError) -> Self {
        match error {
            SourceError::Record(inner) => inner,
            read @ SourceError::Read { .. } => Self::Decode(read.to_string()),
        }
    }
}

/// Where the startup record comes from. Refreshing re-reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSource {
    File(PathBuf),
    /// Stdin can only be read once, so its text is kept.
    Inline(String),
    Missing,
}

impl RecordSource {
    pub fn from_arg(arg: Option<&str>) -> Result<Self, SourceError> {
        match arg {
            None => Ok(Self::Missing),
            Some("-") => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .map_err(|source| SourceError::Read {
                        path: "stdin".to_string(),
                        source,
                    })?;
                Ok(Self::Inline(text))
            }
            Some(path) => Ok(Self::File(PathBuf::from(path))),
        }
    }

    pub async fn load(&self) -> Result<IpRecord, SourceError> {
        match self {
            Self::File(path) => {
                let text = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| SourceError::Read {
                        path: path.display().to_string(),
                        source,
                    })?;
                Ok(IpRecord::from_json(&text)?)
            }
            Self::Inline(text) => Ok(IpRecord::from_json(text)?),
            Self::Missing => Ok(IpRecord::from_error(NO_SOURCE_MESSAGE)),
        }
    }

    /// Never fails: an unreadable source becomes an error record.
    pub async fn initial_record(&self) -> IpRecord {
        match self.load().await {
            Ok(record) => record,
            Err(e) => {
                log::error!("Failed to load IP data: {e}");
                IpRecord::from_error(format!("IP data unavailable: {e}"))
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Inline(_) => "stdin".to_string(),
            Self::Missing => "none".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::Result;

    #[tokio::test]
    async fn missing_source_yields_error_record() -> Result<()> {
        let record = RecordSource::Missing.load().await?;
        assert_eq!(record.error_message(), Some(NO_SOURCE_MESSAGE));
        Ok(())
    }

    #[tokio::test]
    async fn inline_source_parses_each_time() -> Result<()> {
        let source = RecordSource::Inline(r#"{"ipv4": "1.2.3.4", "city": "Lisbon"}"#.to_string());

        let first = source.load().await?;
        let second = source.load().await?;

        assert_eq!(first.ipv4.as_deref(), Some("1.2.3.4"));
        assert_eq!(first, second);
        Ok(())
    }

    #[tokio::test]
    async fn file_source_reads_from_disk() -> Result<()> {
        let path = std::env::temp_dir().join(format!("ipgeo-record-{}.json", std::process::id()));
        tokio::fs::write(&path, r#"{"ipv4": "9.9.9.9", "latitude": 1.5, "longitude": 2.5}"#)
            .await?;

        let record = RecordSource::File(path.clone()).load().await?;
        tokio::fs::remove_file(&path).await?;

        assert_eq!(record.coordinates(), Some((1.5, 2.5)));
        Ok(())
    }

    #[tokio::test]
    async fn unreadable_file_becomes_error_panel() {
        let source = RecordSource::File(PathBuf::from("/nonexistent/ipgeo/record.json"));

        assert!(matches!(source.load().await, Err(SourceError::Read { .. })));

        let record = source.initial_record().await;
        assert!(record
            .error_message()
            .is_some_and(|message| message.starts_with("IP data unavailable")));
    }

    #[tokio::test]
    async fn malformed_text_is_a_record_error() {
        let source = RecordSource::Inline("not json".to_string());
        let error = ViewError::from(source.load().await.unwrap_err());
        assert!(matches!(error, ViewError::Decode(_)));
    }
}
