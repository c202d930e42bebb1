//! On-disk topic and channel metadata.
//!
//! The document lives at `<data_path>/nsqd.dat`. Writes go through a
//! randomly named temporary file in the same directory which is synced and
//! then renamed over the live file, so readers only ever see a complete
//! document.

use std::fs::{self, File};
use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name of the metadata document inside the data directory.
pub const METADATA_FILE_NAME: &str = "nsqd.dat";

/// Persisted broker metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Version of the daemon that wrote the document.
    #[serde(default)]
    pub version: String,
    /// Known topics.
    #[serde(default)]
    pub topics: Vec<TopicMetadata>,
}

/// Persisted state of a single topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicMetadata {
    pub name: String,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub channels: Vec<ChannelMetadata>,
}

/// Persisted state of a single channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMetadata {
    pub name: String,
    #[serde(default)]
    pub paused: bool,
}

/// Errors raised while reading or writing the metadata document.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The document exists but could not be read.
    #[error("cannot read '{path}': {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    /// The document is not valid metadata JSON.
    #[error("invalid metadata in '{path}': {source}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The document could not be encoded.
    #[error("cannot encode metadata: {0}")]
    Encode(#[source] serde_json::Error),
    /// Writing, syncing or renaming the temporary file failed.
    #[error("cannot write '{path}': {source}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Location of the metadata document within a data directory.
pub fn metadata_path(data_dir: &Utf8Path) -> Utf8PathBuf {
    data_dir.join(METADATA_FILE_NAME)
}

impl Metadata {
    /// Reads the document from `data_dir`. A missing file yields empty
    /// metadata.
    pub fn read(data_dir: &Utf8Path) -> Result<Self, MetadataError> {
        let path = metadata_path(data_dir);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(MetadataError::Read { path, source }),
        };
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&contents).map_err(|source| MetadataError::Parse { path, source })
    }

    /// Atomically replaces the document in `data_dir`.
    pub fn write<R>(&self, data_dir: &Utf8Path, rng: &mut R) -> Result<Utf8PathBuf, MetadataError>
    where
        R: Rng + ?Sized,
    {
        let encoded = serde_json::to_vec(self).map_err(MetadataError::Encode)?;
        let path = metadata_path(data_dir);
        let tmp = data_dir.join(format!("{METADATA_FILE_NAME}.{}.tmp", rng.r#gen::<u32>()));

        if let Err(source) = write_synced(&tmp, &encoded) {
            let _ = fs::remove_file(&tmp);
            return Err(MetadataError::Write { path: tmp, source });
        }
        if let Err(source) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(MetadataError::Write { path, source });
        }
        Ok(path)
    }
}

fn write_synced(path: &Utf8Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    fn utf8_dir(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("temp dir should be UTF-8")
    }

    fn sample() -> Metadata {
        Metadata {
            version: "0.1.0".to_owned(),
            topics: vec![TopicMetadata {
                name: "orders".to_owned(),
                paused: true,
                channels: vec![ChannelMetadata {
                    name: "billing".to_owned(),
                    paused: false,
                }],
            }],
        }
    }

    #[rstest]
    #[case::missing(None)]
    #[case::blank(Some("   \n"))]
    fn absent_document_reads_as_empty(#[case] contents: Option<&str>) {
        let dir = TempDir::new().expect("temp dir");
        let root = utf8_dir(&dir);
        if let Some(contents) = contents {
            fs::write(metadata_path(&root), contents).expect("write metadata");
        }
        assert_eq!(Metadata::read(&root).expect("read"), Metadata::default());
    }

    #[test]
    fn corrupt_document_is_a_parse_error() {
        let dir = TempDir::new().expect("temp dir");
        let root = utf8_dir(&dir);
        fs::write(metadata_path(&root), "{not json").expect("write metadata");
        let error = Metadata::read(&root).expect_err("corrupt metadata must fail");
        assert!(matches!(error, MetadataError::Parse { .. }));
        assert!(error.to_string().contains("nsqd.dat"));
    }

    #[test]
    fn write_replaces_document_without_leaving_temporaries() {
        let dir = TempDir::new().expect("temp dir");
        let root = utf8_dir(&dir);
        let mut rng = StdRng::seed_from_u64(7);

        sample().write(&root, &mut rng).expect("write");
        assert_eq!(Metadata::read(&root).expect("read"), sample());

        let leftovers: Vec<_> = fs::read_dir(&root)
            .expect("list dir")
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "temporary files left: {leftovers:?}");
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = TempDir::new().expect("temp dir");
        let root = utf8_dir(&dir).join("gone");
        let mut rng = StdRng::seed_from_u64(7);
        let error = sample().write(&root, &mut rng).expect_err("write must fail");
        assert!(matches!(error, MetadataError::Write { .. }));
    }
}
