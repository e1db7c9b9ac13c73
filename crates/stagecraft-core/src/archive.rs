//! Archive locations in object storage.
//!
//! Bucket identity and key path are separate types on purpose: the only
//! place they meet is [`ArchiveLocation::full_path`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};
use crate::run_path::{normalize, RunPathPrefix};

/// URI scheme of the object store archives are written to.
pub const OBJECT_STORE_SCHEME: &str = "s3";

/// Identity of an object-storage bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BucketName(String);

impl BucketName {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigurationError::EmptyField {
                field: "bucket".to_string(),
                context: "archive location".to_string(),
            });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BucketName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Object key prefix with no leading separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchivePath(String);

impl ArchivePath {
    pub fn new(raw: &str) -> Self {
        Self(normalize(raw).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a child segment, inserting exactly one separator.
    pub fn join(&self, child: &str) -> Self {
        let child = normalize(child);
        if self.0.is_empty() {
            return Self(child.to_string());
        }
        if self.0.ends_with('/') {
            Self(format!("{}{}", self.0, child))
        } else {
            Self(format!("{}/{}", self.0, child))
        }
    }
}

impl From<&RunPathPrefix> for ArchivePath {
    fn from(prefix: &RunPathPrefix) -> Self {
        Self::new(&prefix.to_string())
    }
}

impl fmt::Display for ArchivePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fully-qualified object-storage URI for `path` inside `bucket`.
///
/// The path is normalized again here, so callers may pass raw fragments.
pub fn full_location(bucket: &BucketName, path: &str) -> String {
    format!(
        "{}://{}/{}",
        OBJECT_STORE_SCHEME,
        bucket.as_str(),
        normalize(path)
    )
}

/// Where one assembly's archives land.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveLocation {
    bucket: BucketName,
    path: ArchivePath,
}

impl ArchiveLocation {
    pub fn new(bucket: BucketName, path: ArchivePath) -> Self {
        Self { bucket, path }
    }

    pub fn bucket(&self) -> &BucketName {
        &self.bucket
    }

    /// Normalized key prefix inside the bucket.
    pub fn artifact_path(&self) -> &ArchivePath {
        &self.path
    }

    /// `s3://<bucket>/<path>`.
    pub fn full_path(&self) -> String {
        full_location(&self.bucket, self.path.as_str())
    }
}

impl fmt::Display for ArchiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket() -> BucketName {
        BucketName::new("test-bucket").expect("bucket")
    }

    #[test]
    fn test_artifact_paths_resolved() {
        let location = ArchiveLocation::new(
            bucket(),
            ArchivePath::new("some/s3/path/myZippedApplication.zip"),
        );
        assert_eq!(
            location.artifact_path().as_str(),
            "some/s3/path/myZippedApplication.zip"
        );
        assert_eq!(
            location.full_path(),
            "s3://test-bucket/some/s3/path/myZippedApplication.zip"
        );
    }

    #[test]
    fn test_path_is_standardized() {
        let location = ArchiveLocation::new(
            bucket(),
            ArchivePath::new("//some/s3/path/myZippedApplication.zip"),
        );
        assert_eq!(
            location.artifact_path().as_str(),
            "some/s3/path/myZippedApplication.zip"
        );
        assert_eq!(
            location.full_path(),
            "s3://test-bucket/some/s3/path/myZippedApplication.zip"
        );
    }

    #[test]
    fn test_full_location_idempotent_under_normalize() {
        let b = bucket();
        for raw in ["///runs/2023", "/runs/2023", "runs/2023", "", "////"] {
            let once = full_location(&b, normalize(raw));
            let twice = full_location(&b, normalize(normalize(raw)));
            assert_eq!(once, twice);
            assert_eq!(full_location(&b, raw), once);
        }
    }

    #[test]
    fn test_empty_path_has_single_separator() {
        let location = ArchiveLocation::new(bucket(), ArchivePath::new("///"));
        assert!(location.artifact_path().is_empty());
        assert_eq!(location.full_path(), "s3://test-bucket/");
    }

    #[test]
    fn test_join_inserts_one_separator() {
        assert_eq!(ArchivePath::new("runs").join("/api").as_str(), "runs/api");
        assert_eq!(ArchivePath::new("runs/").join("api").as_str(), "runs/api");
        assert_eq!(ArchivePath::new("").join("//api").as_str(), "api");
    }

    #[test]
    fn test_blank_bucket_rejected() {
        assert!(BucketName::new(" ").is_err());
    }
}
