//! Remote sources of artifact metadata (description and licenses).
//!
//! [`MetadataSource`] is the seam the enricher works against; [`maven`] holds
//! the HTTP implementation for a Maven repository manager's redirect service.

pub mod maven;

use async_trait::async_trait;

use crate::error::MetadataLookupError;
use crate::models::{ArtifactKey, ArtifactMetadata};

#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Look up one version of an artifact.
    ///
    /// Returns `Ok(None)` when the repository answered with an HTML page
    /// instead of a POM, which means there is nothing to merge.
    async fn fetch_metadata(
        &self,
        key: &ArtifactKey,
        version: &str,
    ) -> Result<Option<ArtifactMetadata>, MetadataLookupError>;
}
