//! YAML case manifests
//!
//! A manifest lists named footprint requests for the verification binaries.

use copyable_footprints::{FootprintError, ResourceDescription};
use serde::{Deserialize, Serialize};

/// A named footprint request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootprintCase {
    /// Case identifier used in reports
    pub name: String,
    /// The resource to lay out
    pub resource: ResourceDescription,
    /// First subresource of the request
    #[serde(default)]
    pub first: u32,
    /// Number of subresources; all remaining subresources when omitted
    #[serde(default)]
    pub count: Option<u32>,
    /// Offset at which the caller places the data
    #[serde(default)]
    pub base_offset: u64,
    /// Expected total span, checked against the core when present
    #[serde(default)]
    pub expected_total_bytes: Option<u64>,
}

impl FootprintCase {
    /// Number of subresources this case requests
    pub fn resolved_count(&self) -> Result<u32, FootprintError> {
        match self.count {
            Some(count) => Ok(count),
            None => Ok(self.resource.subresource_count()?.saturating_sub(self.first)),
        }
    }
}

/// A list of footprint cases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseManifest {
    /// Cases in run order
    pub cases: Vec<FootprintCase>,
}

impl CaseManifest {
    /// Parses a case manifest from YAML content
    ///
    /// # Arguments
    /// * `yaml_content` - YAML string containing the manifest
    pub fn from_yaml(yaml_content: &str) -> Result<Self, serde_norway::Error> {
        serde_norway::from_str(yaml_content)
    }

    /// Parses a case manifest from a YAML file
    ///
    /// # Arguments
    /// * `path` - Path to the YAML manifest file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_yaml(&content)?)
    }
}
