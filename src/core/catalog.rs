//! Read-only registry of available features

use crate::core::feature::{Feature, Priority};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// A named group of related features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Presentation color tag
    #[serde(default)]
    pub color: String,
    pub features: Vec<Feature>,
}

/// Ordered list of feature groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCatalog {
    groups: Vec<FeatureGroup>,
}

impl FeatureCatalog {
    pub fn new(groups: Vec<FeatureGroup>) -> Result<Self> {
        let catalog = Self { groups };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a catalog from a YAML list of groups
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let groups: Vec<FeatureGroup> = serde_yaml::from_str(yaml)?;
        Self::new(groups)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for feature in self.features() {
            if !seen.insert(feature.id.as_str()) {
                anyhow::bail!("Duplicate feature ID in catalog: {}", feature.id);
            }
        }
        Ok(())
    }

    pub fn groups(&self) -> &[FeatureGroup] {
        &self.groups
    }

    pub fn group(&self, id: &str) -> Option<&FeatureGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// All features in group order
    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.groups.iter().flat_map(|g| g.features.iter())
    }

    pub fn feature(&self, id: &str) -> Option<&Feature> {
        self.features().find(|f| f.id == id)
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.features.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The reference catalog shipped with the dashboard
    pub fn builtin() -> Self {
        fn feature(
            id: &str,
            name: &str,
            description: &str,
            category: &str,
            icon: &str,
            priority: Priority,
            estimated_time: u64,
        ) -> Feature {
            Feature {
                id: id.to_string(),
                name: name.to_string(),
                description: description.to_string(),
                category: category.to_string(),
                icon: icon.to_string(),
                priority,
                estimated_time,
            }
        }

        let files = "data-file-checks";
        let formatting = "formatting";
        let members = "member-validation";
        let products = "product-validation";

        let groups = vec![
            FeatureGroup {
                id: files.to_string(),
                name: "Data File Checks".to_string(),
                description: "Features for validating data file integrity and structure".to_string(),
                color: "bg-blue-500".to_string(),
                features: vec![
                    feature("1001", "check for new file", "Verify if new data files are present", files, "📄", Priority::High, 25),
                    feature("1002", "check for blank file", "Detect empty or blank data files", files, "📋", Priority::High, 20),
                    feature("1003", "check for corrupt file", "Identify corrupted or damaged files", files, "🔍", Priority::High, 30),
                    feature("1004", "Load file", "Load data file into processing system", files, "📥", Priority::Medium, 25),
                ],
            },
            FeatureGroup {
                id: formatting.to_string(),
                name: "Formatting".to_string(),
                description: "Features for data formatting and standardization".to_string(),
                color: "bg-green-500".to_string(),
                features: vec![
                    feature("1005", "check blank row", "Identify and handle blank rows in data", formatting, "📊", Priority::Medium, 20),
                    feature("1006", "check header row", "Validate header row structure and content", formatting, "🏷️", Priority::High, 25),
                    feature("1007", "check data row", "Validate data row format and structure", formatting, "📋", Priority::High, 30),
                    feature("1008", "check invalid row", "Detect and flag invalid data rows", formatting, "❌", Priority::Medium, 25),
                    feature("1014", "change date format of entire date", "Standardize date formats across dataset", formatting, "📅", Priority::Medium, 30),
                    feature("1015", "remove empty columns", "Clean up empty or unnecessary columns", formatting, "🗑️", Priority::Low, 15),
                    feature("1016", "convert number to standard number format", "Normalize numeric data formats", formatting, "🔢", Priority::Medium, 20),
                    feature("1013", "change date format of year", "Standardize year format in dates", formatting, "📆", Priority::Low, 18),
                ],
            },
            FeatureGroup {
                id: members.to_string(),
                name: "Member Validation".to_string(),
                description: "Features for validating member data and status".to_string(),
                color: "bg-purple-500".to_string(),
                features: vec![
                    feature("1009", "check if member id is new", "Verify if member ID is new to the system", members, "👤", Priority::High, 25),
                    feature("1011", "check if member id is expired", "Validate member ID expiration status", members, "⏰", Priority::Medium, 22),
                    feature("1012", "check if membership is expired", "Validate membership expiration status", members, "🎫", Priority::Medium, 20),
                ],
            },
            FeatureGroup {
                id: products.to_string(),
                name: "Product Validation".to_string(),
                description: "Features for validating product data".to_string(),
                color: "bg-orange-500".to_string(),
                features: vec![
                    feature("1010", "check if product is new", "Verify if product is new to the system", products, "📦", Priority::High, 28),
                ],
            },
        ];

        Self { groups }
    }
}

impl Default for FeatureCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
