//! Per-run row counts, logged and optionally printed as JSON.

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::category::Category;

/// Row counts collected over one conversion run.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ConversionSummary {
    // rows read per source table
    pub anthropogenic: usize,
    pub environmental: usize,
    pub meta_host: usize,
    pub single_host: usize,

    pub merged: usize,
    pub duplicates_dropped: usize,
    pub features: usize,
    pub without_geometry: usize,
}

impl ConversionSummary {
    /// Records the number of rows loaded for `category`.
    pub fn record_loaded(&mut self, category: Category, rows: usize) {
        let slot = match category {
            Category::MetagenomeAnthropogenic => &mut self.anthropogenic,
            Category::MetagenomeEnvironmental => &mut self.environmental,
            Category::MetagenomeHostAssociated => &mut self.meta_host,
            Category::SingleGenomeHostAssociated => &mut self.single_host,
        };
        *slot = rows;
    }

    pub fn loaded(&self) -> usize {
        self.anthropogenic + self.environmental + self.meta_host + self.single_host
    }

    /// Logs the summary as structured fields.
    pub fn log(&self) {
        info!(
            loaded = self.loaded(),
            anthropogenic = self.anthropogenic,
            environmental = self.environmental,
            meta_host = self.meta_host,
            single_host = self.single_host,
            merged = self.merged,
            duplicates_dropped = self.duplicates_dropped,
            features = self.features,
            without_geometry = self.without_geometry,
            "Conversion finished"
        );
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
