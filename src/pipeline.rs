//! End-to-end conversion of the four sample tables into a GeoJSON map.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::category::{Category, DIR_TYPE, assign_colors};
use crate::jitter::{DEFAULT_SIGMA, Jitter, apply_jitter};
use crate::loader::load_table;
use crate::output::{FeatureCollection, write_geojson};
use crate::summary::ConversionSummary;
use crate::table::Table;

/// Paths of the four source tables.
#[derive(Debug, Clone)]
pub struct Sources {
    pub anthropogenic: PathBuf,
    pub environmental: PathBuf,
    pub meta_host: PathBuf,
    pub single_host: PathBuf,
}

impl Sources {
    /// Sources paired with their category, in merge order.
    pub fn in_order(&self) -> [(Category, &Path); 4] {
        [
            (Category::MetagenomeAnthropogenic, self.anthropogenic.as_path()),
            (Category::MetagenomeEnvironmental, self.environmental.as_path()),
            (Category::MetagenomeHostAssociated, self.meta_host.as_path()),
            (Category::SingleGenomeHostAssociated, self.single_host.as_path()),
        ]
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConvertOptions {
    pub sigma: f64,
    pub seed: Option<u64>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            sigma: DEFAULT_SIGMA,
            seed: None,
        }
    }
}

/// Loads, merges, deduplicates, jitters and colours the source tables and
/// writes the result to `output`.
///
/// Every source is read before `output` is opened, so a failed load leaves
/// an existing output file untouched.
#[tracing::instrument(skip(sources, output, options), fields(output = %output.display(), seed = ?options.seed))]
pub fn convert(
    sources: &Sources,
    output: &Path,
    options: ConvertOptions,
) -> Result<ConversionSummary> {
    let mut summary = ConversionSummary::default();

    let mut tables = Vec::with_capacity(4);
    for (category, path) in sources.in_order() {
        let table = load_table(path, category)?;
        summary.record_loaded(category, table.len());
        tables.push(table);
    }

    let mut merged = Table::concat(tables);
    summary.merged = merged.len();
    summary.duplicates_dropped = merged.dedup_except(&[DIR_TYPE]);
    info!(
        rows = merged.len(),
        dropped = summary.duplicates_dropped,
        "Merged source tables"
    );

    let mut jitter = Jitter::new(options.sigma, options.seed)?;
    apply_jitter(&mut merged, &mut jitter)?;
    assign_colors(&mut merged);

    let collection = FeatureCollection::from_table(&merged);
    summary.features = collection.features.len();
    summary.without_geometry = collection.without_geometry();
    write_geojson(output, &collection)?;

    info!(path = %output.display(), features = summary.features, "GeoJSON written");
    Ok(summary)
}
