//! GeoJSON construction and persistence.
//!
//! Every table row becomes a `Point` feature at its jittered coordinates
//! with all columns carried as properties.

use anyhow::{Context, Result};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::jitter::{PLOT_LATITUDE, PLOT_LONGITUDE};
use crate::table::{Cell, Table};

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub struct FeatureCollection<'a> {
    pub features: Vec<Feature<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub struct Feature<'a> {
    pub properties: Properties<'a>,
    pub geometry: Option<Geometry>,
}

/// `[longitude, latitude]`, EPSG:4326.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
}

/// Column name / value pairs of one row, serialised as a JSON object in
/// column order.
#[derive(Debug)]
pub struct Properties<'a> {
    columns: &'a [String],
    cells: &'a [Cell],
}

impl Serialize for Properties<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, cell) in self.columns.iter().zip(self.cells) {
            map.serialize_entry(name, cell)?;
        }
        map.end()
    }
}

impl<'a> FeatureCollection<'a> {
    /// Builds one feature per row of `table`.
    ///
    /// The geometry comes from `plot_longitude` / `plot_latitude`; a row
    /// missing either gets a null geometry.
    pub fn from_table(table: &'a Table) -> Self {
        let lon = table.column_index(PLOT_LONGITUDE);
        let lat = table.column_index(PLOT_LATITUDE);

        let features = table
            .rows()
            .iter()
            .map(|cells| {
                let coordinate = |i: Option<usize>| i.and_then(|i| cells[i].as_f64());
                let geometry = match (coordinate(lon), coordinate(lat)) {
                    (Some(x), Some(y)) => Some(Geometry::Point {
                        coordinates: [x, y],
                    }),
                    _ => None,
                };
                Feature {
                    properties: Properties {
                        columns: table.columns(),
                        cells,
                    },
                    geometry,
                }
            })
            .collect();

        FeatureCollection { features }
    }

    pub fn without_geometry(&self) -> usize {
        self.features.iter().filter(|f| f.geometry.is_none()).count()
    }
}

/// Writes `collection` to `path` as GeoJSON, replacing any existing file.
pub fn write_geojson(path: &Path, collection: &FeatureCollection<'_>) -> Result<()> {
    debug!(path = %path.display(), features = collection.features.len(), "Writing GeoJSON");

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, collection)
        .with_context(|| format!("writing {}", path.display()))?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    Ok(())
}
