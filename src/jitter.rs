//! Gaussian jitter for marker coordinates.
//!
//! Samples sharing a site would otherwise stack on a single marker, so every
//! coordinate is redrawn from a normal distribution centred on the original
//! value.

use anyhow::{Context, Result, bail};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use tracing::warn;

use crate::table::{Cell, Table};

/// Standard deviation of the jitter in degrees (about 11 m).
pub const DEFAULT_SIGMA: f64 = 0.0001;

pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const PLOT_LATITUDE: &str = "plot_latitude";
pub const PLOT_LONGITUDE: &str = "plot_longitude";

pub struct Jitter {
    noise: Normal<f64>,
    rng: StdRng,
}

impl Jitter {
    /// Creates a sampler with standard deviation `sigma`.
    ///
    /// With `seed` set the sequence of draws is reproducible; otherwise the
    /// generator is seeded from OS entropy.
    pub fn new(sigma: f64, seed: Option<u64>) -> Result<Self> {
        let noise = Normal::new(0.0, sigma)
            .with_context(|| format!("invalid jitter standard deviation {sigma}"))?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Jitter { noise, rng })
    }

    /// Draws one sample from `Normal(value, sigma)`.
    pub fn perturb(&mut self, value: f64) -> f64 {
        value + self.noise.sample(&mut self.rng)
    }
}

/// Appends `plot_latitude` and `plot_longitude` columns holding jittered
/// copies of `latitude` and `longitude`.
///
/// All latitudes are drawn before any longitude. Null, non-numeric or
/// non-finite coordinates give a null plot coordinate.
///
/// # Errors
///
/// Returns an error if the table has no `latitude` or `longitude` column.
pub fn apply_jitter(table: &mut Table, jitter: &mut Jitter) -> Result<()> {
    for (source, target) in [(LATITUDE, PLOT_LATITUDE), (LONGITUDE, PLOT_LONGITUDE)] {
        let Some(i) = table.column_index(source) else {
            bail!("merged table has no `{source}` column");
        };

        let values: Vec<Cell> = table
            .rows()
            .iter()
            .enumerate()
            .map(|(row, cells)| match cells[i].as_f64() {
                Some(v) => Cell::Float(jitter.perturb(v)),
                None => {
                    warn!(row, column = source, value = ?cells[i], "Coordinate is not a finite number");
                    Cell::Null
                }
            })
            .collect();

        table.push_column(target, values);
    }

    Ok(())
}
