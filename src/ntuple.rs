//! Reading of track tables dumped from the tracking ntuples
//!
//! Tracks are stored as whitespace-separated text, one track per line:
//!
//! ```text
//! # pt   eta   phi   z0   q  chi2rphi chi2rz bendchi2 nstubs hitpattern phisector genuine
//! 12.3   0.41  1.02  -2.1 1  4.2      1.3    0.8      6      63         4         1
//! ```
//!
//! The hit pattern is the integer form of [`HitPattern`]. The last column is
//! optional, and tells whether the track was matched to a real particle.

use crate::{
    numeric::Float,
    track::{HitPattern, Track},
};

use eyre::{ensure, eyre, Result, WrapErr};

use std::{fs, path::Path, str::FromStr};

/// Names of the mandatory columns, in file order
const COLUMNS: [&str; 11] = [
    "pt",
    "eta",
    "phi",
    "z0",
    "charge",
    "chi2rphi",
    "chi2rz",
    "bendchi2",
    "nstubs",
    "hitpattern",
    "phisector",
];

/// A track, along with its truth label if known
#[derive(Clone, Debug, PartialEq)]
pub struct TrackRecord {
    /// Fit summary of the track
    pub track: Track,

    /// Whether the track was matched to a real particle
    pub genuine: Option<bool>,
}

/// Load a track table from a file
pub fn load(file_name: impl AsRef<Path>) -> Result<Vec<TrackRecord>> {
    let file_name = file_name.as_ref();
    let table = fs::read_to_string(file_name)
        .wrap_err_with(|| format!("Failed to read {}", file_name.display()))?;
    let records = parse(&table).wrap_err_with(|| format!("Bad track table {}", file_name.display()))?;
    tracing::info!(
        file = %file_name.display(),
        tracks = records.len(),
        labelled = records.iter().filter(|r| r.genuine.is_some()).count(),
        "Loaded tracks"
    );
    Ok(records)
}

/// Decode a track table
pub fn parse(table: &str) -> Result<Vec<TrackRecord>> {
    table
        .lines()
        .enumerate()
        .map(|(line_idx, line)| (line_idx, line.split('#').next().unwrap_or_default()))
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(line_idx, line)| {
            parse_record(line).wrap_err_with(|| format!("Invalid track on line {}", line_idx + 1))
        })
        .collect()
}

/// Decode a single line of the track table
fn parse_record(line: &str) -> Result<TrackRecord> {
    let fields = line.split_whitespace().collect::<Vec<_>>();
    ensure!(
        fields.len() == COLUMNS.len() || fields.len() == COLUMNS.len() + 1,
        "Expected {} or {} columns, found {}",
        COLUMNS.len(),
        COLUMNS.len() + 1,
        fields.len()
    );

    // Parse a column, naming it in error messages
    let column = |idx: usize| Column {
        name: COLUMNS[idx],
        data: fields[idx],
    };

    let charge = column(4).parse::<i8>()?;
    ensure!(charge == 1 || charge == -1, "Charge must be 1 or -1, found {}", charge);
    let track = Track {
        pt: column(0).parse::<Float>()?,
        eta: column(1).parse::<Float>()?,
        phi: column(2).parse::<Float>()?,
        z0: column(3).parse::<Float>()?,
        charge,
        chi2_rphi: column(5).parse::<Float>()?,
        chi2_rz: column(6).parse::<Float>()?,
        bend_chi2: column(7).parse::<Float>()?,
        stub_count: column(8).parse::<u32>()?,
        hit_pattern: HitPattern::from_bits(column(9).parse::<u16>()?),
        phi_sector: column(10).parse::<u32>()?,
    };
    let genuine = match fields.get(COLUMNS.len()) {
        None => None,
        Some(&"0") => Some(false),
        Some(&"1") => Some(true),
        Some(other) => return Err(eyre!("Column genuine must be 0 or 1, found {}", other)),
    };
    Ok(TrackRecord { track, genuine })
}

/// A field of the track table, tagged with its column name
struct Column<'data> {
    name: &'static str,
    data: &'data str,
}
//
impl Column<'_> {
    /// Parse this field using Rust's standard parsing logic
    fn parse<T: FromStr>(self) -> Result<T>
    where
        <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
    {
        self.data
            .parse::<T>()
            .wrap_err_with(|| format!("Could not parse column {} ({:?})", self.name, self.data))
    }
}
