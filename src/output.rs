//! This module is in charge of reporting the outcome of a selection run to the
//! standard output and to a results file

use crate::{
    config::Configuration,
    ntuple::TrackRecord,
    numeric::{reals, Float},
    performance::{self, BinnedRates, LabelledScore, RocPoint},
    selector::Decision,
};

use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use std::{
    fs::File,
    io::{self, BufWriter, Result, Write},
    path::Path,
    time::Duration,
};

/// Default name of the results file
pub const RESULTS_FILE: &str = "quality.data";

// Number of significant digits in file output
const SIG_DIGITS: usize = (reals::DIGITS - 1) as usize;

/// Summary of a selection run
pub struct SelectionReport {
    /// Number of processed tracks
    pub num_tracks: usize,

    /// Number of tracks which passed the selection
    pub num_accepted: usize,

    /// Number of tracks with a truth label
    pub num_labelled: usize,

    /// ROC curve (empty without both genuine and fake labelled tracks)
    pub roc: Vec<RocPoint>,

    /// Rates vs. pseudorapidity
    pub vs_eta: BinnedRates,

    /// Rates vs. transverse momentum
    pub vs_pt: BinnedRates,
}
//
impl SelectionReport {
    /// Summarize the decisions taken on a set of tracks
    pub fn new(cfg: &Configuration, records: &[TrackRecord], decisions: &[Decision]) -> Self {
        assert_eq!(records.len(), decisions.len(), "Each track needs a decision");
        let num_accepted = decisions
            .iter()
            .filter(|decision| decision.accepted(cfg.mva_threshold))
            .count();
        let labelled = records
            .iter()
            .zip(decisions)
            .filter_map(|(record, decision)| {
                Some(LabelledScore {
                    score: decision.score(),
                    genuine: record.genuine?,
                    eta: record.track.eta,
                    pt: record.track.pt,
                })
            })
            .collect::<Vec<_>>();
        Self {
            num_tracks: records.len(),
            num_accepted,
            num_labelled: labelled.len(),
            roc: performance::roc_curve(&labelled, cfg.roc_points),
            vs_eta: performance::rates_vs_eta(&labelled),
            vs_pt: performance::rates_vs_pt(&labelled),
        }
    }

    /// Fraction of tracks which passed the selection
    pub fn acceptance(&self) -> Float {
        if self.num_tracks == 0 {
            0.
        } else {
            self.num_accepted as Float / self.num_tracks as Float
        }
    }
}

/// Output the selection results to the console and to disk
pub fn dump_results(
    cfg: &Configuration,
    report: &SelectionReport,
    elapsed_time: Duration,
    results_path: &Path,
) -> Result<()> {
    // Print out some final results on stdout
    println!();
    println!("Selector     : {}", cfg.selector);
    println!("Tracks       : {}", report.num_tracks);
    println!("... accepted : {}", report.num_accepted);
    println!("Acceptance   : {:.4}", report.acceptance());
    println!("Labelled     : {}", report.num_labelled);
    if let Some(point) = report
        .roc
        .iter()
        .find(|point| point.threshold >= cfg.mva_threshold)
    {
        println!(
            "At score > {:.3}: TPR {:.4} | FPR {:.4}",
            point.threshold, point.tpr, point.fpr
        );
    }
    println!("Elapsed      : {:.3}s", elapsed_time.as_secs_f64());

    // Compute a timestamp of when the run ended
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    // Write main results file
    let mut dat_file = BufWriter::new(File::create(results_path)?);
    let dat_file = &mut dat_file;
    writeln_tq(dat_file, &timestamp[..])?;
    writeln_tq(dat_file, ("Selection algorithm", cfg.selector.algorithm()))?;
    writeln_tq(dat_file, ("Selector", &cfg.selector.to_string()[..]))?;
    writeln_tq(dat_file, ("Score threshold", cfg.mva_threshold))?;
    writeln_tq(dat_file, "---------------------------------------------")?;
    writeln_tq(dat_file, ("Number of tracks", report.num_tracks))?;
    writeln_tq(dat_file, ("... after selection", report.num_accepted))?;
    writeln_tq(dat_file, ("Acceptance", report.acceptance()))?;
    writeln_tq(dat_file, ("Labelled tracks", report.num_labelled))?;
    let secs_per_track = elapsed_time.as_secs_f64() as Float / report.num_tracks.max(1) as Float;
    writeln_tq(dat_file, ("Elapsed time per track (s)", secs_per_track))?;

    // ROC curve, one working point per line
    if !report.roc.is_empty() {
        writeln_tq(dat_file, "---------------------------------------------")?;
        writeln_tq(dat_file, "ROC curve: threshold, FPR, TPR")?;
        for point in &report.roc {
            write_row(dat_file, &[point.threshold, point.fpr, point.tpr])?;
        }
    }

    // Binned rates, one bin per line
    let binned = [
        ("TPR vs eta", &report.vs_eta.tpr),
        ("FPR vs eta", &report.vs_eta.fpr),
        ("TPR vs pt", &report.vs_pt.tpr),
        ("FPR vs pt", &report.vs_pt.fpr),
    ];
    for (title, points) in binned {
        if points.is_empty() {
            continue;
        }
        writeln_tq(dat_file, "---------------------------------------------")?;
        writeln_tq(dat_file, title)?;
        for point in points.iter() {
            write_row(dat_file, &[point.low_edge, point.rate])?;
        }
    }

    dat_file.flush()?;
    tracing::info!(file = %results_path.display(), "Wrote results");
    Ok(())
}

/// Write a row of numbers in fixed-width scientific notation
fn write_row(writer: &mut impl Write, row: &[Float]) -> Result<()> {
    let decimals = (SIG_DIGITS - 1).min(7);
    for &x in row {
        write!(writer, "{:>width$.decs$e}", x, width = decimals + 8, decs = decimals)?;
    }
    writeln!(writer)
}

/// Text output facility for key/value results
fn writeln_tq(writer: &mut impl Write, data: impl WriteTq) -> Result<()> {
    write!(writer, " ")?;
    data.write(writer)?;
    writeln!(writer)
}

/// Trait implemented by things which can be written to the results file
trait WriteTq: Sized {
    /// Write down `self` to the results file
    fn write(self, writer: &mut impl Write) -> Result<()>;
}

impl WriteTq for &str {
    fn write(self, writer: &mut impl Write) -> Result<()> {
        write!(writer, "{}", self)
    }
}

impl WriteTq for usize {
    fn write(self, writer: &mut impl Write) -> Result<()> {
        write!(writer, "{}", self)
    }
}

impl WriteTq for Float {
    // Same as C's %g, up to trailing zero handling
    fn write(self, writer: &mut impl Write) -> Result<()> {
        write_engineering(writer, self, SIG_DIGITS)
    }
}

impl<T: WriteTq> WriteTq for (&str, T) {
    // Key-value output that uses fixed-size columns for better readability
    fn write(self, writer: &mut impl Write) -> Result<()> {
        write!(writer, "{:<31}: ", self.0)?;
        self.1.write(writer)
    }
}

/// Write a floating-point number using "engineering" notation
///
/// Plain notation is used for moderate magnitudes and scientific notation
/// otherwise, always with `sig_digits` significant digits.
///
fn write_engineering(writer: &mut impl Write, x: Float, sig_digits: usize) -> Result<()> {
    if x == 0. {
        return write!(writer, "0");
    }
    let magnitude = x.abs().log10();
    if !(-3. ..=sig_digits as Float).contains(&magnitude) {
        return write!(writer, "{:.1$e}", x, sig_digits - 1);
    }

    // Rust's precision counts digits after the decimal point, so it must
    // shrink as the integer part grows. Below 1, the leading zero does not
    // count as a significant digit.
    let mut decimals = (sig_digits as isize - 1 - magnitude.trunc() as isize).max(0) as usize;
    if magnitude < 0. {
        decimals += 1;
    }
    let plain = format!("{:.1$}", x, decimals);
    if plain.contains('.') {
        write!(writer, "{}", plain.trim_end_matches('0').trim_end_matches('.'))
    } else {
        write!(writer, "{}", plain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::Track;

    fn engineering(x: Float) -> String {
        let mut buffer = Vec::new();
        write_engineering(&mut buffer, x, 6).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn engineering_notation() {
        assert_eq!(engineering(0.), "0");
        assert_eq!(engineering(2.5), "2.5");
        assert_eq!(engineering(40.), "40");
        assert_eq!(engineering(0.015625), "0.015625");
        assert_eq!(engineering(1.5e-7), "1.50000e-7");
        assert_eq!(engineering(-123.25), "-123.25");
    }

    fn record(pt: Float, genuine: Option<bool>) -> TrackRecord {
        TrackRecord {
            track: Track {
                pt,
                stub_count: 5,
                ..Track::default()
            },
            genuine,
        }
    }

    #[test]
    fn report_counts() {
        let cfg = Configuration::default();
        let records = [
            record(5., Some(true)),
            record(1., Some(false)),
            record(3., Some(false)),
            record(4., None),
        ];
        let decisions = [
            Decision::Cut(true),
            Decision::Cut(false),
            Decision::Cut(true),
            Decision::Cut(true),
        ];
        let report = SelectionReport::new(&cfg, &records, &decisions);
        assert_eq!(report.num_tracks, 4);
        assert_eq!(report.num_accepted, 3);
        assert_eq!(report.num_labelled, 3);
        assert_eq!(report.acceptance(), 0.75);
        assert_eq!(report.roc.len(), cfg.roc_points);
        assert_eq!(report.roc[0].tpr, 1.);
        assert_eq!(report.roc[0].fpr, 0.5);
    }

    #[test]
    fn results_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(RESULTS_FILE);
        let cfg = Configuration::default();
        let records = [record(5., Some(true)), record(1., Some(false))];
        let decisions = [Decision::Cut(true), Decision::Cut(false)];
        let report = SelectionReport::new(&cfg, &records, &decisions);
        dump_results(&cfg, &report, Duration::from_millis(20), &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("Number of tracks"));
        assert!(contents.contains("ROC curve"));
        assert!(contents.contains("TPR vs pt"));
    }
}
