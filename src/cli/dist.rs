
use anyhow::bail;
use clap::Parser;
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::cli::core::{check_optional_filename, check_required_filename};

/// Settings for the distribution comparison run
#[derive(Parser, Clone, Debug, Default, Serialize)]
#[clap(author, version, about)]
pub struct DistSettings {
    /// Metrics VCF(s) carrying the per-variant quality values; one path, or two comma-separated paths for a direct sample comparison
    #[clap(required = true)]
    #[clap(short = 'q')]
    #[clap(long = "query")]
    #[clap(value_name = "VCF[,VCF]")]
    #[clap(value_delimiter = ',')]
    #[clap(help_heading = Some("Input/Output"))]
    pub query_filenames: Vec<PathBuf>,

    /// hap.py comparison VCF carrying the TP/FP decisions; switches the run into truth mode
    #[clap(long = "happy")]
    #[clap(value_name = "VCF")]
    #[clap(value_delimiter = ',')]
    #[clap(help_heading = Some("Input/Output"))]
    pub happy_filenames: Vec<PathBuf>,

    /// Metrics to plot, comma-separated with no spaces [default: all discovered metrics]
    #[clap(short = 'm')]
    #[clap(long = "metrics")]
    #[clap(value_name = "LIST")]
    #[clap(value_delimiter = ',')]
    #[clap(help_heading = Some("Input/Output"))]
    pub metrics: Option<Vec<String>>,

    /// Output directory for the HTML report
    #[clap(short = 'o')]
    #[clap(long = "output-dir")]
    #[clap(value_name = "DIR")]
    #[clap(default_value = ".")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_folder: PathBuf,

    /// Enable verbose output; reports unavailable metrics and unmatched truth variants.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8
}

impl DistSettings {
    /// True when a benchmarking file drives the comparison
    pub fn truth_mode(&self) -> bool {
        !self.happy_filenames.is_empty()
    }
}

/// Validates the settings before the pipeline runs; every rejection here is a
/// configuration error, reported before any file is parsed.
pub fn check_dist_settings(settings: DistSettings) -> anyhow::Result<DistSettings> {
    info!("Sub-command: dist");
    info!("Inputs:");

    // exactly the valid input combinations: 1 query + 1 truth file, or 1-2 queries alone
    if settings.happy_filenames.len() > 1 {
        bail!("Only one hap.py VCF may be provided");
    }
    match (settings.query_filenames.len(), settings.truth_mode()) {
        (0, _) => bail!("At least one query VCF is required"),
        (1, true) | (2, false) => {},
        (1, false) => bail!("A second query VCF or a hap.py VCF is required for a comparison"),
        (2, true) => bail!("Only one query VCF may be provided when a hap.py VCF is given"),
        (n, _) => bail!("At most two query VCFs may be provided, found {n}")
    }

    for query_fn in &settings.query_filenames {
        check_required_filename(query_fn, "Query VCF")?;
        info!("\tQuery VCF: {query_fn:?}");
    }
    check_optional_filename(settings.happy_filenames.first().map(|p| p.as_path()), "hap.py VCF")?;

    if let Some(happy_fn) = settings.happy_filenames.first() {
        info!("\thap.py VCF: {happy_fn:?}");

        // the decisions only make sense against the sample they were scored on
        let happy_sample = sample_name_from_path(happy_fn);
        let query_sample = sample_name_from_path(&settings.query_filenames[0]);
        if happy_sample != query_sample {
            bail!("hap.py sample {happy_sample:?} does not match query sample {query_sample:?}");
        }
    } else if settings.query_filenames.len() == 2 {
        let label0 = sample_name_from_path(&settings.query_filenames[0]);
        let label1 = sample_name_from_path(&settings.query_filenames[1]);
        if label0 == label1 {
            bail!("Query VCFs resolve to the same sample name {label0:?}; group labels must be distinct");
        }
    }

    match settings.metrics.as_deref() {
        Some(metrics) => info!("\tRequested metrics: {}", metrics.join(",")),
        None => info!("\tRequested metrics: all discovered")
    }

    info!("Outputs:");
    info!("\tOutput folder: {:?}", settings.output_folder);
    info!("\tReport name: {:?}", report_filename(&settings));

    Ok(settings)
}

/// Extracts a sample name from a filename: the substring before the first `.` or `-`
/// # Arguments
/// * `path` - the file path to extract from
pub fn sample_name_from_path(path: &Path) -> String {
    let filename = path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    match filename.find(['.', '-']) {
        Some(index) => filename[..index].to_string(),
        None => filename
    }
}

/// Derived naming contract for the report: `{label1}_{label2}_QCdist.html`,
/// where label1 is "TPvsFP" in truth mode (else the first file's sample name)
/// and label2 is the second file's sample name.
/// # Arguments
/// * `filenames` - the input files in order: [truth, query] or [query1, query2]
/// * `truth_mode` - whether a benchmarking file drives the comparison
pub fn output_name(filenames: &[PathBuf], truth_mode: bool) -> String {
    let label1 = if truth_mode {
        "TPvsFP".to_string()
    } else {
        sample_name_from_path(&filenames[0])
    };
    let label2 = sample_name_from_path(&filenames[1]);
    format!("{label1}_{label2}_QCdist.html")
}

/// The report filename for a full settings struct
pub fn report_filename(settings: &DistSettings) -> String {
    let mut filenames: Vec<PathBuf> = Vec::new();
    filenames.extend(settings.happy_filenames.iter().cloned());
    filenames.extend(settings.query_filenames.iter().cloned());
    output_name(&filenames, settings.truth_mode())
}
