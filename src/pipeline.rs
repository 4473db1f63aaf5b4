
use anyhow::Context;
use derive_builder::Builder;
use indexmap::IndexMap;
use log::{debug, info};
use std::path::PathBuf;

use crate::cli::dist::{output_name, sample_name_from_path, DistSettings};
use crate::data_types::class_enums::{GenotypeClass, VariantType};
use crate::data_types::records::{FieldKey, VariantRecord};
use crate::data_types::variant_key::VariantKey;
use crate::dist::bucket::{bucket_metric, CategoryFilter};
use crate::merge::{merge_samples, merge_truth, MergedVariants};
use crate::parsing::happy::parse_happy_file;
use crate::parsing::query::{parse_query_file, SampleContext};
use crate::writers::report::{DistributionPlot, QcReportWriter};

/// The four category passes produced per metric
const CATEGORY_FILTERS: [CategoryFilter; 4] = [
    CategoryFilter::VariantType(VariantType::Snp),
    CategoryFilter::VariantType(VariantType::Indel),
    CategoryFilter::GenotypeClass(GenotypeClass::Het),
    CategoryFilter::GenotypeClass(GenotypeClass::HomAlt)
];

/// Controls one distribution-comparison run
#[derive(Builder, Clone, Debug, Default)]
#[builder(default)]
pub struct DistConfig {
    /// Metrics file(s): one in truth mode, two for a direct sample comparison
    query_filenames: Vec<PathBuf>,
    /// Benchmarking file; Some switches the run into truth mode
    happy_filename: Option<PathBuf>,
    /// Specific metric names to plot; None plots all discovered metrics
    requested_metrics: Option<Vec<String>>,
    /// Directory receiving the HTML report
    output_folder: PathBuf
}

impl DistConfig {
    /// Builds the run configuration from validated CLI settings
    pub fn from_settings(settings: &DistSettings) -> Result<Self, DistConfigBuilderError> {
        DistConfigBuilder::default()
            .query_filenames(settings.query_filenames.clone())
            .happy_filename(settings.happy_filenames.first().cloned())
            .requested_metrics(settings.metrics.clone())
            .output_folder(settings.output_folder.clone())
            .build()
    }
}

/// Runs the full batch pipeline: schema discovery, parse, classify, merge,
/// bucket per metric x category, percentile transform, report assembly.
/// Returns the path of the written report.
/// # Arguments
/// * `config` - the run configuration
pub fn run_dist(config: &DistConfig) -> anyhow::Result<PathBuf> {
    let truth_mode = config.happy_filename.is_some();
    let (merged, group_labels, metric_keys, input_order) = if let Some(happy_fn) = config.happy_filename.as_deref() {
        // truth mode: one metrics file joined against the benchmarking decisions
        let query_fn = &config.query_filenames[0];
        let ctx = SampleContext {
            sample_label: sample_name_from_path(query_fn),
            derive_genotypes: false
        };
        info!("Parsing query VCF {query_fn:?}...");
        let (schema, records) = parse_query_file(query_fn, &ctx)?;
        info!("Parsing hap.py VCF {happy_fn:?}...");
        let classifications = parse_happy_file(happy_fn)?;

        let (metric_keys, unavailable) = schema.usable_keys(config.requested_metrics.as_deref());
        report_unavailable(query_fn, &unavailable);

        info!("Merging decisions with metrics...");
        let merged = merge_truth(classifications, records);
        report_missing_truth(&merged);

        let group_labels = ["TP".to_string(), "FP".to_string()];
        let input_order = vec![happy_fn.to_path_buf(), query_fn.clone()];
        (merged, group_labels, metric_keys, input_order)
    } else {
        // dual-sample mode: two metrics files compared directly
        let mut parsed: Vec<(String, IndexMap<VariantKey, VariantRecord>)> = Vec::new();
        let mut metric_keys: Option<Vec<FieldKey>> = None;
        for query_fn in &config.query_filenames {
            let ctx = SampleContext {
                sample_label: sample_name_from_path(query_fn),
                derive_genotypes: true
            };
            info!("Parsing query VCF {query_fn:?}...");
            let (schema, records) = parse_query_file(query_fn, &ctx)?;

            let (usable, unavailable) = schema.usable_keys(config.requested_metrics.as_deref());
            report_unavailable(query_fn, &unavailable);

            // a metric is only plottable if both files can supply it
            metric_keys = Some(match metric_keys {
                None => usable,
                Some(previous) => previous.into_iter().filter(|k| usable.contains(k)).collect()
            });
            parsed.push((ctx.sample_label, records));
        }

        let [sample_a, sample_b]: [(String, IndexMap<VariantKey, VariantRecord>); 2] = parsed.try_into()
            .map_err(|_| anyhow::anyhow!("Dual-sample mode requires exactly two query VCFs"))?;
        let group_labels = [sample_a.0.clone(), sample_b.0.clone()];

        info!("Merging both samples...");
        let merged = merge_samples([sample_a, sample_b])?;
        let input_order = config.query_filenames.clone();
        (merged, group_labels, metric_keys.unwrap_or_default(), input_order)
    };

    info!("Bucketing {} metrics across {} merged records...", metric_keys.len(), merged.len());
    let report_name = output_name(&input_order, truth_mode);
    let title = report_name.trim_end_matches("_QCdist.html").to_string();
    let mut report = QcReportWriter::new(title);
    for metric in &metric_keys {
        for filter in CATEGORY_FILTERS {
            let series = bucket_metric(
                &merged, metric,
                [group_labels[0].as_str(), group_labels[1].as_str()],
                Some(filter)
            );
            debug!("{metric} [{filter}]: {} vs {} values", series[0].len(), series[1].len());
            report.add_plot(DistributionPlot::from_series(metric.to_string(), filter.to_string(), &series));
        }
    }

    let out_filename = config.output_folder.join(report_name);
    info!("Saving report with {} plots to {out_filename:?}...", report.num_plots());
    report.write_html(&out_filename)
        .with_context(|| format!("Error while writing report {out_filename:?}:"))?;
    Ok(out_filename)
}

/// Requested metrics absent from a file's schema; diagnostic only
fn report_unavailable(query_fn: &std::path::Path, unavailable: &[String]) {
    if !unavailable.is_empty() {
        debug!("Metrics not available in {query_fn:?}: {}", unavailable.join(","));
    }
}

/// Truth keys with no matching metrics record; diagnostic only, never an error
fn report_missing_truth(merged: &MergedVariants) {
    if !merged.missing_truth().is_empty() {
        debug!("{} truth variants had no matching query record:", merged.missing_truth().len());
        for key in merged.missing_truth() {
            debug!("\tmissing from query: {key}");
        }
    }
}
