
use anyhow::Context;
use indexmap::IndexMap;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::dist::bucket::GroupSeries;
use crate::dist::percentile::percentile_ranks;

/// One plotted group: its label, values, and the percentile hover metadata
#[derive(Clone, Debug, Serialize)]
pub struct PlotTrace {
    /// Group label (decision or sample name)
    pub label: String,
    /// The metric values for this group
    pub values: Vec<f64>,
    /// Percentile rank of each value, for hover display only
    pub percentiles: Vec<f64>
}

impl From<&GroupSeries> for PlotTrace {
    fn from(series: &GroupSeries) -> Self {
        Self {
            label: series.label().to_string(),
            values: series.values().to_vec(),
            percentiles: percentile_ranks(series.values())
        }
    }
}

/// Opaque handle for one rendered distribution comparison: the two group
/// traces for one metric under one category filter.
#[derive(Clone, Debug, Serialize)]
pub struct DistributionPlot {
    /// The provenance-qualified metric name
    pub metric: String,
    /// The category label ("SNP", "INDEL", "het", "homalt")
    pub category: String,
    /// The two group traces, in group-label order
    pub traces: [PlotTrace; 2]
}

impl DistributionPlot {
    /// Builds the plot handle from two bucketed series
    /// # Arguments
    /// * `metric` - the provenance-qualified metric name
    /// * `category` - the category filter label
    /// * `series` - the two per-group series from the bucketer
    pub fn from_series(metric: String, category: String, series: &[GroupSeries; 2]) -> Self {
        Self {
            metric,
            category,
            traces: [PlotTrace::from(&series[0]), PlotTrace::from(&series[1])]
        }
    }
}

/// Accumulates plot handles keyed by metric name and assembles the HTML report.
#[derive(Debug, Default)]
pub struct QcReportWriter {
    /// Report title, shown in the document header
    title: String,
    /// Plot handles grouped per metric, in insertion order
    plots: IndexMap<String, Vec<DistributionPlot>>
}

impl QcReportWriter {
    /// Creates a new writer to accumulate plots
    pub fn new(title: String) -> Self {
        Self {
            title,
            ..Default::default()
        }
    }

    /// Adds one plot handle under its metric name
    pub fn add_plot(&mut self, plot: DistributionPlot) {
        self.plots.entry(plot.metric.clone()).or_default().push(plot);
    }

    /// Number of accumulated plots across all metrics
    pub fn num_plots(&self) -> usize {
        self.plots.values().map(|v| v.len()).sum()
    }

    /// Writes the assembled HTML document. Series data is embedded as JSON
    /// and rendered client-side; this layer only consumes labels and numbers.
    /// # Arguments
    /// * `out_filename` - path of the .html report to write
    pub fn write_html(&self, out_filename: &Path) -> anyhow::Result<()> {
        let file = File::create(out_filename)
            .with_context(|| format!("Error while creating {out_filename:?}:"))?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "<!DOCTYPE html>")?;
        writeln!(writer, "<html><head><meta charset=\"utf-8\"><title>{}</title>", self.title)?;
        writeln!(writer, "<script src=\"https://cdn.plot.ly/plotly-2.32.0.min.js\"></script>")?;
        writeln!(writer, "</head><body>")?;
        writeln!(writer, "<h1>{}</h1>", self.title)?;

        let mut plot_index = 0;
        for (metric, plots) in &self.plots {
            writeln!(writer, "<h2>{metric}</h2>")?;
            for plot in plots {
                let div_id = format!("plot{plot_index}");
                plot_index += 1;

                let payload = serde_json::to_string(plot)
                    .with_context(|| format!("Error while serializing plot data for {metric}:"))?;
                writeln!(writer, "<div id=\"{div_id}\" style=\"width:700px;height:450px;\"></div>")?;
                writeln!(writer, "<script>")?;
                writeln!(writer, "(function() {{")?;
                writeln!(writer, "  const plot = {payload};")?;
                writeln!(writer, "  const traces = plot.traces.map(t => ({{")?;
                writeln!(writer, "    type: 'violin', y: t.values, name: t.label,")?;
                writeln!(writer, "    text: t.percentiles.map(p => 'percentile: ' + p),")?;
                writeln!(writer, "    hoverinfo: 'y+text+name', box: {{ visible: true }}")?;
                writeln!(writer, "  }}));")?;
                writeln!(writer, "  Plotly.newPlot('{div_id}', traces, {{")?;
                writeln!(writer, "    title: plot.metric + ' (' + plot.category + ')'")?;
                writeln!(writer, "  }});")?;
                writeln!(writer, "}})();")?;
                writeln!(writer, "</script>")?;
            }
        }

        writeln!(writer, "</body></html>")?;
        writer.flush()
            .with_context(|| format!("Error while flushing output to {out_filename:?}:"))?;
        Ok(())
    }
}
