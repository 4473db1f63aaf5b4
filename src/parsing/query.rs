
use anyhow::Context;
use indexmap::IndexMap;
use log::debug;
use std::io::BufRead;
use std::path::Path;

use crate::data_types::class_enums::{GenotypeClass, VariantType};
use crate::data_types::records::{FieldKey, FieldValue, VariantRecord};
use crate::data_types::variant_key::VariantKey;
use crate::parsing::schema::MetricSchema;
use crate::parsing::vcf_reader::{open_call_file, split_columns};

/// Fixed column layout of the call-file body
const QUERY_COLUMNS: usize = 10;

#[derive(thiserror::Error, Debug)]
pub enum NormalizationError {
    #[error("multi-allelic site at {chrom}:{position} (ALT = {alternate:?}); inputs must be normalized to single-allele records")]
    MultiAllelic { chrom: String, position: String, alternate: String }
}

/// Explicit per-file context threaded through the parser and merge calls.
/// There is deliberately no ambient "current sample" state anywhere.
#[derive(Clone, Debug, Default)]
pub struct SampleContext {
    /// Label identifying this file's sample, derived from its filename
    pub sample_label: String,
    /// When set (dual-sample mode), the parser derives a genotype class from
    /// the leading GT sub-field and fails on anything it cannot classify
    pub derive_genotypes: bool
}

/// Parses one metrics file in a single linear pass: schema discovery from the
/// header block, then one VariantRecord per body line. The file handle is
/// released when this returns, on success or failure.
/// # Arguments
/// * `filename` - path to the .vcf(.gz) metrics file
/// * `ctx` - the sample context for this file
pub fn parse_query_file(filename: &Path, ctx: &SampleContext) -> anyhow::Result<(MetricSchema, IndexMap<VariantKey, VariantRecord>)> {
    debug!("Parsing metrics file {filename:?} as sample {:?}...", ctx.sample_label);
    let mut reader = open_call_file(filename)?;
    let schema = MetricSchema::discover(&mut reader)
        .with_context(|| format!("Error while discovering metric schema of {filename:?}:"))?;
    let records = parse_query_records(reader, ctx)
        .with_context(|| format!("Error while parsing records of {filename:?}:"))?;
    debug!("Parsed {} records from {filename:?}.", records.len());
    Ok((schema, records))
}

/// Parses the body of a metrics file, one variant per line.
/// # Arguments
/// * `reader` - a reader positioned past the column-header line
/// * `ctx` - the sample context for this file
pub fn parse_query_records(reader: impl BufRead, ctx: &SampleContext) -> anyhow::Result<IndexMap<VariantKey, VariantRecord>> {
    let mut records: IndexMap<VariantKey, VariantRecord> = Default::default();
    for (line_index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (key, record) = parse_query_line(&line, ctx)
            .with_context(|| format!("Error while parsing data line {}:", line_index + 1))?;
        records.insert(key, record);
    }
    Ok(records)
}

/// Parses one body line into its key and record
fn parse_query_line(line: &str, ctx: &SampleContext) -> anyhow::Result<(VariantKey, VariantRecord)> {
    let columns = split_columns(line, QUERY_COLUMNS)?;
    let (chrom, position, reference, alternate) = (columns[0], columns[1], columns[3], columns[4]);

    // multi-allelic sites are out of scope; a comma in ALT fails the run
    if alternate.contains(',') {
        return Err(NormalizationError::MultiAllelic {
            chrom: chrom.to_string(),
            position: position.to_string(),
            alternate: alternate.to_string()
        }.into());
    }

    let variant_type = VariantType::from_alleles(reference, alternate);
    let mut record = VariantRecord::new(variant_type);

    // INFO: semicolon-separated `key` or `key=value`; a bare key is a present flag
    let info_column = columns[7];
    if info_column != "." {
        for entry in info_column.split(';').filter(|e| !e.is_empty()) {
            match entry.split_once('=') {
                Some((name, value)) => {
                    record.insert(FieldKey::Info(name.to_string()), FieldValue::from_raw(value));
                },
                None => {
                    record.insert(FieldKey::Info(entry.to_string()), FieldValue::Flag);
                }
            }
        }
    }

    // FORMAT names are positionally paired with the genotype-value column.
    // A comma-separated sub-value is truncated to its first element for scalar
    // use, consistent with the schema's single-valued restriction.
    let format_names = columns[8].split(':');
    let genotype_values = columns[9].split(':');
    for (name, value) in format_names.zip(genotype_values) {
        let scalar = value.split(',').next().unwrap_or(value);
        record.insert(FieldKey::Format(name.to_string()), FieldValue::from_raw(scalar));
    }

    if ctx.derive_genotypes {
        let gt = columns[9].split(':').next().unwrap_or("");
        let genotype_class = GenotypeClass::from_gt(gt)
            .with_context(|| format!("Error while classifying genotype at {chrom}:{position}:"))?;
        record.set_genotype_class(genotype_class);
    }

    let key = VariantKey::new(
        chrom.to_string(), position.to_string(),
        reference.to_string(), alternate.to_string()
    );
    Ok((key, record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::class_enums::GenotypeError;
    use std::io::Cursor;

    const TEST_BODY: &str = "\
1\t229673\t.\tA\tC\t154.9\tPASS\tAC=2;AF=1;AN=2;DB;DP=3\tGT:AD:DP\t1/1:0,3:3
1\t778302\t.\tC\tCCT\t190.2\tPASS\tAC=2;AF=1;AN=2;DB;DP=2\tGT:AD:DP\t1/1:0,2:2
1\t787262\t.\tC\tG\t204.8\tPASS\tAC=2;AF=1;AN=2;DB;DP=2\tGT:AD:DP\t1/1:0,2:2
1\t787399\t.\tG\tT\t241.0\tPASS\tAC=2;AF=1;AN=2;DB;DP=10\tGT:AD:DP\t1/1:0,10:10
";

    fn dual_ctx() -> SampleContext {
        SampleContext {
            sample_label: "sample1".to_string(),
            derive_genotypes: true
        }
    }

    #[test]
    fn test_parse_query_records() {
        let records = parse_query_records(Cursor::new(TEST_BODY), &dual_ctx()).unwrap();
        assert_eq!(records.len(), 4);

        let key = VariantKey::new("1".to_string(), "229673".to_string(), "A".to_string(), "C".to_string());
        let record = records.get(&key).unwrap();
        assert_eq!(record.variant_type(), Some(VariantType::Snp));
        assert_eq!(record.genotype_class(), Some(GenotypeClass::HomAlt));
        assert_eq!(record.metric(&FieldKey::Info("AC".to_string())), Some(2.0));
        assert_eq!(record.metric(&FieldKey::Info("DP".to_string())), Some(3.0));
        assert_eq!(record.field(&FieldKey::Info("DB".to_string())), Some(&FieldValue::Flag));
        assert_eq!(record.field(&FieldKey::Format("GT".to_string())), Some(&FieldValue::Text("1/1".to_string())));
        // AD = "0,3" is truncated to its first element for scalar use
        assert_eq!(record.metric(&FieldKey::Format("AD".to_string())), Some(0.0));
        assert_eq!(record.metric(&FieldKey::Format("DP".to_string())), Some(3.0));

        // the insertion is classified by allele lengths
        let key = VariantKey::new("1".to_string(), "778302".to_string(), "C".to_string(), "CCT".to_string());
        assert_eq!(records.get(&key).unwrap().variant_type(), Some(VariantType::Indel));
    }

    #[test]
    fn test_truth_mode_skips_genotype_derivation() {
        let ctx = SampleContext::default();
        let body = "1\t100\t.\tA\tC\t50\tPASS\tDP=3\tGT:DP\t./.:3\n";
        // a genotype we could not classify is fine when we are not deriving
        let records = parse_query_records(Cursor::new(body), &ctx).unwrap();
        assert_eq!(records.values().next().unwrap().genotype_class(), None);
    }

    #[test]
    fn test_multi_allelic_fails() {
        let body = "1\t100\t.\tA\tC,G\t50\tPASS\tDP=3\tGT:DP\t1/2:3\n";
        let err = parse_query_records(Cursor::new(body), &dual_ctx()).unwrap_err();
        assert!(err.downcast_ref::<NormalizationError>().is_some());
    }

    #[test]
    fn test_unrecognized_genotype_fails() {
        let body = "1\t100\t.\tA\tC\t50\tPASS\tDP=3\tGT:DP\t0|1:3\n";
        let err = parse_query_records(Cursor::new(body), &dual_ctx()).unwrap_err();
        assert!(err.downcast_ref::<GenotypeError>().is_some());
    }

    #[test]
    fn test_missing_info_column() {
        let body = "1\t100\t.\tA\tC\t50\tPASS\t.\tGT:DP\t0/1:7\n";
        let records = parse_query_records(Cursor::new(body), &dual_ctx()).unwrap();
        let record = records.values().next().unwrap();
        assert_eq!(record.metric(&FieldKey::Format("DP".to_string())), Some(7.0));
        assert_eq!(record.metric(&FieldKey::Info("DP".to_string())), None);
    }
}
