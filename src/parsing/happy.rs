
use anyhow::{anyhow, Context};
use indexmap::IndexMap;
use log::debug;
use rustc_hash::FxHashMap as HashMap;
use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;

use crate::data_types::class_enums::{Decision, GenotypeClass, VariantType};
use crate::data_types::records::ClassificationRecord;
use crate::data_types::variant_key::VariantKey;
use crate::parsing::vcf_reader::{open_call_file, split_columns};

/// The benchmarking file carries two sample columns (truth, query)
const HAPPY_COLUMNS: usize = 11;
/// Query sample column, the one carrying the decisions we classify
const QUERY_SAMPLE_COLUMN: usize = 10;

/// Sub-field names in the query sample's FORMAT descriptor. Their order is
/// not fixed by the benchmarking tool, so they are always resolved by name.
const DECISION_FIELD: &str = "BD";
const VARIANT_TYPE_FIELD: &str = "BVT";
const GENOTYPE_CLASS_FIELD: &str = "BLT";

/// Streams a benchmarking-comparison file into one ClassificationRecord per
/// variant key. Comment/header lines are skipped. The file handle is released
/// when this returns, on success or failure.
/// # Arguments
/// * `filename` - path to the benchmarking .vcf(.gz) file
pub fn parse_happy_file(filename: &Path) -> anyhow::Result<IndexMap<VariantKey, ClassificationRecord>> {
    debug!("Parsing benchmarking file {filename:?}...");
    let reader = open_call_file(filename)?;
    let records = parse_happy_records(reader)
        .with_context(|| format!("Error while parsing records of {filename:?}:"))?;
    debug!("Classified {} records from {filename:?}.", records.len());
    Ok(records)
}

/// Parses the benchmarking file body from an open reader.
/// # Arguments
/// * `reader` - a reader positioned at the first line of the file
pub fn parse_happy_records(reader: impl BufRead) -> anyhow::Result<IndexMap<VariantKey, ClassificationRecord>> {
    let mut records: IndexMap<VariantKey, ClassificationRecord> = Default::default();
    for (line_index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parsed = parse_happy_line(&line)
            .with_context(|| format!("Error while parsing data line {}:", line_index + 1))?;
        if let Some((key, record)) = parsed {
            records.insert(key, record);
        }
    }
    Ok(records)
}

/// Parses one truth line. Returns None for rows whose variant-type label is
/// outside SNP/INDEL (e.g. no-call padding rows), which carry nothing we bucket.
fn parse_happy_line(line: &str) -> anyhow::Result<Option<(VariantKey, ClassificationRecord)>> {
    let columns = split_columns(line, HAPPY_COLUMNS)?;
    let (chrom, position, reference, alternate) = (columns[0], columns[1], columns[3], columns[4]);

    // the descriptor's field order drifts between tool versions; build a
    // name -> index map per line and never assume a fixed position
    let field_index: HashMap<&str, usize> = columns[8].split(':')
        .enumerate()
        .map(|(index, name)| (name, index))
        .collect();
    let query_values: Vec<&str> = columns[QUERY_SAMPLE_COLUMN].split(':').collect();
    let lookup = |field: &str| -> Option<&str> {
        field_index.get(field).and_then(|&index| query_values.get(index).copied())
    };

    let decision_label = lookup(DECISION_FIELD)
        .ok_or_else(|| anyhow!("query sample is missing the {DECISION_FIELD} sub-field at {chrom}:{position}"))?;
    let variant_type_label = lookup(VARIANT_TYPE_FIELD)
        .ok_or_else(|| anyhow!("query sample is missing the {VARIANT_TYPE_FIELD} sub-field at {chrom}:{position}"))?;
    let genotype_class_label = lookup(GENOTYPE_CLASS_FIELD)
        .ok_or_else(|| anyhow!("query sample is missing the {GENOTYPE_CLASS_FIELD} sub-field at {chrom}:{position}"))?;

    let variant_type = match VariantType::from_str(variant_type_label) {
        Ok(vt) => vt,
        Err(_) => {
            // no-call rows are padding from the benchmarking tool, not variants
            debug!("Skipping {chrom}:{position} with variant-type label {variant_type_label:?}");
            return Ok(None);
        }
    };

    let record = ClassificationRecord {
        decision: Decision::from_label(decision_label),
        variant_type,
        genotype_class: GenotypeClass::from_label(genotype_class_label)
    };
    let key = VariantKey::new(
        chrom.to_string(), position.to_string(),
        reference.to_string(), alternate.to_string()
    );
    Ok(Some((key, record)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TEST_HAPPY: &str = "\
##fileformat=VCFv4.1
##FORMAT=<ID=BD,Number=1,Type=String,Description=\"Decision for call (TP/FP/FN/N)\">
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tTRUTH\tQUERY
1\t949608\t.\tA\tC\t.\tPASS\t.\tGT:BD:BK:BVT:BLT\t0/1:TP:gm:SNP:het\t0/1:TP:gm:SNP:het
1\t949654\t.\tA\tG\t.\tPASS\t.\tGT:BD:BK:BVT:BLT\t1/1:TP:gm:SNP:homalt\t1/1:TP:gm:SNP:homalt
1\t981931\t.\tA\tG\t.\tPASS\t.\tBD:BVT:BLT:GT\tTP:SNP:het:0/1\tTP:SNP:het:0/1
1\t982994\t.\tT\tC\t.\tPASS\t.\tGT:BD:BK:BVT:BLT\t0/1:TP:gm:SNP:het\t0/1:FP:.:SNP:het
1\t983452\t.\tG\tGT\t.\tPASS\t.\tGT:BD:BK:BVT:BLT\t0/1:TP:gm:INDEL:het\t0/1:UNK:.:INDEL:het
1\t984302\t.\tT\tC\t.\tPASS\t.\tGT:BD:BK:BVT:BLT\t./.:N:.:NOCALL:nocall\t./.:N:.:NOCALL:nocall
";

    #[test]
    fn test_parse_happy_records() {
        let records = parse_happy_records(Cursor::new(TEST_HAPPY)).unwrap();
        // the NOCALL padding row is skipped
        assert_eq!(records.len(), 5);

        let key = VariantKey::new("1".to_string(), "949608".to_string(), "A".to_string(), "C".to_string());
        assert_eq!(records.get(&key).unwrap(), &ClassificationRecord {
            decision: Decision::Tp,
            variant_type: VariantType::Snp,
            genotype_class: GenotypeClass::Het
        });

        let key = VariantKey::new("1".to_string(), "949654".to_string(), "A".to_string(), "G".to_string());
        assert_eq!(records.get(&key).unwrap().genotype_class, GenotypeClass::HomAlt);

        // the scrambled descriptor row still resolves by name
        let key = VariantKey::new("1".to_string(), "981931".to_string(), "A".to_string(), "G".to_string());
        assert_eq!(records.get(&key).unwrap(), &ClassificationRecord {
            decision: Decision::Tp,
            variant_type: VariantType::Snp,
            genotype_class: GenotypeClass::Het
        });

        // the decision comes from the query column, not truth
        let key = VariantKey::new("1".to_string(), "982994".to_string(), "T".to_string(), "C".to_string());
        assert_eq!(records.get(&key).unwrap().decision, Decision::Fp);

        let key = VariantKey::new("1".to_string(), "983452".to_string(), "G".to_string(), "GT".to_string());
        assert_eq!(records.get(&key).unwrap(), &ClassificationRecord {
            decision: Decision::Unk,
            variant_type: VariantType::Indel,
            genotype_class: GenotypeClass::Het
        });
    }

    #[test]
    fn test_missing_decision_field_fails() {
        let body = "1\t100\t.\tA\tC\t.\tPASS\t.\tGT:BVT:BLT\t0/1:SNP:het\t0/1:SNP:het\n";
        let err = parse_happy_records(Cursor::new(body)).unwrap_err();
        assert!(format!("{err:#}").contains("BD"));
    }
}
