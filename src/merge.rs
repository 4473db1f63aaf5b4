
use anyhow::bail;
use indexmap::IndexMap;
use log::debug;

use crate::data_types::records::{ClassificationRecord, MergedRecord, VariantRecord};
use crate::data_types::variant_key::VariantKey;

/// Key of one merged record. In dual-sample mode the owning sample's label
/// qualifies the variant key, so identical calls from different samples never collide.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct MergedKey {
    /// Owning sample label; None in truth mode where keys are already unique
    pub sample: Option<String>,
    /// The underlying variant identity
    pub variant: VariantKey
}

/// The merged collection handed to the bucketer, plus the join diagnostics
#[derive(Clone, Debug, Default)]
pub struct MergedVariants {
    /// All merged records, in input order
    records: IndexMap<MergedKey, MergedRecord>,
    /// Truth keys that had no matching metrics record; diagnostic only
    missing_truth: Vec<VariantKey>
}

impl MergedVariants {
    /// Iterates the merged records in input order
    pub fn iter(&self) -> impl Iterator<Item = &MergedRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // getters
    pub fn records(&self) -> &IndexMap<MergedKey, MergedRecord> {
        &self.records
    }

    pub fn missing_truth(&self) -> &[VariantKey] {
        &self.missing_truth
    }
}

/// Truth mode: joins the classification stream against the metrics stream by
/// variant key. The result contains exactly the keys present in both inputs;
/// classification fields win over record fields (the namespaces are disjoint,
/// so in practice nothing collides). Truth keys without a metrics match are
/// collected as diagnostics, never fabricated and never an error.
/// # Arguments
/// * `classifications` - the truth classifier output
/// * `records` - the metrics parser output
pub fn merge_truth(
    classifications: IndexMap<VariantKey, ClassificationRecord>,
    mut records: IndexMap<VariantKey, VariantRecord>
) -> MergedVariants {
    let mut merged: IndexMap<MergedKey, MergedRecord> = Default::default();
    let mut missing_truth: Vec<VariantKey> = Default::default();

    for (key, classification) in classifications {
        match records.swap_remove(&key) {
            Some(record) => {
                let merged_record = MergedRecord::new(
                    classification.decision.to_string(),
                    classification.variant_type,
                    classification.genotype_class,
                    record.into_fields()
                );
                merged.insert(MergedKey { sample: None, variant: key }, merged_record);
            },
            None => {
                missing_truth.push(key);
            }
        }
    }

    debug!("Merged {} classified records; {} truth keys had no metrics record.", merged.len(), missing_truth.len());
    MergedVariants {
        records: merged,
        missing_truth
    }
}

/// Dual-sample mode: the union of both inputs' keys, each re-qualified with
/// its owning sample's label. Requires records from a dual-sample parse,
/// i.e. with a derived genotype class on every record.
/// # Arguments
/// * `samples` - per sample: its label and its parsed records
pub fn merge_samples(
    samples: [(String, IndexMap<VariantKey, VariantRecord>); 2]
) -> anyhow::Result<MergedVariants> {
    let mut merged: IndexMap<MergedKey, MergedRecord> = Default::default();
    for (label, records) in samples {
        for (key, record) in records {
            let (Some(variant_type), Some(genotype_class)) = (record.variant_type(), record.genotype_class()) else {
                bail!("record {key} of sample {label:?} is missing derived labels; dual-sample merging requires a dual-sample parse");
            };
            let merged_record = MergedRecord::new(
                label.clone(),
                variant_type,
                genotype_class,
                record.into_fields()
            );
            merged.insert(MergedKey { sample: Some(label.clone()), variant: key }, merged_record);
        }
    }

    debug!("Merged {} records across both samples.", merged.len());
    Ok(MergedVariants {
        records: merged,
        missing_truth: Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::class_enums::{Decision, GenotypeClass, VariantType};
    use crate::data_types::records::{FieldKey, FieldValue};

    fn make_key(pos: &str) -> VariantKey {
        VariantKey::new("1".to_string(), pos.to_string(), "A".to_string(), "C".to_string())
    }

    fn make_record(dp: f64, genotype_class: Option<GenotypeClass>) -> VariantRecord {
        let mut record = VariantRecord::new(VariantType::Snp);
        record.insert(FieldKey::Info("DP".to_string()), FieldValue::Number(dp));
        if let Some(gc) = genotype_class {
            record.set_genotype_class(gc);
        }
        record
    }

    #[test]
    fn test_merge_truth_key_intersection() {
        let mut classifications: IndexMap<VariantKey, ClassificationRecord> = Default::default();
        for pos in ["100", "200", "300"] {
            classifications.insert(make_key(pos), ClassificationRecord {
                decision: Decision::Tp,
                variant_type: VariantType::Snp,
                genotype_class: GenotypeClass::Het
            });
        }

        let mut records: IndexMap<VariantKey, VariantRecord> = Default::default();
        records.insert(make_key("100"), make_record(3.0, None));
        records.insert(make_key("300"), make_record(7.0, None));
        records.insert(make_key("400"), make_record(9.0, None)); // metrics-only, dropped

        let merged = merge_truth(classifications, records);

        // exactly the keys present in both inputs
        assert_eq!(merged.len(), 2);
        assert!(merged.records().contains_key(&MergedKey { sample: None, variant: make_key("100") }));
        assert!(merged.records().contains_key(&MergedKey { sample: None, variant: make_key("300") }));

        // the unmatched truth key is diagnostic only
        assert_eq!(merged.missing_truth(), &[make_key("200")]);

        // classification fields win and drive the group label
        let record = &merged.records()[&MergedKey { sample: None, variant: make_key("100") }];
        assert_eq!(record.group(), "TP");
        assert_eq!(record.variant_type(), VariantType::Snp);
        assert_eq!(record.metric(&FieldKey::Info("DP".to_string())), Some(3.0));
    }

    #[test]
    fn test_merge_samples_no_collision() {
        let mut sample_a: IndexMap<VariantKey, VariantRecord> = Default::default();
        sample_a.insert(make_key("100"), make_record(3.0, Some(GenotypeClass::Het)));
        sample_a.insert(make_key("200"), make_record(5.0, Some(GenotypeClass::HomAlt)));

        let mut sample_b: IndexMap<VariantKey, VariantRecord> = Default::default();
        // same variant key as sample_a, must not collide
        sample_b.insert(make_key("100"), make_record(8.0, Some(GenotypeClass::Het)));

        let merged = merge_samples([
            ("sample1".to_string(), sample_a),
            ("NA12878".to_string(), sample_b)
        ]).unwrap();
        assert_eq!(merged.len(), 3);

        let a = &merged.records()[&MergedKey { sample: Some("sample1".to_string()), variant: make_key("100") }];
        let b = &merged.records()[&MergedKey { sample: Some("NA12878".to_string()), variant: make_key("100") }];
        assert_eq!(a.group(), "sample1");
        assert_eq!(b.group(), "NA12878");
        assert_eq!(a.metric(&FieldKey::Info("DP".to_string())), Some(3.0));
        assert_eq!(b.metric(&FieldKey::Info("DP".to_string())), Some(8.0));
    }

    #[test]
    fn test_merge_samples_requires_derived_labels() {
        let mut sample_a: IndexMap<VariantKey, VariantRecord> = Default::default();
        sample_a.insert(make_key("100"), make_record(3.0, None));
        let result = merge_samples([
            ("sample1".to_string(), sample_a),
            ("NA12878".to_string(), Default::default())
        ]);
        assert!(result.is_err());
    }
}
