
use crate::data_types::class_enums::{GenotypeClass, VariantType};
use crate::data_types::records::{FieldKey, MergedRecord};
use crate::merge::MergedVariants;

/// At most one category filter applies to a bucketing pass: a variant-type
/// filter or a genotype-class filter. Supplying both at once is a caller
/// contract violation, which this enum makes unrepresentable.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CategoryFilter {
    VariantType(VariantType),
    GenotypeClass(GenotypeClass)
}

impl CategoryFilter {
    /// Returns true if the record belongs to this category
    pub fn matches(&self, record: &MergedRecord) -> bool {
        match self {
            CategoryFilter::VariantType(vt) => record.variant_type() == *vt,
            CategoryFilter::GenotypeClass(gc) => record.genotype_class() == *gc
        }
    }
}

impl std::fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryFilter::VariantType(vt) => write!(f, "{vt}"),
            CategoryFilter::GenotypeClass(gc) => write!(f, "{gc}")
        }
    }
}

/// One ordered numeric series for one group label. The label travels with the
/// values (the typed form of the label-in-first-slot convention the report
/// layer consumes), so callers never have to strip a sentinel before numeric use.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupSeries {
    /// The group label these values belong to (a decision or a sample name)
    label: String,
    /// The float-coerced metric values, in merged-record order
    values: Vec<f64>
}

impl GroupSeries {
    /// Creates an empty series for a group label
    pub fn new(label: String) -> Self {
        Self {
            label,
            values: Vec::new()
        }
    }

    /// Appends one metric value
    pub fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    // getters
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Extracts the two per-group numeric series for one metric. Records are
/// selected by group label and the optional category filter; a selected
/// record lacking the metric is silently dropped (absence is expected, not
/// exceptional). Output order follows the merged collection.
/// # Arguments
/// * `merged` - the merged record collection
/// * `metric` - the provenance-qualified metric to project
/// * `group_labels` - the two group labels to split on
/// * `filter` - at most one category filter
pub fn bucket_metric(
    merged: &MergedVariants,
    metric: &FieldKey,
    group_labels: [&str; 2],
    filter: Option<CategoryFilter>
) -> [GroupSeries; 2] {
    let mut series = [
        GroupSeries::new(group_labels[0].to_string()),
        GroupSeries::new(group_labels[1].to_string())
    ];

    for record in merged.iter() {
        let Some(slot) = group_labels.iter().position(|&label| record.group() == label) else {
            continue;
        };
        if let Some(filter) = filter {
            if !filter.matches(record) {
                continue;
            }
        }
        if let Some(value) = record.metric(metric) {
            series[slot].push(value);
        }
    }

    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::class_enums::{Decision, GenotypeClass, VariantType};
    use crate::data_types::records::{ClassificationRecord, FieldKey, FieldValue, VariantRecord};
    use crate::data_types::variant_key::VariantKey;
    use crate::merge::merge_truth;
    use indexmap::IndexMap;

    /// 10 SNP truth calls (7 TP, 3 UNK) with info_DP on every metrics record
    fn make_merged() -> MergedVariants {
        let mut classifications: IndexMap<VariantKey, ClassificationRecord> = Default::default();
        let mut records: IndexMap<VariantKey, VariantRecord> = Default::default();
        for index in 0..10 {
            let key = VariantKey::new(
                "1".to_string(), format!("{}", 1000 + index),
                "A".to_string(), "C".to_string()
            );
            let decision = if index < 7 { Decision::Tp } else { Decision::Unk };
            classifications.insert(key.clone(), ClassificationRecord {
                decision,
                variant_type: VariantType::Snp,
                genotype_class: GenotypeClass::Het
            });

            let mut record = VariantRecord::new(VariantType::Snp);
            record.insert(FieldKey::Info("DP".to_string()), FieldValue::Number((index + 1) as f64));
            records.insert(key, record);
        }
        merge_truth(classifications, records)
    }

    #[test]
    fn test_bucket_tp_vs_fp() {
        let merged = make_merged();
        let metric = FieldKey::Info("DP".to_string());
        let [tp, fp] = bucket_metric(&merged, &metric, ["TP", "FP"], Some(CategoryFilter::VariantType(VariantType::Snp)));

        assert_eq!(tp.label(), "TP");
        assert_eq!(tp.values(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(fp.label(), "FP");
        assert!(fp.is_empty());
    }

    #[test]
    fn test_bucket_category_filters() {
        let merged = make_merged();
        let metric = FieldKey::Info("DP".to_string());

        // every record is het, so the het filter keeps all 7 TPs
        let [tp, _] = bucket_metric(&merged, &metric, ["TP", "FP"], Some(CategoryFilter::GenotypeClass(GenotypeClass::Het)));
        assert_eq!(tp.len(), 7);

        // nothing is an INDEL or homalt
        let [tp, fp] = bucket_metric(&merged, &metric, ["TP", "FP"], Some(CategoryFilter::VariantType(VariantType::Indel)));
        assert!(tp.is_empty() && fp.is_empty());
        let [tp, _] = bucket_metric(&merged, &metric, ["TP", "FP"], Some(CategoryFilter::GenotypeClass(GenotypeClass::HomAlt)));
        assert!(tp.is_empty());
    }

    #[test]
    fn test_missing_metric_is_dropped_not_defaulted() {
        let merged = make_merged();
        // nothing carries format_GQ, so both series come back empty rather than zero-filled
        let metric = FieldKey::Format("GQ".to_string());
        let [tp, fp] = bucket_metric(&merged, &metric, ["TP", "FP"], None);
        assert!(tp.is_empty() && fp.is_empty());
    }
}
