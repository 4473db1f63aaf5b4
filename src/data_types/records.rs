
use rustc_hash::FxHashMap as HashMap;

use crate::data_types::class_enums::{Decision, GenotypeClass, VariantType};

/// Provenance-qualified metric name. The same name can legally exist in both
/// the INFO and FORMAT declarations of one file, so the class is part of the key.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum FieldKey {
    /// Site-level field
    Info(String),
    /// Sample-level field
    Format(String)
}

impl FieldKey {
    /// The bare declared name, without the class qualifier
    pub fn name(&self) -> &str {
        match self {
            FieldKey::Info(name) |
            FieldKey::Format(name) => name
        }
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKey::Info(name) => write!(f, "info_{name}"),
            FieldKey::Format(name) => write!(f, "format_{name}")
        }
    }
}

/// A single parsed field value
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    /// A float-coercible value
    Number(f64),
    /// Free text that did not parse as a number
    Text(String),
    /// A presence-only flag field
    Flag
}

impl FieldValue {
    /// Parses a raw field string, preferring the numeric representation
    pub fn from_raw(raw: &str) -> Self {
        match raw.parse::<f64>() {
            Ok(v) => FieldValue::Number(v),
            Err(_) => FieldValue::Text(raw.to_string())
        }
    }

    /// Returns the value as a float if it is one. Absence of a numeric
    /// representation is an expected outcome, never an error.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(v) => Some(*v),
            FieldValue::Text(_) |
            FieldValue::Flag => None
        }
    }
}

/// All parsed fields for one variant in a metrics file
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariantRecord {
    /// SNP/INDEL classification derived from the allele lengths
    variant_type: Option<VariantType>,
    /// Genotype class derived from GT; only populated in dual-sample mode
    genotype_class: Option<GenotypeClass>,
    /// All INFO/FORMAT fields for this variant
    fields: HashMap<FieldKey, FieldValue>
}

impl VariantRecord {
    /// Constructor
    pub fn new(variant_type: VariantType) -> Self {
        Self {
            variant_type: Some(variant_type),
            ..Default::default()
        }
    }

    /// Stores one parsed field
    pub fn insert(&mut self, key: FieldKey, value: FieldValue) {
        self.fields.insert(key, value);
    }

    /// Sets the derived genotype class (dual-sample mode)
    pub fn set_genotype_class(&mut self, genotype_class: GenotypeClass) {
        self.genotype_class = Some(genotype_class);
    }

    /// Float-coerced lookup of one metric; None when the field is absent or non-numeric
    pub fn metric(&self, key: &FieldKey) -> Option<f64> {
        self.fields.get(key).and_then(|v| v.as_f64())
    }

    /// Raw field lookup
    pub fn field(&self, key: &FieldKey) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Consumes the record and returns the field map
    pub fn into_fields(self) -> HashMap<FieldKey, FieldValue> {
        self.fields
    }

    // getters
    pub fn variant_type(&self) -> Option<VariantType> {
        self.variant_type
    }

    pub fn genotype_class(&self) -> Option<GenotypeClass> {
        self.genotype_class
    }

    pub fn fields(&self) -> &HashMap<FieldKey, FieldValue> {
        &self.fields
    }
}

/// Per-variant classification from the benchmarking tool
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ClassificationRecord {
    /// TP/FP/UNK decision
    pub decision: Decision,
    /// SNP/INDEL label as reported by the tool
    pub variant_type: VariantType,
    /// het/homalt/homref/NA label as reported by the tool
    pub genotype_class: GenotypeClass
}

/// Union of a classification and a metrics record for one key.
/// Built on demand by the merge step; never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct MergedRecord {
    /// Group label this record contributes to: a decision label in truth
    /// mode, a sample label in dual-sample mode
    group: String,
    /// SNP/INDEL classification
    variant_type: VariantType,
    /// Genotype class
    genotype_class: GenotypeClass,
    /// The metric fields carried over from the VariantRecord
    fields: HashMap<FieldKey, FieldValue>
}

impl MergedRecord {
    /// Constructor
    pub fn new(group: String, variant_type: VariantType, genotype_class: GenotypeClass, fields: HashMap<FieldKey, FieldValue>) -> Self {
        Self {
            group, variant_type, genotype_class, fields
        }
    }

    /// Float-coerced lookup of one metric; None when the field is absent or non-numeric
    pub fn metric(&self, key: &FieldKey) -> Option<f64> {
        self.fields.get(key).and_then(|v| v.as_f64())
    }

    // getters
    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn variant_type(&self) -> VariantType {
        self.variant_type
    }

    pub fn genotype_class(&self) -> GenotypeClass {
        self.genotype_class
    }
}
