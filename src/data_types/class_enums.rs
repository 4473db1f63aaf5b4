
#[derive(thiserror::Error, Debug)]
pub enum GenotypeError {
    #[error("unrecognized genotype string: {genotype:?}")]
    UnrecognizedGenotype { genotype: String }
}

/// Benchmarking decision attached to a query call by the comparison tool
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, strum_macros::Display)]
pub enum Decision {
    /// Call matches the gold-standard set
    #[strum(serialize = "TP")]
    Tp,
    /// Call is absent from the gold-standard set
    #[strum(serialize = "FP")]
    Fp,
    /// Outside the confident regions, or any label we do not score
    #[strum(serialize = "UNK")]
    Unk
}

impl Decision {
    /// Maps a raw decision label from the truth file.
    /// Labels we never plot (e.g. "N") fold into UNK, which no group selection ever matches.
    pub fn from_label(label: &str) -> Self {
        match label {
            "TP" => Decision::Tp,
            "FP" => Decision::Fp,
            _ => Decision::Unk
        }
    }
}

/// The two variant classes we bucket on
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, strum_macros::Display, strum_macros::EnumString)]
pub enum VariantType {
    /// REF and ALT are both length 1
    #[strum(serialize = "SNP")]
    Snp,
    /// Any other single-allele event
    #[strum(serialize = "INDEL")]
    Indel
}

impl VariantType {
    /// Classifies a single-allele call purely from allele lengths:
    /// both alleles length 1 => SNP, otherwise INDEL.
    pub fn from_alleles(reference: &str, alternate: &str) -> Self {
        if reference.len() == 1 && alternate.len() == 1 {
            VariantType::Snp
        } else {
            VariantType::Indel
        }
    }
}

/// Diploid genotype classes
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, strum_macros::Display)]
pub enum GenotypeClass {
    #[strum(serialize = "het")]
    Het,
    #[strum(serialize = "homalt")]
    HomAlt,
    #[strum(serialize = "homref")]
    HomRef,
    /// Not applicable / not provided by the source
    #[strum(serialize = "NA")]
    Na
}

impl GenotypeClass {
    /// Strict mapping from the first GT sub-field of a sample column.
    /// Only the three unphased diploid spellings are accepted; anything else
    /// (phased separators, haploid, no-calls) fails the run.
    pub fn from_gt(gt: &str) -> Result<Self, GenotypeError> {
        match gt {
            "0/0" => Ok(GenotypeClass::HomRef),
            "0/1" | "1/0" => Ok(GenotypeClass::Het),
            "1/1" => Ok(GenotypeClass::HomAlt),
            _ => Err(GenotypeError::UnrecognizedGenotype { genotype: gt.to_string() })
        }
    }

    /// Lenient mapping from the truth file's genotype-class label.
    /// Unknown labels become NA rather than failing; the bucketer only ever
    /// filters on het/homalt.
    pub fn from_label(label: &str) -> Self {
        match label {
            "het" => GenotypeClass::Het,
            "homalt" => GenotypeClass::HomAlt,
            "homref" => GenotypeClass::HomRef,
            _ => GenotypeClass::Na
        }
    }
}
