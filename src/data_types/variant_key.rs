
/// Identity of one normalized, single-allele variant call.
/// All four fields are kept as raw strings from the source file; the join
/// between the truth and metrics files only ever needs equality.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct VariantKey {
    /// Chromosome / contig name
    chrom: String,
    /// Position as written in the file, 1-based
    position: String,
    /// Reference allele
    reference: String,
    /// Alternate allele; guaranteed single-allele by the parsers
    alternate: String
}

impl VariantKey {
    /// Constructor
    pub fn new(chrom: String, position: String, reference: String, alternate: String) -> Self {
        Self {
            chrom, position, reference, alternate
        }
    }

    // getters
    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn position(&self) -> &str {
        &self.position
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn alternate(&self) -> &str {
        &self.alternate
    }
}

impl std::fmt::Display for VariantKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}_{}_{}", self.chrom, self.position, self.reference, self.alternate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_equality() {
        let k1 = VariantKey::new("1".to_string(), "229673".to_string(), "A".to_string(), "C".to_string());
        let k2 = VariantKey::new("1".to_string(), "229673".to_string(), "A".to_string(), "C".to_string());
        let k3 = VariantKey::new("1".to_string(), "229673".to_string(), "A".to_string(), "G".to_string());
        assert_eq!(k1, k2);
        assert_ne!(k1, k3);
        assert_eq!(k1.to_string(), "1_229673_A_C");
    }
}
