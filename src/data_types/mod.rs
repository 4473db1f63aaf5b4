/// Decision, variant-type, and genotype-class enumerations
pub mod class_enums;
/// Field keys/values and the per-variant record containers
pub mod records;
/// The variant identity tuple used to join call sets
pub mod variant_key;
