//! Taxonomy presets for both providers
//!
//! The Observation Service and the Registry use unrelated taxon id spaces;
//! keep them apart.

use serde::Serialize;

/// Observation Service taxon ids for the fauna/flora filter groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TaxonGroup {
    // Fauna, vertebrates
    Animals,
    Mammals,
    Birds,
    Raptors,
    Waterfowl,
    Songbirds,
    Reptiles,
    Amphibians,
    Fishes,
    // Fauna, invertebrates
    Insects,
    Beetles,
    Flies,
    BeesWasps,
    Arachnids,
    Butterflies,
    Molluscs,
    Crustaceans,
    // Flora
    Plants,
    FloweringPlants,
    Grasses,
    Ferns,
    Mosses,
    Conifers,
}

impl TaxonGroup {
    /// Observation Service taxon id
    pub const fn taxon_id(self) -> u64 {
        match self {
            TaxonGroup::Animals => 1,
            TaxonGroup::Mammals => 40151,
            TaxonGroup::Birds => 3,
            TaxonGroup::Raptors => 20422,
            TaxonGroup::Waterfowl => 6888,
            TaxonGroup::Songbirds => 20764,
            TaxonGroup::Reptiles => 26036,
            TaxonGroup::Amphibians => 20979,
            TaxonGroup::Fishes => 47178,
            TaxonGroup::Insects => 47158,
            TaxonGroup::Beetles => 47208,
            TaxonGroup::Flies => 47822,
            TaxonGroup::BeesWasps => 47201,
            TaxonGroup::Arachnids => 47119,
            TaxonGroup::Butterflies => 47224,
            TaxonGroup::Molluscs => 47115,
            TaxonGroup::Crustaceans => 85493,
            TaxonGroup::Plants => 47126,
            TaxonGroup::FloweringPlants => 47125,
            TaxonGroup::Grasses => 47162,
            TaxonGroup::Ferns => 121943,
            TaxonGroup::Mosses => 311249,
            TaxonGroup::Conifers => 136329,
        }
    }

    pub const fn kingdom_tab(self) -> KingdomTab {
        match self {
            TaxonGroup::Plants
            | TaxonGroup::FloweringPlants
            | TaxonGroup::Grasses
            | TaxonGroup::Ferns
            | TaxonGroup::Mosses
            | TaxonGroup::Conifers => KingdomTab::Flora,
            _ => KingdomTab::Fauna,
        }
    }
}

/// Top-level browse split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum KingdomTab {
    Fauna,
    Flora,
}

impl KingdomTab {
    /// Scope used when no finer group is selected
    pub const fn default_scope(self) -> TaxonGroup {
        match self {
            KingdomTab::Fauna => TaxonGroup::Animals,
            KingdomTab::Flora => TaxonGroup::Plants,
        }
    }

    /// Effective Observation Service taxon id for a tab plus optional finer group
    pub fn scope_for(self, group: Option<TaxonGroup>) -> u64 {
        group.unwrap_or_else(|| self.default_scope()).taxon_id()
    }
}

/// Registry kingdom keys
pub mod registry_kingdom {
    pub const ANIMALS: u32 = 1;
    pub const PLANTS: u32 = 6;
}

/// Registry class keys
pub mod registry_class {
    pub const MAMMALS: u32 = 359;
    pub const BIRDS: u32 = 212;
    pub const REPTILES: u32 = 358;
    pub const AMPHIBIANS: u32 = 131;
    /// Ray-finned fishes (Actinopterygii)
    pub const FISHES: u32 = 204;
    pub const INSECTS: u32 = 216;
    pub const ARACHNIDS: u32 = 367;
    /// Monocots
    pub const LILIOPSIDA: u32 = 196;
    /// Dicots
    pub const MAGNOLIOPSIDA: u32 = 220;
}

/// Coarse category derived from an iconic group label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconicCategory {
    Birds,
    /// Insects and arachnids
    Bugs,
    /// Amphibians and reptiles
    Herps,
    Mammals,
    Fish,
    Other,
}

impl IconicCategory {
    /// Classify an Observation Service `iconic_taxon_name`
    pub fn classify(iconic_group: Option<&str>) -> Self {
        match iconic_group.unwrap_or("") {
            "Aves" => IconicCategory::Birds,
            "Insecta" | "Arachnida" => IconicCategory::Bugs,
            "Amphibia" | "Reptilia" => IconicCategory::Herps,
            "Mammalia" => IconicCategory::Mammals,
            "Actinopterygii" => IconicCategory::Fish,
            other if other.contains("Fish") => IconicCategory::Fish,
            _ => IconicCategory::Other,
        }
    }
}
