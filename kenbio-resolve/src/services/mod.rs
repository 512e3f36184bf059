//! Query services
//!
//! Each service owns one stage of the read path and never surfaces a
//! provider error: failures are logged and degrade to empty results.

pub mod observation_query;
pub mod occurrence_query;
pub mod place_resolver;
pub mod region_catalog;
pub mod taxon_detail;
pub mod verification;
pub mod vision_identifier;

pub use observation_query::{filter_aggregates, ObservationQuery};
pub use occurrence_query::OccurrenceQuery;
pub use place_resolver::{choose_place, CountryQualifiedMatch, PlaceMatchStrategy, PlaceResolver};
pub use region_catalog::RegionCatalog;
pub use taxon_detail::TaxonDetailFetcher;
pub use verification::{verify_regions, VerificationReport, VerifiedRegion};
pub use vision_identifier::VisionIdentifier;
