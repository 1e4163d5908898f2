pub mod enrichment;
pub mod record;

pub use enrichment::EnrichmentRecord;
pub use record::{
    CvRecord, DateConfidence, DateProvenance, EducationEntry, ExperienceEntry, TwinResult,
};
