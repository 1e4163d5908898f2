pub mod audit;
pub mod cleaner;
pub mod dates;
pub mod recovery;
pub mod sections;
pub mod skills;
pub mod triage;
