//! Domain models for the campus admin backend.

pub mod activity;
pub mod course;
pub mod enrollment;
pub mod multilingual;
pub mod program;
pub mod question;
pub mod record;
pub mod subject;
pub mod topic;
pub mod user_profile;

pub use activity::Activity;
pub use course::Course;
pub use enrollment::{Enrollment, EnrollmentStatus};
pub use multilingual::{Multilingual, MultilingualArray, MultilingualText, RequiresDefaultLanguage};
pub use program::Program;
pub use question::Question;
pub use record::{Entity, Record, Resource};
pub use subject::Subject;
pub use topic::Topic;
pub use user_profile::{UserProfile, UserRole};
