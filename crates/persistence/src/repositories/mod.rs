//! Repositories over the document store.

pub mod base;
pub mod course;
pub mod enrollment;
pub mod topic;
pub mod user_profile;

use domain::models::{Activity, Program, Question, Subject};

pub use base::{BaseRepository, Page};
pub use course::CourseRepository;
pub use enrollment::EnrollmentRepository;
pub use topic::TopicRepository;
pub use user_profile::UserProfileRepository;

pub type ProgramRepository = BaseRepository<Program>;
pub type SubjectRepository = BaseRepository<Subject>;
pub type QuestionRepository = BaseRepository<Question>;
pub type ActivityRepository = BaseRepository<Activity>;
