pub mod assessments;
pub mod attendance;
pub mod core;
pub mod grades;
pub mod grading_setup;
pub mod registry;
