// Business logic services

pub mod athlete_service;
pub mod exercise_service;
pub mod mail_service;
pub mod profile_service;
pub mod program_service;
pub mod workout_log_service;

pub use athlete_service::AthleteService;
pub use exercise_service::ExerciseService;
pub use mail_service::Mailer;
pub use profile_service::ProfileService;
pub use program_service::{ProgramScope, ProgramService};
pub use workout_log_service::WorkoutLogService;
