// Database row models; wire types live in treino-shared

pub mod program;
pub mod user;

pub use program::*;
pub use user::*;

pub use treino_shared::{
    AthleteDetail, AthleteRef, AthleteSummary, Exercise, Program, ProgramDetail, ProgramRef,
    ProgramSummary, Workout, WorkoutDetail, WorkoutLog,
};
