//! Terminal rendering for API payloads. Renderers return strings so commands
//! print them and tests can inspect them.

use colored::Colorize;
use std::fmt::Write;

use treino_shared::{
    AthleteDetail, AthleteSummary, AuthUser, Exercise, ProgramDetail, ProgramExerciseDetail,
    ProgramSummary, WorkoutLog,
};

pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn failure(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

pub fn render_user(user: &AuthUser) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  Name:    {}", user.name.bold());
    let _ = writeln!(out, "  Email:   {}", user.email);
    let _ = writeln!(out, "  Role:    {}", user.role);
    let _ = writeln!(out, "  User ID: {}", user.id);
    out
}

pub fn render_athletes(athletes: &[AthleteSummary]) -> String {
    if athletes.is_empty() {
        return "No athletes yet. Invite one with 'treino athletes invite'.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<36}  {:<24}  {:<30}  {}",
        "ID".bold(),
        "NAME".bold(),
        "EMAIL".bold(),
        "STATUS".bold()
    );
    for athlete in athletes {
        let _ = writeln!(
            out,
            "{:<36}  {:<24}  {:<30}  {}",
            athlete.id,
            athlete.name,
            athlete.email,
            status_label(athlete.is_active)
        );
    }
    out
}

pub fn render_athlete(athlete: &AthleteDetail) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", athlete.name.bold());
    let _ = writeln!(out, "  Email:  {}", athlete.email);
    let _ = writeln!(out, "  Status: {}", status_label(athlete.is_active));
    if let Some(notes) = &athlete.notes {
        let _ = writeln!(out, "  Notes:  {notes}");
    }

    let _ = writeln!(out);
    if athlete.programs.is_empty() {
        let _ = writeln!(out, "  No programs assigned.");
    } else {
        let _ = writeln!(out, "  Programs:");
        for program in &athlete.programs {
            let _ = writeln!(out, "    {}  {}", program.id.to_string().dimmed(), program.title);
        }
    }
    out
}

pub fn render_exercises(exercises: &[Exercise]) -> String {
    if exercises.is_empty() {
        return "The exercise catalog is empty.\n".to_string();
    }

    let mut out = String::new();
    for exercise in exercises {
        let _ = write!(out, "{}  {}", exercise.id.to_string().dimmed(), exercise.name);
        if let Some(url) = &exercise.video_url {
            let _ = write!(out, "  ({url})");
        }
        let _ = writeln!(out);
    }
    out
}

pub fn render_programs(programs: &[ProgramSummary]) -> String {
    if programs.is_empty() {
        return "No programs found.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<36}  {:<30}  {:<24}  {}",
        "ID".bold(),
        "TITLE".bold(),
        "ATHLETE".bold(),
        "WORKOUTS".bold()
    );
    for program in programs {
        let _ = writeln!(
            out,
            "{:<36}  {:<30}  {:<24}  {}",
            program.id, program.title, program.athlete_name, program.workout_count
        );
    }
    out
}

pub fn render_program(detail: &ProgramDetail) -> String {
    let program = &detail.program;
    let mut out = String::new();

    let _ = writeln!(out, "{}", program.title.bold());
    let _ = writeln!(out, "  Athlete: {}", detail.athlete.name);
    if let Some(description) = &program.description {
        let _ = writeln!(out, "  {description}");
    }

    if detail.workouts.is_empty() {
        let _ = writeln!(out, "\n  No workouts scheduled.");
        return out;
    }

    for workout in &detail.workouts {
        let header = match &workout.workout.title {
            Some(title) => format!("{} {}", workout.workout.date, title),
            None => workout.workout.date.to_string(),
        };
        let _ = writeln!(out);
        let _ = writeln!(out, "  {}  {}", header.cyan(), workout.workout.id.to_string().dimmed());

        write_prescriptions(&mut out, &workout.exercises);
    }
    out
}

/// Exercises of a single workout, as returned after replacing them.
pub fn render_prescriptions(items: &[ProgramExerciseDetail]) -> String {
    if items.is_empty() {
        return "  No exercises in this workout.\n".to_string();
    }

    let mut out = String::new();
    write_prescriptions(&mut out, items);
    out
}

fn write_prescriptions(out: &mut String, items: &[ProgramExerciseDetail]) {
    for (index, item) in items.iter().enumerate() {
        let prescription = [
            item.sets.as_deref().map(|s| format!("{s} sets")),
            item.reps.as_deref().map(|r| format!("{r} reps")),
            item.load.as_deref().map(|l| format!("@ {l}")),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

        let _ = write!(out, "    {}. {}", index + 1, item.exercise.name);
        if !prescription.is_empty() {
            let _ = write!(out, "  {prescription}");
        }
        if let Some(notes) = &item.notes {
            let _ = write!(out, "  ({notes})");
        }
        let _ = writeln!(out);
    }
}

pub fn render_logs(logs: &[WorkoutLog]) -> String {
    if logs.is_empty() {
        return "No completions logged for this workout.\n".to_string();
    }

    let mut out = String::new();
    for log in logs {
        let _ = write!(out, "{}", log.completed_at.format("%Y-%m-%d %H:%M"));
        if let Some(notes) = &log.notes {
            let _ = write!(out, "  {notes}");
        }
        let _ = writeln!(out);
    }
    out
}

fn status_label(is_active: bool) -> colored::ColoredString {
    if is_active {
        "active".green()
    } else {
        "invited".yellow()
    }
}
