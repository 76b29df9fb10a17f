use crate::infra::{InMemoryProgramRepository, InMemoryStudentRepository};
use clap::Args;
use program_evaluator::analytics::{
    AdvisoryRecommendation, ProgramAnalytics, ProgramEffectiveness, ProgramReport, Timeframe,
};
use program_evaluator::catalog::{CatalogService, NewProgram};
use program_evaluator::data::StudentExportFilter;
use program_evaluator::domain::{
    Assessment, AssessmentKind, AttendanceRecord, AttendanceStatus, Goal, GoalStatus,
    OrganizationId, Program, Student,
};
use program_evaluator::error::AppError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

const DEMO_ROSTER: &str = "firstName,lastName,studentId,email,dateOfBirth,grade,gpa,attendanceRate,enrollmentDate
Maya,Lopez,STU001,maya.lopez@example.org,2009-04-12,9,3.7,96,2024-08-26
Jon,Okafor,STU002,jon.okafor@example.org,2009-11-02,9,2.4,78,2024-08-26
Priya,Shah,STU003,priya.shah@example.org,2008-07-19,10,3.2,91,2024-08-26
Eli,Brandt,STU004,,2009-01-30,9,abc,,
";

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// JSON file holding `{ "program": {...}, "students": [...] }`
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Report window: 1month, 3months, 6months, or 1year
    #[arg(long, default_value = "6months")]
    pub(crate) timeframe: Timeframe,
    /// Print the report as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Optional roster CSV to import instead of the built-in sample
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// Report window used for the demo program report
    #[arg(long, default_value = "6months")]
    pub(crate) timeframe: Timeframe,
    /// Print the exported student CSV after the analytics summary
    #[arg(long)]
    pub(crate) show_export: bool,
}

/// A program and its enrolled students as exported from the store.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EvaluationSnapshot {
    pub(crate) program: Program,
    #[serde(default)]
    pub(crate) students: Vec<Student>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EvaluationOutput {
    pub(crate) effectiveness: ProgramEffectiveness,
    pub(crate) report: ProgramReport,
    pub(crate) advice: Vec<AdvisoryRecommendation>,
}

pub(crate) fn evaluate_snapshot(
    analytics: &ProgramAnalytics,
    snapshot: &EvaluationSnapshot,
    timeframe: Timeframe,
) -> EvaluationOutput {
    let students: Vec<Student> = snapshot
        .students
        .iter()
        .filter(|student| student.is_enrolled_in(&snapshot.program.id))
        .cloned()
        .collect();

    EvaluationOutput {
        effectiveness: analytics.effectiveness(&snapshot.program, &students),
        report: analytics.build_report(&snapshot.program, &students, timeframe),
        advice: analytics.program_recommendations(&snapshot.program, &students),
    }
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        snapshot,
        timeframe,
        json,
    } = args;

    let file = File::open(&snapshot)?;
    let snapshot: EvaluationSnapshot = serde_json::from_reader(file)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
    let output = evaluate_snapshot(&ProgramAnalytics::default(), &snapshot, timeframe);

    if json {
        let rendered = serde_json::to_string_pretty(&output)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        println!("{rendered}");
        return Ok(());
    }

    println!(
        "Program effectiveness: {} ({})",
        snapshot.program.name, timeframe
    );
    render_effectiveness(&output.effectiveness);
    render_advice(&output.advice);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        roster,
        timeframe,
        show_export,
    } = args;

    let organization = OrganizationId("demo-academy".to_string());
    let service = CatalogService::new(
        Arc::new(InMemoryProgramRepository::default()),
        Arc::new(InMemoryStudentRepository::default()),
        ProgramAnalytics::default(),
    );

    println!("Program evaluator demo");
    let program = service.create_program(
        &organization,
        NewProgram {
            name: Some("Algebra Foundations".to_string()),
            program_type: Some("academic".to_string()),
            description: Some("Ninth-grade algebra intervention block".to_string()),
            ..NewProgram::default()
        },
    )?;
    println!("- Created program {} ({})", program.name, program.id);

    let summary = match roster {
        Some(path) => service.import_students(&organization, File::open(path)?, Some(&program.id))?,
        None => service.import_students(&organization, DEMO_ROSTER.as_bytes(), Some(&program.id))?,
    };
    println!(
        "- Imported {} students, rejected {} rows",
        summary.imported,
        summary.errors.len()
    );
    for rejected in &summary.errors {
        println!("    row {}: {}", rejected.row, rejected.error);
    }

    for (index, student) in summary.students.into_iter().enumerate() {
        let enriched = with_demo_activity(student, &program, index);
        service.register_student(&organization, enriched)?;
    }

    let effectiveness = service.effectiveness(&organization, &program.id)?;
    println!("\nEffectiveness");
    render_effectiveness(&effectiveness);

    let report = service.report(&organization, &program.id, Some(timeframe.label()))?;
    println!(
        "\nReport for {} over {}: {} recommendation(s)",
        report.program,
        timeframe,
        report.recommendations.len()
    );

    let advice = service.program_recommendations(&organization, &program.id)?;
    render_advice(&advice);

    let dashboard = service.dashboard(&organization)?;
    let distribution = &dashboard.performance_distribution;
    println!(
        "\nDashboard: {} programs | {} students | excellent {} / good {} / average {} / needs improvement {}",
        dashboard.summary.total_programs,
        dashboard.summary.total_students,
        distribution.excellent,
        distribution.good,
        distribution.average,
        distribution.needs_improvement
    );

    let students = service.export_students(&organization, &StudentExportFilter::default());
    match students {
        Ok(csv) if show_export => println!("\nStudent export\n{csv}"),
        Ok(csv) => println!("\nStudent export: {} rows", csv.lines().count().saturating_sub(1)),
        Err(err) => println!("\nStudent export unavailable: {err}"),
    }

    Ok(())
}

fn render_effectiveness(effectiveness: &ProgramEffectiveness) {
    let metrics = &effectiveness.metrics;
    println!(
        "- {} students | GPA {:.2} | attendance {:.1}% | completion {:.1}% | progress {:.1}%",
        metrics.student_count,
        metrics.average_gpa,
        metrics.attendance_rate,
        metrics.completion_rate,
        metrics.progress_rate
    );
    println!("- Effectiveness score {:.2}", effectiveness.effectiveness_score);
    for recommendation in &effectiveness.recommendations {
        println!(
            "  [{} / {}] {}",
            recommendation.kind.label(),
            recommendation.priority.label(),
            recommendation.description
        );
    }
}

fn render_advice(advice: &[AdvisoryRecommendation]) {
    if advice.is_empty() {
        println!("- Program is meeting its effectiveness target");
        return;
    }
    for item in advice {
        println!("- {}", item.description);
        for action in &item.specific_actions {
            println!("    * {action}");
        }
    }
}

/// Gives imported students a deterministic month of attendance, two exams, and goals.
fn with_demo_activity(mut student: Student, program: &Program, index: usize) -> Student {
    let start = chrono::NaiveDate::from_ymd_opt(2024, 9, 2);
    let absences = index % 3;
    student.attendance = (0..10u64)
        .map(|day| AttendanceRecord {
            program_id: Some(program.id.clone()),
            date: start.and_then(|date| date.checked_add_days(chrono::Days::new(day))),
            status: Some(if (day as usize) < absences * 2 {
                AttendanceStatus::Absent
            } else {
                AttendanceStatus::Present
            }),
            notes: None,
        })
        .collect();
    student.assessments = [(88.0, 9), (88.0 - 12.0 * index as f64, 30)]
        .into_iter()
        .map(|(score, day)| Assessment {
            program_id: Some(program.id.clone()),
            kind: Some(AssessmentKind::Exam),
            name: Some(format!("Unit check (day {day})")),
            score: Some(score.max(20.0)),
            max_score: Some(100.0),
            date: chrono::NaiveDate::from_ymd_opt(2024, 9, day),
            feedback: None,
        })
        .collect();
    student.progress_tracking.goals = vec![
        Goal {
            description: Some("Solve two-step equations".to_string()),
            status: Some(GoalStatus::Completed),
            ..Goal::default()
        },
        Goal {
            description: Some("Graph linear functions".to_string()),
            status: Some(if index % 2 == 0 {
                GoalStatus::Completed
            } else {
                GoalStatus::InProgress
            }),
            ..Goal::default()
        },
    ];
    student
}
