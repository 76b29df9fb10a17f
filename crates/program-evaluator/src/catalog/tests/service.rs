use super::common::*;
use crate::analytics::{RecommendationKind, Timeframe};
use crate::catalog::repository::{ProgramRepository, StudentRepository};
use crate::catalog::{CatalogError, CatalogService, NewProgram, ProgramQuery, ProgramUpdate};
use crate::data::StudentExportFilter;
use crate::domain::{ProgramId, ProgramMetricsSnapshot, Student, StudentId, StudentStatus};
use std::sync::Arc;

#[test]
fn create_program_requires_name_and_type() {
    let (service, _, _) = build_service();

    let err = service
        .create_program(
            &org(),
            NewProgram {
                name: Some("   ".to_string()),
                program_type: Some("stem".to_string()),
                ..NewProgram::default()
            },
        )
        .expect_err("blank name rejected");
    assert!(matches!(err, CatalogError::Validation(ref message) if message.contains("name")));

    let program = service
        .create_program(
            &org(),
            NewProgram {
                name: Some("Robotics Club".to_string()),
                program_type: Some("stem".to_string()),
                ..NewProgram::default()
            },
        )
        .expect("program created");
    assert!(program.id.0.starts_with("prg-"));
    assert_eq!(program.organization_id, org());
    assert_eq!(program.created_at, program.updated_at);
}

#[test]
fn programs_are_invisible_to_other_organizations() {
    let (service, programs, _) = build_service();
    let program_id = seed_program(&programs, "prg-scope");

    assert!(service.get_program(&org(), &program_id).is_ok());
    let err = service
        .get_program(&other_org(), &program_id)
        .expect_err("scoped lookup");
    assert!(matches!(err, CatalogError::ProgramNotFound));
    assert_eq!(err.to_string(), "Program not found");

    let page = service
        .list_programs(&other_org(), &ProgramQuery::default())
        .expect("listing succeeds");
    assert_eq!(page.total_docs, 0);
    assert_eq!(page.total_pages, 1);
}

#[test]
fn update_merges_metrics_and_validates_ranges() {
    let (service, programs, _) = build_service();
    let program_id = seed_program(&programs, "prg-update");

    let updated = service
        .update_program(
            &org(),
            &program_id,
            ProgramUpdate {
                metrics: Some(ProgramMetricsSnapshot {
                    effectiveness_score: Some(72.5),
                    ..ProgramMetricsSnapshot::default()
                }),
                ..ProgramUpdate::default()
            },
        )
        .expect("update succeeds");
    assert_eq!(updated.metrics.effectiveness_score, Some(72.5));
    assert_eq!(updated.name, "Algebra Foundations");

    let err = service
        .update_program(
            &org(),
            &program_id,
            ProgramUpdate {
                metrics: Some(ProgramMetricsSnapshot {
                    student_satisfaction: Some(7.0),
                    ..ProgramMetricsSnapshot::default()
                }),
                ..ProgramUpdate::default()
            },
        )
        .expect_err("satisfaction out of range");
    assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);

    let stored = programs
        .fetch(&org(), &program_id)
        .expect("fetch")
        .expect("present");
    assert_eq!(stored.metrics.student_satisfaction, None);
}

#[test]
fn effectiveness_scores_enrolled_students() {
    let (service, programs, students) = build_service();
    let program_id = seed_program(&programs, "prg-effect");
    students
        .upsert(enrolled_student("stu-a", "N-001", &program_id))
        .expect("seed student");

    let effectiveness = service
        .effectiveness(&org(), &program_id)
        .expect("effectiveness computed");
    assert_eq!(effectiveness.metrics.student_count, 1);
    assert!((effectiveness.effectiveness_score - 63.75).abs() < 1e-9);
    let kinds: Vec<_> = effectiveness
        .recommendations
        .iter()
        .map(|rec| rec.kind)
        .collect();
    assert_eq!(kinds, vec![RecommendationKind::Resource]);
}

#[test]
fn report_rejects_unknown_timeframes_and_defaults_to_six_months() {
    let (service, programs, _) = build_service();
    let program_id = seed_program(&programs, "prg-report");

    let err = service
        .report(&org(), &program_id, Some("2weeks"))
        .expect_err("unknown timeframe");
    assert!(matches!(err, CatalogError::Timeframe(_)));
    assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);

    let report = service
        .report(&org(), &program_id, None)
        .expect("report builds");
    assert_eq!(report.program, "Algebra Foundations");
    assert_eq!(Timeframe::default(), Timeframe::SixMonths);

    let again = service
        .report(&org(), &program_id, Some("6months"))
        .expect("report builds");
    assert_eq!(report, again);
}

#[test]
fn student_performance_requires_enrollment() {
    let (service, programs, students) = build_service();
    let program_id = seed_program(&programs, "prg-perf");
    let elsewhere = seed_program(&programs, "prg-elsewhere");
    students
        .upsert(enrolled_student("stu-perf", "N-002", &program_id))
        .expect("seed student");

    let performance = service
        .student_performance(&org(), &program_id, &StudentId("stu-perf".to_string()))
        .expect("performance available");
    assert_eq!(performance.student.name, "Maya Lopez");
    assert_eq!(performance.metrics.average_score, Some(90.0));
    assert_eq!(performance.metrics.attendance_rate, Some(100.0));

    let err = service
        .student_performance(&org(), &elsewhere, &StudentId("stu-perf".to_string()))
        .expect_err("not enrolled");
    assert_eq!(err.to_string(), "Program or student not found");
}

#[test]
fn register_student_upserts_by_student_number() {
    let (service, programs, _) = build_service();
    let program_id = seed_program(&programs, "prg-register");

    let mut first = enrolled_student("", "N-100", &program_id);
    first.organization_id = other_org();
    let stored = service
        .register_student(&org(), first)
        .expect("registered");
    assert!(stored.id.0.starts_with("stu-"));
    assert_eq!(stored.organization_id, org());

    let mut second = enrolled_student("", "N-100", &program_id);
    second.personal_info.first_name = "Marisol".to_string();
    let updated = service
        .register_student(&org(), second)
        .expect("re-registered");
    assert_eq!(updated.id, stored.id);
    assert_eq!(
        service
            .get_student(&org(), &stored.id)
            .expect("fetch")
            .personal_info
            .first_name,
        "Marisol"
    );

    let mut foreign = enrolled_student("", "N-101", &ProgramId("prg-unknown".to_string()));
    foreign.personal_info.first_name = "Ana".to_string();
    assert!(matches!(
        service.register_student(&org(), foreign),
        Err(CatalogError::Validation(_))
    ));

    assert!(matches!(
        service.register_student(&org(), Student::default()),
        Err(CatalogError::Validation(_))
    ));
}

#[test]
fn register_student_ignores_submitted_ids_of_other_students() {
    let (service, programs, students) = build_service();
    let program_id = seed_program(&programs, "prg-isolation");
    let victim_id = StudentId("stu-victim".to_string());
    students
        .upsert(enrolled_student("stu-victim", "N-900", &program_id))
        .expect("seed student");

    let mut foreign = enrolled_student("stu-victim", "N-901", &program_id);
    foreign.program_ids.clear();
    foreign.personal_info.first_name = "Intruder".to_string();
    let stored = service
        .register_student(&other_org(), foreign)
        .expect("registered in other organization");
    assert_ne!(stored.id, victim_id);
    assert_eq!(stored.organization_id, other_org());

    let mut sibling = enrolled_student("stu-victim", "N-902", &program_id);
    sibling.personal_info.first_name = "Sibling".to_string();
    let stored = service
        .register_student(&org(), sibling)
        .expect("registered in same organization");
    assert_ne!(stored.id, victim_id);

    let victim = service
        .get_student(&org(), &victim_id)
        .expect("original student still present");
    assert_eq!(victim.personal_info.student_id, "N-900");
    assert_eq!(victim.personal_info.first_name, "Maya");
    assert_eq!(victim.organization_id, org());
    assert_eq!(students.list(&org()).expect("list").len(), 2);
    assert_eq!(students.list(&other_org()).expect("list").len(), 1);
}

#[test]
fn import_reports_row_numbers_and_updates_existing_students() {
    let (service, programs, students) = build_service();
    let program_id = seed_program(&programs, "prg-import");
    let mut existing = enrolled_student("stu-existing", "STU001", &seed_program(&programs, "prg-old"));
    existing.academic_profile.performance_metrics.overall_gpa = Some(2.1);
    students.upsert(existing).expect("seed student");

    let csv = "firstName,lastName,studentId,email,dateOfBirth,grade,gpa,attendanceRate\n\
John,Doe,STU001,john@example.com,2005-01-15,10,3.8,95\n\
Jane,Smith,STU002,jane@example.com,2005-03-20,10,3.9,98\n\
Invalid,,STU003,,,,,,\n";

    let summary = service
        .import_students(&org(), csv.as_bytes(), Some(&program_id))
        .expect("import runs");
    assert!(summary.success);
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].row, 4);
    assert_eq!(summary.errors[0].error, "Missing required fields");

    let john = students
        .find_by_number(&org(), "STU001")
        .expect("lookup")
        .expect("john stored");
    assert_eq!(john.id, StudentId("stu-existing".to_string()));
    assert_eq!(john.academic_profile.performance_metrics.overall_gpa, Some(3.8));
    assert_eq!(john.assessments.len(), 1);
    assert!(john.is_enrolled_in(&program_id));
    assert!(john.is_enrolled_in(&ProgramId("prg-old".to_string())));

    let jane = students
        .find_by_number(&org(), "STU002")
        .expect("lookup")
        .expect("jane stored");
    assert_eq!(jane.organization_id, org());
    assert_eq!(jane.program_ids, vec![program_id]);
}

#[test]
fn import_into_foreign_program_is_rejected() {
    let (service, programs, _) = build_service();
    programs
        .insert(program("prg-south", other_org(), "Southern Choir"))
        .expect("seed program");

    let err = service
        .import_students(
            &org(),
            "firstName,lastName,studentId\nA,B,C\n".as_bytes(),
            Some(&ProgramId("prg-south".to_string())),
        )
        .expect_err("foreign program");
    assert!(matches!(err, CatalogError::ProgramNotFound));
}

#[test]
fn exports_filter_students_and_resolve_program_names() {
    let (service, programs, students) = build_service();
    let program_id = seed_program(&programs, "prg-export");
    students
        .upsert(enrolled_student("stu-1", "N-201", &program_id))
        .expect("seed student");
    let mut graduate = enrolled_student("stu-2", "N-202", &program_id);
    graduate.academic_profile.status = StudentStatus::Graduated;
    students.upsert(graduate).expect("seed student");

    let csv = service
        .export_students(
            &org(),
            &StudentExportFilter {
                status: Some(StudentStatus::Graduated),
                ..StudentExportFilter::default()
            },
        )
        .expect("export renders");
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("N-202,Maya,Lopez"));
    assert!(lines[1].contains("Algebra Foundations"));
    assert!(lines[1].ends_with("graduated"));

    let report = service
        .export_program_report(&org(), &program_id)
        .expect("report renders");
    assert_eq!(report.lines().count(), 3);
    assert!(report.contains("N-201,Maya Lopez,3,100,90,active"));
}

#[test]
fn dashboard_and_program_analytics_cover_the_tenant() {
    let (service, programs, students) = build_service();
    let program_id = seed_program(&programs, "prg-dash");
    seed_program(&programs, "prg-dash-empty");
    students
        .upsert(enrolled_student("stu-dash", "N-301", &program_id))
        .expect("seed student");

    let entries = service.analytics_programs(&org()).expect("entries");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].program_id, program_id);
    assert_eq!(entries[0].metrics.metrics.student_count, 1);
    assert_eq!(entries[1].metrics.metrics.student_count, 0);

    let dashboard = service.dashboard(&org()).expect("dashboard");
    assert_eq!(dashboard.summary.total_programs, 2);
    assert_eq!(dashboard.summary.total_students, 1);
    assert_eq!(dashboard.performance_distribution.good, 1);
}

#[test]
fn recommendations_are_scoped_to_known_programs() {
    let (service, programs, students) = build_service();
    let program_id = seed_program(&programs, "prg-advice");
    students
        .upsert(enrolled_student("stu-advice", "N-401", &program_id))
        .expect("seed student");

    let advice = service
        .program_recommendations(&org(), &program_id)
        .expect("program advice");
    assert_eq!(advice.len(), 1);
    assert_eq!(advice[0].kind, RecommendationKind::ProgramImprovement);

    let err = service
        .student_recommendations(
            &org(),
            &StudentId("stu-advice".to_string()),
            Some(&ProgramId("prg-missing".to_string())),
        )
        .expect_err("unknown program");
    assert!(matches!(err, CatalogError::ProgramNotFound));
}

#[test]
fn repository_outages_surface_as_server_errors() {
    let service = CatalogService::new(
        Arc::new(UnavailablePrograms),
        Arc::new(MemoryStudents::default()),
        crate::analytics::ProgramAnalytics::default(),
    );
    let err = service
        .get_program(&org(), &ProgramId("prg-any".to_string()))
        .expect_err("outage");
    assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
}
