use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequestParts, Path, Query, State,
    },
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::query::ProgramQuery;
use super::repository::{ProgramRepository, StudentRepository};
use super::service::{CatalogError, CatalogService, NewProgram, ProgramUpdate};
use crate::data::StudentExportFilter;
use crate::domain::{OrganizationId, ProgramId, Student, StudentId, StudentStatus};
use crate::error::AppError;

/// Header carrying the caller's organization.
pub const TENANT_HEADER: &str = "x-organization-id";

/// Organization resolved from the request; requests without one are rejected with 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext(pub OrganizationId);

#[axum::async_trait]
impl<St> FromRequestParts<St> for TenantContext
where
    St: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(TENANT_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| TenantContext(OrganizationId(value.to_string())))
            .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Missing organization context"))
    }
}

#[derive(Serialize)]
struct Envelope<T> {
    success: bool,
    data: T,
}

fn success<T: Serialize>(status: StatusCode, data: T) -> Response {
    (
        status,
        Json(Envelope {
            success: true,
            data,
        }),
    )
        .into_response()
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    let payload = json!({
        "success": false,
        "error": message.into(),
    });
    (status, Json(payload)).into_response()
}

fn catalog_failure(err: CatalogError) -> Response {
    if err.status().is_server_error() {
        error!(error = %err, "catalog request failed");
    }
    AppError::from(err).into_response()
}

fn csv_attachment(filename: &str, body: String) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime::TEXT_CSV_UTF_8.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        body,
    )
        .into_response()
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReportParams {
    timeframe: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProgramScope {
    program_id: Option<String>,
}

impl ProgramScope {
    fn program_id(&self) -> Option<ProgramId> {
        self.program_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| ProgramId(value.to_string()))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExportParams {
    status: Option<String>,
    grade: Option<String>,
    program_id: Option<String>,
}

impl ExportParams {
    fn filter(self) -> Result<StudentExportFilter, CatalogError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(StudentStatus::parse(raw).ok_or_else(|| {
                CatalogError::Validation(format!("unsupported student status '{raw}'"))
            })?),
        };
        let program_id = ProgramScope {
            program_id: self.program_id,
        }
        .program_id();
        Ok(StudentExportFilter {
            status,
            grade: self.grade.filter(|grade| !grade.trim().is_empty()),
            program_id,
        })
    }
}

/// Router exposing the tenant-scoped program, student, analytics, and data endpoints.
pub fn catalog_router<P, S>(service: Arc<CatalogService<P, S>>) -> Router
where
    P: ProgramRepository + 'static,
    S: StudentRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/programs",
            post(create_program_handler::<P, S>).get(list_programs_handler::<P, S>),
        )
        .route(
            "/api/v1/programs/:id",
            get(get_program_handler::<P, S>).put(update_program_handler::<P, S>),
        )
        .route(
            "/api/v1/programs/:id/effectiveness",
            get(effectiveness_handler::<P, S>),
        )
        .route("/api/v1/programs/:id/report", get(report_handler::<P, S>))
        .route(
            "/api/v1/programs/:id/recommendations",
            get(program_recommendations_handler::<P, S>),
        )
        .route(
            "/api/v1/programs/:id/export",
            get(export_program_handler::<P, S>),
        )
        .route(
            "/api/v1/programs/:id/students/:student_id/performance",
            get(student_performance_handler::<P, S>),
        )
        .route("/api/v1/students", post(register_student_handler::<P, S>))
        .route("/api/v1/students/:id", get(get_student_handler::<P, S>))
        .route(
            "/api/v1/students/:id/recommendations",
            get(student_recommendations_handler::<P, S>),
        )
        .route(
            "/api/v1/import/students",
            post(import_students_handler::<P, S>),
        )
        .route(
            "/api/v1/export/students",
            get(export_students_handler::<P, S>),
        )
        .route(
            "/api/v1/analytics/programs",
            get(analytics_programs_handler::<P, S>),
        )
        .route(
            "/api/v1/analytics/dashboard",
            get(dashboard_handler::<P, S>),
        )
        .with_state(service)
}

type SharedService<P, S> = State<Arc<CatalogService<P, S>>>;

pub(crate) async fn create_program_handler<P, S>(
    State(service): SharedService<P, S>,
    TenantContext(organization_id): TenantContext,
    payload: Result<Json<NewProgram>, JsonRejection>,
) -> Response
where
    P: ProgramRepository + 'static,
    S: StudentRepository + 'static,
{
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return failure(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    match service.create_program(&organization_id, payload) {
        Ok(program) => success(StatusCode::CREATED, program),
        Err(err) => catalog_failure(err),
    }
}

pub(crate) async fn list_programs_handler<P, S>(
    State(service): SharedService<P, S>,
    TenantContext(organization_id): TenantContext,
    query: Result<Query<ProgramQuery>, QueryRejection>,
) -> Response
where
    P: ProgramRepository + 'static,
    S: StudentRepository + 'static,
{
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return failure(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    match service.list_programs(&organization_id, &query) {
        Ok(page) => success(StatusCode::OK, page),
        Err(err) => catalog_failure(err),
    }
}

pub(crate) async fn get_program_handler<P, S>(
    State(service): SharedService<P, S>,
    TenantContext(organization_id): TenantContext,
    Path(program_id): Path<String>,
) -> Response
where
    P: ProgramRepository + 'static,
    S: StudentRepository + 'static,
{
    match service.get_program(&organization_id, &ProgramId(program_id)) {
        Ok(program) => success(StatusCode::OK, program),
        Err(err) => catalog_failure(err),
    }
}

pub(crate) async fn update_program_handler<P, S>(
    State(service): SharedService<P, S>,
    TenantContext(organization_id): TenantContext,
    Path(program_id): Path<String>,
    payload: Result<Json<ProgramUpdate>, JsonRejection>,
) -> Response
where
    P: ProgramRepository + 'static,
    S: StudentRepository + 'static,
{
    let Json(update) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return failure(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    match service.update_program(&organization_id, &ProgramId(program_id), update) {
        Ok(program) => success(StatusCode::OK, program),
        Err(err) => catalog_failure(err),
    }
}

pub(crate) async fn effectiveness_handler<P, S>(
    State(service): SharedService<P, S>,
    TenantContext(organization_id): TenantContext,
    Path(program_id): Path<String>,
) -> Response
where
    P: ProgramRepository + 'static,
    S: StudentRepository + 'static,
{
    match service.effectiveness(&organization_id, &ProgramId(program_id)) {
        Ok(effectiveness) => success(StatusCode::OK, effectiveness),
        Err(err) => catalog_failure(err),
    }
}

pub(crate) async fn report_handler<P, S>(
    State(service): SharedService<P, S>,
    TenantContext(organization_id): TenantContext,
    Path(program_id): Path<String>,
    Query(params): Query<ReportParams>,
) -> Response
where
    P: ProgramRepository + 'static,
    S: StudentRepository + 'static,
{
    let timeframe = params.timeframe.as_deref().filter(|raw| !raw.trim().is_empty());
    match service.report(&organization_id, &ProgramId(program_id), timeframe) {
        Ok(report) => success(StatusCode::OK, report),
        Err(err) => catalog_failure(err),
    }
}

pub(crate) async fn program_recommendations_handler<P, S>(
    State(service): SharedService<P, S>,
    TenantContext(organization_id): TenantContext,
    Path(program_id): Path<String>,
) -> Response
where
    P: ProgramRepository + 'static,
    S: StudentRepository + 'static,
{
    match service.program_recommendations(&organization_id, &ProgramId(program_id)) {
        Ok(recommendations) => success(StatusCode::OK, recommendations),
        Err(err) => catalog_failure(err),
    }
}

pub(crate) async fn export_program_handler<P, S>(
    State(service): SharedService<P, S>,
    TenantContext(organization_id): TenantContext,
    Path(program_id): Path<String>,
) -> Response
where
    P: ProgramRepository + 'static,
    S: StudentRepository + 'static,
{
    match service.export_program_report(&organization_id, &ProgramId(program_id)) {
        Ok(csv) => csv_attachment("program-report.csv", csv),
        Err(err) => catalog_failure(err),
    }
}

pub(crate) async fn student_performance_handler<P, S>(
    State(service): SharedService<P, S>,
    TenantContext(organization_id): TenantContext,
    Path((program_id, student_id)): Path<(String, String)>,
) -> Response
where
    P: ProgramRepository + 'static,
    S: StudentRepository + 'static,
{
    match service.student_performance(
        &organization_id,
        &ProgramId(program_id),
        &StudentId(student_id),
    ) {
        Ok(performance) => success(StatusCode::OK, performance),
        Err(err) => catalog_failure(err),
    }
}

pub(crate) async fn register_student_handler<P, S>(
    State(service): SharedService<P, S>,
    TenantContext(organization_id): TenantContext,
    payload: Result<Json<Student>, JsonRejection>,
) -> Response
where
    P: ProgramRepository + 'static,
    S: StudentRepository + 'static,
{
    let Json(student) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return failure(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    match service.register_student(&organization_id, student) {
        Ok(student) => success(StatusCode::CREATED, student),
        Err(err) => catalog_failure(err),
    }
}

pub(crate) async fn get_student_handler<P, S>(
    State(service): SharedService<P, S>,
    TenantContext(organization_id): TenantContext,
    Path(student_id): Path<String>,
) -> Response
where
    P: ProgramRepository + 'static,
    S: StudentRepository + 'static,
{
    match service.get_student(&organization_id, &StudentId(student_id)) {
        Ok(student) => success(StatusCode::OK, student),
        Err(err) => catalog_failure(err),
    }
}

pub(crate) async fn student_recommendations_handler<P, S>(
    State(service): SharedService<P, S>,
    TenantContext(organization_id): TenantContext,
    Path(student_id): Path<String>,
    Query(scope): Query<ProgramScope>,
) -> Response
where
    P: ProgramRepository + 'static,
    S: StudentRepository + 'static,
{
    let program_id = scope.program_id();
    match service.student_recommendations(
        &organization_id,
        &StudentId(student_id),
        program_id.as_ref(),
    ) {
        Ok(recommendations) => success(StatusCode::OK, recommendations),
        Err(err) => catalog_failure(err),
    }
}

pub(crate) async fn import_students_handler<P, S>(
    State(service): SharedService<P, S>,
    TenantContext(organization_id): TenantContext,
    Query(scope): Query<ProgramScope>,
    body: Bytes,
) -> Response
where
    P: ProgramRepository + 'static,
    S: StudentRepository + 'static,
{
    let program_id = scope.program_id();
    match service.import_students(&organization_id, body.as_ref(), program_id.as_ref()) {
        Ok(summary) => success(StatusCode::OK, summary),
        Err(err) => catalog_failure(err),
    }
}

pub(crate) async fn export_students_handler<P, S>(
    State(service): SharedService<P, S>,
    TenantContext(organization_id): TenantContext,
    Query(params): Query<ExportParams>,
) -> Response
where
    P: ProgramRepository + 'static,
    S: StudentRepository + 'static,
{
    let exported = params
        .filter()
        .and_then(|filter| service.export_students(&organization_id, &filter));
    match exported {
        Ok(csv) => csv_attachment("students.csv", csv),
        Err(err) => catalog_failure(err),
    }
}

pub(crate) async fn analytics_programs_handler<P, S>(
    State(service): SharedService<P, S>,
    TenantContext(organization_id): TenantContext,
) -> Response
where
    P: ProgramRepository + 'static,
    S: StudentRepository + 'static,
{
    match service.analytics_programs(&organization_id) {
        Ok(entries) => success(StatusCode::OK, entries),
        Err(err) => catalog_failure(err),
    }
}

pub(crate) async fn dashboard_handler<P, S>(
    State(service): SharedService<P, S>,
    TenantContext(organization_id): TenantContext,
) -> Response
where
    P: ProgramRepository + 'static,
    S: StudentRepository + 'static,
{
    match service.dashboard(&organization_id) {
        Ok(dashboard) => success(StatusCode::OK, dashboard),
        Err(err) => catalog_failure(err),
    }
}
