use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::session::CurrentUser;
use crate::errors::AppError;
use crate::models::project::{ProjectRow, RequirementRow};
use crate::rfp::drafting::synthesize_draft;
use crate::rfp::extractor::extract_requirements;
use crate::rfp::ingest::{DocumentKind, UNSUPPORTED_FORMAT_MESSAGE};
use crate::rfp::progress::DashboardSummary;
use crate::rfp::status::RequirementStatus;
use crate::rfp::store;
use crate::state::AppState;
use crate::validation::validate_project;

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: ProjectRow,
    pub requirements: Vec<RequirementRow>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    #[serde(flatten)]
    pub detail: ProjectDetail,
    pub extraction_warning: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

/// Maps a multipart failure to 413 when the body limit tripped, otherwise 400.
fn upload_error(status: StatusCode, detail: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Upload exceeds the size limit: {detail}"))
    } else {
        AppError::Validation(format!("Invalid multipart body: {detail}"))
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        upload_error(err.status(), err.body_text())
    }
}

async fn owned_project(
    state: &AppState,
    user: &CurrentUser,
    project_id: Uuid,
) -> Result<ProjectRow, AppError> {
    store::find_project(&state.db, user.id, project_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {project_id} not found")))
}

async fn project_detail(
    state: &AppState,
    user: &CurrentUser,
    project_id: Uuid,
) -> Result<ProjectDetail, AppError> {
    let project = owned_project(state, user, project_id).await?;
    let requirements = store::list_requirements(&state.db, project.id).await?;
    Ok(ProjectDetail {
        project,
        requirements,
    })
}

/// POST /api/v1/projects
pub async fn handle_create_project(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectRow>), AppError> {
    let new_project = validate_project(&req.name, req.description.as_deref())?;
    let project = store::create_project(&state.db, user.id, &new_project).await?;
    tracing::info!(project_id = %project.id, "Created project");
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/v1/projects
pub async fn handle_list_projects(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<ProjectRow>>, AppError> {
    Ok(Json(store::list_projects(&state.db, user.id).await?))
}

/// GET /api/v1/projects/:id
pub async fn handle_get_project(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectDetail>, AppError> {
    Ok(Json(project_detail(&state, &user, id).await?))
}

/// POST /api/v1/projects/:id/rfp
///
/// Multipart upload with a single `file` field. Replaces the project's
/// requirements with whatever the extractor finds in the new document.
pub async fn handle_upload_rfp(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let project = owned_project(&state, &user, id).await?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        upload = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) =
        upload.ok_or_else(|| AppError::Validation("file is required".to_string()))?;
    let kind = DocumentKind::from_file_name(&file_name)
        .ok_or_else(|| AppError::UnsupportedMediaType(UNSUPPORTED_FORMAT_MESSAGE.to_string()))?;

    let extraction = state.text_extractor.extract(kind, &bytes).await;
    let parsed = extract_requirements(&extraction.text);

    tracing::info!(
        project_id = %project.id,
        ?kind,
        bytes = bytes.len(),
        requirements = parsed.len(),
        warning = extraction.warning.is_some(),
        "Extracted RFP requirements"
    );

    let requirements =
        store::replace_requirements(&state.db, project.id, &extraction.stored_text(), &parsed)
            .await?;
    let project = owned_project(&state, &user, project.id).await?;

    Ok(Json(UploadResponse {
        detail: ProjectDetail {
            project,
            requirements,
        },
        extraction_warning: extraction.warning,
    }))
}

/// POST /api/v1/projects/:id/drafts
pub async fn handle_generate_drafts(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectDetail>, AppError> {
    let project = owned_project(&state, &user, id).await?;
    let requirements = store::list_requirements(&state.db, project.id).await?;
    let library = store::load_library(&state.db, user.id).await?;

    let drafts: Vec<(Uuid, String)> = requirements
        .iter()
        .map(|req| (req.id, synthesize_draft(&req.details, &library)))
        .collect();

    store::save_drafts(&state.db, project.id, &drafts).await?;
    tracing::info!(
        project_id = %project.id,
        drafts = drafts.len(),
        library = library.len(),
        "Generated drafts"
    );

    Ok(Json(project_detail(&state, &user, project.id).await?))
}

/// PATCH /api/v1/requirements/:id/status
pub async fn handle_update_requirement_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusUpdate>,
) -> Result<Json<RequirementRow>, AppError> {
    let status: RequirementStatus = req.status.parse().map_err(AppError::Validation)?;
    let row = store::update_requirement_status(&state.db, user.id, id, status)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Requirement {id} not found")))?;
    Ok(Json(row))
}

/// GET /api/v1/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<DashboardSummary>, AppError> {
    let rows = store::project_progress(&state.db, user.id).await?;
    let drafted = store::count_drafted_requirements(&state.db, user.id).await?;
    let answers = store::count_answers(&state.db, user.id).await?;
    Ok(Json(DashboardSummary::build(rows, drafted, answers)))
}
