use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Component, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::aggregate::AggregateValue;
use crate::command::{DataQuality, FormatAction, Scope};
use crate::config::ServerConfig;
use crate::downloader;
use crate::error::SheetError;
use crate::events::GridEvent;
use crate::render::{SheetView, render_html};
use crate::resize::{Axis, ResizeGesture};
use crate::saving;
use crate::session::Session;
use crate::spreadsheet::{Spreadsheet, parse_cell_name};

pub struct AppState {
    session: Mutex<Session>,
    revision: Arc<AtomicU64>,
    snapshot: Option<PathBuf>,
}

impl AppState {
    /// Wraps `session` for sharing between requests. Every grid event bumps
    /// the revision the page polls for.
    pub fn new(mut session: Session, snapshot: Option<PathBuf>) -> Arc<Self> {
        let revision = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&revision);
        session.subscribe(Box::new(move |_event: &GridEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        Arc::new(AppState {
            session: Mutex::new(session),
            revision,
            snapshot,
        })
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }
}

#[derive(Serialize, Default)]
struct StatusResponse {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<AggregateValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
}

impl StatusResponse {
    fn ok() -> Self {
        StatusResponse {
            status: "ok".to_string(),
            ..Default::default()
        }
    }

    fn with_count(count: usize) -> Self {
        StatusResponse {
            count: Some(count),
            ..StatusResponse::ok()
        }
    }

    fn with_message(message: impl Into<String>) -> Self {
        StatusResponse {
            message: Some(message.into()),
            ..StatusResponse::ok()
        }
    }
}

/// A [`SheetError`] on its way back to the browser.
pub struct ApiError(SheetError);

impl From<SheetError> for ApiError {
    fn from(err: SheetError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = match &self.0 {
            err if err.is_input_guard() => StatusCode::BAD_REQUEST,
            SheetError::Snapshot(_) | SheetError::CorruptSnapshot(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if code == StatusCode::INTERNAL_SERVER_ERROR {
            warn!("request failed: {}", self.0);
        } else {
            info!("request rejected: {}", self.0);
        }
        let body = StatusResponse {
            status: "error".to_string(),
            message: Some(self.0.to_string()),
            ..Default::default()
        };
        (code, Json(body)).into_response()
    }
}

type ApiResult = Result<Json<StatusResponse>, ApiError>;

#[derive(Deserialize)]
struct SelectRequest {
    cell: String,
}

#[derive(Deserialize)]
struct EditRequest {
    cell: String,
    text: String,
}

#[derive(Deserialize)]
struct FormatRequest {
    action: String,
    color: Option<String>,
}

#[derive(Deserialize)]
struct QualityRequest {
    action: String,
}

#[derive(Deserialize)]
struct CalculateRequest {
    operation: String,
    scope: Scope,
}

#[derive(Deserialize)]
struct FindReplaceRequest {
    find: String,
    #[serde(default)]
    replace: String,
}

#[derive(Deserialize)]
struct PasteRequest {
    text: String,
}

/// Either a finished border drag or an explicit size.
#[derive(Deserialize)]
#[serde(untagged)]
enum ResizeRequest {
    Drag {
        axis: Axis,
        index: usize,
        origin: i32,
        pointer: i32,
        start_size: u32,
    },
    Size {
        axis: Axis,
        index: usize,
        size: u32,
    },
}

#[derive(Deserialize)]
struct ExportQuery {
    format: Option<String>,
}

#[derive(Deserialize)]
struct SaveQuery {
    filename: Option<String>,
}

fn address(name: &str) -> Result<crate::cell::CellAddress, SheetError> {
    parse_cell_name(name).ok_or_else(|| SheetError::InvalidCellName(name.to_string()))
}

/// Accepts only plain relative paths, so a client cannot write outside the
/// server's working directory.
fn relative_path(name: &str) -> Result<PathBuf, SheetError> {
    let path = PathBuf::from(name);
    let plain = !name.is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if plain {
        Ok(path)
    } else {
        Err(SheetError::InvalidPath(name.to_string()))
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_sheet))
        .route("/api/sheet", get(get_sheet_data))
        .route("/api/cell/:cell_name", get(get_cell))
        .route("/api/select", post(select_cell).delete(clear_selection))
        .route("/api/edit", post(edit_cell))
        .route("/api/format", post(apply_formatting))
        .route("/api/quality", post(apply_data_quality))
        .route("/api/dedupe", post(remove_duplicates))
        .route("/api/calculate", post(calculate))
        .route("/api/find_replace", post(find_and_replace))
        .route("/api/paste", post(paste))
        .route("/api/resize", post(resize))
        .route("/api/rows", post(add_row).delete(delete_row))
        .route("/api/columns", post(add_column).delete(delete_column))
        .route("/api/export", get(export_spreadsheet))
        .route("/api/snapshot", get(download_snapshot))
        .route("/api/save", post(save_spreadsheet))
        .route("/api/load", post(load_spreadsheet))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Builds the starting session: the configured snapshot if it exists,
/// otherwise an empty sheet of the configured size.
pub fn initial_session(config: &ServerConfig) -> Result<Session, SheetError> {
    let sheet = match &config.snapshot {
        Some(path) if path.exists() => saving::load_spreadsheet(path)?,
        _ => Spreadsheet::create(config.rows, config.cols),
    };
    Ok(Session::new(sheet))
}

pub async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let session = initial_session(&config)?;
    info!(
        "starting with a {}x{} sheet",
        session.sheet().rows(),
        session.sheet().cols()
    );
    let app = router(AppState::new(session, config.snapshot.clone()));

    let listener = TcpListener::bind(config.bind).await?;
    info!("Listening on http://{}", config.bind);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_sheet(State(state): State<Arc<AppState>>) -> Html<String> {
    let revision = state.revision();
    let table = render_html(&state.session());
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Spreadsheet</title>\n\
         <link rel=\"stylesheet\" href=\"/static/sheet.css\">\n</head>\n\
         <body data-revision=\"{}\">\n{}\
         <script src=\"/static/sheet.js\"></script>\n</body>\n</html>\n",
        revision, table
    ))
}

async fn get_sheet_data(State(state): State<Arc<AppState>>) -> Response {
    let revision = state.revision();
    let session = state.session();
    Json(SheetView::from_session(&session, revision)).into_response()
}

async fn get_cell(
    Path(cell_name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let addr = address(&cell_name)?;
    let session = state.session();
    let cell = session
        .sheet()
        .cell(addr)
        .ok_or(SheetError::OutOfBounds {
            row: addr.row,
            col: addr.col,
        })?;
    Ok(Json(serde_json::json!({
        "name": addr.label(),
        "text": cell.text,
        "style": cell.style,
    }))
    .into_response())
}

async fn select_cell(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SelectRequest>,
) -> ApiResult {
    let addr = address(&payload.cell)?;
    state.session().select(addr)?;
    Ok(Json(StatusResponse::ok()))
}

async fn clear_selection(State(state): State<Arc<AppState>>) -> ApiResult {
    state.session().clear_selection();
    Ok(Json(StatusResponse::ok()))
}

async fn edit_cell(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EditRequest>,
) -> ApiResult {
    let addr = address(&payload.cell)?;
    state.session().edit(addr, &payload.text)?;
    Ok(Json(StatusResponse::ok()))
}

async fn apply_formatting(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<FormatRequest>,
) -> ApiResult {
    let action = FormatAction::from_code(&payload.action, payload.color.as_deref())?;
    state.session().apply_formatting(&action)?;
    Ok(Json(StatusResponse::ok()))
}

async fn apply_data_quality(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QualityRequest>,
) -> ApiResult {
    let action: DataQuality = payload.action.parse()?;
    state.session().apply_data_quality(action)?;
    Ok(Json(StatusResponse::ok()))
}

async fn remove_duplicates(State(state): State<Arc<AppState>>) -> ApiResult {
    let cleared = state.session().remove_duplicates()?;
    Ok(Json(StatusResponse::with_count(cleared)))
}

async fn calculate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CalculateRequest>,
) -> ApiResult {
    let op = payload.operation.parse()?;
    let result = state.session().calculate(op, payload.scope)?;
    Ok(Json(StatusResponse {
        message: Some(format!("{}: {}", op, result)),
        result: Some(result),
        ..StatusResponse::ok()
    }))
}

async fn find_and_replace(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<FindReplaceRequest>,
) -> ApiResult {
    let changed = state
        .session()
        .find_and_replace(&payload.find, &payload.replace)?;
    Ok(Json(StatusResponse::with_count(changed)))
}

async fn paste(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PasteRequest>,
) -> ApiResult {
    let written = state.session().paste(&payload.text)?;
    Ok(Json(StatusResponse::with_count(written)))
}

async fn resize(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResizeRequest>,
) -> ApiResult {
    let size = match payload {
        ResizeRequest::Drag {
            axis,
            index,
            origin,
            pointer,
            start_size,
        } => {
            let gesture = ResizeGesture::begin(axis, index, origin, start_size);
            state.session().finish_resize(gesture, pointer)?
        }
        ResizeRequest::Size { axis, index, size } => {
            state.session().resize(axis, index, size)?;
            size
        }
    };
    Ok(Json(StatusResponse::with_message(size.to_string())))
}

async fn add_row(State(state): State<Arc<AppState>>) -> ApiResult {
    let row = state.session().add_row();
    info!("added row {}", row + 1);
    Ok(Json(StatusResponse::with_message((row + 1).to_string())))
}

async fn add_column(State(state): State<Arc<AppState>>) -> ApiResult {
    let col = state.session().add_column();
    let label = crate::spreadsheet::column_name(col);
    info!("added column {}", label);
    Ok(Json(StatusResponse::with_message(label)))
}

async fn delete_row(State(state): State<Arc<AppState>>) -> ApiResult {
    let removed = state.session().delete_row();
    Ok(Json(StatusResponse::with_count(removed as usize)))
}

async fn delete_column(State(state): State<Arc<AppState>>) -> ApiResult {
    let removed = state.session().delete_column();
    Ok(Json(StatusResponse::with_count(removed as usize)))
}

async fn export_spreadsheet(
    Query(params): Query<ExportQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let session = state.session();
    let format = params.format.as_deref().unwrap_or("xlsx").to_lowercase();

    let (content_type, filename, body) = match format.as_str() {
        "xlsx" => (
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            downloader::XLSX_FILENAME,
            downloader::to_xlsx(session.sheet())?,
        ),
        "csv" => (
            "text/csv; charset=utf-8",
            downloader::CSV_FILENAME,
            downloader::to_csv(session.sheet()).into_bytes(),
        ),
        other => return Err(SheetError::UnknownAction(other.to_string()).into()),
    };

    let disposition = format!("attachment; filename=\"{}\"", filename);
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition.as_str()),
        ],
        body,
    )
        .into_response())
}

async fn download_snapshot(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let buffer = saving::to_bytes(state.session().sheet())?;
    Ok(([(header::CONTENT_TYPE, "application/gzip")], buffer).into_response())
}

async fn save_spreadsheet(
    Query(params): Query<SaveQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult {
    let path = match params.filename {
        Some(name) => relative_path(&name)?,
        None => state
            .snapshot
            .clone()
            .ok_or_else(|| SheetError::UnknownAction("save without a filename".to_string()))?,
    };
    saving::save_spreadsheet(state.session().sheet(), &path)?;
    Ok(Json(StatusResponse::with_message(path.display().to_string())))
}

async fn load_spreadsheet(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult {
    if body.is_empty() {
        return Err(SheetError::CorruptSnapshot("No file data received".to_string()).into());
    }
    let sheet = saving::from_bytes(&body)?;
    state.session().replace_sheet(sheet);
    Ok(Json(StatusResponse::ok()))
}
