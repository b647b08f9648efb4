use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, ResponseError, get, post, web};
use job_matcher::extract::DocumentFormat;
use job_matcher::{
    CorpusStore, Filters, MatchError, RankOptions, RankedResult, ResolvedQuery, SearchOutcome,
    Settings, SharedIndex, SortBy, build_index,
};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::sync::Mutex;

/// Reply to an application missing its name, email or resume.
pub const MISSING_FIELDS: &str = "All fields are required.";

pub struct AppState {
    pub index: SharedIndex,
    pub store: CorpusStore,
    pub settings: Settings,
    /// Held while a replacement index is being built.
    pub reload_lock: Mutex<()>,
}

impl AppState {
    pub fn new(index: SharedIndex, store: CorpusStore, settings: Settings) -> Self {
        Self {
            index,
            store,
            settings,
            reload_lock: Mutex::new(()),
        }
    }

    fn rank_options(&self, params: &FilterParams) -> RankOptions {
        let search_cfg = &self.settings.search;
        RankOptions {
            top_n: params.limit.unwrap_or(search_cfg.default_limit),
            filters: Filters {
                location: params.location.clone(),
                company: params.company.clone(),
                skill_level: params.skill_level.clone(),
            },
            sort_by: SortBy::parse_lenient(
                params.sort_by.as_deref().or(Some(search_cfg.default_sort.as_str())),
            ),
            fallback_scope: search_cfg.fallback_scope,
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error("All fields are required.")]
    MissingFields,
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Match(MatchError::Extraction { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Match(_) | Self::MissingFields => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let code = match self {
            Self::Match(e) => e.status_code(),
            Self::MissingFields => "MISSING_FIELDS",
            Self::Internal(_) => "INTERNAL_ERROR",
        };
        HttpResponse::build(self.status_code()).json(ErrorBody {
            code,
            message: self.to_string(),
        })
    }
}

#[derive(Deserialize, Debug)]
pub struct FilterParams {
    limit: Option<usize>,
    location: Option<String>,
    company: Option<String>,
    skill_level: Option<String>,
    sort_by: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct SearchRequest {
    query: Option<String>,
    #[serde(flatten)]
    filters: FilterParams,
}

/// Query string of a resume upload. Listed flat: query strings cannot carry
/// typed values through `#[serde(flatten)]`.
#[derive(Deserialize, Debug)]
pub struct ResumeParams {
    filename: String,
    limit: Option<usize>,
    location: Option<String>,
    company: Option<String>,
    skill_level: Option<String>,
    sort_by: Option<String>,
}

impl ResumeParams {
    fn filters(&self) -> FilterParams {
        FilterParams {
            limit: self.limit,
            location: self.location.clone(),
            company: self.company.clone(),
            skill_level: self.skill_level.clone(),
            sort_by: self.sort_by.clone(),
        }
    }
}

/// Query string of a job application; the resume is the request body.
#[derive(Deserialize, Debug)]
pub struct ApplyParams {
    name: Option<String>,
    email: Option<String>,
    filename: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ReloadParams {
    #[serde(default)]
    refresh: bool,
}

/// A posting as returned to clients; the scored skills text is not exposed.
#[derive(Serialize)]
struct JobView {
    title: String,
    company: String,
    location: String,
    description: String,
    date_posted: String,
    skill_level: String,
    link: String,
    source: String,
    similarity: Option<f64>,
}

impl From<RankedResult> for JobView {
    fn from(result: RankedResult) -> Self {
        let job = result.record;
        Self {
            title: job.title,
            company: job.company,
            location: job.location,
            description: job.description,
            date_posted: job.date_posted,
            skill_level: job.skill_level,
            link: job.link,
            source: job.source,
            similarity: result.similarity,
        }
    }
}

#[derive(Serialize)]
struct SearchResponse {
    query: String,
    results: Vec<JobView>,
    message: Option<String>,
}

impl From<SearchOutcome> for SearchResponse {
    fn from(outcome: SearchOutcome) -> Self {
        Self {
            query: outcome.label,
            results: outcome.results.into_iter().map(JobView::from).collect(),
            message: outcome.message,
        }
    }
}

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("Job Matcher API")
}

#[post("/search")]
async fn search(
    request: web::Json<SearchRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let query = ResolvedQuery::resolve(request.query.as_deref(), None)?;
    let options = data.rank_options(&request.filters);
    let outcome = data.index.current().search(&query, &options)?;
    info!("Search '{}' returned {} results", query.text, outcome.results.len());
    Ok(HttpResponse::Ok().json(SearchResponse::from(outcome)))
}

/// Writes `body` to a uniquely named file in `dir`. The file is removed when dropped.
fn store_upload(dir: &Path, prefix: &str, format: DocumentFormat, body: &[u8]) -> io::Result<NamedTempFile> {
    fs::create_dir_all(dir)?;
    let mut file = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(&format!(".{}", format.extension()))
        .tempfile_in(dir)?;
    file.write_all(body)?;
    file.flush()?;
    Ok(file)
}

fn upload_error(e: io::Error) -> ApiError {
    ApiError::Internal(format!("cannot store upload: {e}"))
}

#[post("/search/resume")]
async fn search_resume(
    params: web::Query<ResumeParams>,
    body: web::Bytes,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let format = DocumentFormat::detect(Path::new(&params.filename))?;
    if body.is_empty() {
        return Err(MatchError::MalformedQuery.into());
    }

    let upload_dir = data.settings.server.upload_dir.clone();
    let query = web::block(move || -> Result<ResolvedQuery, ApiError> {
        let upload = store_upload(&upload_dir, "resume-", format, &body).map_err(upload_error)?;
        debug!("Extracting resume upload {}", upload.path().display());
        Ok(ResolvedQuery::resume(upload.path())?)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    let options = data.rank_options(&params.filters());
    let outcome = data.index.current().search(&query, &options)?;
    Ok(HttpResponse::Ok().json(SearchResponse::from(outcome)))
}

fn required(value: Option<&str>) -> Result<&str, ApiError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::MissingFields)
}

/// Stores an applicant's resume under `<upload_dir>/applications` and records the application.
#[post("/apply")]
async fn apply(
    params: web::Query<ApplyParams>,
    body: web::Bytes,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let name = required(params.name.as_deref())?.to_string();
    let email = required(params.email.as_deref())?.to_string();
    let filename = required(params.filename.as_deref())?;
    if body.is_empty() {
        return Err(ApiError::MissingFields);
    }
    let format = DocumentFormat::detect(Path::new(filename))?;

    let dir = data.settings.server.upload_dir.join("applications");
    let saved = web::block(move || -> Result<PathBuf, ApiError> {
        let upload = store_upload(&dir, "application-", format, &body).map_err(upload_error)?;
        let (_, path) = upload.keep().map_err(|e| upload_error(e.error))?;
        Ok(path)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    info!(
        "Received application from {} ({}), resume saved to {}",
        name,
        email,
        saved.display()
    );
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "name": name,
        "message": format!("Thank you, {name}. Your application has been received."),
    })))
}

#[get("/stats")]
async fn stats(data: web::Data<AppState>) -> impl Responder {
    let index = data.index.current();
    HttpResponse::Ok().json(serde_json::json!({
        "document_count": index.document_count(),
        "vocabulary_size": index.vocabulary_size(),
        "version": data.index.version(),
    }))
}

#[post("/reload")]
async fn reload(params: web::Query<ReloadParams>, data: web::Data<AppState>) -> impl Responder {
    let _guard = data.reload_lock.lock().await;
    info!("Reloading search index (refresh: {})", params.refresh);

    let index = build_index(&data.settings, &data.store, params.refresh).await;
    let document_count = index.document_count();
    let version = data.index.replace(index);
    if document_count == 0 {
        error!("Reloaded index is empty");
    }

    HttpResponse::Ok().json(serde_json::json!({
        "version": version,
        "document_count": document_count,
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(hello)
        .service(search)
        .service(search_resume)
        .service(apply)
        .service(stats)
        .service(reload);
}
