use std::any::Any;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use itinera_core::flash::{FLASH_COOKIE, FlashMessage, FlashSigner};
use itinera_core::model::parse_date;
use itinera_core::{PlanStore, RequestError, TripRequest, Upload};

use crate::config::ServerConfig;
use crate::pages;

const NOT_FOUND_PAGE: &str = "Página no encontrada";
const PLAN_NOT_FOUND: &str = "No se encontró el itinerario solicitado.";
const INTERNAL_ERROR: &str = "Se produjo un error inesperado al procesar la solicitud.";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
    json: bool,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
            json: false,
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        tracing::error!(error = %format!("{err:#}"), "request failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: INTERNAL_ERROR.to_owned(),
            json: false,
        }
    }

    /// Render as `{"error": ...}` instead of the HTML error page.
    pub fn json(mut self) -> Self {
        self.json = true;
        self
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        tracing::warn!(error = %err, "rejected multipart body");
        Self {
            status: err.status(),
            message: err.body_text(),
            json: false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.json {
            let body = serde_json::json!({ "error": self.message });
            return (self.status, Json(body)).into_response();
        }
        let page = pages::error(self.status.as_u16(), &self.message);
        (self.status, Html(page)).into_response()
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    AppError::internal(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    store: Arc<PlanStore>,
    flash: FlashSigner,
}

impl AppState {
    pub fn new(flash: FlashSigner) -> Self {
        Self {
            store: Arc::new(PlanStore::new()),
            flash,
        }
    }

    pub fn store(&self) -> &PlanStore {
        &self.store
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/generate", post(generate))
        .route("/itinerary/{id}/pdf", get(download_pdf))
        .route("/api/itineraries/{id}", get(get_itinerary_json))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(config: &ServerConfig) -> Result<()> {
    if config.insecure_secret {
        tracing::warn!(
            "no secret key configured; using the development fallback. \
             Run `itinera init` or set ITINERA_SECRET_KEY"
        );
    }

    let state = AppState::new(FlashSigner::new(config.secret_key.as_bytes()));
    let app = build_router(state.clone(), config.max_upload_bytes);
    let addr: SocketAddr = format!("{}:{}", config.bind, config.port).parse()?;
    tracing::info!("itinera serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let dropped = state.store().clear();
    tracing::info!(plans = dropped, "itinera serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Flash cookies
// ---------------------------------------------------------------------------

fn flash_cookie(value: &str) -> String {
    format!("{FLASH_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax")
}

fn clear_flash_cookie() -> String {
    format!("{FLASH_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}

fn read_flash_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == FLASH_COOKIE)
        .map(|(_, value)| value)
}

/// Redirect to the form with `message` queued as an error flash.
fn redirect_with_flash(signer: &FlashSigner, message: &str) -> Response {
    let cookie = flash_cookie(&signer.sign(&FlashMessage::error(message)));
    ([(SET_COOKIE, cookie)], Redirect::to("/")).into_response()
}

// ---------------------------------------------------------------------------
// Downloads
// ---------------------------------------------------------------------------

/// ASCII stand-in for common accented Latin letters.
fn fold_ascii(c: char) -> Option<char> {
    let folded = match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' => 'a',
        'Á' | 'À' | 'Â' | 'Ä' | 'Ã' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ç' => 'c',
        'Ç' => 'C',
        _ => return None,
    };
    Some(folded)
}

/// Percent-encode `value` as an RFC 5987 `ext-value` (UTF-8, attr-char kept).
fn encode_ext_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte) {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

/// `Content-Disposition` value for downloading `filename`.
///
/// The quoted `filename` is a printable-ASCII fallback without quotes or
/// backslashes; `filename*` carries the exact UTF-8 name.
fn attachment_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            c => fold_ascii(c).unwrap_or('_'),
        })
        .collect();
    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        encode_ext_value(filename)
    )
}

// ---------------------------------------------------------------------------
// Form parsing
// ---------------------------------------------------------------------------

/// Raw fields and files of a `POST /generate` submission.
#[derive(Debug, Default)]
struct GenerateForm {
    fields: HashMap<String, String>,
    uploads: Vec<Upload>,
}

impl GenerateForm {
    async fn read(multipart: &mut Multipart) -> Result<Self, MultipartError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_owned();
            if name == "attachments" {
                let filename = field.file_name().map(str::to_owned);
                let content_type = field.content_type().map(str::to_owned);
                let data = field.bytes().await?;
                let upload = Upload::new(filename, content_type, data.to_vec());
                if upload.has_filename() {
                    form.uploads.push(upload);
                } else {
                    tracing::debug!("discarding attachment part without a filename");
                }
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }
        Ok(form)
    }

    fn text(&self, name: &str, default: &str) -> String {
        self.fields
            .get(name)
            .cloned()
            .unwrap_or_else(|| default.to_owned())
    }

    fn date(&self, name: &'static str) -> Result<chrono::NaiveDate, RequestError> {
        let value = self
            .fields
            .get(name)
            .ok_or(RequestError::MissingField(name))?;
        parse_date(name, value)
    }

    fn trip_request(&self) -> Result<TripRequest, RequestError> {
        let start = self.date("start_date")?;
        let end = self.date("end_date")?;
        Ok(
            TripRequest::new(self.text("client_name", TripRequest::DEFAULT_CLIENT), start, end)?
                .destination(self.text("primary_destination", TripRequest::DEFAULT_DESTINATION))
                .travel_style(self.text("travel_style", TripRequest::DEFAULT_STYLE))
                .special_requests(self.text("special_requests", "")),
        )
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    let cookie = read_flash_cookie(&headers);
    let flash = cookie.and_then(|value| match state.flash.verify(value) {
        Ok(flash) => Some(flash),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring invalid flash cookie");
            None
        }
    });

    let html = pages::index(flash.as_ref()).map_err(|e| AppError::internal(e.into()))?;
    if cookie.is_some() {
        Ok(([(SET_COOKIE, clear_flash_cookie())], Html(html)).into_response())
    } else {
        Ok(Html(html).into_response())
    }
}

async fn generate(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut form = GenerateForm::read(&mut multipart).await?;

    let request = match form.trip_request() {
        Ok(request) => request,
        Err(e) => {
            tracing::info!(error = %e, "rejected itinerary request");
            return Ok(redirect_with_flash(&state.flash, e.user_message()));
        }
    };

    let (text, summaries) = itinera_core::extract(&mut form.uploads);
    let plan = itinera_core::build(&request, &text, summaries);
    let id = state.store.insert(plan);
    let plan = state
        .store
        .get(&id)
        .ok_or_else(|| AppError::internal(anyhow::anyhow!("plan {id} vanished after insert")))?;

    let html = pages::itinerary(&plan, &id).map_err(|e| AppError::internal(e.into()))?;
    Ok(Html(html).into_response())
}

async fn download_pdf(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let Some(plan) = state.store.get_str(&id) else {
        tracing::info!(id = %id, "download requested for unknown itinerary");
        return Ok(redirect_with_flash(&state.flash, PLAN_NOT_FOUND));
    };

    let bytes = itinera_core::render(&plan).map_err(|e| AppError::internal(e.into()))?;
    let disposition = attachment_disposition(&plan.download_filename());
    Ok((
        [
            (CONTENT_TYPE, "application/pdf".to_owned()),
            (CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

async fn get_itinerary_json(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let plan = state
        .store
        .get_str(&id)
        .ok_or_else(|| AppError::not_found(format!("itinerary {id} not found")).json())?;
    Ok(Json(&*plan).into_response())
}

async fn not_found() -> AppError {
    AppError::not_found(NOT_FOUND_PAGE)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
