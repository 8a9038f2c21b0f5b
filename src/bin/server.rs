use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use chromecloth::config::{
    CONTROLS, Control, Params, PathMethod, Preset, SmoothingMethod, SmoothingSampling, Viewport,
};
use chromecloth::{ChromeclothError, Session, render};

const PREVIEW_SIZE: usize = 512;

type SharedSession = Arc<Mutex<Session>>;

/// Partial parameter update from the control panel. Missing fields keep their current value.
#[derive(Deserialize, Default)]
struct ParamsPatch {
    // Rings
    ring_count: Option<usize>,
    vertices_per_ring: Option<usize>,
    inner_hole: Option<f64>,
    radius_scale: Option<f64>,
    // Angular
    angle_offset: Option<f64>,
    path_method: Option<PathMethod>,
    // Noise
    seed: Option<f64>,
    smoothing_scale: Option<f64>,
    x_multiplier: Option<f64>,
    y_multiplier: Option<f64>,
    polar_sampling: Option<bool>,
    single_axis_noise: Option<bool>,
    map_offset_to_unit_range: Option<bool>,
    // Smoothing
    smooth_enabled: Option<bool>,
    smoothing_method: Option<SmoothingMethod>,
    smoothing_sampling: Option<SmoothingSampling>,
    path_noise_smoothing: Option<f64>,
    inversed: Option<bool>,
    // Moiré
    moire_enabled: Option<bool>,
    moire_x: Option<f64>,
    moire_y: Option<f64>,
}

impl ParamsPatch {
    fn apply(self, p: &mut Params) {
        p.ring_count = self.ring_count.unwrap_or(p.ring_count);
        p.vertices_per_ring = self.vertices_per_ring.unwrap_or(p.vertices_per_ring);
        p.inner_hole = self.inner_hole.unwrap_or(p.inner_hole);
        p.radius_scale = self.radius_scale.unwrap_or(p.radius_scale);
        p.angle_offset = self.angle_offset.unwrap_or(p.angle_offset);
        p.path_method = self.path_method.unwrap_or(p.path_method);
        p.seed = self.seed.unwrap_or(p.seed);
        p.smoothing_scale = self.smoothing_scale.unwrap_or(p.smoothing_scale);
        p.x_multiplier = self.x_multiplier.unwrap_or(p.x_multiplier);
        p.y_multiplier = self.y_multiplier.unwrap_or(p.y_multiplier);
        p.polar_sampling = self.polar_sampling.unwrap_or(p.polar_sampling);
        p.single_axis_noise = self.single_axis_noise.unwrap_or(p.single_axis_noise);
        p.map_offset_to_unit_range = self
            .map_offset_to_unit_range
            .unwrap_or(p.map_offset_to_unit_range);
        p.smooth_enabled = self.smooth_enabled.unwrap_or(p.smooth_enabled);
        p.smoothing_method = self.smoothing_method.unwrap_or(p.smoothing_method);
        p.smoothing_sampling = self.smoothing_sampling.unwrap_or(p.smoothing_sampling);
        p.path_noise_smoothing = self.path_noise_smoothing.unwrap_or(p.path_noise_smoothing);
        p.inversed = self.inversed.unwrap_or(p.inversed);
        p.moire_enabled = self.moire_enabled.unwrap_or(p.moire_enabled);
        p.moire_offset.x = self.moire_x.unwrap_or(p.moire_offset.x);
        p.moire_offset.y = self.moire_y.unwrap_or(p.moire_offset.y);
    }
}

#[derive(Serialize)]
struct GenerateResponse {
    params: Params,
    svg: String,
    filename: String,
    preview: String,
    regenerations: u64,
    timings: Vec<TimingEntry>,
}

#[derive(Serialize)]
struct TimingEntry {
    name: String,
    ms: f64,
}

#[derive(Serialize)]
struct ControlsResponse {
    sliders: Vec<Control>,
    toggles: Vec<&'static str>,
    presets: Vec<&'static str>,
}

enum AppError {
    Domain(ChromeclothError),
    Internal(String),
}

impl From<ChromeclothError> for AppError {
    fn from(e: ChromeclothError) -> Self {
        AppError::Domain(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Domain(e @ ChromeclothError::UnknownPreset(_)) => {
                (StatusCode::NOT_FOUND, e.to_string())
            }
            AppError::Domain(e @ ChromeclothError::InvalidParams(_)) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            AppError::Domain(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AppError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        log::warn!("request failed: {message}");
        (status, message).into_response()
    }
}

fn encode_png(rgba: &[u8], w: usize, h: usize) -> Result<String, ChromeclothError> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new(&mut buf);
    encoder.write_image(rgba, w as u32, h as u32, image::ExtendedColorType::Rgba8)?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&buf);
    Ok(format!("data:image/png;base64,{}", b64))
}

fn snapshot(session: &Session) -> Result<GenerateResponse, ChromeclothError> {
    let viewport = session.viewport();
    let long_side = viewport.width.max(viewport.height).max(1.0);
    let pw = ((viewport.width / long_side) * PREVIEW_SIZE as f64).round().max(1.0) as usize;
    let ph = ((viewport.height / long_side) * PREVIEW_SIZE as f64).round().max(1.0) as usize;
    let rgba = render::render_preview(session.scene(), viewport, pw, ph);

    Ok(GenerateResponse {
        params: session.params().clone(),
        svg: session.export_svg(),
        filename: session.export_filename(),
        preview: encode_png(&rgba, pw, ph)?,
        regenerations: session.regenerations(),
        timings: session
            .timings()
            .iter()
            .map(|t| TimingEntry {
                name: t.name.to_string(),
                ms: t.ms,
            })
            .collect(),
    })
}

/// Runs `f` against the locked session on a blocking thread.
///
/// A regeneration holds the lock for its whole duration, so even plain reads
/// stay off the async workers.
async fn with_session<T, F>(session: SharedSession, f: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&mut Session) -> Result<T, AppError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = session
            .lock()
            .map_err(|_| AppError::Internal("session lock poisoned".into()))?;
        f(&mut *guard)
    })
    .await
    .map_err(|e| AppError::Internal(format!("session task failed: {e}")))?
}

/// Applies `mutate` (one regeneration) and snapshots the result.
async fn mutate_and_snapshot<F>(session: SharedSession, mutate: F) -> Result<Json<GenerateResponse>, AppError>
where
    F: FnOnce(&mut Session) -> Result<(), ChromeclothError> + Send + 'static,
{
    let response = with_session(session, move |s| {
        mutate(s)?;
        Ok(snapshot(s)?)
    })
    .await?;

    Ok(Json(response))
}

async fn controls_handler() -> Json<ControlsResponse> {
    Json(ControlsResponse {
        sliders: CONTROLS.to_vec(),
        toggles: vec![
            "map_offset_to_unit_range",
            "polar_sampling",
            "single_axis_noise",
            "moire_enabled",
            "inversed",
            "smooth_enabled",
        ],
        presets: Preset::ALL.iter().map(|p| p.name()).collect(),
    })
}

async fn get_params_handler(State(session): State<SharedSession>) -> Result<Json<Params>, AppError> {
    let params = with_session(session, |s| Ok(s.params().clone())).await?;
    Ok(Json(params))
}

async fn update_params_handler(
    State(session): State<SharedSession>,
    Json(patch): Json<ParamsPatch>,
) -> Result<Json<GenerateResponse>, AppError> {
    mutate_and_snapshot(session, move |s| {
        s.update(|p| {
            patch.apply(p);
            p.clamp_to_controls();
        });
        Ok(())
    })
    .await
}

async fn randomize_handler(State(session): State<SharedSession>) -> Result<Json<GenerateResponse>, AppError> {
    mutate_and_snapshot(session, |s| {
        s.randomize(&mut rand::rng());
        Ok(())
    })
    .await
}

async fn preset_handler(
    State(session): State<SharedSession>,
    Path(name): Path<String>,
) -> Result<Json<GenerateResponse>, AppError> {
    let preset: Preset = name.parse()?;
    mutate_and_snapshot(session, move |s| {
        s.apply_preset(preset);
        Ok(())
    })
    .await
}

async fn export_handler(State(session): State<SharedSession>) -> Result<Response, AppError> {
    let (svg, filename) = with_session(session, |s| Ok((s.export_svg(), s.export_filename()))).await?;
    log::info!("exporting {filename}");
    Ok((
        [
            (header::CONTENT_TYPE, "image/svg+xml;charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        svg,
    )
        .into_response())
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // The noise field is seeded once per session.
    let noise_seed = std::env::var("CHROMECLOTH_NOISE_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(rand::random::<u64>);
    let session = Session::new(noise_seed, Viewport::default(), Params::default());
    log::info!("session noise seed {noise_seed}");
    let shared: SharedSession = Arc::new(Mutex::new(session));

    let frontend = ServeDir::new("frontend");

    let app = Router::new()
        .route("/api/controls", get(controls_handler))
        .route("/api/params", get(get_params_handler).post(update_params_handler))
        .route("/api/randomize", post(randomize_handler))
        .route("/api/preset/{name}", post(preset_handler))
        .route("/api/export", get(export_handler))
        .with_state(shared)
        .layer(CorsLayer::permissive())
        .fallback_service(frontend);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    log::info!("chromecloth control panel at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
