use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::api::{
    ApiAnalyzeRequest, ApiAnalyzeResponse, ApiRankRequest, ApiRankResponse, CoverImage,
};
use crate::fetch::ImageFetcher;
use covertrend::batch::{BatchOrchestrator, CoverSource};
use covertrend::config::AnalysisConfig;
use covertrend::{ranking, trends};

#[derive(Clone)]
struct AppState {
    orchestrator: BatchOrchestrator,
    fetcher: ImageFetcher,
}

pub async fn serve(args: crate::ServeArgs) -> Result<(), String> {
    let (config, config_path) = AnalysisConfig::load(args.config)?;
    if let Some(path) = config_path.as_ref() {
        info!(path = %path.display(), "loaded analysis config");
    }

    let state = AppState {
        orchestrator: BatchOrchestrator::from_config(&config),
        fetcher: ImageFetcher::new(&config.fetch)?,
    };

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/rank", post(rank_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|err| format!("invalid bind address: {}", err))?;
    info!(%addr, "cover analysis server listening");

    axum::serve(
        tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|err| format!("failed to bind server: {}", err))?,
        app,
    )
    .await
    .map_err(|err| format!("server error: {}", err))?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn analyze_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiAnalyzeRequest>,
) -> Result<Json<ApiAnalyzeResponse>, (StatusCode, String)> {
    let books = request
        .books
        .ok_or((StatusCode::BAD_REQUEST, "books array is required".to_string()))?;

    let mut warnings = Vec::new();
    let mut entries = Vec::with_capacity(books.len());
    let mut sources = Vec::with_capacity(books.len());
    for (position, book) in books.into_iter().enumerate() {
        let (entry, image) = book.into_parts(position);
        let label = entry.entry_id();
        let bytes = match image {
            CoverImage::Inline(bytes) => Some(bytes),
            CoverImage::Url(url) => match state.fetcher.fetch(&url).await {
                Ok(bytes) => Some(bytes),
                Err(err) => {
                    warnings.push(format!("{}: {}", entry.title, err));
                    None
                }
            },
            CoverImage::Invalid(detail) => {
                warnings.push(format!("{}: {}", entry.title, detail));
                None
            }
            CoverImage::Missing => None,
        };
        entries.push(entry);
        sources.push(CoverSource { label, bytes });
    }

    let analyses = state.orchestrator.run(sources).await;
    let trends = trends::aggregate(&analyses);
    let total_analyzed = analyses.len();

    Ok(Json(ApiAnalyzeResponse {
        analyses,
        trends,
        total_analyzed,
        warnings,
    }))
}

async fn rank_handler(
    Json(request): Json<ApiRankRequest>,
) -> Result<Json<ApiRankResponse>, (StatusCode, String)> {
    let books = request
        .books
        .ok_or((StatusCode::BAD_REQUEST, "books array is required".to_string()))?;

    let inputs: Vec<_> = books
        .into_iter()
        .enumerate()
        .map(|(position, book)| book.into_ranking_input(position))
        .collect();
    let ranked = ranking::rank(&inputs);
    let total_ranked = ranked.len();

    Ok(Json(ApiRankResponse {
        ranked,
        total_ranked,
    }))
}
