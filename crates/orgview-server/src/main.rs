use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use orgview_api::{
    AddConnectionRequest, AddConnectionResponse, ApiError, AutocompleteRequest,
    ConnectionCountsDto, ConnectionDto, EmployeeDto, FiltersDto, HealthDto, LocationBucketDto,
    PersonNodeDto, RelationshipDto, ReloadResponse, SearchRequest, StatsDto, SuggestionDto,
    SystemInfoDto,
};
use orgview_app::DirectoryService;
use specta::TypeCollection;
use specta_typescript::Typescript;
use std::net::SocketAddr;
use std::path::{Path as StdPath, PathBuf};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Employee directory JSON file. The bundled sample is used when omitted.
    #[arg(long)]
    data: Option<PathBuf>,

    #[arg(long, default_value = "generated/api.ts")]
    types_out: PathBuf,

    #[arg(long)]
    types_only: bool,

    #[arg(long, default_value = "static")]
    frontend_dist: PathBuf,

    #[arg(long)]
    skip_types_gen: bool,
}

struct ServerState {
    service: DirectoryService,
}

#[derive(Debug)]
struct HttpError(ApiError);

type ApiResult<T> = Result<Json<T>, HttpError>;

impl From<ApiError> for HttpError {
    fn from(value: ApiError) -> Self {
        Self(value)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = match self.0.code.as_str() {
            "invalid_argument" => StatusCode::BAD_REQUEST,
            "not_found" => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self.0)).into_response()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    if args.types_only {
        write_typescript_bindings(&args.types_out)?;
        info!(path = %args.types_out.display(), "Generated frontend API types");
        return Ok(());
    }

    if !args.skip_types_gen {
        write_typescript_bindings(&args.types_out)?;
        info!(path = %args.types_out.display(), "Generated frontend API types");
    }

    let service = match &args.data {
        Some(path) => DirectoryService::open(path)
            .with_context(|| format!("Failed to load directory from {}", path.display()))?,
        None => DirectoryService::sample().context("Failed to load bundled sample directory")?,
    };

    let state = Arc::new(ServerState { service });
    let mut app = router(state);

    if args.frontend_dist.exists() {
        let spa = ServeDir::new(&args.frontend_dist)
            .not_found_service(ServeFile::new(args.frontend_dist.join("index.html")));
        app = app.fallback_service(spa);
    }

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .context("Failed to parse server address")?;
    info!(%addr, "Starting orgview server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: Arc<ServerState>) -> Router {
    let api_routes = Router::new()
        .route("/search", get(search))
        .route("/hierarchy/{name}", get(hierarchy))
        .route("/map-data/{name}", get(map_data))
        .route("/filters", get(filters))
        .route("/autocomplete", get(autocomplete))
        .route("/stats", get(stats))
        .route("/add-connection", post(add_connection))
        .route("/reload", post(reload))
        .route("/system-info", get(system_info));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

fn collect_types() -> TypeCollection {
    let mut types = TypeCollection::default();

    types
        .register::<ApiError>()
        .register::<RelationshipDto>()
        .register::<ConnectionCountsDto>()
        .register::<SearchRequest>()
        .register::<EmployeeDto>()
        .register::<PersonNodeDto>()
        .register::<LocationBucketDto>()
        .register::<FiltersDto>()
        .register::<AutocompleteRequest>()
        .register::<SuggestionDto>()
        .register::<StatsDto>()
        .register::<AddConnectionRequest>()
        .register::<ConnectionDto>()
        .register::<AddConnectionResponse>()
        .register::<ReloadResponse>()
        .register::<SystemInfoDto>()
        .register::<HealthDto>();

    types
}

fn write_typescript_bindings(path: &StdPath) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!(
                "Failed to create type output directory: {}",
                parent.display()
            )
        })?;
    }

    let types = collect_types();
    Typescript::default()
        .export_to(path, &types)
        .with_context(|| format!("Failed to write TypeScript bindings to {}", path.display()))
}

async fn health(State(state): State<Arc<ServerState>>) -> Json<HealthDto> {
    Json(state.service.health())
}

async fn search(
    State(state): State<Arc<ServerState>>,
    Query(req): Query<SearchRequest>,
) -> Json<Vec<EmployeeDto>> {
    Json(state.service.search(req))
}

async fn hierarchy(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
) -> ApiResult<PersonNodeDto> {
    let root = state.service.hierarchy(&name)?;
    Ok(Json(PersonNodeDto::from(&root)))
}

async fn map_data(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
) -> ApiResult<Vec<LocationBucketDto>> {
    let buckets = state.service.map_data(&name)?;
    Ok(Json(buckets.iter().map(LocationBucketDto::from).collect()))
}

async fn filters(State(state): State<Arc<ServerState>>) -> Json<FiltersDto> {
    Json(state.service.filters())
}

async fn autocomplete(
    State(state): State<Arc<ServerState>>,
    Query(req): Query<AutocompleteRequest>,
) -> Json<Vec<SuggestionDto>> {
    Json(state.service.autocomplete(req))
}

async fn stats(State(state): State<Arc<ServerState>>) -> Json<StatsDto> {
    Json(state.service.stats())
}

async fn add_connection(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<AddConnectionRequest>,
) -> ApiResult<AddConnectionResponse> {
    state
        .service
        .add_connection(req)
        .map(Json)
        .map_err(Into::into)
}

async fn reload(State(state): State<Arc<ServerState>>) -> ApiResult<ReloadResponse> {
    state.service.reload().map(Json).map_err(Into::into)
}

async fn system_info(State(state): State<Arc<ServerState>>) -> Json<SystemInfoDto> {
    Json(state.service.system_info())
}
