use std::{
    collections::BTreeMap,
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    Json, Router,
    extract::{
        FromRef, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{self, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use platform_api::ApiError;
use platform_authn::{AuthnService, SessionUser};
use platform_authz::{
    ACTION_READ, ACTION_WRITE, PolicyContext, PolicyEngine, RESOURCE_SETTINGS,
};
use products_hr::{
    Department, Employee, EntityKind, EntityService, HrModule, ListQuery, Page, Position,
    Preferences, Record, ThemeMode, service::total_pages,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::Duration as TimeDuration;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

use crate::{
    config::AppConfig,
    error::{api_error, authn_error, authz_error},
    graphql::{self, SchemaType},
};

const SESSION_COOKIE: &str = "hr_session";

#[derive(Clone)]
pub struct AppState {
    pub hr: HrModule,
    pub schema: SchemaType,
    pub config: Arc<AppConfig>,
    pub auth: Arc<AuthnService>,
    pub policy: PolicyEngine,
    pub prefs: Arc<RwLock<Preferences>>,
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        let hr = HrModule::new(config.hr.clone());
        Self {
            schema: graphql::build_schema(hr.clone()),
            hr,
            auth: Arc::new(AuthnService::demo()),
            policy: PolicyEngine,
            prefs: Arc::new(RwLock::new(Preferences::new(config.default_theme))),
            cookie_key: config.cookie_key.clone(),
            config,
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "hr server listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

/// Credentialed CORS for the configured origins. Origins that do not parse
/// are skipped; an empty list allows no cross-origin callers.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    CorsLayer::new()
        .allow_credentials(true)
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_origin(AllowOrigin::list(allowed))
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/auth/me", get(me_handler))
        .route("/api/settings", get(get_settings).put(put_setting))
        .route("/api/settings/theme", get(get_theme).put(put_theme))
        .route("/api/role", get(get_role).put(put_role))
        .route("/api/{entity}", get(list_handler).post(create_handler))
        .route(
            "/api/{entity}/{id}",
            get(get_handler).patch(update_handler).delete(delete_handler),
        )
        .route("/graphql", post(graphql_handler))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login_handler(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> HttpResult<(PrivateCookieJar, Json<SessionUser>)> {
    let Json(body) = body?;
    let user = state
        .auth
        .login(&body.email, &body.password)
        .map_err(authn_error)?;
    let cookie = Cookie::build((SESSION_COOKIE, user.id.clone()))
        .path("/")
        .http_only(true)
        .secure(state.config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::hours(8))
        .build();
    Ok((jar.add(cookie), Json(user)))
}

async fn logout_handler(jar: PrivateCookieJar) -> (PrivateCookieJar, StatusCode) {
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());
    (jar, StatusCode::NO_CONTENT)
}

async fn me_handler(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> HttpResult<Json<SessionUser>> {
    Ok(Json(load_session(&state, &jar)?))
}

/// Resolves `{entity}` path segments to a typed service.
trait HrResource: Record {
    fn service(hr: &HrModule) -> Arc<dyn EntityService<Self>>;
}

impl HrResource for Employee {
    fn service(hr: &HrModule) -> Arc<dyn EntityService<Self>> {
        hr.employees()
    }
}

impl HrResource for Department {
    fn service(hr: &HrModule) -> Arc<dyn EntityService<Self>> {
        hr.departments()
    }
}

impl HrResource for Position {
    fn service(hr: &HrModule) -> Arc<dyn EntityService<Self>> {
        hr.positions()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse<T> {
    items: Vec<T>,
    total: usize,
    page: u32,
    page_size: u32,
    total_pages: u32,
}

impl<T> ListResponse<T> {
    fn new(page: Page<T>, query: &ListQuery) -> Self {
        Self {
            total_pages: total_pages(page.total, query.page_size),
            items: page.items,
            total: page.total,
            page: query.page,
            page_size: query.page_size,
        }
    }
}

async fn list_records<T: HrResource>(state: &AppState, query: ListQuery) -> HttpResult<Response> {
    let page = T::service(&state.hr)
        .list(&query)
        .await
        .map_err(api_error)?;
    Ok(Json(ListResponse::new(page, &query)).into_response())
}

async fn get_record<T: HrResource>(state: &AppState, id: &str) -> HttpResult<Response> {
    let record = T::service(&state.hr)
        .get_by_id(id)
        .await
        .map_err(api_error)?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(record).into_response())
}

async fn create_record<T: HrResource>(state: &AppState, body: Value) -> HttpResult<Response> {
    let draft: T::Draft =
        serde_json::from_value(body).map_err(|err| ApiError::InvalidInput(err.to_string()))?;
    let record = T::service(&state.hr)
        .create(draft)
        .await
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(record)).into_response())
}

async fn update_record<T: HrResource>(
    state: &AppState,
    id: &str,
    body: Value,
) -> HttpResult<Response> {
    let patch: T::Patch =
        serde_json::from_value(body).map_err(|err| ApiError::InvalidInput(err.to_string()))?;
    let record = T::service(&state.hr)
        .update(id, patch)
        .await
        .map_err(api_error)?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(record).into_response())
}

async fn delete_record<T: HrResource>(state: &AppState, id: &str) -> HttpResult<Response> {
    let existed = T::service(&state.hr).delete(id).await.map_err(api_error)?;
    if existed {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(ApiError::NotFound.into())
    }
}

async fn list_handler(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Path(entity): Path<String>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> HttpResult<Response> {
    let Query(query) = query?;
    let kind = authorize_entity(&state, &jar, &entity, ACTION_READ)?;
    match kind {
        EntityKind::Employee => list_records::<Employee>(&state, query).await,
        EntityKind::Department => list_records::<Department>(&state, query).await,
        EntityKind::Position => list_records::<Position>(&state, query).await,
    }
}

async fn get_handler(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Path((entity, id)): Path<(String, String)>,
) -> HttpResult<Response> {
    let kind = authorize_entity(&state, &jar, &entity, ACTION_READ)?;
    match kind {
        EntityKind::Employee => get_record::<Employee>(&state, &id).await,
        EntityKind::Department => get_record::<Department>(&state, &id).await,
        EntityKind::Position => get_record::<Position>(&state, &id).await,
    }
}

async fn create_handler(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Path(entity): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> HttpResult<Response> {
    let Json(body) = body?;
    let kind = authorize_entity(&state, &jar, &entity, ACTION_WRITE)?;
    match kind {
        EntityKind::Employee => create_record::<Employee>(&state, body).await,
        EntityKind::Department => create_record::<Department>(&state, body).await,
        EntityKind::Position => create_record::<Position>(&state, body).await,
    }
}

async fn update_handler(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Path((entity, id)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> HttpResult<Response> {
    let Json(body) = body?;
    let kind = authorize_entity(&state, &jar, &entity, ACTION_WRITE)?;
    match kind {
        EntityKind::Employee => update_record::<Employee>(&state, &id, body).await,
        EntityKind::Department => update_record::<Department>(&state, &id, body).await,
        EntityKind::Position => update_record::<Position>(&state, &id, body).await,
    }
}

async fn delete_handler(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Path((entity, id)): Path<(String, String)>,
) -> HttpResult<Response> {
    let kind = authorize_entity(&state, &jar, &entity, ACTION_WRITE)?;
    match kind {
        EntityKind::Employee => delete_record::<Employee>(&state, &id).await,
        EntityKind::Department => delete_record::<Department>(&state, &id).await,
        EntityKind::Position => delete_record::<Position>(&state, &id).await,
    }
}

async fn get_settings(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> HttpResult<Json<BTreeMap<String, Value>>> {
    authorize(&state, &jar, ACTION_READ, RESOURCE_SETTINGS)?;
    let prefs = state.prefs.read().await;
    Ok(Json(prefs.settings().all().clone()))
}

#[derive(Deserialize)]
struct SettingUpdate {
    key: String,
    value: Value,
}

async fn put_setting(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    body: Result<Json<SettingUpdate>, JsonRejection>,
) -> HttpResult<Json<BTreeMap<String, Value>>> {
    let Json(body) = body?;
    authorize(&state, &jar, ACTION_WRITE, RESOURCE_SETTINGS)?;
    let mut prefs = state.prefs.write().await;
    prefs.settings_mut().update(body.key, body.value);
    Ok(Json(prefs.settings().all().clone()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeQuery {
    #[serde(default)]
    system_dark: bool,
}

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThemeResponse {
    theme: ThemeMode,
    dark_mode: bool,
}

#[derive(Deserialize)]
struct ThemeUpdate {
    theme: ThemeMode,
}

async fn get_theme(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    query: Result<Query<ThemeQuery>, QueryRejection>,
) -> HttpResult<Json<ThemeResponse>> {
    let Query(query) = query?;
    authorize(&state, &jar, ACTION_READ, RESOURCE_SETTINGS)?;
    let prefs = state.prefs.read().await;
    Ok(Json(ThemeResponse {
        theme: prefs.theme(),
        dark_mode: prefs.is_dark_mode(query.system_dark),
    }))
}

async fn put_theme(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    body: Result<Json<ThemeUpdate>, JsonRejection>,
) -> HttpResult<Json<ThemeResponse>> {
    let Json(body) = body?;
    authorize(&state, &jar, ACTION_WRITE, RESOURCE_SETTINGS)?;
    let mut prefs = state.prefs.write().await;
    prefs.set_theme(body.theme);
    info!(theme = %body.theme, "theme changed");
    Ok(Json(ThemeResponse {
        theme: prefs.theme(),
        dark_mode: prefs.is_dark_mode(false),
    }))
}

#[derive(Deserialize, Serialize)]
struct RoleBody {
    role: String,
}

async fn get_role(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> HttpResult<Json<RoleBody>> {
    load_session(&state, &jar)?;
    let prefs = state.prefs.read().await;
    Ok(Json(RoleBody {
        role: prefs.role().to_string(),
    }))
}

async fn put_role(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    body: Result<Json<RoleBody>, JsonRejection>,
) -> HttpResult<Json<RoleBody>> {
    let Json(body) = body?;
    authorize(&state, &jar, ACTION_WRITE, RESOURCE_SETTINGS)?;
    let role = body.role.trim();
    if role.is_empty() {
        return Err(ApiError::InvalidInput("role must not be empty".into()).into());
    }
    let mut prefs = state.prefs.write().await;
    prefs.switch_role(role);
    Ok(Json(RoleBody {
        role: prefs.role().to_string(),
    }))
}

async fn graphql_handler(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    request: GraphQLRequest,
) -> HttpResult<GraphQLResponse> {
    let user = load_session(&state, &jar)?;
    let req = request.into_inner().data(user);
    let response = state.schema.execute(req).await;
    Ok(GraphQLResponse::from(response))
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn version_handler() -> impl IntoResponse {
    Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    version: &'static str,
}

#[derive(Serialize)]
struct VersionResponse {
    version: &'static str,
}

type HttpResult<T> = Result<T, HttpError>;

fn load_session(state: &AppState, jar: &PrivateCookieJar) -> HttpResult<SessionUser> {
    let cookie = jar.get(SESSION_COOKIE).ok_or(ApiError::Unauthorized)?;
    let user = state.auth.user(cookie.value()).map_err(authn_error)?;
    Ok(user.clone())
}

fn authorize(
    state: &AppState,
    jar: &PrivateCookieJar,
    action: &str,
    resource: &str,
) -> HttpResult<SessionUser> {
    let user = load_session(state, jar)?;
    let ctx = PolicyContext::new(user.id.as_str(), action, resource, &user.permissions);
    state.policy.check(&ctx).map_err(authz_error)?;
    Ok(user)
}

fn authorize_entity(
    state: &AppState,
    jar: &PrivateCookieJar,
    entity: &str,
    action: &str,
) -> HttpResult<EntityKind> {
    let kind: EntityKind = entity.parse().map_err(api_error)?;
    authorize(state, jar, action, kind.as_str())?;
    Ok(kind)
}

#[derive(Debug)]
struct HttpError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status = match &err {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(inner) => {
                error!(error = %inner, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl From<QueryRejection> for HttpError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text()).into()
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidInput(rejection.body_text()).into()
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code,
            message: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(%err, "failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(%err, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, header},
    };
    use http_body_util::BodyExt;
    use products_hr::HrConfig;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;

    fn router_with(edit: impl FnOnce(&mut AppConfig)) -> Router {
        let mut config = AppConfig::from_lookup(|_| None).unwrap();
        config.hr = HrConfig {
            simulate_latency: false,
            ..HrConfig::default()
        };
        edit(&mut config);
        build_router(AppState::new(Arc::new(config)))
    }

    fn test_router() -> Router {
        router_with(|_| {})
    }

    async fn read_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn login(router: &Router, email: &str) -> String {
        let request = Request::post("/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"email": email, "password": "password"}).to_string(),
            ))
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    fn authed(method: Method, uri: &str, cookie: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, cookie);
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    #[tokio::test]
    async fn health_is_public() {
        let response = test_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["ok"], json!(true));
    }

    #[tokio::test]
    async fn entity_routes_require_a_session() {
        let response = test_router()
            .oneshot(Request::get("/api/employees").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(read_json(response).await["code"], json!("UNAUTHORIZED"));
    }

    #[tokio::test]
    async fn bad_credentials_are_rejected() {
        let request = Request::post("/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"email": "admin@example.com", "password": "nope"}).to_string(),
            ))
            .unwrap();
        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn session_cookie_identifies_the_user() {
        let router = test_router();
        let cookie = login(&router, "user@example.com").await;
        let response = router
            .oneshot(authed(Method::GET, "/auth/me", &cookie, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let me = read_json(response).await;
        assert_eq!(me["role"], json!("Employee"));
    }

    #[tokio::test]
    async fn departments_list_is_paged() {
        let router = test_router();
        let cookie = login(&router, "user@example.com").await;
        let response = router
            .oneshot(authed(
                Method::GET,
                "/api/departments?page=2&pageSize=5",
                &cookie,
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["total"], json!(8));
        assert_eq!(body["totalPages"], json!(2));
        assert_eq!(body["pageSize"], json!(5));
        let ids: Vec<&str> = body["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["6", "7", "8"]);
    }

    #[tokio::test]
    async fn unknown_entity_and_id_are_not_found() {
        let router = test_router();
        let cookie = login(&router, "user@example.com").await;
        let response = router
            .clone()
            .oneshot(authed(Method::GET, "/api/payroll", &cookie, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let response = router
            .oneshot(authed(Method::GET, "/api/employees/404", &cookie, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn zero_page_is_a_bad_request() {
        let router = test_router();
        let cookie = login(&router, "user@example.com").await;
        let response = router
            .oneshot(authed(Method::GET, "/api/positions?page=0", &cookie, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_input_gets_a_json_error() {
        let router = test_router();
        let cookie = login(&router, "admin@example.com").await;
        for uri in ["/api/employees?page=abc", "/api/employees?pageSize=-1"] {
            let response = router
                .clone()
                .oneshot(authed(Method::GET, uri, &cookie, None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(read_json(response).await["code"], json!("INVALID_INPUT"));
        }

        let request = Request::post("/api/departments")
            .header(header::COOKIE, &cookie)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"name\": "))
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["code"], json!("INVALID_INPUT"));

        let request = Request::post("/auth/login")
            .body(Body::from("email=admin@example.com"))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["code"], json!("INVALID_INPUT"));
    }

    #[tokio::test]
    async fn cors_allows_only_configured_origins() {
        let preflight = |origin: &str| {
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/employees")
                .header(header::ORIGIN, origin)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap()
        };

        let router = test_router();
        let response = router
            .clone()
            .oneshot(preflight("http://localhost:5173"))
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("http://localhost:5173"))
        );
        let response = router
            .oneshot(preflight("https://evil.example"))
            .await
            .unwrap();
        assert!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );

        let closed = router_with(|config| config.cors_allowed_origins.clear());
        let response = closed
            .clone()
            .oneshot(preflight("http://localhost:5173"))
            .await
            .unwrap();
        assert!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
        let response = closed
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn secure_flag_follows_config() {
        async fn set_cookie(router: Router) -> String {
            let request = Request::post("/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"email": "user@example.com", "password": "password"}).to_string(),
                ))
                .unwrap();
            let response = router.oneshot(request).await.unwrap();
            response.headers()[header::SET_COOKIE]
                .to_str()
                .unwrap()
                .to_string()
        }

        let plain = set_cookie(test_router()).await;
        assert!(plain.contains("HttpOnly"));
        assert!(!plain.contains("Secure"));
        let tls = set_cookie(router_with(|config| config.secure_cookies = true)).await;
        assert!(tls.contains("Secure"));
    }

    #[tokio::test]
    async fn writes_need_users_write() {
        let router = test_router();
        let draft = json!({
            "name": "Legal",
            "code": "LGL",
            "status": "active"
        });

        let employee = login(&router, "user@example.com").await;
        let response = router
            .clone()
            .oneshot(authed(
                Method::POST,
                "/api/departments",
                &employee,
                Some(draft.clone()),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let admin = login(&router, "admin@example.com").await;
        let response = router
            .clone()
            .oneshot(authed(Method::POST, "/api/departments", &admin, Some(draft)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(read_json(response).await["id"], json!("9"));

        let response = router
            .oneshot(authed(Method::GET, "/api/departments?pageSize=20", &admin, None))
            .await
            .unwrap();
        assert_eq!(read_json(response).await["total"], json!(8));
    }

    #[tokio::test]
    async fn duplicate_code_conflicts() {
        let router = test_router();
        let admin = login(&router, "admin@example.com").await;
        let draft = json!({"name": "People", "code": "HR", "status": "active"});
        let response = router
            .oneshot(authed(Method::POST, "/api/departments", &admin, Some(draft)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn patch_merges_and_delete_reports_existence() {
        let router = test_router();
        let admin = login(&router, "admin@example.com").await;
        let response = router
            .clone()
            .oneshot(authed(
                Method::PATCH,
                "/api/employees/5",
                &admin,
                Some(json!({"status": "active", "notes": null})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["status"], json!("active"));
        assert!(body.get("notes").is_none());
        assert_eq!(body["name"], json!("David Brown"));

        let response = router
            .clone()
            .oneshot(authed(Method::DELETE, "/api/employees/5", &admin, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = router
            .oneshot(authed(Method::DELETE, "/api/employees/99", &admin, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn theme_updates_need_settings_write() {
        let router = test_router();
        let employee = login(&router, "user@example.com").await;
        let response = router
            .clone()
            .oneshot(authed(
                Method::GET,
                "/api/settings/theme?systemDark=true",
                &employee,
                None,
            ))
            .await
            .unwrap();
        let body = read_json(response).await;
        assert_eq!(body, json!({"theme": "system", "darkMode": true}));

        let response = router
            .clone()
            .oneshot(authed(
                Method::PUT,
                "/api/settings/theme",
                &employee,
                Some(json!({"theme": "dark"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let admin = login(&router, "admin@example.com").await;
        let response = router
            .clone()
            .oneshot(authed(
                Method::PUT,
                "/api/settings/theme",
                &admin,
                Some(json!({"theme": "dark"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(authed(Method::GET, "/api/settings", &employee, None))
            .await
            .unwrap();
        assert_eq!(read_json(response).await, json!({"theme": "dark"}));
    }

    #[tokio::test]
    async fn role_switch_is_shared() {
        let router = test_router();
        let admin = login(&router, "admin@example.com").await;
        let response = router
            .clone()
            .oneshot(authed(
                Method::PUT,
                "/api/role",
                &admin,
                Some(json!({"role": "Manager"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let response = router
            .oneshot(authed(Method::GET, "/api/role", &admin, None))
            .await
            .unwrap();
        assert_eq!(read_json(response).await, json!({"role": "Manager"}));
    }

    #[tokio::test]
    async fn graphql_requires_session() {
        let router = test_router();
        let query = json!({"query": "{ hr { positions(pageSize: 5) { total } } }"});
        let request = Request::post("/graphql")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(query.to_string()))
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let cookie = login(&router, "user@example.com").await;
        let response = router
            .oneshot(authed(Method::POST, "/graphql", &cookie, Some(query)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["data"]["hr"]["positions"]["total"], json!(15));
    }
}
