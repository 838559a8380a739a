//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (request ID, tracing)
//! - Bind server to listener
//! - Dispatch requests through the route table to the proxy or the static tree

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Method, Request},
    response::Response,
    routing::any,
    Router,
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::DevServerConfig;
use crate::http::request::{request_id, MakeRequestUuidV4};
use crate::http::response::not_implemented;
use crate::lifecycle::shutdown::wait_for_shutdown;
use crate::proxy::{CookieJar, Forwarder, ProxyError};
use crate::routing::{Dispatch, RouteTable};
use crate::site::Site;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub site: Arc<Site>,
    pub forwarder: Arc<Forwarder>,
}

/// HTTP server for the dev front-end.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: DevServerConfig) -> Result<Self, ProxyError> {
        // One upstream session for the whole process
        let jar = Arc::new(CookieJar::new());
        let forwarder = Forwarder::new(&config.proxy, &config.timeouts, jar)?;

        let state = AppState {
            routes: Arc::new(RouteTable::from_config(&config)),
            site: Arc::new(Site::new(&config.site)),
            forwarder: Arc::new(forwarder),
        };

        Ok(Self {
            router: Self::build_router(state),
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// A clone of the router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until Ctrl+C or a message on `shutdown`.
    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn make_span(request: &Request<Body>) -> tracing::Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id(request),
    )
}

fn client_ip(request: &Request<Body>) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

/// Main handler: classify the path, then proxy or serve from the tree.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let path = request.uri().path().to_string();
    let dispatch = state.routes.classify(&path);

    tracing::debug!(
        method = %request.method(),
        path = %path,
        dispatch = ?dispatch,
        "Dispatching request"
    );

    match dispatch {
        Dispatch::Proxy => {
            let client_ip = client_ip(&request);
            state.forwarder.forward(request, client_ip).await
        }
        _ if request.method() != Method::GET && request.method() != Method::HEAD => {
            not_implemented(request.method())
        }
        Dispatch::Docs => state.site.serve_docs(&path).await,
        Dispatch::Root => state.site.serve_root().await,
        Dispatch::Tree => state.site.serve_tree(&path).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn server(root: &std::path::Path) -> HttpServer {
        let mut config = DevServerConfig::default();
        config.site.root = root.to_path_buf();
        config.site.nginx_conf = root.join("nginx.conf");
        HttpServer::new(config).unwrap()
    }

    async fn get(server: &HttpServer, uri: &str) -> Response {
        server
            .router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn root_redirects_to_docs_without_index() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();

        let response = get(&server(dir.path()), "/").await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/docs/");
    }

    #[tokio::test]
    async fn root_serves_index_when_present() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>app</h1>").unwrap();

        let response = get(&server(dir.path()), "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
        assert_eq!(body_text(response).await, "<h1>app</h1>");
    }

    #[tokio::test]
    async fn docs_trailing_index_is_permanently_redirected() {
        let dir = TempDir::new().unwrap();
        let response = get(&server(dir.path()), "/docs/guide/index.html/").await;
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[header::LOCATION], "/docs/guide");
    }

    #[tokio::test]
    async fn docs_use_extracted_rule() {
        let dir = TempDir::new().unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("index.html"), "docs index").unwrap();
        fs::write(docs.join("page.html"), "page html").unwrap();
        fs::write(docs.join("page.htm"), "page htm").unwrap();
        fs::write(
            dir.path().join("nginx.conf"),
            "server { location /docs/ { try_files $uri $uri.htm $uri.html /docs/index.html; } }",
        )
        .unwrap();

        let srv = server(dir.path());
        assert_eq!(body_text(get(&srv, "/docs/page").await).await, "page htm");
        assert_eq!(body_text(get(&srv, "/docs/missing").await).await, "docs index");
    }

    #[tokio::test]
    async fn tree_falls_back_to_root_index() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("assets")).unwrap();
        fs::write(dir.path().join("index.html"), "spa").unwrap();
        fs::write(dir.path().join("assets").join("app.js"), "js").unwrap();

        let srv = server(dir.path());
        let response = get(&srv, "/assets/app.js").await;
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/javascript");
        assert_eq!(body_text(response).await, "js");
        assert_eq!(body_text(get(&srv, "/settings/profile").await).await, "spa");
    }

    #[tokio::test]
    async fn missing_everything_is_404() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();

        let srv = server(dir.path());
        assert_eq!(get(&srv, "/docs/nothing").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(get(&srv, "/nothing").await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn static_routes_reject_post() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "spa").unwrap();

        let response = server(dir.path())
            .router()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/index.html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn request_id_is_echoed() {
        let dir = TempDir::new().unwrap();
        let response = get(&server(dir.path()), "/").await;
        assert!(response.headers().contains_key("x-request-id"));
    }
}
