//! # svelteesp32-web
//!
//! Async backend: serves an embedded [`AssetTable`] from an axum [`Router`].
//!
//! Every asset becomes one route. Each route accepts any method so the core
//! can answer `405` itself; a router fallback serves the entry document for
//! client-side navigations.
//!
//! ## Usage
//!
//! ```rust,ignore
//! include!(concat!(env!("OUT_DIR"), "/svelteesp32.rs"));
//!
//! let app = init_svelte_static_files(Router::new().route("/api/status", get(status)))?;
//! let listener = TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! ```
//!
//! Registering a path the router already holds panics inside axum, so add
//! the embedded files before or alongside routes that do not collide.

pub use axum;

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method as HttpMethod, StatusCode, Uri};
use axum::routing::any;
use axum::Router;

use svelteesp32_core::{AssetTable, Method, RegistrationError, RequestHead, Response, Route, RouteRegistrar};

/// Register every route of `table` on `router`.
pub fn register<S>(router: Router<S>, table: &'static AssetTable) -> Result<Router<S>, RegistrationError>
where
    S: Clone + Send + Sync + 'static,
{
    let mut registrar = AxumRegistrar::new(router, table);
    svelteesp32_core::register(table, &mut registrar)?;
    Ok(registrar.into_router())
}

/// [`register`] with an upper bound on the number of handlers added.
pub fn register_with_capacity<S>(
    router: Router<S>,
    table: &'static AssetTable,
    capacity: usize,
) -> Result<Router<S>, RegistrationError>
where
    S: Clone + Send + Sync + 'static,
{
    let mut registrar = AxumRegistrar::new(router, table).with_capacity(capacity);
    svelteesp32_core::register(table, &mut registrar)?;
    Ok(registrar.into_router())
}

/// [`RouteRegistrar`] over an axum router.
pub struct AxumRegistrar<S> {
    router: Router<S>,
    table: &'static AssetTable,
    capacity: Option<usize>,
    added: usize,
}

impl<S> AxumRegistrar<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(router: Router<S>, table: &'static AssetTable) -> Self {
        Self {
            router,
            table,
            capacity: None,
            added: 0,
        }
    }

    /// Limit the number of handlers. Axum itself is unbounded.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn into_router(self) -> Router<S> {
        tracing::debug!(
            "registered {} handlers for {} embedded files",
            self.added,
            self.table.len()
        );
        self.router
    }
}

impl<S> RouteRegistrar for AxumRegistrar<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn handler_capacity(&self) -> Option<usize> {
        self.capacity.map(|capacity| capacity.saturating_sub(self.added))
    }

    fn add_route(&mut self, route: Route) -> Result<(), RegistrationError> {
        check_path(route.path)?;
        let options = self.table.options();
        let asset = route.asset;

        let handler = move |method: HttpMethod, uri: Uri, headers: HeaderMap| async move {
            let req = AxumRequest {
                method: &method,
                uri: &uri,
                headers: &headers,
            };
            into_response(svelteesp32_core::respond(options, asset, &req))
        };

        // axum matches the raw request target
        let wire_path = svelteesp32_core::encode_path(route.path);
        let router = std::mem::take(&mut self.router);
        self.router = router.route(&wire_path, any(handler));
        self.added += 1;
        tracing::trace!("route {} -> {}", route.path, asset.path);
        Ok(())
    }

    fn add_fallback(&mut self, table: &'static AssetTable) -> Result<(), RegistrationError> {
        let handler = move |method: HttpMethod, uri: Uri, headers: HeaderMap| async move {
            let req = AxumRequest {
                method: &method,
                uri: &uri,
                headers: &headers,
            };
            into_response(svelteesp32_core::handle(table, &req))
        };

        let router = std::mem::take(&mut self.router);
        self.router = router.fallback(handler);
        self.added += 1;
        Ok(())
    }
}

/// Axum reads `:name` and `*name` segments as parameters.
fn check_path(path: &str) -> Result<(), RegistrationError> {
    let parameter = path
        .split('/')
        .any(|segment| segment.starts_with(':') || segment.starts_with('*'));
    if !path.starts_with('/') || parameter {
        return Err(RegistrationError::InvalidPath(path.to_string()));
    }
    Ok(())
}

struct AxumRequest<'a> {
    method: &'a HttpMethod,
    uri: &'a Uri,
    headers: &'a HeaderMap,
}

impl RequestHead for AxumRequest<'_> {
    fn method(&self) -> Method {
        Method::parse(self.method.as_str())
    }

    fn path(&self) -> &str {
        self.uri.path()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

fn into_response(response: Response) -> axum::response::Response {
    let mut out = axum::response::Response::new(Body::from(response.body));
    *out.status_mut() =
        StatusCode::from_u16(response.status.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let headers = out.headers_mut();
    for (name, value) in response.headers() {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!("dropping invalid response header {}: {}", name, value),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use svelteesp32_core::{Asset, Encoding, ServeOptions};
    use tower::ServiceExt;

    static ASSETS: [Asset; 2] = [
        Asset {
            path: "/assets/index.js",
            mime: "text/javascript",
            encoding: Encoding::Gzip,
            original_len: 4096,
            etag: Some("\"00112233445566778899aabbccddeeff\""),
            entry: false,
            data: &[0x1f, 0x8b, 0x08, 0x00, 0x00],
        },
        Asset {
            path: "/index.html",
            mime: "text/html",
            encoding: Encoding::Identity,
            original_len: 16,
            etag: Some("\"ffeeddccbbaa99887766554433221100\""),
            entry: true,
            data: b"<html>app</html>",
        },
    ];

    static TABLE: AssetTable = AssetTable::new(
        &ASSETS,
        ServeOptions {
            root_path: "/",
            cache_control: Some("no-cache"),
            spa_fallback: true,
        },
    );

    async fn send(app: Router, method: &str, uri: &str, headers: &[(&str, &str)]) -> axum::response::Response {
        let mut request = axum::http::Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        app.oneshot(request.body(Body::empty()).unwrap()).await.unwrap()
    }

    async fn body(response: axum::response::Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[tokio::test]
    async fn test_serves_asset_with_headers() {
        let app = register(Router::new(), &TABLE).unwrap();
        let response = send(app, "GET", "/assets/index.js", &[]).await;

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers["content-type"], "text/javascript");
        assert_eq!(headers["content-encoding"], "gzip");
        assert_eq!(headers["etag"], "\"00112233445566778899aabbccddeeff\"");
        assert_eq!(headers["cache-control"], "no-cache");
        assert_eq!(body(response).await, vec![0x1f, 0x8b, 0x08, 0x00, 0x00]);
    }

    #[tokio::test]
    async fn test_root_serves_entry() {
        let app = register(Router::new(), &TABLE).unwrap();
        let response = send(app, "GET", "/", &[]).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await, b"<html>app</html>");
    }

    #[tokio::test]
    async fn test_conditional_get() {
        let app = register(Router::new(), &TABLE).unwrap();
        let fresh = [("if-none-match", "\"ffeeddccbbaa99887766554433221100\"")];
        let response = send(app.clone(), "GET", "/index.html", &fresh).await;
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert!(body(response).await.is_empty());

        let stale = [("if-none-match", "\"0000\"")];
        let response = send(app, "GET", "/index.html", &stale).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await, b"<html>app</html>");
    }

    #[tokio::test]
    async fn test_non_get_is_method_not_allowed() {
        let app = register(Router::new(), &TABLE).unwrap();
        let response = send(app, "POST", "/index.html", &[]).await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["allow"], "GET");
    }

    #[tokio::test]
    async fn test_spa_fallback_and_not_found() {
        let app = register(Router::new(), &TABLE).unwrap();
        let html = [("accept", "text/html,application/xhtml+xml;q=0.9")];
        let response = send(app.clone(), "GET", "/settings/wifi", &html).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await, b"<html>app</html>");

        let json = [("accept", "application/json")];
        let response = send(app, "GET", "/missing.json", &json).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_application_routes_are_kept() {
        let router = Router::new().route("/api/status", get(|| async { "{\"led\":false}" }));
        let app = register(router, &TABLE).unwrap();

        let response = send(app, "GET", "/api/status", &[]).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await, b"{\"led\":false}");
    }

    #[test]
    fn test_capacity_exceeded() {
        let err = register_with_capacity(Router::<()>::new(), &TABLE, 3).unwrap_err();
        assert_eq!(
            err,
            RegistrationError::CapacityExceeded {
                required: 4,
                capacity: 3
            }
        );
        assert!(register_with_capacity(Router::<()>::new(), &TABLE, 4).is_ok());
    }

    #[test]
    fn test_parameter_paths_are_rejected() {
        assert!(check_path("/assets/app.js").is_ok());
        assert!(check_path("/:id.js").is_err());
        assert!(check_path("/files/*rest").is_err());
        assert!(check_path("relative.js").is_err());
    }

    #[tokio::test]
    async fn test_percent_encoded_request_reaches_asset() {
        static SPACED: [Asset; 1] = [Asset {
            path: "/img/my logo.svg",
            mime: "image/svg+xml",
            encoding: Encoding::Identity,
            original_len: 6,
            etag: None,
            entry: false,
            data: b"<svg/>",
        }];
        static SPACED_TABLE: AssetTable = AssetTable::new(&SPACED, ServeOptions::new());

        let app = register(Router::new(), &SPACED_TABLE).unwrap();
        let response = send(app, "GET", "/img/my%20logo.svg", &[]).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await, b"<svg/>");
    }
}
