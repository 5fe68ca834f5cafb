//! Request resolution and response construction.
//!
//! Each request walks the same small state machine regardless of which
//! server delivered it:
//!
//! 1. Match the path exactly against the table (including the root alias).
//! 2. Unmatched GET navigations that accept HTML get the entry document
//!    when SPA fallback is enabled, everything else gets `404`.
//! 3. A matched asset requested with any method but GET gets `405`.
//! 4. A validator matching the asset's ETag gets `304` with no body.
//! 5. Otherwise `200` with the stored bytes.
//!
//! Nothing here allocates or locks; handlers are reentrant.

use std::borrow::Cow;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::asset::{Asset, AssetTable, ServeOptions};

/// Bytes a browser percent-encodes in a URL path, plus `%` itself.
const PATH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// HTTP request method, as far as static serving cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Other,
}

impl Method {
    /// Every method with its own variant, in registration order.
    pub const KNOWN: [Method; 7] = [
        Method::Get,
        Method::Head,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Patch,
        Method::Options,
    ];

    /// Parse a method token. Unknown tokens map to [`Method::Other`].
    pub fn parse(method: &str) -> Self {
        match method {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            "PATCH" => Method::Patch,
            "OPTIONS" => Method::Options,
            _ => Method::Other,
        }
    }
}

/// Read access to an incoming request, implemented by each server adapter.
pub trait RequestHead {
    /// Request method.
    fn method(&self) -> Method;

    /// Request target as sent by the client. A query string is allowed and
    /// ignored during matching.
    fn path(&self) -> &str;

    /// Value of the named header. Lookup is case-insensitive.
    fn header(&self, name: &str) -> Option<&str>;
}

/// Status codes produced by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NotModified,
    NotFound,
    MethodNotAllowed,
}

impl Status {
    pub const fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::NotModified => 304,
            Status::NotFound => 404,
            Status::MethodNotAllowed => 405,
        }
    }

    pub const fn reason(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::NotModified => "Not Modified",
            Status::NotFound => "Not Found",
            Status::MethodNotAllowed => "Method Not Allowed",
        }
    }
}

/// A response header.
pub type Header = (&'static str, &'static str);

const MAX_HEADERS: usize = 4;

/// A fully-determined response. Borrows only from the static table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    headers: [Option<Header>; MAX_HEADERS],
    pub body: &'static [u8],
}

impl Response {
    fn new(status: Status) -> Self {
        Self {
            status,
            headers: [None; MAX_HEADERS],
            body: &[],
        }
    }

    fn with_header(mut self, name: &'static str, value: Option<&'static str>) -> Self {
        if let Some(value) = value {
            if let Some(slot) = self.headers.iter_mut().find(|slot| slot.is_none()) {
                *slot = Some((name, value));
            }
        }
        self
    }

    fn with_body(mut self, body: &'static [u8]) -> Self {
        self.body = body;
        self
    }

    /// `404 Not Found` with a short plain-text body.
    pub fn not_found() -> Self {
        Self::new(Status::NotFound)
            .with_header("Content-Type", Some("text/plain"))
            .with_body(b"Not Found")
    }

    /// `405 Method Not Allowed` advertising GET.
    pub fn method_not_allowed() -> Self {
        Self::new(Status::MethodNotAllowed)
            .with_header("Allow", Some("GET"))
            .with_header("Content-Type", Some("text/plain"))
            .with_body(b"Method Not Allowed")
    }

    /// Headers in insertion order.
    pub fn headers(&self) -> impl Iterator<Item = Header> + '_ {
        self.headers.iter().flatten().copied()
    }

    /// Value of a response header. Lookup is case-insensitive.
    pub fn header(&self, name: &str) -> Option<&'static str> {
        self.headers()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }
}

/// Outcome of matching a request against the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Exact path match.
    Asset(&'static Asset),
    /// No match, entry document served for client-side routing.
    Fallback(&'static Asset),
    NotFound,
}

/// Strip query string and fragment from a request target.
fn request_path(target: &str) -> &str {
    let end = target.find(['?', '#']).unwrap_or(target.len());
    &target[..end]
}

/// Whether the request target `target` names the stored path `stored`.
///
/// The target is percent-decoded on the fly; query and fragment are ignored.
pub fn path_matches(stored: &str, target: &str) -> bool {
    percent_decode_str(request_path(target)).eq(stored.bytes())
}

/// `path` as a client sends it on the wire. Servers that match the raw
/// request target register this form.
pub fn encode_path(path: &str) -> Cow<'_, str> {
    utf8_percent_encode(path, PATH_ENCODE_SET).into()
}

/// Whether the client declared it accepts an HTML document.
fn wants_html(accept: Option<&str>) -> bool {
    accept.is_some_and(|accept| {
        accept.split(',').any(|item| {
            let media = item.split(';').next().unwrap_or("").trim();
            media.eq_ignore_ascii_case("text/html")
                || media.eq_ignore_ascii_case("application/xhtml+xml")
        })
    })
}

/// Match a request against the table.
pub fn resolve(table: &AssetTable, req: &impl RequestHead) -> Resolution {
    let target = req.path();

    let assets: &'static [Asset] = table.assets();
    if let Some(asset) = assets.iter().find(|asset| path_matches(asset.path, target)) {
        return Resolution::Asset(asset);
    }
    if path_matches(table.options().root_path, target) {
        if let Some(entry) = table.entry() {
            return Resolution::Asset(entry);
        }
    }

    match table.fallback() {
        Some(entry) if req.method() == Method::Get && wants_html(req.header("Accept")) => {
            Resolution::Fallback(entry)
        }
        _ => Resolution::NotFound,
    }
}

/// Whether an `If-None-Match` header value matches `etag`.
fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    let etag = etag.strip_prefix("W/").unwrap_or(etag);
    if_none_match.split(',').any(|candidate| {
        let candidate = candidate.trim();
        candidate == "*" || candidate.strip_prefix("W/").unwrap_or(candidate) == etag
    })
}

/// Build the response for a request that resolved to `asset`.
pub fn respond(options: &ServeOptions, asset: &'static Asset, req: &impl RequestHead) -> Response {
    if req.method() != Method::Get {
        return Response::method_not_allowed();
    }

    if let (Some(etag), Some(validator)) = (asset.etag, req.header("If-None-Match")) {
        if etag_matches(validator, etag) {
            return Response::new(Status::NotModified)
                .with_header("ETag", Some(etag))
                .with_header("Cache-Control", options.cache_control);
        }
    }

    Response::new(Status::Ok)
        .with_header("Content-Type", Some(asset.mime))
        .with_header("Content-Encoding", asset.encoding.content_encoding())
        .with_header("ETag", asset.etag)
        .with_header("Cache-Control", options.cache_control)
        .with_body(asset.data)
}

/// Resolve and respond in one step. Used by adapters that dispatch all
/// requests through a single entry point.
pub fn handle(table: &AssetTable, req: &impl RequestHead) -> Response {
    match resolve(table, req) {
        Resolution::Asset(asset) | Resolution::Fallback(asset) => {
            respond(table.options(), asset, req)
        }
        Resolution::NotFound => Response::not_found(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::tests::TABLE;
    use crate::asset::{Encoding, ServeOptions};
    use pretty_assertions::assert_eq;

    struct TestRequest {
        method: Method,
        path: &'static str,
        headers: Vec<(&'static str, &'static str)>,
    }

    impl TestRequest {
        fn get(path: &'static str) -> Self {
            Self {
                method: Method::Get,
                path,
                headers: Vec::new(),
            }
        }

        fn method(mut self, method: Method) -> Self {
            self.method = method;
            self
        }

        fn header(mut self, name: &'static str, value: &'static str) -> Self {
            self.headers.push((name, value));
            self
        }
    }

    impl RequestHead for TestRequest {
        fn method(&self) -> Method {
            self.method
        }

        fn path(&self) -> &str {
            self.path
        }

        fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| *value)
        }
    }

    const INDEX_ETAG: &str = "\"0123456789abcdef0123456789abcdef\"";

    #[test]
    fn test_method_parse() {
        assert_eq!(Method::parse("GET"), Method::Get);
        assert_eq!(Method::parse("POST"), Method::Post);
        assert_eq!(Method::parse("get"), Method::Other);
        assert_eq!(Method::parse("BREW"), Method::Other);
    }

    #[test]
    fn test_exact_match_serves_full_body() {
        let response = handle(&TABLE, &TestRequest::get("/index.html"));

        assert_eq!(response.status, Status::Ok);
        assert_eq!(response.body, b"<html></html>");
        assert_eq!(response.header("Content-Type"), Some("text/html"));
        assert_eq!(response.header("etag"), Some(INDEX_ETAG));
        assert_eq!(response.header("Cache-Control"), Some("no-cache"));
        assert_eq!(response.header("Content-Encoding"), None);
    }

    #[test]
    fn test_compressed_asset_sets_content_encoding() {
        let response = handle(&TABLE, &TestRequest::get("/assets/app.js"));

        assert_eq!(response.status, Status::Ok);
        assert_eq!(response.header("Content-Encoding"), Some("gzip"));
        assert_eq!(response.body, &[0x1f_u8, 0x8b, 0x08, 0x00][..]);
    }

    #[test]
    fn test_query_string_is_ignored() {
        let resolution = resolve(&TABLE, &TestRequest::get("/index.html?v=3#top"));
        assert!(matches!(resolution, Resolution::Asset(a) if a.path == "/index.html"));
    }

    #[test]
    fn test_percent_encoded_target_matches() {
        static ASSETS: [Asset; 2] = [
            Asset {
                path: "/img/my logo.png",
                mime: "image/png",
                encoding: Encoding::Identity,
                original_len: 4,
                etag: None,
                entry: false,
                data: b"\x89PNG",
            },
            Asset {
                path: "/caf\u{e9}.txt",
                mime: "text/plain",
                encoding: Encoding::Identity,
                original_len: 2,
                etag: None,
                entry: false,
                data: b"ok",
            },
        ];
        static SPACED: AssetTable = AssetTable::new(&ASSETS, ServeOptions::new());

        let response = handle(&SPACED, &TestRequest::get("/img/my%20logo.png"));
        assert_eq!(response.status, Status::Ok);
        assert_eq!(response.body, b"\x89PNG");

        let response = handle(&SPACED, &TestRequest::get("/caf%C3%A9.txt?x=1"));
        assert_eq!(response.status, Status::Ok);

        assert_eq!(handle(&SPACED, &TestRequest::get("/img/my%2logo.png")).status, Status::NotFound);
    }

    #[test]
    fn test_encode_path() {
        assert_eq!(encode_path("/assets/app.js"), "/assets/app.js");
        assert_eq!(encode_path("/img/my logo.png"), "/img/my%20logo.png");
        assert_eq!(encode_path("/caf\u{e9}.txt"), "/caf%C3%A9.txt");
        assert_eq!(encode_path("/100%.txt"), "/100%25.txt");
        assert!(path_matches("/img/my logo.png", &encode_path("/img/my logo.png")));
    }

    #[test]
    fn test_root_alias_serves_entry() {
        let resolution = resolve(&TABLE, &TestRequest::get("/"));
        assert!(matches!(resolution, Resolution::Asset(a) if a.entry));
    }

    #[test]
    fn test_matching_validator_returns_not_modified() {
        let req = TestRequest::get("/index.html").header("If-None-Match", INDEX_ETAG);
        let response = handle(&TABLE, &req);

        assert_eq!(response.status, Status::NotModified);
        assert!(response.body.is_empty());
        assert_eq!(response.header("ETag"), Some(INDEX_ETAG));
    }

    #[test]
    fn test_validator_lists_and_weak_tags() {
        let req = TestRequest::get("/index.html").header(
            "if-none-match",
            "\"other\", W/\"0123456789abcdef0123456789abcdef\"",
        );
        assert_eq!(handle(&TABLE, &req).status, Status::NotModified);

        let req = TestRequest::get("/index.html").header("If-None-Match", "*");
        assert_eq!(handle(&TABLE, &req).status, Status::NotModified);
    }

    #[test]
    fn test_stale_validator_returns_full_body() {
        let req = TestRequest::get("/index.html").header("If-None-Match", "\"stale\"");
        let response = handle(&TABLE, &req);

        assert_eq!(response.status, Status::Ok);
        assert_eq!(response.body, b"<html></html>");
        assert_eq!(response.header("ETag"), Some(INDEX_ETAG));
    }

    #[test]
    fn test_validator_ignored_without_etag() {
        static NO_ETAG: Asset = Asset {
            path: "/a.txt",
            mime: "text/plain",
            encoding: Encoding::Identity,
            original_len: 1,
            etag: None,
            entry: false,
            data: b"a",
        };
        let req = TestRequest::get("/a.txt").header("If-None-Match", "*");
        let response = respond(&ServeOptions::new(), &NO_ETAG, &req);

        assert_eq!(response.status, Status::Ok);
        assert_eq!(response.header("ETag"), None);
    }

    #[test]
    fn test_non_get_on_asset_is_method_not_allowed() {
        for method in [Method::Post, Method::Put, Method::Delete, Method::Head] {
            let req = TestRequest::get("/index.html").method(method);
            let response = handle(&TABLE, &req);
            assert_eq!(response.status, Status::MethodNotAllowed);
            assert_eq!(response.header("Allow"), Some("GET"));
        }
    }

    #[test]
    fn test_html_navigation_falls_back_to_entry() {
        let req = TestRequest::get("/settings/wifi")
            .header("Accept", "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8");
        assert!(matches!(resolve(&TABLE, &req), Resolution::Fallback(a) if a.entry));

        let response = handle(&TABLE, &req);
        assert_eq!(response.status, Status::Ok);
        assert_eq!(response.body, b"<html></html>");
    }

    #[test]
    fn test_unmatched_non_html_is_not_found() {
        let req = TestRequest::get("/missing.js").header("Accept", "*/*");
        assert_eq!(resolve(&TABLE, &req), Resolution::NotFound);
        assert_eq!(handle(&TABLE, &req).status, Status::NotFound);

        let req = TestRequest::get("/missing");
        assert_eq!(handle(&TABLE, &req).status, Status::NotFound);
    }

    #[test]
    fn test_unmatched_post_is_not_found() {
        let req = TestRequest::get("/api/unknown")
            .method(Method::Post)
            .header("Accept", "text/html");
        assert_eq!(handle(&TABLE, &req).status, Status::NotFound);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Status::Ok.code(), 200);
        assert_eq!(Status::NotModified.code(), 304);
        assert_eq!(Status::NotFound.code(), 404);
        assert_eq!(Status::MethodNotAllowed.code(), 405);
        assert_eq!(Status::NotModified.reason(), "Not Modified");
    }
}
