//! # REST API Router
//!
//! A single fallback handler owns every path under the URL prefix. It
//! splits the path into table and row key, dispatches on the method and
//! logs one `REQUEST` line per answered request.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{Method, Uri},
    response::Response,
    Router,
};

use crate::core::{AppContext, SqldError, SqldResult};
use crate::observability::{Event, Logger};

use super::handler::{self, RestRequest};
use super::parser::Target;
use super::response::{encode, Reply};

/// Router state shared by every request
pub struct RestServer {
    ctx: AppContext,
    prefix: String,
    log_requests: bool,
}

impl RestServer {
    /// `prefix` must start and end with `/`.
    pub fn new(ctx: AppContext, prefix: impl Into<String>) -> Self {
        Self {
            ctx,
            prefix: prefix.into(),
            log_requests: true,
        }
    }

    pub fn with_request_log(mut self, enabled: bool) -> Self {
        self.log_requests = enabled;
        self
    }

    /// Build the Axum router
    pub fn router(self) -> Router {
        Router::new()
            .fallback(handle_query)
            .with_state(Arc::new(self))
    }

    /// Path relative to the prefix, or `None` outside it
    fn relative<'a>(&self, path: &'a str) -> Option<&'a str> {
        path.strip_prefix(self.prefix.as_str())
            .or_else(|| (path == self.prefix.trim_end_matches('/')).then_some(""))
    }

    async fn dispatch(&self, method: &Method, uri: &Uri, body: Bytes) -> SqldResult<Reply> {
        if !matches!(
            *method,
            Method::GET | Method::POST | Method::PUT | Method::DELETE
        ) {
            return Err(SqldError::method_not_allowed(method));
        }

        let path = self
            .relative(uri.path())
            .ok_or_else(|| SqldError::not_found(format!("no resource at {}", uri.path())))?;

        if path.is_empty() {
            return match *method {
                Method::POST => handler::raw(&self.ctx, &body).await,
                _ => Err(SqldError::bad_request("missing table name")),
            };
        }

        let Query(params) = Query::<Vec<(String, String)>>::try_from_uri(uri)
            .map_err(|e| SqldError::bad_request(e.body_text()))?;
        let request = RestRequest::new(Target::parse(path)?, params, body);

        match *method {
            Method::GET => handler::read(&self.ctx, &request).await,
            Method::POST => handler::create(&self.ctx, &request).await,
            Method::PUT => handler::update(&self.ctx, &request).await,
            _ => handler::delete(&self.ctx, &request).await,
        }
    }
}

async fn handle_query(
    State(server): State<Arc<RestServer>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let started = Instant::now();
    let result = server.dispatch(&method, &uri, body).await;
    let error = result.as_ref().err().map(SqldError::code);
    let response = encode(result);

    if server.log_requests {
        let status = response.status().as_u16().to_string();
        let elapsed_ms = started.elapsed().as_millis().to_string();
        let url = uri.to_string();
        let mut fields = vec![
            ("status", status.as_str()),
            ("method", method.as_str()),
            ("url", url.as_str()),
            ("elapsed_ms", elapsed_ms.as_str()),
        ];
        if let Some(code) = error {
            fields.push(("error", code));
        }

        // 5xx lines go to stderr
        if response.status().is_server_error() {
            Logger::error(Event::Request.as_str(), &fields);
        } else {
            Logger::info(Event::Request.as_str(), &fields);
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteDatabase;
    use crate::query::Dialect;

    fn create_test_server(prefix: &str) -> RestServer {
        let db = Arc::new(SqliteDatabase::open(":memory:").unwrap());
        RestServer::new(AppContext::new(db, Dialect::Question), prefix).with_request_log(false)
    }

    #[test]
    fn test_relative_paths() {
        let server = create_test_server("/api/");
        assert_eq!(server.relative("/api/user/1"), Some("user/1"));
        assert_eq!(server.relative("/api/"), Some(""));
        assert_eq!(server.relative("/api"), Some(""));
        assert_eq!(server.relative("/other/user"), None);

        let server = create_test_server("/");
        assert_eq!(server.relative("/user"), Some("user"));
        assert_eq!(server.relative("/"), Some(""));
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let server = create_test_server("/");
        let uri: Uri = "/user".parse().unwrap();
        let err = server
            .dispatch(&Method::PATCH, &uri, Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SqldError::MethodNotAllowed(_)));
    }

    #[tokio::test]
    async fn test_root_requires_post() {
        let server = create_test_server("/");
        let uri: Uri = "/".parse().unwrap();
        let err = server
            .dispatch(&Method::GET, &uri, Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SqldError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_logged_requests_keep_status() {
        use axum::body::Body;
        use axum::http::{Request, StatusCode};
        use tower::ServiceExt;

        let router = create_test_server("/").with_request_log(true).router();
        for (uri, expected) in [
            ("/missing", StatusCode::INTERNAL_SERVER_ERROR),
            ("/missing?a%3F=1", StatusCode::BAD_REQUEST),
        ] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let response = router.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), expected);
        }
    }

    #[tokio::test]
    async fn test_outside_prefix_not_found() {
        let server = create_test_server("/api/");
        let uri: Uri = "/elsewhere/user".parse().unwrap();
        let err = server
            .dispatch(&Method::GET, &uri, Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SqldError::NotFound(_)));
    }
}
