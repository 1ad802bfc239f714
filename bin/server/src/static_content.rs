//! Static web client responder.
//!
//! Serves files from the content root. Entry pages (`index.html`,
//! `sso.html`) have `{ROOT_URI}` replaced with the configured root URI, and
//! the root page first checks whether the visitor should be sent straight
//! to a single sign-on provider.

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::RwLock;
use tower::ServiceExt;
use tower_http::services::ServeDir;
use tracing::{debug, instrument, warn};

use crate::sso::attempt_sso_redirect;
use crate::state::AppState;

/// Cache policy attached to every successfully served file.
pub const CACHE_CONTROL_VALUE: &str = "public, max-age=259200";

const ROOT_URI_TOKEN: &str = "{ROOT_URI}";
const INDEX_PAGE: &str = "index.html";
const ENTRY_PAGE_SUFFIXES: [&str; 2] = ["index.html", "sso.html"];

/// Serves a GET request for web client content.
#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn serve(State(state): State<Arc<AppState>>, jar: CookieJar, request: Request) -> Response {
    if request.method() != Method::GET && request.method() != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    if is_sso_candidate(request.uri())
        && let Some(redirect) = attempt_sso_redirect(&state, &jar).await
    {
        return redirect;
    }

    let Some(relative) = resolve_path(request.uri().path()) else {
        debug!("rejected content path");
        return StatusCode::NOT_FOUND.into_response();
    };

    if is_entry_page(&relative) {
        let path = state.config.content_root.join(&relative);
        return entry_page(&state, &path).await;
    }

    serve_file(&state.config.content_root, request).await
}

/// Returns true for the root page requested without query parameters.
fn is_sso_candidate(uri: &Uri) -> bool {
    let root_page = matches!(uri.path(), "" | "/" | "/index.html");
    root_page && uri.query().is_none_or(str::is_empty)
}

/// Maps a request path to a path relative to the content root. Segments
/// are percent-decoded and directory paths resolve to their `index.html`.
/// Returns `None` for paths that could escape the content root or do not
/// decode to UTF-8.
fn resolve_path(uri_path: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for segment in uri_path.split('/').filter(|segment| !segment.is_empty()) {
        let decoded = urlencoding::decode(segment).ok()?;
        if decoded.contains(['/', '\\', '\0']) {
            return None;
        }
        let mut components = Path::new(decoded.as_ref()).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => relative.push(part),
            _ => return None,
        }
    }
    if uri_path.is_empty() || uri_path.ends_with('/') {
        relative.push(INDEX_PAGE);
    }
    Some(relative)
}

fn is_entry_page(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| ENTRY_PAGE_SUFFIXES.iter().any(|s| name.ends_with(s)))
}

async fn entry_page(state: &AppState, path: &Path) -> Response {
    match state
        .entry_pages
        .load(path, &state.config.root_uri)
        .await
    {
        Ok(body) => (
            [
                (
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/html; charset=utf-8"),
                ),
                (header::CONTENT_LENGTH, HeaderValue::from(body.len())),
                (
                    header::CACHE_CONTROL,
                    HeaderValue::from_static(CACHE_CONTROL_VALUE),
                ),
            ],
            body,
        )
            .into_response(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            warn!(error = %e, path = %path.display(), "failed to read entry page");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn serve_file(root: &Path, request: Request) -> Response {
    let response = match ServeDir::new(root).oneshot(request).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    };
    with_cache_control(response)
}

fn with_cache_control(mut response: Response) -> Response {
    let status = response.status();
    if status.is_success() || status == StatusCode::NOT_MODIFIED {
        response.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_VALUE),
        );
    }
    response
}

#[derive(Debug)]
struct CachedPage {
    modified: SystemTime,
    len: u64,
    body: Bytes,
}

/// Entry pages with `{ROOT_URI}` already substituted, keyed by file path.
///
/// An entry is reused only while the file's modification time and length
/// are unchanged, so edits on disk show up on the next request. An edit that
/// keeps the length and lands within the filesystem's timestamp granularity
/// of the previous write is not detected, and the stale page is served until
/// the file changes again.
#[derive(Debug, Default)]
pub struct EntryPageCache {
    pages: RwLock<HashMap<PathBuf, CachedPage>>,
}

impl EntryPageCache {
    /// Returns the patched contents of the entry page at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or is not a regular file.
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD.
    pub async fn load(&self, path: &Path, root_uri: &str) -> io::Result<Bytes> {
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "not a file"));
        }
        let modified = metadata.modified()?;
        let len = metadata.len();

        {
            let pages = self.pages.read().await;
            if let Some(page) = pages.get(path)
                && page.modified == modified
                && page.len == len
            {
                return Ok(page.body.clone());
            }
        }

        let raw = tokio::fs::read(path).await?;
        let body = Bytes::from(String::from_utf8_lossy(&raw).replace(ROOT_URI_TOKEN, root_uri));
        debug!(path = %path.display(), "patched entry page");
        self.pages.write().await.insert(
            path.to_path_buf(),
            CachedPage {
                modified,
                len,
                body: body.clone(),
            },
        );
        Ok(body)
    }
}
