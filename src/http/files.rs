//! Static file serving.
//!
//! # Responsibilities
//! - Map a decoded request path onto the static root
//! - Canonical redirects (`/dir` → `/dir/`, `.../index.html` → `./`)
//! - Serve `index.html` for directories, or a listing when there is none
//! - Hand regular files to `tower_http::services::ServeFile`
//!
//! # Design Decisions
//! - Any `..` segment is rejected before touching the filesystem
//! - Redirects keep the query string so `?token=` survives them
//! - Redirect targets are relative, like the rest of the links we emit

use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{header, HeaderValue, Method, Request, Response, StatusCode};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::http::response::{status_response, text_response};
use crate::routing::StaticRoute;

const INDEX_PAGE: &str = "index.html";

/// Characters left unescaped in generated links.
const LINK: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b'@');

/// Serve the file or directory addressed by `request` under `route`'s root.
pub async fn serve(route: &StaticRoute, request: Request<Body>) -> Response<Body> {
    let decoded = match percent_decode_str(request.uri().path()).decode_utf8() {
        Ok(path) => path.into_owned(),
        Err(_) => return text_response(StatusCode::BAD_REQUEST, "invalid URL path"),
    };
    if contains_dot_dot(&decoded) {
        return text_response(StatusCode::BAD_REQUEST, "invalid URL path");
    }

    let query = request.uri().query().map(str::to_owned);
    if decoded.ends_with(&format!("/{}", INDEX_PAGE)) {
        return local_redirect("./", query.as_deref());
    }

    // Component round-trip drops trailing and `.` separators.
    let path: PathBuf = route.resolve(&decoded).components().collect();
    tracing::debug!(path = %path.display(), "Serving static path");

    let metadata = match tokio::fs::metadata(&path).await {
        Ok(metadata) => metadata,
        Err(e) => return io_error_response(&e),
    };

    if !metadata.is_dir() {
        return serve_file(path, request).await;
    }

    if !decoded.ends_with('/') {
        let target = format!("{}/", utf8_percent_encode(base_name(&decoded), LINK));
        return local_redirect(&target, query.as_deref());
    }

    let index = path.join(INDEX_PAGE);
    match tokio::fs::metadata(&index).await {
        Ok(m) if m.is_file() => serve_file(index, request).await,
        _ => list_directory(&path).await,
    }
}

/// Hand a regular file to `ServeFile`. Every method but HEAD is served as GET.
async fn serve_file(path: PathBuf, mut request: Request<Body>) -> Response<Body> {
    if request.method() != Method::HEAD {
        *request.method_mut() = Method::GET;
    }
    match ServeFile::new(path).oneshot(request).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    }
}

async fn list_directory(dir: &Path) -> Response<Body> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => return io_error_response(&e),
    };

    let mut names = Vec::new();
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                let mut name = entry.file_name().to_string_lossy().into_owned();
                if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
                    name.push('/');
                }
                names.push(name);
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Failed to read directory");
                return text_response(StatusCode::INTERNAL_SERVER_ERROR, "Error reading directory");
            }
        }
    }
    names.sort();

    let mut page = String::from(
        "<!doctype html>\n<meta name=\"viewport\" content=\"width=device-width\">\n<pre>\n",
    );
    for name in &names {
        let href = utf8_percent_encode(name, LINK).to_string();
        let _ = writeln!(
            page,
            "<a href=\"{}\">{}</a>",
            html_escape::encode_double_quoted_attribute(&href),
            html_escape::encode_text(name)
        );
    }
    page.push_str("</pre>\n");

    let mut response = Response::new(Body::from(page));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    response
}

fn local_redirect(target: &str, query: Option<&str>) -> Response<Body> {
    let location = match query.filter(|q| !q.is_empty()) {
        Some(q) => format!("{}?{}", target, q),
        None => target.to_string(),
    };

    let mut response = status_response(StatusCode::MOVED_PERMANENTLY);
    match HeaderValue::from_str(&location) {
        Ok(value) => {
            response.headers_mut().insert(header::LOCATION, value);
            response
        }
        Err(_) => text_response(StatusCode::BAD_REQUEST, "invalid URL path"),
    }
}

fn io_error_response(e: &io::Error) -> Response<Body> {
    match e.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => {
            text_response(StatusCode::NOT_FOUND, "404 page not found")
        }
        io::ErrorKind::PermissionDenied => text_response(StatusCode::FORBIDDEN, "403 Forbidden"),
        _ => {
            tracing::warn!(error = %e, "Static file error");
            text_response(StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error")
        }
    }
}

fn contains_dot_dot(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| segment == "..")
}

/// Last path element, ignoring trailing slashes.
fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/";
    }
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}
