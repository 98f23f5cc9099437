use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use crate::http::mime;
use crate::http::request::{Method, Request};
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::static_files::path::validate_path;

/// File served for `/`.
pub const INDEX_PATH: &str = "/index.html";

/// Serves a GET request from files under `root`.
///
/// Never fails: every problem becomes a status code. Missing or unopenable
/// files are 404, a failure after the file was opened is 500. The file's bytes
/// are moved into the response body unchanged.
pub async fn serve_get(req: &Request, root: &Path) -> Response {
    if req.method != Method::GET {
        return Response::method_not_allowed();
    }

    if !validate_path(&req.path) {
        warn!(path = %req.path, "Rejected unsafe request path");
        return Response::bad_request();
    }

    let path = if req.path == "/" { INDEX_PATH } else { req.path.as_str() };
    let content_type = mime::content_type_for(path);
    let file_path = resolve(root, path);

    debug!(path = %file_path.display(), content_type, "Serving static file");

    let mut file = match File::open(&file_path).await {
        Ok(file) => file,
        Err(e) => {
            debug!(path = %file_path.display(), error = %e, "File not found");
            return Response::with_reason_body(StatusCode::NotFound, content_type);
        }
    };

    let len = match file.metadata().await {
        Ok(meta) if meta.is_dir() => {
            debug!(path = %file_path.display(), "Path is a directory");
            return Response::with_reason_body(StatusCode::NotFound, content_type);
        }
        Ok(meta) => meta.len(),
        Err(e) => {
            warn!(path = %file_path.display(), error = %e, "Failed to stat file");
            return Response::with_reason_body(StatusCode::InternalServerError, content_type);
        }
    };

    let mut content = Vec::new();
    let reserved = usize::try_from(len)
        .ok()
        .and_then(|len| content.try_reserve_exact(len).ok());
    if reserved.is_none() {
        warn!(path = %file_path.display(), size = len, "Cannot allocate file buffer");
        return Response::with_reason_body(StatusCode::InternalServerError, content_type);
    }

    if let Err(e) = file.read_to_end(&mut content).await {
        warn!(path = %file_path.display(), error = %e, "Failed to read file");
        return Response::with_reason_body(StatusCode::InternalServerError, content_type);
    }

    match ResponseBuilder::new(StatusCode::Ok)
        .content_type(content_type)
        .body(content)
        .build()
    {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Failed to build response");
            Response::internal_error()
        }
    }
}

/// Joins a validated request path onto the root directory.
fn resolve(root: &Path, path: &str) -> PathBuf {
    root.join(path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_strips_leading_slash() {
        assert_eq!(
            resolve(Path::new("/srv/www"), "/css/site.css"),
            PathBuf::from("/srv/www/css/site.css")
        );
    }
}
