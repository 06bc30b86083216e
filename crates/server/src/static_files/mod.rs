//! Static file handler.
//!
//! Serves files and directory listings below a root directory. Every request
//! path is resolved against the root, opened, and then canonicalized: the
//! canonical target must lie inside the canonical root, so `..` segments and
//! symlinks leading out of the root are refused with 403 even though the
//! open itself succeeded.

mod mime_table;

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use http::{Method, StatusCode};
use mime::Mime;
use thiserror::Error;
use tokio::fs::File;
use tracing::{debug, info, warn};

pub use mime_table::{MimeRule, MimeTable, MimeTableBuilder};
use crate::{Handler, HandlerError, Outcome, ServerBuilder, ServerClient};

/// Longest filesystem path the handler will try to open
pub const PATH_MAX: usize = 4096;

#[derive(Debug, Error)]
pub enum StaticError {
    #[error("cannot resolve static root {}: {source}", root.display())]
    Root { root: PathBuf, source: io::Error },
}

#[derive(Debug)]
pub struct StaticFiles {
    root: PathBuf,
    mime: MimeTable,
}

impl StaticFiles {
    /// Resolves `root` to its canonical form once, up front.
    pub fn new(root: impl AsRef<Path>, mime: MimeTable) -> Result<Self, StaticError> {
        let root = root.as_ref();
        let canonical = std::fs::canonicalize(root).map_err(|source| StaticError::Root { root: root.to_path_buf(), source })?;

        info!(root = %canonical.display(), "serving static files");
        Ok(Self { root: canonical, mime })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Registers this handler for `GET` requests below `prefix`.
    pub fn bind(self, builder: ServerBuilder, prefix: impl Into<String>) -> ServerBuilder {
        builder.handler(Some(Method::GET), prefix, self)
    }

    /// Opens the file named by `request_path` below the root.
    async fn lookup(&self, request_path: &str) -> Result<Target, StatusCode> {
        if !request_path.starts_with('/') {
            warn!(path = request_path, "path without leading /");
            return Err(StatusCode::BAD_REQUEST);
        }

        let mut path = OsString::from(self.root.as_os_str());
        path.push(request_path);
        if path.len() >= PATH_MAX {
            warn!(len = path.len(), "path is too long");
            return Err(StatusCode::URI_TOO_LONG);
        }
        let path = PathBuf::from(path);
        debug!(path = %path.display(), "lookup");

        // opening a fifo or device would block the accept loop
        let file_type = tokio::fs::metadata(&path)
            .await
            .map_err(|e| {
                warn!(path = %path.display(), cause = %e, "stat failed");
                status_for(&e)
            })?
            .file_type();
        if !file_type.is_file() && !file_type.is_dir() {
            warn!(path = %path.display(), ?file_type, "not a file or directory");
            return Err(StatusCode::NOT_FOUND);
        }

        let file = File::open(&path).await.map_err(|e| {
            warn!(path = %path.display(), cause = %e, "open failed");
            status_for(&e)
        })?;

        let canonical = tokio::fs::canonicalize(&path).await.map_err(|e| {
            warn!(path = %path.display(), cause = %e, "canonicalize failed");
            status_for(&e)
        })?;

        if !canonical.starts_with(&self.root) {
            warn!(path = %path.display(), resolved = %canonical.display(), "path outside of root");
            return Err(StatusCode::FORBIDDEN);
        }

        let metadata = file.metadata().await.map_err(|e| {
            warn!(path = %path.display(), cause = %e, "metadata failed");
            status_for(&e)
        })?;

        let mime = self.mime.lookup(&path.to_string_lossy()).cloned();
        if mime.is_none() {
            debug!(path = %path.display(), "no mimetype");
        }

        Ok(Target { file, canonical, metadata, mime })
    }

    async fn file(client: &mut ServerClient, target: &mut Target) -> Result<Outcome, HandlerError> {
        client.response(StatusCode::OK, None)?;
        if let Some(mime) = &target.mime {
            client.response_header("Content-Type", mime)?;
        }

        client.response_file(target.metadata.len(), &mut target.file).await?;
        Ok(Outcome::Responded)
    }

    async fn directory(client: &mut ServerClient, target: &Target, request_path: &str) -> Result<Outcome, HandlerError> {
        if !request_path.ends_with('/') {
            client.response_redirect(format_args!("{request_path}/"))?;
            return Ok(Outcome::Responded);
        }

        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(&target.canonical).await?;
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let is_dir = entry.file_type().await.is_ok_and(|t| t.is_dir());
            entries.push((name, is_dir));
        }
        entries.sort();

        let path = escape_html(request_path);
        client.response(StatusCode::OK, None)?;
        client.response_header("Content-Type", "text/html")?;
        client.response_print(format_args!("<html><head><title>Index of {path}</title></head>\n"))?;
        client.response_print(format_args!("<body><h1>Index of {path}</h1><ul>\n"))?;
        if request_path != "/" {
            client.response_print(format_args!("<li><a href=\"..\">..</a></li>\n"))?;
        }

        for (name, is_dir) in &entries {
            let href = urlencoding::encode(name);
            let text = escape_html(name);
            let suffix = if *is_dir { "/" } else { "" };
            client.response_print(format_args!("\t<li><a href=\"{href}{suffix}\">{text}{suffix}</a></li>\n"))?;
        }

        client.response_print(format_args!("</ul></body>\n</html>\n"))?;
        Ok(Outcome::Responded)
    }
}

#[async_trait]
impl Handler for StaticFiles {
    async fn handle(&self, client: &mut ServerClient) -> Result<Outcome, HandlerError> {
        client.drain_request_headers();

        let request_path = client.path().to_string();
        let mut target = match self.lookup(&request_path).await {
            Ok(target) => target,
            Err(status) => return Ok(Outcome::Status(status)),
        };

        info!(
            root = %self.root.display(),
            method = %client.method(),
            path = request_path,
            mime = target.mime.as_ref().map_or("(unknown mimetype)", |m| m.essence_str()),
            "static"
        );

        if target.metadata.is_file() {
            Self::file(client, &mut target).await
        } else if target.metadata.is_dir() {
            Self::directory(client, &target, &request_path).await
        } else {
            Ok(Outcome::Status(StatusCode::NOT_FOUND))
        }
    }
}

struct Target {
    file: File,
    canonical: PathBuf,
    metadata: std::fs::Metadata,
    mime: Option<Mime>,
}

/// Nearest status for a failed filesystem operation.
fn status_for(e: &io::Error) -> StatusCode {
    match e.kind() {
        io::ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
        io::ErrorKind::IsADirectory => StatusCode::METHOD_NOT_ALLOWED,
        io::ErrorKind::InvalidFilename => StatusCode::URI_TOO_LONG,
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
