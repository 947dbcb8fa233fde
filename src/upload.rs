//! Upload boundary helpers.
//!
//! The core never touches storage. This module holds what sits around it in
//! a service: size and media-type checks that run before the core is
//! invoked, pluggable output storage, naming, and the JSON response shape
//! (`{ success, message, downloadPath }` or `{ error }`).

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::detect::is_pdf_bytes;
use crate::error::{Error, GENERIC_FAILURE_MESSAGE};
use crate::pipeline::{RedactionReport, Redactor};

/// Default upload limit (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Accepted media type.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Message returned with a successful upload.
pub const SUCCESS_MESSAGE: &str = "PDF processed successfully";

/// Prefix of download paths handed back to clients.
pub const DOWNLOAD_PREFIX: &str = "/download/";

/// Errors at the upload boundary.
#[derive(Error, Debug)]
pub enum UploadError {
    /// Nothing was uploaded.
    #[error("No PDF file uploaded")]
    Empty,

    /// The upload exceeds the configured limit.
    #[error("File of {size} bytes exceeds the {limit}-byte limit")]
    TooLarge {
        /// Upload size in bytes
        size: usize,
        /// Configured limit in bytes
        limit: usize,
    },

    /// The declared media type is not accepted.
    #[error("Only PDF files are allowed (got {0})")]
    UnsupportedMediaType(String),

    /// The bytes do not start like a PDF.
    #[error("Uploaded file is not a PDF")]
    NotPdf,

    /// Reading or writing stored output failed.
    #[error("Storage error: {0}")]
    Storage(#[from] io::Error),

    /// The core rejected the document.
    #[error(transparent)]
    Redaction(#[from] Error),
}

impl UploadError {
    /// HTTP-style status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            UploadError::Empty | UploadError::NotPdf => 400,
            UploadError::TooLarge { .. } => 413,
            UploadError::UnsupportedMediaType(_) => 415,
            UploadError::Storage(e) if e.kind() == io::ErrorKind::NotFound => 404,
            UploadError::Storage(_) | UploadError::Redaction(_) => 500,
        }
    }

    /// Message safe to return to a client.
    ///
    /// Intake errors describe themselves; storage and core errors collapse
    /// to the generic failure message.
    pub fn user_message(&self) -> String {
        match self {
            UploadError::Storage(e) if e.kind() == io::ErrorKind::NotFound => {
                "File not found".to_string()
            }
            UploadError::Storage(_) => GENERIC_FAILURE_MESSAGE.to_string(),
            UploadError::Redaction(e) => e.user_message().to_string(),
            other => other.to_string(),
        }
    }
}

/// Limits applied to uploads before redaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadPolicy {
    /// Maximum upload size in bytes
    pub max_bytes: usize,
    /// Required media type
    pub accepted_media_type: String,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            accepted_media_type: PDF_MEDIA_TYPE.to_string(),
        }
    }
}

impl UploadPolicy {
    /// Create a policy with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the size limit.
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Check an upload. Runs before any parsing.
    pub fn check(&self, upload: &Upload<'_>) -> Result<(), UploadError> {
        if upload.data.is_empty() {
            return Err(UploadError::Empty);
        }
        if upload.data.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                size: upload.data.len(),
                limit: self.max_bytes,
            });
        }

        let media_type = upload
            .media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();
        if !media_type.eq_ignore_ascii_case(&self.accepted_media_type) {
            return Err(UploadError::UnsupportedMediaType(upload.media_type.to_string()));
        }
        if !is_pdf_bytes(upload.data) {
            return Err(UploadError::NotPdf);
        }
        Ok(())
    }
}

/// An uploaded file.
#[derive(Debug, Clone, Copy)]
pub struct Upload<'a> {
    /// Client-supplied file name
    pub file_name: &'a str,
    /// Declared media type
    pub media_type: &'a str,
    /// File contents
    pub data: &'a [u8],
}

impl<'a> Upload<'a> {
    /// A PDF upload.
    pub fn pdf(file_name: &'a str, data: &'a [u8]) -> Self {
        Self {
            file_name,
            media_type: PDF_MEDIA_TYPE,
            data,
        }
    }
}

/// Read/write capability for redacted output.
pub trait OutputStore: Send + Sync {
    /// Store `bytes` under `name`, replacing any previous content.
    fn write(&self, name: &str, bytes: &[u8]) -> io::Result<()>;

    /// Read what was stored under `name`.
    fn read(&self, name: &str) -> io::Result<Vec<u8>>;
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of stored files, sorted.
    pub fn names(&self) -> Vec<String> {
        self.files
            .lock()
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default()
    }
}

fn poisoned() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "memory store lock poisoned")
}

impl OutputStore for MemoryStore {
    fn write(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        let mut files = self.files.lock().map_err(|_| poisoned())?;
        files.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        let files = self.files.lock().map_err(|_| poisoned())?;
        files
            .get(name)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{} not found", name)))
    }
}

/// Store backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Use `root`, creating it if needed.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The store's directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> io::Result<PathBuf> {
        if name.is_empty() || name != sanitize_file_name(name) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid stored file name: {:?}", name),
            ));
        }
        Ok(self.root.join(name))
    }
}

impl OutputStore for DirectoryStore {
    fn write(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        fs::write(self.path_for(name)?, bytes)
    }

    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        fs::read(self.path_for(name)?)
    }
}

/// Reduce a client-supplied name to a safe single path component.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload.pdf".to_string()
    } else {
        cleaned
    }
}

/// `"{millis}-{name}"`, the name an upload is stored under.
pub fn stored_name(original: &str, now: DateTime<Utc>) -> String {
    format!("{}-{}", now.timestamp_millis(), sanitize_file_name(original))
}

/// `"redacted-{stored}"`, the name of the redacted output.
pub fn redacted_name(stored: &str) -> String {
    format!("redacted-{}", stored)
}

/// JSON response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadResponse {
    /// `{ "success": true, "message": ..., "downloadPath": ... }`
    Success {
        success: bool,
        message: String,
        #[serde(rename = "downloadPath")]
        download_path: String,
    },
    /// `{ "error": ... }`
    Failure { error: String },
}

impl UploadResponse {
    /// Successful response pointing at the stored output.
    pub fn success(output_name: &str) -> Self {
        UploadResponse::Success {
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
            download_path: format!("{}{}", DOWNLOAD_PREFIX, output_name),
        }
    }

    /// Failure response for an error.
    pub fn failure(err: &UploadError) -> Self {
        UploadResponse::Failure {
            error: err.user_message(),
        }
    }

    /// Whether this is a success response.
    pub fn is_success(&self) -> bool {
        matches!(self, UploadResponse::Success { .. })
    }
}

/// Result of a handled upload.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    /// Name the redacted output is stored under
    pub output_name: String,
    /// Client download path
    pub download_path: String,
    /// What the redaction did
    pub report: RedactionReport,
}

/// Upload intake: policy check, redaction, storage.
pub struct UploadHandler<S: OutputStore> {
    redactor: Redactor,
    policy: UploadPolicy,
    store: S,
}

impl<S: OutputStore> UploadHandler<S> {
    /// Create a handler that redacts with `redactor`, admits uploads that
    /// pass `policy`, and writes results to `store`.
    pub fn new(redactor: Redactor, policy: UploadPolicy, store: S) -> Self {
        Self {
            redactor,
            policy,
            store,
        }
    }

    /// The handler's store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handle an upload received now.
    pub fn handle(&self, upload: Upload<'_>) -> Result<UploadOutcome, UploadError> {
        self.handle_at(upload, Utc::now())
    }

    /// Handle an upload received at `now`.
    ///
    /// Only the redacted output is stored; the upload itself is not kept.
    pub fn handle_at(
        &self,
        upload: Upload<'_>,
        now: DateTime<Utc>,
    ) -> Result<UploadOutcome, UploadError> {
        self.policy.check(&upload)?;

        let (bytes, report) = self.redactor.redact_with_report(upload.data)?;
        let output_name = redacted_name(&stored_name(upload.file_name, now));
        self.store.write(&output_name, &bytes)?;

        log::info!(
            "stored {} ({} bytes, {} marks)",
            output_name,
            bytes.len(),
            report.marks.len()
        );
        Ok(UploadOutcome {
            download_path: format!("{}{}", DOWNLOAD_PREFIX, output_name),
            output_name,
            report,
        })
    }

    /// Handle an upload and produce a status code and response body.
    pub fn respond(&self, upload: Upload<'_>) -> (u16, UploadResponse) {
        match self.handle(upload) {
            Ok(outcome) => (200, UploadResponse::success(&outcome.output_name)),
            Err(err) => {
                log::error!("upload of {:?} failed: {}", upload.file_name, err);
                (err.status_code(), UploadResponse::failure(&err))
            }
        }
    }

    /// Fetch stored output for download.
    pub fn download(&self, name: &str) -> Result<Vec<u8>, UploadError> {
        Ok(self.store.read(name)?)
    }
}
