use crate::error::{Result, StatlabError};
use bytes::Bytes;
use std::path::Path;

pub const CSV_MEDIA_TYPE: &str = "text/csv";
pub const XLS_MEDIA_TYPE: &str = "application/vnd.ms-excel";
pub const XLSX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const ACCEPTED_MEDIA_TYPES: [&str; 3] = [CSV_MEDIA_TYPE, XLS_MEDIA_TYPE, XLSX_MEDIA_TYPE];
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["csv", "xlsx", "xls"];

/// A dataset file accepted by the upload gate
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedDataset {
    name: String,
    media_type: Option<String>,
    contents: Bytes,
}

impl SelectedDataset {
    /// Wrap a file the way a browser hands it over: name, declared type, bytes.
    /// Nothing is checked here; see [`accept`].
    pub fn new(
        name: impl Into<String>,
        media_type: Option<String>,
        contents: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.filter(|t| !t.trim().is_empty()),
            contents: contents.into(),
        }
    }

    /// Read a file from disk, declaring the media type implied by its extension.
    pub async fn from_path<P: AsRef<Path>>(path: P, media_type: Option<String>) -> Result<Self> {
        let path = path.as_ref();
        let name = file_name_of(path);
        let contents = tokio::fs::read(path).await?;
        let media_type = media_type.or_else(|| media_type_for_name(&name).map(str::to_string));

        log::debug!(
            "Loaded dataset {} ({} bytes, type: {:?})",
            name,
            contents.len(),
            media_type
        );

        Ok(Self::new(name, media_type, contents))
    }

    /// Run the upload gate on the path's name and declared type, and read the
    /// file only once it passes.
    pub async fn open<P: AsRef<Path>>(path: P, media_type: Option<String>) -> Result<Self> {
        let path = path.as_ref();
        accept_name(&file_name_of(path), media_type.as_deref())?;
        Self::from_path(path, media_type).await
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    pub fn contents(&self) -> &Bytes {
        &self.contents
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Media type to put on the multipart file part
    pub fn upload_mime(&self) -> mime::Mime {
        self.media_type()
            .and_then(|t| t.parse::<mime::Mime>().ok())
            .unwrap_or(mime::APPLICATION_OCTET_STREAM)
    }
}

/// Media type a browser would declare for a known spreadsheet extension
pub fn media_type_for_name(name: &str) -> Option<&'static str> {
    match extension_of(name)?.as_str() {
        "csv" => Some(CSV_MEDIA_TYPE),
        "xls" => Some(XLS_MEDIA_TYPE),
        "xlsx" => Some(XLSX_MEDIA_TYPE),
        _ => None,
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

fn extension_of(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}

fn is_accepted_media_type(media_type: &str) -> bool {
    // Compare on the essence so parameters like `; charset=utf-8` pass
    let essence = media_type
        .parse::<mime::Mime>()
        .map(|m| m.essence_str().to_ascii_lowercase())
        .unwrap_or_else(|_| media_type.trim().to_ascii_lowercase());
    ACCEPTED_MEDIA_TYPES.contains(&essence.as_str())
}

fn has_accepted_extension(name: &str) -> bool {
    extension_of(name)
        .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Upload gate: accept CSV / Excel files by declared type, or by name when
/// the declared type is not one of the known spreadsheet types.
pub fn accept(file: &SelectedDataset) -> Result<()> {
    accept_name(file.name(), file.media_type())
}

/// [`accept`] on a name and declared type alone, before any bytes are read.
pub fn accept_name(name: &str, media_type: Option<&str>) -> Result<()> {
    let media_type = media_type.filter(|t| !t.trim().is_empty());
    let by_type = media_type.map(is_accepted_media_type).unwrap_or(false);
    if by_type || has_accepted_extension(name) {
        return Ok(());
    }

    log::warn!("Rejected dataset {} (type: {:?})", name, media_type);
    Err(StatlabError::FileType {
        name: name.to_string(),
        media_type: media_type.map(str::to_string),
    })
}
