//! Naming of stored fusion artifacts.

/// Extension used when the content type is missing or unusable.
pub const FALLBACK_EXTENSION: &str = "bin";

/// Prefix for every stored artifact filename.
const FILENAME_PREFIX: &str = "faceswap";

/// Derive a file extension from a response `content-type` header.
///
/// `video/mp4` maps to `mp4`; any other `type/subtype` uses the subtype
/// verbatim. MIME parameters (`; codecs=...`) are dropped first and the
/// result is lowercased. Missing, malformed, or path-unsafe subtypes yield
/// [`FALLBACK_EXTENSION`].
pub fn extension_for_content_type(content_type: Option<&str>) -> String {
    let Some(raw) = content_type else {
        return FALLBACK_EXTENSION.to_string();
    };

    let essence = raw
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if essence == "video/mp4" {
        return "mp4".to_string();
    }

    match essence.split_once('/') {
        Some((_, subtype)) if is_safe_extension(subtype) => subtype.to_string(),
        _ => FALLBACK_EXTENSION.to_string(),
    }
}

/// Build a unique artifact filename with the given extension.
///
/// Format: `faceswap_<unix-millis>_<8 hex chars>.<ext>`.
pub fn artifact_filename(extension: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{FILENAME_PREFIX}_{}_{}.{extension}",
        chrono::Utc::now().timestamp_millis(),
        &suffix[..8],
    )
}

fn is_safe_extension(candidate: &str) -> bool {
    !candidate.is_empty()
        && !candidate.starts_with('.')
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-'))
}
