//! Filename resolution from `Content-Disposition` headers, plus the
//! sanitization and unique-path helpers used when artifacts land on disk.

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

/// Name used when the service sends no usable disposition header.
pub const PLACEHOLDER_FILENAME: &str = "nonamefrombackenddownload";

/// RFC 5987 extended parameter: `filename*=UTF-8''<percent-encoded>`.
#[allow(clippy::expect_used)]
static EXTENDED_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)filename\*\s*=\s*UTF-8''([^;]+)").expect("extended filename regex is valid") // Static pattern, safe to panic
});

/// Plain parameter: `filename=token` or `filename="token"`.
#[allow(clippy::expect_used)]
static PLAIN_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)filename\s*=\s*"?([^";]+)"?"#).expect("plain filename regex is valid") // Static pattern, safe to panic
});

/// Resolves the filename announced by a `Content-Disposition` header.
///
/// Resolution order:
/// 1. `filename*=UTF-8''<percent-encoded>`, percent-decoded
/// 2. `filename=<token>` (quotes optional), returned verbatim
/// 3. [`PLACEHOLDER_FILENAME`]
///
/// Never fails: an absent or malformed header degrades to the placeholder.
///
/// ```
/// use ragflow_transfer::filename::resolve_filename;
///
/// assert_eq!(
///     resolve_filename(Some("attachment; filename*=UTF-8''r%C3%A9sum%C3%A9.pdf")),
///     "résumé.pdf"
/// );
/// assert_eq!(resolve_filename(Some(r#"attachment; filename="report.pdf""#)), "report.pdf");
/// assert_eq!(resolve_filename(None), "nonamefrombackenddownload");
/// ```
#[must_use]
pub fn resolve_filename(disposition: Option<&str>) -> String {
    let Some(header) = disposition else {
        debug!("no Content-Disposition header, using placeholder filename");
        return PLACEHOLDER_FILENAME.to_string();
    };

    if let Some(name) = extended_filename(header) {
        return name;
    }

    if let Some(captures) = PLAIN_FILENAME.captures(header) {
        let token = captures[1].trim();
        if !token.is_empty() {
            return token.to_string();
        }
    }

    warn!(disposition = %header, "unrecognized Content-Disposition, using placeholder filename");
    PLACEHOLDER_FILENAME.to_string()
}

fn extended_filename(header: &str) -> Option<String> {
    let captures = EXTENDED_FILENAME.captures(header)?;
    let encoded = captures[1].trim();
    match urlencoding::decode(encoded) {
        Ok(decoded) if !decoded.trim().is_empty() => Some(decoded.into_owned()),
        Ok(_) => None,
        Err(e) => {
            debug!(encoded = %encoded, error = %e, "extended filename is not valid UTF-8");
            None
        }
    }
}

/// Sanitizes a filename for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems:
/// / \ : * ? " < > |
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect()
    }
}

/// Resolves a path under `dir` that does not exist yet.
///
/// `report.pdf`, then `report_1.pdf`, `report_2.pdf`, ...
pub(crate) fn resolve_unique_path(dir: &Path, filename: &str) -> PathBuf {
    let filename = {
        let sanitized = sanitize_filename(filename);
        if sanitized.trim_matches('_').is_empty() {
            PLACEHOLDER_FILENAME.to_string()
        } else {
            sanitized
        }
    };
    let base_path = dir.join(&filename);

    if !base_path.exists() {
        return base_path;
    }

    let (stem, ext) = match filename.rfind('.') {
        Some(pos) if pos > 0 => (&filename[..pos], &filename[pos..]),
        _ => (filename.as_str(), ""),
    };

    for i in 1..1000 {
        let candidate = dir.join(format!("{stem}_{i}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
    }

    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    dir.join(format!("{stem}_{timestamp}{ext}"))
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
