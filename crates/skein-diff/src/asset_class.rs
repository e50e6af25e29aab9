//! Asset classification and hash-insensitive name normalization.
//!
//! Output filenames usually embed a content hash (`main.8f3a9c21.js`), so
//! assets are matched across two builds by a normalized name with the
//! hash-looking segments stripped out, never by literal filename.

use serde::{Deserialize, Serialize};

/// Coarse asset category, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Js,
    Css,
    Html,
    Images,
    Fonts,
    Media,
    Others,
}

impl AssetClass {
    /// Classify one emitted file by its extension. Unknown or missing
    /// extensions land in [`AssetClass::Others`].
    pub fn of(path: &str) -> Self {
        let extension = path
            .rsplit('/')
            .next()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "js" | "mjs" | "cjs" => Self::Js,
            "css" => Self::Css,
            "html" | "htm" => Self::Html,
            "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "ico" | "avif" | "bmp" => {
                Self::Images
            }
            "woff" | "woff2" | "ttf" | "otf" | "eot" => Self::Fonts,
            "mp3" | "mp4" | "webm" | "ogg" | "wav" | "flac" | "avi" | "mov" => Self::Media,
            _ => Self::Others,
        }
    }

    /// All classes, in report order.
    pub const ALL: [AssetClass; 7] = [
        Self::Js,
        Self::Css,
        Self::Html,
        Self::Images,
        Self::Fonts,
        Self::Media,
        Self::Others,
    ];
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Js => "js",
            Self::Css => "css",
            Self::Html => "html",
            Self::Images => "images",
            Self::Fonts => "fonts",
            Self::Media => "media",
            Self::Others => "others",
        };
        f.write_str(text)
    }
}

/// Digit-bearing segments that are product names or target tags, not
/// content hashes. Segments without a digit are never stripped, so plain
/// words need no entry here.
const KEPT_SEGMENTS: [&str; 8] = [
    "es5", "es6", "es2015", "es2017", "es2020", "es2022", "utf8", "h264",
];

/// Strip hash-looking segments from a filename so the same logical asset
/// matches across builds.
///
/// A dot- or dash-delimited segment is treated as a content hash when it is
/// at least four characters of ASCII alphanumerics including a digit, and is
/// neither a version tag (`v2`, `v10`) nor a known digit-bearing word.
/// Directory components are left untouched.
///
/// ```
/// use skein_diff::normalize_asset_name;
/// assert_eq!(normalize_asset_name("main.8f3a9c21.js"), "main.js");
/// assert_eq!(normalize_asset_name("config-v2.html"), "config-v2.html");
/// ```
pub fn normalize_asset_name(path: &str) -> String {
    let (directory, name) = match path.rsplit_once('/') {
        Some((dir, name)) => (Some(dir), name),
        None => (None, path),
    };

    let mut out = String::with_capacity(name.len());
    let mut segment = String::new();
    let mut pending_separator: Option<char> = None;
    for c in name.chars().chain(std::iter::once('\0')) {
        if c != '.' && c != '-' && c != '\0' {
            segment.push(c);
            continue;
        }
        if looks_like_hash(&segment) {
            // Dropping the segment keeps the separator that follows it, so
            // `vendors-4f22ab01.js` collapses to `vendors.js`.
            if c != '\0' {
                pending_separator = Some(c);
            }
        } else {
            match pending_separator.take() {
                Some(sep) if !out.is_empty() => out.push(sep),
                _ => {}
            }
            out.push_str(&segment);
            if c != '\0' {
                pending_separator = Some(c);
            }
        }
        segment.clear();
    }

    match directory {
        Some(dir) => format!("{dir}/{out}"),
        None => out,
    }
}

fn looks_like_hash(segment: &str) -> bool {
    if segment.len() < 4 || !segment.chars().all(|c| c.is_ascii_alphanumeric()) {
        return false;
    }
    if !segment.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    if is_version_tag(segment) {
        return false;
    }
    !KEPT_SEGMENTS.contains(&segment.to_ascii_lowercase().as_str())
}

/// `v` followed by digits: `v2`, `v10`. Dotted tags like `v2.0` arrive here
/// already split at the dot, so only the leading part needs matching.
fn is_version_tag(segment: &str) -> bool {
    let mut chars = segment.chars();
    matches!(chars.next(), Some('v') | Some('V'))
        && chars.clone().next().is_some()
        && chars.all(|c| c.is_ascii_digit())
}
