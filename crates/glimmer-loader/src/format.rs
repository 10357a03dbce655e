//! Format selection from a path or URL hint.

use std::ffi::OsStr;
use std::path::Path;

use glimmer_common::ImageFormat;
use glimmer_common::warning::warn_once;
use strum::IntoEnumIterator;

/// Strip query string (`?…`) and fragment identifier (`#…`) from a URL so
/// that the remaining path can be checked for a file extension.
///
/// [URL Standard § 4.1](https://url.spec.whatwg.org/#concept-url-path)
#[must_use]
pub fn strip_url_decorations(resolved: &str) -> &str {
    let without_fragment = resolved.split_once('#').map_or(resolved, |(b, _)| b);
    without_fragment
        .split_once('?')
        .map_or(without_fragment, |(b, _)| b)
}

/// Emit `warn_once` messages for a query string or fragment on a path hint.
/// Neither affects which decoder runs.
pub fn warn_url_decorations(hint: &str) {
    if let Some((_, fragment)) = hint.split_once('#') {
        warn_once(
            "loader",
            &format!("ignoring fragment identifier '#{fragment}' in '{hint}'"),
        );
    }
    let without_fragment = hint.split_once('#').map_or(hint, |(b, _)| b);
    if let Some((_, query)) = without_fragment.split_once('?') {
        warn_once(
            "loader",
            &format!("ignoring query string '?{query}' in '{hint}'"),
        );
    }
}

/// Format named by the hint's extension, matched case-insensitively.
///
/// Returns `None` for a missing or unrecognized extension, in which case
/// every format is tried in [`ImageFormat`] iteration order.
#[must_use]
pub fn format_from_path(hint: &str) -> Option<ImageFormat> {
    Path::new(strip_url_decorations(hint))
        .extension()
        .and_then(format_from_extension)
}

/// Format whose canonical extension equals `extension`, ignoring ASCII case.
#[must_use]
pub fn format_from_extension(extension: &OsStr) -> Option<ImageFormat> {
    ImageFormat::iter().find(|format| extension.eq_ignore_ascii_case(format.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_url_decorations() {
        assert_eq!(strip_url_decorations("a/b.png?w=10#top"), "a/b.png");
        assert_eq!(strip_url_decorations("a/b.gif#x?y"), "a/b.gif");
        assert_eq!(strip_url_decorations("plain.gif"), "plain.gif");
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert_eq!(format_from_path("icon.PNG"), Some(ImageFormat::Png));
        assert_eq!(format_from_path("dir/anim.Gif"), Some(ImageFormat::Gif));
        assert_eq!(
            format_from_path("https://host/logo.png?v=3"),
            Some(ImageFormat::Png)
        );
    }

    #[test]
    fn test_unrecognized_extension() {
        assert_eq!(format_from_path("photo.jpg"), None);
        assert_eq!(format_from_path("README"), None);
        assert_eq!(format_from_path(""), None);
        assert_eq!(format_from_path("archive.png.bak"), None);
    }
}
