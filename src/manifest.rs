/// A group of site files that are uploaded together with the same permissions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Directory relative to both the local source and the remote base.
    pub sub_path: &'static str,
    /// Glob matched against the files directly inside `sub_path`.
    pub file_spec: &'static str,
    /// Mode passed to `SITE CHMOD`, written the way `chmod` takes it (e.g. `644`).
    pub permissions: u32,
}

const fn entry(sub_path: &'static str, file_spec: &'static str, permissions: u32) -> ManifestEntry {
    ManifestEntry {
        sub_path,
        file_spec,
        permissions,
    }
}

/// Everything a generated site consists of, in upload order.
pub const MANIFEST: &[ManifestEntry] = &[
    entry("", "*.html", 664),
    entry("author", "*.html", 664),
    entry("category", "*.html", 664),
    entry("feeds", "*.xml", 664),
    entry("images", "*.jpg", 644),
    entry("images", "*.jpeg", 644),
    entry("images", "*.png", 644),
    entry("images", "*.gif", 644),
    entry("pages", "*.html", 664),
    entry("tags", "*.html", 664),
    entry("theme/css", "*.css", 644),
    entry("theme/fonts", "*.otf", 644),
    entry("theme/fonts", "*.ttf", 644),
    entry("theme/images", "*.jpg", 644),
    entry("theme/images", "*.png", 644),
    entry("theme/js", "*.js", 644),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_pages_feeds_and_theme() {
        assert_eq!(MANIFEST.len(), 16);
        assert_eq!(MANIFEST[0], entry("", "*.html", 664));
        assert!(MANIFEST.iter().any(|e| e.sub_path == "feeds"));
        assert!(
            MANIFEST
                .iter()
                .filter(|e| e.sub_path.starts_with("theme/"))
                .all(|e| e.permissions == 644)
        );
    }

    #[test]
    fn patterns_are_valid_globs() {
        for entry in MANIFEST {
            assert!(glob::Pattern::new(entry.file_spec).is_ok(), "{entry:?}");
        }
    }
}
