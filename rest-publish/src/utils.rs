use std::path::Path;

use heck::ToKebabCase;

/// File name sent with the upload.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Kebab cased title, or file stem when the title is blank.
pub fn slug(title: &str, path: &Path) -> String {
    let title = title.trim();

    if !title.is_empty() {
        return title.to_kebab_case();
    }

    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_kebab_case())
        .unwrap_or_default()
}
