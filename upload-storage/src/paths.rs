//! String path helpers shared by the storage adapter.
//!
//! Paths are handled as strings rather than [`std::path::Path`] because mapping metadata may carry
//! paths written for another platform (e.g. `c:\abs\path\web\uploads` on a Unix host). Joining
//! always uses the host separator; anything that feeds a URI is normalized to forward slashes
//! first.

use std::path::MAIN_SEPARATOR;

/// Directory segment conventionally marking the public web root.
pub const PUBLIC_ROOT_SEGMENT: &str = "web";

/// Replace every backslash with a forward slash.
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Join `base` and `child` with the host separator, verbatim.
///
/// No trimming happens on either side: `join("/dir", "")` is `"/dir/"`.
pub fn join(base: &str, child: &str) -> String {
    format!("{base}{MAIN_SEPARATOR}{child}")
}

/// Append a relative sub-directory to `directory`, collapsing the separators between them.
pub fn append_dir(directory: &str, sub_dir: &str) -> String {
    let directory = directory.trim_end_matches(['/', '\\']);
    let sub_dir = sub_dir.trim_start_matches(['/', '\\']);
    format!("{directory}{MAIN_SEPARATOR}{sub_dir}")
}

/// Split a (possibly generated) file name into its directory part and final component.
///
/// `"dir_1/dir_2/file.txt"` becomes `(Some("dir_1/dir_2"), "file.txt")`; a bare name has no
/// directory part.
pub fn split_file_name(name: &str) -> (Option<&str>, &str) {
    match name.rfind('/') {
        Some(idx) => {
            let dir = &name[..idx];
            ((!dir.is_empty()).then_some(dir), &name[idx + 1..])
        }
        None => (None, name),
    }
}

/// Portion of `upload_dir` that lies below the public location identified by `uri_prefix`.
///
/// The sub-path is whatever follows the rightmost occurrence of the prefix in the normalized
/// upload directory. When the prefix does not occur, the portion below the rightmost `web`
/// segment is used instead, and an upload directory with neither yields an empty sub-path.
///
/// The prefix is matched as a plain substring, not on segment boundaries. With prefix `/uploads`,
/// `/srv/web/uploads/custom/uploads-old` matches at `/uploads-old` and yields `-old`, so the URI
/// becomes `/uploads-old/<file>`.
pub fn public_sub_path(upload_dir: &str, uri_prefix: &str) -> String {
    let dir = normalize_separators(upload_dir);
    let prefix = uri_prefix.trim_end_matches('/');

    if !prefix.is_empty() {
        if let Some(idx) = dir.rfind(prefix) {
            return dir[idx + prefix.len()..].trim_end_matches('/').to_string();
        }
    }

    let segments: Vec<&str> = dir.split('/').collect();
    match segments.iter().rposition(|segment| *segment == PUBLIC_ROOT_SEGMENT) {
        Some(pos) => {
            let below: Vec<&str> = segments[pos + 1..].iter().copied().filter(|s| !s.is_empty()).collect();
            if below.is_empty() {
                String::new()
            } else {
                format!("/{}", below.join("/"))
            }
        }
        None => String::new(),
    }
}

/// Build the public URI of `file_name` stored under `upload_dir`.
pub fn public_uri(uri_prefix: &str, upload_dir: &str, file_name: &str) -> String {
    let sub_path = public_sub_path(upload_dir, uri_prefix);
    format!("{}{}/{}", uri_prefix.trim_end_matches('/'), sub_path, file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_join_keeps_empty_child() {
        assert_eq!(join("/dir", ""), format!("/dir{MAIN_SEPARATOR}"));
        assert_eq!(join("/root_dir", "dir_1/dir_2"), format!("/root_dir{MAIN_SEPARATOR}dir_1/dir_2"));
    }

    #[test]
    fn test_append_dir_collapses_separators() {
        let base = join("/dir", "");
        assert_eq!(append_dir(&base, "a/b"), format!("/dir{MAIN_SEPARATOR}a/b"));
        assert_eq!(append_dir("c:\\uploads\\", "a"), format!("c:\\uploads{MAIN_SEPARATOR}a"));
    }

    #[rstest]
    #[case("filename.txt", None, "filename.txt")]
    #[case("dir_1/dir_2/filename.txt", Some("dir_1/dir_2"), "filename.txt")]
    #[case("/filename.txt", None, "filename.txt")]
    fn test_split_file_name(#[case] name: &str, #[case] dir: Option<&str>, #[case] file: &str) {
        assert_eq!(split_file_name(name), (dir, file));
    }

    #[rstest]
    #[case("/abs/path/web/uploads", "/uploads/file.txt")]
    #[case("c:\\abs\\path\\web\\uploads", "/uploads/file.txt")]
    #[case("/abs/path/web/project/web/uploads", "/uploads/file.txt")]
    #[case("/abs/path/web/project/web/uploads/custom/dir", "/uploads/custom/dir/file.txt")]
    #[case("c:\\abs\\path\\web\\uploads\\custom\\dir\\", "/uploads/custom/dir/file.txt")]
    fn test_public_uri_strips_up_to_prefix(#[case] upload_dir: &str, #[case] uri: &str) {
        assert_eq!(public_uri("/uploads", upload_dir, "file.txt"), uri);
    }

    #[rstest]
    #[case("/srv/app/web/media/2024", "/uploads/media/2024/file.txt")]
    #[case("/srv/app/web", "/uploads/file.txt")]
    #[case("/srv/app/storage", "/uploads/file.txt")]
    #[case("", "/uploads/file.txt")]
    fn test_public_uri_falls_back_to_web_root(#[case] upload_dir: &str, #[case] uri: &str) {
        assert_eq!(public_uri("/uploads", upload_dir, "file.txt"), uri);
    }

    #[test]
    fn test_public_uri_prefix_matches_mid_segment() {
        assert_eq!(public_sub_path("/srv/web/uploads/custom/uploads-old", "/uploads"), "-old");
        assert_eq!(public_uri("/uploads", "/srv/web/uploads/custom/uploads-old", "f.txt"), "/uploads-old/f.txt");
    }

    #[test]
    fn test_public_uri_trims_trailing_prefix_slash() {
        assert_eq!(public_uri("/uploads/", "/abs/web/uploads/a", "f.txt"), "/uploads/a/f.txt");
    }
}
