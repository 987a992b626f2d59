use crate::errors::{Error, Result};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A client-submitted file that can be relocated into permanent storage.
pub trait UploadedFile: fmt::Debug + Send + Sync {
    /// File name as sent by the client
    fn client_original_name(&self) -> &str;

    /// Move the file to `directory/name`, creating the directory if needed, and return the new path.
    fn move_to(&self, directory: &Path, name: &str) -> Result<PathBuf>;
}

/// Uploaded file sitting in a temporary location on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalUploadedFile {
    path: PathBuf,
    original_name: String,
}

impl LocalUploadedFile {
    /// Wrap a temporary file. Only the final component of `original_name` is kept, so a client
    /// cannot smuggle directories in through its file name.
    pub fn new(path: impl Into<PathBuf>, original_name: &str) -> Self {
        let original_name = original_name.rsplit(['/', '\\']).next().unwrap_or_default().to_string();
        Self {
            path: path.into(),
            original_name,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UploadedFile for LocalUploadedFile {
    fn client_original_name(&self) -> &str {
        &self.original_name
    }

    fn move_to(&self, directory: &Path, name: &str) -> Result<PathBuf> {
        let move_error = |source| Error::Move {
            directory: directory.to_path_buf(),
            name: name.to_string(),
            source,
        };

        fs::create_dir_all(directory).map_err(move_error)?;

        let target = directory.join(name);
        if let Err(e) = fs::rename(&self.path, &target) {
            copy_across_devices(&self.path, &target, e).map_err(move_error)?;
        }

        Ok(target)
    }
}

/// Fallback for a failed rename. Only a cross-device rename is retried as copy + delete; any other
/// rename error is returned as is.
///
/// Once the copy succeeded the move counts as done, even if the source cannot be deleted.
fn copy_across_devices(source: &Path, target: &Path, rename_error: io::Error) -> io::Result<()> {
    if rename_error.kind() != io::ErrorKind::CrossesDevices {
        return Err(rename_error);
    }

    tracing::debug!("{:?} and {:?} are on different filesystems, copying", source, target);
    fs::copy(source, target)?;

    if let Err(e) = fs::remove_file(source) {
        tracing::warn!("Copied {:?} to {:?} but could not delete the source: {}", source, target, e);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_creates_directory_and_relocates_bytes() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("php1234.tmp");
        fs::write(&source, b"some content").unwrap();

        let file = LocalUploadedFile::new(&source, "report.pdf");
        let target_dir = temp_dir.path().join("uploads").join("2024");
        let target = file.move_to(&target_dir, "report.pdf").unwrap();

        assert_eq!(target, target_dir.join("report.pdf"));
        assert_eq!(fs::read(&target).unwrap(), b"some content");
        assert!(!source.exists());
    }

    #[test]
    fn test_move_of_missing_source_fails_loudly() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = LocalUploadedFile::new(temp_dir.path().join("gone.tmp"), "gone.txt");

        let result = file.move_to(temp_dir.path(), "gone.txt");
        match result {
            Err(Error::Move { directory, name, .. }) => {
                assert_eq!(directory, temp_dir.path());
                assert_eq!(name, "gone.txt");
            }
            other => panic!("expected move error, got {:?}", other),
        }
    }

    #[test_log::test]
    fn test_cross_device_rename_falls_back_to_copy() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("php1234.tmp");
        let target = temp_dir.path().join("stored.txt");
        fs::write(&source, b"some content").unwrap();

        copy_across_devices(&source, &target, io::Error::from(io::ErrorKind::CrossesDevices)).unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"some content");
        assert!(!source.exists());
    }

    #[test_log::test]
    fn test_other_rename_errors_are_not_retried() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("php1234.tmp");
        let target = temp_dir.path().join("stored.txt");
        fs::write(&source, b"some content").unwrap();

        let err = copy_across_devices(&source, &target, io::Error::from(io::ErrorKind::PermissionDenied)).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(source.exists());
        assert!(!target.exists());
    }

    #[test]
    fn test_move_failure_keeps_rename_error_as_source() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = LocalUploadedFile::new(temp_dir.path().join("gone.tmp"), "gone.txt");

        match file.move_to(temp_dir.path(), "gone.txt") {
            Err(Error::Move { source, .. }) => assert_eq!(source.kind(), io::ErrorKind::NotFound),
            other => panic!("expected move error, got {:?}", other),
        }
    }

    #[test]
    fn test_original_name_keeps_final_component() {
        assert_eq!(LocalUploadedFile::new("/tmp/x", "../../etc/passwd").client_original_name(), "passwd");
        assert_eq!(LocalUploadedFile::new("/tmp/x", "C:\\Users\\me\\cv.doc").client_original_name(), "cv.doc");
        assert_eq!(LocalUploadedFile::new("/tmp/x", "plain.txt").client_original_name(), "plain.txt");
    }
}
