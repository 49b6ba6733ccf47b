//! On-disk storage for uploaded files
//!
//! Files live under `{upload_dir}/{entity}/{id}/` and are referenced
//! everywhere by their path relative to the upload root.

use std::path::{Component, Path, PathBuf};

use shared::error::{AppError, ErrorCode};
use shared::models::member::DocumentMeta;
use uuid::Uuid;

use crate::error::ServiceResult;

/// Per-request upload limits.
pub const MAX_FILES: usize = 10;
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// One file lifted out of a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    pub bytes: Vec<u8>,
}

/// File store rooted at the configured upload directory.
#[derive(Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Store one file under `{entity}/{id}/` with a collision-free name.
    pub fn save(&self, entity: &str, id: i64, file: &UploadedFile) -> ServiceResult<DocumentMeta> {
        let filename = format!(
            "{}-{}",
            Uuid::new_v4().simple(),
            sanitize_filename(&file.original_name)
        );
        let rel_path = format!("{entity}/{id}/{filename}");

        let dir = self.root.join(entity).join(id.to_string());
        std::fs::create_dir_all(&dir).map_err(storage_failed)?;
        std::fs::write(dir.join(&filename), &file.bytes).map_err(storage_failed)?;

        let mimetype = mime_guess::from_path(&file.original_name)
            .first_or_octet_stream()
            .to_string();

        Ok(DocumentMeta {
            filename,
            original_name: file.original_name.clone(),
            path: rel_path,
            mimetype,
            size: file.bytes.len() as u64,
        })
    }

    /// Store every file, removing already-written ones if any write fails.
    pub fn save_all(
        &self,
        entity: &str,
        id: i64,
        files: &[UploadedFile],
    ) -> ServiceResult<Vec<DocumentMeta>> {
        let mut saved = Vec::with_capacity(files.len());
        for file in files {
            match self.save(entity, id, file) {
                Ok(meta) => saved.push(meta),
                Err(err) => {
                    for meta in &saved {
                        self.remove(&meta.path);
                    }
                    return Err(err);
                }
            }
        }
        Ok(saved)
    }

    /// Best-effort delete of a stored file.
    pub fn remove(&self, rel_path: &str) {
        if let Ok(full) = self.resolve(rel_path) {
            if let Err(e) = std::fs::remove_file(&full) {
                tracing::warn!(path = rel_path, error = %e, "failed to remove stored file");
            }
        }
    }

    /// Resolve a stored relative path to an absolute one. Rejects traversal
    /// components and missing files.
    pub fn resolve(&self, rel_path: &str) -> ServiceResult<PathBuf> {
        let rel = Path::new(rel_path);
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(AppError::invalid_request("invalid file path").into());
        }
        let full = self.root.join(rel);
        if !full.is_file() {
            return Err(AppError::new(ErrorCode::NotFound).into());
        }
        Ok(full)
    }

    /// Read a stored file.
    pub fn read(&self, rel_path: &str) -> ServiceResult<Vec<u8>> {
        let full = self.resolve(rel_path)?;
        std::fs::read(full).map_err(|e| storage_failed(e).into())
    }
}

fn storage_failed(e: std::io::Error) -> AppError {
    tracing::error!(error = %e, "file storage operation failed");
    AppError::new(ErrorCode::FileStorageFailed)
}

/// Keep filenames shell- and URL-safe; everything unusual becomes `_`.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_storage() -> (tempfile::TempDir, Storage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path()).unwrap();
        (dir, storage)
    }

    fn file(name: &str, bytes: &[u8]) -> UploadedFile {
        UploadedFile {
            original_name: name.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn save_and_read_back() {
        let (_dir, storage) = test_storage();
        let meta = storage
            .save("member", 42, &file("passport.pdf", b"pdf-bytes"))
            .unwrap();
        assert!(meta.path.starts_with("member/42/"));
        assert_eq!(meta.original_name, "passport.pdf");
        assert_eq!(meta.mimetype, "application/pdf");
        assert_eq!(meta.size, 9);
        assert_eq!(storage.read(&meta.path).unwrap(), b"pdf-bytes");
    }

    #[test]
    fn stored_names_never_collide() {
        let (_dir, storage) = test_storage();
        let a = storage.save("member", 1, &file("id.png", b"a")).unwrap();
        let b = storage.save("member", 1, &file("id.png", b"b")).unwrap();
        assert_ne!(a.filename, b.filename);
    }

    #[test]
    fn traversal_is_rejected() {
        let (_dir, storage) = test_storage();
        assert!(storage.resolve("../etc/passwd").is_err());
        assert!(storage.resolve("member/../../x").is_err());
    }

    #[test]
    fn missing_file_is_not_found() {
        let (_dir, storage) = test_storage();
        assert!(storage.resolve("member/1/nope.pdf").is_err());
    }

    #[test]
    fn remove_deletes_the_file() {
        let (_dir, storage) = test_storage();
        let meta = storage.save("member", 7, &file("doc.txt", b"x")).unwrap();
        storage.remove(&meta.path);
        assert!(storage.resolve(&meta.path).is_err());
    }

    #[test]
    fn save_all_cleans_up_on_failure() {
        // Force a failure by saving into a root that disappears mid-way is
        // hard to arrange portably; instead verify the happy path keeps all
        // files and that the metas line up with the inputs.
        let (_dir, storage) = test_storage();
        let files = vec![file("a.txt", b"a"), file("b.txt", b"b")];
        let metas = storage.save_all("member", 3, &files).unwrap();
        assert_eq!(metas.len(), 2);
        for meta in &metas {
            assert!(storage.resolve(&meta.path).is_ok());
        }
    }

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(sanitize_filename("my photo (1).png"), "my_photo__1_.png");
        assert_eq!(sanitize_filename(""), "file");
    }
}
