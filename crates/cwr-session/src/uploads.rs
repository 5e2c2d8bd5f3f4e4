//! Uploaded files: copied verbatim into the session directory, optionally
//! attached to the next user message as base64 data URLs.

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::store::session_dir;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Copy a file into the session directory under its original name.
pub fn store_upload(root: &Path, name: &str, source: &Path) -> Result<PathBuf> {
    let file_name = source
        .file_name()
        .with_context(|| format!("Upload source has no file name: {}", source.display()))?;

    let dir = session_dir(root, name)?;
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create session directory: {}", dir.display()))?;

    let dest = dir.join(file_name);
    fs::copy(source, &dest).with_context(|| {
        format!(
            "Failed to copy upload {} -> {}",
            source.display(),
            dest.display()
        )
    })?;

    debug!(session = name, file = %dest.display(), "stored upload");
    Ok(dest)
}

/// Whether the file extension marks an attachable image.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Encode an image file as a `data:image/<ext>;base64,...` URL.
pub fn file_to_data_url(path: &Path) -> Result<String> {
    if !is_image_file(path) {
        bail!(
            "Not an attachable image (expected {}): {}",
            IMAGE_EXTENSIONS.join("/"),
            path.display()
        );
    }

    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .expect("is_image_file checked the extension")
        .to_ascii_lowercase();

    let bytes =
        fs::read(path).with_context(|| format!("Failed to read image: {}", path.display()))?;
    let encoded = BASE64_STANDARD.encode(bytes);
    Ok(format!("data:image/{ext};base64,{encoded}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_upload_keeps_original_name() {
        let root = tempfile::tempdir().expect("tempdir");
        let src_dir = tempfile::tempdir().expect("tempdir");
        let src = src_dir.path().join("data.csv");
        fs::write(&src, "a,b\n1,2\n").unwrap();

        let dest = store_upload(root.path(), "example", &src).unwrap();
        assert_eq!(dest, root.path().join("example").join("data.csv"));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "a,b\n1,2\n");
    }

    #[test]
    fn test_store_upload_rejects_bad_session_name() {
        let root = tempfile::tempdir().expect("tempdir");
        let src = root.path().join("f.txt");
        fs::write(&src, "x").unwrap();
        assert!(store_upload(root.path(), "../evil", &src).is_err());
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("photo.png")));
        assert!(is_image_file(Path::new("photo.JPEG")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("archive")));
    }

    #[test]
    fn test_file_to_data_url_encodes_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("dot.png");
        fs::write(&path, b"ABC").unwrap();

        let url = file_to_data_url(&path).unwrap();
        assert_eq!(url, "data:image/png;base64,QUJD");
    }

    #[test]
    fn test_file_to_data_url_rejects_non_image() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("notes.txt");
        fs::write(&path, "text").unwrap();
        assert!(file_to_data_url(&path).is_err());
    }
}
