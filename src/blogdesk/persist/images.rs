use crate::error::{BlogError, Result};
use crate::store::StorageBackend;
use quick_xml::escape::escape;
use std::path::Path;

/// An image copied into the site, ready to be referenced from a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertedImage {
    pub file_name: String,
    /// Path relative to the site root, e.g. `images/1700000000000_cat.png`.
    pub relative_path: String,
    pub html: String,
}

/// Replaces every character outside `[A-Za-z0-9_.-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `<millis>_<sanitized name>`.
pub fn stored_name(original: &str, millis: i64) -> String {
    format!("{}_{}", millis, sanitize_file_name(original))
}

pub fn image_html(src: &str) -> String {
    format!(r#"<img src="{}" alt="">"#, escape(src))
}

/// Copies `source` into `images_dir`. If the millisecond name is already
/// taken, the next free millisecond is used.
pub fn insert_image<B: StorageBackend>(
    backend: &B,
    source: &Path,
    images_dir: &Path,
    url_prefix: &str,
    now_millis: i64,
) -> Result<InsertedImage> {
    let original = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| BlogError::Validation(format!("{} is not a file", source.display())))?;

    let mut millis = now_millis;
    let mut file_name = stored_name(&original, millis);
    while backend.exists(&images_dir.join(&file_name)) {
        millis += 1;
        file_name = stored_name(&original, millis);
    }

    backend.copy_file(source, &images_dir.join(&file_name))?;
    log::info!("copied {} to {}", source.display(), images_dir.display());

    let prefix = url_prefix.trim_matches('/');
    let relative_path = if prefix.is_empty() {
        file_name.clone()
    } else {
        format!("{}/{}", prefix, file_name)
    };
    Ok(InsertedImage {
        html: image_html(&relative_path),
        file_name,
        relative_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemBackend;

    fn is_stored_form(name: &str) -> bool {
        let Some((millis, rest)) = name.split_once('_') else {
            return false;
        };
        !millis.is_empty()
            && millis.chars().all(|c| c.is_ascii_digit())
            && rest == "my_photo__1_.PNG"
    }

    #[test]
    fn sanitizes_everything_outside_the_safe_set() {
        assert_eq!(sanitize_file_name("my photo (1).PNG"), "my_photo__1_.PNG");
        assert_eq!(sanitize_file_name("a-b_c.d"), "a-b_c.d");
        assert_eq!(sanitize_file_name("사진.jpg"), "__.jpg");
    }

    #[test]
    fn stored_names_are_timestamped() {
        let first = stored_name("my photo (1).PNG", 1_700_000_000_000);
        let second = stored_name("my photo (1).PNG", 1_700_000_000_001);
        assert!(is_stored_form(&first));
        assert!(is_stored_form(&second));
        assert_ne!(first, second);
    }

    #[test]
    fn copies_into_images_dir() {
        let backend = MemBackend::new();
        backend.put("/home/me/my photo (1).PNG", vec![9u8, 9]);

        let image = insert_image(
            &backend,
            Path::new("/home/me/my photo (1).PNG"),
            Path::new("site/images"),
            "images",
            42,
        )
        .unwrap();

        assert_eq!(image.file_name, "42_my_photo__1_.PNG");
        assert_eq!(image.relative_path, "images/42_my_photo__1_.PNG");
        assert_eq!(image.html, r#"<img src="images/42_my_photo__1_.PNG" alt="">"#);
        assert_eq!(
            backend.bytes(Path::new("site/images/42_my_photo__1_.PNG")),
            Some(vec![9, 9])
        );
    }

    #[test]
    fn same_millisecond_does_not_overwrite() {
        let backend = MemBackend::new();
        backend.put("cat.png", vec![1u8]);
        let dir = Path::new("images");

        let a = insert_image(&backend, Path::new("cat.png"), dir, "images", 7).unwrap();
        let b = insert_image(&backend, Path::new("cat.png"), dir, "images", 7).unwrap();

        assert_eq!(a.file_name, "7_cat.png");
        assert_eq!(b.file_name, "8_cat.png");
    }

    #[test]
    fn missing_source_is_an_error() {
        let backend = MemBackend::new();
        assert!(insert_image(&backend, Path::new("gone.png"), Path::new("images"), "", 1).is_err());
    }
}
