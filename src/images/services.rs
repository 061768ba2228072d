use std::path::Path;

use anyhow::Context;
use bytes::Bytes;
use rand::Rng;
use time::OffsetDateTime;
use tracing::debug;

use crate::storage::StorageClient;

pub struct UploadItem {
    pub body: Bytes,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub key: String,
    pub public_path: String,
}

/// Writes the image under a collision-resistant name and returns where it is served.
pub async fn store_image(
    storage: &dyn StorageClient,
    item: UploadItem,
) -> anyhow::Result<StoredImage> {
    anyhow::ensure!(!item.body.is_empty(), "empty image upload");

    let millis = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;
    let suffix = rand::thread_rng().gen_range(0..1_000_000_000u32);
    let ext = item
        .file_name
        .as_deref()
        .and_then(ext_from_file_name)
        .or_else(|| item.content_type.as_deref().and_then(ext_from_mime).map(str::to_string));
    let key = stored_file_name(millis, suffix, ext.as_deref());

    storage
        .put_object(&key, item.body)
        .await
        .with_context(|| format!("put_object {}", key))?;
    debug!(key = %key, "image stored");

    Ok(StoredImage {
        public_path: storage.public_path(&key),
        key,
    })
}

fn stored_file_name(millis: i64, suffix: u32, ext: Option<&str>) -> String {
    match ext {
        Some(ext) => format!("{millis}-{suffix}.{ext}"),
        None => format!("{millis}-{suffix}"),
    }
}

fn ext_from_file_name(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?;
    let ok = !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric());
    ok.then(|| ext.to_ascii_lowercase())
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

#[cfg(test)]
mod image_tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;

    #[test]
    fn test_ext_from_mime() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("application/octet-stream"), None);
    }

    #[test]
    fn test_ext_from_file_name() {
        assert_eq!(ext_from_file_name("tomatoes.JPG").as_deref(), Some("jpg"));
        assert_eq!(ext_from_file_name("field.photo.png").as_deref(), Some("png"));
        assert_eq!(ext_from_file_name("noext"), None);
        assert_eq!(ext_from_file_name("weird.p/g"), None);
        assert_eq!(ext_from_file_name("evil.ph p"), None);
    }

    #[test]
    fn test_stored_file_name() {
        assert_eq!(stored_file_name(1700000000000, 42, Some("png")), "1700000000000-42.png");
        assert_eq!(stored_file_name(1700000000000, 7, None), "1700000000000-7");
    }

    #[tokio::test]
    async fn store_image_prefers_file_extension_then_mime() {
        let storage = MemoryStorage::default();

        let by_name = store_image(
            &storage,
            UploadItem {
                body: Bytes::from_static(b"img"),
                content_type: Some("image/jpeg".into()),
                file_name: Some("crop.png".into()),
            },
        )
        .await
        .unwrap();
        assert!(by_name.key.ends_with(".png"));
        assert_eq!(by_name.public_path, format!("/uploads/{}", by_name.key));

        let by_mime = store_image(
            &storage,
            UploadItem {
                body: Bytes::from_static(b"img"),
                content_type: Some("image/webp".into()),
                file_name: None,
            },
        )
        .await
        .unwrap();
        assert!(by_mime.key.ends_with(".webp"));
        assert_ne!(by_name.key, by_mime.key);
        assert_eq!(storage.objects.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn store_image_rejects_empty_body() {
        let storage = MemoryStorage::default();
        let item = UploadItem { body: Bytes::new(), content_type: None, file_name: None };
        assert!(store_image(&storage, item).await.is_err());
    }
}
