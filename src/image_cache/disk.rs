use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One file per image, named after the SHA-256 of its source URL.
#[derive(Debug, Clone)]
pub struct DiskTier {
    dir: PathBuf,
    quality: u8,
}

impl DiskTier {
    pub fn new(dir: impl Into<PathBuf>, quality: u8) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create image cache directory {}", dir.display()))?;
        Ok(Self { dir, quality })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, url: &str) -> PathBuf {
        self.dir.join(file_name(url))
    }

    pub async fn read(&self, url: &str) -> Option<Vec<u8>> {
        let path = self.path_for(url);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to read cached image {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Re-encodes `bytes` as JPEG at the tier's quality.
    ///
    /// Fails when `bytes` is not a decodable image.
    pub async fn encode(&self, bytes: Vec<u8>) -> Result<Vec<u8>> {
        let quality = self.quality;
        tokio::task::spawn_blocking(move || reencode_jpeg(&bytes, quality))
            .await
            .context("JPEG encoder task failed")?
    }

    pub async fn write(&self, url: &str, encoded: &[u8]) -> Result<()> {
        let path = self.path_for(url);
        let tmp = path.with_extension("jpg.tmp");
        tokio::fs::write(&tmp, encoded)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("Failed to move cached image into {}", path.display()))?;
        Ok(())
    }
}

pub fn file_name(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    format!("{}.jpg", hex::encode(digest))
}

fn reencode_jpeg(bytes: &[u8], quality: u8) -> Result<Vec<u8>> {
    let decoded = image::load_from_memory(bytes).context("Payload is not a decodable image")?;
    let rgb = decoded.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(&rgb)
        .context("JPEG encoding failed")?;
    Ok(out)
}
