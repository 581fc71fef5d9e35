//! Featured image pipeline: download, derive two downscaled PNG variants.
//!
//! Nothing touches the local disk; the variants live in memory until they
//! are handed to the asset store.

use std::io::Cursor;

use bytes::{Bytes, BytesMut};
use image::{DynamicImage, GenericImageView, ImageReader};
use reqwest::Client;

use super::error::RelayError;
use crate::constants::{FEATURED_SCALE, MAX_SOURCE_IMAGE_BYTES, THUMBNAIL_SCALE};

/// PNG-encoded variants of one source image
#[derive(Debug, Clone)]
pub struct ImageVariants {
    pub featured: Bytes,
    pub featured_dimensions: (u32, u32),
    pub thumbnail: Bytes,
    pub thumbnail_dimensions: (u32, u32),
}

/// Upstream sometimes appends a stray `;` to the image URL
pub fn clean_source_url(url: &str) -> &str {
    url.trim().trim_end_matches(';')
}

/// Download `source_url` and build the featured and thumbnail variants.
pub async fn build_variants(http: &Client, source_url: &str) -> Result<ImageVariants, RelayError> {
    let url = clean_source_url(source_url);
    let data = fetch_source(http, url, MAX_SOURCE_IMAGE_BYTES).await?;

    tracing::debug!(url, bytes = data.len(), "source image downloaded");

    let owned_url = url.to_string();
    tokio::task::spawn_blocking(move || variants_from_bytes(&data))
        .await
        .map_err(|e| RelayError::image_fetch(&owned_url, e))?
        .map_err(|e| RelayError::image_fetch(&owned_url, e))
}

/// GET `url`, refusing bodies larger than `max_bytes` whether or not the
/// server declares a length.
async fn fetch_source(http: &Client, url: &str, max_bytes: usize) -> Result<Bytes, RelayError> {
    let too_large = || RelayError::image_fetch(url, format!("image exceeds {max_bytes} bytes"));

    let mut resp = http
        .get(url)
        .send()
        .await
        .map_err(|e| RelayError::image_fetch(url, e))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(RelayError::image_fetch(url, format!("status {status}")));
    }

    if resp
        .content_length()
        .is_some_and(|len| len > max_bytes as u64)
    {
        return Err(too_large());
    }

    let mut data = BytesMut::new();
    while let Some(chunk) = resp
        .chunk()
        .await
        .map_err(|e| RelayError::image_fetch(url, e))?
    {
        if data.len() + chunk.len() > max_bytes {
            return Err(too_large());
        }
        data.extend_from_slice(&chunk);
    }

    Ok(data.freeze())
}

/// Bounding box scaled by `factor`, never below one pixel
fn scaled_bounds(width: u32, height: u32, factor: f64) -> (u32, u32) {
    let scale = |v: u32| ((f64::from(v) * factor).floor() as u32).max(1);
    (scale(width), scale(height))
}

/// Fit inside the scaled bounding box, preserving aspect ratio. Never upscales.
fn shrink(img: &DynamicImage, factor: f64) -> DynamicImage {
    let (max_w, max_h) = scaled_bounds(img.width(), img.height(), factor);
    if img.width() <= max_w && img.height() <= max_h {
        return img.clone();
    }
    img.thumbnail(max_w, max_h)
}

fn encode_png(img: &DynamicImage) -> Result<Bytes, image::ImageError> {
    let mut output = Cursor::new(Vec::new());
    img.write_to(&mut output, image::ImageFormat::Png)?;
    Ok(Bytes::from(output.into_inner()))
}

pub fn variants_from_bytes(data: &[u8]) -> Result<ImageVariants, image::ImageError> {
    let img = ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .decode()?;

    let featured = shrink(&img, FEATURED_SCALE);
    let thumbnail = shrink(&featured, THUMBNAIL_SCALE);

    Ok(ImageVariants {
        featured: encode_png(&featured)?,
        featured_dimensions: featured.dimensions(),
        thumbnail: encode_png(&thumbnail)?,
        thumbnail_dimensions: thumbnail.dimensions(),
    })
}
