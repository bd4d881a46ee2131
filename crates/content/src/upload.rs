//! Local image files turned into `data:` URIs.
//!
//! Cards only ever reference images by URL, so a picked file is embedded
//! directly into the record. Files are checked before they get that far: they
//! must fit under the configured size limit and their leading bytes must match
//! an image format every browser engine can draw.

use crate::error::{ErrorKind, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use exn::ResultExt;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::instrument;

const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];
const GIF87_MAGIC: &[u8] = b"GIF87a";
const GIF89_MAGIC: &[u8] = b"GIF89a";
const RIFF_MAGIC: &[u8] = b"RIFF";
const WEBP_MAGIC: &[u8] = b"WEBP";
const BMP_MAGIC: &[u8] = b"BM";

/// An image format accepted for uploads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaType {
    Png,
    Jpeg,
    Gif,
    Webp,
    Bmp,
}
impl MediaType {
    /// Detect the format from the leading bytes of a file.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&PNG_MAGIC) {
            return Some(Self::Png);
        }
        if bytes.starts_with(&JPEG_MAGIC) {
            return Some(Self::Jpeg);
        }
        if bytes.starts_with(GIF87_MAGIC) || bytes.starts_with(GIF89_MAGIC) {
            return Some(Self::Gif);
        }
        // RIFF container: 4 bytes magic, 4 bytes length, then the form type.
        if bytes.starts_with(RIFF_MAGIC) && bytes.get(8..12) == Some(WEBP_MAGIC) {
            return Some(Self::Webp);
        }
        if bytes.starts_with(BMP_MAGIC) {
            return Some(Self::Bmp);
        }
        None
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
            Self::Bmp => "image/bmp",
        }
    }
}
impl Display for MediaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.mime())
    }
}

/// A validated local image, ready to be embedded into a [`ContentRecord`](crate::ContentRecord).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageUpload {
    media_type: MediaType,
    bytes: Vec<u8>,
}
impl ImageUpload {
    /// Validates in-memory image bytes against the size limit and the accepted formats.
    pub fn from_bytes(bytes: Vec<u8>, max_bytes: u64) -> Result<Self> {
        let size = bytes.len() as u64;
        if size > max_bytes {
            exn::bail!(ErrorKind::TooLarge { size, limit: max_bytes });
        }
        let Some(media_type) = MediaType::sniff(&bytes) else {
            exn::bail!(ErrorKind::UnsupportedMedia);
        };
        Ok(Self { media_type, bytes })
    }

    /// Reads and validates an image file.
    ///
    /// The size is checked against file metadata before anything is read, so
    /// an enormous file is rejected without being loaded.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_path(path: impl AsRef<Path>, max_bytes: u64) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
        }
        let size = path.metadata().or_raise(|| ErrorKind::Io)?.len();
        if size > max_bytes {
            exn::bail!(ErrorKind::TooLarge { size, limit: max_bytes });
        }
        let mut bytes = Vec::with_capacity(usize::try_from(size).unwrap_or_default());
        // The file may grow between the metadata call and the read; never read past the limit.
        File::open(path)
            .or_raise(|| ErrorKind::Io)?
            .take(max_bytes.saturating_add(1))
            .read_to_end(&mut bytes)
            .or_raise(|| ErrorKind::Io)?;
        let upload = Self::from_bytes(bytes, max_bytes)?;
        tracing::debug!(media_type = %upload.media_type, size, "Accepted local image");
        Ok(upload)
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    /// Size of the image in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Embeds the image as a base64 `data:` URI.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type.mime(), BASE64.encode(&self.bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    const TINY_PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D];

    #[rstest]
    #[case(TINY_PNG, Some(MediaType::Png))]
    #[case(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00], Some(MediaType::Jpeg))]
    #[case(b"GIF89a\x01\x00", Some(MediaType::Gif))]
    #[case(b"GIF87a\x01\x00", Some(MediaType::Gif))]
    #[case(b"RIFF\x24\x00\x00\x00WEBPVP8 ", Some(MediaType::Webp))]
    #[case(b"RIFF\x24\x00\x00\x00WAVEfmt ", None)]
    #[case(b"BM\x36\x00", Some(MediaType::Bmp))]
    #[case(b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>", None)]
    #[case(b"%PDF-1.7", None)]
    #[case(b"", None)]
    fn test_sniff(#[case] bytes: &[u8], #[case] expected: Option<MediaType>) {
        assert_eq!(MediaType::sniff(bytes), expected);
    }

    #[test]
    fn data_uri_is_base64_with_mime() {
        let upload = ImageUpload::from_bytes(TINY_PNG.to_vec(), 1024).unwrap();
        assert_eq!(upload.media_type(), MediaType::Png);
        assert_eq!(upload.to_data_uri(), "data:image/png;base64,iVBORw0KGgoAAAAN");
    }

    #[test]
    fn rejects_oversized_bytes() {
        let err = ImageUpload::from_bytes(TINY_PNG.to_vec(), 4).unwrap_err();
        assert_eq!(*err, ErrorKind::TooLarge { size: 12, limit: 4 });
    }

    #[test]
    fn reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TINY_PNG).unwrap();
        let upload = ImageUpload::from_path(file.path(), 1024).unwrap();
        assert_eq!(upload.size(), TINY_PNG.len() as u64);
    }

    #[test]
    fn rejects_non_image_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"just some notes").unwrap();
        let err = ImageUpload::from_path(file.path(), 1024).unwrap_err();
        assert_eq!(*err, ErrorKind::UnsupportedMedia);
    }

    #[test]
    fn rejects_oversized_file_before_reading() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 64]).unwrap();
        let err = ImageUpload::from_path(file.path(), 16).unwrap_err();
        assert_eq!(*err, ErrorKind::TooLarge { size: 64, limit: 16 });
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.png");
        let err = ImageUpload::from_path(&path, 1024).unwrap_err();
        assert_eq!(*err, ErrorKind::NotFound(path));
    }
}
