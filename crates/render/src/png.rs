use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use image::{ImageFormat, ImageReader};
use instanews_layout::Size;
use std::io::{Cursor, Write};
use std::path::Path;

/// An encoded PNG whose pixel size has been checked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Png {
    bytes: Vec<u8>,
    size: Size,
}

impl Png {
    /// Decodes the header of `bytes` and fails unless the image is exactly `expected`.
    pub fn new(bytes: Vec<u8>, expected: Size) -> Result<Self> {
        let (width, height) = ImageReader::with_format(Cursor::new(bytes.as_slice()), ImageFormat::Png)
            .into_dimensions()
            .or_raise(|| ErrorKind::InvalidImage)?;
        let actual = Size::new(width, height);
        if actual != expected {
            exn::bail!(ErrorKind::Geometry { expected, actual });
        }
        Ok(Self { bytes, size: actual })
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Writes the image to `path`. The file only appears under its final name once every byte is on disk.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(dir).or_raise(|| ErrorKind::Io)?;
        file.write_all(&self.bytes).or_raise(|| ErrorKind::Io)?;
        file.as_file().sync_all().or_raise(|| ErrorKind::Io)?;
        file.persist(path).or_raise(|| ErrorKind::Io)?;
        Ok(())
    }
}
