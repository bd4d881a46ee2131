use crate::error::{ErrorKind, Result};
use crate::{Document, Png, Rasterize, Renderer};
use exn::ResultExt;
use instanews_layout::{Composition, Size};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Fails unless the requested raster matches the composition's own canvas.
pub(crate) fn check_geometry(composition: &Composition, width: u32, height: u32, pixel_ratio: u32) -> Result<Size> {
    let requested = Size::new(width, height);
    if requested != composition.canvas || pixel_ratio == 0 {
        exn::bail!(ErrorKind::Geometry { expected: composition.canvas, actual: requested });
    }
    Ok(requested)
}

impl Renderer {
    /// Writes the styled document for `composition` into `dir` and returns its path.
    fn persist_html(&self, composition: &Composition, dir: &Path) -> Result<PathBuf> {
        let document = Document::new(composition)?;
        let html = document.with_styles(&self.styles)?;
        let path = dir.join(format!("{}.html", composition.format));
        fs::write(&path, html).or_raise(|| ErrorKind::Io)?;
        Ok(path)
    }
}

impl Rasterize for Renderer {
    #[instrument(skip_all, fields(format = %composition.format, pixel_ratio = pixel_ratio))]
    fn rasterize(&self, composition: &Composition, width: u32, height: u32, pixel_ratio: u32) -> Result<Png> {
        let window = check_geometry(composition, width, height, pixel_ratio)?;
        let workdir = tempfile::tempdir().or_raise(|| ErrorKind::Io)?;
        let input = self.persist_html(composition, workdir.path())?;
        let output = workdir.path().join(format!("{}.png", composition.format));
        self.chrome.execute(&input, &output, window, pixel_ratio)?;
        let bytes = fs::read(&output).or_raise(|| ErrorKind::Io)?;
        let png = Png::new(bytes, window.scaled(pixel_ratio))?;
        tracing::debug!(size = %png.size(), bytes = png.as_bytes().len(), "Card rasterized");
        Ok(png)
    }
}
