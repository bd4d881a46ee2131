use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use instanews_layout::Size;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::instrument;

/// How long Chrome may spend loading remote images before the screenshot is taken, in milliseconds.
const LOAD_BUDGET_MS: u32 = 10_000;

/// Represents a Chrome/Chromium executable.
#[derive(Debug)]
pub(crate) enum Chrome {
    /// A directly executable binary.
    Binary { path: PathBuf },
    /// A Flatpak-installed application.
    Flatpak { flatpak: PathBuf, app_id: String },
}
impl Chrome {
    pub(crate) fn discover() -> Result<Self> {
        // Check for direct executables
        let executables = ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser", "chrome"];
        for exe in executables {
            if let Ok(path) = which::which(exe) {
                tracing::debug!(chrome = %path.display(), "Discovered Chrome executable");
                return Ok(Self::Binary { path });
            }
        }
        tracing::info!("Chrome executable not found in PATH");
        if let Ok(flatpak) = which::which("flatpak") {
            tracing::trace!(flatpak = %flatpak.display(), "Discovered Flatpak on system; searching installed apps");
            let flatpak_apps = ["com.google.Chrome", "org.chromium.Chromium"];
            for app_id in flatpak_apps {
                if Command::new(&flatpak).args(["info", app_id]).output().is_ok_and(|o| o.status.success()) {
                    return Ok(Self::Flatpak { flatpak, app_id: app_id.to_string() });
                }
            }
        } else {
            tracing::info!("Flatpak not found; skipping containerized Chrome checks.");
        }
        exn::bail!(ErrorKind::ChromeNotFound);
    }

    /// Uses the executable at `path` without searching.
    pub(crate) fn at(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            tracing::warn!(chrome = %path.display(), "Configured Chrome executable does not exist");
            exn::bail!(ErrorKind::ChromeNotFound);
        }
        Ok(Self::Binary { path })
    }

    fn command(&self, workdir: &Path) -> Command {
        match self {
            Self::Binary { path } => Command::new(path),
            Self::Flatpak { flatpak, app_id } => {
                let mut command = Command::new(flatpak);
                command.arg("run").arg(format!("--filesystem={}", workdir.display())).arg(app_id);
                command
            },
        }
    }

    /// Screenshots `input` into `output` at `window` CSS pixels and `scale` device pixels per CSS pixel.
    #[instrument(skip_all, fields(window = %window, scale = scale))]
    pub(crate) fn execute(&self, input: &Path, output: &Path, window: Size, scale: u32) -> Result<()> {
        let workdir = input.parent().unwrap_or(input);
        let result = self
            .command(workdir)
            .args([
                "--headless=new",
                "--disable-gpu",
                "--no-sandbox",
                "--no-first-run",
                "--no-default-browser-check",
                "--hide-scrollbars",
                "--run-all-compositor-stages-before-draw",
            ])
            .arg(format!("--virtual-time-budget={LOAD_BUDGET_MS}"))
            .arg(format!("--window-size={},{}", window.width, window.height))
            .arg(format!("--force-device-scale-factor={scale}"))
            .arg(format!("--screenshot={}", output.display()))
            .arg(format!("file://{}", input.display()))
            .output()
            .or_raise(|| ErrorKind::Io)?;
        if !result.status.success() {
            let code = result.status.code().unwrap_or(-1);
            tracing::warn!(code, stderr = %String::from_utf8_lossy(&result.stderr), "Chrome exited unsuccessfully");
            exn::bail!(ErrorKind::ChromeFailed(code));
        }
        if !output.is_file() {
            exn::bail!(ErrorKind::ChromeFailed(0));
        }
        Ok(())
    }
}
