//! One post being put together, from pasted input to exported PNG.
//!
//! A [`Session`] owns the single live [`State`], the pair of offscreen
//! [`Previews`] (feed and story, always matching the state), and the two
//! outside collaborators: a [`Summarizer`](instanews_acquire::Summarizer) for acquisition and a [`Rasterize`]
//! implementation for export.
//!
//! At most one acquisition is in flight. A second [`Session::process`] call
//! while one is pending fails with [`ErrorKind::Busy`]. Starting a new post
//! abandons the pending call, and its reply is dropped when it arrives.

pub mod error;
mod state;

pub use crate::state::{Action, State, Step, reduce};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use instanews_acquire::{SummarizerHandle, acquire};
use instanews_config::Config;
use instanews_content::ImageUpload;
use instanews_layout::{Branding, Composer, Composition, Format};
use instanews_render::{PIXEL_RATIO, Rasterize};
use rslug::slugify;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use time::UtcDateTime;
use tokio::sync::RwLock;
use tracing::instrument;

pub type RasterizerHandle = Arc<dyn Rasterize>;

/// What became of an acquisition request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The reply was merged into the post.
    Applied,
    /// The input was blank; nothing was sent.
    EmptyInput,
    /// A new post was started while waiting; the reply was dropped.
    Superseded,
}

/// Both renditions of the current post, laid out and ready to export.
#[derive(Clone, Debug, PartialEq)]
pub struct Previews {
    pub feed: Composition,
    pub story: Composition,
}
impl Previews {
    fn compose(composer: &Composer, state: &State) -> Self {
        Self {
            feed: composer.compose(&state.content, Format::Feed, state.show_logo),
            story: composer.compose(&state.content, Format::Story, state.show_logo),
        }
    }

    pub fn get(&self, format: Format) -> &Composition {
        match format {
            Format::Feed => &self.feed,
            Format::Story => &self.story,
        }
    }
}

/// The parts of [`Config`] a session needs after construction.
#[derive(Clone, Debug)]
pub struct Settings {
    pub default_logo: String,
    pub branding: Branding,
    pub export_directory: PathBuf,
    pub export_prefix: String,
    pub max_upload_bytes: u64,
}
impl From<&Config> for Settings {
    fn from(config: &Config) -> Self {
        Self {
            default_logo: config.brand.logo.clone(),
            branding: Branding {
                short_code: config.brand.short_code.clone(),
                badge_label: config.brand.badge_label.clone(),
            },
            export_directory: config.export.directory.clone(),
            export_prefix: config.export.prefix.clone(),
            max_upload_bytes: config.uploads.max_bytes,
        }
    }
}

struct Inner {
    state: State,
    previews: Previews,
    /// Ticket of the acquisition currently allowed to apply its reply.
    pending: Option<u64>,
    next_ticket: u64,
}
impl Inner {
    fn apply(&mut self, composer: &Composer, action: Action) {
        let relayout = action.affects_layout();
        self.state = reduce(&self.state, action);
        if relayout {
            self.previews = Previews::compose(composer, &self.state);
        }
    }

    /// Frees the in-flight slot if `ticket` still holds it, clearing the processing flag.
    fn release(&mut self, composer: &Composer, ticket: u64) {
        if self.pending == Some(ticket) {
            self.pending = None;
            self.apply(composer, Action::ProcessFailed);
            tracing::debug!(ticket, "Acquisition dropped before completing; ticket released");
        }
    }
}

/// Holds an acquisition ticket for the duration of [`Session::process`].
///
/// If the call is dropped before its reply is applied (a timeout, `select!`,
/// an aborted task) the ticket is released on drop so the session does not
/// stay busy.
struct InFlight {
    inner: Arc<RwLock<Inner>>,
    composer: Arc<Composer>,
    ticket: u64,
    armed: bool,
}
impl InFlight {
    fn complete(mut self) {
        self.armed = false;
    }
}
impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let ticket = self.ticket;
        if let Ok(mut inner) = self.inner.try_write() {
            inner.release(&self.composer, ticket);
            return;
        }
        // Someone else holds the lock right now; finish the cleanup once they are done.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let inner = Arc::clone(&self.inner);
                let composer = Arc::clone(&self.composer);
                handle.spawn(async move {
                    inner.write().await.release(&composer, ticket);
                });
            },
            Err(_) => tracing::warn!(ticket, "No runtime to release an abandoned acquisition ticket"),
        }
    }
}

pub struct Session {
    inner: Arc<RwLock<Inner>>,
    composer: Arc<Composer>,
    settings: Settings,
    summarizer: SummarizerHandle,
    rasterizer: RasterizerHandle,
}

impl Session {
    pub fn new(settings: Settings, summarizer: SummarizerHandle, rasterizer: RasterizerHandle) -> Self {
        let composer = Arc::new(Composer::new(settings.branding.clone()));
        let state = State::new(settings.default_logo.clone());
        let previews = Previews::compose(&composer, &state);
        Self {
            inner: Arc::new(RwLock::new(Inner { state, previews, pending: None, next_ticket: 0 })),
            composer,
            settings,
            summarizer,
            rasterizer,
        }
    }

    pub async fn state(&self) -> State {
        self.inner.read().await.state.clone()
    }

    pub async fn previews(&self) -> Previews {
        self.inner.read().await.previews.clone()
    }

    /// The composition for the currently selected format.
    pub async fn preview(&self) -> Composition {
        let inner = self.inner.read().await;
        inner.previews.get(inner.state.active_format).clone()
    }

    async fn dispatch(&self, action: Action) {
        tracing::trace!(?action, "Applying session action");
        self.inner.write().await.apply(&self.composer, action);
    }

    /// Summarizes `input` and, on success, moves to the edit step with the result.
    ///
    /// Blank input is ignored. On failure the post is left exactly as it was,
    /// apart from the processing flag being cleared. Dropping the returned
    /// future before it resolves has the same effect as a failure.
    #[instrument(skip(self, input), fields(input_size = input.len()))]
    pub async fn process(&self, input: &str, is_url: bool) -> Result<Outcome> {
        if input.trim().is_empty() {
            tracing::debug!("Ignoring blank input");
            return Ok(Outcome::EmptyInput);
        }
        let ticket = {
            let mut inner = self.inner.write().await;
            if let Some(pending) = inner.pending {
                tracing::warn!(pending, "Acquisition already in flight");
                exn::bail!(ErrorKind::Busy);
            }
            let ticket = inner.next_ticket;
            inner.next_ticket += 1;
            inner.pending = Some(ticket);
            inner.apply(&self.composer, Action::ProcessStarted);
            ticket
        };
        let in_flight = InFlight {
            inner: Arc::clone(&self.inner),
            composer: Arc::clone(&self.composer),
            ticket,
            armed: true,
        };

        let result = acquire(self.summarizer.as_ref(), input, is_url).await;

        let mut inner = self.inner.write().await;
        in_flight.complete();
        if inner.pending != Some(ticket) {
            tracing::warn!(ticket, "Discarding reply for an abandoned post");
            return Ok(Outcome::Superseded);
        }
        inner.pending = None;
        match result {
            Ok(record) => {
                let fallback_logo = self.settings.default_logo.clone();
                inner.apply(&self.composer, Action::Acquired { record, fallback_logo });
                tracing::info!(ticket, "Post generated");
                Ok(Outcome::Applied)
            },
            Err(err) => {
                inner.apply(&self.composer, Action::ProcessFailed);
                Err(err).or_raise(|| ErrorKind::Acquisition)
            },
        }
    }

    /// Edits the current content by hand, abandoning any pending acquisition.
    pub async fn manual_entry(&self) {
        let mut inner = self.inner.write().await;
        inner.pending = None;
        inner.apply(&self.composer, Action::ManualEntry);
    }

    /// Returns to the input step, abandoning any pending acquisition.
    pub async fn new_post(&self) {
        let mut inner = self.inner.write().await;
        if let Some(ticket) = inner.pending.take() {
            tracing::debug!(ticket, "Abandoning pending acquisition");
        }
        inner.apply(&self.composer, Action::NewPost);
    }

    pub async fn set_title(&self, title: impl Into<String>) {
        self.dispatch(Action::SetTitle(title.into())).await;
    }

    pub async fn set_summary(&self, summary: impl Into<String>) {
        self.dispatch(Action::SetSummary(summary.into())).await;
    }

    pub async fn set_image_url(&self, image_url: impl Into<String>) {
        self.dispatch(Action::SetImage(image_url.into())).await;
    }

    pub async fn set_logo_url(&self, logo_url: Option<String>) {
        self.dispatch(Action::SetLogo(logo_url)).await;
    }

    pub async fn set_show_logo(&self, show_logo: bool) {
        self.dispatch(Action::SetShowLogo(show_logo)).await;
    }

    pub async fn select_format(&self, format: Format) {
        self.dispatch(Action::SelectFormat(format)).await;
    }

    fn load_upload(&self, path: &Path) -> Result<String> {
        let upload = ImageUpload::from_path(path, self.settings.max_upload_bytes).or_raise(|| ErrorKind::Upload)?;
        tracing::debug!(path = %path.display(), media = upload.media_type().mime(), size = upload.size(), "Image loaded");
        Ok(upload.to_data_uri())
    }

    /// Replaces the background photo with a local image file.
    #[instrument(skip(self, path))]
    pub async fn upload_image(&self, path: impl AsRef<Path>) -> Result<()> {
        let data_uri = self.load_upload(path.as_ref())?;
        self.dispatch(Action::SetImage(data_uri)).await;
        Ok(())
    }

    /// Replaces the logo with a local image file.
    #[instrument(skip(self, path))]
    pub async fn upload_logo(&self, path: impl AsRef<Path>) -> Result<()> {
        let data_uri = self.load_upload(path.as_ref())?;
        self.dispatch(Action::SetLogo(Some(data_uri))).await;
        Ok(())
    }

    /// Exports `format` into the configured export directory.
    pub async fn export(&self, format: Format) -> Result<PathBuf> {
        let directory = self.settings.export_directory.clone();
        self.export_to(format, directory).await
    }

    /// Rasterizes the current `format` preview and writes it into `directory`.
    ///
    /// Failures are logged and returned; the session state is never touched.
    #[instrument(skip(self, directory), fields(format = %format))]
    pub async fn export_to(&self, format: Format, directory: impl AsRef<Path>) -> Result<PathBuf> {
        let composition = self.inner.read().await.previews.get(format).clone();
        let path = directory.as_ref().join(file_name(&self.settings.export_prefix, format, UtcDateTime::now()));
        let rasterizer = Arc::clone(&self.rasterizer);
        let target = path.clone();
        let written = tokio::task::spawn_blocking(move || {
            let canvas = composition.canvas;
            let png = rasterizer.rasterize(&composition, canvas.width, canvas.height, PIXEL_RATIO)?;
            png.write_to(&target)
        })
        .await;
        match written {
            Ok(Ok(())) => {
                tracing::info!(path = %path.display(), "Post exported");
                Ok(path)
            },
            Ok(Err(err)) => {
                tracing::error!(error = ?err, "Export failed");
                Err(err).or_raise(|| ErrorKind::Export)
            },
            Err(err) => {
                tracing::error!(error = %err, "Export task did not complete");
                Err(err).or_raise(|| ErrorKind::Export)
            },
        }
    }
}

/// `{prefix}-{format}-{unix millis}.png`, with the prefix slugified.
pub fn file_name(prefix: &str, format: Format, at: UtcDateTime) -> String {
    let millis = at.unix_timestamp_nanos() / 1_000_000;
    format!("{}-{format}-{millis}.png", slugify!(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use instanews_acquire::error::ErrorKind as AcquireErrorKind;
    use instanews_acquire::{CompletionRequest, Summarizer};
    use instanews_content::{DEFAULT_IMAGE_URL, DEFAULT_LOGO_URL};
    use instanews_layout::HeadlineTier;
    use instanews_render::Png;
    use instanews_render::error::ErrorKind as RenderErrorKind;
    use rstest::rstest;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    const BREAKING: &str =
        r#"{"title": "Breaking", "subtitle": "", "summary": "Short summary.", "imageUrl": "placeholder.png"}"#;

    /// Replies with `reply`, optionally waiting for `release` first.
    struct Scripted {
        reply: String,
        gated: bool,
        started: Notify,
        release: Notify,
        calls: AtomicUsize,
    }
    impl Scripted {
        fn new(reply: &str, gated: bool) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                gated,
                started: Notify::new(),
                release: Notify::new(),
                calls: AtomicUsize::new(0),
            })
        }
    }
    #[async_trait]
    impl Summarizer for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }
        async fn complete(&self, _request: &CompletionRequest) -> instanews_acquire::error::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.started.notify_one();
            if self.gated {
                self.release.notified().await;
            }
            if self.reply.is_empty() {
                exn::bail!(AcquireErrorKind::Network);
            }
            Ok(self.reply.clone())
        }
    }

    /// Produces a blank PNG of the right size, or fails like a missing browser.
    struct FakeRasterizer {
        fail: bool,
    }
    impl Rasterize for FakeRasterizer {
        fn rasterize(
            &self,
            composition: &Composition,
            width: u32,
            height: u32,
            pixel_ratio: u32,
        ) -> instanews_render::error::Result<Png> {
            if self.fail {
                exn::bail!(RenderErrorKind::ChromeNotFound);
            }
            let size = composition.canvas.scaled(pixel_ratio);
            assert_eq!((width, height), (composition.canvas.width, composition.canvas.height));
            let buffer: image::RgbaImage = image::ImageBuffer::new(size.width, size.height);
            let mut bytes = Cursor::new(Vec::new());
            buffer.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
            Png::new(bytes.into_inner(), size)
        }
    }

    fn settings(directory: &Path) -> Settings {
        let mut config = Config::default();
        config.export.directory = directory.to_path_buf();
        Settings::from(&config)
    }

    fn session(summarizer: Arc<Scripted>, fail_export: bool) -> Session {
        Session::new(settings(Path::new(".")), summarizer, Arc::new(FakeRasterizer { fail: fail_export }))
    }

    #[tokio::test]
    async fn breaking_news_end_to_end() {
        let summarizer = Scripted::new(BREAKING, false);
        let session = session(summarizer.clone(), false);
        let outcome = session.process("https://example.com/news", true).await.unwrap();
        assert_eq!(outcome, Outcome::Applied);

        let state = session.state().await;
        assert_eq!(state.step, Step::Edit);
        assert!(!state.is_processing);
        assert_eq!(state.content.title, "Breaking");
        assert_eq!(state.content.summary, "Short summary.");
        assert_eq!(state.content.image_url, DEFAULT_IMAGE_URL);
        assert_eq!(state.content.logo(), Some(DEFAULT_LOGO_URL));

        let previews = session.previews().await;
        assert_eq!(previews.feed.text_band.headline.tier, HeadlineTier::Large);
        assert_eq!(previews.feed.text_band.headline.font_size, 72);
        assert_eq!((previews.feed.canvas.width, previews.feed.canvas.height), (1080, 1350));
        assert_eq!((previews.story.canvas.width, previews.story.canvas.height), (1080, 1920));
        assert_eq!(summarizer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalid_reply_rolls_back() {
        let session = session(Scripted::new("this is not json", false), false);
        session.set_title("Antes").await;
        let before = session.state().await;

        let err = session.process("texto", false).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Acquisition);
        let after = session.state().await;
        assert!(!after.is_processing);
        assert_eq!(after.content, before.content);
        assert_eq!(after.step, Step::Input);
    }

    #[tokio::test]
    async fn network_failure_rolls_back() {
        let session = session(Scripted::new("", false), false);
        let err = session.process("texto", false).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Acquisition);
        assert!(!session.state().await.is_processing);
    }

    #[rstest]
    #[case("")]
    #[case("   \n\t")]
    #[tokio::test]
    async fn blank_input_sends_nothing(#[case] input: &str) {
        let summarizer = Scripted::new(BREAKING, false);
        let session = session(summarizer.clone(), false);
        assert_eq!(session.process(input, false).await.unwrap(), Outcome::EmptyInput);
        assert_eq!(summarizer.calls.load(Ordering::SeqCst), 0);
        assert!(!session.state().await.is_processing);
    }

    #[tokio::test]
    async fn second_request_is_rejected_while_pending() {
        let summarizer = Scripted::new(BREAKING, true);
        let session = Arc::new(session(summarizer.clone(), false));
        let first = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.process("primeiro", false).await }
        });
        summarizer.started.notified().await;
        assert!(session.state().await.is_processing);

        let err = session.process("segundo", false).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Busy);

        summarizer.release.notify_one();
        assert_eq!(first.await.unwrap().unwrap(), Outcome::Applied);
        assert_eq!(summarizer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.state().await.content.title, "Breaking");
    }

    #[tokio::test]
    async fn abandoned_reply_is_discarded() {
        let summarizer = Scripted::new(BREAKING, true);
        let session = Arc::new(session(summarizer.clone(), false));
        let seeded = session.state().await.content;
        let first = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.process("primeiro", false).await }
        });
        summarizer.started.notified().await;
        session.new_post().await;
        assert!(!session.state().await.is_processing);

        summarizer.release.notify_one();
        assert_eq!(first.await.unwrap().unwrap(), Outcome::Superseded);
        let state = session.state().await;
        assert_eq!(state.step, Step::Input);
        assert_eq!(state.content, seeded);
    }

    #[tokio::test]
    async fn timed_out_request_frees_the_session() {
        let summarizer = Scripted::new(BREAKING, true);
        let session = session(summarizer.clone(), false);
        let before = session.state().await;

        let timed_out = tokio::time::timeout(Duration::from_millis(50), session.process("texto", false)).await;
        assert!(timed_out.is_err());
        let state = session.state().await;
        assert!(!state.is_processing);
        assert_eq!(state, before);

        // The permit is stored, so the next call is answered straight away.
        summarizer.release.notify_one();
        assert_eq!(session.process("texto", false).await.unwrap(), Outcome::Applied);
        assert_eq!(session.state().await.content.title, "Breaking");
        assert_eq!(summarizer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn aborted_request_frees_the_session() {
        let summarizer = Scripted::new(BREAKING, true);
        let session = Arc::new(session(summarizer.clone(), false));
        let first = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.process("primeiro", false).await }
        });
        summarizer.started.notified().await;
        assert!(session.state().await.is_processing);

        first.abort();
        assert!(first.await.unwrap_err().is_cancelled());
        assert!(!session.state().await.is_processing);

        summarizer.release.notify_one();
        assert_eq!(session.process("segundo", false).await.unwrap(), Outcome::Applied);
    }

    #[tokio::test]
    async fn manual_entry_goes_to_edit() {
        let session = session(Scripted::new(BREAKING, false), false);
        session.manual_entry().await;
        let state = session.state().await;
        assert_eq!(state.step, Step::Edit);
        assert_eq!(state.content.title, "Título Exemplo da Notícia Principal");
    }

    #[tokio::test]
    async fn edits_refresh_previews() {
        let session = session(Scripted::new(BREAKING, false), false);
        session.set_title("x".repeat(81)).await;
        let previews = session.previews().await;
        assert_eq!(previews.feed.text_band.headline.tier, HeadlineTier::Small);
        assert_eq!(previews.story.text_band.headline.tier, HeadlineTier::Small);

        session.set_show_logo(false).await;
        let previews = session.previews().await;
        assert!(previews.feed.image_band.logo.is_none());
        assert!(previews.story.image_band.logo.is_none());
    }

    #[tokio::test]
    async fn blank_title_keeps_previous_headline() {
        let session = session(Scripted::new(BREAKING, false), false);
        session.set_title("Ponte reaberta").await;
        session.set_title("").await;
        assert_eq!(session.state().await.content.title, "Ponte reaberta");
        assert_eq!(session.previews().await.story.text_band.headline.text, "Ponte reaberta");
    }

    #[tokio::test]
    async fn preview_follows_active_format() {
        let session = session(Scripted::new(BREAKING, false), false);
        assert_eq!(session.preview().await.format, Format::Feed);
        session.select_format(Format::Story).await;
        assert_eq!(session.preview().await.format, Format::Story);
    }

    #[tokio::test]
    async fn uploads_become_data_uris() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        let buffer: image::RgbaImage = image::ImageBuffer::new(2, 2);
        buffer.save_with_format(&path, image::ImageFormat::Png).unwrap();

        let session = session(Scripted::new(BREAKING, false), false);
        session.upload_logo(&path).await.unwrap();
        session.upload_image(&path).await.unwrap();
        let state = session.state().await;
        assert!(state.content.logo().unwrap().starts_with("data:image/png;base64,"));
        assert!(state.content.image_url.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn rejected_upload_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "not an image").unwrap();

        let session = session(Scripted::new(BREAKING, false), false);
        let before = session.state().await;
        let err = session.upload_image(&path).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Upload);
        assert_eq!(session.state().await, before);
    }

    #[rstest]
    #[case(Format::Feed)]
    #[case(Format::Story)]
    #[tokio::test]
    async fn export_writes_png(#[case] format: Format) {
        let dir = tempfile::tempdir().unwrap();
        let session = session(Scripted::new(BREAKING, false), false);
        let path = session.export_to(format, dir.path()).await.unwrap();

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(&format!("nd-noticia-{format}-")));
        assert!(name.ends_with(".png"));
        let (width, height) = image::image_dimensions(&path).unwrap();
        let expected = format.canvas().scaled(PIXEL_RATIO);
        assert_eq!((width, height), (expected.width, expected.height));
    }

    #[tokio::test]
    async fn failed_export_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(Scripted::new(BREAKING, false), true);
        session.set_title("Mantido").await;
        let before = session.state().await;

        let err = session.export_to(Format::Feed, dir.path()).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Export);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert_eq!(session.state().await, before);
    }

    #[rstest]
    #[case("nd-noticia", Format::Feed, "nd-noticia-feed-1700000000123.png")]
    #[case("nd-noticia", Format::Story, "nd-noticia-story-1700000000123.png")]
    #[case("Radio ND", Format::Feed, "radio-nd-feed-1700000000123.png")]
    fn test_file_name(#[case] prefix: &str, #[case] format: Format, #[case] expected: &str) {
        let at = UtcDateTime::from_unix_timestamp(1_700_000_000).unwrap() + time::Duration::milliseconds(123);
        assert_eq!(file_name(prefix, format, at), expected);
    }
}
