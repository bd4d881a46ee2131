//! Wizard state and its transitions.
//!
//! [`reduce`] is the only way a [`State`] changes. It is pure: the same state
//! and action always give the same next state, which keeps the session's
//! locking trivial and every transition testable on its own.

use instanews_content::ContentRecord;
use instanews_layout::Format;
use serde::Serialize;

/// Which half of the two-step wizard is showing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    /// Waiting for a link or text.
    #[default]
    Input,
    /// Reviewing and editing the post.
    Edit,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub step: Step,
    pub content: ContentRecord,
    pub show_logo: bool,
    pub is_processing: bool,
    /// Format shown in the visible preview.
    pub active_format: Format,
}
impl State {
    /// A fresh session: input step, seeded content, logo shown.
    pub fn new(default_logo: impl Into<String>) -> Self {
        Self {
            step: Step::Input,
            content: ContentRecord::seed(default_logo),
            show_logo: true,
            is_processing: false,
            active_format: Format::Feed,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// An acquisition request went out.
    ProcessStarted,
    /// The service replied with a usable record. The current logo is kept,
    /// falling back to `fallback_logo` when there is none.
    Acquired { record: ContentRecord, fallback_logo: String },
    /// The service call failed; content stays as it was.
    ProcessFailed,
    /// Skip acquisition and edit the current content by hand.
    ManualEntry,
    /// Back to the input step. Content is kept for the next post.
    NewPost,
    /// Blank titles are ignored.
    SetTitle(String),
    /// Blank summaries are ignored.
    SetSummary(String),
    SetImage(String),
    SetLogo(Option<String>),
    SetShowLogo(bool),
    SelectFormat(Format),
}

impl Action {
    /// Whether the action can change what a card looks like.
    pub fn affects_layout(&self) -> bool {
        !matches!(
            self,
            Self::ProcessStarted | Self::ProcessFailed | Self::ManualEntry | Self::NewPost | Self::SelectFormat(_)
        )
    }
}

pub fn reduce(state: &State, action: Action) -> State {
    let mut next = state.clone();
    match action {
        Action::ProcessStarted => next.is_processing = true,
        Action::Acquired { record, fallback_logo } => {
            let logo = state.content.logo().map_or(fallback_logo, str::to_string);
            next.content = ContentRecord { logo_url: Some(logo), ..record };
            next.step = Step::Edit;
            next.is_processing = false;
        },
        Action::ProcessFailed => next.is_processing = false,
        // Title and summary are never blank; clearing one keeps the previous text.
        Action::SetTitle(text) | Action::SetSummary(text) if text.trim().is_empty() => {},
        Action::ManualEntry => {
            next.step = Step::Edit;
            next.is_processing = false;
        },
        Action::NewPost => {
            next.step = Step::Input;
            next.is_processing = false;
        },
        Action::SetTitle(title) => next.content = state.content.with_title(title),
        Action::SetSummary(summary) => next.content = state.content.with_summary(summary),
        Action::SetImage(image_url) => next.content = state.content.with_image(image_url),
        Action::SetLogo(logo_url) => next.content = state.content.with_logo(logo_url),
        Action::SetShowLogo(show_logo) => next.show_logo = show_logo,
        Action::SelectFormat(format) => next.active_format = format,
    }
    next
}
