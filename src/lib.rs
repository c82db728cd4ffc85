//! Autosave, restore and required-field navigation guard for multi-page
//! browser surveys, driven against an in-memory document.
//!
//! A [`SurveyPage`] holds one parsed form page. Loading it wires the
//! components the way the survey pages do at `DOMContentLoaded`:
//!
//! - the respondent identity is resolved from storage,
//! - the form's previous snapshot is restored and every `input` or
//!   `change` event persists a fresh one,
//! - the "next" control is guarded by required-field validation.
//!
//! ```
//! use survey_autosave::{MemoryStore, SharedStore, SurveyConfig, SurveyPage};
//!
//! let store = SharedStore::new(MemoryStore::new());
//! let html = r#"
//!     <form id='surveyForm'>
//!       <input id='name' name='name' required>
//!       <button id='next' type='button' onclick="location.href='form2.html'">次へ</button>
//!     </form>
//! "#;
//! let mut page = SurveyPage::load("form1.html", html, 1, store.clone(), SurveyConfig::default())?;
//! page.click("#next")?;
//! assert_eq!(page.navigated_to(), None);
//! page.type_text("#name", "Aya")?;
//! page.click("#next")?;
//! assert_eq!(page.navigated_to(), Some("form2.html"));
//! # Ok::<(), survey_autosave::Error>(())
//! ```

use std::error::Error as StdError;
use std::fmt;

mod canvas;
mod config;
mod console;
mod dom;
mod form_controls;
mod form_store;
mod html;
mod identity;
mod nav_guard;
mod page;
mod pattern;
mod selector;
mod session;
mod snapshot;
mod storage;

#[cfg(test)]
mod tests;

pub use config::{LabelMarkers, SurveyConfig};
pub use console::{Console, ConsoleEntry, LogLevel};
pub use dom::NodeId;
pub use form_controls::ControlKind;
pub use form_store::storage_key;
pub use identity::{
    APOS_PID_KEY, Clock, IdentityResolver, ManualClock, SESSION_KEY, SystemClock, USER_ID_KEY,
    confirm_identity_configured, resolve_identity,
};
pub use nav_guard::{ErrorEntry, GuardOutcome, GuardState, NavCandidate, NavIntent, select_proceed_control};
pub use page::{ReadyState, SurveyPage};
pub use selector::css_escape;
pub use session::SurveySession;
pub use snapshot::{FieldValue, FormSnapshot};
pub use storage::{KeyValueStore, MemoryStore, SharedStore};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    Dom(String),
    UnsupportedSelector(String),
    SelectorNotFound(String),
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    CanvasExport(String),
    ImageDecode(String),
    Snapshot(String),
    Navigation(String),
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::Dom(msg) => write!(f, "dom error: {msg}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::TypeMismatch {
                selector,
                expected,
                actual,
            } => write!(
                f,
                "type mismatch for {selector}: expected {expected}, actual {actual}"
            ),
            Self::CanvasExport(msg) => write!(f, "canvas export error: {msg}"),
            Self::ImageDecode(msg) => write!(f, "image decode error: {msg}"),
            Self::Snapshot(msg) => write!(f, "snapshot error: {msg}"),
            Self::Navigation(msg) => write!(f, "navigation error: {msg}"),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
        }
    }
}

impl StdError for Error {}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Snapshot(value.to_string())
    }
}
