use super::*;
use crate::canvas::Canvases;
use crate::dom::Dom;
use crate::nav_guard::{locate_proceed_control, validate_required};
use events::{ListenerAction, ListenerStore};

mod assertions;
mod events;
mod user_actions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Complete,
}

/// Setup steps a survey page runs once its document has loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageSetup {
    ConfirmIdentity,
    AutoSave { form_index: u32 },
    NavGuard,
}

/// One loaded survey form page: its document, listeners, console and the
/// storage scope it shares with the other pages of the session.
#[derive(Debug)]
pub struct SurveyPage {
    pub(crate) url: String,
    pub(crate) dom: Dom,
    pub(crate) listeners: ListenerStore,
    pub(crate) console: Console,
    pub(crate) canvases: Canvases,
    pub(crate) resolver: IdentityResolver,
    pub(crate) store: SharedStore,
    pub(crate) config: SurveyConfig,
    ready_state: ReadyState,
    deferred: Vec<PageSetup>,
    pub(crate) navigation: Option<String>,
    pub(crate) scrolled_into_view: Option<NodeId>,
    pub(crate) guard_state: GuardState,
    pub(crate) last_outcome: Option<GuardOutcome>,
    pub(crate) listener_calls: Vec<String>,
}

impl SurveyPage {
    /// Parses `html` into a page that is still loading. Setup requested
    /// before [`SurveyPage::finish_loading`] is deferred until then.
    pub fn new(url: &str, html: &str, store: SharedStore, config: SurveyConfig) -> Result<Self> {
        let dom = html::parse_html(html)?;
        Ok(Self {
            url: url.to_string(),
            dom,
            listeners: ListenerStore::default(),
            console: Console::new(),
            canvases: Canvases::default(),
            resolver: IdentityResolver::default(),
            store,
            config,
            ready_state: ReadyState::Loading,
            deferred: Vec::new(),
            navigation: None,
            scrolled_into_view: None,
            guard_state: GuardState::Armed,
            last_outcome: None,
            listener_calls: Vec::new(),
        })
    }

    /// Loads form page `form_index` with the standard wiring: identity
    /// check, autosave with restore, and the next-page guard.
    pub fn load(
        url: &str,
        html: &str,
        form_index: u32,
        store: SharedStore,
        config: SurveyConfig,
    ) -> Result<Self> {
        let mut page = Self::new(url, html, store, config)?;
        page.wire_standard(form_index)?;
        page.finish_loading()?;
        Ok(page)
    }

    pub(crate) fn wire_standard(&mut self, form_index: u32) -> Result<()> {
        self.confirm_identity_configured()?;
        self.wire_auto_save(form_index)?;
        self.wire_nav_guard()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    /// Marks the document loaded and runs the deferred setup in request
    /// order.
    pub fn finish_loading(&mut self) -> Result<()> {
        if self.ready_state == ReadyState::Complete {
            return Ok(());
        }
        self.ready_state = ReadyState::Complete;
        for setup in std::mem::take(&mut self.deferred) {
            self.run_setup(setup)?;
        }
        Ok(())
    }

    pub fn confirm_identity_configured(&mut self) -> Result<()> {
        self.request_setup(PageSetup::ConfirmIdentity)
    }

    /// Restores this form's saved snapshot and saves a fresh one on every
    /// `input` and `change` event of the form container.
    pub fn wire_auto_save(&mut self, form_index: u32) -> Result<()> {
        self.request_setup(PageSetup::AutoSave { form_index })
    }

    /// Gates the page's proceed control behind required-field validation.
    pub fn wire_nav_guard(&mut self) -> Result<()> {
        self.request_setup(PageSetup::NavGuard)
    }

    fn request_setup(&mut self, setup: PageSetup) -> Result<()> {
        match self.ready_state {
            ReadyState::Loading => {
                self.deferred.push(setup);
                Ok(())
            }
            ReadyState::Complete => self.run_setup(setup),
        }
    }

    fn run_setup(&mut self, setup: PageSetup) -> Result<()> {
        match setup {
            PageSetup::ConfirmIdentity => {
                identity::confirm_identity_configured(&self.store, &mut self.console);
                Ok(())
            }
            PageSetup::AutoSave { form_index } => self.setup_auto_save(form_index),
            PageSetup::NavGuard => {
                self.setup_nav_guard();
                Ok(())
            }
        }
    }

    fn setup_auto_save(&mut self, form_index: u32) -> Result<()> {
        let Some(form) = self.dom.by_id(&self.config.form_id) else {
            self.console
                .error(format!("form container #{} was not found", self.config.form_id));
            return Ok(());
        };
        let key = self.storage_key(form_index);
        for event_type in ["input", "change"] {
            self.listeners.add(
                form,
                event_type,
                false,
                ListenerAction::AutoSave { key: key.clone() },
            );
        }

        if let Some(snapshot) = form_store::load(&self.store, &key, &mut self.console) {
            form_store::restore_snapshot(
                &mut self.dom,
                form,
                &snapshot,
                &mut self.canvases,
                &self.config,
                &mut self.console,
            )?;
            self.console
                .info(format!("form {form_index} restored from {key}"));
        }
        Ok(())
    }

    fn setup_nav_guard(&mut self) {
        let Some((control, container, intent)) = locate_proceed_control(&self.dom, &self.config)
        else {
            self.console.debug("no proceed control to guard");
            return;
        };
        self.listeners
            .add(control, "click", true, ListenerAction::NavGuard { container, intent });
        self.guard_state = GuardState::Armed;
    }

    /// Identity token of the current respondent. With no `user_id` and no
    /// stored temporary id, this generates one, writes it to `apos_pid`
    /// and logs a warning.
    pub fn resolve_identity(&mut self) -> String {
        let mut store = self.store.clone();
        self.resolver.resolve(&mut store, &mut self.console)
    }

    pub fn storage_key(&mut self, form_index: u32) -> String {
        let identity = self.resolve_identity();
        form_store::storage_key_with_prefix(&self.config.storage_key_prefix, &identity, form_index)
    }

    pub fn capture_snapshot(&mut self) -> Result<FormSnapshot> {
        let form = self.form_container()?;
        form_store::capture_snapshot(&self.dom, form, &self.canvases, &self.config, &mut self.console)
    }

    pub fn restore_snapshot(&mut self, snapshot: &FormSnapshot) -> Result<()> {
        let form = self.form_container()?;
        form_store::restore_snapshot(
            &mut self.dom,
            form,
            snapshot,
            &mut self.canvases,
            &self.config,
            &mut self.console,
        )
    }

    /// Runs the required-field checks on the form container without
    /// touching navigation state.
    pub fn validate_required(&mut self) -> Result<Vec<ErrorEntry>> {
        let form = self.form_container()?;
        validate_required(&mut self.dom, form, &self.config)
    }

    pub(crate) fn form_container(&self) -> Result<NodeId> {
        self.dom
            .by_id(&self.config.form_id)
            .ok_or_else(|| Error::SelectorNotFound(format!("#{}", css_escape(&self.config.form_id))))
    }

    pub(crate) fn save_snapshot(&mut self, key: &str) -> Result<()> {
        let snapshot = self.capture_snapshot()?;
        let mut store = self.store.clone();
        form_store::persist(&mut store, key, &snapshot)?;
        self.console.debug(format!("saved {key}"));
        Ok(())
    }

    pub(crate) fn run_guard(&mut self, container: NodeId, intent: &NavIntent) -> Result<GuardOutcome> {
        self.guard_state = GuardState::Armed;
        let entries = validate_required(&mut self.dom, container, &self.config)?;
        let outcome = match entries.first() {
            Some(first) => {
                self.scrolled_into_view = Some(first.node);
                self.guard_state = GuardState::Blocked;
                GuardOutcome::Blocked(entries)
            }
            None => {
                self.navigate(&intent.target);
                GuardOutcome::Navigated(intent.target.clone())
            }
        };
        self.last_outcome = Some(outcome.clone());
        Ok(outcome)
    }

    pub(crate) fn navigate(&mut self, target: &str) {
        self.console.info(format!("navigating to {target}"));
        self.navigation = Some(target.to_string());
    }

    /// Page the last navigation asked for, if any.
    pub fn navigated_to(&self) -> Option<&str> {
        self.navigation.as_deref()
    }

    pub fn take_navigation(&mut self) -> Option<String> {
        self.navigation.take()
    }

    pub fn guard_state(&self) -> GuardState {
        self.guard_state
    }

    pub fn last_guard_outcome(&self) -> Option<&GuardOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }

    pub fn set_console_limit(&mut self, max_entries: usize) {
        self.console.set_log_limit(max_entries);
    }

    pub fn set_random_seed(&mut self, seed: u64) {
        self.resolver.set_random_seed(seed);
    }

    pub fn set_clock(&mut self, clock: Box<dyn Clock>) {
        self.resolver.set_clock(clock);
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn config(&self) -> &SurveyConfig {
        &self.config
    }
}
