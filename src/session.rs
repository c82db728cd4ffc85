use super::*;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct RegisteredPage {
    html: String,
    form_index: u32,
}

/// A respondent's walk through the survey: form pages registered by URL,
/// one storage scope shared by all of them, and the currently open page.
#[derive(Debug)]
pub struct SurveySession {
    store: SharedStore,
    config: SurveyConfig,
    pages: HashMap<String, RegisteredPage>,
    current: Option<SurveyPage>,
    history: Vec<String>,
    random_seed: Option<u64>,
}

impl SurveySession {
    pub fn new(store: SharedStore, config: SurveyConfig) -> Self {
        Self {
            store,
            config,
            pages: HashMap::new(),
            current: None,
            history: Vec::new(),
            random_seed: None,
        }
    }

    pub fn register_page(&mut self, url: &str, html: &str, form_index: u32) {
        self.pages.insert(
            url.to_string(),
            RegisteredPage {
                html: html.to_string(),
                form_index,
            },
        );
    }

    /// Seed applied to the identity generator of every page opened after
    /// this call.
    pub fn set_random_seed(&mut self, seed: u64) {
        self.random_seed = Some(seed);
    }

    /// Loads the registered page at `url`, replacing the open one.
    pub fn open(&mut self, url: &str) -> Result<&mut SurveyPage> {
        let registered = self
            .pages
            .get(url)
            .cloned()
            .ok_or_else(|| Error::Navigation(format!("unknown page: {url}")))?;
        let mut page = SurveyPage::new(url, &registered.html, self.store.clone(), self.config.clone())?;
        if let Some(seed) = self.random_seed {
            page.set_random_seed(seed);
        }
        page.wire_standard(registered.form_index)?;
        page.finish_loading()?;
        self.history.push(url.to_string());
        Ok(self.current.insert(page))
    }

    /// Opens the page the current page navigated to. Returns `Ok(false)`
    /// when there was no navigation.
    pub fn follow_navigation(&mut self) -> Result<bool> {
        let Some(target) = self.current.as_mut().and_then(SurveyPage::take_navigation) else {
            return Ok(false);
        };
        self.open(&target)?;
        Ok(true)
    }

    pub fn page(&self) -> Result<&SurveyPage> {
        self.current
            .as_ref()
            .ok_or_else(|| Error::Navigation("session has no open page".into()))
    }

    pub fn page_mut(&mut self) -> Result<&mut SurveyPage> {
        self.current
            .as_mut()
            .ok_or_else(|| Error::Navigation("session has no open page".into()))
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current.as_ref().map(SurveyPage::url)
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_pages_are_navigation_errors() {
        let mut session = SurveySession::new(SharedStore::default(), SurveyConfig::default());
        assert!(matches!(session.open("form9.html"), Err(Error::Navigation(_))));
        assert!(session.page().is_err());
        assert_eq!(session.follow_navigation(), Ok(false));
    }

    #[test]
    fn reopening_a_page_restores_from_the_shared_store() -> Result<()> {
        let mut session = SurveySession::new(SharedStore::default(), SurveyConfig::default());
        session.set_random_seed(7);
        session.register_page(
            "form1.html",
            "<form id=surveyForm><input id=q name=q></form>",
            1,
        );

        session.open("form1.html")?.type_text("#q", "kept")?;
        session.open("form1.html")?.assert_value("#q", "kept")?;
        assert_eq!(session.history(), &["form1.html", "form1.html"]);
        Ok(())
    }
}
