use super::*;

impl SurveyPage {
    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }
        match ControlKind::of(&self.dom, target) {
            ControlKind::TextField => {}
            _ => {
                return Err(Error::TypeMismatch {
                    selector: selector.to_string(),
                    expected: "text input or textarea".into(),
                    actual: self.describe(target),
                });
            }
        }
        self.dom.set_value(target, text)?;
        self.dispatch_event(target, "input")?;
        Ok(())
    }

    pub fn set_checked(&mut self, selector: &str, checked: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }
        if !ControlKind::of(&self.dom, target).is_selectable() {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input[type=checkbox|radio]".into(),
                actual: self.describe(target),
            });
        }
        if self.dom.checked(target)? != checked {
            self.dom.set_checked(target, checked)?;
            self.dispatch_event(target, "input")?;
            self.dispatch_event(target, "change")?;
        }
        Ok(())
    }

    pub fn set_select_value(&mut self, selector: &str, value: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }
        if ControlKind::of(&self.dom, target) != ControlKind::Selection {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "select".into(),
                actual: self.describe(target),
            });
        }
        if self.dom.value(target)? != value {
            self.dom.set_value(target, value)?;
            self.dispatch_event(target, "input")?;
            self.dispatch_event(target, "change")?;
        }
        Ok(())
    }

    /// Selects exactly `values` in a `<select multiple>`.
    pub fn set_selected_options(&mut self, selector: &str, values: &[&str]) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }
        if ControlKind::of(&self.dom, target) != ControlKind::MultiSelection {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "select[multiple]".into(),
                actual: self.describe(target),
            });
        }
        let before = self.dom.selected_option_values(target);
        self.dom
            .select_options_where(target, |value| values.contains(&value))?;
        if self.dom.selected_option_values(target) != before {
            self.dispatch_event(target, "input")?;
            self.dispatch_event(target, "change")?;
        }
        Ok(())
    }

    /// Clicks `selector`: dispatches `click`, then toggles a checkbox or
    /// selects a radio unless a listener prevented the default.
    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }
        let event = self.dispatch_event(target, "click")?;
        if event.default_prevented {
            return Ok(());
        }
        let next = match ControlKind::of(&self.dom, target) {
            ControlKind::MultiChoice => !self.dom.checked(target)?,
            ControlKind::SingleChoice if !self.dom.checked(target)? => true,
            _ => return Ok(()),
        };
        self.dom.set_checked(target, next)?;
        self.dispatch_event(target, "input")?;
        self.dispatch_event(target, "change")?;
        Ok(())
    }

    /// Dispatches a bare event with no default action.
    pub fn dispatch(&mut self, selector: &str, event_type: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch_event(target, event_type)?;
        Ok(())
    }

    /// Registers a listener that appends `label` to
    /// [`SurveyPage::listener_calls`] each time it fires.
    pub fn add_event_listener(
        &mut self,
        selector: &str,
        event_type: &str,
        capture: bool,
        label: &str,
    ) -> Result<()> {
        let target = self.select_one(selector)?;
        self.listeners.add(
            target,
            event_type,
            capture,
            ListenerAction::Record {
                label: label.to_string(),
            },
        );
        Ok(())
    }

    pub fn listener_calls(&self) -> &[String] {
        &self.listener_calls
    }

    /// Replaces the raster of a canvas, as a drawing stroke would. No
    /// event is dispatched.
    pub fn draw_on_canvas(&mut self, selector: &str, raster: &[u8]) -> Result<()> {
        let canvas = self.select_canvas(selector)?;
        self.canvases.draw(canvas, raster);
        Ok(())
    }

    /// Marks a canvas as holding cross-origin data so exporting it fails.
    pub fn taint_canvas(&mut self, selector: &str) -> Result<()> {
        let canvas = self.select_canvas(selector)?;
        self.canvases.set_tainted(canvas, true);
        Ok(())
    }

    pub fn canvas_raster(&self, selector: &str) -> Result<Vec<u8>> {
        let canvas = self.select_canvas(selector)?;
        Ok(self.canvases.raster(canvas).to_vec())
    }

    pub fn pending_canvas_draws(&self) -> usize {
        self.canvases.pending_len()
    }

    /// Runs queued canvas decodes.
    pub fn flush(&mut self) -> Result<()> {
        let drawn = self.canvases.run_pending(&mut self.console);
        if drawn > 0 {
            self.console.debug(format!("{drawn} canvas image(s) restored"));
        }
        Ok(())
    }

    fn select_canvas(&self, selector: &str) -> Result<NodeId> {
        let target = self.select_one(selector)?;
        if !self.dom.has_tag(target, "canvas") {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "canvas".into(),
                actual: self.describe(target),
            });
        }
        Ok(target)
    }

    fn describe(&self, node: NodeId) -> String {
        match self.dom.input_type(node) {
            Some(kind) => format!("input[type={kind}]"),
            None => self.dom.tag_name(node).unwrap_or("non-element").to_string(),
        }
    }
}
