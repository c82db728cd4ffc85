use super::*;

impl Dom {
    pub(crate) fn value(&self, node_id: NodeId) -> Result<String> {
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::Dom("value target is not an element".into()))?;
        Ok(element.value.clone())
    }

    pub(crate) fn set_value(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        if self.has_tag(node_id, "select") {
            return self.select_value(node_id, value);
        }
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Dom("value target is not an element".into()))?;
        element.value = value.to_string();
        Ok(())
    }

    pub(crate) fn checked(&self, node_id: NodeId) -> Result<bool> {
        let element = self
            .element(node_id)
            .ok_or_else(|| Error::Dom("checked target is not an element".into()))?;
        Ok(element.checked)
    }

    pub(crate) fn set_checked(&mut self, node_id: NodeId, checked: bool) -> Result<()> {
        if checked && self.is_input_of_type(node_id, "radio") {
            self.uncheck_other_radios_in_group(node_id);
        }
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Dom("checked target is not an element".into()))?;
        element.checked = checked;
        Ok(())
    }

    pub(crate) fn required(&self, node_id: NodeId) -> bool {
        self.element(node_id).is_some_and(|element| element.required)
    }

    pub(crate) fn disabled(&self, node_id: NodeId) -> bool {
        self.element(node_id).is_some_and(|element| element.disabled)
    }

    /// Lowercased `type` of an `<input>`, defaulting to `text`.
    pub(crate) fn input_type(&self, node_id: NodeId) -> Option<String> {
        if !self.has_tag(node_id, "input") {
            return None;
        }
        Some(
            self.attr(node_id, "type")
                .map(|kind| kind.trim().to_ascii_lowercase())
                .filter(|kind| !kind.is_empty())
                .unwrap_or_else(|| "text".to_string()),
        )
    }

    pub(crate) fn is_input_of_type(&self, node_id: NodeId, kind: &str) -> bool {
        self.input_type(node_id).is_some_and(|actual| actual == kind)
    }

    pub(crate) fn uncheck_other_radios_in_group(&mut self, target: NodeId) {
        let target_name = self.attr(target, "name").unwrap_or_default();
        if target_name.is_empty() {
            return;
        }
        let target_form = self.find_ancestor_by_tag(target, "form");

        for node in self.all_element_nodes() {
            if node == target || !self.is_input_of_type(node, "radio") {
                continue;
            }
            if self.attr(node, "name").unwrap_or_default() != target_name {
                continue;
            }
            if self.find_ancestor_by_tag(node, "form") != target_form {
                continue;
            }
            if let Some(element) = self.element_mut(node) {
                element.checked = false;
            }
        }
    }

    /// Applies the parse-time defaults that attributes alone do not give:
    /// textarea text becomes its value, a select takes its selected
    /// option's value, and only the last checked radio of a group stays on.
    pub(crate) fn initialize_form_control_values(&mut self) -> Result<()> {
        for node in self.all_element_nodes() {
            if self.has_tag(node, "textarea") {
                let text = self.text_content(node);
                let text = text.strip_prefix('\n').unwrap_or(&text).to_string();
                if let Some(element) = self.element_mut(node) {
                    element.value = text;
                }
            } else if self.has_tag(node, "select") {
                let value = self
                    .selected_option(node)
                    .or_else(|| self.options(node).first().copied())
                    .map(|option| self.option_value(option))
                    .unwrap_or_default();
                if let Some(element) = self.element_mut(node) {
                    element.value = value;
                }
            }
        }

        for node in self.all_element_nodes() {
            if self.is_input_of_type(node, "radio") && self.checked(node)? {
                self.uncheck_other_radios_in_group(node);
            }
        }
        Ok(())
    }

    pub(crate) fn options(&self, select: NodeId) -> Vec<NodeId> {
        self.descendants_by_tag(select, "option")
    }

    fn selected_option(&self, select: NodeId) -> Option<NodeId> {
        self.options(select)
            .into_iter()
            .find(|option| self.has_attr(*option, "selected"))
    }

    pub(crate) fn option_value(&self, option: NodeId) -> String {
        self.attr(option, "value")
            .unwrap_or_else(|| self.text_content(option).trim().to_string())
    }

    pub(crate) fn is_multiple_select(&self, node_id: NodeId) -> bool {
        self.has_tag(node_id, "select") && self.has_attr(node_id, "multiple")
    }

    /// Values of every selected option, in document order.
    pub(crate) fn selected_option_values(&self, select: NodeId) -> Vec<String> {
        self.options(select)
            .into_iter()
            .filter(|option| self.has_attr(*option, "selected"))
            .map(|option| self.option_value(option))
            .collect()
    }

    /// Selects exactly the options whose value satisfies `keep`. The
    /// select's value becomes the first selected option's value.
    pub(crate) fn select_options_where(
        &mut self,
        select: NodeId,
        keep: impl Fn(&str) -> bool,
    ) -> Result<()> {
        let mut first = None;
        for option in self.options(select) {
            let value = self.option_value(option);
            if keep(&value) {
                self.set_attr(option, "selected", "")?;
                first.get_or_insert(value);
            } else {
                self.remove_attr(option, "selected")?;
            }
        }
        let element = self
            .element_mut(select)
            .ok_or_else(|| Error::Dom("value target is not an element".into()))?;
        element.value = first.unwrap_or_default();
        Ok(())
    }

    fn select_value(&mut self, select: NodeId, value: &str) -> Result<()> {
        let mut matched = false;
        for option in self.options(select) {
            if !matched && self.option_value(option) == value {
                self.set_attr(option, "selected", "")?;
                matched = true;
            } else {
                self.remove_attr(option, "selected")?;
            }
        }
        let element = self
            .element_mut(select)
            .ok_or_else(|| Error::Dom("value target is not an element".into()))?;
        element.value = if matched {
            value.to_string()
        } else {
            String::new()
        };
        Ok(())
    }
}
