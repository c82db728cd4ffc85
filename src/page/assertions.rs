use super::*;

const SNIPPET_CHARS: usize = 200;

impl SurveyPage {
    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        self.expect(selector, target, expected, actual)
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.value(target)?;
        self.expect(selector, target, expected, actual)
    }

    pub fn assert_checked(&self, selector: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.checked(target)?;
        self.expect(selector, target, &expected.to_string(), actual.to_string())
    }

    pub fn assert_has_class(&self, selector: &str, class_name: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.class_contains(target, class_name);
        self.expect(
            selector,
            target,
            &format!("has .{class_name}: {expected}"),
            format!("has .{class_name}: {actual}"),
        )
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn assert_count(&self, selector: &str, expected: usize) -> Result<()> {
        let actual = self.count(selector)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
                dom_snippet: truncate_chars(&self.dom.dump_node(self.dom.root), SNIPPET_CHARS),
            });
        }
        Ok(())
    }

    /// Checks that validation scrolled `selector` into view last.
    pub fn assert_scrolled_into_view(&self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.scrolled_into_view != Some(target) {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: "scrolled into view".into(),
                actual: self
                    .scrolled_into_view
                    .map(|node| self.node_snippet(node))
                    .unwrap_or_else(|| "nothing scrolled".into()),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn count(&self, selector: &str) -> Result<usize> {
        Ok(self.dom.query_selector_all(selector)?.len())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.dump_node(target))
    }

    pub(crate) fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn expect(&self, selector: &str, target: NodeId, expected: &str, actual: String) -> Result<()> {
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.dom.dump_node(node_id), SNIPPET_CHARS)
    }
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    let mut chars = value.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
