//! Required-field validation gating the "next page" control.

use super::*;
use crate::dom::Dom;
use crate::form_controls::{control_name, controls_named};
use crate::pattern::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

const INLINE_NAVIGATION_PATTERN: &str =
    r#"location\s*\.\s*href\s*=\s*(['"])\s*(form\d+\.html)\s*\1"#;
const LANDMARK_TAGS: &[&str] = &["fieldset", "section", "h1", "h2", "h3", "h4", "h5", "h6"];

/// Target page declared by a navigation control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavIntent {
    pub target: String,
}

impl NavIntent {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// Reads `location.href = 'formN.html'` out of inline handler text.
    pub fn from_inline_handler(source: &str) -> Option<Self> {
        let pattern = Regex::new(INLINE_NAVIGATION_PATTERN).ok()?;
        let caps = pattern.captures(source).ok()??;
        caps.get(2).map(Self::new)
    }

    /// The structured attribute wins over the inline handler.
    pub(crate) fn of_control(dom: &Dom, node: NodeId, config: &SurveyConfig) -> Option<Self> {
        if let Some(target) = dom
            .attr(node, &config.next_page_attr)
            .map(|target| target.trim().to_string())
            .filter(|target| !target.is_empty())
        {
            return Some(Self::new(target));
        }
        dom.attr(node, "onclick")
            .and_then(|source| Self::from_inline_handler(&source))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavCandidate {
    pub label: String,
    pub intent: NavIntent,
}

impl NavCandidate {
    pub fn new(label: impl Into<String>, intent: NavIntent) -> Self {
        Self {
            label: label.into(),
            intent,
        }
    }
}

/// Picks the proceed control: the first candidate whose label reads
/// forward and not backward, else the last candidate.
pub fn select_proceed_control(candidates: &[NavCandidate], markers: &LabelMarkers) -> Option<usize> {
    let forward = normalize_all(&markers.forward);
    let back = normalize_all(&markers.back);
    candidates
        .iter()
        .position(|candidate| {
            let label = normalize_label(&candidate.label);
            forward.iter().any(|marker| label.contains(marker.as_str()))
                && !back.iter().any(|marker| label.contains(marker.as_str()))
        })
        .or_else(|| candidates.len().checked_sub(1))
}

fn normalize_label(label: &str) -> String {
    label.nfkc().collect::<String>().trim().to_lowercase()
}

fn normalize_all(markers: &[String]) -> Vec<String> {
    markers
        .iter()
        .map(|marker| normalize_label(marker))
        .filter(|marker| !marker.is_empty())
        .collect()
}

/// Buttons, button-like inputs and links that declare a next page, in
/// document order.
pub(crate) fn discover_candidates(dom: &Dom, config: &SurveyConfig) -> Vec<(NodeId, NavCandidate)> {
    dom.all_element_nodes()
        .into_iter()
        .filter(|node| {
            dom.has_tag(*node, "button")
                || dom.has_tag(*node, "a")
                || dom.is_input_of_type(*node, "button")
                || dom.is_input_of_type(*node, "submit")
        })
        .filter_map(|node| {
            let intent = NavIntent::of_control(dom, node, config)?;
            Some((node, NavCandidate::new(dom.label_text(node), intent)))
        })
        .collect()
}

/// Proceed control and the container its validation covers.
pub(crate) fn locate_proceed_control(
    dom: &Dom,
    config: &SurveyConfig,
) -> Option<(NodeId, NodeId, NavIntent)> {
    let candidates = discover_candidates(dom, config);
    let labels: Vec<NavCandidate> = candidates.iter().map(|(_, c)| c.clone()).collect();
    let index = select_proceed_control(&labels, &config.label_markers)?;
    let (control, candidate) = candidates.into_iter().nth(index)?;
    let container = dom
        .find_ancestor_by_tag(control, "form")
        .or_else(|| dom.by_id(&config.form_id))?;
    Some((control, container, candidate.intent))
}

/// One required field failing its presence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEntry {
    pub node: NodeId,
    pub name: Option<String>,
    pub kind: ControlKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardState {
    #[default]
    Armed,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Navigated(String),
    Blocked(Vec<ErrorEntry>),
}

/// Clears every marker from a previous attempt, re-checks each required
/// element of `form` and renders markers for the failures.
pub(crate) fn validate_required(
    dom: &mut Dom,
    form: NodeId,
    config: &SurveyConfig,
) -> Result<Vec<ErrorEntry>> {
    clear_markers(dom, form, config)?;

    let mut entries = Vec::new();
    let mut seen_groups = HashSet::new();
    for node in dom.descendant_elements(form) {
        if !dom.required(node) {
            continue;
        }
        let kind = ControlKind::of(dom, node);
        let name = control_name(dom, node);
        if kind.is_selectable() {
            if let Some(name) = &name {
                if !seen_groups.insert(name.clone()) {
                    continue;
                }
            }
        }
        if !kind.satisfies_required(dom, form, node)? {
            entries.push(ErrorEntry { node, name, kind });
        }
    }

    for entry in &entries {
        mark_invalid(dom, form, entry, config)?;
    }
    if !entries.is_empty() {
        insert_summary(dom, form, config)?;
    }
    Ok(entries)
}

fn clear_markers(dom: &mut Dom, form: NodeId, config: &SurveyConfig) -> Result<()> {
    let stale: Vec<NodeId> = dom
        .all_element_nodes()
        .into_iter()
        .filter(|node| {
            dom.class_contains(*node, &config.message_class)
                || dom.class_contains(*node, &config.summary_class)
        })
        .collect();
    for node in stale {
        dom.remove_node(node)?;
    }
    let mut scope = vec![form];
    scope.extend(dom.descendant_elements(form));
    for node in scope {
        dom.class_remove(node, &config.error_class)?;
    }
    Ok(())
}

fn mark_invalid(dom: &mut Dom, form: NodeId, entry: &ErrorEntry, config: &SurveyConfig) -> Result<()> {
    let members = match (&entry.name, entry.kind.is_selectable()) {
        (Some(name), true) => controls_named(dom, form, name)
            .into_iter()
            .filter(|node| ControlKind::of(dom, *node).is_selectable())
            .collect(),
        _ => vec![entry.node],
    };
    for member in &members {
        dom.class_add(*member, &config.error_class)?;
    }

    let last = members.last().copied().unwrap_or(entry.node);
    let anchor = dom.find_ancestor_by_tag(last, "label").unwrap_or(last);
    let message = marker_element(dom, "span", &config.message_class, &config.field_message)?;
    dom.insert_after(anchor, message)
}

fn insert_summary(dom: &mut Dom, form: NodeId, config: &SurveyConfig) -> Result<()> {
    let summary = marker_element(dom, "div", &config.summary_class, &config.summary_message)?;
    dom.set_attr(summary, "role", "alert")?;
    let landmark = dom
        .descendant_elements(form)
        .into_iter()
        .find(|node| LANDMARK_TAGS.iter().any(|tag| dom.has_tag(*node, tag)));
    dom.insert_before_node(landmark.unwrap_or(form), summary)
}

fn marker_element(dom: &mut Dom, tag: &str, class_name: &str, text: &str) -> Result<NodeId> {
    let node = dom.create_detached_element(tag);
    dom.set_attr(node, "class", class_name)?;
    dom.set_text_content(node, text)?;
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(label: &str, target: &str) -> NavCandidate {
        NavCandidate::new(label, NavIntent::new(target))
    }

    #[test]
    fn inline_handler_intent_requires_matching_quotes() {
        assert_eq!(
            NavIntent::from_inline_handler("location . href = \"form12.html\""),
            Some(NavIntent::new("form12.html"))
        );
        assert_eq!(NavIntent::from_inline_handler("location.href='form3.html\""), None);
        assert_eq!(NavIntent::from_inline_handler("location.href='thanks.html'"), None);
    }

    #[test]
    fn forward_label_beats_position() {
        let markers = LabelMarkers::default();
        let candidates = [
            candidate("次へ →", "form3.html"),
            candidate("← 戻る", "form1.html"),
        ];
        assert_eq!(select_proceed_control(&candidates, &markers), Some(0));

        let mixed = [
            candidate("Back < Next", "form1.html"),
            candidate("ＮＥＸＴ", "form3.html"),
        ];
        assert_eq!(select_proceed_control(&mixed, &markers), Some(1));
    }

    #[test]
    fn unlabeled_candidates_fall_back_to_last() {
        let markers = LabelMarkers::default();
        let candidates = [candidate("A", "form1.html"), candidate("B", "form3.html")];
        assert_eq!(select_proceed_control(&candidates, &markers), Some(1));
        assert_eq!(select_proceed_control(&[], &markers), None);
    }

    #[test]
    fn structured_attribute_wins_over_inline_handler() -> Result<()> {
        let dom = html::parse_html(
            "<button id=b data-next-page='form9.html' onclick=\"location.href='form2.html'\">go</button>",
        )?;
        let node = dom.by_id("b").ok_or_else(|| Error::SelectorNotFound("#b".into()))?;
        assert_eq!(
            NavIntent::of_control(&dom, node, &SurveyConfig::default()),
            Some(NavIntent::new("form9.html"))
        );
        Ok(())
    }

    #[test]
    fn validation_marks_groups_once_and_resets() -> Result<()> {
        let mut dom = html::parse_html(
            "<form id=f><h2>Q</h2>\
               <input id=name name=name required>\
               <label><input id=g1 type=radio name=gender value=m required>M</label>\
               <label><input id=g2 type=radio name=gender value=f required>F</label>\
             </form>",
        )?;
        let form = dom.by_id("f").ok_or_else(|| Error::SelectorNotFound("#f".into()))?;
        let config = SurveyConfig::default();

        let entries = validate_required(&mut dom, form, &config)?;
        let names: Vec<_> = entries.iter().map(|e| e.name.as_deref()).collect();
        assert_eq!(names, vec![Some("name"), Some("gender")]);
        assert_eq!(dom.query_selector_all(".error-message")?.len(), 2);
        assert_eq!(dom.query_selector_all(".error-summary")?.len(), 1);
        assert_eq!(dom.query_selector_all(".error")?.len(), 3);

        let again = validate_required(&mut dom, form, &config)?;
        assert_eq!(again.len(), 2);
        assert_eq!(dom.query_selector_all(".error-message")?.len(), 2);
        assert_eq!(dom.query_selector_all(".error-summary")?.len(), 1);

        let g2 = dom.by_id("g2").ok_or_else(|| Error::SelectorNotFound("#g2".into()))?;
        dom.set_checked(g2, true)?;
        let name = dom.by_id("name").ok_or_else(|| Error::SelectorNotFound("#name".into()))?;
        dom.set_value(name, "Aya")?;
        assert!(validate_required(&mut dom, form, &config)?.is_empty());
        assert!(dom.query_selector_all(".error-message, .error-summary, .error")?.is_empty());
        Ok(())
    }
}
