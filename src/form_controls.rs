use super::*;
use crate::dom::Dom;

/// Capability class of a form element, chosen from its tag and `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    /// Text-like `<input>` (including `hidden`) and `<textarea>`.
    TextField,
    /// `<input type=radio>`.
    SingleChoice,
    /// `<input type=checkbox>`.
    MultiChoice,
    /// Single `<select>`.
    Selection,
    /// `<select multiple>`.
    MultiSelection,
    /// `<canvas>`.
    DrawableSurface,
    /// Buttons, file/image inputs and everything that carries no value.
    Inert,
}

impl ControlKind {
    pub(crate) fn of(dom: &Dom, node: NodeId) -> Self {
        match dom.tag_name(node) {
            Some(tag) if tag.eq_ignore_ascii_case("textarea") => Self::TextField,
            Some(_) if dom.is_multiple_select(node) => Self::MultiSelection,
            Some(tag) if tag.eq_ignore_ascii_case("select") => Self::Selection,
            Some(tag) if tag.eq_ignore_ascii_case("canvas") => Self::DrawableSurface,
            Some(tag) if tag.eq_ignore_ascii_case("input") => {
                match dom.input_type(node).as_deref().unwrap_or("text") {
                    "radio" => Self::SingleChoice,
                    "checkbox" => Self::MultiChoice,
                    "button" | "submit" | "reset" | "image" | "file" => Self::Inert,
                    _ => Self::TextField,
                }
            }
            _ => Self::Inert,
        }
    }

    pub fn is_selectable(self) -> bool {
        matches!(self, Self::SingleChoice | Self::MultiChoice)
    }

    /// Controls whose value ends up in a snapshot under their `name`.
    pub fn is_input_bearing(self) -> bool {
        matches!(
            self,
            Self::TextField
                | Self::SingleChoice
                | Self::MultiChoice
                | Self::Selection
                | Self::MultiSelection
        )
    }

    /// Adds this control's contribution to `snapshot`. Earlier entries
    /// under the same name are kept, except that multi-choice values and
    /// selected options of a multiple select accumulate.
    pub(crate) fn capture(
        self,
        dom: &Dom,
        node: NodeId,
        name: &str,
        snapshot: &mut FormSnapshot,
    ) -> Result<()> {
        match self {
            Self::MultiChoice => {
                if dom.checked(node)? {
                    snapshot.push_multiple(name, &control_value(dom, node)?);
                }
            }
            Self::MultiSelection => {
                for value in dom.selected_option_values(node) {
                    snapshot.push_multiple(name, &value);
                }
            }
            Self::SingleChoice => {
                if dom.checked(node)? && !snapshot.contains_key(name) {
                    snapshot.insert(name, control_value(dom, node)?.as_str());
                }
            }
            Self::TextField | Self::Selection => {
                let value = dom.value(node)?;
                if !value.is_empty() && !snapshot.contains_key(name) {
                    snapshot.insert(name, value.as_str());
                }
            }
            Self::DrawableSurface | Self::Inert => {}
        }
        Ok(())
    }

    pub(crate) fn restore_checked(self, dom: &mut Dom, node: NodeId, stored: &FieldValue) -> Result<()> {
        let value = control_value(dom, node)?;
        dom.set_checked(node, stored.contains(&value))
    }

    pub(crate) fn restore_value(self, dom: &mut Dom, node: NodeId, stored: &FieldValue) -> Result<()> {
        match self {
            Self::TextField | Self::Selection => dom.set_value(node, &stored.joined()),
            Self::MultiSelection => dom.select_options_where(node, |value| stored.contains(value)),
            _ => Ok(()),
        }
    }

    /// Presence check used by the navigation guard. `form` scopes the
    /// same-name lookup of choice groups.
    pub(crate) fn satisfies_required(self, dom: &Dom, form: NodeId, node: NodeId) -> Result<bool> {
        match self {
            Self::SingleChoice | Self::MultiChoice => {
                let Some(name) = control_name(dom, node) else {
                    return dom.checked(node);
                };
                for member in choice_group(dom, form, &name) {
                    if dom.checked(member)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::TextField if dom.is_input_of_type(node, "hidden") => Ok(true),
            Self::TextField => Ok(!dom.value(node)?.trim().is_empty()),
            Self::Selection | Self::MultiSelection | Self::DrawableSurface | Self::Inert => Ok(true),
        }
    }
}

/// Checkbox/radio value; the `on` default applies when no `value` is set.
fn control_value(dom: &Dom, node: NodeId) -> Result<String> {
    if dom.element(node).is_none() {
        return Err(Error::Dom("form control is not an element".into()));
    }
    Ok(dom.attr(node, "value").unwrap_or_else(|| "on".to_string()))
}

pub(crate) fn control_name(dom: &Dom, node: NodeId) -> Option<String> {
    dom.attr(node, "name").filter(|name| !name.is_empty())
}

/// Named input-bearing descendants of `form`, in document order.
pub(crate) fn named_controls(dom: &Dom, form: NodeId) -> Vec<(NodeId, String)> {
    dom.descendant_elements(form)
        .into_iter()
        .filter(|node| ControlKind::of(dom, *node).is_input_bearing())
        .filter_map(|node| control_name(dom, node).map(|name| (node, name)))
        .collect()
}

pub(crate) fn controls_named(dom: &Dom, form: NodeId, name: &str) -> Vec<NodeId> {
    named_controls(dom, form)
        .into_iter()
        .filter(|(_, control_name)| control_name == name)
        .map(|(node, _)| node)
        .collect()
}

fn choice_group(dom: &Dom, form: NodeId, name: &str) -> Vec<NodeId> {
    controls_named(dom, form, name)
        .into_iter()
        .filter(|node| ControlKind::of(dom, *node).is_selectable())
        .collect()
}
