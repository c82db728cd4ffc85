use super::*;
use crate::dom::{Dom, NodeId};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectorAttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SelectorPseudoClass {
    Checked,
    Required,
    Disabled,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SelectorStep {
    pub(crate) tag: Option<String>,
    pub(crate) universal: bool,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) attrs: Vec<SelectorAttrCondition>,
    pub(crate) pseudo_classes: Vec<SelectorPseudoClass>,
}

impl SelectorStep {
    fn id_only(&self) -> Option<&str> {
        if !self.universal
            && self.tag.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && self.pseudo_classes.is_empty()
        {
            self.id.as_deref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SelectorCombinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorPart {
    pub(crate) step: SelectorStep,
    // relation to the part on the left
    pub(crate) combinator: Option<SelectorCombinator>,
}

/// Escapes `ident` so it can be embedded in a selector as an identifier,
/// following the CSSOM `CSS.escape()` algorithm.
pub fn css_escape(ident: &str) -> String {
    let chars = ident.chars().collect::<Vec<_>>();
    let mut out = String::with_capacity(ident.len());
    for (index, &ch) in chars.iter().enumerate() {
        let code = ch as u32;
        if code == 0 {
            out.push('\u{FFFD}');
        } else if (0x01..=0x1F).contains(&code)
            || code == 0x7F
            || (index == 0 && ch.is_ascii_digit())
            || (index == 1 && ch.is_ascii_digit() && chars[0] == '-')
        {
            out.push_str(&format!("\\{code:x} "));
        } else if index == 0 && ch == '-' && chars.len() == 1 {
            out.push_str("\\-");
        } else if code >= 0x80 || ch == '-' || ch == '_' || ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else {
            out.push('\\');
            out.push(ch);
        }
    }
    out
}

pub(crate) fn parse_selector_groups(selector: &str) -> Result<Vec<Vec<SelectorPart>>> {
    let groups = split_top_level(selector, |ch| ch == ',', false)?;
    if groups.iter().any(|group| group.trim().is_empty()) {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    groups
        .iter()
        .map(|group| parse_selector_chain(group))
        .collect()
}

fn parse_selector_chain(selector: &str) -> Result<Vec<SelectorPart>> {
    let selector = selector.trim();
    if selector.is_empty() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }

    let mut steps = Vec::new();
    let mut pending_combinator = None;
    for token in tokenize_selector(selector)? {
        if token == ">" {
            if pending_combinator.is_some() || steps.is_empty() {
                return Err(Error::UnsupportedSelector(selector.into()));
            }
            pending_combinator = Some(SelectorCombinator::Child);
            continue;
        }

        let step = parse_selector_step(&token)?;
        let combinator = if steps.is_empty() {
            None
        } else {
            Some(
                pending_combinator
                    .take()
                    .unwrap_or(SelectorCombinator::Descendant),
            )
        };
        steps.push(SelectorPart { step, combinator });
    }

    if steps.is_empty() || pending_combinator.is_some() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    Ok(steps)
}

fn tokenize_selector(selector: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    for chunk in split_top_level(selector, |ch| ch.is_ascii_whitespace() || ch == '>', true)? {
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            tokens.push(chunk.to_string());
        }
    }
    Ok(tokens)
}

/// Splits at `is_separator` outside brackets, quotes and escapes. When
/// `keep_separator` is set, non-whitespace separators become tokens.
fn split_top_level(
    selector: &str,
    is_separator: impl Fn(char) -> bool,
    keep_separator: bool,
) -> Result<Vec<String>> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut bracket_depth = 0usize;
    let mut quote = None;
    let mut chars = selector.chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            current.push(ch);
            let mut hex_digits = 0;
            while hex_digits < 6 {
                match chars.as_str().chars().next() {
                    Some(next) if next.is_ascii_hexdigit() => {
                        current.push(next);
                        chars.next();
                        hex_digits += 1;
                    }
                    _ => break,
                }
            }
            if hex_digits == 0 {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            } else if chars.as_str().starts_with(' ') {
                // the single space terminating a hex escape belongs to it
                current.push(' ');
                chars.next();
            }
            continue;
        }
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            current.push(ch);
            continue;
        }
        match ch {
            '\'' | '"' if bracket_depth > 0 => {
                quote = Some(ch);
                current.push(ch);
            }
            '[' => {
                bracket_depth += 1;
                current.push(ch);
            }
            ']' => {
                if bracket_depth == 0 {
                    return Err(Error::UnsupportedSelector(selector.into()));
                }
                bracket_depth -= 1;
                current.push(ch);
            }
            ch if bracket_depth == 0 && is_separator(ch) => {
                parts.push(std::mem::take(&mut current));
                if keep_separator && !ch.is_ascii_whitespace() {
                    parts.push(ch.to_string());
                }
            }
            _ => current.push(ch),
        }
    }

    if bracket_depth != 0 || quote.is_some() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    parts.push(current);
    Ok(parts)
}

fn parse_selector_step(part: &str) -> Result<SelectorStep> {
    let unsupported = || Error::UnsupportedSelector(part.into());
    let mut step = SelectorStep::default();
    let mut i = 0usize;

    while i < part.len() {
        let rest = &part[i..];
        let Some(ch) = rest.chars().next() else {
            break;
        };
        match ch {
            '*' => {
                if step.universal {
                    return Err(unsupported());
                }
                step.universal = true;
                i += 1;
            }
            '#' => {
                let (id, next) = parse_selector_ident(part, i + 1).ok_or_else(unsupported)?;
                if step.id.replace(id).is_some() {
                    return Err(unsupported());
                }
                i = next;
            }
            '.' => {
                let (class_name, next) =
                    parse_selector_ident(part, i + 1).ok_or_else(unsupported)?;
                step.classes.push(class_name);
                i = next;
            }
            '[' => {
                let (attr, next) = parse_selector_attr_condition(part, i)?;
                step.attrs.push(attr);
                i = next;
            }
            ':' => {
                let (name, next) = parse_selector_ident(part, i + 1).ok_or_else(unsupported)?;
                let pseudo = match name.as_str() {
                    "checked" => SelectorPseudoClass::Checked,
                    "required" => SelectorPseudoClass::Required,
                    "disabled" => SelectorPseudoClass::Disabled,
                    _ => return Err(unsupported()),
                };
                step.pseudo_classes.push(pseudo);
                i = next;
            }
            _ => {
                if step.tag.is_some()
                    || step.id.is_some()
                    || !step.classes.is_empty()
                    || step.universal
                {
                    return Err(unsupported());
                }
                let (tag, next) = parse_selector_ident(part, i).ok_or_else(unsupported)?;
                step.tag = Some(tag.to_ascii_lowercase());
                i = next;
            }
        }
    }

    if step == SelectorStep::default() {
        return Err(unsupported());
    }
    Ok(step)
}

/// Reads an identifier starting at byte `start`, resolving CSS escapes.
fn parse_selector_ident(src: &str, start: usize) -> Option<(String, usize)> {
    let mut out = String::new();
    let mut i = start;
    while i < src.len() {
        let rest = &src[i..];
        let ch = rest.chars().next()?;
        if ch == '\\' {
            let (decoded, consumed) = parse_css_escape(&rest[1..])?;
            out.push(decoded);
            i += 1 + consumed;
            continue;
        }
        if !(ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || !ch.is_ascii()) {
            break;
        }
        out.push(ch);
        i += ch.len_utf8();
    }
    if out.is_empty() {
        None
    } else {
        Some((out, i))
    }
}

fn parse_css_escape(rest: &str) -> Option<(char, usize)> {
    let hex_len = rest
        .chars()
        .take(6)
        .take_while(|ch| ch.is_ascii_hexdigit())
        .count();
    if hex_len == 0 {
        let ch = rest.chars().next()?;
        return Some((ch, ch.len_utf8()));
    }
    let code = u32::from_str_radix(&rest[..hex_len], 16).ok()?;
    let mut consumed = hex_len;
    if rest[hex_len..].starts_with(' ') {
        consumed += 1;
    }
    let ch = char::from_u32(code)
        .filter(|ch| *ch != '\0')
        .unwrap_or('\u{FFFD}');
    Some((ch, consumed))
}

fn parse_selector_attr_condition(
    src: &str,
    open_bracket: usize,
) -> Result<(SelectorAttrCondition, usize)> {
    let unsupported = || Error::UnsupportedSelector(src.into());
    let close = find_attr_close(src, open_bracket + 1).ok_or_else(unsupported)?;
    let body = src[open_bracket + 1..close].trim();

    let Some(eq) = body.find('=') else {
        if body.is_empty() || !body.chars().all(is_selector_attr_name_char) {
            return Err(unsupported());
        }
        return Ok((
            SelectorAttrCondition::Exists {
                key: body.to_ascii_lowercase(),
            },
            close + 1,
        ));
    };

    let key = body[..eq].trim();
    if key.is_empty() || !key.chars().all(is_selector_attr_name_char) {
        return Err(unsupported());
    }
    let raw_value = body[eq + 1..].trim();
    let value = match raw_value.chars().next() {
        Some(q @ ('"' | '\'')) => {
            let inner = raw_value
                .strip_prefix(q)
                .and_then(|v| v.strip_suffix(q))
                .ok_or_else(unsupported)?;
            unescape_css_string(inner)
        }
        _ => unescape_css_string(raw_value),
    };

    Ok((
        SelectorAttrCondition::Eq {
            key: key.to_ascii_lowercase(),
            value,
        },
        close + 1,
    ))
}

fn find_attr_close(src: &str, from: usize) -> Option<usize> {
    let mut quote = None;
    let mut escaped = false;
    for (offset, ch) in src[from..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, ch) {
            (_, '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, ']') => return Some(from + offset),
            _ => {}
        }
    }
    None
}

fn unescape_css_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut i = 0usize;
    while i < raw.len() {
        let rest = &raw[i..];
        let Some(ch) = rest.chars().next() else {
            break;
        };
        if ch == '\\' {
            if let Some((decoded, consumed)) = parse_css_escape(&rest[1..]) {
                out.push(decoded);
                i += 1 + consumed;
                continue;
            }
        }
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

fn is_selector_attr_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || ch == ':'
}

impl Dom {
    pub(crate) fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let groups = parse_selector_groups(selector)?;
        if groups.len() == 1 && groups[0].len() == 1 {
            if let Some(id) = groups[0][0].step.id_only() {
                return Ok(self.by_id(id).into_iter().collect());
            }
        }
        Ok(self.filter_matching(self.all_element_nodes(), &groups))
    }

    pub(crate) fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    fn filter_matching(&self, candidates: Vec<NodeId>, groups: &[Vec<SelectorPart>]) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        candidates
            .into_iter()
            .filter(|candidate| {
                groups
                    .iter()
                    .any(|steps| self.matches_selector_chain(*candidate, steps))
                    && seen.insert(*candidate)
            })
            .collect()
    }

    fn matches_selector_chain(&self, node_id: NodeId, parts: &[SelectorPart]) -> bool {
        let Some((last, rest)) = parts.split_last() else {
            return true;
        };
        if !self.matches_step(node_id, &last.step) {
            return false;
        }
        if rest.is_empty() {
            return true;
        }
        match last.combinator {
            Some(SelectorCombinator::Child) => self
                .parent(node_id)
                .is_some_and(|parent| self.matches_selector_chain(parent, rest)),
            _ => {
                let mut cursor = self.parent(node_id);
                while let Some(ancestor) = cursor {
                    if self.matches_selector_chain(ancestor, rest) {
                        return true;
                    }
                    cursor = self.parent(ancestor);
                }
                false
            }
        }
    }

    fn matches_step(&self, node_id: NodeId, step: &SelectorStep) -> bool {
        let Some(element) = self.element(node_id) else {
            return false;
        };

        if let Some(tag) = &step.tag {
            if !element.tag_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if let Some(id) = &step.id {
            if element.attrs.get("id") != Some(id) {
                return false;
            }
        }

        if step
            .classes
            .iter()
            .any(|class_name| !self.class_contains(node_id, class_name))
        {
            return false;
        }

        let attrs_match = step.attrs.iter().all(|cond| match cond {
            SelectorAttrCondition::Exists { key } => element.attrs.contains_key(key),
            SelectorAttrCondition::Eq { key, value } => element.attrs.get(key) == Some(value),
        });
        if !attrs_match {
            return false;
        }

        step.pseudo_classes.iter().all(|pseudo| match pseudo {
            SelectorPseudoClass::Checked => element.checked,
            SelectorPseudoClass::Required => element.required,
            SelectorPseudoClass::Disabled => element.disabled,
        })
    }
}
