use std::fmt;

#[derive(Debug, Clone)]
pub(crate) struct Regex {
    backend: fancy_regex::Regex,
}

impl Regex {
    pub(crate) fn new(pattern: &str) -> Result<Self, RegexError> {
        let backend = fancy_regex::Regex::new(pattern).map_err(RegexError::from)?;
        Ok(Self { backend })
    }

    pub(crate) fn captures(&self, input: &str) -> Result<Option<Captures>, RegexError> {
        let captures = self.backend.captures(input).map_err(RegexError::from)?;
        Ok(captures.as_ref().map(Captures::from_backend))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Captures {
    groups: Vec<Option<String>>,
}

impl Captures {
    fn from_backend(captures: &fancy_regex::Captures<'_>) -> Self {
        let groups = (0..captures.len())
            .map(|idx| captures.get(idx).map(|m| m.as_str().to_string()))
            .collect();
        Self { groups }
    }

    pub(crate) fn get(&self, index: usize) -> Option<&str> {
        self.groups.get(index).and_then(|group| group.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RegexError {
    message: String,
}

impl fmt::Display for RegexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RegexError {}

impl From<fancy_regex::Error> for RegexError {
    fn from(value: fancy_regex::Error) -> Self {
        Self {
            message: value.to_string(),
        }
    }
}
