use crate::LlamaError;

/// Chains, protocols or bridge ids a fan-out endpoint is called for.
///
/// `One` returns its raw response unwrapped; `Many` returns raw responses in
/// an object keyed by the caller's input, even when it has a single entry.
///
/// Keys are trimmed before use and must be unique after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Targets {
    One(String),
    Many(Vec<String>),
}

impl Targets {
    pub fn keys(&self) -> &[String] {
        match self {
            Self::One(key) => std::slice::from_ref(key),
            Self::Many(keys) => keys,
        }
    }

    pub const fn is_single(&self) -> bool {
        matches!(self, Self::One(_))
    }

    /// Trims every key and rejects empty lists, blank keys and keys that
    /// repeat after trimming. The variant is preserved.
    pub(crate) fn normalized(&self, what: &str) -> Result<Self, LlamaError> {
        if self.keys().is_empty() {
            return Err(LlamaError::invalid_arguments(format!(
                "at least one {what} is required"
            )));
        }

        let mut keys: Vec<String> = Vec::with_capacity(self.keys().len());
        for (position, key) in self.keys().iter().enumerate() {
            let key = key.trim();
            if key.is_empty() {
                return Err(LlamaError::invalid_arguments(format!(
                    "{what} at position {position} is blank"
                )));
            }
            if keys.iter().any(|seen| seen == key) {
                return Err(LlamaError::invalid_arguments(format!(
                    "{what} '{key}' is given more than once"
                )));
            }
            keys.push(key.to_owned());
        }

        Ok(match self {
            Self::One(_) => Self::One(keys.remove(0)),
            Self::Many(_) => Self::Many(keys),
        })
    }
}

impl From<&str> for Targets {
    fn from(value: &str) -> Self {
        Self::One(value.to_owned())
    }
}

impl From<String> for Targets {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<Vec<String>> for Targets {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

impl From<Vec<&str>> for Targets {
    fn from(values: Vec<&str>) -> Self {
        Self::Many(values.into_iter().map(str::to_owned).collect())
    }
}

impl From<&[&str]> for Targets {
    fn from(values: &[&str]) -> Self {
        Self::Many(values.iter().map(|value| (*value).to_owned()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Targets {
    fn from(values: [&str; N]) -> Self {
        Self::Many(values.iter().map(|value| (*value).to_owned()).collect())
    }
}
