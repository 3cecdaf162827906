use crate::IoError;

/// Validated experiment name used as the prefix of output files.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: impl Into<String>) -> Result<Self, IoError> {
        let name = name.into();
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for ExperimentName {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl std::fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::ExperimentName;

    #[test]
    fn accepts_safe_names() {
        assert_eq!(ExperimentName::new("run_01-b").unwrap().as_str(), "run_01-b");
        let parsed: ExperimentName = "adult".parse().unwrap();
        assert_eq!(parsed.to_string(), "adult");
    }

    #[test]
    fn rejects_path_like_names() {
        for bad in ["", "../x", "a b", "x.json"] {
            assert!(ExperimentName::new(bad).is_err(), "{bad}");
        }
    }
}
