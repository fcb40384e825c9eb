use crate::error::{GlmMetError, Result};

/// Which provider variables to request.
///
/// `Default` means the adapter's documented list for its granularity; see the
/// constants in [`crate::settings`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VariableSelection {
    #[default]
    Default,
    Custom(Vec<String>),
}

impl VariableSelection {
    pub fn custom<I, S>(variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        VariableSelection::Custom(variables.into_iter().map(Into::into).collect())
    }

    /// Resolves the selection against an adapter's defaults. An explicitly empty
    /// list is an error rather than an empty request.
    pub(crate) fn resolve(&self, defaults: &[&str], request: &'static str) -> Result<Vec<String>> {
        match self {
            VariableSelection::Default => Ok(defaults.iter().map(|v| v.to_string()).collect()),
            VariableSelection::Custom(list) if list.is_empty() => {
                Err(GlmMetError::EmptyVariables(request))
            }
            VariableSelection::Custom(list) => Ok(list.clone()),
        }
    }
}

impl From<Vec<String>> for VariableSelection {
    fn from(value: Vec<String>) -> Self {
        VariableSelection::Custom(value)
    }
}

impl From<&[&str]> for VariableSelection {
    fn from(value: &[&str]) -> Self {
        VariableSelection::custom(value.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_default_and_custom() -> Result<()> {
        let defaults = ["temperature_2m", "precipitation"];
        assert_eq!(
            VariableSelection::Default.resolve(&defaults, "hourly")?,
            vec!["temperature_2m", "precipitation"]
        );
        assert_eq!(
            VariableSelection::custom(["cloudcover"]).resolve(&defaults, "hourly")?,
            vec!["cloudcover"]
        );
        Ok(())
    }

    #[test]
    fn test_empty_custom_rejected() {
        let err = VariableSelection::Custom(vec![])
            .resolve(&["T2M"], "parameters")
            .unwrap_err();
        assert!(matches!(err, GlmMetError::EmptyVariables("parameters")));
    }
}
