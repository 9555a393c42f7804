//! Run configuration: command-line flags over environment over defaults.

use std::path::PathBuf;

pub const DEFAULT_INPUT: &str = "tecnica_dados_fm.xlsx";
pub const DEFAULT_OUTPUT: &str = "public/medicoes.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub dry_run: bool,
    pub keep_extra_columns: bool,
}

impl Config {
    /// Read `MEDICOES_INPUT` / `MEDICOES_OUTPUT` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            input: PathBuf::from(non_empty("MEDICOES_INPUT").unwrap_or_else(|| DEFAULT_INPUT.to_string())),
            output: PathBuf::from(
                non_empty("MEDICOES_OUTPUT").unwrap_or_else(|| DEFAULT_OUTPUT.to_string()),
            ),
            dry_run: false,
            keep_extra_columns: false,
        }
    }

    /// Apply command-line flags. Paths given on the command line win.
    pub fn with_overrides(
        mut self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        dry_run: bool,
        keep_extra_columns: bool,
    ) -> Self {
        if let Some(input) = input {
            self.input = input;
        }
        if let Some(output) = output {
            self.output = output;
        }
        self.dry_run = dry_run;
        self.keep_extra_columns = keep_extra_columns;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config.input, PathBuf::from(DEFAULT_INPUT));
        assert_eq!(config.output, PathBuf::from(DEFAULT_OUTPUT));
        assert!(!config.dry_run);
        assert!(!config.keep_extra_columns);
    }

    #[test]
    fn test_env_overrides_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("MEDICOES_INPUT", "/data/planilha.xlsx"),
            ("MEDICOES_OUTPUT", "/srv/medicoes.json"),
        ]));
        assert_eq!(config.input, PathBuf::from("/data/planilha.xlsx"));
        assert_eq!(config.output, PathBuf::from("/srv/medicoes.json"));
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let config = Config::from_lookup(lookup(&[("MEDICOES_INPUT", "  ")]));
        assert_eq!(config.input, PathBuf::from(DEFAULT_INPUT));
    }

    #[test]
    fn test_flags_override_env() {
        let config = Config::from_lookup(lookup(&[("MEDICOES_INPUT", "/data/a.xlsx")]))
            .with_overrides(Some(PathBuf::from("b.csv")), None, true, true);
        assert_eq!(config.input, PathBuf::from("b.csv"));
        assert_eq!(config.output, PathBuf::from(DEFAULT_OUTPUT));
        assert!(config.dry_run);
        assert!(config.keep_extra_columns);
    }
}
