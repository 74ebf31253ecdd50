// Lazily compiled static regex pattern sets
use super::regex_error::RegexError;
use regex::Regex;
use std::sync::OnceLock;

/// Static regex pattern set compiled on first use.
///
/// Compilation happens once per process; a failure is remembered and
/// returned from every later lookup instead of panicking.
pub struct StaticRegexSet {
    patterns: &'static [(&'static str, &'static str)], // (pattern, name)
    compiled: OnceLock<Result<Vec<Regex>, RegexError>>,
}

impl StaticRegexSet {
    pub const fn new(patterns: &'static [(&'static str, &'static str)]) -> Self {
        Self {
            patterns,
            compiled: OnceLock::new(),
        }
    }

    pub fn get(&self, index: usize) -> Result<&Regex, RegexError> {
        let compiled = self.compiled.get_or_init(|| {
            let mut regexes = Vec::with_capacity(self.patterns.len());

            for (pattern, name) in self.patterns {
                match Regex::new(pattern) {
                    Ok(regex) => regexes.push(regex),
                    Err(e) => {
                        return Err(RegexError::CompilationFailed {
                            pattern: pattern.to_string(),
                            name: name.to_string(),
                            source: e,
                        });
                    }
                }
            }

            Ok(regexes)
        });

        match compiled {
            Ok(regexes) => regexes.get(index).ok_or(RegexError::IndexOutOfBounds {
                index,
                max: regexes.len(),
            }),
            Err(e) => Err(e.clone()),
        }
    }

    /// First capture group of `index` in `text`, if the pattern matches.
    pub fn capture<'t>(&self, index: usize, text: &'t str) -> Result<Option<&'t str>, RegexError> {
        let regex = self.get(index)?;
        Ok(regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str()))
    }
}
