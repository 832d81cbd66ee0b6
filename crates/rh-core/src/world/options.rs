//! Option parsing (options.c)
//!
//! Options arrive as a comma separated list, from the `HACKOPTIONS`
//! environment variable, the options file, or the in-game `O` command.
//! Booleans negate with `!` or `no`; `name:` and `endgame:` take values.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Flags;
use crate::consts::PL_NSIZ;

/// Longest accepted HACKOPTIONS value
pub const MAX_OPTIONS_LEN: usize = 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    #[error("Bad option: {0}.")]
    Unknown(String),

    #[error("The {0} option must be in HACKOPTIONS.")]
    EnvOnly(&'static str),

    #[error("Option {0} needs a value.")]
    MissingValue(&'static str),

    #[error("Option value too large (max 9999): {0}")]
    TooLarge(u32),

    #[error("HACKOPTIONS too long (max {} chars) - ignoring.", MAX_OPTIONS_LEN)]
    TooLong,

    #[error("Could not read options file: {0}")]
    Io(String),

    #[error("Options file is not valid JSON: {0}")]
    Json(String),
}

/// Contents of the JSON options file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsFile {
    pub name: Option<String>,
    pub options: Vec<String>,
}

impl OptionsFile {
    pub fn load_from_file(path: &Path) -> Result<Self, OptionsError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| OptionsError::Io(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| OptionsError::Json(e.to_string()))
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), OptionsError> {
        let contents =
            serde_json::to_string_pretty(self).map_err(|e| OptionsError::Json(e.to_string()))?;
        std::fs::write(path, contents).map_err(|e| OptionsError::Io(e.to_string()))
    }

    /// Apply the file; it is trusted like the environment
    pub fn apply(&self, flags: &mut Flags, plname: &mut String) -> Vec<OptionsError> {
        if let Some(name) = &self.name {
            set_name(plname, name);
        }
        self.options
            .iter()
            .flat_map(|opts| parse_options(flags, plname, opts, true))
            .collect()
    }
}

/// Parse a whole option string, returning every option that was rejected
pub fn parse_options(
    flags: &mut Flags,
    plname: &mut String,
    opts: &str,
    from_env: bool,
) -> Vec<OptionsError> {
    if from_env && opts.len() > MAX_OPTIONS_LEN {
        return vec![OptionsError::TooLong];
    }
    opts.split(',')
        .filter_map(|opt| parse_option(flags, plname, opt, from_env).err())
        .collect()
}

fn set_name(plname: &mut String, name: &str) {
    *plname = name.chars().take(PL_NSIZ - 1).collect();
}

/// Parse one option (spaces are insignificant)
pub fn parse_option(
    flags: &mut Flags,
    plname: &mut String,
    opt: &str,
    from_env: bool,
) -> Result<(), OptionsError> {
    let squeezed: String = opt.chars().filter(|c| *c != ' ').collect();
    let mut rest = squeezed.as_str();
    if rest.is_empty() {
        return Ok(());
    }

    let mut negated = false;
    loop {
        if let Some(r) = rest.strip_prefix('!') {
            rest = r;
        } else if let Some(r) = rest.strip_prefix("no") {
            rest = r;
        } else {
            break;
        }
        negated = !negated;
    }

    if rest.starts_with("standout") {
        flags.standout = !negated;
    } else if rest.starts_with("nul") {
        flags.nonull = negated;
    } else if rest.starts_with("tomb") {
        flags.notombstone = negated;
    } else if rest.starts_with("news") {
        flags.nonews = negated;
    } else if rest.starts_with("time") {
        flags.time = !negated;
        flags.botl = true;
    } else if rest.starts_with("rest") {
        flags.no_rest_on_space = negated;
    } else if rest.starts_with("fixi") {
        if !from_env {
            return Err(OptionsError::EnvOnly("fixinvlet"));
        }
        flags.invlet_constant = !negated;
    } else if rest.starts_with("male") {
        flags.female = negated;
    } else if rest.starts_with("female") {
        flags.female = !negated;
    } else if rest.starts_with("name") {
        if !from_env {
            return Err(OptionsError::EnvOnly("playername"));
        }
        let (_, value) = rest.split_once(':').ok_or(OptionsError::MissingValue("name"))?;
        set_name(plname, value);
    } else if rest.starts_with("end") {
        let (_, spec) = rest
            .split_once(':')
            .ok_or(OptionsError::MissingValue("endgame"))?;
        parse_endgame(flags, spec, negated).map_err(|e| match e {
            OptionsError::Unknown(_) => OptionsError::Unknown(squeezed.clone()),
            other => other,
        })?;
    } else {
        return Err(OptionsError::Unknown(squeezed.chars().take(50).collect()));
    }
    Ok(())
}

/// `endgame:5t/4a/o` - top scores, scores around mine, own scores
fn parse_endgame(flags: &mut Flags, spec: &str, mut negated: bool) -> Result<(), OptionsError> {
    let chars: Vec<char> = spec.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let mut num = 1u32;
        if chars[i].is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let digits: String = chars[start..i].iter().collect();
            num = digits.parse().unwrap_or(u32::MAX);
            if num > 9999 {
                return Err(OptionsError::TooLarge(num));
            }
        } else if chars[i] == '!' {
            negated = !negated;
            i += 1;
        }
        match chars.get(i) {
            Some('t') => flags.end_top = num,
            Some('a') => flags.end_around = num,
            Some('o') => flags.end_own = !negated,
            _ => return Err(OptionsError::Unknown(spec.to_string())),
        }
        i += 1;
        while i < chars.len() && chars[i].is_ascii_alphabetic() {
            i += 1;
        }
        if chars.get(i) == Some(&'/') {
            i += 1;
        }
    }
    Ok(())
}
