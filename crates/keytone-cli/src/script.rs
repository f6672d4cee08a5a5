//! Note scripts for offline rendering.
//!
//! A script is a comma-separated list of `NAME:MS` steps, where `NAME` is a
//! note name such as `C4` or `Fs3` and `MS` is how long the key is held. A
//! `-` in place of the name is a rest.

use anyhow::{Context, bail};
use keytone_midi::number_from_name;

/// One step of a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Note name and number, or `None` for a rest.
    pub note: Option<(String, i32)>,
    /// Duration in milliseconds.
    pub duration_ms: u32,
}

/// Parse a note script. Empty entries are skipped.
pub fn parse(script: &str) -> anyhow::Result<Vec<Step>> {
    let mut steps = Vec::new();
    for entry in script.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((name, ms)) = entry.split_once(':') else {
            bail!("invalid step '{entry}' (expected NAME:MS)");
        };
        let duration_ms = ms
            .trim()
            .parse::<u32>()
            .with_context(|| format!("invalid duration in step '{entry}'"))?;
        let name = name.trim();
        let note = if name == "-" {
            None
        } else {
            let number = number_from_name(name)
                .with_context(|| format!("unknown note name '{name}' in step '{entry}'"))?;
            Some((name.to_string(), number))
        };
        steps.push(Step { note, duration_ms });
    }
    if steps.is_empty() {
        bail!("note script is empty");
    }
    Ok(steps)
}

/// Total duration of a script in milliseconds.
pub fn total_ms(steps: &[Step]) -> u64 {
    steps.iter().map(|s| u64::from(s.duration_ms)).sum()
}
