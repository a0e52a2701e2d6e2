use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::DrumPattern;
use crate::EngineError;

/// Selected when the current pattern disappears.
pub const FALLBACK_PATTERN: &str = "metronome";

/// Built-ins that can be neither deleted nor overwritten.
pub const PROTECTED_PATTERNS: [&str; 2] = [FALLBACK_PATTERN, "basic-rock"];

// (name, kick, snare, hihat)
const BUILT_INS: [(&str, &str, &str, &str); 5] = [
    (
        FALLBACK_PATTERN,
        "x... .... .... ....",
        ".... .... .... ....",
        "x... x... x... x...",
    ),
    (
        "basic-rock",
        "x... .... x.x. ....",
        ".... x... .... x...",
        "x.x. x.x. x.x. x.x.",
    ),
    (
        "four-on-floor",
        "x... x... x... x...",
        ".... x... .... x...",
        "..x. ..x. ..x. ..x.",
    ),
    (
        "half-time",
        "x... .... ..x. ....",
        ".... .... x... ....",
        "x.x. x.x. x.x. x.x.",
    ),
    (
        "funk",
        "x..x ...x ..x. ....",
        ".... x... .x.. x..x",
        "xxxx xxxx xxxx xxxx",
    ),
];

/// In-memory pattern library keyed by name.
///
/// Patterns are stored as `Arc` snapshots so the sequencer can hold one while
/// the store is edited.
#[derive(Debug, Clone)]
pub struct PatternStore {
    patterns: BTreeMap<String, Arc<DrumPattern>>,
}

impl PatternStore {
    /// Store holding the built-in patterns.
    pub fn new() -> Self {
        let patterns = BUILT_INS
            .iter()
            .filter_map(|(name, kick, snare, hihat)| {
                DrumPattern::from_strings(kick, snare, hihat)
                    .ok()
                    .map(|p| (name.to_string(), Arc::new(p)))
            })
            .collect();
        Self { patterns }
    }

    pub fn is_protected(name: &str) -> bool {
        PROTECTED_PATTERNS.contains(&name)
    }

    /// Pattern names in sorted order.
    pub fn list(&self) -> Vec<String> {
        self.patterns.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<Arc<DrumPattern>> {
        self.patterns.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.patterns.contains_key(name)
    }

    /// Fallback snapshot. Always present because it cannot be deleted.
    pub fn fallback(&self) -> Arc<DrumPattern> {
        self.get(FALLBACK_PATTERN)
            .unwrap_or_else(|| Arc::new(DrumPattern::metronome()))
    }

    pub fn save(&mut self, name: &str, pattern: DrumPattern) -> Result<(), EngineError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidPattern("pattern name is empty".into()));
        }
        pattern.validate()?;
        if Self::is_protected(name) {
            return Err(EngineError::PatternProtected(name.to_string()));
        }

        debug!(name, steps = pattern.len(), "saving pattern");
        self.patterns.insert(name.to_string(), Arc::new(pattern));
        Ok(())
    }

    pub fn delete(&mut self, name: &str) -> Result<(), EngineError> {
        if Self::is_protected(name) {
            return Err(EngineError::PatternProtected(name.to_string()));
        }
        match self.patterns.remove(name) {
            Some(_) => {
                debug!(name, "deleted pattern");
                Ok(())
            }
            None => Err(EngineError::UnknownPattern(name.to_string())),
        }
    }
}

impl Default for PatternStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "serde")]
impl PatternStore {
    /// Serialize every pattern that is not protected.
    pub fn to_json(&self) -> Result<String, EngineError> {
        let user: BTreeMap<&str, &DrumPattern> = self
            .patterns
            .iter()
            .filter(|(name, _)| !Self::is_protected(name))
            .map(|(name, pattern)| (name.as_str(), pattern.as_ref()))
            .collect();
        Ok(serde_json::to_string_pretty(&user)?)
    }

    /// Built-in store plus the patterns in `json`. Every entry is validated;
    /// one bad entry rejects the whole document.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let user: BTreeMap<String, DrumPattern> = serde_json::from_str(json)?;
        let mut store = Self::new();
        for (name, pattern) in user {
            store.save(&name, pattern)?;
        }
        Ok(store)
    }
}
