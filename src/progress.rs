//! Level completion progress
//!
//! Persisted to LocalStorage. The simulation only ever signals "level N
//! completed"; reading prior completion state is the menu's business.

use serde::{Deserialize, Serialize};

/// Completed-level set
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Progress {
    pub completed: Vec<u32>,
}

impl Progress {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "cinder_brook_progress";

    pub fn new() -> Self {
        Self {
            completed: Vec::new(),
        }
    }

    pub fn is_completed(&self, level: u32) -> bool {
        self.completed.contains(&level)
    }

    /// Level 1 is always open; each later level unlocks when its predecessor
    /// has been completed.
    pub fn is_unlocked(&self, level: u32) -> bool {
        level == 1 || self.is_completed(level - 1)
    }

    /// Record a completion. Returns true if this was the first time.
    pub fn mark_completed(&mut self, level: u32) -> bool {
        if self.is_completed(level) {
            return false;
        }
        self.completed.push(level);
        self.completed.sort_unstable();
        true
    }

    /// Load progress from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(progress) = serde_json::from_str::<Progress>(&json) {
                    log::info!("Loaded progress: {} levels completed", progress.completed.len());
                    return progress;
                }
            }
        }

        log::info!("No saved progress, starting fresh");
        Self::new()
    }

    /// Save progress to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Progress saved ({} levels)", self.completed.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlock_chain() {
        let mut progress = Progress::new();
        assert!(progress.is_unlocked(1));
        assert!(!progress.is_unlocked(2));

        assert!(progress.mark_completed(1));
        assert!(progress.is_unlocked(2));
        assert!(!progress.is_unlocked(3));
    }

    #[test]
    fn test_mark_completed_idempotent() {
        let mut progress = Progress::new();
        assert!(progress.mark_completed(2));
        assert!(!progress.mark_completed(2));
        assert_eq!(progress.completed, vec![2]);
    }
}
