//! Per-key toggle state machine for overlay layers.
//!
//! Each key (a flood year, a utility category) moves through
//! `Off -> Loading -> On -> Off`. Every load attempt is tagged with a
//! fresh request token; a completion is applied only while its token is
//! still the latest for that key. Toggling a key off while its fetch is
//! in flight invalidates the token, so the late completion is discarded
//! instead of resurrecting the layer.

use std::collections::HashMap;
use std::hash::Hash;

/// Phase of a key that is not Off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotPhase {
    Loading,
    On,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    phase: SlotPhase,
    token: u64,
}

/// What the caller should do in response to a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    /// Off -> Loading: start a fetch tagged with `token`.
    StartLoad { token: u64 },
    /// Loading -> Off: the in-flight fetch is now stale, nothing to undo.
    CancelLoad,
    /// On -> Off: tear down whatever the activation created.
    Deactivate,
}

#[derive(Debug)]
pub struct ToggleSlots<K: Copy + Eq + Hash> {
    slots: HashMap<K, Slot>,
    latest: HashMap<K, u64>,
    next_token: u64,
}

impl<K: Copy + Eq + Hash> Default for ToggleSlots<K> {
    fn default() -> Self {
        Self {
            slots: HashMap::new(),
            latest: HashMap::new(),
            next_token: 0,
        }
    }
}

impl<K: Copy + Eq + Hash> ToggleSlots<K> {
    fn issue_token(&mut self, key: K) -> u64 {
        self.next_token += 1;
        self.latest.insert(key, self.next_token);
        self.next_token
    }

    /// Advance the key's state machine one toggle.
    pub fn toggle(&mut self, key: K) -> ToggleAction {
        match self.slots.get(&key).map(|slot| slot.phase) {
            None => {
                let token = self.issue_token(key);
                self.slots.insert(
                    key,
                    Slot {
                        phase: SlotPhase::Loading,
                        token,
                    },
                );
                ToggleAction::StartLoad { token }
            }
            Some(SlotPhase::Loading) => {
                self.slots.remove(&key);
                // Invalidate the in-flight fetch.
                self.issue_token(key);
                ToggleAction::CancelLoad
            }
            Some(SlotPhase::On) => {
                self.slots.remove(&key);
                ToggleAction::Deactivate
            }
        }
    }

    /// Mark a key On after its fetch finished. Returns false (and changes
    /// nothing) when the completion is stale.
    pub fn complete(&mut self, key: K, token: u64) -> bool {
        if self.latest.get(&key) != Some(&token) {
            return false;
        }
        match self.slots.get_mut(&key) {
            Some(slot) if slot.phase == SlotPhase::Loading && slot.token == token => {
                slot.phase = SlotPhase::On;
                true
            }
            _ => false,
        }
    }

    /// Drop the pending slot after a failed fetch, leaving the key Off.
    /// Stale failures are ignored.
    pub fn fail(&mut self, key: K, token: u64) {
        if let Some(slot) = self.slots.get(&key) {
            if slot.phase == SlotPhase::Loading && slot.token == token {
                self.slots.remove(&key);
            }
        }
    }

    pub fn phase(&self, key: K) -> Option<SlotPhase> {
        self.slots.get(&key).map(|slot| slot.phase)
    }

    pub fn is_active(&self, key: K) -> bool {
        self.phase(key) == Some(SlotPhase::On)
    }

    pub fn is_loading(&self, key: K) -> bool {
        self.phase(key) == Some(SlotPhase::Loading)
    }

    /// Number of keys currently On (loading keys are not counted).
    pub fn active_count(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| slot.phase == SlotPhase::On)
            .count()
    }
}
