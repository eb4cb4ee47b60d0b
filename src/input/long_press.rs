use super::types::{ButtonAction, ButtonEvent, ButtonKey};
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct HeldKey {
    since: Instant,
    long_fired: bool,
}

/// Turns raw press/release edges into down, up and long-press events.
///
/// A long press fires once while the key is still held; the release that
/// follows it is swallowed.
#[derive(Debug)]
pub struct LongPressTracker {
    threshold: Duration,
    held: HashMap<ButtonKey, HeldKey>,
}

impl LongPressTracker {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            held: HashMap::new(),
        }
    }

    /// Key went down; repeats of a held key are ignored
    pub fn press(&mut self, key: ButtonKey, now: Instant) -> Option<ButtonEvent> {
        if self.held.contains_key(&key) {
            return None;
        }
        self.held.insert(
            key,
            HeldKey {
                since: now,
                long_fired: false,
            },
        );
        Some(ButtonEvent::new(key, ButtonAction::Down))
    }

    pub fn release(&mut self, key: ButtonKey, now: Instant) -> Option<ButtonEvent> {
        let held = self.held.remove(&key)?;
        if held.long_fired {
            return None;
        }
        // a release observed late still counts as a long press
        if now.duration_since(held.since) >= self.threshold {
            return Some(ButtonEvent::new(key, ButtonAction::LongPress));
        }
        Some(ButtonEvent::new(key, ButtonAction::Up))
    }

    /// Long presses that matured since the last poll
    pub fn poll(&mut self, now: Instant) -> Vec<ButtonEvent> {
        let threshold = self.threshold;
        self.held
            .iter_mut()
            .filter(|(_, held)| !held.long_fired && now.duration_since(held.since) >= threshold)
            .map(|(key, held)| {
                held.long_fired = true;
                ButtonEvent::new(*key, ButtonAction::LongPress)
            })
            .collect()
    }

    pub fn is_held(&self, key: ButtonKey) -> bool {
        self.held.contains_key(&key)
    }
}
