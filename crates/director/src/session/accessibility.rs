//! Persisted accessibility settings.

use super::stats::{AccessibilityFlags, AggregateUserStats};
use crate::events::{Event, EventRouter};
use crate::persistence::PersistenceCache;

/// Reads and writes the learner's comfort settings through the shared
/// statistics snapshot, announcing every change on the router.
#[derive(Clone)]
pub struct AccessibilitySettings {
    stats: PersistenceCache<AggregateUserStats>,
    router: EventRouter,
}

impl AccessibilitySettings {
    pub fn new(stats: PersistenceCache<AggregateUserStats>, router: EventRouter) -> Self {
        Self { stats, router }
    }

    pub fn flags(&self) -> AccessibilityFlags {
        self.stats.load().accessibility
    }

    pub fn set_zen_mode(&self, value: bool) {
        self.set(|flags| &mut flags.zen_mode, value);
    }

    pub fn set_high_contrast(&self, value: bool) {
        self.set(|flags| &mut flags.high_contrast, value);
    }

    pub fn set_reduced_motion(&self, value: bool) {
        self.set(|flags| &mut flags.reduced_motion, value);
    }

    /// Particles are off in zen mode and with reduced motion.
    pub fn should_disable_particles(&self) -> bool {
        let flags = self.flags();
        flags.zen_mode || flags.reduced_motion
    }

    /// Animation duration multiplier: 0 means instant.
    pub fn animation_multiplier(&self) -> f64 {
        if self.flags().reduced_motion { 0.0 } else { 1.0 }
    }

    fn set(&self, field: impl Fn(&mut AccessibilityFlags) -> &mut bool, value: bool) {
        let mut stats = self.stats.load();
        let slot = field(&mut stats.accessibility);
        if *slot == value {
            return;
        }
        *slot = value;

        let flags = stats.accessibility;
        self.stats.save(stats);
        self.router.publish(Event::SettingsChanged(flags));
    }
}
