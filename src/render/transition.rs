use serde::{Deserialize, Serialize};

/// Animated-transition collaborator (selection-style chainable calls).
pub trait TransitionTarget {
    fn transition(&mut self, name: Option<&str>);
    fn duration(&mut self, ms: u64);
    fn delay(&mut self, ms: u64);
}

/// Outcome of the transition gate for one draw pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransitionPlan {
    /// Values are applied directly; the collaborator is never touched.
    #[default]
    Immediate,
    Animated {
        duration_ms: u64,
        delay_ms: u64,
        name: Option<String>,
    },
}

impl TransitionPlan {
    /// Zero duration or a global disable switch skips the transition entirely.
    #[must_use]
    pub fn resolve(duration_ms: u64, delay_ms: Option<u64>, name: Option<&str>, disabled: bool) -> Self {
        if duration_ms == 0 || disabled {
            return Self::Immediate;
        }
        Self::Animated {
            duration_ms,
            delay_ms: delay_ms.unwrap_or(0),
            name: name.map(str::to_owned),
        }
    }

    /// Configures `target` for an animated plan; no-op for immediate plans.
    pub fn apply<T: TransitionTarget + ?Sized>(&self, target: &mut T) {
        if let Self::Animated {
            duration_ms,
            delay_ms,
            name,
        } = self
        {
            target.transition(name.as_deref());
            target.duration(*duration_ms);
            target.delay(*delay_ms);
        }
    }

    #[must_use]
    pub fn is_animated(&self) -> bool {
        matches!(self, Self::Animated { .. })
    }
}
