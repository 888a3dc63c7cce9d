//! Plan entitlements enforced at the scene mutation boundary.
//!
//! The limits live in one place ([`Entitlements::for_plan`]) so every
//! caller sees the same matrix. Enforcement happens when a mutation is
//! attempted, not at render time: a scene that already exceeds a limit
//! (after a downgrade, say) keeps rendering, it just cannot grow further.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Basic,
    Premium,
}

/// What a plan allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entitlements {
    /// Maximum number of text layers in a scene.
    pub max_layers: usize,
    /// Whether gradient fills may be enabled on a layer.
    pub gradient_effects: bool,
    /// Whether fonts outside the built-in set may be assigned.
    pub custom_fonts: bool,
}

impl Entitlements {
    /// The authoritative plan matrix.
    pub fn for_plan(plan: Plan) -> Self {
        match plan {
            Plan::Free => Self {
                max_layers: 2,
                gradient_effects: false,
                custom_fonts: false,
            },
            Plan::Basic => Self {
                max_layers: 5,
                gradient_effects: true,
                custom_fonts: false,
            },
            Plan::Premium => Self {
                max_layers: usize::MAX,
                gradient_effects: true,
                custom_fonts: true,
            },
        }
    }

    /// No limits at all, for embedding contexts with no plan concept.
    pub fn unrestricted() -> Self {
        Self::for_plan(Plan::Premium)
    }
}

impl Default for Entitlements {
    fn default() -> Self {
        Self::unrestricted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_matrix_is_monotonic() {
        let free = Entitlements::for_plan(Plan::Free);
        let basic = Entitlements::for_plan(Plan::Basic);
        let premium = Entitlements::for_plan(Plan::Premium);

        assert!(free.max_layers < basic.max_layers);
        assert!(basic.max_layers < premium.max_layers);
        assert!(!free.gradient_effects && basic.gradient_effects);
        assert!(!basic.custom_fonts && premium.custom_fonts);
    }

    #[test]
    fn unrestricted_matches_premium() {
        assert_eq!(Entitlements::unrestricted(), Entitlements::for_plan(Plan::Premium));
    }
}
