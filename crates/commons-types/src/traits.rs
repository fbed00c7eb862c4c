//! Bounded behavioural traits.
//!
//! Every trait is a [`TraitScore`]: a [`Decimal`] that can only be built
//! through a clamping constructor, so a value outside `[0, 100]` is not
//! representable. Mutation, inheritance, and social influence all go
//! through [`TraitScore::new`] or the saturating helpers below.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ts_rs::TS;

/// Lower bound of every trait score.
pub const TRAIT_MIN: Decimal = Decimal::ZERO;

/// Upper bound of every trait score.
pub const TRAIT_MAX: Decimal = Decimal::ONE_HUNDRED;

/// A trait value clamped to `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TraitScore(#[ts(as = "String")] Decimal);

impl TraitScore {
    /// The lowest possible score.
    pub const MIN: Self = Self(TRAIT_MIN);

    /// The highest possible score.
    pub const MAX: Self = Self(TRAIT_MAX);

    /// Build a score, clamping `value` into `[0, 100]`.
    pub fn new(value: Decimal) -> Self {
        Self(value.clamp(TRAIT_MIN, TRAIT_MAX))
    }

    /// Return the underlying value.
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Add `delta` (which may be negative) and clamp the result.
    ///
    /// Returns `None` only if the intermediate sum overflows [`Decimal`].
    pub fn checked_shift(self, delta: Decimal) -> Option<Self> {
        self.0.checked_add(delta).map(Self::new)
    }
}

impl From<Decimal> for TraitScore {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

impl core::fmt::Display for TraitScore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for TraitScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Serialize::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for TraitScore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer).map(Self::new)
    }
}

/// The four behavioural traits of an agent.
///
/// - `altruism`: willingness to act on a foreseen calamity.
/// - `charisma`: ability to influence other agents on contact.
/// - `trust`: resistance to being influenced (influence lands only when the
///   other agent's charisma exceeds this).
/// - `foresight`: ability to predict a calamity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Traits {
    /// Scale 0-100, how readily the agent switches to the renewable strategy.
    pub altruism: TraitScore,
    /// Scale 0-100, the agent's ability to influence others.
    pub charisma: TraitScore,
    /// Scale 0-100, how hard the agent is to influence.
    pub trust: TraitScore,
    /// Scale 0-100, the agent's ability to predict a calamity.
    pub foresight: TraitScore,
}

impl Traits {
    /// Build a trait set from raw values, clamping each one.
    pub fn from_values(
        altruism: Decimal,
        charisma: Decimal,
        trust: Decimal,
        foresight: Decimal,
    ) -> Self {
        Self {
            altruism: TraitScore::new(altruism),
            charisma: TraitScore::new(charisma),
            trust: TraitScore::new(trust),
            foresight: TraitScore::new(foresight),
        }
    }

    /// Return all four traits in declaration order, for bulk checks.
    pub const fn as_array(&self) -> [TraitScore; 4] {
        [self.altruism, self.charisma, self.trust, self.foresight]
    }
}
