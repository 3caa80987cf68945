use crate::core::constants::ESSENCE_TYPE_COUNT;
use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Essence flavor. The same label names both the lesser (minor) essence and
/// the greater (major) essence of that flavor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum EssenceType {
    Body = 0,
    Mind = 1,
    Enhancement = 2,
    Infinite = 3,
    Flames = 4,
    Ice = 5,
    Electricity = 6,
    Torment = 7,
    Battle = 8,
    Sorcery = 9,
    Ruin = 10,
    Haste = 11,
}

impl EssenceType {
    /// All essence types in canonical order.
    pub const ALL: [EssenceType; ESSENCE_TYPE_COUNT] = [
        EssenceType::Body,
        EssenceType::Mind,
        EssenceType::Enhancement,
        EssenceType::Infinite,
        EssenceType::Flames,
        EssenceType::Ice,
        EssenceType::Electricity,
        EssenceType::Torment,
        EssenceType::Battle,
        EssenceType::Sorcery,
        EssenceType::Ruin,
        EssenceType::Haste,
    ];

    /// Returns the display name for this essence type.
    pub fn name(&self) -> &'static str {
        match self {
            EssenceType::Body => "Body",
            EssenceType::Mind => "Mind",
            EssenceType::Enhancement => "Enhancement",
            EssenceType::Infinite => "Infinite",
            EssenceType::Flames => "Flames",
            EssenceType::Ice => "Ice",
            EssenceType::Electricity => "Electricity",
            EssenceType::Torment => "Torment",
            EssenceType::Battle => "Battle",
            EssenceType::Sorcery => "Sorcery",
            EssenceType::Ruin => "Ruin",
            EssenceType::Haste => "Haste",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for EssenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EssenceType {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        EssenceType::ALL
            .into_iter()
            .find(|essence| essence.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SimError::UnknownEssence(s.to_string()))
    }
}

/// Lesser essence counts held during a session, one slot per essence type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MinorInventory {
    counts: [u64; ESSENCE_TYPE_COUNT],
}

impl MinorInventory {
    /// Inventory with every essence on a single type.
    pub fn with_stock(essence: EssenceType, count: u64) -> Self {
        let mut inventory = Self::default();
        inventory.counts[essence.index()] = count;
        inventory
    }

    pub fn get(&self, essence: EssenceType) -> u64 {
        self.counts[essence.index()]
    }

    pub fn add(&mut self, essence: EssenceType, amount: u64) {
        self.counts[essence.index()] += amount;
    }

    /// Removes `amount` essences of one type. Callers check the count first.
    pub fn remove(&mut self, essence: EssenceType, amount: u64) {
        debug_assert!(self.counts[essence.index()] >= amount);
        self.counts[essence.index()] -= amount;
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EssenceType, u64)> + '_ {
        EssenceType::ALL
            .into_iter()
            .map(move |essence| (essence, self.get(essence)))
    }

    /// Full mapping, including zero counts.
    pub fn to_map(&self) -> BTreeMap<EssenceType, u64> {
        self.iter().collect()
    }
}
