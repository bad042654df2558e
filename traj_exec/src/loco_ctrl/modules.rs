//! Module identification and per-module containers

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

// Internal
use super::NUM_MODULES;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Identifies one of the four swerve modules.
///
/// The declaration order is the canonical module order used everywhere,
/// including parameter files: FL, FR, RL, RR.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModuleId {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One value of `T` for each swerve module.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SwerveModules<T> {
    pub fl: T,
    pub fr: T,
    pub rl: T,
    pub rr: T,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ModuleId {
    /// All modules in canonical order.
    pub const ALL: [ModuleId; NUM_MODULES] = [
        ModuleId::FrontLeft,
        ModuleId::FrontRight,
        ModuleId::RearLeft,
        ModuleId::RearRight,
    ];

    /// Position of this module in the canonical order.
    pub fn index(&self) -> usize {
        match self {
            ModuleId::FrontLeft => 0,
            ModuleId::FrontRight => 1,
            ModuleId::RearLeft => 2,
            ModuleId::RearRight => 3,
        }
    }

    /// Short name of the module (`FL`, `FR`, `RL`, `RR`).
    pub fn short_name(&self) -> &'static str {
        match self {
            ModuleId::FrontLeft => "FL",
            ModuleId::FrontRight => "FR",
            ModuleId::RearLeft => "RL",
            ModuleId::RearRight => "RR",
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

impl<T> SwerveModules<T> {
    pub fn new(fl: T, fr: T, rl: T, rr: T) -> Self {
        Self { fl, fr, rl, rr }
    }

    /// Build from an array in canonical (FL, FR, RL, RR) order.
    pub fn from_array(array: [T; NUM_MODULES]) -> Self {
        let [fl, fr, rl, rr] = array;
        Self { fl, fr, rl, rr }
    }

    /// Convert into an array in canonical order.
    pub fn into_array(self) -> [T; NUM_MODULES] {
        [self.fl, self.fr, self.rl, self.rr]
    }

    /// Iterate over the modules in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (ModuleId, &T)> + '_ {
        (0..NUM_MODULES).map(move |i| {
            let id = ModuleId::ALL[i];
            (id, &self[id])
        })
    }

    /// Apply `f` to every module, keeping the module each value belongs to.
    pub fn map<U, F>(self, mut f: F) -> SwerveModules<U>
    where
        F: FnMut(ModuleId, T) -> U,
    {
        SwerveModules {
            fl: f(ModuleId::FrontLeft, self.fl),
            fr: f(ModuleId::FrontRight, self.fr),
            rl: f(ModuleId::RearLeft, self.rl),
            rr: f(ModuleId::RearRight, self.rr),
        }
    }
}

impl<T: Copy> SwerveModules<T> {
    /// The same value for every module.
    pub fn splat(value: T) -> Self {
        Self::new(value, value, value, value)
    }
}

impl<T> Index<ModuleId> for SwerveModules<T> {
    type Output = T;

    fn index(&self, id: ModuleId) -> &T {
        match id {
            ModuleId::FrontLeft => &self.fl,
            ModuleId::FrontRight => &self.fr,
            ModuleId::RearLeft => &self.rl,
            ModuleId::RearRight => &self.rr,
        }
    }
}

impl<T> IndexMut<ModuleId> for SwerveModules<T> {
    fn index_mut(&mut self, id: ModuleId) -> &mut T {
        match id {
            ModuleId::FrontLeft => &mut self.fl,
            ModuleId::FrontRight => &mut self.fr,
            ModuleId::RearLeft => &mut self.rl,
            ModuleId::RearRight => &mut self.rr,
        }
    }
}
