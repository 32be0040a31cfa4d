//! Typed physical quantities.
//!
//! Hit energies and times are normalized to fixed base units (MeV and ns)
//! when a record is decoded. The clustering core only ever sees [`Energy`]
//! and [`Time`], never bare numbers of unknown scale.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An energy in MeV.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Energy(pub f64);

impl Energy {
    /// Zero energy.
    pub const ZERO: Self = Self(0.0);

    /// Creates an energy from a value in MeV.
    #[inline]
    #[must_use]
    pub fn from_mev(mev: f64) -> Self {
        Self(mev)
    }

    /// Creates an energy from a value in keV.
    #[inline]
    #[must_use]
    pub fn from_kev(kev: f64) -> Self {
        Self(kev * 1e-3)
    }

    /// Returns the value in MeV.
    #[inline]
    #[must_use]
    pub fn as_mev(self) -> f64 {
        self.0
    }
}

impl Add for Energy {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Energy {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Energy {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Energy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} MeV", self.0)
    }
}

/// A time in nanoseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Time(pub f64);

impl Time {
    /// Creates a time from a value in nanoseconds.
    #[inline]
    #[must_use]
    pub fn from_ns(ns: f64) -> Self {
        Self(ns)
    }

    /// Returns the value in nanoseconds.
    #[inline]
    #[must_use]
    pub fn as_ns(self) -> f64 {
        self.0
    }

    /// Total ordering over times, usable with `sort_by`.
    #[inline]
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Add for Time {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Time {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ns", self.0)
    }
}

/// Unit in which energies are stored in an input record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EnergyUnit {
    #[cfg_attr(feature = "serde", serde(rename = "eV"))]
    Ev,
    #[cfg_attr(feature = "serde", serde(rename = "keV"))]
    Kev,
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "MeV"))]
    Mev,
    #[cfg_attr(feature = "serde", serde(rename = "GeV"))]
    Gev,
}

impl EnergyUnit {
    /// Size of one unit in MeV.
    #[must_use]
    pub fn in_mev(self) -> f64 {
        match self {
            EnergyUnit::Ev => 1e-6,
            EnergyUnit::Kev => 1e-3,
            EnergyUnit::Mev => 1.0,
            EnergyUnit::Gev => 1e3,
        }
    }

    /// Converts a stored value into an [`Energy`].
    #[inline]
    #[must_use]
    pub fn to_energy(self, value: f64) -> Energy {
        Energy(value * self.in_mev())
    }

    /// Converts an [`Energy`] back into a stored value.
    #[inline]
    #[must_use]
    pub fn from_energy(self, energy: Energy) -> f64 {
        energy.0 / self.in_mev()
    }
}

/// Unit in which times are stored in an input record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TimeUnit {
    #[cfg_attr(feature = "serde", serde(rename = "ps"))]
    Ps,
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "ns"))]
    Ns,
    #[cfg_attr(feature = "serde", serde(rename = "us"))]
    Us,
    #[cfg_attr(feature = "serde", serde(rename = "ms"))]
    Ms,
    #[cfg_attr(feature = "serde", serde(rename = "s"))]
    S,
}

impl TimeUnit {
    /// Size of one unit in nanoseconds.
    #[must_use]
    pub fn in_ns(self) -> f64 {
        match self {
            TimeUnit::Ps => 1e-3,
            TimeUnit::Ns => 1.0,
            TimeUnit::Us => 1e3,
            TimeUnit::Ms => 1e6,
            TimeUnit::S => 1e9,
        }
    }

    /// Converts a stored value into a [`Time`].
    #[inline]
    #[must_use]
    pub fn to_time(self, value: f64) -> Time {
        Time(value * self.in_ns())
    }

    /// Converts a [`Time`] back into a stored value.
    #[inline]
    #[must_use]
    pub fn from_time(self, time: Time) -> f64 {
        time.0 / self.in_ns()
    }
}
