//! Windowed threshold clustering of one channel's hits.
//!
//! Starting from the earliest unconsumed hit at `t0`, the clusterer opens a
//! window over the hits in `[t0, t0 + spacing]` and accumulates their energy
//! in time order. If the running sum reaches the threshold, a pulse is
//! emitted and the window's hits are consumed; otherwise the start hit is
//! skipped and the next hit opens a new window.
//!
//! A pulse is the hit at which the running sum first reached threshold,
//! with its time replaced by `t0` and its deposit replaced by the energy
//! summed over the whole window.

use crate::config::{ConsumePolicy, EnergyField, WindowBound};
use simdigi_core::{Energy, Hit, Pulse, Time};

/// Trait for per-channel clustering algorithms.
pub trait ChannelClusterer {
    /// Reduces one channel's time-sorted hits to pulses.
    fn cluster(&self, hits: &[Hit], threshold: Energy) -> Vec<Pulse>;

    /// Returns the name of the algorithm.
    fn name(&self) -> &'static str;
}

/// One window opened during a scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowScan {
    /// Index of the hit that opened the window.
    pub start: usize,
    /// Number of hits in the window.
    pub len: usize,
    /// Offset within the window of the hit at which the threshold was reached.
    pub crossing: Option<usize>,
    /// Energy summed over the whole window.
    pub sum: Energy,
    /// Number of hits consumed before the next window opens.
    pub advance: usize,
}

impl WindowScan {
    /// Returns true if this window produced a pulse.
    #[must_use]
    pub fn emitted(&self) -> bool {
        self.crossing.is_some()
    }
}

/// The windowed threshold clusterer.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedThresholdClusterer {
    spacing: Time,
    energy_field: EnergyField,
    window_bound: WindowBound,
    consume: ConsumePolicy,
}

impl Default for WindowedThresholdClusterer {
    fn default() -> Self {
        Self::new(Time::from_ns(20.0))
    }
}

impl WindowedThresholdClusterer {
    /// Creates a clusterer with the given window spacing and default options.
    #[must_use]
    pub fn new(spacing: Time) -> Self {
        Self {
            spacing,
            energy_field: EnergyField::default(),
            window_bound: WindowBound::default(),
            consume: ConsumePolicy::default(),
        }
    }

    /// Sets the energy field that is accumulated.
    #[must_use]
    pub fn with_energy_field(mut self, energy_field: EnergyField) -> Self {
        self.energy_field = energy_field;
        self
    }

    /// Sets whether the window's upper bound is inclusive.
    #[must_use]
    pub fn with_window_bound(mut self, window_bound: WindowBound) -> Self {
        self.window_bound = window_bound;
        self
    }

    /// Sets how many hits an emitted pulse consumes.
    #[must_use]
    pub fn with_consume(mut self, consume: ConsumePolicy) -> Self {
        self.consume = consume;
        self
    }

    /// Returns the window spacing.
    #[must_use]
    pub fn spacing(&self) -> Time {
        self.spacing
    }

    #[inline]
    fn energy(&self, hit: &Hit) -> Energy {
        match self.energy_field {
            EnergyField::Deposit => hit.deposit,
            EnergyField::E => hit.momentum.e,
        }
    }

    #[inline]
    fn in_window(&self, t0: Time, t: Time) -> bool {
        let end = t0 + self.spacing;
        match self.window_bound {
            WindowBound::Inclusive => t <= end,
            WindowBound::Exclusive => t < end,
        }
    }

    /// Opens the window starting at `start`, which must index into `hits`.
    /// The starting hit always belongs to its own window.
    fn open_window(&self, hits: &[Hit], start: usize, threshold: Energy) -> WindowScan {
        let t0 = hits[start].time;
        let len = 1 + hits[start + 1..]
            .iter()
            .take_while(|hit| self.in_window(t0, hit.time))
            .count();

        let mut sum = Energy::ZERO;
        let mut crossing = None;
        for (offset, hit) in hits[start..start + len].iter().enumerate() {
            sum += self.energy(hit);
            if crossing.is_none() && sum >= threshold {
                crossing = Some(offset);
            }
        }

        let advance = match (crossing, self.consume) {
            (None, _) => 1,
            (Some(_), ConsumePolicy::Window) => len,
            (Some(offset), ConsumePolicy::Prefix) => offset + 1,
        };

        WindowScan {
            start,
            len,
            crossing,
            sum,
            advance,
        }
    }

    /// Returns every window opened while clustering `hits`, in order.
    #[must_use]
    pub fn scan(&self, hits: &[Hit], threshold: Energy) -> Vec<WindowScan> {
        let mut windows = Vec::new();
        let mut cursor = 0;
        while cursor < hits.len() {
            let window = self.open_window(hits, cursor, threshold);
            cursor += window.advance;
            windows.push(window);
        }
        windows
    }
}

impl ChannelClusterer for WindowedThresholdClusterer {
    fn cluster(&self, hits: &[Hit], threshold: Energy) -> Vec<Pulse> {
        self.scan(hits, threshold)
            .into_iter()
            .filter_map(|window| {
                let offset = window.crossing?;
                Some(Pulse {
                    deposit: window.sum,
                    time: hits[window.start].time,
                    ..hits[window.start + offset]
                })
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "windowed-threshold"
    }
}
