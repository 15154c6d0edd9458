//! Periodic liveness probe cadence.

/// Tick counter deciding when a probe is due.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Liveness {
    period: u32,
    counter: u32,
}

impl Liveness {
    /// Probe every `period` ticks, starting with the first one.
    ///
    /// A period of zero is treated as one.
    pub fn new(period: u32) -> Self {
        Liveness {
            period: period.max(1),
            counter: 0,
        }
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    /// Advance one scheduler tick, returning whether a probe is due.
    pub fn tick(&mut self) -> bool {
        let due = self.counter % self.period == 0;
        self.counter = (self.counter + 1) % self.period;

        due
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Liveness::new(crate::LIVENESS_PERIOD)
    }
}
