/// Widens successive readings of the 16-bit drop counter into a run total.
///
/// Correct as long as fewer than 65536 events are dropped between two
/// observations.
#[derive(Default)]
pub struct DropMonitor {
    last: u16,
    total: u32,
}

impl DropMonitor {
    /// Begin counting from the current counter reading.
    pub fn starting_at(count: u16) -> Self {
        DropMonitor {
            last: count,
            total: 0,
        }
    }

    /// Feed a counter reading; returns the events lost since the previous one.
    pub fn observe(&mut self, count: u16) -> u16 {
        let lost = count.wrapping_sub(self.last);
        self.last = count;
        self.total = self.total.saturating_add(u32::from(lost));
        lost
    }

    pub fn total(&self) -> u32 {
        self.total
    }
}
