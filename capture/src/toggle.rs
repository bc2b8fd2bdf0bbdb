/// Change of the logging state requested by the button.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    Start,
    Stop,
}

impl Transition {
    fn opposite(self) -> Self {
        match self {
            Transition::Start => Transition::Stop,
            Transition::Stop => Transition::Start,
        }
    }
}

/// Transitions raised by the button and not yet acted upon, oldest first.
///
/// Transitions always alternate, so the oldest one and a count are enough.
pub struct Requests {
    oldest: Transition,
    count: u16,
}

impl Requests {
    pub const fn new() -> Self {
        Requests {
            oldest: Transition::Start,
            count: 0,
        }
    }

    pub fn push(&mut self, transition: Transition) {
        if self.count == 0 {
            self.oldest = transition;
        }
        self.count = self.count.saturating_add(1);
    }

    pub fn take(&mut self) -> Option<Transition> {
        if self.count == 0 {
            return None;
        }
        let transition = self.oldest;
        self.oldest = transition.opposite();
        self.count -= 1;
        Some(transition)
    }
}

impl Default for Requests {
    fn default() -> Self {
        Self::new()
    }
}

/// Press-to-toggle for an active-low push button, sampled at a fixed period.
///
/// A press is a released-to-pressed change of the sampled level. After a
/// press, further presses are ignored for `lockout` samples.
pub struct Toggle {
    logging: bool,
    was_pressed: bool,
    lockout: u16,
    remaining: u16,
}

impl Toggle {
    pub const fn new(lockout: u16) -> Self {
        Toggle {
            logging: false,
            was_pressed: false,
            lockout,
            remaining: 0,
        }
    }

    #[cfg(test)]
    fn logging(&self) -> bool {
        self.logging
    }

    /// Feed one sample; `pressed` is the button level (low pin).
    pub fn sample(&mut self, pressed: bool) -> Option<Transition> {
        let press = pressed && !self.was_pressed;
        self.was_pressed = pressed;

        if self.remaining > 0 {
            self.remaining -= 1;
            return None;
        }
        if !press {
            return None;
        }

        self.remaining = self.lockout;
        self.logging = !self.logging;
        Some(if self.logging {
            Transition::Start
        } else {
            Transition::Stop
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Requests, Toggle, Transition};

    #[test]
    fn press_starts_then_stops() {
        let mut toggle = Toggle::new(0);
        assert_eq!(toggle.sample(false), None);
        assert_eq!(toggle.sample(true), Some(Transition::Start));
        assert!(toggle.logging());
        assert_eq!(toggle.sample(true), None);
        assert_eq!(toggle.sample(false), None);
        assert_eq!(toggle.sample(true), Some(Transition::Stop));
        assert!(!toggle.logging());
    }

    #[test]
    fn holding_the_button_toggles_once() {
        let mut toggle = Toggle::new(2);
        assert_eq!(toggle.sample(true), Some(Transition::Start));
        for _ in 0..20 {
            assert_eq!(toggle.sample(true), None);
        }
        assert!(toggle.logging());
    }

    #[test]
    fn bounces_inside_lockout_are_ignored() {
        let mut toggle = Toggle::new(5);
        assert_eq!(toggle.sample(true), Some(Transition::Start));
        // contact bounce
        assert_eq!(toggle.sample(false), None);
        assert_eq!(toggle.sample(true), None);
        assert_eq!(toggle.sample(false), None);
        assert_eq!(toggle.sample(true), None);
        assert_eq!(toggle.sample(false), None);
        // lockout over, button released
        assert_eq!(toggle.sample(false), None);
        assert_eq!(toggle.sample(true), Some(Transition::Stop));
    }

    #[test]
    fn requests_are_taken_in_order() {
        let mut toggle = Toggle::new(0);
        let mut requests = Requests::new();
        assert_eq!(requests.take(), None);

        // start and stop both pressed before anyone looks
        for &pressed in &[true, false, true] {
            if let Some(transition) = toggle.sample(pressed) {
                requests.push(transition);
            }
        }
        assert_eq!(requests.take(), Some(Transition::Start));
        assert_eq!(requests.take(), Some(Transition::Stop));
        assert_eq!(requests.take(), None);

        requests.push(Transition::Start);
        assert_eq!(requests.take(), Some(Transition::Start));
        assert_eq!(requests.take(), None);
    }
}
