/// Polarity of a transition on the monitored input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Rising,
    Falling,
}

impl Edge {
    pub fn opposite(self) -> Self {
        match self {
            Edge::Rising => Edge::Falling,
            Edge::Falling => Edge::Rising,
        }
    }

    /// Single letter used in the serial record format.
    pub fn as_char(self) -> char {
        match self {
            Edge::Rising => 'R',
            Edge::Falling => 'F',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'R' => Some(Edge::Rising),
            'F' => Some(Edge::Falling),
            _ => None,
        }
    }
}

/// One captured edge with its extended timestamp.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureEvent {
    pub ticks: u32,
    pub edge: Edge,
}

impl CaptureEvent {
    pub const fn new(ticks: u32, edge: Edge) -> Self {
        CaptureEvent { ticks, edge }
    }
}
