//! Text records written to the serial log.
//!
//! ```text
//! # validation-logger
//! # TICK_HZ=84000000
//! ...
//! # START
//! # DROPPED=0
//! ticks,edge,dt_ticks,dropped
//! 100,R,0,0
//! 150,F,50,0
//! ```

use arrayvec::ArrayString;
use core::fmt;
use core::str::FromStr;

use crate::event::{CaptureEvent, Edge};

pub const HEADER: &str = "ticks,edge,dt_ticks,dropped";
pub const START: &str = "# START";
pub const STOP: &str = "# STOP";
/// Drop counter at the start of a run, the baseline for the `dropped` column.
pub const DROPPED: &str = "# DROPPED=";
pub const HEARTBEAT: &str = "alive";

/// Fits the longest record plus line ending.
pub type RecordLine = ArrayString<[u8; 40]>;
/// Fits a whole [`RunStart`].
pub type BannerText = ArrayString<[u8; 192]>;

/// One event as printed, with the interval to the previous one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub ticks: u32,
    pub edge: Edge,
    pub dt: u32,
    pub dropped: u16,
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.ticks,
            self.edge.as_char(),
            self.dt,
            self.dropped
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    MissingField(&'static str),
    InvalidNumber(&'static str),
    InvalidEdge,
    TrailingData,
    LineTooLong,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingField(name) => write!(f, "missing field `{}`", name),
            ParseError::InvalidNumber(name) => write!(f, "field `{}` is not a number", name),
            ParseError::InvalidEdge => f.write_str("edge must be `R` or `F`"),
            ParseError::TrailingData => f.write_str("unexpected data after `dropped`"),
            ParseError::LineTooLong => f.write_str("line too long"),
        }
    }
}

fn number<T: FromStr>(field: Option<&str>, name: &'static str) -> Result<T, ParseError> {
    field
        .ok_or(ParseError::MissingField(name))?
        .parse()
        .map_err(|_| ParseError::InvalidNumber(name))
}

impl FromStr for Record {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut fields = line.trim_end_matches(|c: char| c == '\r' || c == '\n').split(',');

        let ticks = number(fields.next(), "ticks")?;

        let edge = fields.next().ok_or(ParseError::MissingField("edge"))?;
        let mut letters = edge.chars();
        let edge = match (letters.next(), letters.next()) {
            (Some(c), None) => Edge::from_char(c).ok_or(ParseError::InvalidEdge)?,
            _ => return Err(ParseError::InvalidEdge),
        };

        let dt = number(fields.next(), "dt_ticks")?;
        let dropped = number(fields.next(), "dropped")?;
        if fields.next().is_some() {
            return Err(ParseError::TrailingData);
        }

        Ok(Record {
            ticks,
            edge,
            dt,
            dropped,
        })
    }
}

/// Turns popped events into records, tracking the interval between them.
#[derive(Default)]
pub struct DeltaTracker {
    last: Option<u32>,
}

impl DeltaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new run; the next record gets `dt == 0`.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn record(&mut self, event: CaptureEvent, dropped: u16) -> Record {
        let dt = self
            .last
            .map_or(0, |last| event.ticks.wrapping_sub(last));
        self.last = Some(event.ticks);
        Record {
            ticks: event.ticks,
            edge: event.edge,
            dt,
            dropped,
        }
    }
}

/// Self-describing preamble of a logging run.
pub struct Banner {
    pub tick_hz: u32,
    pub noise_filter: bool,
    pub capacity: usize,
}

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("# validation-logger\r\n")?;
        write!(f, "# TICK_HZ={}\r\n", self.tick_hz)?;
        f.write_str("# TIMER_PRESCALER=1\r\n")?;
        let filter = if self.noise_filter { "ON" } else { "OFF" };
        write!(f, "# NOISE_FILTER={}\r\n", filter)?;
        write!(f, "# CAPTURE_BUFFER_SIZE={}\r\n", self.capacity)?;
        f.write_str("# ---\r\n")
    }
}

/// Everything written when logging starts: banner, start marker, drop
/// baseline and column header.
pub struct RunStart<'a> {
    pub banner: &'a Banner,
    pub dropped: u16,
}

impl fmt::Display for RunStart<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.banner)?;
        write!(f, "{}\r\n", START)?;
        write!(f, "{}{}\r\n", DROPPED, self.dropped)?;
        write!(f, "{}\r\n", HEADER)
    }
}

/// The drop baseline carried by a `# DROPPED=` line.
pub fn parse_dropped(line: &str) -> Option<u16> {
    let value = line.strip_prefix(DROPPED)?;
    value.trim_end_matches(|c: char| c == '\r' || c == '\n').parse().ok()
}
