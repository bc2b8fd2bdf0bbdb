use edge_capture::record::{self, ParseError, Record};
use edge_capture::DropMonitor;

/// What a received line turned out to be.
#[derive(Debug, PartialEq)]
pub enum Line<'a> {
    Comment(&'a str),
    Header,
    Heartbeat,
    Record(Record),
    /// End of a logging run.
    Summary(RunSummary),
    Malformed(&'a str, ParseError),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub records: u32,
    /// Drops between the start of the run and its last record.
    pub dropped: u32,
}

/// Follows the log across runs.
#[derive(Default)]
pub struct Session {
    records: u32,
    drops: Option<DropMonitor>,
}

impl Session {
    pub fn handle<'a>(&mut self, line: &'a str) -> Line<'a> {
        let line = line.trim_end_matches(&['\r', '\n'][..]);

        if line == record::STOP {
            return Line::Summary(self.finish());
        }
        if line == record::START {
            self.finish();
            return Line::Comment(line);
        }
        if let Some(dropped) = record::parse_dropped(line) {
            self.drops = Some(DropMonitor::starting_at(dropped));
            return Line::Comment(line);
        }
        if line.starts_with('#') {
            return Line::Comment(line);
        }
        if line == record::HEADER {
            return Line::Header;
        }
        if line == record::HEARTBEAT {
            return Line::Heartbeat;
        }

        match line.parse::<Record>() {
            Ok(record) => {
                self.records += 1;
                self.drops
                    .get_or_insert_with(|| DropMonitor::starting_at(record.dropped))
                    .observe(record.dropped);
                Line::Record(record)
            }
            Err(e) => Line::Malformed(line, e),
        }
    }

    fn finish(&mut self) -> RunSummary {
        let summary = RunSummary {
            records: self.records,
            dropped: self.drops.as_ref().map_or(0, DropMonitor::total),
        };
        self.records = 0;
        self.drops = None;
        summary
    }
}

/// Longest line kept, well above the longest record or banner line.
const MAX_LINE: usize = 256;

/// A line taken off the byte stream.
#[derive(Debug, PartialEq)]
pub enum Assembled {
    Line(String),
    /// No line ending within `MAX_LINE` bytes; holds the bytes kept.
    Overlong(String),
}

impl Assembled {
    pub fn classify<'a>(&'a self, session: &mut Session) -> Line<'a> {
        match self {
            Assembled::Line(text) => session.handle(text),
            Assembled::Overlong(text) => Line::Malformed(text, ParseError::LineTooLong),
        }
    }
}

/// Splits the byte stream into lines; a line may span several reads.
#[derive(Default)]
pub struct LineAssembler {
    pending: Vec<u8>,
    overlong: bool,
}

impl LineAssembler {
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Assembled> {
        let mut lines = Vec::new();
        for &byte in bytes {
            if byte == b'\n' {
                let text = String::from_utf8_lossy(&self.pending)
                    .trim_end_matches('\r')
                    .to_string();
                lines.push(if self.overlong {
                    Assembled::Overlong(text)
                } else {
                    Assembled::Line(text)
                });
                self.pending.clear();
                self.overlong = false;
            } else if self.pending.len() < MAX_LINE {
                self.pending.push(byte);
            } else {
                self.overlong = true;
            }
        }
        lines
    }
}
