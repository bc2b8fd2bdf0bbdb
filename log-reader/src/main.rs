mod session;

use chrono::Local;
use serialport::FlowControl;
use std::io::{ErrorKind, Read};
use std::time::Duration;

use session::{Assembled, Line, LineAssembler, Session};

const DEFAULT_PORT: &str = "/dev/ttyACM0";
const DEFAULT_BAUD: u32 = 115200;

fn main() {
    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| DEFAULT_PORT.to_string());
    let baud_rate = args
        .next()
        .and_then(|baud| baud.parse().ok())
        .unwrap_or(DEFAULT_BAUD);

    let mut settings = serialport::SerialPortSettings::default();
    settings.baud_rate = baud_rate;
    settings.timeout = Duration::from_millis(100);
    settings.flow_control = FlowControl::None;
    let mut port = match serialport::open_with_settings(&path, &settings) {
        Ok(port) => port,
        Err(e) => {
            eprintln!("cannot open {}: {}", path, e);
            std::process::exit(1);
        }
    };
    println!("# reading {} at {} baud", path, baud_rate);

    let mut session = Session::default();
    let mut lines = LineAssembler::default();
    let mut buffer = [0u8; 256];

    loop {
        let count = match port.read(&mut buffer) {
            Ok(count) => count,
            Err(ref e) if e.kind() == ErrorKind::TimedOut => continue,
            Err(e) => {
                eprintln!("read from {} failed: {}", path, e);
                break;
            }
        };

        let received = Local::now().format("%H:%M:%S%.3f");
        for assembled in lines.feed(&buffer[..count]) {
            if matches!(&assembled, Assembled::Line(text) if text.is_empty()) {
                continue;
            }
            match assembled.classify(&mut session) {
                Line::Record(record) => println!(
                    "{} {:>10} {} dt={:<10} dropped={}",
                    received,
                    record.ticks,
                    record.edge.as_char(),
                    record.dt,
                    record.dropped
                ),
                Line::Summary(summary) => println!(
                    "{} # STOP after {} records, {} events dropped",
                    received, summary.records, summary.dropped
                ),
                Line::Comment(comment) => println!("{} {}", received, comment),
                Line::Header => {}
                Line::Heartbeat => println!("{} alive", received),
                Line::Malformed(line, e) => eprintln!("{} skipping {:?}: {}", received, line, e),
            }
        }
    }
}
