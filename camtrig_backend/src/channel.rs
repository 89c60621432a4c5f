//! Digital output line addressing for the trigger task.
//!
//! A [`TrigLine`] names one physical digital line on the NI card by its port
//! and line numbers, e.g. `port0/line0`. Full output terminals of the form
//! `/Dev3/port0/line0` (leading slash optional) can be split into a device
//! name and a line with [`parse_terminal`].

use regex::Regex;
use std::fmt;

/// One digital output line on an NI card, identified by port and line number.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TrigLine {
    pub port: usize,
    pub line: usize,
}

impl TrigLine {
    pub fn new(port: usize, line: usize) -> Self {
        Self { port, line }
    }

    /// Channel name relative to the device, e.g. `port0/line0`.
    pub fn physical_name(&self) -> String {
        format!("port{}/line{}", self.port, self.line)
    }
}

impl fmt::Display for TrigLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.physical_name())
    }
}

/// Splits a full output terminal such as `/Dev3/port0/line0` into the device
/// name and the line.
///
/// Panics on malformed terminals: line addressing is fixed at edit time, so a
/// name that does not match `device/port[number]/line[number]` is a caller
/// programming error rather than a runtime condition.
///
/// # Example
///
/// ```
/// use camtrig_backend::channel::parse_terminal;
///
/// let (dev, line) = parse_terminal("/Dev3/port0/line1");
/// assert_eq!(dev, "Dev3");
/// assert_eq!(line.physical_name(), "port0/line1");
/// ```
pub fn parse_terminal(terminal: &str) -> (String, TrigLine) {
    let re = Regex::new(r"^/?([^/]+)/port(\d+)/line(\d+)$").unwrap();
    let caps = re.captures(terminal).unwrap_or_else(|| {
        panic!(
            "Terminal {} should be of the form /device/port[number]/line[number]",
            terminal
        )
    });
    let device = caps[1].to_string();
    let port = caps[2].parse::<usize>().unwrap();
    let line = caps[3].parse::<usize>().unwrap();
    (device, TrigLine::new(port, line))
}
