//! Output sinks for `print` and import diagnostics.
//!
//! A sink writes to stdout or stderr, captures into a buffer (embedding and
//! tests), or discards everything. Enum dispatch keeps the hot `print` path
//! free of vtable calls.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

pub enum OutputSink {
    Stdout,
    Stderr,
    /// Captures everything written for later inspection.
    Buffer(Mutex<String>),
    Silent,
}

impl OutputSink {
    /// Write `text` followed by a newline.
    pub fn println(&self, text: &str) {
        match self {
            Self::Stdout => println!("{text}"),
            Self::Stderr => eprintln!("{text}"),
            Self::Buffer(buf) => {
                let mut buf = buf.lock();
                buf.push_str(text);
                buf.push('\n');
            }
            Self::Silent => {}
        }
    }

    /// Write `text` as is.
    pub fn print(&self, text: &str) {
        match self {
            Self::Stdout => {
                let mut out = std::io::stdout().lock();
                // A closed stdout is not the program's problem.
                let _ = out.write_all(text.as_bytes());
                let _ = out.flush();
            }
            Self::Stderr => eprint!("{text}"),
            Self::Buffer(buf) => buf.lock().push_str(text),
            Self::Silent => {}
        }
    }

    /// Captured output; empty for sinks that do not capture.
    pub fn get_output(&self) -> String {
        match self {
            Self::Buffer(buf) => buf.lock().clone(),
            Self::Stdout | Self::Stderr | Self::Silent => String::new(),
        }
    }

    pub fn clear(&self) {
        if let Self::Buffer(buf) = self {
            buf.lock().clear();
        }
    }
}

/// Sink shared between the runtime and its hosts.
pub type SharedOutput = Arc<OutputSink>;

pub fn stdout_sink() -> SharedOutput {
    Arc::new(OutputSink::Stdout)
}

pub fn stderr_sink() -> SharedOutput {
    Arc::new(OutputSink::Stderr)
}

pub fn buffer_sink() -> SharedOutput {
    Arc::new(OutputSink::Buffer(Mutex::new(String::new())))
}

pub fn silent_sink() -> SharedOutput {
    Arc::new(OutputSink::Silent)
}

#[cfg(test)]
mod tests;
