//! The causal event log
//!
//! A plain-text sink for external log tooling. The first line names the
//! fields (a ShiViz-compatible regex), then every entry is one line:
//!
//! ```text
//! {"actor1":2, "actor2":1} INFO actor1 module::path file.rs:42 "SEND ..."
//! ```
//!
//! The format is an external interface - preserve it exactly.

use std::fmt;
use std::io::{self, Write};

use parking_lot::Mutex;

use chrona_core::{ActorId, VectorTimestamp};

/// Field-name header consumed by log tooling. Only INFO entries match it.
const FIELD_HEADER: &str = r"(?<clock>{.+}) (?<level>INFO) (?<host>\w+\d+) (?<function>.+) (?<file>.+):(?<line>\d+) (?<event>.+)";

/// Severity of a log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        };
        f.write_str(name)
    }
}

/// A shared, mutex-guarded log sink.
///
/// The mutex only guards interleaved writes when several actors share one
/// sink; each actor's own calls are already serialized by its event loop.
pub struct EventLog {
    sink: Mutex<Box<dyn Write + Send>>,
}

impl EventLog {
    /// Wrap `sink`, writing the field-name header followed by a blank line.
    ///
    /// A sink that cannot take the header is a startup failure; after
    /// construction, write errors are only diagnostics.
    pub fn new(mut sink: Box<dyn Write + Send>) -> io::Result<Self> {
        writeln!(sink, "{FIELD_HEADER}\n")?;
        sink.flush()?;

        Ok(EventLog {
            sink: Mutex::new(sink),
        })
    }

    /// Write one entry. The header regex only admits INFO, so any other
    /// level is dropped with a diagnostic instead of being written.
    pub fn log(
        &self,
        stamp: &VectorTimestamp,
        level: Level,
        actor: ActorId,
        function: &str,
        file: &str,
        line: u32,
        message: fmt::Arguments<'_>,
    ) {
        if level != Level::Info {
            tracing::warn!(%level, "causal log only admits INFO entries");
            return;
        }

        let mut sink = self.sink.lock();
        let outcome = writeln!(
            sink,
            "{stamp} {level} {actor} {function} {file}:{line} \"{message}\""
        )
        .and_then(|_| sink.flush());

        if let Err(err) = outcome {
            tracing::warn!(%err, "causal log write failed");
        }
    }
}

/// Log an INFO entry with the call site captured.
#[macro_export]
macro_rules! log_info {
    ($log:expr, $stamp:expr, $actor:expr, $($arg:tt)+) => {
        $log.log(
            $stamp,
            $crate::Level::Info,
            $actor,
            module_path!(),
            file!(),
            line!(),
            format_args!($($arg)+),
        )
    };
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    /// A sink the test can read back after handing it to the log.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_header_is_written_once_at_construction() {
        let buf = SharedBuf::default();
        let _log = EventLog::new(Box::new(buf.clone())).unwrap();

        let contents = buf.contents();
        assert!(contents.starts_with("(?<clock>"));
        // Header line, blank line, nothing else yet.
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn test_entry_shape() {
        let buf = SharedBuf::default();
        let log = EventLog::new(Box::new(buf.clone())).unwrap();

        let stamp = VectorTimestamp::new(ActorId::new(1));
        log_info!(log, &stamp, ActorId::new(1), "SEND Client sent \"{}\" to server.", "GIEVTIMEPLX");

        let contents = buf.contents();
        let entry = contents.lines().last().unwrap();
        assert!(entry.starts_with("{\"actor1\":0} INFO actor1 "));
        assert!(entry.contains("log.rs:"));
        assert!(entry.ends_with("\"SEND Client sent \"GIEVTIMEPLX\" to server.\""));
    }

    #[test]
    fn test_non_info_entries_are_dropped() {
        let buf = SharedBuf::default();
        let log = EventLog::new(Box::new(buf.clone())).unwrap();

        let stamp = VectorTimestamp::new(ActorId::new(1));
        log.log(
            &stamp,
            Level::Warning,
            ActorId::new(1),
            module_path!(),
            file!(),
            line!(),
            format_args!("nope"),
        );

        assert_eq!(buf.contents().lines().count(), 2);
    }

    #[test]
    fn test_level_display() {
        assert_eq!(Level::Info.to_string(), "INFO");
        assert_eq!(Level::Critical.to_string(), "CRITICAL");
    }
}
