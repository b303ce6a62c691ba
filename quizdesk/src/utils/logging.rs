use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

/// Events kept by [`init_tracing`]'s buffer
pub const DEFAULT_CAPACITY: usize = 1000;

/// Target used when a formatted line carries none
const UNTARGETED: &str = "quizdesk";

/// One formatted tracing event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
    pub at: DateTime<Local>,
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl CapturedEvent {
    pub fn now(level: Level, target: &str, message: impl Into<String>) -> Self {
        Self {
            at: Local::now(),
            level,
            target: target.to_string(),
            message: message.into(),
        }
    }

    pub fn format_for_display(&self) -> String {
        format!(
            "{} {:>5} {}: {}",
            self.at.format("%H:%M:%S%.3f"),
            self.level,
            self.target,
            self.message
        )
    }
}

/// Bounded, shareable store of the most recent events
#[derive(Clone)]
pub struct EventLog {
    capacity: usize,
    events: Arc<Mutex<VecDeque<CapturedEvent>>>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl EventLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            events: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.max(1)))),
        }
    }

    // A panic while holding the lock leaves the events usable
    fn events(&self) -> MutexGuard<'_, VecDeque<CapturedEvent>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn record(&self, event: CapturedEvent) {
        let mut events = self.events();
        while events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// Up to `count` of the newest events, oldest first
    pub fn recent(&self, count: usize) -> Vec<CapturedEvent> {
        let events = self.events();
        let skip = events.len().saturating_sub(count);
        events.iter().skip(skip).cloned().collect()
    }

    /// Events from one target (`table`, `actions`, `service`, `config`)
    pub fn for_target(&self, target: &str) -> Vec<CapturedEvent> {
        self.events()
            .iter()
            .filter(|e| e.target == target)
            .cloned()
            .collect()
    }

    /// Events at `level` or more severe
    pub fn at_least(&self, level: Level) -> Vec<CapturedEvent> {
        // tracing orders ERROR < WARN < INFO < DEBUG < TRACE
        self.events()
            .iter()
            .filter(|e| e.level <= level)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.events().clear();
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events().is_empty()
    }
}

/// Split a compact line, `LEVEL target: message`
fn split_line(line: &str) -> (Level, &str, &str) {
    let (head, rest) = line.split_once(' ').unwrap_or((line, ""));
    let Ok(level) = head.parse::<Level>() else {
        return (Level::INFO, UNTARGETED, line);
    };
    let rest = rest.trim_start();

    match rest.split_once(':') {
        Some((target, message)) if !target.is_empty() && !target.contains(' ') => {
            (level, target, message.trim())
        }
        _ => (level, UNTARGETED, rest),
    }
}

/// `MakeWriter` feeding formatted output into an [`EventLog`]
#[derive(Clone)]
pub struct EventLogWriter {
    log: EventLog,
}

impl EventLogWriter {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }
}

impl Write for EventLogWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let (level, target, message) = split_line(line);
            self.log.record(CapturedEvent::now(level, target, message));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for EventLogWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

static EVENT_LOG: OnceLock<EventLog> = OnceLock::new();

/// Install the tracing subscriber that records into the global event log.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`. Calling this more
/// than once keeps the first subscriber.
pub fn init_tracing() -> EventLog {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let log = EVENT_LOG.get_or_init(EventLog::default).clone();

    let layer = fmt::layer()
        .with_writer(EventLogWriter::new(log.clone()))
        .with_ansi(false)
        .without_time()
        .compact();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .is_ok()
    {
        tracing::debug!(target: "quizdesk", "tracing installed");
    }

    log
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_keeps_only_newest_events() {
        let log = EventLog::with_capacity(3);
        for i in 0..5 {
            log.record(CapturedEvent::now(Level::INFO, "table", format!("sort {}", i)));
        }
        assert_eq!(log.len(), 3);

        let messages: Vec<String> = log.recent(2).into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["sort 3", "sort 4"]);

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_writer_splits_level_and_target() {
        let log = EventLog::default();
        let mut writer = EventLogWriter::new(log.clone());
        writer
            .write_all(b" INFO table: Sorting 'studentsTable' by 'name'\n")
            .unwrap();
        writer.write_all(b"WARN request failed: timeout\n").unwrap();
        writer.write_all(b"plain line\n").unwrap();

        let events = log.recent(3);
        assert_eq!(events[0].level, Level::INFO);
        assert_eq!(events[0].target, "table");
        assert_eq!(events[0].message, "Sorting 'studentsTable' by 'name'");
        assert_eq!(events[1].level, Level::WARN);
        assert_eq!(events[1].target, UNTARGETED);
        assert_eq!(events[2].message, "plain line");
    }

    #[test]
    fn test_filters_by_target_and_severity() {
        let log = EventLog::default();
        log.record(CapturedEvent::now(Level::DEBUG, "table", "rebind"));
        log.record(CapturedEvent::now(Level::WARN, "actions", "Delete failed"));
        log.record(CapturedEvent::now(Level::ERROR, "service", "unreachable"));

        assert_eq!(log.for_target("actions").len(), 1);
        let severe: Vec<String> = log.at_least(Level::WARN).into_iter().map(|e| e.target).collect();
        assert_eq!(severe, vec!["actions", "service"]);
    }
}
