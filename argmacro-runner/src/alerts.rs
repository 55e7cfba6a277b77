//! Alert sinks for the watcher.

use chrono::Local;
use std::sync::Mutex;

pub trait AlertSink: Send + Sync {
    fn send(&self, message: &str);
}

/// Logs at WARN and prints `[ALERT <timestamp>] <message>` to stdout.
pub struct ConsoleAlerts;

impl AlertSink for ConsoleAlerts {
    fn send(&self, message: &str) {
        tracing::warn!(alert = message, "alert raised");
        println!("[ALERT {}] {message}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    }
}

/// Keeps alerts in memory.
#[derive(Debug, Default)]
pub struct MemoryAlerts {
    messages: Mutex<Vec<String>>,
}

impl MemoryAlerts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl AlertSink for MemoryAlerts {
    fn send(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_keeps_order() {
        let sink = MemoryAlerts::new();
        sink.send("a");
        sink.send("b");
        assert_eq!(sink.messages(), vec!["a", "b"]);
    }
}
