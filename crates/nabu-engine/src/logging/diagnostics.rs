use crate::hal::{DiagnosticsSink, Severity};

/// Forwards GPU validation messages to the `log` facade.
#[derive(Debug, Default, Copy, Clone)]
pub struct LogDiagnostics;

impl LogDiagnostics {
    fn level(severity: Severity) -> log::Level {
        match severity {
            Severity::Corruption | Severity::Error => log::Level::Error,
            Severity::Warning => log::Level::Warn,
            Severity::Info => log::Level::Info,
            Severity::Message => log::Level::Debug,
        }
    }
}

impl DiagnosticsSink for LogDiagnostics {
    fn on_message(&self, severity: Severity, message: &str) {
        log::log!(target: "nabu_engine::gpu", Self::level(severity), "[{severity:?}] {message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severities_map_to_levels() {
        assert_eq!(LogDiagnostics::level(Severity::Corruption), log::Level::Error);
        assert_eq!(LogDiagnostics::level(Severity::Error), log::Level::Error);
        assert_eq!(LogDiagnostics::level(Severity::Warning), log::Level::Warn);
        assert_eq!(LogDiagnostics::level(Severity::Info), log::Level::Info);
        assert_eq!(LogDiagnostics::level(Severity::Message), log::Level::Debug);
    }
}
