use cookmode_core::{format_remaining, AlertError, AlertSink, AlertsConfig, TimerAlert};

/// Prints completions to stderr, optionally ringing the terminal bell.
#[derive(Debug, Clone)]
pub struct TerminalAlertSink {
    config: AlertsConfig,
}

impl TerminalAlertSink {
    pub fn new(config: AlertsConfig) -> Self {
        Self { config }
    }
}

impl AlertSink for TerminalAlertSink {
    fn timer_completed(&self, alert: &TimerAlert) -> Result<(), AlertError> {
        if !self.config.enabled {
            tracing::debug!(step_key = alert.step_key, "alerts disabled, completion not shown");
            return Ok(());
        }
        let bell = if self.config.bell { "\x07" } else { "" };
        eprintln!(
            "{bell}[{}] {} ({})",
            alert.title(),
            alert.instruction,
            format_remaining(alert.duration_secs)
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn disabled_alerts_are_not_an_error() {
        let sink = TerminalAlertSink::new(AlertsConfig {
            enabled: false,
            ..AlertsConfig::default()
        });
        let alert = TimerAlert {
            step_key: 1,
            instruction: "Boil the eggs".into(),
            duration_secs: 390,
            completed_at: Utc::now(),
        };
        assert!(sink.timer_completed(&alert).is_ok());
    }
}
