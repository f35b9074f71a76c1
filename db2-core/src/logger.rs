use crate::db2::Db2Value;
use log::LevelFilter;
use std::time::{Duration, Instant};

const TARGET: &str = "db2::query";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LogSettings {
    pub(crate) statements_level: LevelFilter,
    pub(crate) slow_statements_level: LevelFilter,
    pub(crate) slow_statements_duration: Duration,
}

impl Default for LogSettings {
    fn default() -> Self {
        LogSettings {
            statements_level: LevelFilter::Info,
            slow_statements_level: LevelFilter::Warn,
            slow_statements_duration: Duration::from_secs(1),
        }
    }
}

impl LogSettings {
    pub(crate) fn log_statements(&mut self, level: LevelFilter) {
        self.statements_level = level;
    }
    pub(crate) fn log_slow_statements(&mut self, level: LevelFilter, duration: Duration) {
        self.slow_statements_level = level;
        self.slow_statements_duration = duration;
    }
}

/// Logs one executed statement when dropped.
pub(crate) struct QueryLogger<'q> {
    sql: &'q str,
    params: Option<String>,
    rows_returned: u64,
    rows_affected: u64,
    failed: bool,
    start: Instant,
    settings: &'q LogSettings,
}

impl<'q> QueryLogger<'q> {
    pub(crate) fn new(sql: &'q str, params: &[Db2Value], settings: &'q LogSettings) -> Self {
        // bind values may hold secrets; they are only rendered at trace level
        let params = log::log_enabled!(target: TARGET, log::Level::Trace)
            .then(|| format!("{:?}", params));

        Self {
            sql,
            params,
            rows_returned: 0,
            rows_affected: 0,
            failed: false,
            start: Instant::now(),
            settings,
        }
    }

    pub(crate) fn increase_rows_returned(&mut self, n: u64) {
        self.rows_returned += n;
    }

    pub(crate) fn increase_rows_affected(&mut self, n: u64) {
        self.rows_affected += n;
    }

    pub(crate) fn set_failed(&mut self) {
        self.failed = true;
    }

    pub(crate) fn finish(&self) {
        let elapsed = self.start.elapsed();

        let lvl = if elapsed >= self.settings.slow_statements_duration {
            self.settings.slow_statements_level
        } else {
            self.settings.statements_level
        };

        if let Some(lvl) = lvl
            .to_level()
            .filter(|lvl| log::log_enabled!(target: TARGET, *lvl))
        {
            let mut summary = parse_query_summary(self.sql);

            let sql = if summary != self.sql {
                summary.push_str(" …");
                format!("\n\n{}\n", self.sql)
            } else {
                String::new()
            };

            let outcome = if self.failed { "failed; " } else { "" };

            log::logger().log(
                &log::Record::builder()
                    .args(format_args!(
                        "{}; {}rows affected: {}, rows returned: {}, elapsed: {:.3?}{}",
                        summary, outcome, self.rows_affected, self.rows_returned, elapsed, sql
                    ))
                    .level(lvl)
                    .module_path_static(Some(TARGET))
                    .target(TARGET)
                    .build(),
            );
        }

        if let Some(params) = &self.params {
            log::trace!(target: TARGET, "params: {}", params);
        }
    }
}

impl<'q> Drop for QueryLogger<'q> {
    fn drop(&mut self) {
        self.finish();
    }
}

fn parse_query_summary(sql: &str) -> String {
    // For now, just take the first 4 words
    sql.split_whitespace()
        .take(4)
        .collect::<Vec<&str>>()
        .join(" ")
}
