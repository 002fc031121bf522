use std::io::{self, Write};

use smswatch::config::Config;
use smswatch::logstore::RollingLogStore;

use crate::cli::LogsAction;

pub fn run(config: &Config, action: LogsAction) -> io::Result<()> {
    let store = RollingLogStore::from_config(&config.log);
    let mut out = io::stdout().lock();

    match action {
        LogsAction::Show => {
            let content = store.content();
            out.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                writeln!(out)?;
            }
        }
        LogsAction::Stats => {
            let stats = store.stats();
            writeln!(out, "path:       {}", store.path().display())?;
            writeln!(out, "size_bytes: {}", stats.size_bytes)?;
            writeln!(out, "lines:      {} / {}", stats.line_count, store.max_lines())?;
        }
        LogsAction::Clear => {
            store.clear();
            writeln!(out, "Cleared {}", store.path().display())?;
        }
        LogsAction::Append { level, tag, message } => {
            store.append(level, &tag, &message, None);
        }
    }
    Ok(())
}
