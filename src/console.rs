use std::sync::{Mutex, PoisonError};

/// Diagnostic output injected into the cascade.
pub trait LogSink: Send + Sync {
	fn log(&self, message: &str);

	/// Callers skip building messages when this is false.
	fn enabled(&self) -> bool {
		true
	}
}

/// Keeps lines in memory, like an in-game console panel.
#[derive(Debug, Default)]
pub struct ConsoleLog {
	verbose: bool,
	lines: Mutex<Vec<String>>,
}

impl ConsoleLog {
	pub fn new(verbose: bool) -> Self {
		Self { verbose, lines: Mutex::new(Vec::new()) }
	}

	pub fn lines(&self) -> Vec<String> {
		self.lines.lock().unwrap_or_else(PoisonError::into_inner).clone()
	}

	pub fn contains(&self, needle: &str) -> bool {
		self.lines
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.iter()
			.any(|l| l.contains(needle))
	}

	pub fn clear(&self) {
		self.lines.lock().unwrap_or_else(PoisonError::into_inner).clear();
	}
}

impl LogSink for ConsoleLog {
	fn log(&self, message: &str) {
		if self.verbose {
			self.lines
				.lock()
				.unwrap_or_else(PoisonError::into_inner)
				.push(message.to_string());
		}
	}

	fn enabled(&self) -> bool {
		self.verbose
	}
}

#[derive(Debug, Clone)]
pub struct StderrLog {
	prefix: String,
}

impl StderrLog {
	pub fn new(prefix: impl Into<String>) -> Self {
		Self { prefix: prefix.into() }
	}
}

impl LogSink for StderrLog {
	fn log(&self, message: &str) {
		eprintln!("[{}] {}", self.prefix, message);
	}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SilentLog;

impl LogSink for SilentLog {
	fn log(&self, _message: &str) {}

	fn enabled(&self) -> bool {
		false
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn console_keeps_lines_only_when_verbose() {
		let quiet = ConsoleLog::new(false);
		quiet.log("hidden");
		assert!(quiet.lines().is_empty());
		assert!(!quiet.enabled());

		let loud = ConsoleLog::new(true);
		loud.log("Clicked (0 0)");
		assert!(loud.contains("Clicked"));
		loud.clear();
		assert!(loud.lines().is_empty());
	}

	#[test]
	fn silent_is_disabled() {
		assert!(!SilentLog.enabled());
		assert!(StderrLog::new("Grid").enabled());
	}
}
