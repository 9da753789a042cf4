// Long-running pipeline: the watch loop that drives the scanner.

pub mod watch;
