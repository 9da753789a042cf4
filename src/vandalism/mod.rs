// Vandalism detection: the rules, the per-feed cursor, and the scanner that
// ties them to the feed and the alert sink.

pub mod alerts;
pub mod classifier;
pub mod cursor;
pub mod scanner;
pub mod trust;
