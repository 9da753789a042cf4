// vandalwatch: vandalism alerts for Danbooru edits, posted to Discord
//
// This is the library root. Each module corresponds to a major subsystem
// of the watcher.

pub mod config;
pub mod danbooru;
pub mod discord;
pub mod error;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod vandalism;
