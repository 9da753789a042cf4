// Danbooru API: the moderation feed the watcher polls.
//
// `traits` is the seam the scanner depends on; `client` is the reqwest
// implementation; `models` holds the deserialized payloads.

pub mod client;
pub mod models;
pub mod rate_limiter;
pub mod traits;
