// Discord side: rendering alerts and sending them.
//
// Alerts go out as plain embeds. Moderators reply or react in the channel;
// the bot holds no gateway or interactions connection, so it posts no
// buttons it could not answer.

pub mod client;
pub mod embed;
pub mod render;
pub mod traits;
