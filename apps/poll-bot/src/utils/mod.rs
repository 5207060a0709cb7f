pub mod color;
pub mod duration;
pub mod embeds;
pub mod emojis;
pub mod permissions;
