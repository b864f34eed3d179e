pub mod channel_feed;
pub mod sqlite_writer;

pub use channel_feed::ChannelFeed;
pub use sqlite_writer::SqliteReplicatedWriter;
