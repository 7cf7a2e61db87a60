//! Data model: addresses, groups, shards and prefectures

mod address;
mod directory;
mod prefecture;

pub use address::{shard_prefix, Address, AddressGroup, PREFIX_LEN};
pub use directory::Directory;
pub use prefecture::Prefecture;
