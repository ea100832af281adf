#![crate_name = "agires"]

//! Reader for the resource archives of AGI adventure games.
//!
//! A [`ResourceStore`] opens a game directory described by a [`GameDescriptor`], indexes
//! its volumes and hands out unpacked logic, picture, view and sound resources. The
//! [`picture`] and [`logic`] modules decode the two bytecode formats.

#[macro_use]
extern crate lazy_static;

pub mod binary;
pub mod crypt;
pub mod error;
pub mod game;
pub mod logic;
pub mod lzw;
pub mod pic_expand;
pub mod picture;
pub mod resource;
pub mod storage;
pub mod store;
pub mod volume;

#[cfg(test)]
mod test_utils;

pub use error::{ResourceError, ResourceResult};
pub use game::{ArchiveVersion, GameDescriptor};
pub use resource::ResourceKind;
pub use storage::{DirectoryStorage, FileAccess, MemoryStorage};
pub use store::{DirectoryLayout, ResourceStore};
pub use volume::{VolumeIndex, VolumeIndexEntry};
