//! Platform abstraction layer
//!
//! Host collaborators the core talks to through traits:
//! - Storage (LocalStorage on web, JSON files on native)
//! - Headless physics body, audio source and widgets

pub mod headless;
pub mod storage;

pub use headless::{HeadlessSource, KinematicBody, ListRecorder, ScreenRecorder, TextLabel};
#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStore;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorageStore;
pub use storage::{KeyValueStore, MemoryStore, StorageError};
