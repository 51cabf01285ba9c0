//! Data Transfer Objects (DTOs) for persistence.
//!
//! DTOs carry the on-disk shape of domain entities and are versioned with
//! version-migrate, so new fields can be added without breaking restore of
//! older snapshots.

mod thread;

pub use thread::{
    MessageV1_0_0, THREAD_SNAPSHOT_ENTITY, ThreadSnapshotV1_0_0, ThreadV1_0_0,
    create_thread_snapshot_migrator,
};
