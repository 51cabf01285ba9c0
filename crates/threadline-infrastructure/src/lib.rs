//! Infrastructure layer for Threadline.
//!
//! Implements the capability traits of `threadline-core`: versioned
//! snapshot persistence, blob stores, credential tiers, configuration
//! loading, reference data clients, and the delayed mock back end.

pub mod config_service;
pub mod countries;
pub mod credential_store;
pub mod dto;
pub mod mock;
pub mod paths;
pub mod snapshot_repository;
pub mod storage;

pub use config_service::ConfigService;
pub use countries::{RestCountriesService, StaticCountryService};
pub use credential_store::TieredCredentialStore;
pub use mock::{MockDeleteService, MockOtpService, MockReplyService, MockThreadSource};
pub use paths::ThreadlinePaths;
pub use snapshot_repository::BlobSnapshotRepository;
pub use storage::{FileBlobStore, MemoryBlobStore};
