//! Core module - storage, session, configuration and project discovery

pub mod config;
pub mod error;
pub mod project;
pub mod reconcile;
pub mod session;
pub mod store;

pub use config::Config;
pub use error::{StoreError, StoreResult};
pub use project::{Project, ProjectError};
pub use reconcile::AssociationDiff;
pub use session::{Session, UserId};
pub use store::{AuditTrail, PartRepository, ProductRepository, Store};
