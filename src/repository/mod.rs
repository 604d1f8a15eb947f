//! Credential storage.
//!
//! Persistence is an external collaborator. The login and enrollment actions
//! reach it only through [`CredentialRepository`]; implement the trait over
//! your own database. [`InMemoryCredentialRepository`] backs tests and the
//! demo server.

mod credential;
mod memory;

pub use credential::{CredentialRecord, CredentialRepository, ManagerRef, NewCredential};
pub use memory::InMemoryCredentialRepository;
