//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the core components and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod cipher;
pub mod credential_repo;
pub mod state_repo;

pub use cipher::TokenCipher;
pub use credential_repo::CredentialRepository;
pub use state_repo::StateRepository;
