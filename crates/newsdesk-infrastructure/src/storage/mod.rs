//! Credential storage backends.

mod credential_file;
mod memory;

pub use credential_file::FileCredentialStore;
pub use memory::MemoryCredentialStore;
