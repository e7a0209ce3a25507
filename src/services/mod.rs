pub mod cleanup;
#[cfg(feature = "gallery")]
pub mod gallery;
pub mod layout;
pub mod registry;
pub mod selection;
pub mod session;
