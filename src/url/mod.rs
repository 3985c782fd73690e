//! URL handling module for Link-Weaver
//!
//! This module provides canonicalization (the identity of every URL row),
//! host extraction, and the rules for resolving an href relative to the
//! page it was found on.

mod canonical;
mod domain;
mod resolve;

// Re-export main functions
pub use canonical::canonicalize;
pub use domain::{domain_root, extract_host, folder_root, origin_of};
pub use resolve::{explicit_scheme, is_absolute_path, is_external, resolve_href, Resolution};
