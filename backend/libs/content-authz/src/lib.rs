//! Ownership-based authorization for posts and comments
//!
//! Decides whether an authenticated actor may read, update or delete a
//! resource, given the ownership chain already resolved by the caller.
//!
//! - `identity`: the acting user (id + role)
//! - `ownership`: ownership descriptors for posts and comments
//! - `policy`: the `AccessPolicy` trait and the default `OwnershipPolicy`
//! - `error`: `AccessError`, keeping "not found" and "unauthorized" apart
//!
//! Nothing in this crate performs I/O. Resolving a descriptor from storage is
//! the caller's job, and a missing resource must be reported as
//! `AccessError::NotFound` before any policy method is called.

mod decision;
mod error;
mod identity;
mod ownership;
mod policy;

pub use decision::Decision;
pub use error::AccessError;
pub use identity::{Identity, IdentityError, Role};
pub use ownership::{CommentOwnership, PostOwnership, ResourceKind};
pub use policy::{AccessPolicy, OwnershipPolicy};
