//! Linkcart API models

pub mod message;
pub mod product;
pub mod social;
pub mod user;

// Re-export for convenience
pub use message::{CommunityMessage, CommunityMessageView};
pub use product::{NewProduct, Product, ProductChanges, ProductFilter, ProductSort, ProductView};
pub use social::{FriendRequest, FriendSummary, Friendship, canonical_pair};
pub use user::{NewUser, User};
