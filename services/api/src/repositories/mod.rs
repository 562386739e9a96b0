//! Repositories for database operations

pub mod community;
pub mod friend_request;
pub mod friendship;
pub mod product;
pub mod user;

pub use community::CommunityRepository;
pub use friend_request::FriendRequestRepository;
pub use friendship::FriendshipRepository;
pub use product::ProductRepository;
pub use user::UserRepository;
