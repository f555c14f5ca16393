pub mod comments;
pub mod follows;
pub mod identities;
pub mod likes;
pub mod memory;
pub mod posts;
pub mod traits;

pub use comments::PostgresCommentRepository;
pub use follows::PostgresFollowRepository;
pub use identities::PostgresIdentityDirectory;
pub use likes::PostgresLikeRepository;
pub use memory::MemoryStore;
pub use posts::PostgresPostRepository;
pub use traits::{
    CommentRepository, FollowRepository, IdentityDirectory, LikeRepository, PostRepository,
};
