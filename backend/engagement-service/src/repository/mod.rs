mod memory;
mod postgres;
mod traits;

pub use memory::InMemoryStore;
pub use postgres::PgStore;
pub use traits::{FeedStore, FriendshipStore, LikeStore, RankingStore, ReviewStore};
