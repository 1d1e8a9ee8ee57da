pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod repository;
pub mod services;

pub use config::Config;
pub use domain::{
    FeedEvent, FeedEventType, FeedOperation, Film, FriendRequestOutcome, FriendshipState,
    NewReview, Review,
};
pub use error::{ServiceError, ServiceResult};
pub use repository::{InMemoryStore, PgStore};
pub use services::{
    EngagementService, FeedService, FriendService, RankingService, ReviewService,
};
