pub mod feed;
pub mod friendship;
pub mod models;
pub mod votes;

pub use feed::{FeedEvent, FeedEventType, FeedOperation};
pub use friendship::{normalize_pair, FriendRequestOutcome, FriendshipState};
pub use models::{
    DirectorFilmOrder, DirectorId, Film, FilmId, GenreId, NewReview, Review, ReviewId, UserId,
};
pub use votes::{removal_delta, vote_delta};
