//! Feed log tests over the in-memory store.
//!
//! These tests verify:
//! 1. Exactly one feed entry per feed-worthy state change, none otherwise
//! 2. Actor and entity attribution per event kind
//! 3. Atomicity: failed mutations leave no feed entry
//! 4. Oldest-first ordering with event-id tie break

use std::sync::Arc;

use chrono::NaiveDate;

use engagement_service::domain::{FeedEventType, FeedOperation, NewReview};
use engagement_service::repository::InMemoryStore;
use engagement_service::services::{
    EngagementService, FeedService, FriendService, ReviewService,
};
use engagement_service::ServiceError;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

struct Fixture {
    friends: FriendService,
    engagement: EngagementService,
    reviews: ReviewService,
    feed: FeedService,
}

async fn fixture() -> Fixture {
    let store = Arc::new(InMemoryStore::new());
    for user_id in 1..=3 {
        store.seed_user(user_id).await;
    }
    store.seed_film(1, "Solaris", date(1972, 3, 20)).await;
    Fixture {
        friends: FriendService::new(store.clone()),
        engagement: EngagementService::new(store.clone(), store.clone()),
        reviews: ReviewService::new(store.clone()),
        feed: FeedService::new(store),
    }
}

#[tokio::test]
async fn test_friend_request_logs_for_the_caller_only() {
    let f = fixture().await;

    f.friends.request_friend(1, 2).await.expect("request");

    let feed = f.feed.feed_for_user(1).await.expect("feed");
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].event_type, FeedEventType::Friend);
    assert_eq!(feed[0].operation, FeedOperation::Add);
    assert_eq!(feed[0].user_id, 1);
    assert_eq!(feed[0].entity_id, 2);

    assert!(f.feed.feed_for_user(2).await.expect("feed").is_empty());
}

#[tokio::test]
async fn test_confirming_request_logs_for_the_confirmer() {
    let f = fixture().await;

    f.friends.request_friend(1, 2).await.expect("request");
    f.friends.request_friend(2, 1).await.expect("confirm");

    let feed = f.feed.feed_for_user(2).await.expect("feed");
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].operation, FeedOperation::Add);
    assert_eq!(feed[0].entity_id, 1);
}

#[tokio::test]
async fn test_noop_mutations_log_nothing() {
    let f = fixture().await;

    f.friends.request_friend(1, 2).await.expect("request");
    f.friends.request_friend(2, 1).await.expect("confirm");
    f.friends.request_friend(1, 2).await.expect("already mutual");
    f.friends.remove_friend(1, 3).await.expect("no edge");

    f.engagement.add_like(1, 1).await.expect("add");
    f.engagement.add_like(1, 1).await.expect("duplicate");
    f.engagement.remove_like(1, 2).await.expect("absent");

    // 1: FRIEND/ADD + LIKE/ADD; nothing from the no-ops.
    assert_eq!(f.feed.feed_for_user(1).await.expect("feed").len(), 2);
    assert_eq!(f.feed.feed_for_user(2).await.expect("feed").len(), 1);
}

#[tokio::test]
async fn test_like_lifecycle_events() {
    let f = fixture().await;

    f.engagement.add_like(1, 1).await.expect("add");
    f.engagement.remove_like(1, 1).await.expect("remove");

    let feed = f.feed.feed_for_user(1).await.expect("feed");
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0].event_type, FeedEventType::Like);
    assert_eq!(feed[0].operation, FeedOperation::Add);
    assert_eq!(feed[0].entity_id, 1);
    assert_eq!(feed[1].operation, FeedOperation::Remove);
}

#[tokio::test]
async fn test_friend_removal_logs_remove_once() {
    let f = fixture().await;

    f.friends.request_friend(1, 2).await.expect("request");
    f.friends.request_friend(2, 1).await.expect("confirm");
    f.friends.remove_friend(1, 2).await.expect("remove");

    let feed = f.feed.feed_for_user(1).await.expect("feed");
    let kinds: Vec<(FeedEventType, FeedOperation)> = feed
        .iter()
        .map(|event| (event.event_type, event.operation))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (FeedEventType::Friend, FeedOperation::Add),
            (FeedEventType::Friend, FeedOperation::Remove),
        ]
    );
    // The reversed pending edge is bookkeeping, not an action by user 2.
    assert_eq!(f.feed.feed_for_user(2).await.expect("feed").len(), 1);
}

#[tokio::test]
async fn test_review_lifecycle_attributed_to_author() {
    let f = fixture().await;

    let review = f
        .reviews
        .create_review(NewReview {
            content: "dense but rewarding".to_string(),
            is_positive: true,
            user_id: 1,
            film_id: 1,
        })
        .await
        .expect("create");
    f.reviews
        .update_review(review.review_id, "denser on rewatch", true)
        .await
        .expect("update");
    f.reviews.delete_review(review.review_id).await.expect("delete");

    let feed = f.feed.feed_for_user(1).await.expect("feed");
    let ops: Vec<FeedOperation> = feed.iter().map(|event| event.operation).collect();
    assert_eq!(
        ops,
        vec![FeedOperation::Add, FeedOperation::Update, FeedOperation::Remove]
    );
    assert!(feed
        .iter()
        .all(|event| event.event_type == FeedEventType::Review
            && event.user_id == 1
            && event.entity_id == review.review_id));
}

#[tokio::test]
async fn test_votes_are_not_feed_worthy() {
    let f = fixture().await;

    let review = f
        .reviews
        .create_review(NewReview {
            content: "fine".to_string(),
            is_positive: true,
            user_id: 1,
            film_id: 1,
        })
        .await
        .expect("create");
    let before = f.feed.feed_for_user(2).await.expect("feed").len();

    f.engagement
        .vote_helpful(review.review_id, 2, true)
        .await
        .expect("vote");
    f.engagement
        .remove_vote(review.review_id, 2, true)
        .await
        .expect("unvote");

    assert_eq!(f.feed.feed_for_user(2).await.expect("feed").len(), before);
}

#[tokio::test]
async fn test_failed_mutation_leaves_no_feed_entry() {
    let f = fixture().await;

    // Film 99 does not exist; the like fails before any half-write.
    assert!(matches!(
        f.engagement.add_like(99, 1).await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(f.feed.feed_for_user(1).await.expect("feed").is_empty());
}

#[tokio::test]
async fn test_feed_is_oldest_first_with_id_tie_break() {
    let f = fixture().await;

    f.engagement.add_like(1, 1).await.expect("add");
    f.friends.request_friend(1, 2).await.expect("request");
    f.engagement.remove_like(1, 1).await.expect("remove");

    let feed = f.feed.feed_for_user(1).await.expect("feed");
    assert_eq!(feed.len(), 3);
    for pair in feed.windows(2) {
        assert!(pair[0].event_ts <= pair[1].event_ts);
        assert!(pair[0].event_id < pair[1].event_id);
    }
}

#[tokio::test]
async fn test_record_primitive_appends_directly() {
    let f = fixture().await;

    let event = f
        .feed
        .record(1, FeedEventType::Like, FeedOperation::Add, 1)
        .await
        .expect("record");
    assert!(event.event_id > 0);
    assert!(event.event_ts > 0);

    let feed = f.feed.feed_for_user(1).await.expect("feed");
    assert_eq!(feed, vec![event]);
}

#[tokio::test]
async fn test_feed_for_unknown_user_is_not_found() {
    let f = fixture().await;
    assert!(matches!(
        f.feed.feed_for_user(42).await,
        Err(ServiceError::NotFound(_))
    ));
}
