use std::env;

use sqlx::PgPool;

use engagement_service::repository::{LikeStore, PgStore, ReviewStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage:");
        eprintln!("  engagement-cli recount-likes <DATABASE_URL>");
        eprintln!("  engagement-cli recount-film <film_id> <DATABASE_URL>");
        eprintln!("  engagement-cli recount-useful <review_id> <DATABASE_URL>");
        eprintln!("  engagement-cli recount-all-useful <DATABASE_URL>");
        std::process::exit(1);
    }

    let cmd = args[1].as_str();

    match cmd {
        "recount-likes" if args.len() == 3 => {
            let pool = PgPool::connect(&args[2]).await?;
            let store = PgStore::new(pool);
            let repaired = store.recount_all_likes().await?;
            println!("Repaired {} drifted film like counters", repaired);
        }
        "recount-film" if args.len() == 4 => {
            let film_id: i64 = args[2].parse()?;
            let pool = PgPool::connect(&args[3]).await?;
            let store = PgStore::new(pool);
            let count = store.recount_film_likes(film_id).await?;
            println!("Film {} like counter rebuilt to {}", film_id, count);
        }
        "recount-useful" if args.len() == 4 => {
            let review_id: i64 = args[2].parse()?;
            let pool = PgPool::connect(&args[3]).await?;
            let store = PgStore::new(pool);
            let useful = store.recount_useful(review_id).await?;
            println!("Review {} score rebuilt to {}", review_id, useful);
        }
        "recount-all-useful" if args.len() == 3 => {
            let pool = PgPool::connect(&args[2]).await?;
            let store = PgStore::new(pool);
            let repaired = store.recount_all_useful().await?;
            println!("Repaired {} drifted review scores", repaired);
        }
        _ => {
            eprintln!("Invalid arguments");
            std::process::exit(1);
        }
    }

    Ok(())
}
