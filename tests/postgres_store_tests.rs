// tests/postgres_store_tests.rs
//
// Needs a disposable Postgres database in DATABASE_URL:
//   cargo test --test postgres_store_tests -- --ignored

use product_comments::{
    models::{comment::NewComment, reaction::{ReactionAction, ReactionType}},
    store::{CommentStore, PgStore, ProductCatalog, ReactionStore, UserDirectory},
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

async fn connect() -> PgPool {
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for Postgres store tests");

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    pool
}

/// Inserts a fresh user and product, returning their ids.
async fn seed(pool: &PgPool) -> (i64, i64) {
    let name = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let user_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (name, email) VALUES ($1, $2) RETURNING id",
    )
    .bind(&name)
    .bind(format!("{}@example.com", name))
    .fetch_one(pool)
    .await
    .unwrap();

    let product_id =
        sqlx::query_scalar::<_, i64>("INSERT INTO products (name) VALUES ($1) RETURNING id")
            .bind(format!("product {}", name))
            .fetch_one(pool)
            .await
            .unwrap();

    (user_id, product_id)
}

fn new_comment(author_id: i64, product_id: i64, parent_id: Option<i64>, text: &str) -> NewComment {
    NewComment {
        author_id,
        product_id,
        parent_id,
        text: text.to_string(),
        rating: None,
        media_ids: vec![],
    }
}

#[tokio::test]
#[ignore = "needs a Postgres database in DATABASE_URL"]
async fn thread_queries_against_postgres() {
    let pool = connect().await;
    let store = PgStore::new(pool.clone());
    let (user, product) = seed(&pool).await;

    assert!(store.product_exists(product).await.unwrap());
    assert_eq!(store.resolve_users(&[user]).await.unwrap()[&user].id, user);

    let root = store.insert(new_comment(user, product, None, "root")).await.unwrap();
    let a = store.insert(new_comment(user, product, Some(root), "a")).await.unwrap();
    let b = store.insert(new_comment(user, product, Some(root), "b")).await.unwrap();
    let a1 = store.insert(new_comment(user, product, Some(a), "a1")).await.unwrap();

    let roots = store.root_comments(product, 10, 0).await.unwrap();
    assert_eq!(roots.total, 1);
    assert_eq!(roots.rows[0].id, root);

    let thread = store.descendants_of(root, 10, 0).await.unwrap();
    assert_eq!(thread.total, 3);
    let ids: Vec<i64> = thread.rows.iter().map(|c| c.id).collect();
    assert_eq!(ids[0], root);
    assert_eq!(&ids[1..3], &[b, a]);
    assert_eq!(ids[3], a1);

    let counts = store.direct_children_counts(&[root, a, b]).await.unwrap();
    assert_eq!(counts[&root], 2);
    assert_eq!(counts[&a], 1);
    assert_eq!(counts[&b], 0);

    store.soft_delete(root).await.unwrap();
    let deleted = store.find(root).await.unwrap().unwrap();
    assert!(deleted.deleted);
    assert_eq!(deleted.text, "");
    assert_eq!(store.descendants_of(root, 10, 0).await.unwrap().total, 3);
}

#[tokio::test]
#[ignore = "needs a Postgres database in DATABASE_URL"]
async fn reaction_toggle_against_postgres() {
    let pool = connect().await;
    let store = PgStore::new(pool.clone());
    let (user, product) = seed(&pool).await;
    let comment = store.insert(new_comment(user, product, None, "react to me")).await.unwrap();

    assert_eq!(
        store.upsert_or_delete(comment, user, ReactionType::Like).await.unwrap(),
        ReactionAction::Created
    );
    assert_eq!(
        store.upsert_or_delete(comment, user, ReactionType::Sad).await.unwrap(),
        ReactionAction::Updated
    );
    assert_eq!(store.get(comment, user).await.unwrap().unwrap().ty, ReactionType::Sad);
    assert_eq!(
        store.upsert_or_delete(comment, user, ReactionType::Sad).await.unwrap(),
        ReactionAction::Deleted
    );
    assert!(store.by_comment_ids(&[comment]).await.unwrap().is_empty());
}
