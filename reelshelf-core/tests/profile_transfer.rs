use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use reelshelf_core::application::unit_of_work::AppUnitOfWork;
use reelshelf_core::auth::{AccountService, AuthCrypto, UserStatusCache};
use reelshelf_core::clock::{Clock, SystemClock};
use reelshelf_core::database::PostgresDatabase;
use reelshelf_core::storage::MemoryBlobStore;
use reelshelf_core::transfer::{ImportSummary, ProfileTransferService};
use reelshelf_core::{CoreError, stats::load_profile_stats};
use reelshelf_model::{
    BookFields, BookStatus, ListEntry, MovieFields, MovieStatus,
};
use serde_json::json;
use sqlx::PgPool;

struct Services {
    uow: AppUnitOfWork,
    accounts: Arc<AccountService>,
    transfer: ProfileTransferService,
}

fn services(pool: PgPool) -> Services {
    let uow = AppUnitOfWork::from_postgres(&PostgresDatabase::from_pool(pool));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let accounts = Arc::new(AccountService::new(
        &uow,
        Arc::new(MemoryBlobStore::new()),
        Arc::new(AuthCrypto::for_tests()),
        Arc::new(UserStatusCache::new(chrono::Duration::seconds(30), 16, clock.clone())),
        clock.clone(),
    ));
    let transfer = ProfileTransferService::new(&uow, accounts.clone(), clock);
    Services {
        uow,
        accounts,
        transfer,
    }
}

async fn seed_lists(uow: &AppUnitOfWork, username: &str) -> anyhow::Result<()> {
    uow.lists
        .add_book(
            username,
            &BookFields {
                title: "Dune".into(),
                author: Some("Frank Herbert".into()),
                publisher: Some("Chilton".into()),
                isbn: Some("9780441013593".into()),
                pages: Some(412),
                year: Some(1965),
            },
            &ListEntry::new(BookStatus::Completed)
                .with_score(9)
                .with_dates(
                    NaiveDate::from_ymd_opt(2025, 1, 2),
                    NaiveDate::from_ymd_opt(2025, 1, 28),
                )
                .with_note("spice"),
        )
        .await?;
    uow.lists
        .add_book(
            username,
            &BookFields {
                title: "Emma".into(),
                author: Some("Jane Austen".into()),
                ..Default::default()
            },
            &ListEntry::new(BookStatus::Reading).with_score(6),
        )
        .await?;
    uow.lists
        .add_movie(
            username,
            &MovieFields {
                title: "Heat".into(),
                director: Some("Michael Mann".into()),
                duration: Some(170),
                year: Some(1995),
                ..Default::default()
            },
            &ListEntry::new(MovieStatus::Completed).with_score(10),
        )
        .await?;
    uow.lists
        .add_movie(
            username,
            &MovieFields {
                title: "Alien".into(),
                ..Default::default()
            },
            &ListEntry::new(MovieStatus::Planned),
        )
        .await?;
    Ok(())
}

async fn semantic_tuples(
    uow: &AppUnitOfWork,
    username: &str,
) -> anyhow::Result<(
    HashSet<(BookFields, ListEntry<BookStatus>)>,
    HashSet<(MovieFields, ListEntry<MovieStatus>)>,
)> {
    let books = uow
        .lists
        .list_books(username)
        .await?
        .into_iter()
        .map(|item| (item.book.fields, item.entry))
        .collect();
    let movies = uow
        .lists
        .list_movies(username)
        .await?
        .into_iter()
        .map(|item| (item.movie.fields, item.entry))
        .collect();
    Ok((books, movies))
}

#[sqlx::test(migrator = "reelshelf_core::MIGRATOR")]
async fn export_import_round_trip(pool: PgPool) -> anyhow::Result<()> {
    let s = services(pool);
    s.accounts.register("ada", "correct horse").await?;
    s.accounts.register("bob", "battery staple").await?;
    seed_lists(&s.uow, "ada").await?;

    let doc = s.transfer.export("ada", "correct horse").await?;
    assert_eq!(doc.books.len(), 2);
    assert_eq!(doc.movies.len(), 2);
    let profile = doc.profile.as_ref().expect("profile stats");
    assert_eq!(profile.books.total_pages, 412);
    assert_eq!(profile.movies.total_runtime, 170);

    let summary = s
        .transfer
        .import("bob", serde_json::to_value(&doc)?)
        .await?;
    assert_eq!(summary, ImportSummary { books: 2, movies: 2 });

    assert_eq!(
        semantic_tuples(&s.uow, "bob").await?,
        semantic_tuples(&s.uow, "ada").await?
    );
    let bob_books = s.uow.lists.list_books("bob").await?;
    assert!(bob_books.iter().all(|b| b.book.submitter == "bob"));
    let ada_ids: HashSet<_> = s
        .uow
        .lists
        .list_books("ada")
        .await?
        .into_iter()
        .map(|b| b.book.id)
        .collect();
    assert!(bob_books.iter().all(|b| !ada_ids.contains(&b.book.id)));
    Ok(())
}

#[sqlx::test(migrator = "reelshelf_core::MIGRATOR")]
async fn export_requires_the_password(pool: PgPool) -> anyhow::Result<()> {
    let s = services(pool);
    s.accounts.register("ada", "correct horse").await?;

    let err = s.transfer.export("ada", "wrong horse").await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidCredentials));
    Ok(())
}

#[sqlx::test(migrator = "reelshelf_core::MIGRATOR")]
async fn import_is_all_or_nothing(pool: PgPool) -> anyhow::Result<()> {
    let s = services(pool);
    s.accounts.register("bob", "battery staple").await?;

    let doc = json!({
        "version": 1,
        "exported_at": "2025-03-01T10:00:00Z",
        "books": [
            { "title": "Dune", "status": "completed", "score": 9 },
            { "title": "Emma", "status": "planned" }
        ],
        "movies": [
            { "title": "Heat", "duration": 170, "status": "completed" },
            { "title": "Tenet", "duration": -150, "status": "completed" }
        ]
    });

    let err = s.transfer.import("bob", doc).await.unwrap_err();
    assert!(matches!(err, CoreError::ImportFailed));

    assert!(s.uow.lists.list_books("bob").await?.is_empty());
    assert!(s.uow.lists.list_movies("bob").await?.is_empty());
    Ok(())
}

#[sqlx::test(migrator = "reelshelf_core::MIGRATOR")]
async fn duplicate_items_all_receive_an_entry(pool: PgPool) -> anyhow::Result<()> {
    let s = services(pool);
    s.accounts.register("bob", "battery staple").await?;

    let doc = json!({
        "version": 1,
        "exported_at": "2025-03-01T10:00:00Z",
        "books": [
            { "title": "Dune", "status": "reading" },
            { "title": "Dune", "status": "completed", "score": 8 }
        ],
        "movies": []
    });

    s.transfer.import("bob", doc).await?;

    let books = s.uow.lists.list_books("bob").await?;
    assert_eq!(books.len(), 2);
    assert!(books
        .iter()
        .all(|b| b.entry.status == BookStatus::Completed && b.entry.score == Some(8)));
    Ok(())
}

#[sqlx::test(migrator = "reelshelf_core::MIGRATOR")]
async fn top_items_and_stats(pool: PgPool) -> anyhow::Result<()> {
    let s = services(pool);
    s.accounts.register("ada", "correct horse").await?;
    for (title, score, day) in [("Dune", 9, Some(3)), ("Emma", 7, Some(9)), ("Ubik", 9, Some(20)), ("Kindred", 9, None)] {
        s.uow
            .lists
            .add_book(
                "ada",
                &BookFields {
                    title: title.into(),
                    pages: Some(100),
                    ..Default::default()
                },
                &ListEntry::new(BookStatus::Completed)
                    .with_score(score)
                    .with_dates(None, day.and_then(|d| NaiveDate::from_ymd_opt(2025, 1, d))),
            )
            .await?;
    }

    let top: Vec<_> = s
        .uow
        .lists
        .top_completed_books("ada", 10)
        .await?
        .into_iter()
        .map(|item| item.title)
        .collect();
    assert_eq!(top, vec!["Ubik", "Dune", "Kindred", "Emma"]);

    let stats = load_profile_stats(s.uow.stats.as_ref(), "ada").await?;
    assert_eq!(stats.books.count, 4);
    assert_eq!(stats.books.total_pages, 400);
    assert_eq!(stats.books.average_score, Some(8.5));
    assert_eq!(stats.books.score_distribution[9].count, 3);
    assert_eq!(stats.books.score_distribution[7].count, 1);
    assert_eq!(stats.movies.average_score, None);
    Ok(())
}

#[sqlx::test(migrator = "reelshelf_core::MIGRATOR")]
async fn out_of_range_values_are_validation_errors(pool: PgPool) -> anyhow::Result<()> {
    let s = services(pool);
    s.accounts.register("ada", "correct horse").await?;

    let err = s
        .uow
        .lists
        .add_movie(
            "ada",
            &MovieFields {
                title: "Tenet".into(),
                duration: Some(-1),
                ..Default::default()
            },
            &ListEntry::new(MovieStatus::Completed),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
    assert!(s.uow.lists.list_movies("ada").await?.is_empty());
    Ok(())
}
