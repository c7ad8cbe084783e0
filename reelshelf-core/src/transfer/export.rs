use std::sync::Arc;

use reelshelf_model::{
    EXPORT_VERSION, ExportDocument, ExportedBook, ExportedMovie,
};
use tracing::info;

use super::import::{ImportPlan, ImportSummary};
use crate::application::unit_of_work::AppUnitOfWork;
use crate::auth::PasswordVerifier;
use crate::clock::Clock;
use crate::database::ports::{
    imports::ImportRepository, lists::ListsRepository, shares::ShareRegistry,
    stats::StatsRepository,
};
use crate::error::Result;
use crate::stats::load_profile_stats;

/// Export and import of a whole profile.
#[derive(Clone)]
pub struct ProfileTransferService {
    lists: Arc<dyn ListsRepository>,
    stats: Arc<dyn StatsRepository>,
    shares: Arc<dyn ShareRegistry>,
    imports: Arc<dyn ImportRepository>,
    passwords: Arc<dyn PasswordVerifier>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ProfileTransferService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileTransferService")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl ProfileTransferService {
    pub fn new(
        unit_of_work: &AppUnitOfWork,
        passwords: Arc<dyn PasswordVerifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            lists: Arc::clone(&unit_of_work.lists),
            stats: Arc::clone(&unit_of_work.stats),
            shares: Arc::clone(&unit_of_work.shares),
            imports: Arc::clone(&unit_of_work.imports),
            passwords,
            clock,
        }
    }

    /// Re-confirm the caller's password, then build the export document.
    pub async fn export(
        &self,
        username: &str,
        password: &str,
    ) -> Result<ExportDocument> {
        self.passwords.confirm_password(username, password).await?;
        self.build_export(username).await
    }

    /// Read-only snapshot of everything the user owns. The independent reads
    /// run concurrently; assembly waits for all of them.
    pub async fn build_export(&self, username: &str) -> Result<ExportDocument> {
        let (profile, books, movies, shares) = tokio::try_join!(
            load_profile_stats(self.stats.as_ref(), username),
            self.lists.list_books(username),
            self.lists.list_movies(username),
            self.shares.list_shares(username),
        )?;

        let books: Vec<ExportedBook> = books
            .into_iter()
            .map(|item| ExportedBook {
                id: Some(item.book.id),
                submitter: Some(item.book.submitter),
                fields: item.book.fields,
                entry: item.entry,
            })
            .collect();
        let movies: Vec<ExportedMovie> = movies
            .into_iter()
            .map(|item| ExportedMovie {
                id: Some(item.movie.id),
                submitter: Some(item.movie.submitter),
                fields: item.movie.fields,
                entry: item.entry,
            })
            .collect();

        info!(
            username = %username,
            books = books.len(),
            movies = movies.len(),
            "profile exported"
        );

        Ok(ExportDocument {
            version: EXPORT_VERSION,
            exported_at: self.clock.now(),
            profile: Some(profile),
            books,
            movies,
            shares,
        })
    }

    /// Validate `document` and write it as new items owned by `username`.
    /// Nothing is written when validation fails.
    pub async fn import(
        &self,
        username: &str,
        document: serde_json::Value,
    ) -> Result<ImportSummary> {
        let plan = ImportPlan::parse(username, document)?;
        if plan.is_empty() {
            return Ok(ImportSummary::default());
        }

        let summary = self.imports.import_profile(&plan).await?;
        info!(
            username = %username,
            books = summary.books,
            movies = summary.movies,
            "profile imported"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{NaiveDate, TimeZone, Utc};
    use mockall::predicate::eq;
    use reelshelf_model::{BookFields, BookStatus, ListEntry, MovieFields, MovieStatus};

    use super::*;
    use crate::auth::MockPasswordVerifier;
    use crate::clock::ManualClock;
    use crate::error::CoreError;
    use crate::share::ShareId;
    use crate::test_support::InMemoryDatabase;

    fn service(
        db: &InMemoryDatabase,
        passwords: impl PasswordVerifier + 'static,
    ) -> ProfileTransferService {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap());
        ProfileTransferService::new(&db.unit_of_work(), Arc::new(passwords), Arc::new(clock))
    }

    fn accepting(username: &'static str) -> MockPasswordVerifier {
        let mut passwords = MockPasswordVerifier::new();
        passwords
            .expect_confirm_password()
            .with(eq(username), eq("hunter22"))
            .returning(|_, _| Ok(()));
        passwords
    }

    #[tokio::test]
    async fn export_of_an_empty_profile_succeeds() {
        let db = InMemoryDatabase::new();
        db.add_user("ada", "hash");

        let doc = service(&db, accepting("ada"))
            .export("ada", "hunter22")
            .await
            .unwrap();

        assert_eq!(doc.version, EXPORT_VERSION);
        assert!(doc.books.is_empty());
        assert!(doc.movies.is_empty());
        assert!(doc.shares.is_empty());
        let profile = doc.profile.unwrap();
        assert_eq!(profile.books.count, 0);
        assert_eq!(profile.books.score_distribution.len(), 11);
    }

    #[tokio::test]
    async fn wrong_password_blocks_export() {
        let db = InMemoryDatabase::new();
        db.add_user("ada", "hash");
        let mut passwords = MockPasswordVerifier::new();
        passwords
            .expect_confirm_password()
            .returning(|_, _| Err(CoreError::InvalidCredentials));

        let err = service(&db, passwords)
            .export("ada", "wrong")
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::InvalidCredentials));
    }

    #[tokio::test]
    async fn export_then_import_preserves_semantic_tuples() {
        let db = InMemoryDatabase::new();
        db.add_user("ada", "hash");
        db.add_user("bob", "hash");
        let dune = BookFields {
            title: "Dune".into(),
            author: Some("Frank Herbert".into()),
            pages: Some(412),
            ..Default::default()
        };
        let dune_entry = ListEntry::new(BookStatus::Completed)
            .with_score(9)
            .with_dates(NaiveDate::from_ymd_opt(2025, 1, 2), NaiveDate::from_ymd_opt(2025, 1, 20))
            .with_note("reread");
        let heat = MovieFields {
            title: "Heat".into(),
            duration: Some(170),
            ..Default::default()
        };
        let heat_entry = ListEntry::new(MovieStatus::Watching);
        db.add_book("ada", &dune, &dune_entry).await.unwrap();
        db.add_book("ada", &BookFields { title: "Emma".into(), ..Default::default() }, &ListEntry::new(BookStatus::Planned))
            .await
            .unwrap();
        db.add_movie("ada", &heat, &heat_entry).await.unwrap();
        db.register_share("ada", &ShareId::generate().unwrap(), Utc::now())
            .await
            .unwrap();

        let svc = service(&db, accepting("ada"));
        let doc = svc.export("ada", "hunter22").await.unwrap();
        assert_eq!(doc.shares.len(), 1);

        let value = serde_json::to_value(&doc).unwrap();
        let summary = svc.import("bob", value).await.unwrap();
        assert_eq!(summary, ImportSummary { books: 2, movies: 1 });

        let tuples = |items: Vec<reelshelf_model::BookListItem>| {
            items
                .into_iter()
                .map(|i| (i.book.fields, i.entry))
                .collect::<HashSet<_>>()
        };
        let ada_books = tuples(db.list_books("ada").await.unwrap());
        let bob_books_raw = db.list_books("bob").await.unwrap();
        assert!(bob_books_raw.iter().all(|i| i.book.submitter == "bob"));
        assert_eq!(tuples(bob_books_raw), ada_books);

        let bob_movies = db.list_movies("bob").await.unwrap();
        assert_eq!(bob_movies.len(), 1);
        assert_eq!(bob_movies[0].movie.fields, heat);
        assert_eq!(bob_movies[0].entry, heat_entry);
    }

    #[tokio::test]
    async fn malformed_document_writes_nothing() {
        let db = InMemoryDatabase::new();
        db.add_user("bob", "hash");

        let err = service(&db, MockPasswordVerifier::new())
            .import("bob", serde_json::json!({ "version": 1, "books": 3 }))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::Validation(_)));
        assert!(db.list_books("bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn constraint_violation_rolls_back_everything() {
        let db = InMemoryDatabase::new();
        db.add_user("bob", "hash");
        let doc = serde_json::json!({
            "version": 1,
            "exported_at": "2025-03-01T10:00:00Z",
            "books": [{ "title": "Dune", "status": "completed", "score": 9 }],
            "movies": [{ "title": "Tenet", "duration": -150, "status": "completed" }]
        });

        let err = service(&db, MockPasswordVerifier::new())
            .import("bob", doc)
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::ImportFailed));
        assert!(db.list_books("bob").await.unwrap().is_empty());
        assert!(db.list_movies("bob").await.unwrap().is_empty());
    }
}
