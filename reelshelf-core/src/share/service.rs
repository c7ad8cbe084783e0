use std::sync::Arc;

use tracing::{debug, error, info};

use super::canvas::render_png;
use super::card::{ShareCard, TOP_ITEMS_LIMIT};
use super::glyphs::GlyphRasterizer;
use super::share_id::ShareId;
use crate::application::unit_of_work::AppUnitOfWork;
use crate::clock::Clock;
use crate::database::ports::{lists::ListsRepository, shares::ShareRegistry};
use crate::error::{CoreError, Result};
use crate::storage::BlobStore;

/// Blob key of a user's share image. One per user; regenerating overwrites.
pub fn share_image_key(username: &str) -> String {
    format!("share-images/{username}.png")
}

/// Generates and serves share images.
///
/// The registry row is written before the image. If the image write then
/// fails, the new id resolves to a user whose file is stale or missing until
/// the next successful generation; fetches report that as `ShareNotFound`.
#[derive(Clone)]
pub struct ShareService {
    lists: Arc<dyn ListsRepository>,
    registry: Arc<dyn ShareRegistry>,
    blobs: Arc<dyn BlobStore>,
    glyphs: Arc<dyn GlyphRasterizer>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ShareService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareService")
            .field("blobs", &self.blobs)
            .field("glyphs", &self.glyphs)
            .finish_non_exhaustive()
    }
}

impl ShareService {
    pub fn new(
        unit_of_work: &AppUnitOfWork,
        blobs: Arc<dyn BlobStore>,
        glyphs: Arc<dyn GlyphRasterizer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            lists: Arc::clone(&unit_of_work.lists),
            registry: Arc::clone(&unit_of_work.shares),
            blobs,
            glyphs,
            clock,
        }
    }

    /// Render the user's share card, register a fresh share id and store the
    /// image. Any previously issued id for the user stops resolving.
    pub async fn generate(&self, username: &str) -> Result<ShareId> {
        let (books, movies) = tokio::try_join!(
            self.lists.top_completed_books(username, TOP_ITEMS_LIMIT),
            self.lists.top_completed_movies(username, TOP_ITEMS_LIMIT),
        )?;

        let now = self.clock.now();
        let card = ShareCard::new(username, books, movies, now.date_naive());
        if card.is_empty() {
            return Err(CoreError::NotEnoughItems);
        }

        let glyphs = Arc::clone(&self.glyphs);
        let png = tokio::task::spawn_blocking(move || render_png(&card, glyphs.as_ref()))
            .await
            .map_err(|e| CoreError::Render(format!("Render task failed: {e}")))??;
        debug!(username = %username, bytes = png.len(), "share image rendered");

        let share_id = ShareId::generate()?;
        self.registry.register_share(username, &share_id, now).await?;

        if let Err(err) = self.blobs.write(&share_image_key(username), &png).await {
            error!(
                username = %username,
                share_id = %share_id,
                error = %err,
                "share registered but image write failed"
            );
            return Err(match err {
                CoreError::Storage(message) => CoreError::Storage(message),
                other => CoreError::Storage(other.to_string()),
            });
        }

        info!(username = %username, share_id = %share_id, "share image generated");
        Ok(share_id)
    }

    /// PNG bytes behind a share id. Unknown ids and missing files are both
    /// `ShareNotFound`.
    pub async fn fetch_image(&self, share_id: &str) -> Result<Vec<u8>> {
        let share_id = ShareId::parse(share_id).ok_or(CoreError::ShareNotFound)?;
        let username = self
            .registry
            .resolve_share(&share_id)
            .await?
            .ok_or(CoreError::ShareNotFound)?;

        self.blobs
            .read(&share_image_key(&username))
            .await?
            .ok_or(CoreError::ShareNotFound)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use reelshelf_model::{BookFields, BookStatus, ListEntry};

    use super::*;
    use crate::clock::ManualClock;
    use crate::database::ports::lists::ListsRepository;
    use crate::share::glyphs::FixedAdvanceGlyphs;
    use crate::storage::MemoryBlobStore;
    use crate::test_support::InMemoryDatabase;

    fn service(db: &InMemoryDatabase, blobs: Arc<MemoryBlobStore>) -> ShareService {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap());
        ShareService::new(
            &db.unit_of_work(),
            blobs,
            Arc::new(FixedAdvanceGlyphs),
            Arc::new(clock),
        )
    }

    async fn add_completed_book(db: &InMemoryDatabase, title: &str, score: i16, day: u32) {
        db.add_book(
            "ada",
            &BookFields {
                title: title.into(),
                ..Default::default()
            },
            &ListEntry::new(BookStatus::Completed)
                .with_score(score)
                .with_dates(None, NaiveDate::from_ymd_opt(2025, 1, day)),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn no_ratable_items_writes_nothing() {
        let db = InMemoryDatabase::new();
        db.add_user("ada", "hash");
        db.add_book(
            "ada",
            &BookFields {
                title: "Unscored".into(),
                ..Default::default()
            },
            &ListEntry::new(BookStatus::Completed),
        )
        .await
        .unwrap();
        let blobs = Arc::new(MemoryBlobStore::new());

        let err = service(&db, blobs.clone()).generate("ada").await.unwrap_err();

        assert!(matches!(err, CoreError::NotEnoughItems));
        assert!(blobs.is_empty());
        assert!(db.list_shares("ada").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn three_books_produce_a_resolvable_png() {
        let db = InMemoryDatabase::new();
        db.add_user("ada", "hash");
        add_completed_book(&db, "Dune", 9, 3).await;
        add_completed_book(&db, "Emma", 7, 4).await;
        add_completed_book(&db, "Ubik", 9, 5).await;
        let blobs = Arc::new(MemoryBlobStore::new());
        let svc = service(&db, blobs.clone());

        let share_id = svc.generate("ada").await.unwrap();

        assert_eq!(db.resolve_share(&share_id).await.unwrap().as_deref(), Some("ada"));
        assert_eq!(db.list_shares("ada").await.unwrap().len(), 1);
        assert!(blobs.contains(&share_image_key("ada")));
        let png = svc.fetch_image(share_id.as_str()).await.unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[tokio::test]
    async fn regenerating_invalidates_the_previous_id() {
        let db = InMemoryDatabase::new();
        db.add_user("ada", "hash");
        add_completed_book(&db, "Dune", 9, 3).await;
        let blobs = Arc::new(MemoryBlobStore::new());
        let svc = service(&db, blobs.clone());

        let first = svc.generate("ada").await.unwrap();
        let second = svc.generate("ada").await.unwrap();

        assert_ne!(first, second);
        assert!(matches!(
            svc.fetch_image(first.as_str()).await.unwrap_err(),
            CoreError::ShareNotFound
        ));
        assert!(svc.fetch_image(second.as_str()).await.is_ok());
        assert_eq!(db.list_shares("ada").await.unwrap().len(), 1);
        assert_eq!(blobs.len(), 1);
    }

    #[tokio::test]
    async fn failed_image_write_leaves_registered_id_dangling() {
        let db = InMemoryDatabase::new();
        db.add_user("ada", "hash");
        add_completed_book(&db, "Dune", 9, 3).await;
        let blobs = Arc::new(MemoryBlobStore::new());
        blobs.fail_writes(true);
        let svc = service(&db, blobs.clone());

        let err = svc.generate("ada").await.unwrap_err();
        assert!(matches!(err, CoreError::Storage(_)));

        let shares = db.list_shares("ada").await.unwrap();
        assert_eq!(shares.len(), 1);
        assert!(matches!(
            svc.fetch_image(&shares[0].share_id).await.unwrap_err(),
            CoreError::ShareNotFound
        ));
    }

    #[tokio::test]
    async fn unknown_or_malformed_ids_are_not_found() {
        let db = InMemoryDatabase::new();
        let svc = service(&db, Arc::new(MemoryBlobStore::new()));

        for id in ["nope", "AAAAAAAAAAAAAAAAAAAAAA"] {
            assert!(matches!(
                svc.fetch_image(id).await.unwrap_err(),
                CoreError::ShareNotFound
            ));
        }
    }
}
