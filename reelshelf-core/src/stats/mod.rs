//! Profile statistics assembled from the stats repository.

pub mod score_distribution;

pub use score_distribution::fill_and_sort;

use reelshelf_model::ProfileStats;

use crate::database::ports::stats::StatsRepository;
use crate::error::Result;

/// Gather the five independent aggregates for `username` concurrently and
/// assemble them. Fails with `NotFound` for an unknown user.
pub async fn load_profile_stats(
    stats: &dyn StatsRepository,
    username: &str,
) -> Result<ProfileStats> {
    let (user, mut books, mut movies, book_scores, movie_scores) = tokio::try_join!(
        stats.user_info(username),
        stats.book_stats(username),
        stats.movie_stats(username),
        stats.book_scores(username),
        stats.movie_scores(username),
    )?;

    books.score_distribution = fill_and_sort(book_scores);
    movies.score_distribution = fill_and_sort(movie_scores);

    Ok(ProfileStats {
        username: user.username,
        member_since: user.member_since,
        books,
        movies,
    })
}
