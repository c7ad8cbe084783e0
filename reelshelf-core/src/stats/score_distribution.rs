use std::collections::BTreeMap;

use reelshelf_model::{SCORE_MAX, SCORE_MIN, ScoreCount};

/// Expand sparse `(score, count)` rows into one entry per score in
/// `SCORE_MIN..=SCORE_MAX`, ascending, with zero counts for missing scores.
///
/// Rows outside the score range are dropped. Duplicate scores are a caller
/// error; whichever row comes last wins.
pub fn fill_and_sort(rows: Vec<ScoreCount>) -> Vec<ScoreCount> {
    let present: BTreeMap<i16, i64> =
        rows.into_iter().map(|row| (row.score, row.count)).collect();

    (SCORE_MIN..=SCORE_MAX)
        .map(|score| {
            ScoreCount::new(score, present.get(&score).copied().unwrap_or(0))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_eleven_zero_rows() {
        let filled = fill_and_sort(Vec::new());

        assert_eq!(filled.len(), 11);
        for (i, row) in filled.iter().enumerate() {
            assert_eq!(row.score, i as i16);
            assert_eq!(row.count, 0);
        }
    }

    #[test]
    fn sparse_rows_keep_their_counts_in_order() {
        let rows = vec![
            ScoreCount::new(9, 2),
            ScoreCount::new(0, 1),
            ScoreCount::new(7, 5),
        ];

        let filled = fill_and_sort(rows.clone());

        assert_eq!(filled.len(), 11);
        assert!(filled.windows(2).all(|w| w[0].score < w[1].score));
        for row in rows {
            assert_eq!(filled[row.score as usize], row);
        }
        assert_eq!(filled[5], ScoreCount::new(5, 0));
    }

    #[test]
    fn filling_a_dense_distribution_is_a_no_op() {
        let dense: Vec<_> =
            (0..=10).map(|s| ScoreCount::new(s, i64::from(s) * 3)).collect();
        let mut reversed = dense.clone();
        reversed.reverse();

        assert_eq!(fill_and_sort(dense.clone()), dense);
        assert_eq!(fill_and_sort(reversed), dense);
    }
}
