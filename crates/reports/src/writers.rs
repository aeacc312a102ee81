//! Tab-separated report files.
//!
//! Every file starts with a header line; each following row is written as
//! `"\n" + row`, so files carry no trailing newline.

use crate::error::{ReportError, Result};
use crate::statistics::Statistics;
use data_core::{ItemId, TemporalDistribution, UserId};
use metrics::{CountDistribution, ImpressionDistribution, PopularityDistribution};
use std::collections::HashMap;
use std::fs::File;
use std::hash::Hash;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Creates `path` and hands a buffered writer to `body`.
fn write_file<F>(path: &Path, body: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<usize>,
{
    let wrap = |source| ReportError::WriteError {
        path: path.display().to_string(),
        source,
    };
    let file = File::create(path).map_err(wrap)?;
    let mut out = BufWriter::new(file);
    let rows = body(&mut out).map_err(wrap)?;
    out.flush().map_err(wrap)?;
    debug!("Wrote {} rows to {}", rows, path.display());
    Ok(())
}

/// Rank-indexed counts, largest first.
fn write_ranked<W: Write, D: CountDistribution>(out: &mut W, header: &str, distribution: &D) -> io::Result<usize> {
    write!(out, "{}", header)?;
    for (rank, count) in distribution.counts().into_iter().enumerate() {
        write!(out, "\n{}\t{}", rank, count)?;
    }
    Ok(distribution.len())
}

// =============================================================================
// Statistics
// =============================================================================

/// `Name\tValue` table.
pub struct StatisticsWriter;

impl StatisticsWriter {
    pub fn write(stats: &Statistics, path: &Path) -> Result<()> {
        write_file(path, |out| Self::write_to(stats, out))
    }

    pub fn write_to<W: Write>(stats: &Statistics, out: &mut W) -> io::Result<usize> {
        write!(out, "Name\tValue")?;
        for (name, value) in stats.iter() {
            write!(out, "\n{}\t{}", name, value)?;
        }
        Ok(stats.len())
    }

    /// The same table as a JSON object.
    pub fn write_json(stats: &Statistics, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(stats)?;
        write_file(path, |out| {
            out.write_all(raw.as_bytes())?;
            Ok(stats.len())
        })
    }
}

// =============================================================================
// Popularity
// =============================================================================

/// Ratings per item (or user), one row per rank.
pub struct PopularityDistributionWriter;

impl PopularityDistributionWriter {
    pub fn write_items(distribution: &PopularityDistribution<ItemId>, path: &Path) -> Result<()> {
        write_file(path, |out| Self::write_items_to(distribution, out))
    }

    pub fn write_users(distribution: &PopularityDistribution<UserId>, path: &Path) -> Result<()> {
        write_file(path, |out| Self::write_users_to(distribution, out))
    }

    pub fn write_items_to<W: Write>(distribution: &PopularityDistribution<ItemId>, out: &mut W) -> io::Result<usize> {
        write_ranked(out, "Item\tNum.ratings", distribution)
    }

    pub fn write_users_to<W: Write>(distribution: &PopularityDistribution<UserId>, out: &mut W) -> io::Result<usize> {
        write_ranked(out, "User\tNum.ratings", distribution)
    }
}

// =============================================================================
// Impressions
// =============================================================================

/// Impressions per user (or shown item), one row per rank.
pub struct ImpressionDistributionWriter;

impl ImpressionDistributionWriter {
    pub fn write_users(distribution: &ImpressionDistribution<UserId>, path: &Path) -> Result<()> {
        write_file(path, |out| Self::write_users_to(distribution, out))
    }

    pub fn write_items(distribution: &ImpressionDistribution<ItemId>, path: &Path) -> Result<()> {
        write_file(path, |out| Self::write_items_to(distribution, out))
    }

    pub fn write_users_to<W: Write>(distribution: &ImpressionDistribution<UserId>, out: &mut W) -> io::Result<usize> {
        write_ranked(out, "User.Id\tNum.Impressions", distribution)
    }

    pub fn write_items_to<W: Write>(distribution: &ImpressionDistribution<ItemId>, out: &mut W) -> io::Result<usize> {
        write_ranked(out, "Item.Id\tNum.Impressions", distribution)
    }
}

// =============================================================================
// Temporal
// =============================================================================

/// `(id, timestamp)` rows of a temporal log.
///
/// Ids are renumbered from 0 in order of first appearance in the written
/// order. With `natural_order == false` the rows are written newest first,
/// so ids are numbered by their last interaction.
pub struct TemporalDistributionWriter;

impl TemporalDistributionWriter {
    pub fn write_users(temporal: &mut TemporalDistribution, path: &Path, natural_order: bool) -> Result<()> {
        let distribution = temporal.get_user_distribution();
        write_file(path, |out| Self::write_to(&distribution, natural_order, out))
    }

    pub fn write_items(temporal: &mut TemporalDistribution, path: &Path, natural_order: bool) -> Result<()> {
        let distribution = temporal.get_item_distribution();
        write_file(path, |out| Self::write_to(&distribution, natural_order, out))
    }

    pub fn write_to<K, W>(distribution: &[(K, i64)], natural_order: bool, out: &mut W) -> io::Result<usize>
    where
        K: Eq + Hash + Copy,
        W: Write,
    {
        let mut renumbered: HashMap<K, usize> = HashMap::new();
        write!(out, "Id\ttimestamp")?;

        let mut emit = |&(key, timestamp): &(K, i64)| -> io::Result<()> {
            let next = renumbered.len();
            let id = *renumbered.entry(key).or_insert(next);
            write!(out, "\n{}\t{}", id, timestamp)
        };
        if natural_order {
            distribution.iter().try_for_each(&mut emit)?;
        } else {
            distribution.iter().rev().try_for_each(&mut emit)?;
        }
        Ok(distribution.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::StatValue;
    use data_core::{Impressions, RatingMatrix, RatingSelection};

    fn render<F: FnOnce(&mut Vec<u8>) -> io::Result<usize>>(f: F) -> String {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_statistics_format() {
        let mut stats = Statistics::new();
        stats.add_count("# users", 2);
        stats.add_real("Item Gini", f64::NAN);
        stats.add("Min. timestamp", StatValue::Timestamp(Some(10)));

        let text = render(|out| StatisticsWriter::write_to(&stats, out));
        assert_eq!(text, "Name\tValue\n# users\t2\nItem Gini\tNaN\nMin. timestamp\t10");
    }

    #[test]
    fn test_popularity_rows_are_ranked() {
        let mut matrix = RatingMatrix::new(0.0, true, true);
        matrix.add_user(UserId(1));
        matrix.add_user(UserId(2));
        for i in 1..=3 {
            matrix.add_item(ItemId(i));
        }
        matrix.rate(UserId(1), ItemId(3), 1.0);
        matrix.rate(UserId(2), ItemId(3), 1.0);
        matrix.rate(UserId(1), ItemId(1), 1.0);

        let all = RatingSelection::all();
        let items = PopularityDistribution::items(&matrix, false, &all);
        let text = render(|out| PopularityDistributionWriter::write_items_to(&items, out));
        assert_eq!(text, "Item\tNum.ratings\n0\t2\n1\t1\n2\t0");

        let users = PopularityDistribution::users(&matrix, false, &all);
        let text = render(|out| PopularityDistributionWriter::write_users_to(&users, out));
        assert_eq!(text, "User\tNum.ratings\n0\t2\n1\t1");
    }

    #[test]
    fn test_impression_headers() {
        let mut impressions = Impressions::new();
        impressions.add_user(UserId(1));
        impressions.add_item(ItemId(5));
        impressions.add_impression(UserId(1), ItemId(5));

        let users = ImpressionDistribution::users(&impressions);
        let text = render(|out| ImpressionDistributionWriter::write_users_to(&users, out));
        assert_eq!(text, "User.Id\tNum.Impressions\n0\t1");

        let items = ImpressionDistribution::items(&impressions);
        let text = render(|out| ImpressionDistributionWriter::write_items_to(&items, out));
        assert_eq!(text, "Item.Id\tNum.Impressions\n0\t1");
    }

    #[test]
    fn test_temporal_renumbering_both_orders() {
        let distribution = vec![(UserId(7), 1), (UserId(3), 2), (UserId(7), 3)];

        let natural = render(|out| TemporalDistributionWriter::write_to(&distribution, true, out));
        assert_eq!(natural, "Id\ttimestamp\n0\t1\n1\t2\n0\t3");

        // Every row is written, the oldest one included
        let reversed = render(|out| TemporalDistributionWriter::write_to(&distribution, false, out));
        assert_eq!(reversed, "Id\ttimestamp\n0\t3\n1\t2\n0\t1");
    }

    #[test]
    fn test_empty_distribution_writes_header_only() {
        let distribution: Vec<(ItemId, i64)> = Vec::new();
        let text = render(|out| TemporalDistributionWriter::write_to(&distribution, false, out));
        assert_eq!(text, "Id\ttimestamp");
    }

    #[test]
    fn test_write_error_names_path() {
        let stats = Statistics::new();
        let err = StatisticsWriter::write(&stats, Path::new("/definitely/not/here/stats.txt")).unwrap_err();
        assert!(err.to_string().contains("stats.txt"));
    }
}
