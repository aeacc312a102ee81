//! Loader for the Yahoo! R6B "replayer" dataset.
//!
//! Each line of each file is one displayed article:
//!
//! ```text
//! 1317513291 id-560620 0 |user 1 9 11 13 23 |id-552077 |id-555224 ...
//! ```
//!
//! i.e. timestamp, displayed article, click (0 / 1), the user's feature
//! indices and the pool of articles the page could have shown. Users have no
//! id: each distinct feature vector becomes one synthetic user.

use crate::error::{LoadError, Result};
use crate::parser::{display_name, read_lines};
use data_core::{
    ImpressionSelection, Impressions, ItemId, RatingMatrix, RatingSelection, TemporalDistribution,
    TemporalSelection, UserFilter, UserId,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Number of binary user features in the dataset.
pub const NUM_USER_FEATURES: usize = 135;

/// Bitset over the user features.
type FeatureVector = [u64; NUM_USER_FEATURES.div_ceil(64)];

/// Options of [`ReplayerDataset::load`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplayerOptions {
    /// Keep only users with at least this many events (0 keeps everyone).
    pub min_interactions_per_user: usize,
    /// Relevance threshold of the click matrix.
    pub threshold: f64,
}

impl Default for ReplayerOptions {
    fn default() -> Self {
        Self {
            min_interactions_per_user: 0,
            threshold: 0.0,
        }
    }
}

/// One parsed line.
#[derive(Debug, Clone, PartialEq)]
struct Event {
    timestamp: i64,
    article: String,
    click: f64,
    features: FeatureVector,
    pool: Vec<String>,
}

/// Parses one line. `Ok(None)` when the user has no feature besides the
/// constant one and cannot be told apart from anyone else.
fn parse_line(line: &str, file: &str, line_no: usize) -> Result<Option<Event>> {
    let parse_error = |reason: String| LoadError::ParseError {
        file: file.to_string(),
        line: line_no,
        reason,
    };

    let mut tokens = line.split_whitespace();
    let timestamp = tokens
        .next()
        .ok_or_else(|| parse_error("Missing timestamp".to_string()))?
        .parse::<i64>()
        .map_err(|e| parse_error(format!("Invalid timestamp: {}", e)))?;
    let article = tokens
        .next()
        .ok_or_else(|| parse_error("Missing article".to_string()))?
        .to_string();
    let click = tokens
        .next()
        .ok_or_else(|| parse_error("Missing click".to_string()))?
        .parse::<f64>()
        .map_err(|e| parse_error(format!("Invalid click: {}", e)))?;

    let mut features: FeatureVector = [0; NUM_USER_FEATURES.div_ceil(64)];
    let mut anonymous = true;
    let mut in_user = false;
    let mut pool = Vec::new();

    for token in tokens {
        if token == "|user" {
            in_user = true;
        } else if let Some(pooled) = token.strip_prefix('|') {
            in_user = false;
            pool.push(pooled.to_string());
        } else if in_user {
            let idx: usize = token
                .parse()
                .map_err(|e| parse_error(format!("Invalid user feature '{}': {}", token, e)))?;
            // Feature 1 is set for everybody
            if idx > 1 {
                let bit = idx - 2;
                if bit >= NUM_USER_FEATURES {
                    return Err(parse_error(format!("User feature {} out of range", idx)));
                }
                features[bit / 64] |= 1 << (bit % 64);
                anonymous = false;
            }
        }
    }

    if anonymous {
        return Ok(None);
    }
    Ok(Some(Event {
        timestamp,
        article,
        click,
        features,
        pool,
    }))
}

/// Parses a whole file, returning its events and the number of anonymous
/// lines skipped.
fn parse_file(path: &Path) -> Result<(Vec<Event>, usize)> {
    let file = display_name(path);
    let lines = read_lines(path)?;
    let mut events = Vec::with_capacity(lines.len());
    let mut skipped = 0;

    for (idx, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line, &file, idx + 1)? {
            Some(event) => events.push(event),
            None => skipped += 1,
        }
    }
    debug!("{}: {} events, {} anonymous", file, events.len(), skipped);
    Ok((events, skipped))
}

/// Data files of the dataset directory in name order.
fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(LoadError::NotADirectory {
            path: dir.display().to_string(),
        });
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.file_name().is_some_and(|name| name != "README.txt") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// The Yahoo! R6B dataset: a click matrix, its temporal log and the article
/// pools shown to every user.
#[derive(Debug, Clone)]
pub struct ReplayerDataset {
    pub(crate) user_item: RatingMatrix,
    pub(crate) user_item_ts: TemporalDistribution,
    pub(crate) impressions: Impressions,
    /// Lines without an identifiable user
    pub(crate) skipped_events: usize,
}

impl ReplayerDataset {
    /// Loads every file of `dir` except `README.txt`.
    ///
    /// Files are parsed in parallel. Synthetic ids are then handed out in
    /// file-name and line order, so the result does not depend on thread
    /// scheduling.
    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub fn load(dir: &Path, options: ReplayerOptions) -> Result<Self> {
        let files = list_files(dir)?;
        info!("Reading {} files", files.len());

        let parsed: Vec<(Vec<Event>, usize)> = files
            .par_iter()
            .map(|path| parse_file(path))
            .collect::<Result<_>>()?;

        let mut user_item = RatingMatrix::new(options.threshold, true, true);
        let mut user_item_ts = TemporalDistribution::new();
        let mut impressions = Impressions::new();

        let mut users: HashMap<FeatureVector, UserId> = HashMap::new();
        let mut items: HashMap<String, ItemId> = HashMap::new();
        let mut user_count: HashMap<UserId, usize> = HashMap::new();
        let mut skipped_events = 0;

        for (events, skipped) in parsed {
            skipped_events += skipped;
            for event in events {
                let next_user = UserId(users.len() as u64);
                let user = *users.entry(event.features).or_insert_with(|| {
                    user_item.add_user(next_user);
                    impressions.add_user(next_user);
                    next_user
                });
                *user_count.entry(user).or_insert(0) += 1;

                let item = intern_item(&mut items, &event.article, &mut user_item, &mut impressions);
                user_item.rate(user, item, event.click);
                user_item_ts.add_timepoint(user, item, event.timestamp);

                for pooled in &event.pool {
                    let pooled = intern_item(&mut items, pooled, &mut user_item, &mut impressions);
                    impressions.add_impression(user, pooled);
                }
            }
        }

        info!(
            "Loaded {} users, {} items, {} events ({} anonymous skipped)",
            user_item.get_num_users(),
            user_item.get_num_items(),
            user_item_ts.len(),
            skipped_events
        );

        let mut dataset = Self {
            user_item,
            user_item_ts,
            impressions,
            skipped_events,
        };

        if options.min_interactions_per_user > 0 {
            let min = options.min_interactions_per_user;
            let eligible = UserFilter::any_of(
                user_count
                    .iter()
                    .filter(|&(_, &count)| count >= min)
                    .map(|(&user, _)| user),
            );
            dataset = dataset.retain_users(eligible);
            info!(
                "Kept {} users with at least {} interactions",
                dataset.get_num_users(),
                min
            );
        }

        Ok(dataset)
    }

    /// Restricts every store to the users accepted by `filter`.
    fn retain_users(self, filter: UserFilter) -> Self {
        Self {
            user_item: self
                .user_item
                .filter(&RatingSelection::all().with_users(filter.clone())),
            user_item_ts: self
                .user_item_ts
                .filter(&TemporalSelection::all().with_users(filter.clone())),
            impressions: self
                .impressions
                .filter(&ImpressionSelection::all().with_users(filter)),
            skipped_events: self.skipped_events,
        }
    }

    pub fn get_num_users(&self) -> usize {
        self.user_item.get_num_users()
    }

    pub fn get_num_items(&self) -> usize {
        self.user_item.get_num_items()
    }

    pub fn get_user_item_matrix(&self) -> &RatingMatrix {
        &self.user_item
    }

    /// Articles of the pools shown to each user.
    pub fn get_impressions(&self) -> &Impressions {
        &self.impressions
    }

    pub fn get_skipped_events(&self) -> usize {
        self.skipped_events
    }

    /// Every event, in file order until sorted.
    pub fn get_user_item_timeline(&mut self) -> &mut TemporalDistribution {
        &mut self.user_item_ts
    }
}

/// Returns the id of an article, registering it on first sight.
fn intern_item(
    items: &mut HashMap<String, ItemId>,
    article: &str,
    matrix: &mut RatingMatrix,
    impressions: &mut Impressions,
) -> ItemId {
    if let Some(&id) = items.get(article) {
        return id;
    }
    let id = ItemId(items.len() as u64);
    items.insert(article.to_string(), id);
    matrix.add_item(id);
    impressions.add_item(id);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const DAY_1: &str = "\
100 id-a 1 |user 1 5 9 |id-a |id-b
110 id-b 0 |user 1 |id-a |id-b
120 id-b 0 |user 1 5 9 |id-b |id-c
130 id-c 1 |user 1 7 |id-a
";

    const DAY_2: &str = "\
200 id-a 1 |user 1 5 9 |id-a |id-d
";

    fn write_dataset(dir: &Path) {
        fs::write(dir.join("ydata-day1"), DAY_1).unwrap();
        fs::write(dir.join("ydata-day2"), DAY_2).unwrap();
        fs::write(dir.join("README.txt"), "not data\n").unwrap();
    }

    #[test]
    fn test_parse_line() {
        let event = parse_line("100 id-a 1 |user 1 2 136 |id-a |id-b", "f", 1)
            .unwrap()
            .unwrap();
        assert_eq!(event.timestamp, 100);
        assert_eq!(event.article, "id-a");
        assert_eq!(event.click, 1.0);
        assert_eq!(event.pool, vec!["id-a", "id-b"]);
        // Features 2 and 136 map to the first and last bits
        assert_eq!(event.features[0], 1);
        assert_eq!(event.features[2], 1 << 6);
    }

    #[test]
    fn test_parse_line_anonymous_and_errors() {
        assert_eq!(parse_line("100 id-a 0 |user 1 |id-a", "f", 1).unwrap(), None);
        assert!(parse_line("100 id-a 0 |user 1 138", "f", 1).is_err());
        assert!(parse_line("abc id-a 0", "f", 1).is_err());
        assert!(parse_line("100", "f", 1).is_err());
    }

    #[test]
    fn test_load() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path());
        let mut dataset = ReplayerDataset::load(dir.path(), ReplayerOptions::default()).unwrap();

        // Users: {5, 9} -> 0, {7} -> 1; the anonymous line is skipped
        assert_eq!(dataset.get_num_users(), 2);
        assert_eq!(dataset.get_skipped_events(), 1);
        // Items in order of appearance: a, b, c, d
        assert_eq!(dataset.get_num_items(), 4);

        let matrix = dataset.get_user_item_matrix();
        assert_eq!(matrix.get_num_total_ratings(false), 4);
        assert_eq!(matrix.get_rating(UserId(0), ItemId(0)), Some(2.0));
        assert_eq!(matrix.get_rating(UserId(0), ItemId(1)), Some(1.0));
        assert_eq!(matrix.get_rating(UserId(1), ItemId(2)), Some(1.0));

        let impressions = dataset.get_impressions();
        assert_eq!(impressions.get_num_user_impressions(UserId(0)), 4);
        assert_eq!(impressions.get_num_user_impressions(UserId(1)), 1);

        let timeline = dataset.get_user_item_timeline().get_user_distribution();
        assert_eq!(timeline, vec![(UserId(0), 100), (UserId(0), 120), (UserId(1), 130), (UserId(0), 200)]);
    }

    #[test]
    fn test_load_with_min_interactions() {
        let dir = tempfile::tempdir().unwrap();
        write_dataset(dir.path());
        let options = ReplayerOptions {
            min_interactions_per_user: 2,
            ..ReplayerOptions::default()
        };
        let mut dataset = ReplayerDataset::load(dir.path(), options).unwrap();

        assert_eq!(dataset.get_num_users(), 1);
        assert!(dataset.get_user_item_matrix().contains_user(UserId(0)));
        assert_eq!(dataset.get_impressions().get_num_users(), 1);
        assert_eq!(dataset.get_user_item_timeline().len(), 3);
        // Items survive the user filter
        assert_eq!(dataset.get_num_items(), 4);
    }

    #[test]
    fn test_load_rejects_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        fs::write(&file, "").unwrap();
        assert!(matches!(
            ReplayerDataset::load(&file, ReplayerOptions::default()),
            Err(LoadError::NotADirectory { .. })
        ));
    }
}
