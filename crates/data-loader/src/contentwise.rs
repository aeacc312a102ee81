//! Loader for the ContentWise Impressions dataset.
//!
//! Three CSV files are read:
//! - interactions: `utc_ts_milliseconds, user_id, item_id, series_id,
//!   episode_number, series_length, item_type, recommendation_id`
//! - impressions with a direct link: `recommendation_id,
//!   recommended_series_list`
//! - impressions without a direct link: `user_id, recommended_series_list`
//!
//! Every interaction is positive feedback. Recommendation lists name
//! series, so the impressions index relates users to series.

use crate::error::{LoadError, Result};
use crate::parser::{display_name, parse_field, parse_id_list, read_lines, split_csv_line, CsvHeader};
use data_core::{AddingReturn, Impressions, ItemId, RatingMatrix, TemporalDistribution, UserId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{info, instrument, warn};

// =============================================================================
// Metadata
// =============================================================================

/// Kind of a ContentWise item, from the `item_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentWiseItemType {
    Movies,
    MovieClips,
    TvMovies,
    TvSeries,
}

impl ContentWiseItemType {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ContentWiseItemType::Movies),
            1 => Some(ContentWiseItemType::MovieClips),
            2 => Some(ContentWiseItemType::TvMovies),
            3 => Some(ContentWiseItemType::TvSeries),
            _ => None,
        }
    }
}

/// An item (movie, clip, episode...) of the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentWiseItem {
    pub id: ItemId,
    pub series: ItemId,
    pub episode: i64,
    pub item_type: ContentWiseItemType,
}

/// A series groups one or more items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentWiseSeries {
    pub id: ItemId,
    pub length: i64,
}

// =============================================================================
// Raw rows
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
struct InteractionRow {
    timestamp: i64,
    user: UserId,
    item: ContentWiseItem,
    series_length: i64,
    recommendation_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
struct ImpressionRow<K> {
    key: K,
    series: Vec<u64>,
}

fn parse_interactions(path: &Path) -> Result<Vec<InteractionRow>> {
    let file = display_name(path);
    let lines = read_lines(path)?;
    let Some((header_line, records)) = lines.split_first() else {
        return Ok(Vec::new());
    };

    let header = CsvHeader::parse(&file, header_line);
    let ts_col = header.index("utc_ts_milliseconds")?;
    let user_col = header.index("user_id")?;
    let item_col = header.index("item_id")?;
    let series_col = header.index("series_id")?;
    let episode_col = header.index("episode_number")?;
    let length_col = header.index("series_length")?;
    let type_col = header.index("item_type")?;
    let rec_col = header.index("recommendation_id")?;

    let mut rows = Vec::with_capacity(records.len());
    for (idx, line) in records.iter().enumerate() {
        // Header is line 1
        let line_no = idx + 2;
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_csv_line(line);

        let type_code: i64 = parse_field(&fields, type_col, "item_type", &file, line_no)?;
        let item_type = ContentWiseItemType::from_code(type_code).ok_or_else(|| LoadError::ParseError {
            file: file.clone(),
            line: line_no,
            reason: format!("Unknown item_type: {}", type_code),
        })?;

        rows.push(InteractionRow {
            timestamp: parse_field(&fields, ts_col, "utc_ts_milliseconds", &file, line_no)?,
            user: UserId(parse_field(&fields, user_col, "user_id", &file, line_no)?),
            item: ContentWiseItem {
                id: ItemId(parse_field(&fields, item_col, "item_id", &file, line_no)?),
                series: ItemId(parse_field(&fields, series_col, "series_id", &file, line_no)?),
                episode: parse_field(&fields, episode_col, "episode_number", &file, line_no)?,
                item_type,
            },
            series_length: parse_field(&fields, length_col, "series_length", &file, line_no)?,
            recommendation_id: parse_field(&fields, rec_col, "recommendation_id", &file, line_no)?,
        });
    }
    Ok(rows)
}

/// Parses an impressions file keyed by `key_column`.
fn parse_impressions<K>(path: &Path, key_column: &str) -> Result<Vec<ImpressionRow<K>>>
where
    K: std::str::FromStr,
    K::Err: std::fmt::Display,
{
    let file = display_name(path);
    let lines = read_lines(path)?;
    let Some((header_line, records)) = lines.split_first() else {
        return Ok(Vec::new());
    };

    let header = CsvHeader::parse(&file, header_line);
    let key_col = header.index(key_column)?;
    let list_col = header.index("recommended_series_list")?;

    let mut rows = Vec::with_capacity(records.len());
    for (idx, line) in records.iter().enumerate() {
        let line_no = idx + 2;
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_csv_line(line);
        let list = fields.get(list_col).map(String::as_str).unwrap_or_default();
        rows.push(ImpressionRow {
            key: parse_field(&fields, key_col, key_column, &file, line_no)?,
            series: parse_id_list(list, &file, line_no)?,
        });
    }
    Ok(rows)
}

// =============================================================================
// Dataset
// =============================================================================

/// The ContentWise dataset, loaded into rating matrices, temporal logs and
/// impressions.
///
/// Four matrices are kept, all binarized with accumulation (repeated
/// interactions increase the stored count):
/// - user-item and user-series, over every interaction
/// - the same two restricted to interactions coming from a recommendation
///   (`recommendation_id >= 0`)
///
/// Each has a temporal log holding the first interaction of every pair.
#[derive(Debug, Clone)]
pub struct ContentWiseDataset {
    pub(crate) user_item: RatingMatrix,
    pub(crate) user_series: RatingMatrix,
    pub(crate) user_item_impr: RatingMatrix,
    pub(crate) user_series_impr: RatingMatrix,

    pub(crate) user_item_ts: TemporalDistribution,
    pub(crate) user_series_ts: TemporalDistribution,
    pub(crate) user_item_impr_ts: TemporalDistribution,
    pub(crate) user_series_impr_ts: TemporalDistribution,

    pub(crate) items: BTreeMap<ItemId, ContentWiseItem>,
    pub(crate) series: BTreeMap<ItemId, ContentWiseSeries>,
    pub(crate) impressions: Impressions,

    /// Direct-link impression rows whose recommendation never appeared in
    /// the interactions
    pub(crate) skipped_impressions: usize,
}

impl ContentWiseDataset {
    /// Loads the dataset from its three CSV files.
    ///
    /// The files are parsed in parallel; the stores are then filled in file
    /// order, interactions first, since direct-link impressions resolve
    /// their user through the recommendation id of an interaction.
    #[instrument(skip_all, fields(interactions = %interactions.display()))]
    pub fn load(
        interactions: &Path,
        impressions_direct_link: &Path,
        impressions_non_direct_link: &Path,
    ) -> Result<Self> {
        let (interaction_rows, (direct_rows, non_direct_rows)) = rayon::join(
            || parse_interactions(interactions),
            || {
                rayon::join(
                    || parse_impressions::<i64>(impressions_direct_link, "recommendation_id"),
                    || parse_impressions::<u64>(impressions_non_direct_link, "user_id"),
                )
            },
        );
        let interaction_rows = interaction_rows?;
        let direct_rows = direct_rows?;
        let non_direct_rows = non_direct_rows?;

        info!(
            "Parsed {} interactions, {} direct-link and {} non-direct-link impression rows",
            interaction_rows.len(),
            direct_rows.len(),
            non_direct_rows.len()
        );

        let mut dataset = Self::empty();
        let mut rec_2_user: HashMap<i64, UserId> = HashMap::new();

        for row in &interaction_rows {
            dataset.add_interaction(row);
            if row.recommendation_id >= 0 {
                rec_2_user.insert(row.recommendation_id, row.user);
            }
        }

        for row in &direct_rows {
            match rec_2_user.get(&row.key) {
                Some(&user) => dataset.add_impressions(user, &row.series),
                None => dataset.skipped_impressions += 1,
            }
        }
        if dataset.skipped_impressions > 0 {
            warn!(
                "Skipped {} direct-link impression rows with an unknown recommendation id",
                dataset.skipped_impressions
            );
        }

        for row in &non_direct_rows {
            dataset.add_impressions(UserId(row.key), &row.series);
        }

        info!(
            "Loaded {} users, {} items, {} series, {} impressions",
            dataset.get_num_users(),
            dataset.get_num_items(),
            dataset.get_num_series(),
            dataset.impressions.get_num_impressions()
        );
        Ok(dataset)
    }

    fn empty() -> Self {
        Self {
            user_item: RatingMatrix::new(0.0, true, true),
            user_series: RatingMatrix::new(0.0, true, true),
            user_item_impr: RatingMatrix::new(0.0, true, true),
            user_series_impr: RatingMatrix::new(0.0, true, true),
            user_item_ts: TemporalDistribution::new(),
            user_series_ts: TemporalDistribution::new(),
            user_item_impr_ts: TemporalDistribution::new(),
            user_series_impr_ts: TemporalDistribution::new(),
            items: BTreeMap::new(),
            series: BTreeMap::new(),
            impressions: Impressions::new(),
            skipped_impressions: 0,
        }
    }

    fn add_interaction(&mut self, row: &InteractionRow) {
        let user = row.user;
        let item = row.item.id;
        let series = row.item.series;

        self.items.insert(item, row.item);
        self.series.insert(
            series,
            ContentWiseSeries {
                id: series,
                length: row.series_length,
            },
        );

        for matrix in [&mut self.user_item, &mut self.user_item_impr] {
            matrix.add_user(user);
            matrix.add_item(item);
        }
        for matrix in [&mut self.user_series, &mut self.user_series_impr] {
            matrix.add_user(user);
            matrix.add_item(series);
        }
        self.impressions.add_user(user);
        self.impressions.add_item(series);

        if self.user_item.rate(user, item, 1.0) == AddingReturn::Added {
            self.user_item_ts.add_timepoint(user, item, row.timestamp);
        }
        if self.user_series.rate(user, series, 1.0) == AddingReturn::Added {
            self.user_series_ts.add_timepoint(user, series, row.timestamp);
        }

        if row.recommendation_id >= 0 {
            if self.user_item_impr.rate(user, item, 1.0) == AddingReturn::Added {
                self.user_item_impr_ts.add_timepoint(user, item, row.timestamp);
            }
            if self.user_series_impr.rate(user, series, 1.0) == AddingReturn::Added {
                self.user_series_impr_ts.add_timepoint(user, series, row.timestamp);
            }
        }
    }

    fn add_impressions(&mut self, user: UserId, series: &[u64]) {
        self.impressions.add_user(user);
        for &id in series {
            self.impressions.add_item(ItemId(id));
            self.impressions.add_impression(user, ItemId(id));
        }
    }

    // Getters

    pub fn get_num_users(&self) -> usize {
        self.user_item.get_num_users()
    }

    pub fn get_num_items(&self) -> usize {
        self.user_item.get_num_items()
    }

    pub fn get_num_series(&self) -> usize {
        self.user_series.get_num_items()
    }

    /// User-item interactions.
    pub fn get_user_item_matrix(&self) -> &RatingMatrix {
        &self.user_item
    }

    /// User-series interactions.
    pub fn get_user_series_matrix(&self) -> &RatingMatrix {
        &self.user_series
    }

    /// User-item interactions coming from a recommendation.
    pub fn get_user_item_impr_matrix(&self) -> &RatingMatrix {
        &self.user_item_impr
    }

    /// User-series interactions coming from a recommendation.
    pub fn get_user_series_impr_matrix(&self) -> &RatingMatrix {
        &self.user_series_impr
    }

    /// Series shown to each user.
    pub fn get_impressions(&self) -> &Impressions {
        &self.impressions
    }

    pub fn get_item(&self, id: ItemId) -> Option<&ContentWiseItem> {
        self.items.get(&id)
    }

    pub fn get_series(&self, id: ItemId) -> Option<&ContentWiseSeries> {
        self.series.get(&id)
    }

    pub fn get_skipped_impressions(&self) -> usize {
        self.skipped_impressions
    }

    // Temporal logs sort lazily, hence the mutable access

    pub fn get_user_item_timeline(&mut self) -> &mut TemporalDistribution {
        &mut self.user_item_ts
    }

    pub fn get_user_series_timeline(&mut self) -> &mut TemporalDistribution {
        &mut self.user_series_ts
    }

    pub fn get_user_item_impr_timeline(&mut self) -> &mut TemporalDistribution {
        &mut self.user_item_impr_ts
    }

    pub fn get_user_series_impr_timeline(&mut self) -> &mut TemporalDistribution {
        &mut self.user_series_impr_ts
    }
}
