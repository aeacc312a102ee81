//! Full analysis of a loaded dataset into an output directory.
//!
//! Each run writes `stats.txt`, popularity distributions (`pop-*.txt`),
//! impression distributions (`impr-*.txt`) and temporal logs (`time-*.txt`),
//! plus `stats.json` on request.

use crate::error::{ReportError, Result};
use crate::statistics::{contentwise_statistics, replayer_statistics, Statistics};
use crate::writers::{
    ImpressionDistributionWriter, PopularityDistributionWriter, StatisticsWriter, TemporalDistributionWriter,
};
use data_core::{RatingMatrix, RatingSelection};
use data_loader::{ContentWiseDataset, ReplayerDataset};
use metrics::{ImpressionDistribution, PopularityDistribution};
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{info, instrument};

/// What to write besides the text reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisOptions {
    /// Also dump the statistics table as `stats.json`.
    pub json: bool,
}

fn prepare_output_dir(out_dir: &Path) -> Result<()> {
    if out_dir.exists() && !out_dir.is_dir() {
        return Err(ReportError::NotADirectory {
            path: out_dir.display().to_string(),
        });
    }
    fs::create_dir_all(out_dir).map_err(|source| ReportError::WriteError {
        path: out_dir.display().to_string(),
        source,
    })
}

fn write_statistics(stats: &Statistics, out_dir: &Path, options: AnalysisOptions) -> Result<()> {
    StatisticsWriter::write(stats, &out_dir.join("stats.txt"))?;
    if options.json {
        StatisticsWriter::write_json(stats, &out_dir.join("stats.json"))?;
    }
    Ok(())
}

fn write_item_popularity(matrix: &RatingMatrix, path: &Path) -> Result<()> {
    let distribution = PopularityDistribution::items(matrix, false, &RatingSelection::all());
    PopularityDistributionWriter::write_items(&distribution, path)
}

/// Computes and writes every report of a ContentWise dataset.
#[instrument(skip_all, fields(out = %out_dir.display()))]
pub fn analyze_contentwise(
    dataset: &mut ContentWiseDataset,
    out_dir: &Path,
    options: AnalysisOptions,
) -> Result<Statistics> {
    let start = Instant::now();
    prepare_output_dir(out_dir)?;

    let stats = contentwise_statistics(dataset);
    write_statistics(&stats, out_dir, options)?;
    info!("Stats computed ({:.2?})", start.elapsed());

    write_item_popularity(dataset.get_user_item_matrix(), &out_dir.join("pop-user-item.txt"))?;
    write_item_popularity(dataset.get_user_series_matrix(), &out_dir.join("pop-user-series.txt"))?;
    write_item_popularity(dataset.get_user_item_impr_matrix(), &out_dir.join("pop-user-item-impr.txt"))?;
    write_item_popularity(
        dataset.get_user_series_impr_matrix(),
        &out_dir.join("pop-user-series-impr.txt"),
    )?;
    info!("Popularity distributions computed ({:.2?})", start.elapsed());

    let impressions = dataset.get_impressions();
    ImpressionDistributionWriter::write_users(
        &ImpressionDistribution::users(impressions),
        &out_dir.join("impr-user.txt"),
    )?;
    ImpressionDistributionWriter::write_items(
        &ImpressionDistribution::items(impressions),
        &out_dir.join("impr-series.txt"),
    )?;
    info!("Impression distributions computed ({:.2?})", start.elapsed());

    for (natural_order, suffix) in [(true, ""), (false, "-inv")] {
        let name = |base: &str| out_dir.join(format!("{}{}.txt", base, suffix));

        let timeline = dataset.get_user_item_timeline();
        TemporalDistributionWriter::write_users(timeline, &name("time-users"), natural_order)?;
        TemporalDistributionWriter::write_items(timeline, &name("time-items"), natural_order)?;

        let timeline = dataset.get_user_series_timeline();
        TemporalDistributionWriter::write_items(timeline, &name("time-series"), natural_order)?;

        let timeline = dataset.get_user_item_impr_timeline();
        TemporalDistributionWriter::write_users(timeline, &name("time-users-impressions"), natural_order)?;
        TemporalDistributionWriter::write_items(timeline, &name("time-items-impressions"), natural_order)?;

        let timeline = dataset.get_user_series_impr_timeline();
        TemporalDistributionWriter::write_items(timeline, &name("time-series-impressions"), natural_order)?;
    }
    info!("Temporal distributions computed ({:.2?})", start.elapsed());

    Ok(stats)
}

/// Computes and writes every report of a Yahoo R6B (Replayer) dataset.
#[instrument(skip_all, fields(out = %out_dir.display()))]
pub fn analyze_replayer(
    dataset: &mut ReplayerDataset,
    out_dir: &Path,
    options: AnalysisOptions,
) -> Result<Statistics> {
    let start = Instant::now();
    prepare_output_dir(out_dir)?;

    let stats = replayer_statistics(dataset);
    write_statistics(&stats, out_dir, options)?;
    info!("Stats computed ({:.2?})", start.elapsed());

    write_item_popularity(dataset.get_user_item_matrix(), &out_dir.join("pop-user-item.txt"))?;
    info!("Popularity distributions computed ({:.2?})", start.elapsed());

    let impressions = dataset.get_impressions();
    ImpressionDistributionWriter::write_users(
        &ImpressionDistribution::users(impressions),
        &out_dir.join("impr-user.txt"),
    )?;
    ImpressionDistributionWriter::write_items(
        &ImpressionDistribution::items(impressions),
        &out_dir.join("impr-items.txt"),
    )?;
    info!("Impression distributions computed ({:.2?})", start.elapsed());

    let timeline = dataset.get_user_item_timeline();
    TemporalDistributionWriter::write_users(timeline, &out_dir.join("time-users.txt"), true)?;
    TemporalDistributionWriter::write_items(timeline, &out_dir.join("time-items.txt"), true)?;
    info!("Temporal distributions computed ({:.2?})", start.elapsed());

    Ok(stats)
}
