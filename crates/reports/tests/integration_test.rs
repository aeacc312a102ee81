//! End-to-end runs: raw dataset files in, report files out.

use data_loader::{ContentWiseDataset, ReplayerDataset, ReplayerOptions};
use reports::{analyze_contentwise, analyze_replayer, AnalysisOptions, StatValue};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const INTERACTIONS: &str = "\
utc_ts_milliseconds,user_id,item_id,series_id,episode_number,series_length,item_type,recommendation_id
1000,1,100,10,1,3,3,5
2000,1,100,10,1,3,3,-1
1500,1,101,10,2,3,3,-1
3000,2,200,20,1,1,0,7
4000,2,200,20,1,1,0,7
";

const DIRECT: &str = "\
recommendation_id,recommended_series_list
5,\"[10, 20]\"
99,\"[30]\"
";

const NON_DIRECT: &str = "\
user_id,recommended_series_list
3,\"[20 30]\"
";

fn load_contentwise(dir: &Path) -> ContentWiseDataset {
    let interactions = dir.join("interactions.csv");
    let direct = dir.join("impressions-direct-link.csv");
    let non_direct = dir.join("impressions-non-direct-link.csv");
    fs::write(&interactions, INTERACTIONS).unwrap();
    fs::write(&direct, DIRECT).unwrap();
    fs::write(&non_direct, NON_DIRECT).unwrap();
    ContentWiseDataset::load(&interactions, &direct, &non_direct).unwrap()
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap()
}

#[test]
fn test_contentwise_report_set() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let out_dir = output.path().join("contentwise");

    let mut dataset = load_contentwise(input.path());
    let stats = analyze_contentwise(&mut dataset, &out_dir, AnalysisOptions { json: true }).unwrap();

    assert_eq!(stats.get("# users"), Some(StatValue::Count(2)));
    assert_eq!(stats.get("# items"), Some(StatValue::Count(3)));
    assert_eq!(stats.get("# series"), Some(StatValue::Count(2)));
    assert_eq!(stats.get("# total interactions (with reps)"), Some(StatValue::Count(5)));
    assert_eq!(stats.get("# user-item interactions (no reps)"), Some(StatValue::Count(3)));
    assert_eq!(stats.get("# impressions"), Some(StatValue::Count(4)));
    assert_eq!(stats.get("Density (items)"), Some(StatValue::Real(0.5)));
    assert_eq!(stats.get("Min. timestamp"), Some(StatValue::Timestamp(Some(1000))));
    assert_eq!(stats.get("Max. timestamp"), Some(StatValue::Timestamp(Some(3000))));

    for name in [
        "stats.txt",
        "stats.json",
        "pop-user-item.txt",
        "pop-user-series.txt",
        "pop-user-item-impr.txt",
        "pop-user-series-impr.txt",
        "impr-user.txt",
        "impr-series.txt",
        "time-users.txt",
        "time-items.txt",
        "time-series.txt",
        "time-users-impressions.txt",
        "time-items-impressions.txt",
        "time-series-impressions.txt",
        "time-users-inv.txt",
        "time-items-inv.txt",
        "time-series-inv.txt",
        "time-users-impressions-inv.txt",
        "time-items-impressions-inv.txt",
        "time-series-impressions-inv.txt",
    ] {
        assert!(out_dir.join(name).is_file(), "missing {}", name);
    }

    let stats_txt = read(&out_dir, "stats.txt");
    assert!(stats_txt.starts_with("Name\tValue\n# users\t2\n# items\t3"));

    assert_eq!(read(&out_dir, "pop-user-item.txt"), "Item\tNum.ratings\n0\t1\n1\t1\n2\t1");
    assert_eq!(
        read(&out_dir, "impr-series.txt"),
        "Item.Id\tNum.Impressions\n0\t2\n1\t1\n2\t1"
    );

    // Repeated views are not new time points
    assert_eq!(read(&out_dir, "time-users.txt"), "Id\ttimestamp\n0\t1000\n0\t1500\n1\t3000");
    assert_eq!(read(&out_dir, "time-users-inv.txt"), "Id\ttimestamp\n0\t3000\n1\t1500\n1\t1000");

    let json: serde_json::Value = serde_json::from_str(&read(&out_dir, "stats.json")).unwrap();
    assert_eq!(json["# users"], 2);
}

const DAY_1: &str = "\
100 id-a 1 |user 1 5 9 |id-a |id-b
110 id-b 0 |user 1 |id-a |id-b
120 id-b 0 |user 1 5 9 |id-b |id-c
130 id-c 1 |user 1 7 |id-a
";

const DAY_2: &str = "\
200 id-a 1 |user 1 5 9 |id-a |id-d
";

#[test]
fn test_replayer_report_set() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    fs::write(input.path().join("ydata-day1"), DAY_1).unwrap();
    fs::write(input.path().join("ydata-day2"), DAY_2).unwrap();

    let mut dataset = ReplayerDataset::load(input.path(), ReplayerOptions::default()).unwrap();
    let stats = analyze_replayer(&mut dataset, output.path(), AnalysisOptions::default()).unwrap();

    assert_eq!(stats.get("# users"), Some(StatValue::Count(2)));
    assert_eq!(stats.get("# items"), Some(StatValue::Count(4)));
    assert_eq!(stats.get("# total interactions (with reps)"), Some(StatValue::Count(4)));
    assert_eq!(stats.get("# user-item interactions (no reps)"), Some(StatValue::Count(3)));
    assert_eq!(stats.get("# impressions"), Some(StatValue::Count(5)));
    assert_eq!(stats.get("Max impressions per user"), Some(StatValue::Real(4.0)));
    assert_eq!(stats.get("Min. timestamp"), Some(StatValue::Timestamp(Some(100))));
    assert_eq!(stats.get("Max. timestamp"), Some(StatValue::Timestamp(Some(200))));

    for name in [
        "stats.txt",
        "pop-user-item.txt",
        "impr-user.txt",
        "impr-items.txt",
        "time-users.txt",
        "time-items.txt",
    ] {
        assert!(output.path().join(name).is_file(), "missing {}", name);
    }
    assert!(!output.path().join("stats.json").exists());

    assert_eq!(
        read(output.path(), "impr-user.txt"),
        "User.Id\tNum.Impressions\n0\t4\n1\t1"
    );
    assert_eq!(
        read(output.path(), "time-users.txt"),
        "Id\ttimestamp\n0\t100\n0\t120\n1\t130\n0\t200"
    );
}
