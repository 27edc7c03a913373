//! Temporal clustering of the library timeline.
//!
//! Unfoldered records chain single-link: a record joins the current
//! cluster when it is within the threshold of the immediately preceding
//! unfoldered record, so a cluster can span more than the threshold as
//! long as no gap inside it does. Foldered records are grouped verbatim
//! by their label and never participate in automatic clustering.

use chrono::Duration;
use keepsake_core::MediaRecord;
use std::collections::HashMap;

/// Maximum gap between consecutive records in an automatic cluster.
const CHAIN_THRESHOLD_DAYS: i64 = 3;

/// One group on the timeline, user-named or automatic.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub label: String,
    pub user_named: bool,
    /// Members, newest first.
    pub records: Vec<MediaRecord>,
}

impl Cluster {
    fn most_recent(&self) -> chrono::DateTime<chrono::Utc> {
        // Members are kept newest-first.
        self.records[0].created_at
    }
}

/// Group records into clusters, ordered by most-recent member descending.
pub fn cluster_records(mut records: Vec<MediaRecord>) -> Vec<Cluster> {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let threshold = Duration::days(CHAIN_THRESHOLD_DAYS);
    let mut folders: HashMap<String, Cluster> = HashMap::new();
    let mut folder_order: Vec<String> = Vec::new();
    let mut automatic: Vec<Cluster> = Vec::new();

    for record in records {
        if let Some(folder) = record.folder_name.clone() {
            let cluster = folders.entry(folder.clone()).or_insert_with(|| {
                folder_order.push(folder.clone());
                Cluster {
                    label: folder,
                    user_named: true,
                    records: vec![],
                }
            });
            cluster.records.push(record);
            continue;
        }

        let chains = automatic.last().is_some_and(|cluster| {
            let previous = cluster
                .records
                .last()
                .map(|r| r.created_at)
                .unwrap_or(record.created_at);
            previous - record.created_at <= threshold
        });

        if chains {
            if let Some(cluster) = automatic.last_mut() {
                cluster.records.push(record);
            }
        } else {
            automatic.push(Cluster {
                label: record.created_at.format("%b %-d, %Y").to_string(),
                user_named: false,
                records: vec![record],
            });
        }
    }

    let mut clusters: Vec<Cluster> = folder_order
        .into_iter()
        .filter_map(|name| folders.remove(&name))
        .chain(automatic)
        .collect();
    clusters.sort_by(|a, b| b.most_recent().cmp(&a.most_recent()));
    clusters
}
