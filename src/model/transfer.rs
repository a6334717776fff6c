use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::shared::time::Duration;

use super::Route;

pub const NO_TRANSFERS: &str = "No transfers found";

/// Measured transfer times at a stop between two routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferPerformance {
    pub from_route: Arc<str>,
    pub to_route: Arc<str>,
    pub typical_case: Duration,
    pub best_case: Duration,
    pub worst_case: Duration,
}

/// Text lines shown for one transfer summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSummary {
    pub label: String,
    pub typical_case: String,
    pub best_case: String,
    pub worst_case: String,
}

impl TransferPerformance {
    pub fn label(&self, routes: &[Route]) -> String {
        let name = |id: &str| {
            routes
                .iter()
                .find(|route| &*route.id == id)
                .and_then(|route| route.short_name.as_deref())
                .unwrap_or(id)
                .to_string()
        };
        format!("{} to {}", name(&self.from_route), name(&self.to_route))
    }

    pub fn summarize(&self, routes: &[Route]) -> TransferSummary {
        TransferSummary {
            label: self.label(routes),
            typical_case: format!("Typical case: {}", self.typical_case.humanize()),
            best_case: format!("Best case: {}", self.best_case.humanize()),
            worst_case: format!("Worst case: {}", self.worst_case.humanize()),
        }
    }
}

/// Summary of the `index`-th transfer, `None` when there is nothing at that index.
pub fn summarize_transfers(
    transfers: &[TransferPerformance],
    index: usize,
    routes: &[Route],
) -> Option<TransferSummary> {
    transfers
        .get(index)
        .map(|transfer| transfer.summarize(routes))
}

#[test]
fn summary_uses_short_names() {
    let routes = vec![
        Route {
            id: "r1".into(),
            short_name: Some("1".into()),
            ..Default::default()
        },
        Route {
            id: "r2".into(),
            short_name: None,
            ..Default::default()
        },
    ];
    let transfer = TransferPerformance {
        from_route: "r1".into(),
        to_route: "r2".into(),
        typical_case: Duration::from_minutes(5),
        best_case: Duration::from_seconds(30),
        worst_case: Duration::from_minutes(20),
    };
    let summary = summarize_transfers(&[transfer], 0, &routes).unwrap();
    assert_eq!(summary.label, "1 to r2");
    assert_eq!(summary.typical_case, "Typical case: 5 minutes");
    assert_eq!(summary.best_case, "Best case: a few seconds");
    assert!(summarize_transfers(&[], 0, &routes).is_none());
}
