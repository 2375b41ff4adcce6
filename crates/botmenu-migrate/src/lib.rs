pub mod client;
mod error;
pub mod plan;
pub mod value;

pub use client::{FirestoreClient, FirestoreConfig};
pub use error::MigrateError;
pub use plan::{plan, DocumentWrite, MigrationData, Plan, Target};

use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub written: usize,
    pub failed: usize,
    pub skipped_clients: usize,
}

/// Apply every write in order. A rejected write is logged and counted; the
/// run carries on with the rest.
pub async fn migrate(client: &FirestoreClient, plan: &Plan) -> MigrationReport {
    let mut report = MigrationReport {
        skipped_clients: plan.skipped_clients,
        ..Default::default()
    };

    info!(writes = plan.writes.len(), "starting migration");
    for write in &plan.writes {
        match client.apply(write).await {
            Ok(()) => {
                info!(label = %write.label, target = %write.target, "migrated");
                report.written += 1;
            }
            Err(e) => {
                warn!(label = %write.label, target = %write.target, error = %e, "migration write failed");
                report.failed += 1;
            }
        }
    }
    info!(
        written = report.written,
        failed = report.failed,
        skipped = report.skipped_clients,
        "migration finished"
    );
    report
}
