// Directory backend configuration.

use serde_json::Value;
use tracing::{info, warn};

use super::Fetcher;
use crate::model::{Direction, OperationReport, Outcome, Phase, Resource};

impl Fetcher<'_> {
    /// `GET /ldap/config`, stored verbatim in `ldap.json`.
    ///
    /// A 404 means the cluster has no directory configured: the fetch is
    /// skipped and any buffered config is left alone.
    pub async fn fetch_ldap(&self) -> Vec<OperationReport> {
        let mut report = OperationReport::new(Resource::Ldap, Direction::Get, Phase::Primary);
        let file = Resource::Ldap.primary_file();

        if self.cancel.is_cancelled() {
            report.push(file.to_string(), Outcome::Cancelled);
            return vec![report];
        }

        match self.client.ldap_config_raw().await {
            Ok(body) => {
                if self
                    .persist_and_parse::<Value>(Resource::Ldap, file, &body, &mut report)
                    .is_some()
                {
                    info!("fetched ldap config");
                    report.push(file.to_string(), Outcome::Ok);
                }
            }
            Err(e) if e.is_not_found() => {
                info!("no ldap directory configured");
                report.push(
                    file.to_string(),
                    Outcome::Skipped("no directory configured".into()),
                );
            }
            Err(e) => {
                warn!(operation = "GET", resource = "ldap", status = ?e.status(), error = %e, "ldap config unavailable");
                report.push(file.to_string(), Outcome::Failed(e.to_string()));
            }
        }
        vec![report]
    }
}
