// Directory backend configuration.

use serde_json::Value;
use tracing::info;

use super::{Publisher, record, report};
use crate::model::{BufferFile, OperationReport, Outcome, Phase, Resource};

impl Publisher<'_> {
    /// Replace the cluster's directory config with `ldap.json`.
    pub async fn publish_ldap(&self) -> OperationReport {
        let config: Value = match self.load(Resource::Ldap, Phase::Primary, BufferFile::Ldap) {
            Ok(doc) => doc,
            Err(aborted) => return aborted,
        };

        let mut report = report(Resource::Ldap, Phase::Primary);
        let target = BufferFile::Ldap.to_string();
        if self.cancel.is_cancelled() {
            record(&mut report, 0, target, None);
            return report;
        }

        info!("publishing ldap config");
        let outcome = match self.client.put_ldap_config(&config).await {
            Ok(()) => Outcome::Ok,
            Err(e) => Outcome::Failed(e.to_string()),
        };
        record(&mut report, 0, target, Some(outcome));
        report
    }
}
