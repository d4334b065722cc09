//! In-memory record of import activities.

use chrono::Utc;
use intake_model::{
    AccountNumber, Activity, ActivityStatus, Module, SessionContext, SummaryReport,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::collaborator::ImportCommitter;
use crate::error::CommitError;

/// One [`Activity`] per import of a module for an account.
///
/// An activity is opened as pending, moves to in-progress once its upload
/// is ingested, and is completed by the commit. At most one activity per
/// (account, module) pair is open at a time.
#[derive(Debug, Default, Clone)]
pub struct ActivityLedger {
    activities: Vec<Activity>,
}

impl ActivityLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activities in commit order.
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn find(&self, id: Uuid) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == id)
    }

    pub fn for_account<'a>(
        &'a self,
        account: &'a AccountNumber,
    ) -> impl Iterator<Item = &'a Activity> + 'a {
        self.activities
            .iter()
            .filter(move |a| &a.account_number == account)
    }

    /// Open activity for `account` and `module`, if any.
    pub fn find_open(&self, account: &AccountNumber, module: Module) -> Option<&Activity> {
        self.activities
            .iter()
            .find(|a| a.is_open() && &a.account_number == account && a.module == module)
    }

    /// The open activity for `account` and `module`, created as pending if
    /// there is none.
    pub fn open_or_find(&mut self, account: &AccountNumber, module: Module) -> &mut Activity {
        let position = self
            .activities
            .iter()
            .position(|a| a.is_open() && &a.account_number == account && a.module == module);
        let index = match position {
            Some(index) => index,
            None => {
                let activity = Activity::opened(account.clone(), module, Utc::now());
                debug!(
                    activity = %activity.id,
                    account = account.as_str(),
                    %module,
                    "activity opened"
                );
                self.activities.push(activity);
                self.activities.len() - 1
            }
        };
        &mut self.activities[index]
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

impl ImportCommitter for ActivityLedger {
    fn begin(&mut self, context: &SessionContext, module: Module) {
        self.open_or_find(&context.account, module).status = ActivityStatus::InProgress;
    }

    fn commit(
        &mut self,
        context: &SessionContext,
        report: &SummaryReport,
    ) -> Result<(), CommitError> {
        let activity = self.open_or_find(&context.account, report.module);
        activity.complete(report.clone(), Utc::now());
        info!(
            activity = %activity.id,
            account = context.account.as_str(),
            module = %report.module,
            records = report.total_fields,
            "import committed"
        );
        Ok(())
    }
}

impl<C: ImportCommitter + ?Sized> ImportCommitter for Box<C> {
    fn begin(&mut self, context: &SessionContext, module: Module) {
        (**self).begin(context, module);
    }

    fn commit(
        &mut self,
        context: &SessionContext,
        report: &SummaryReport,
    ) -> Result<(), CommitError> {
        (**self).commit(context, report)
    }
}
