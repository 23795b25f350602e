//! Add, edit and delete dialogs. Each one walks
//! `closed -> open -> submitting -> closed | open`, talks to the gateway only
//! on submit, and asks the list to reload after a successful write.

use chrono::Utc;
use shared::{
    domain::{TeacherDraft, TeacherId, TeacherRecord},
    error::{ConfirmationMismatch, FetchError},
    protocol::{CreateTeacherRequest, UpdateTeacherRequest},
    validation::ValidationErrors,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    gateway::TeacherGateway,
    list_state::TeacherListState,
    notify::{Notification, NotificationSink},
};

pub const DELETE_CONFIRMATION_TOKEN: &str = "DELETE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    Closed,
    Open,
    Submitting,
}

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("dialog is not open")]
    NotOpen,
    #[error("a submission is already in flight")]
    Busy,
    #[error("{0}")]
    Validation(ValidationErrors),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Confirmation(#[from] ConfirmationMismatch),
}

#[derive(Debug, Default)]
enum FormState {
    #[default]
    Closed,
    Open {
        draft: TeacherDraft,
        errors: ValidationErrors,
    },
    Submitting {
        draft: TeacherDraft,
    },
}

impl FormState {
    fn open(draft: TeacherDraft) -> Self {
        FormState::Open {
            draft,
            errors: ValidationErrors::default(),
        }
    }

    fn phase(&self) -> ModalPhase {
        match self {
            FormState::Closed => ModalPhase::Closed,
            FormState::Open { .. } => ModalPhase::Open,
            FormState::Submitting { .. } => ModalPhase::Submitting,
        }
    }

    fn draft(&self) -> Option<&TeacherDraft> {
        match self {
            FormState::Closed => None,
            FormState::Open { draft, .. } | FormState::Submitting { draft } => Some(draft),
        }
    }

    fn draft_mut(&mut self) -> Option<&mut TeacherDraft> {
        match self {
            FormState::Open { draft, .. } => Some(draft),
            _ => None,
        }
    }

    fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            FormState::Open { errors, .. } => Some(errors),
            _ => None,
        }
    }

    /// Builds the request from the open draft. Invalid drafts stay open with
    /// their errors recorded; valid ones move to `Submitting`.
    fn begin_submit<R>(
        &mut self,
        build: impl FnOnce(&TeacherDraft) -> Result<R, ValidationErrors>,
    ) -> Result<R, CoordinatorError> {
        let draft = match std::mem::take(self) {
            FormState::Open { draft, .. } => draft,
            other => {
                let err = match other {
                    FormState::Submitting { .. } => CoordinatorError::Busy,
                    _ => CoordinatorError::NotOpen,
                };
                *self = other;
                return Err(err);
            }
        };

        match build(&draft) {
            Ok(request) => {
                *self = FormState::Submitting { draft };
                Ok(request)
            }
            Err(errors) => {
                *self = FormState::Open {
                    draft,
                    errors: errors.clone(),
                };
                Err(CoordinatorError::Validation(errors))
            }
        }
    }
}

/// Dialog state that can fall back from `Submitting` to `Open`.
trait Reopen {
    /// Back to `Open` with the draft intact, so the user can retry. Any other
    /// state is left alone.
    fn reopen(&mut self);
}

impl Reopen for FormState {
    fn reopen(&mut self) {
        *self = match std::mem::take(self) {
            FormState::Submitting { draft } => FormState::open(draft),
            other => other,
        };
    }
}

/// Held across the gateway call. If the submit future is dropped before the
/// call settles, the dialog reopens instead of staying in `Submitting`.
struct PendingSubmit<'a, S: Reopen> {
    state: &'a mut S,
}

impl<S: Reopen> Drop for PendingSubmit<'_, S> {
    fn drop(&mut self) {
        self.state.reopen();
    }
}

async fn settle_write(
    result: Result<TeacherRecord, FetchError>,
    mut pending: PendingSubmit<'_, FormState>,
    success_message: &str,
    gateway: &dyn TeacherGateway,
    list: &mut TeacherListState,
    sink: &dyn NotificationSink,
) -> Result<TeacherRecord, CoordinatorError> {
    match result {
        Ok(saved) => {
            *pending.state = FormState::Closed;
            drop(pending);
            sink.notify(Notification::success(success_message));
            list.reload(gateway, sink).await;
            Ok(saved)
        }
        Err(err) => {
            drop(pending);
            sink.notify(Notification::error(err.message.clone()));
            Err(err.into())
        }
    }
}

#[derive(Debug, Default)]
pub struct AddTeacherModal {
    form: FormState,
}

impl AddTeacherModal {
    pub fn open(&mut self) {
        self.form = FormState::open(TeacherDraft::default());
    }

    pub fn close(&mut self) {
        self.form = FormState::Closed;
    }

    pub fn phase(&self) -> ModalPhase {
        self.form.phase()
    }

    pub fn draft(&self) -> Option<&TeacherDraft> {
        self.form.draft()
    }

    /// Editable only while open; a submitting draft is frozen.
    pub fn draft_mut(&mut self) -> Option<&mut TeacherDraft> {
        self.form.draft_mut()
    }

    pub fn errors(&self) -> Option<&ValidationErrors> {
        self.form.errors()
    }

    pub async fn submit(
        &mut self,
        gateway: &dyn TeacherGateway,
        list: &mut TeacherListState,
        sink: &dyn NotificationSink,
    ) -> Result<TeacherRecord, CoordinatorError> {
        let request = self
            .form
            .begin_submit(|draft| CreateTeacherRequest::from_draft(draft, Utc::now()))?;
        let pending = PendingSubmit {
            state: &mut self.form,
        };

        let result = gateway.create(&request).await;
        match &result {
            Ok(created) => info!(teacher_id = %created.id, "teacher created"),
            Err(err) => warn!(error = %err, "failed to create teacher"),
        }
        settle_write(
            result,
            pending,
            "Teacher added successfully",
            gateway,
            list,
            sink,
        )
        .await
    }
}

#[derive(Debug, Default)]
pub struct EditTeacherModal {
    target: Option<TeacherId>,
    form: FormState,
}

impl EditTeacherModal {
    pub fn open(&mut self, record: &TeacherRecord) {
        self.target = Some(record.id.clone());
        self.form = FormState::open(TeacherDraft::from_record(record));
    }

    pub fn close(&mut self) {
        self.target = None;
        self.form = FormState::Closed;
    }

    pub fn phase(&self) -> ModalPhase {
        self.form.phase()
    }

    pub fn target(&self) -> Option<&TeacherId> {
        self.target.as_ref()
    }

    pub fn draft(&self) -> Option<&TeacherDraft> {
        self.form.draft()
    }

    pub fn draft_mut(&mut self) -> Option<&mut TeacherDraft> {
        self.form.draft_mut()
    }

    pub fn errors(&self) -> Option<&ValidationErrors> {
        self.form.errors()
    }

    /// Sends the editable subset; `totalStudents`, `rating` and `joinDate`
    /// are create-only and neither validated nor transmitted here.
    pub async fn submit(
        &mut self,
        gateway: &dyn TeacherGateway,
        list: &mut TeacherListState,
        sink: &dyn NotificationSink,
    ) -> Result<TeacherRecord, CoordinatorError> {
        let Some(id) = self.target.clone() else {
            return Err(CoordinatorError::NotOpen);
        };
        let request = self
            .form
            .begin_submit(|draft| UpdateTeacherRequest::from_draft(draft, Utc::now()))?;
        let pending = PendingSubmit {
            state: &mut self.form,
        };

        let result = gateway.update(&id, &request).await;
        match &result {
            Ok(_) => info!(teacher_id = %id, "teacher updated"),
            Err(err) => warn!(teacher_id = %id, error = %err, "failed to update teacher"),
        }
        let saved = settle_write(
            result,
            pending,
            "Teacher updated successfully",
            gateway,
            list,
            sink,
        )
        .await?;
        self.target = None;
        Ok(saved)
    }
}

#[derive(Debug, Default)]
enum DeleteState {
    #[default]
    Closed,
    Open {
        target: TeacherRecord,
        confirmation: String,
        inline_error: Option<String>,
    },
    Submitting {
        target: TeacherRecord,
    },
}

impl Reopen for DeleteState {
    /// The typed confirmation is cleared, so a retry needs the token again.
    fn reopen(&mut self) {
        *self = match std::mem::take(self) {
            DeleteState::Submitting { target } => DeleteState::Open {
                target,
                confirmation: String::new(),
                inline_error: None,
            },
            other => other,
        };
    }
}

/// Delete dialog gated on typing [`DELETE_CONFIRMATION_TOKEN`] exactly.
#[derive(Debug, Default)]
pub struct DeleteTeacherModal {
    state: DeleteState,
}

impl DeleteTeacherModal {
    pub fn open(&mut self, record: &TeacherRecord) {
        self.state = DeleteState::Open {
            target: record.clone(),
            confirmation: String::new(),
            inline_error: None,
        };
    }

    pub fn close(&mut self) {
        self.state = DeleteState::Closed;
    }

    pub fn phase(&self) -> ModalPhase {
        match self.state {
            DeleteState::Closed => ModalPhase::Closed,
            DeleteState::Open { .. } => ModalPhase::Open,
            DeleteState::Submitting { .. } => ModalPhase::Submitting,
        }
    }

    pub fn target(&self) -> Option<&TeacherRecord> {
        match &self.state {
            DeleteState::Closed => None,
            DeleteState::Open { target, .. } | DeleteState::Submitting { target } => Some(target),
        }
    }

    pub fn set_confirmation(&mut self, typed: impl Into<String>) {
        if let DeleteState::Open {
            confirmation,
            inline_error,
            ..
        } = &mut self.state
        {
            *confirmation = typed.into();
            *inline_error = None;
        }
    }

    pub fn confirmation(&self) -> Option<&str> {
        match &self.state {
            DeleteState::Open { confirmation, .. } => Some(confirmation),
            _ => None,
        }
    }

    pub fn can_confirm(&self) -> bool {
        matches!(
            &self.state,
            DeleteState::Open { confirmation, .. } if confirmation == DELETE_CONFIRMATION_TOKEN
        )
    }

    pub fn inline_error(&self) -> Option<&str> {
        match &self.state {
            DeleteState::Open { inline_error, .. } => inline_error.as_deref(),
            _ => None,
        }
    }

    pub async fn confirm(
        &mut self,
        gateway: &dyn TeacherGateway,
        list: &mut TeacherListState,
        sink: &dyn NotificationSink,
    ) -> Result<(), CoordinatorError> {
        let target = match std::mem::take(&mut self.state) {
            DeleteState::Open {
                target,
                confirmation,
                ..
            } if confirmation != DELETE_CONFIRMATION_TOKEN => {
                let mismatch = ConfirmationMismatch {
                    expected: DELETE_CONFIRMATION_TOKEN,
                };
                self.state = DeleteState::Open {
                    target,
                    confirmation,
                    inline_error: Some(mismatch.to_string()),
                };
                return Err(mismatch.into());
            }
            DeleteState::Open { target, .. } => target,
            other => {
                let err = match other {
                    DeleteState::Submitting { .. } => CoordinatorError::Busy,
                    _ => CoordinatorError::NotOpen,
                };
                self.state = other;
                return Err(err);
            }
        };

        let id = target.id.clone();
        self.state = DeleteState::Submitting { target };
        let mut pending = PendingSubmit {
            state: &mut self.state,
        };

        match gateway.remove(&id).await {
            Ok(()) => {
                info!(teacher_id = %id, "teacher deleted");
                *pending.state = DeleteState::Closed;
                drop(pending);
                sink.notify(Notification::success("Teacher deleted successfully"));
                list.reload(gateway, sink).await;
                Ok(())
            }
            Err(err) => {
                warn!(teacher_id = %id, error = %err, "failed to delete teacher");
                drop(pending);
                sink.notify(Notification::error(err.message.clone()));
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/coordinators_tests.rs"]
mod tests;
