//! The teacher admin screen: list state plus the three dialogs, driven by the
//! hooks a renderer exposes (add, edit, delete, search, filter, reload).

use std::sync::Arc;

use shared::domain::{Subject, TeacherId, TeacherRecord, TeacherStatus};
use tracing::debug;

use crate::{
    coordinators::{
        AddTeacherModal, CoordinatorError, DeleteTeacherModal, EditTeacherModal, ModalPhase,
    },
    gateway::TeacherGateway,
    list_state::{FilterChoice, ReloadOutcome, TeacherListState, TeacherStats},
    notify::{Notification, NotificationSink},
};

#[derive(Debug, Clone, PartialEq)]
pub enum AdminAction {
    /// The screen became visible.
    Activate,
    Reload,
    SearchChanged(String),
    SubjectFilterChanged(FilterChoice<Subject>),
    StatusFilterChanged(FilterChoice<TeacherStatus>),
    ResetFilters,
    OpenAdd,
    OpenEdit(TeacherId),
    OpenDelete(TeacherId),
    SubmitAdd,
    SubmitEdit,
    DeleteConfirmationChanged(String),
    ConfirmDelete,
    CloseDialogs,
}

impl AdminAction {
    fn name(&self) -> &'static str {
        match self {
            AdminAction::Activate => "activate",
            AdminAction::Reload => "reload",
            AdminAction::SearchChanged(_) => "search_changed",
            AdminAction::SubjectFilterChanged(_) => "subject_filter_changed",
            AdminAction::StatusFilterChanged(_) => "status_filter_changed",
            AdminAction::ResetFilters => "reset_filters",
            AdminAction::OpenAdd => "open_add",
            AdminAction::OpenEdit(_) => "open_edit",
            AdminAction::OpenDelete(_) => "open_delete",
            AdminAction::SubmitAdd => "submit_add",
            AdminAction::SubmitEdit => "submit_edit",
            AdminAction::DeleteConfirmationChanged(_) => "delete_confirmation_changed",
            AdminAction::ConfirmDelete => "confirm_delete",
            AdminAction::CloseDialogs => "close_dialogs",
        }
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenView<'a> {
    pub teachers: Vec<&'a TeacherRecord>,
    pub loading: bool,
    pub stats: TeacherStats,
    pub search_term: &'a str,
    pub subject_filter: FilterChoice<Subject>,
    pub status_filter: FilterChoice<TeacherStatus>,
    pub add: ModalPhase,
    pub edit: ModalPhase,
    pub delete: ModalPhase,
}

pub struct TeacherAdminScreen {
    gateway: Arc<dyn TeacherGateway>,
    sink: Arc<dyn NotificationSink>,
    list: TeacherListState,
    add: AddTeacherModal,
    edit: EditTeacherModal,
    delete: DeleteTeacherModal,
}

impl TeacherAdminScreen {
    pub fn new(gateway: Arc<dyn TeacherGateway>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            gateway,
            sink,
            list: TeacherListState::new(),
            add: AddTeacherModal::default(),
            edit: EditTeacherModal::default(),
            delete: DeleteTeacherModal::default(),
        }
    }

    pub fn list(&self) -> &TeacherListState {
        &self.list
    }

    pub fn add_modal(&self) -> &AddTeacherModal {
        &self.add
    }

    pub fn add_modal_mut(&mut self) -> &mut AddTeacherModal {
        &mut self.add
    }

    pub fn edit_modal(&self) -> &EditTeacherModal {
        &self.edit
    }

    pub fn edit_modal_mut(&mut self) -> &mut EditTeacherModal {
        &mut self.edit
    }

    pub fn delete_modal(&self) -> &DeleteTeacherModal {
        &self.delete
    }

    pub fn view(&self) -> ScreenView<'_> {
        ScreenView {
            teachers: self.list.filtered_view().collect(),
            loading: self.list.loading(),
            stats: self.list.derived_stats(),
            search_term: self.list.search_term(),
            subject_filter: self.list.subject_filter(),
            status_filter: self.list.status_filter(),
            add: self.add.phase(),
            edit: self.edit.phase(),
            delete: self.delete.phase(),
        }
    }

    pub async fn reload(&mut self) -> ReloadOutcome {
        self.list.reload(&*self.gateway, &*self.sink).await
    }

    pub async fn submit_add(&mut self) -> Result<TeacherRecord, CoordinatorError> {
        self.add
            .submit(&*self.gateway, &mut self.list, &*self.sink)
            .await
    }

    pub async fn submit_edit(&mut self) -> Result<TeacherRecord, CoordinatorError> {
        self.edit
            .submit(&*self.gateway, &mut self.list, &*self.sink)
            .await
    }

    pub async fn confirm_delete(&mut self) -> Result<(), CoordinatorError> {
        self.delete
            .confirm(&*self.gateway, &mut self.list, &*self.sink)
            .await
    }

    /// Opens the edit dialog for a cached record. Returns `false` when the id
    /// is not in the current list.
    pub fn open_edit(&mut self, id: &TeacherId) -> bool {
        match self.list.find(id) {
            Some(record) => {
                self.edit.open(record);
                true
            }
            None => {
                self.sink
                    .notify(Notification::error(format!("Teacher {id} is no longer listed")));
                false
            }
        }
    }

    pub fn open_delete(&mut self, id: &TeacherId) -> bool {
        match self.list.find(id) {
            Some(record) => {
                self.delete.open(record);
                true
            }
            None => {
                self.sink
                    .notify(Notification::error(format!("Teacher {id} is no longer listed")));
                false
            }
        }
    }

    /// Applies one UI hook. Failures are already reported through the sink or
    /// the dialog's inline state, so nothing is returned.
    pub async fn dispatch(&mut self, action: AdminAction) {
        let name = action.name();
        debug!(action = name, "admin screen action");
        let outcome = match action {
            AdminAction::Activate | AdminAction::Reload => {
                self.reload().await;
                Ok(())
            }
            AdminAction::SearchChanged(term) => {
                self.list.set_search_term(term);
                Ok(())
            }
            AdminAction::SubjectFilterChanged(filter) => {
                self.list.set_subject_filter(filter);
                Ok(())
            }
            AdminAction::StatusFilterChanged(filter) => {
                self.list.set_status_filter(filter);
                Ok(())
            }
            AdminAction::ResetFilters => {
                self.list.reset_filters();
                Ok(())
            }
            AdminAction::OpenAdd => {
                self.add.open();
                Ok(())
            }
            AdminAction::OpenEdit(id) => {
                self.open_edit(&id);
                Ok(())
            }
            AdminAction::OpenDelete(id) => {
                self.open_delete(&id);
                Ok(())
            }
            AdminAction::SubmitAdd => self.submit_add().await.map(drop),
            AdminAction::SubmitEdit => self.submit_edit().await.map(drop),
            AdminAction::DeleteConfirmationChanged(typed) => {
                self.delete.set_confirmation(typed);
                Ok(())
            }
            AdminAction::ConfirmDelete => self.confirm_delete().await,
            AdminAction::CloseDialogs => {
                self.add.close();
                self.edit.close();
                self.delete.close();
                Ok(())
            }
        };

        if let Err(err) = outcome {
            debug!(action = name, error = %err, "admin screen action did not complete");
        }
    }
}

#[cfg(test)]
#[path = "tests/screen_tests.rs"]
mod tests;
