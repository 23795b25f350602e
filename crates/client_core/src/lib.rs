//! Client-side core of the teacher admin screen: the backend gateway, the
//! cached list with its filters, and the add/edit/delete dialogs.

pub mod coordinators;
pub mod gateway;
pub mod list_state;
pub mod notify;
pub mod screen;

pub use coordinators::{
    AddTeacherModal, CoordinatorError, DeleteTeacherModal, EditTeacherModal, ModalPhase,
    DELETE_CONFIRMATION_TOKEN,
};
pub use gateway::{HttpTeacherGateway, TeacherGateway};
pub use list_state::{FilterChoice, ReloadOutcome, ReloadTicket, TeacherListState, TeacherStats};
pub use notify::{BroadcastNotifier, Notification, NotificationLevel, NotificationSink};
pub use screen::{AdminAction, ScreenView, TeacherAdminScreen};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
