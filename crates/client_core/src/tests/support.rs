use std::{
    collections::VecDeque,
    sync::Mutex,
};

use async_trait::async_trait;
use shared::{
    domain::{Subject, TeacherId, TeacherRecord, TeacherStatus},
    error::FetchError,
    protocol::{CreateTeacherRequest, UpdateTeacherRequest},
};

use crate::{
    gateway::TeacherGateway,
    notify::{Notification, NotificationSink},
};

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    List,
    Create(CreateTeacherRequest),
    Update(TeacherId, UpdateTeacherRequest),
    Remove(TeacherId),
}

/// Answers each call kind from its own queue; an empty queue is a failure.
#[derive(Default)]
pub struct ScriptedGateway {
    lists: Mutex<VecDeque<Result<Vec<TeacherRecord>, FetchError>>>,
    creates: Mutex<VecDeque<Result<TeacherRecord, FetchError>>>,
    updates: Mutex<VecDeque<Result<TeacherRecord, FetchError>>>,
    removes: Mutex<VecDeque<Result<(), FetchError>>>,
    calls: Mutex<Vec<GatewayCall>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_list(&self, result: Result<Vec<TeacherRecord>, FetchError>) -> &Self {
        self.lists.lock().unwrap().push_back(result);
        self
    }

    pub fn push_create(&self, result: Result<TeacherRecord, FetchError>) -> &Self {
        self.creates.lock().unwrap().push_back(result);
        self
    }

    pub fn push_update(&self, result: Result<TeacherRecord, FetchError>) -> &Self {
        self.updates.lock().unwrap().push_back(result);
        self
    }

    pub fn push_remove(&self, result: Result<(), FetchError>) -> &Self {
        self.removes.lock().unwrap().push_back(result);
        self
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }
}

fn next<T>(queue: &Mutex<VecDeque<Result<T, FetchError>>>) -> Result<T, FetchError> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(FetchError::new("unscripted gateway call")))
}

#[async_trait]
impl TeacherGateway for ScriptedGateway {
    async fn list(&self) -> Result<Vec<TeacherRecord>, FetchError> {
        self.record(GatewayCall::List);
        next(&self.lists)
    }

    async fn create(&self, request: &CreateTeacherRequest) -> Result<TeacherRecord, FetchError> {
        self.record(GatewayCall::Create(request.clone()));
        next(&self.creates)
    }

    async fn update(
        &self,
        id: &TeacherId,
        request: &UpdateTeacherRequest,
    ) -> Result<TeacherRecord, FetchError> {
        self.record(GatewayCall::Update(id.clone(), request.clone()));
        next(&self.updates)
    }

    async fn remove(&self, id: &TeacherId) -> Result<(), FetchError> {
        self.record(GatewayCall::Remove(id.clone()));
        next(&self.removes)
    }
}

/// A backend that never answers.
pub struct StalledGateway;

#[async_trait]
impl TeacherGateway for StalledGateway {
    async fn list(&self) -> Result<Vec<TeacherRecord>, FetchError> {
        std::future::pending().await
    }

    async fn create(&self, _request: &CreateTeacherRequest) -> Result<TeacherRecord, FetchError> {
        std::future::pending().await
    }

    async fn update(
        &self,
        _id: &TeacherId,
        _request: &UpdateTeacherRequest,
    ) -> Result<TeacherRecord, FetchError> {
        std::future::pending().await
    }

    async fn remove(&self, _id: &TeacherId) -> Result<(), FetchError> {
        std::future::pending().await
    }
}

#[derive(Default)]
pub struct RecordingSink {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn all(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(Notification::is_error)
            .map(|notification| notification.message)
            .collect()
    }

    pub fn successes(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(|notification| !notification.is_error())
            .map(|notification| notification.message)
            .collect()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}

pub fn teacher(id: &str, name: &str, subject: Subject, status: TeacherStatus) -> TeacherRecord {
    TeacherRecord {
        id: TeacherId::from(id),
        name: name.to_string(),
        email: format!("{}@school.pk", name.to_lowercase().replace(' ', ".")),
        phone: "0300-1234567".to_string(),
        subject,
        classes: 2,
        experience: 5,
        total_students: 80,
        rating: 4.2,
        schedule: None,
        status,
        join_date: None,
    }
}
