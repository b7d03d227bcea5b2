#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use modkit::RequestCtx;
use modkit_db::{ConnectOpts, DbHandle};
use users_info::contract::{NewUser, User, UserPatch, UsersInfoError};
use users_info::domain::repo::{merge_patch, new_record, UsersRepository};

pub async fn sqlite_memory() -> DbHandle {
    DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .expect("in-memory sqlite should connect")
}

pub fn john() -> NewUser {
    NewUser {
        first_name: "John".into(),
        last_name: "Doe".into(),
        email: "john@example.com".into(),
    }
}

/// In-memory repository that counts how often it is reached.
#[derive(Default)]
pub struct FakeRepo {
    rows: Mutex<HashMap<String, User>>,
    calls: AtomicUsize,
}

impl FakeRepo {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl UsersRepository for FakeRepo {
    async fn create(&self, _ctx: &RequestCtx, new_user: NewUser) -> Result<User, UsersInfoError> {
        self.hit();
        let user = new_record(new_user);
        self.rows
            .lock()
            .unwrap()
            .insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, _ctx: &RequestCtx, id: &str) -> Result<User, UsersInfoError> {
        self.hit();
        self.rows
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| UsersInfoError::not_found(id))
    }

    async fn update(
        &self,
        _ctx: &RequestCtx,
        id: &str,
        patch: UserPatch,
    ) -> Result<User, UsersInfoError> {
        self.hit();
        let mut rows = self.rows.lock().unwrap();
        let current = rows
            .get(id)
            .cloned()
            .ok_or_else(|| UsersInfoError::not_found(id))?;
        let merged = merge_patch(current, &patch);
        rows.insert(id.to_owned(), merged.clone());
        Ok(merged)
    }

    async fn delete(&self, _ctx: &RequestCtx, id: &str) -> Result<(), UsersInfoError> {
        self.hit();
        self.rows
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| UsersInfoError::not_found(id))
    }
}

/// Repository whose every call fails the way a broken store would.
pub struct BrokenRepo;

#[async_trait]
impl UsersRepository for BrokenRepo {
    async fn create(&self, _: &RequestCtx, _: NewUser) -> Result<User, UsersInfoError> {
        Err(UsersInfoError::persistence("connection refused"))
    }
    async fn get_by_id(&self, _: &RequestCtx, _: &str) -> Result<User, UsersInfoError> {
        Err(UsersInfoError::persistence("connection refused"))
    }
    async fn update(&self, _: &RequestCtx, _: &str, _: UserPatch) -> Result<User, UsersInfoError> {
        Err(UsersInfoError::persistence("connection refused"))
    }
    async fn delete(&self, _: &RequestCtx, _: &str) -> Result<(), UsersInfoError> {
        Err(UsersInfoError::persistence("connection refused"))
    }
}
