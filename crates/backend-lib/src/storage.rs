// ============================
// courses-backend-lib/src/storage.rs
// ============================
//! Storage abstraction with in-memory and flat-file implementations.
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use courses_common::{AccountId, CourseId};
use dashmap::{mapref::entry::Entry, DashMap};
use tokio::{fs as tokio_fs, sync::Mutex};
use uuid::Uuid;

use crate::error::AppError;
use crate::records::{Account, Course};

/// Message used when an email is already taken
pub const EMAIL_TAKEN: &str = "Email Already Registered";

/// Trait for storage backends.
///
/// Each call is atomic from the caller's point of view. Emails passed in and
/// stored are expected to be normalized already.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Insert a new account; `Conflict` if the email is taken
    async fn insert_account(&self, account: Account) -> Result<(), AppError>;

    async fn account_by_email(&self, email: &str) -> Result<Option<Account>, AppError>;

    async fn account_by_id(&self, id: AccountId) -> Result<Option<Account>, AppError>;

    /// All courses, sorted by title
    async fn list_courses(&self) -> Result<Vec<Course>, AppError>;

    async fn course(&self, id: CourseId) -> Result<Option<Course>, AppError>;

    async fn insert_course(&self, course: Course) -> Result<(), AppError>;

    /// Replace an existing course; `NotFound` if it is gone
    async fn update_course(&self, course: Course) -> Result<(), AppError>;

    /// Delete a course, returning whether it existed
    async fn delete_course(&self, id: CourseId) -> Result<bool, AppError>;
}

fn sort_by_title(courses: &mut [Course]) {
    courses.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
}

/// In-memory storage, used by tests and ephemeral deployments
#[derive(Clone, Default)]
pub struct MemoryStorage {
    accounts: Arc<DashMap<AccountId, Account>>,
    emails: Arc<DashMap<String, AccountId>>,
    courses: Arc<DashMap<CourseId, Course>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn insert_account(&self, account: Account) -> Result<(), AppError> {
        match self.emails.entry(account.email.clone()) {
            Entry::Occupied(_) => Err(AppError::Conflict(EMAIL_TAKEN.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(account.id);
                self.accounts.insert(account.id, account);
                Ok(())
            },
        }
    }

    async fn account_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let Some(id) = self.emails.get(email).map(|entry| *entry) else {
            return Ok(None);
        };
        Ok(self.accounts.get(&id).map(|entry| entry.clone()))
    }

    async fn account_by_id(&self, id: AccountId) -> Result<Option<Account>, AppError> {
        Ok(self.accounts.get(&id).map(|entry| entry.clone()))
    }

    async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        let mut courses: Vec<Course> = self.courses.iter().map(|entry| entry.clone()).collect();
        sort_by_title(&mut courses);
        Ok(courses)
    }

    async fn course(&self, id: CourseId) -> Result<Option<Course>, AppError> {
        Ok(self.courses.get(&id).map(|entry| entry.clone()))
    }

    async fn insert_course(&self, course: Course) -> Result<(), AppError> {
        self.courses.insert(course.id, course);
        Ok(())
    }

    async fn update_course(&self, course: Course) -> Result<(), AppError> {
        match self.courses.get_mut(&course.id) {
            Some(mut existing) => {
                *existing = course;
                Ok(())
            },
            None => Err(AppError::NotFound(format!("course {}", course.id))),
        }
    }

    async fn delete_course(&self, id: CourseId) -> Result<bool, AppError> {
        Ok(self.courses.remove(&id).is_some())
    }
}

/// Flat-file storage: one JSON document per record
#[derive(Clone)]
pub struct FlatFileStorage {
    root: PathBuf,
    // Serializes account writes so the email check and insert are atomic.
    accounts_lock: Arc<Mutex<()>>,
    // Serializes course writes so an update cannot revive a deleted course.
    courses_lock: Arc<Mutex<()>>,
}

impl FlatFileStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("accounts"))?;
        fs::create_dir_all(root.join("courses"))?;
        Ok(Self {
            root,
            accounts_lock: Arc::new(Mutex::new(())),
            courses_lock: Arc::new(Mutex::new(())),
        })
    }

    fn account_path(&self, id: AccountId) -> PathBuf {
        self.root.join("accounts").join(format!("{id}.json"))
    }

    fn course_path(&self, id: CourseId) -> PathBuf {
        self.root.join("courses").join(format!("{id}.json"))
    }

    async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, AppError> {
        match tokio_fs::read_to_string(path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write through a temporary file so readers never see a partial record
    async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(value)?;
        let tmp = path.with_extension(format!("json.{}.tmp", Uuid::new_v4()));
        tokio_fs::write(&tmp, json).await?;
        tokio_fs::rename(&tmp, path).await?;
        Ok(())
    }

    async fn read_dir<T: serde::de::DeserializeOwned>(&self, dir: &str) -> Result<Vec<T>, AppError> {
        let mut entries = tokio_fs::read_dir(self.root.join(dir)).await?;
        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(record) = Self::read_json(&path).await? {
                records.push(record);
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl Storage for FlatFileStorage {
    async fn insert_account(&self, account: Account) -> Result<(), AppError> {
        let _guard = self.accounts_lock.lock().await;
        if self.account_by_email(&account.email).await?.is_some() {
            return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
        }
        Self::write_json(&self.account_path(account.id), &account).await
    }

    async fn account_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let accounts: Vec<Account> = self.read_dir("accounts").await?;
        Ok(accounts.into_iter().find(|a| a.email == email))
    }

    async fn account_by_id(&self, id: AccountId) -> Result<Option<Account>, AppError> {
        Self::read_json(&self.account_path(id)).await
    }

    async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        let mut courses: Vec<Course> = self.read_dir("courses").await?;
        sort_by_title(&mut courses);
        Ok(courses)
    }

    async fn course(&self, id: CourseId) -> Result<Option<Course>, AppError> {
        Self::read_json(&self.course_path(id)).await
    }

    async fn insert_course(&self, course: Course) -> Result<(), AppError> {
        let _guard = self.courses_lock.lock().await;
        Self::write_json(&self.course_path(course.id), &course).await
    }

    async fn update_course(&self, course: Course) -> Result<(), AppError> {
        let _guard = self.courses_lock.lock().await;
        let path = self.course_path(course.id);
        if !tokio_fs::try_exists(&path).await? {
            return Err(AppError::NotFound(format!("course {}", course.id)));
        }
        Self::write_json(&path, &course).await
    }

    async fn delete_course(&self, id: CourseId) -> Result<bool, AppError> {
        let _guard = self.courses_lock.lock().await;
        match tokio_fs::remove_file(self.course_path(id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
