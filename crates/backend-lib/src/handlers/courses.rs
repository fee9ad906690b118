// ============================
// crates/backend-lib/src/handlers/courses.rs
// ============================
//! Course CRUD.
use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use courses_common::{AccountId, CourseInput, CourseView};
use metrics::counter;
use tracing::info;
use uuid::Uuid;

use crate::auth::gate::{Authenticated, OwnedCourse};
use crate::error::AppError;
use crate::metrics::{COURSE_CREATED, COURSE_DELETED, COURSE_UPDATED};
use crate::records::{Account, Course};
use crate::storage::Storage;
use crate::validation::{validate_course, CourseAction};
use crate::AppState;

/// `GET /api/courses`: every course, sorted by title, owners populated
pub async fn list_courses<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<CourseView>>, AppError> {
    let courses = state.storage.list_courses().await?;

    let mut owners: HashMap<AccountId, Option<Account>> = HashMap::new();
    let mut views = Vec::with_capacity(courses.len());
    for course in &courses {
        let owner = match course.owner {
            Some(id) => {
                if !owners.contains_key(&id) {
                    owners.insert(id, state.storage.account_by_id(id).await?);
                }
                owners.get(&id).and_then(Option::as_ref)
            },
            None => None,
        };
        views.push(course.view(owner));
    }

    Ok(Json(views))
}

/// `GET /api/courses/{id}`
pub async fn get_course<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<CourseView>, AppError> {
    let not_found = || AppError::NotFound(format!("course {id}"));
    let course_id = Uuid::parse_str(&id).map_err(|_| not_found())?;
    let course = state.storage.course(course_id).await?.ok_or_else(not_found)?;

    let owner = owner_of(&*state, &course).await?;
    Ok(Json(course.view(owner.as_ref())))
}

/// `POST /api/courses`: create a course owned by the caller
pub async fn create_course<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(auth): Extension<Authenticated>,
    Json(input): Json<CourseInput>,
) -> Result<impl IntoResponse, AppError> {
    validate_course(&input, CourseAction::Creation)?;

    let owner = state.gate.resolve_account(&auth.principal).await?;
    let course = Course::new(input, owner.id);
    let location = format!("/api/courses/{}", course.id);
    state.storage.insert_course(course).await?;

    info!(%location, owner = %owner.id, "course created");
    counter!(COURSE_CREATED).increment(1);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)]))
}

/// `PUT /api/courses/{id}`: owner only
pub async fn update_course<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(owned): Extension<OwnedCourse>,
    Json(input): Json<CourseInput>,
) -> Result<StatusCode, AppError> {
    validate_course(&input, CourseAction::Update)?;

    let mut course = owned.course;
    course.apply(input);
    state.storage.update_course(course).await?;

    counter!(COURSE_UPDATED).increment(1);
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/courses/{id}`: owner only
pub async fn delete_course<S: Storage + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(owned): Extension<OwnedCourse>,
) -> Result<StatusCode, AppError> {
    if !state.storage.delete_course(owned.course.id).await? {
        return Err(AppError::NotFound(format!("course {}", owned.course.id)));
    }

    info!(course = %owned.course.id, "course deleted");
    counter!(COURSE_DELETED).increment(1);
    Ok(StatusCode::NO_CONTENT)
}

async fn owner_of<S: Storage + Clone + 'static>(
    state: &AppState<S>,
    course: &Course,
) -> Result<Option<Account>, AppError> {
    match course.owner {
        Some(id) => state.storage.account_by_id(id).await,
        None => Ok(None),
    }
}
