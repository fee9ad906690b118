// ============================
// courses-backend-lib/src/router.rs
// ============================
//! Route table. Each route names its gate explicitly; handlers never
//! authenticate on their own.
use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::auth::gate;
use crate::handlers::{self, courses, users};
use crate::storage::Storage;
use crate::AppState;

/// Create the application router
pub fn create_router<S: Storage + Clone + 'static>(state: Arc<AppState<S>>) -> Router {
    let any_auth = from_fn_with_state(state.clone(), gate::authenticate_any::<S>);
    let credentials = from_fn_with_state(state.clone(), gate::require_credentials::<S>);
    let token = from_fn_with_state(state.clone(), gate::require_token::<S>);
    let owner = from_fn_with_state(state.clone(), gate::require_owner::<S>);

    Router::new()
        .route("/", get(handlers::welcome))
        .route(
            "/api/users",
            post(users::register::<S>).merge(get(users::current_user::<S>).route_layer(any_auth)),
        )
        .route(
            "/api/users/login",
            post(users::current_user::<S>).route_layer(credentials),
        )
        .route(
            "/api/courses",
            get(courses::list_courses::<S>).merge(post(courses::create_course::<S>).route_layer(token)),
        )
        .route(
            "/api/courses/{id}",
            get(courses::get_course::<S>).merge(
                put(courses::update_course::<S>)
                    .delete(courses::delete_course::<S>)
                    .route_layer(owner),
            ),
        )
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
