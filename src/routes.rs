use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::connection::{interact, DbPool};
use crate::courses::{get_courses_from_db, insert_course_into_db};
use crate::error::ServiceError;
use crate::models::{Course, CreateCourseRequest, ResourceResponse, UploadResourceRequest};
use crate::resources::{find_course_resources, get_resources_from_db, insert_course_resource_into_db};

/// Shared handler state, built once at start-up.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/add-courses", post(add_course))
        .route("/get-courses", get(get_courses))
        .route("/get-resources", get(get_all_resources))
        .route("/get-resources/:course_id/:resource_type", get(get_resources))
        .route(
            "/add-resources/:course_code/:resource_type/upload",
            post(add_resource),
        )
        .route("/healthz", get(health_check))
        .with_state(state)
}

async fn add_course(
    State(state): State<AppState>,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<Json<Course>, ServiceError> {
    let course_code = payload.course_code;
    let result = interact(&state.pool, {
        let course_code = course_code.clone();
        move |conn| insert_course_into_db(conn, &course_code)
    })
    .await;

    match result {
        Ok(course) => {
            info!(course_code = %course.course_code, id = course.id, "course created");
            Ok(Json(course))
        }
        Err(err @ ServiceError::Conflict(_)) => {
            info!(%course_code, "rejected duplicate course");
            Err(err)
        }
        Err(err) => Err(err),
    }
}

async fn get_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, ServiceError> {
    let courses = interact(&state.pool, |conn| Ok(get_courses_from_db(conn)?)).await?;
    Ok(Json(courses))
}

async fn get_all_resources(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResourceResponse>>, ServiceError> {
    let resources = interact(&state.pool, |conn| Ok(get_resources_from_db(conn)?)).await?;
    Ok(Json(resources.into_iter().map(ResourceResponse::from).collect()))
}

async fn get_resources(
    State(state): State<AppState>,
    Path((course_id, resource_type)): Path<(String, String)>,
) -> Result<Json<Vec<ResourceResponse>>, ServiceError> {
    let result = interact(&state.pool, {
        let (course_id, resource_type) = (course_id.clone(), resource_type.clone());
        move |conn| find_course_resources(conn, &course_id, &resource_type)
    })
    .await;

    let resources = match result {
        Ok(resources) => resources,
        Err(err @ ServiceError::NotFound(_)) => {
            info!(course_code = %course_id, %resource_type, "no resources for pair");
            return Err(err);
        }
        Err(err) => return Err(err),
    };

    let responses: Vec<ResourceResponse> = resources.into_iter().map(ResourceResponse::from).collect();
    for response in responses.iter().filter(|r| r.resource_data.is_none()) {
        warn!(id = response.id, "stored resource data is not valid JSON");
    }
    Ok(Json(responses))
}

async fn add_resource(
    State(state): State<AppState>,
    Path((course_code, resource_type)): Path<(String, String)>,
    Json(payload): Json<UploadResourceRequest>,
) -> Result<Json<ResourceResponse>, ServiceError> {
    if payload.course_code.as_deref().is_some_and(|code| code != course_code)
        || payload.resource_type.as_deref().is_some_and(|kind| kind != resource_type)
    {
        warn!(%course_code, %resource_type, "upload body disagrees with path, using path");
    }

    let result = interact(&state.pool, {
        let (course_code, resource_type) = (course_code.clone(), resource_type.clone());
        move |conn| insert_course_resource_into_db(conn, &course_code, &resource_type, &payload.resource_data)
    })
    .await;

    match result {
        Ok(resource) => {
            info!(%course_code, %resource_type, id = resource.id, "resource stored");
            Ok(Json(ResourceResponse::from(resource)))
        }
        Err(err @ (ServiceError::Conflict(_) | ServiceError::NotFound(_))) => {
            info!(%course_code, %resource_type, reason = %err, "resource rejected");
            Err(err)
        }
        Err(err) => Err(err),
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
