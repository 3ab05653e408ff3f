use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use diesel::{PgConnection, RunQueryDsl};
use serde::Deserialize;
use serde_json::from_reader;
use tracing::info;

use crate::connection::{interact, DbPool};
use crate::courses::count_courses;
use crate::error::ServiceError;
use crate::models::NewCourse;
use crate::schema::courses;

#[derive(Deserialize, Debug, PartialEq, Eq)]
struct CourseJson {
    course_code: String,
}

/// Inserts the courses listed in `json_path` if the courses table is empty.
/// Returns how many were inserted.
pub async fn seed_courses_if_empty(pool: &DbPool, json_path: &Path) -> Result<usize, ServiceError> {
    let courses_data = read_courses_file(json_path)?;
    let inserted = interact(pool, move |conn| insert_if_empty(conn, &courses_data)).await?;
    if inserted > 0 {
        info!(inserted, path = %json_path.display(), "seeded courses table");
    }
    Ok(inserted)
}

fn read_courses_file(json_path: &Path) -> Result<Vec<CourseJson>, ServiceError> {
    let file = File::open(json_path).map_err(|err| seed_error(json_path, err))?;
    let reader = BufReader::new(file);
    from_reader(reader).map_err(|err| seed_error(json_path, err))
}

fn seed_error(json_path: &Path, err: impl std::fmt::Display) -> ServiceError {
    ServiceError::InvalidInput(format!("could not read {}: {}", json_path.display(), err))
}

fn insert_if_empty(conn: &mut PgConnection, courses_data: &[CourseJson]) -> Result<usize, ServiceError> {
    if count_courses(conn)? != 0 {
        return Ok(0);
    }

    let new_courses: Vec<NewCourse> = courses_data
        .iter()
        .map(|course| course.course_code.trim())
        .filter(|code| !code.is_empty())
        .map(|course_code| NewCourse { course_code })
        .collect();

    Ok(diesel::insert_into(courses::table)
        .values(&new_courses)
        .on_conflict_do_nothing()
        .execute(conn)?)
}
