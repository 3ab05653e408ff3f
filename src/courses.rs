use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::{ExpressionMethods, PgConnection, QueryDsl, QueryResult, RunQueryDsl, SelectableHelper};

use crate::error::ServiceError;
use crate::models::{Course, NewCourse};
use crate::schema::courses;

pub fn insert_course_into_db(conn: &mut PgConnection, course_code: &str) -> Result<Course, ServiceError> {
    if course_code.trim().is_empty() {
        return Err(ServiceError::InvalidInput("Course code can't be empty".to_string()));
    }

    // The unique constraint decides; there is no pre-check to race against.
    diesel::insert_into(courses::table)
        .values(NewCourse { course_code })
        .returning(Course::as_returning())
        .get_result(conn)
        .map_err(|err| match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                ServiceError::Conflict("Course code must be unique".to_string())
            }
            other => other.into(),
        })
}

pub fn get_courses_from_db(conn: &mut PgConnection) -> QueryResult<Vec<Course>> {
    courses::table
        .select(Course::as_select())
        .order(courses::id.asc())
        .load(conn)
}

pub fn course_exists(conn: &mut PgConnection, course_code: &str) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(
        courses::table.filter(courses::course_code.eq(course_code)),
    ))
    .get_result(conn)
}

pub fn count_courses(conn: &mut PgConnection) -> QueryResult<i64> {
    courses::table.count().get_result(conn)
}
