use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::{
    BoolExpressionMethods, Connection, ExpressionMethods, PgConnection, QueryDsl, QueryResult,
    RunQueryDsl, SelectableHelper,
};

use crate::courses::course_exists;
use crate::error::ServiceError;
use crate::models::{NewResource, Resource};
use crate::references::{decode_stored, encode_references};
use crate::schema::resources;

/// Stores `reference` for a course/category pair.
///
/// Fails with `NotFound` when the course is unknown and with `Conflict` when a
/// row of the same pair already holds exactly this reference.
pub fn insert_course_resource_into_db(
    conn: &mut PgConnection,
    course_code: &str,
    resource_type: &str,
    reference: &str,
) -> Result<Resource, ServiceError> {
    if reference.trim().is_empty() {
        return Err(ServiceError::InvalidInput("Resource data can't be empty".to_string()));
    }

    conn.transaction(|conn| {
        if !course_exists(conn, course_code)? {
            return Err(ServiceError::NotFound("Course does not exist".to_string()));
        }

        let existing = get_course_resources_from_db(conn, course_code, resource_type)?;
        if is_duplicate(&existing, reference) {
            return Err(ServiceError::Conflict(
                "This file already exists in the database.".to_string(),
            ));
        }

        diesel::insert_into(resources::table)
            .values(NewResource {
                course_code,
                resource_type,
                resource_data: encode_references(reference),
            })
            .returning(Resource::as_returning())
            .get_result(conn)
            .map_err(|err| match err {
                // course removed between the check and the insert
                DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                    ServiceError::NotFound("Course does not exist".to_string())
                }
                other => other.into(),
            })
    })
}

/// Rows for one course/category pair, in creation order. Possibly empty.
pub fn get_course_resources_from_db(
    conn: &mut PgConnection,
    course_code: &str,
    resource_type: &str,
) -> QueryResult<Vec<Resource>> {
    resources::table
        .filter(
            resources::course_code
                .eq(course_code)
                .and(resources::resource_type.eq(resource_type)),
        )
        .select(Resource::as_select())
        .order(resources::id.asc())
        .load(conn)
}

/// Like [`get_course_resources_from_db`], but an empty result is `NotFound`.
pub fn find_course_resources(
    conn: &mut PgConnection,
    course_code: &str,
    resource_type: &str,
) -> Result<Vec<Resource>, ServiceError> {
    let found = get_course_resources_from_db(conn, course_code, resource_type)?;
    if found.is_empty() {
        return Err(ServiceError::NotFound("Resources not found".to_string()));
    }
    Ok(found)
}

pub fn get_resources_from_db(conn: &mut PgConnection) -> QueryResult<Vec<Resource>> {
    resources::table
        .select(Resource::as_select())
        .order(resources::id.asc())
        .load(conn)
}

/// Whether one of `existing` already holds exactly `reference`.
///
/// Rows are compared on their decoded lists, so a row written with a
/// different JSON spelling of the same reference still counts.
pub fn is_duplicate(existing: &[Resource], reference: &str) -> bool {
    let encoded = encode_references(reference);
    existing.iter().any(|row| {
        row.resource_data == encoded
            || decode_stored(&row.resource_data)
                .is_some_and(|stored| stored.len() == 1 && stored[0] == reference)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i32, resource_data: &str) -> Resource {
        Resource {
            id,
            course_code: "CS301".to_string(),
            resource_type: "notes".to_string(),
            resource_data: resource_data.to_string(),
        }
    }

    #[test]
    fn exact_stored_text_is_a_duplicate() {
        let existing = vec![row(1, r#"["BQAC_abc123"]"#)];
        assert!(is_duplicate(&existing, "BQAC_abc123"));
        assert!(!is_duplicate(&existing, "BQAC_other"));
    }

    #[test]
    fn differently_spelled_json_is_still_a_duplicate() {
        // same list, different whitespace
        let existing = vec![row(1, r#"[ "café notes" ]"#)];
        assert!(is_duplicate(&existing, "café notes"));

        let escaped = vec![row(2, r#"["caf\u00e9 notes"]"#)];
        assert!(is_duplicate(&escaped, "café notes"));
    }

    #[test]
    fn double_encoded_rows_are_compared_on_their_inner_list() {
        let existing = vec![row(1, r#"["[\"BQAC_abc123\"]"]"#)];
        assert!(is_duplicate(&existing, "BQAC_abc123"));
    }

    #[test]
    fn multi_reference_rows_do_not_match_a_single_reference() {
        let existing = vec![row(1, r#"["BQAC_1", "BQAC_2"]"#)];
        assert!(!is_duplicate(&existing, "BQAC_1"));
    }

    #[test]
    fn malformed_rows_never_match() {
        let existing = vec![row(1, "not json"), row(2, "")];
        assert!(!is_duplicate(&existing, "not json"));
        assert!(!is_duplicate(&[], "BQAC_abc123"));
    }
}
