use crate::references::decode_stored;
use crate::schema::{courses, resources};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Queryable, Selectable, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Course {
    pub id: i32,
    pub course_code: String, /* CS301 */
}

#[derive(Insertable)]
#[diesel(table_name = courses)]
pub struct NewCourse<'a> {
    pub course_code: &'a str,
}

/// A resource row as stored. `resource_data` is JSON text, normally a
/// one-element array of references.
#[derive(Queryable, Selectable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = resources)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Resource {
    pub id: i32,
    pub course_code: String,
    pub resource_type: String, /* notes, pqimages, pqfiles, textbooks, code, others */
    pub resource_data: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = resources)]
pub struct NewResource<'a> {
    pub course_code: &'a str,
    pub resource_type: &'a str,
    pub resource_data: String,
}

/// Resource row as returned over HTTP, with the reference list decoded.
/// `resource_data` is `null` when the stored text is not JSON.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResourceResponse {
    pub id: i32,
    pub course_code: String,
    pub resource_type: String,
    pub resource_data: Option<Vec<String>>,
}

impl From<Resource> for ResourceResponse {
    fn from(resource: Resource) -> Self {
        let resource_data = decode_stored(&resource.resource_data);
        ResourceResponse {
            id: resource.id,
            course_code: resource.course_code,
            resource_type: resource.resource_type,
            resource_data,
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct CreateCourseRequest {
    pub course_code: String,
}

/// Body of the upload route. The path carries the course code and type, the
/// body copies are accepted for compatibility and otherwise ignored.
#[derive(Deserialize, Serialize, Debug)]
pub struct UploadResourceRequest {
    #[serde(default)]
    pub course_code: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
    pub resource_data: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}
