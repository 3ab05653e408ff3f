diesel::table! {
    courses (id) {
        id -> Int4,
        course_code -> Varchar,
    }
}

diesel::table! {
    resources (id) {
        id -> Int4,
        course_code -> Varchar,
        resource_type -> Varchar,
        resource_data -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    courses,
    resources,
);
