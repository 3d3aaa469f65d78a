diesel::table! {
    employees (id) {
        id -> Int4,
        full_name -> Varchar,
        position -> Varchar,
    }
}

diesel::table! {
    services (id) {
        id -> Int4,
        name -> Varchar,
        price -> Numeric,
        duration_minutes -> Int4,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    employees,
    services,
);
