diesel::table! {
    repair_order_services (id) {
        id -> Int4,
        service_id -> Int4,
        repair_order_id -> Int4,
    }
}

diesel::table! {
    repair_orders (id) {
        id -> Int4,
        client_name -> Varchar,
        client_phone -> Varchar,
        car_make -> Varchar,
        car_model -> Varchar,
        car_plate -> Varchar,
        employee_id -> Int4,
        status -> Varchar,
        created_at -> Timestamptz,
        description -> Nullable<Text>,
    }
}

diesel::joinable!(repair_order_services -> repair_orders (repair_order_id));

diesel::allow_tables_to_appear_in_same_query!(
    repair_order_services,
    repair_orders,
);
