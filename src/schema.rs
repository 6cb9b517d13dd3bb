table! {
    products (id) {
        id -> Integer,
        name -> VarChar,
        price -> Double,
        stock -> Integer,
        image -> Nullable<VarChar>,
        category_id -> Nullable<Integer>,
        owner_id -> Integer,
        supermarket_id -> Nullable<Integer>,
        barcode -> Nullable<VarChar>,
        unit -> Nullable<VarChar>,
        unit_price -> Nullable<Double>,
        last_updated -> Timestamp,
        created_at -> Timestamp,
    }
}

table! {
    supermarkets (id) {
        id -> Integer,
        name -> VarChar,
        address -> Nullable<VarChar>,
        owner_id -> Nullable<Integer>,
        created_at -> Timestamp,
    }
}

table! {
    users (id) {
        id -> Integer,
        name -> VarChar,
        email -> VarChar,
        password_hash -> VarChar,
        role -> VarChar,
        created_at -> Timestamp,
    }
}

allow_tables_to_appear_in_same_query!(products, supermarkets, users);
