// Table definitions for the offline mirror database.

diesel::table! {
    fasts (id) {
        id -> Text,
        user_id -> Text,
        name -> Text,
        total_days -> Integer,
        start_date -> Text,
        days_completed_before_app -> Integer,
        is_active -> Bool,
        created_at -> Text,
        updated_at -> Text,
        pending_sync -> Bool,
        last_synced -> Nullable<Text>,
    }
}

diesel::table! {
    fast_blocks (id) {
        id -> Text,
        fast_id -> Text,
        name -> Text,
        total_days -> Integer,
        order_index -> Integer,
        manually_completed -> Bool,
        created_at -> Text,
        pending_sync -> Bool,
        last_synced -> Nullable<Text>,
    }
}

diesel::table! {
    fast_days (id) {
        id -> Text,
        fast_id -> Text,
        block_id -> Nullable<Text>,
        date -> Text,
        completed -> Bool,
        created_at -> Text,
        pending_sync -> Bool,
        last_synced -> Nullable<Text>,
    }
}

diesel::table! {
    sync_queue (id) {
        id -> BigInt,
        table_name -> Text,
        op -> Text,
        record_id -> Text,
        payload -> Text,
        created_at -> Text,
        attempts -> Integer,
        status -> Text,
        next_retry_at -> Nullable<Text>,
        last_error -> Nullable<Text>,
        last_error_code -> Nullable<Text>,
    }
}

diesel::table! {
    sync_engine_state (id) {
        id -> Integer,
        last_push_at -> Nullable<Text>,
        last_pull_at -> Nullable<Text>,
        last_synced_at -> Nullable<Text>,
        last_error -> Nullable<Text>,
        consecutive_failures -> Integer,
        next_retry_at -> Nullable<Text>,
        last_cycle_status -> Nullable<Text>,
        last_cycle_duration_ms -> Nullable<BigInt>,
    }
}

diesel::joinable!(fast_blocks -> fasts (fast_id));
diesel::joinable!(fast_days -> fasts (fast_id));

diesel::allow_tables_to_appear_in_same_query!(fasts, fast_blocks, fast_days);
