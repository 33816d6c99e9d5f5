//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly; Diesel
//! uses them for compile-time query validation. Regenerate with
//! `diesel print-schema` when migrations change.

diesel::table! {
    /// User profiles. The id doubles as the auth user id.
    profiles (id) {
        id -> Uuid,
        username -> Nullable<Varchar>,
        avatar_url -> Nullable<Text>,
        bio -> Nullable<Text>,
        city -> Nullable<Text>,
        instagram_username -> Nullable<Varchar>,
        twitter_username -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Venue catalogue.
    hotspots (id) {
        id -> Uuid,
        name -> Varchar,
        category -> Varchar,
        address -> Text,
        latitude -> Float8,
        longitude -> Float8,
        description -> Nullable<Text>,
        image_url -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Check-in log. At most one active row per user.
    check_ins (id) {
        id -> Uuid,
        user_id -> Uuid,
        hotspot_id -> Uuid,
        checked_in_at -> Timestamptz,
        is_active -> Bool,
        is_public -> Bool,
        note -> Nullable<Text>,
    }
}

diesel::table! {
    /// Ratings, unique per (user_id, hotspot_id).
    ratings (id) {
        id -> Uuid,
        user_id -> Uuid,
        hotspot_id -> Uuid,
        score -> Int2,
        review -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Friend requests; one row per user pair regardless of orientation.
    friend_requests (id) {
        id -> Uuid,
        sender_id -> Uuid,
        receiver_id -> Uuid,
        status -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Established friendships.
    friendships (id) {
        id -> Uuid,
        user_id_1 -> Uuid,
        user_id_2 -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-user saved hotspot list.
    saved_hotspots (user_id, hotspot_id) {
        user_id -> Uuid,
        hotspot_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Notification inbox rows.
    notifications (id) {
        id -> Uuid,
        user_id -> Uuid,
        actor_id -> Uuid,
        kind -> Varchar,
        message -> Text,
        is_read -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(check_ins -> hotspots (hotspot_id));
diesel::joinable!(check_ins -> profiles (user_id));
diesel::joinable!(ratings -> hotspots (hotspot_id));
diesel::joinable!(ratings -> profiles (user_id));
diesel::joinable!(saved_hotspots -> hotspots (hotspot_id));
diesel::joinable!(saved_hotspots -> profiles (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    profiles,
    hotspots,
    check_ins,
    ratings,
    friend_requests,
    friendships,
    saved_hotspots,
    notifications,
);
