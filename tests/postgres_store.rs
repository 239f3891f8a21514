//! Те же проверки на PostgreSQL. Нужна БД: DATABASE_URL=... cargo test -- --ignored
mod common;

use sqlx::PgPool;
use venue_booking::store::PgStore;

#[sqlx::test(migrations = "src/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn pg_delete_venue_cascades_to_shows(pool: PgPool) {
    common::delete_venue_cascades_to_shows(&PgStore::new(pool)).await;
}

#[sqlx::test(migrations = "src/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn pg_show_with_missing_artist_is_rejected(pool: PgPool) {
    common::show_with_missing_artist_is_rejected(&PgStore::new(pool)).await;
}

#[sqlx::test(migrations = "src/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn pg_update_changes_only_given_field(pool: PgPool) {
    common::update_changes_only_given_field(&PgStore::new(pool)).await;
}

#[sqlx::test(migrations = "src/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn pg_invalid_update_leaves_record_untouched(pool: PgPool) {
    common::invalid_update_leaves_record_untouched(&PgStore::new(pool)).await;
}

#[sqlx::test(migrations = "src/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn pg_missing_records_are_not_found(pool: PgPool) {
    common::missing_records_are_not_found(&PgStore::new(pool)).await;
}

#[sqlx::test(migrations = "src/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn pg_filter_by_name_is_case_insensitive(pool: PgPool) {
    common::filter_by_name_is_case_insensitive(&PgStore::new(pool)).await;
}

#[sqlx::test(migrations = "src/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn pg_create_rejects_missing_required_fields(pool: PgPool) {
    common::create_rejects_missing_required_fields(&PgStore::new(pool)).await;
}

#[sqlx::test(migrations = "src/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn pg_delete_artist_counts_only_its_shows(pool: PgPool) {
    common::delete_artist_counts_only_its_shows(&PgStore::new(pool)).await;
}
