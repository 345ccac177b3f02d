use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::Video;

pub async fn get_video(pool: &SqlitePool, id: &str) -> Result<Option<Video>, sqlx::Error> {
    sqlx::query_as::<_, Video>(
        "SELECT id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at \
         FROM videos WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn create_video(
    pool: &SqlitePool,
    user_id: &str,
    title: &str,
    description: Option<&str>,
) -> Result<Video, sqlx::Error> {
    let now = Utc::now();
    let video = Video {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        title: title.to_string(),
        description: description.map(str::to_string),
        thumbnail_url: None,
        video_url: None,
        created_at: Some(now),
        updated_at: Some(now),
    };

    sqlx::query(
        "INSERT INTO videos (id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&video.id)
    .bind(&video.user_id)
    .bind(&video.title)
    .bind(&video.description)
    .bind(&video.thumbnail_url)
    .bind(&video.video_url)
    .bind(video.created_at)
    .bind(video.updated_at)
    .execute(pool)
    .await?;

    Ok(video)
}

/// Write a record back in a single UPDATE. Refreshes `updated_at` on the
/// passed value so the caller's copy matches the row.
pub async fn update_video(pool: &SqlitePool, video: &mut Video) -> Result<(), sqlx::Error> {
    video.updated_at = Some(Utc::now());

    let result = sqlx::query(
        "UPDATE videos SET title = ?, description = ?, thumbnail_url = ?, video_url = ?, updated_at = ? \
         WHERE id = ?",
    )
    .bind(&video.title)
    .bind(&video.description)
    .bind(&video.thumbnail_url)
    .bind(&video.video_url)
    .bind(video.updated_at)
    .bind(&video.id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(sqlx::Error::RowNotFound);
    }

    Ok(())
}
