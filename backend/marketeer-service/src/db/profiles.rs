/// Profile database operations
use crate::error::Result;
use crate::models::Profile;
use sqlx::PgPool;
use uuid::Uuid;

/// Fields accepted by the profile upsert
#[derive(Debug)]
pub struct ProfileUpsert<'a> {
    pub product_name: &'a str,
    pub description: &'a str,
    pub target_audience: &'a str,
    pub key_features: &'a [String],
    pub tone_preference: &'a str,
    pub custom_tone: Option<&'a str>,
    pub handle: Option<&'a str>,
}

/// Insert or replace the user's product profile
pub async fn upsert(pool: &PgPool, user_id: Uuid, fields: ProfileUpsert<'_>) -> Result<Profile> {
    let profile = sqlx::query_as::<_, Profile>(
        r#"
        INSERT INTO profiles (
            user_id, product_name, description, target_audience,
            key_features, tone_preference, custom_tone, handle
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (user_id) DO UPDATE
        SET product_name = EXCLUDED.product_name,
            description = EXCLUDED.description,
            target_audience = EXCLUDED.target_audience,
            key_features = EXCLUDED.key_features,
            tone_preference = EXCLUDED.tone_preference,
            custom_tone = EXCLUDED.custom_tone,
            handle = EXCLUDED.handle,
            updated_at = NOW()
        RETURNING id, user_id, product_name, description, target_audience,
                  key_features, tone_preference, custom_tone, handle,
                  created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(fields.product_name)
    .bind(fields.description)
    .bind(fields.target_audience)
    .bind(fields.key_features)
    .bind(fields.tone_preference)
    .bind(fields.custom_tone)
    .bind(fields.handle)
    .fetch_one(pool)
    .await?;

    Ok(profile)
}

/// Find the profile belonging to a user
pub async fn find_by_user_id(pool: &PgPool, user_id: Uuid) -> Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>(
        r#"
        SELECT id, user_id, product_name, description, target_audience,
               key_features, tone_preference, custom_tone, handle,
               created_at, updated_at
        FROM profiles
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(profile)
}
