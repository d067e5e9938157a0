use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::StoreError;
use crate::profiles::repo_types::{
    EducationEntry, EntryKind, ExperienceEntry, Profile, ProfileFields, ProfileWithUser,
    SocialLinks, SubEntry, UserSummary,
};

/// Result of removing a sub-entry.
#[derive(Debug)]
pub enum EntryRemoval {
    Removed(Profile),
    ProfileMissing,
    EntryMissing,
}

/// Every mutation is a single atomic step per profile.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<ProfileWithUser>, StoreError>;
    async fn list(&self) -> Result<Vec<ProfileWithUser>, StoreError>;
    /// Creates the user's profile or applies `fields` to the existing one.
    async fn upsert(&self, user_id: Uuid, fields: &ProfileFields) -> Result<Profile, StoreError>;
    /// Prepends `entry`; `None` when the user has no profile.
    async fn push_entry(&self, user_id: Uuid, entry: SubEntry)
        -> Result<Option<Profile>, StoreError>;
    async fn remove_entry(
        &self,
        user_id: Uuid,
        kind: EntryKind,
        entry_id: Uuid,
    ) -> Result<EntryRemoval, StoreError>;
    async fn delete_by_user(&self, user_id: Uuid) -> Result<bool, StoreError>;
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    id: Uuid,
    user_id: Uuid,
    company: Option<String>,
    website: Option<String>,
    location: Option<String>,
    bio: Option<String>,
    status: String,
    githubusername: Option<String>,
    skills: Vec<String>,
    social: Json<SocialLinks>,
    experience: Json<Vec<ExperienceEntry>>,
    education: Json<Vec<EducationEntry>>,
    date: OffsetDateTime,
}

impl From<ProfileRow> for Profile {
    fn from(r: ProfileRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            company: r.company,
            website: r.website,
            location: r.location,
            bio: r.bio,
            status: r.status,
            githubusername: r.githubusername,
            skills: r.skills,
            social: r.social.0,
            experience: r.experience.0,
            education: r.education.0,
            date: r.date,
        }
    }
}

#[derive(Debug, FromRow)]
struct ProfileUserRow {
    #[sqlx(flatten)]
    profile: ProfileRow,
    user_name: String,
}

impl From<ProfileUserRow> for ProfileWithUser {
    fn from(r: ProfileUserRow) -> Self {
        let user = UserSummary {
            id: r.profile.user_id,
            name: r.user_name,
        };
        Self {
            profile: r.profile.into(),
            user,
        }
    }
}

const RETURNING: &str = "RETURNING id, user_id, company, website, location, bio, status, \
     githubusername, skills, social, experience, education, date";

const SELECT_WITH_USER: &str = r#"
    SELECT p.id, p.user_id, p.company, p.website, p.location, p.bio, p.status,
           p.githubusername, p.skills, p.social, p.experience, p.education, p.date,
           u.name AS user_name
      FROM profiles p
      JOIN users u ON u.id = p.user_id
"#;

#[derive(Clone)]
pub struct PgProfileStore {
    db: PgPool,
}

impl PgProfileStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn exists(&self, user_id: Uuid) -> Result<bool, StoreError> {
        let found: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(found.is_some())
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<ProfileWithUser>, StoreError> {
        let sql = format!("{SELECT_WITH_USER} WHERE p.user_id = $1");
        let row = sqlx::query_as::<_, ProfileUserRow>(&sql)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<ProfileWithUser>, StoreError> {
        let sql = format!("{SELECT_WITH_USER} ORDER BY p.date ASC");
        let rows = sqlx::query_as::<_, ProfileUserRow>(&sql)
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn upsert(&self, user_id: Uuid, fields: &ProfileFields) -> Result<Profile, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO profiles
                (id, user_id, company, website, location, bio, status, githubusername, skills, social)
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, ''), $8, COALESCE($9, '{{}}'::text[]), $10)
            ON CONFLICT (user_id) DO UPDATE SET
                company        = COALESCE($3, profiles.company),
                website        = COALESCE($4, profiles.website),
                location       = COALESCE($5, profiles.location),
                bio            = COALESCE($6, profiles.bio),
                status         = COALESCE($7, profiles.status),
                githubusername = COALESCE($8, profiles.githubusername),
                skills         = COALESCE($9, profiles.skills),
                social         = profiles.social || $10
            {RETURNING}
            "#
        );
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(&fields.company)
            .bind(&fields.website)
            .bind(&fields.location)
            .bind(&fields.bio)
            .bind(&fields.status)
            .bind(&fields.githubusername)
            .bind(&fields.skills)
            .bind(Json(&fields.social))
            .fetch_one(&self.db)
            .await?;
        Ok(row.into())
    }

    async fn push_entry(
        &self,
        user_id: Uuid,
        entry: SubEntry,
    ) -> Result<Option<Profile>, StoreError> {
        let column = entry.kind().column();
        let value = entry.to_json().map_err(anyhow::Error::from)?;
        let sql = format!(
            "UPDATE profiles SET {column} = jsonb_build_array($2::jsonb) || {column} \
             WHERE user_id = $1 {RETURNING}"
        );
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(user_id)
            .bind(Json(value))
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn remove_entry(
        &self,
        user_id: Uuid,
        kind: EntryKind,
        entry_id: Uuid,
    ) -> Result<EntryRemoval, StoreError> {
        let column = kind.column();
        let sql = format!(
            r#"
            UPDATE profiles
               SET {column} = COALESCE(
                     (SELECT jsonb_agg(e ORDER BY ord)
                        FROM jsonb_array_elements({column}) WITH ORDINALITY AS t(e, ord)
                       WHERE e->>'id' <> $2),
                     '[]'::jsonb)
             WHERE user_id = $1
               AND EXISTS (SELECT 1
                             FROM jsonb_array_elements({column}) AS x(e)
                            WHERE x.e->>'id' = $2)
            {RETURNING}
            "#
        );
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(user_id)
            .bind(entry_id.to_string())
            .fetch_optional(&self.db)
            .await?;
        match row {
            Some(row) => Ok(EntryRemoval::Removed(row.into())),
            None if self.exists(user_id).await? => Ok(EntryRemoval::EntryMissing),
            None => Ok(EntryRemoval::ProfileMissing),
        }
    }

    async fn delete_by_user(&self, user_id: Uuid) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
