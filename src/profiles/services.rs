use time::{format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{AppError, Violations},
    profiles::{
        dto::{EducationRequest, ExperienceRequest, ProfileRequest, SkillsInput},
        repo::EntryRemoval,
        repo_types::{
            EducationEntry, EntryKind, ExperienceEntry, Profile, ProfileFields, ProfileWithUser,
            SocialLinks, SubEntry,
        },
    },
    state::AppState,
};

const NO_PROFILE: &str = "Profile does not exist";

/// Trimmed value, or `None` when absent or blank.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn normalize_skills(input: SkillsInput) -> Vec<String> {
    let tokens: Vec<String> = match input {
        SkillsInput::Delimited(s) => s.split(',').map(str::to_string).collect(),
        SkillsInput::List(list) => list,
    };
    tokens
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_date(s: &str) -> Option<Date> {
    let s = s.trim();
    Date::parse(s, format_description!("[year]-[month]-[day]"))
        .ok()
        .or_else(|| OffsetDateTime::parse(s, &Rfc3339).ok().map(|t| t.date()))
}

fn required(
    v: &mut Violations,
    value: Option<String>,
    param: &'static str,
    msg: &'static str,
) -> String {
    let value = present(value);
    v.check(value.is_some(), param, msg);
    value.unwrap_or_default()
}

fn required_date(v: &mut Violations, value: Option<String>, missing: &'static str) -> Date {
    match present(value) {
        None => {
            v.push("from", missing);
            Date::MIN
        }
        Some(s) => parse_date(&s).unwrap_or_else(|| {
            v.push("from", "Starting date must be a valid date");
            Date::MIN
        }),
    }
}

fn optional_date(v: &mut Violations, value: Option<String>) -> Option<Date> {
    let s = present(value)?;
    let date = parse_date(&s);
    v.check(date.is_some(), "to", "End date must be a valid date");
    date
}

/// Validates a profile submission and keeps only the supplied fields.
pub fn build_fields(req: ProfileRequest) -> Result<ProfileFields, AppError> {
    let status = present(req.status);
    let skills = req.skills.map(normalize_skills).filter(|s| !s.is_empty());

    let mut v = Violations::new();
    v.check(status.is_some(), "status", "Status is required");
    v.check(skills.is_some(), "skills", "Skills is required");
    v.finish()?;

    Ok(ProfileFields {
        company: present(req.company),
        website: present(req.website),
        location: present(req.location),
        bio: present(req.bio),
        status,
        githubusername: present(req.githubusername),
        skills,
        social: SocialLinks {
            youtube: present(req.youtube),
            facebook: present(req.facebook),
            twitter: present(req.twitter),
            instagram: present(req.instagram),
            linkedin: present(req.linkedin),
        },
    })
}

pub fn build_experience(req: ExperienceRequest) -> Result<ExperienceEntry, AppError> {
    let mut v = Violations::new();
    let title = required(&mut v, req.title, "title", "Title is required");
    let company = required(&mut v, req.company, "company", "Company is required");
    let from = required_date(&mut v, req.from, "Starting date is required");
    let to = optional_date(&mut v, req.to);
    v.finish()?;

    Ok(ExperienceEntry {
        id: Uuid::new_v4(),
        title,
        company,
        location: present(req.location),
        from,
        to,
        current: req.current.unwrap_or(false),
        description: present(req.description),
    })
}

pub fn build_education(req: EducationRequest) -> Result<EducationEntry, AppError> {
    let mut v = Violations::new();
    let school = required(&mut v, req.school, "school", "School is required");
    let degree = required(&mut v, req.degree, "degree", "Degree is required");
    let fieldofstudy = required(
        &mut v,
        req.fieldofstudy,
        "fieldofstudy",
        "Field of study is required",
    );
    let from = required_date(&mut v, req.from, "Starting date is required");
    let to = optional_date(&mut v, req.to);
    v.finish()?;

    Ok(EducationEntry {
        id: Uuid::new_v4(),
        school,
        degree,
        fieldofstudy,
        from,
        to,
        current: req.current.unwrap_or(false),
        description: present(req.description),
    })
}

pub async fn submit(
    state: &AppState,
    user_id: Uuid,
    req: ProfileRequest,
) -> Result<Profile, AppError> {
    let fields = build_fields(req)?;
    if state.users.find_by_id(user_id).await?.is_none() {
        warn!(user_id = %user_id, "profile submitted for missing user");
        return Err(AppError::NotFound("User not found"));
    }
    let profile = state.profiles.upsert(user_id, &fields).await?;
    info!(user_id = %user_id, profile_id = %profile.id, "profile saved");
    Ok(profile)
}

pub async fn me(state: &AppState, user_id: Uuid) -> Result<ProfileWithUser, AppError> {
    state
        .profiles
        .find_by_user(user_id)
        .await?
        .ok_or(AppError::NotFound("No profile for this user"))
}

pub async fn list(state: &AppState) -> Result<Vec<ProfileWithUser>, AppError> {
    Ok(state.profiles.list().await?)
}

pub async fn get(state: &AppState, raw_user_id: &str) -> Result<ProfileWithUser, AppError> {
    const NOT_FOUND: AppError = AppError::NotFound("Profile not found");
    let user_id = Uuid::parse_str(raw_user_id).map_err(|_| NOT_FOUND)?;
    state.profiles.find_by_user(user_id).await?.ok_or(NOT_FOUND)
}

/// Deletes the profile, then the user. The two steps are not atomic and
/// the user's posts are kept.
pub async fn remove(state: &AppState, user_id: Uuid) -> Result<(), AppError> {
    let had_profile = state.profiles.delete_by_user(user_id).await?;
    let had_user = state.users.delete(user_id).await?;
    info!(user_id = %user_id, had_profile, had_user, "profile and user removed");
    Ok(())
}

pub async fn add_entry(
    state: &AppState,
    user_id: Uuid,
    entry: SubEntry,
) -> Result<Profile, AppError> {
    let entry_id = entry.id();
    let kind = entry.kind();
    let profile = state
        .profiles
        .push_entry(user_id, entry)
        .await?
        .ok_or(AppError::NotFound(NO_PROFILE))?;
    info!(user_id = %user_id, entry_id = %entry_id, ?kind, "profile entry added");
    Ok(profile)
}

pub async fn remove_entry(
    state: &AppState,
    user_id: Uuid,
    kind: EntryKind,
    raw_entry_id: &str,
) -> Result<Profile, AppError> {
    const NO_ENTRY: AppError = AppError::NotFound("Entry not found");
    let entry_id = Uuid::parse_str(raw_entry_id).map_err(|_| NO_ENTRY)?;
    match state.profiles.remove_entry(user_id, kind, entry_id).await? {
        EntryRemoval::Removed(profile) => {
            info!(user_id = %user_id, entry_id = %entry_id, ?kind, "profile entry removed");
            Ok(profile)
        }
        EntryRemoval::ProfileMissing => Err(AppError::NotFound(NO_PROFILE)),
        EntryRemoval::EntryMissing => {
            warn!(user_id = %user_id, entry_id = %entry_id, ?kind, "profile entry not found");
            Err(NO_ENTRY)
        }
    }
}
