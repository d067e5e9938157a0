use serde::{Deserialize, Serialize};

/// `skills` arrives as a comma separated string; a JSON array is accepted too.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SkillsInput {
    Delimited(String),
    List(Vec<String>),
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileRequest {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: Option<String>,
    pub githubusername: Option<String>,
    pub skills: Option<SkillsInput>,
    pub youtube: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub linkedin: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExperienceRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub current: Option<bool>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EducationRequest {
    pub school: Option<String>,
    pub degree: Option<String>,
    pub fieldofstudy: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub current: Option<bool>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfilePayload<T> {
    pub profile: T,
}

#[derive(Debug, Serialize)]
pub struct ProfilesPayload<T> {
    pub profiles: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct MessagePayload {
    pub msg: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReposPayload {
    pub repos: serde_json::Value,
}
