use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

time::serde::format_description!(day, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

impl SocialLinks {
    /// Overwrites only the links present in `other`.
    pub fn merge(&mut self, other: &SocialLinks) {
        let pairs = [
            (&mut self.youtube, &other.youtube),
            (&mut self.facebook, &other.facebook),
            (&mut self.twitter, &other.twitter),
            (&mut self.instagram, &other.instagram),
            (&mut self.linkedin, &other.linkedin),
        ];
        for (dst, src) in pairs {
            if src.is_some() {
                dst.clone_from(src);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(with = "day")]
    pub from: Date,
    #[serde(default, with = "day::option", skip_serializing_if = "Option::is_none")]
    pub to: Option<Date>,
    #[serde(default)]
    pub current: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub id: Uuid,
    pub school: String,
    pub degree: String,
    pub fieldofstudy: String,
    #[serde(with = "day")]
    pub from: Date,
    #[serde(default, with = "day::option", skip_serializing_if = "Option::is_none")]
    pub to: Option<Date>,
    #[serde(default)]
    pub current: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Experience,
    Education,
}

impl EntryKind {
    /// Column holding the sequence in the `profiles` table.
    pub fn column(self) -> &'static str {
        match self {
            EntryKind::Experience => "experience",
            EntryKind::Education => "education",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubEntry {
    Experience(ExperienceEntry),
    Education(EducationEntry),
}

impl SubEntry {
    pub fn id(&self) -> Uuid {
        match self {
            SubEntry::Experience(e) => e.id,
            SubEntry::Education(e) => e.id,
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            SubEntry::Experience(_) => EntryKind::Experience,
            SubEntry::Education(_) => EntryKind::Education,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            SubEntry::Experience(e) => serde_json::to_value(e),
            SubEntry::Education(e) => serde_json::to_value(e),
        }
    }
}

/// The subset of profile fields supplied by one submission. `None` means
/// "leave untouched".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFields {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: Option<String>,
    pub githubusername: Option<String>,
    pub skills: Option<Vec<String>>,
    pub social: SocialLinks,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub githubusername: Option<String>,
    pub skills: Vec<String>,
    pub social: SocialLinks,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

impl Profile {
    pub fn create(user_id: Uuid, fields: &ProfileFields) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            company: fields.company.clone(),
            website: fields.website.clone(),
            location: fields.location.clone(),
            bio: fields.bio.clone(),
            status: fields.status.clone().unwrap_or_default(),
            githubusername: fields.githubusername.clone(),
            skills: fields.skills.clone().unwrap_or_default(),
            social: fields.social.clone(),
            experience: Vec::new(),
            education: Vec::new(),
            date: OffsetDateTime::now_utc(),
        }
    }

    /// Partial update: fields absent from `fields` keep their value.
    pub fn apply(&mut self, fields: &ProfileFields) {
        fn set<T: Clone>(dst: &mut T, src: &Option<T>) {
            if let Some(v) = src {
                dst.clone_from(v);
            }
        }
        fn set_opt<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
            if src.is_some() {
                dst.clone_from(src);
            }
        }
        set_opt(&mut self.company, &fields.company);
        set_opt(&mut self.website, &fields.website);
        set_opt(&mut self.location, &fields.location);
        set_opt(&mut self.bio, &fields.bio);
        set(&mut self.status, &fields.status);
        set_opt(&mut self.githubusername, &fields.githubusername);
        set(&mut self.skills, &fields.skills);
        self.social.merge(&fields.social);
    }

    /// Inserts the entry at the head of its sequence.
    pub fn prepend(&mut self, entry: SubEntry) {
        match entry {
            SubEntry::Experience(e) => self.experience.insert(0, e),
            SubEntry::Education(e) => self.education.insert(0, e),
        }
    }

    /// Removes the entry with `id`. Returns `false`, leaving the sequence
    /// untouched, when no entry matches.
    pub fn remove_entry(&mut self, kind: EntryKind, id: Uuid) -> bool {
        fn remove_by<T>(items: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> bool {
            let Some(pos) = items.iter().position(matches) else {
                return false;
            };
            items.remove(pos);
            true
        }
        match kind {
            EntryKind::Experience => remove_by(&mut self.experience, |e| e.id == id),
            EntryKind::Education => remove_by(&mut self.education, |e| e.id == id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
}

/// A profile joined with its owner's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileWithUser {
    #[serde(flatten)]
    pub profile: Profile,
    pub user: UserSummary,
}
