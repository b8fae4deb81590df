use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::repository::Document;
use crate::database::store::Collection;

/// One per user, keyed by `user`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub user: Uuid,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub status: String,
    #[serde(default)]
    pub skills: Vec<String>,
    pub bio: Option<String>,
    pub githubusername: Option<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub social: Social,
    pub date: DateTime<Utc>,
    #[serde(rename = "__v", default)]
    pub version: u64,
}

impl Profile {
    pub fn new(user: Uuid, status: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user,
            company: None,
            website: None,
            location: None,
            status,
            skills: Vec::new(),
            bio: None,
            githubusername: None,
            experience: Vec::new(),
            education: Vec::new(),
            social: Social::default(),
            date: Utc::now(),
            version: 0,
        }
    }
}

impl Document for Profile {
    const COLLECTION: Collection = Collection::Profiles;

    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Social {
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub id: Uuid,
    pub school: String,
    pub degree: String,
    pub fieldofstudy: String,
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub current: bool,
    pub description: Option<String>,
}
