use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::models::{EducationEntry, ExperienceEntry, Profile, User, UserSummary};
use crate::database::{Collection, Filter, Repository, StoreError};
use crate::middleware::AuthUser;
use crate::state::AppState;
use crate::validation::{parse_date, FieldError, Validator};

use super::error::{ResourceKind, ServiceError, ServiceResult};
use super::mutation;
use super::ownership::{authorize, Operation};
use super::resolver::{parse_id, Resolver};

/// Skills arrive either as `"rust, go"` or `["rust", "go"]`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SkillsInput {
    List(Vec<String>),
    Csv(String),
}

impl SkillsInput {
    /// Trimmed, blanks dropped, first occurrence wins
    pub fn into_skills(self) -> Vec<String> {
        let raw: Vec<String> = match self {
            SkillsInput::List(items) => items,
            SkillsInput::Csv(csv) => csv.split(',').map(str::to_string).collect(),
        };

        let mut skills: Vec<String> = Vec::with_capacity(raw.len());
        for skill in raw {
            let skill = skill.trim();
            if !skill.is_empty() && !skills.iter().any(|s| s == skill) {
                skills.push(skill.to_string());
            }
        }
        skills
    }
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
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
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

/// Profiles and their experience and education history
pub struct ProfileService {
    resolver: Resolver,
    profiles: Repository<Profile>,
    users: Repository<User>,
}

impl ProfileService {
    pub fn new(state: &AppState) -> Self {
        let resolver = Resolver::new(Arc::clone(&state.store));
        Self {
            profiles: resolver.repository(),
            users: resolver.repository(),
            resolver,
        }
    }

    pub async fn me(&self, identity: &AuthUser) -> ServiceResult<Value> {
        let profile = self.owned_profile(identity).await?;
        let owner = self.users.select_id(identity.id).await?;
        populate(&profile, owner.as_ref())
    }

    /// Create the caller's profile, or merge the supplied fields into it
    pub async fn upsert(
        &self,
        identity: &AuthUser,
        mut req: ProfileRequest,
    ) -> ServiceResult<Profile> {
        let skills = req.skills.take().map(SkillsInput::into_skills);

        Validator::new()
            .required("status", req.status.as_deref(), "Status is required")
            .check(
                "skills",
                skills.as_ref().map_or(false, |s| !s.is_empty()),
                "Skills is required",
            )
            .finish()?;

        let skills = skills.unwrap_or_default();
        if let Some(profile) = self.resolver.profile_of(identity.id).await? {
            return self.update(identity, profile, &req, &skills).await;
        }

        let mut profile = Profile::new(identity.id, String::new());
        merge(&mut profile, &req, &skills);
        match self.profiles.insert(&mut profile).await {
            Ok(()) => {
                tracing::debug!("Created profile {} for user {}", profile.id, identity.id);
                Ok(profile)
            }
            Err(StoreError::Duplicate { .. }) => {
                // Another request created it first
                let existing = self.resolver.profile_of(identity.id).await?.ok_or(
                    StoreError::Missing {
                        collection: Collection::Profiles,
                        id: profile.id,
                    },
                )?;
                self.update(identity, existing, &req, &skills).await
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn update(
        &self,
        identity: &AuthUser,
        mut profile: Profile,
        req: &ProfileRequest,
        skills: &[String],
    ) -> ServiceResult<Profile> {
        authorize(Operation::EditProfile, &profile, identity)?;
        merge(&mut profile, req, skills);
        self.profiles.save(&mut profile).await?;

        tracing::debug!("Updated profile {} of user {}", profile.id, identity.id);
        Ok(profile)
    }

    pub async fn list(&self) -> ServiceResult<Vec<Value>> {
        let profiles = self.profiles.select_any(&Filter::new()).await?;
        let users: HashMap<Uuid, User> = self
            .users
            .select_any(&Filter::new())
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        profiles
            .iter()
            .map(|profile| populate(profile, users.get(&profile.user)))
            .collect()
    }

    /// Profile of the user with id `raw_user_id`
    pub async fn by_user(&self, raw_user_id: &str) -> ServiceResult<Value> {
        let user_id = parse_id(ResourceKind::Profile, raw_user_id)?;
        let profile = self
            .resolver
            .profile_of(user_id)
            .await?
            .ok_or(ServiceError::NotFound {
                kind: ResourceKind::Profile,
            })?;

        let owner = self.users.select_id(user_id).await?;
        populate(&profile, owner.as_ref())
    }

    pub async fn add_experience(
        &self,
        identity: &AuthUser,
        req: ExperienceRequest,
    ) -> ServiceResult<Profile> {
        Validator::new()
            .required("title", req.title.as_deref(), "Title is required")
            .required("company", req.company.as_deref(), "Company is required")
            .required("from", req.from.as_deref(), "From date is required")
            .date("from", req.from.as_deref(), "From date must be a valid date")
            .date("to", req.to.as_deref(), "To date must be a valid date")
            .finish()?;
        let (from, to) = entry_dates(req.from.as_deref(), req.to.as_deref())?;

        let mut profile = self.owned_profile(identity).await?;
        authorize(Operation::AddExperience, &profile, identity)?;

        mutation::append(&mut profile.experience, |id| ExperienceEntry {
            id,
            title: trimmed(req.title),
            company: trimmed(req.company),
            location: non_blank(req.location),
            from,
            to,
            current: req.current.unwrap_or(false),
            description: non_blank(req.description),
        });
        self.profiles.save(&mut profile).await?;

        Ok(profile)
    }

    pub async fn remove_experience(
        &self,
        identity: &AuthUser,
        raw_exp_id: &str,
    ) -> ServiceResult<Profile> {
        let mut profile = self.owned_profile(identity).await?;
        authorize(Operation::RemoveExperience, &profile, identity)?;

        if !remove_entry(&mut profile.experience, raw_exp_id) {
            tracing::debug!("No experience '{}' on profile {}", raw_exp_id, profile.id);
        }
        self.profiles.save(&mut profile).await?;

        Ok(profile)
    }

    pub async fn add_education(
        &self,
        identity: &AuthUser,
        req: EducationRequest,
    ) -> ServiceResult<Profile> {
        Validator::new()
            .required("school", req.school.as_deref(), "School is required")
            .required("degree", req.degree.as_deref(), "Degree is required")
            .required(
                "fieldofstudy",
                req.fieldofstudy.as_deref(),
                "Field of study is required",
            )
            .required("from", req.from.as_deref(), "From date is required")
            .date("from", req.from.as_deref(), "From date must be a valid date")
            .date("to", req.to.as_deref(), "To date must be a valid date")
            .finish()?;
        let (from, to) = entry_dates(req.from.as_deref(), req.to.as_deref())?;

        let mut profile = self.owned_profile(identity).await?;
        authorize(Operation::AddEducation, &profile, identity)?;

        mutation::append(&mut profile.education, |id| EducationEntry {
            id,
            school: trimmed(req.school),
            degree: trimmed(req.degree),
            fieldofstudy: trimmed(req.fieldofstudy),
            from,
            to,
            current: req.current.unwrap_or(false),
            description: non_blank(req.description),
        });
        self.profiles.save(&mut profile).await?;

        Ok(profile)
    }

    pub async fn remove_education(
        &self,
        identity: &AuthUser,
        raw_edu_id: &str,
    ) -> ServiceResult<Profile> {
        let mut profile = self.owned_profile(identity).await?;
        authorize(Operation::RemoveEducation, &profile, identity)?;

        if !remove_entry(&mut profile.education, raw_edu_id) {
            tracing::debug!("No education '{}' on profile {}", raw_edu_id, profile.id);
        }
        self.profiles.save(&mut profile).await?;

        Ok(profile)
    }

    async fn owned_profile(&self, identity: &AuthUser) -> ServiceResult<Profile> {
        self.resolver
            .profile_of(identity.id)
            .await?
            .ok_or(ServiceError::NoProfile)
    }
}

/// Overwrite only the fields that were supplied and not blank
fn merge(profile: &mut Profile, req: &ProfileRequest, skills: &[String]) {
    fn set(field: &mut Option<String>, value: &Option<String>) {
        if let Some(value) = non_blank(value.clone()) {
            *field = Some(value);
        }
    }

    if let Some(status) = non_blank(req.status.clone()) {
        profile.status = status;
    }
    if !skills.is_empty() {
        profile.skills = skills.to_vec();
    }

    set(&mut profile.company, &req.company);
    set(&mut profile.website, &req.website);
    set(&mut profile.location, &req.location);
    set(&mut profile.bio, &req.bio);
    set(&mut profile.githubusername, &req.githubusername);

    let social = &mut profile.social;
    set(&mut social.youtube, &req.youtube);
    set(&mut social.twitter, &req.twitter);
    set(&mut social.facebook, &req.facebook);
    set(&mut social.linkedin, &req.linkedin);
    set(&mut social.instagram, &req.instagram);
}

/// Profile JSON with `user` replaced by the owner's name and avatar
fn populate(profile: &Profile, owner: Option<&User>) -> ServiceResult<Value> {
    let mut value = serde_json::to_value(profile).map_err(StoreError::from)?;
    let user = match owner {
        Some(user) => serde_json::to_value(UserSummary::from(user)).map_err(StoreError::from)?,
        None => Value::Null,
    };

    if let Some(fields) = value.as_object_mut() {
        fields.insert("user".to_string(), user);
    }
    Ok(value)
}

fn entry_dates(
    from: Option<&str>,
    to: Option<&str>,
) -> ServiceResult<(NaiveDate, Option<NaiveDate>)> {
    let from = from
        .and_then(parse_date)
        .ok_or_else(|| vec![FieldError::body("from", "From date is required")])?;

    let to = match to.filter(|raw| !raw.trim().is_empty()) {
        Some(raw) => Some(
            parse_date(raw)
                .ok_or_else(|| vec![FieldError::body("to", "To date must be a valid date")])?,
        ),
        None => None,
    };

    Ok((from, to))
}

/// A malformed entry id matches nothing
fn remove_entry<T: mutation::Keyed>(list: &mut Vec<T>, raw_id: &str) -> bool {
    Uuid::parse_str(raw_id.trim())
        .map(|id| mutation::remove_by_id(list, id))
        .unwrap_or(false)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn trimmed(value: Option<String>) -> String {
    non_blank(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::{MemoryStore, YieldingStore};

    struct Fixture {
        state: AppState,
        alice: AuthUser,
    }

    async fn fixture() -> Fixture {
        let state = AppState::new(AppConfig::testing(), Arc::new(MemoryStore::new())).unwrap();
        let mut alice = User::new("Alice".into(), "alice@x.com".into(), "h".into(), "a.png".into());
        Repository::<User>::new(Arc::clone(&state.store))
            .insert(&mut alice)
            .await
            .unwrap();

        Fixture {
            state,
            alice: AuthUser { id: alice.id },
        }
    }

    fn basic(status: &str, skills: &str) -> ProfileRequest {
        ProfileRequest {
            status: Some(status.into()),
            skills: Some(SkillsInput::Csv(skills.into())),
            ..ProfileRequest::default()
        }
    }

    fn experience(title: &str) -> ExperienceRequest {
        ExperienceRequest {
            title: Some(title.into()),
            company: Some("Acme".into()),
            from: Some("2019-01-01".into()),
            ..ExperienceRequest::default()
        }
    }

    #[test]
    fn skills_are_an_ordered_set() {
        let csv = SkillsInput::Csv(" rust, go ,, rust,sql ".into()).into_skills();
        assert_eq!(csv, ["rust", "go", "sql"]);

        let list = SkillsInput::List(vec!["a".into(), " ".into(), "a".into()]).into_skills();
        assert_eq!(list, ["a"]);
    }

    #[test]
    fn skills_deserialize_from_string_or_array() {
        let req: ProfileRequest = serde_json::from_str(r#"{"skills":"a,b"}"#).unwrap();
        assert!(matches!(req.skills, Some(SkillsInput::Csv(_))));

        let req: ProfileRequest = serde_json::from_str(r#"{"skills":["a","b"]}"#).unwrap();
        assert!(matches!(req.skills, Some(SkillsInput::List(_))));
    }

    #[tokio::test]
    async fn concurrent_first_upserts_share_one_profile() {
        let state = AppState::new(AppConfig::testing(), Arc::new(YieldingStore::default())).unwrap();
        let alice = AuthUser { id: Uuid::new_v4() };
        let profiles = ProfileService::new(&state);

        let (first, second) = tokio::join!(
            profiles.upsert(&alice, basic("Developer", "rust")),
            profiles.upsert(
                &alice,
                ProfileRequest {
                    company: Some("Acme".into()),
                    ..basic("Developer", "rust")
                }
            )
        );
        let (first, second) = (first.unwrap(), second.unwrap());
        assert_eq!(first.id, second.id);

        let stored = profiles
            .profiles
            .select_any(&Filter::new().eq("user", alice.id.to_string()))
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].company.as_deref(), Some("Acme"));
    }

    #[tokio::test]
    async fn me_without_profile_is_no_profile() {
        let f = fixture().await;
        let err = ProfileService::new(&f.state).me(&f.alice).await.unwrap_err();
        assert!(matches!(err, ServiceError::NoProfile));
    }

    #[tokio::test]
    async fn upsert_creates_then_merges_supplied_fields() {
        let f = fixture().await;
        let profiles = ProfileService::new(&f.state);

        let created = profiles
            .upsert(
                &f.alice,
                ProfileRequest {
                    company: Some("Acme".into()),
                    twitter: Some("@alice".into()),
                    ..basic("Developer", "rust,go")
                },
            )
            .await
            .unwrap();
        assert_eq!(created.user, f.alice.id);
        assert_eq!(created.skills, ["rust", "go"]);

        let updated = profiles
            .upsert(
                &f.alice,
                ProfileRequest {
                    bio: Some("hello".into()),
                    ..basic("Senior Developer", "rust")
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.status, "Senior Developer");
        assert_eq!(updated.company.as_deref(), Some("Acme"));
        assert_eq!(updated.bio.as_deref(), Some("hello"));
        assert_eq!(updated.social.twitter.as_deref(), Some("@alice"));
        assert_eq!(updated.skills, ["rust"]);

        let all = Repository::<Profile>::new(Arc::clone(&f.state.store))
            .select_any(&Filter::new())
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn upsert_requires_status_and_skills() {
        let f = fixture().await;
        let err = ProfileService::new(&f.state)
            .upsert(&f.alice, basic("", " , "))
            .await
            .unwrap_err();

        let ServiceError::Validation(errors) = &err else {
            panic!("expected validation failure, got {err:?}");
        };
        let params: Vec<_> = errors.iter().filter_map(|e| e.param.as_deref()).collect();
        assert_eq!(params, ["status", "skills"]);
    }

    #[tokio::test]
    async fn read_routes_populate_owner() {
        let f = fixture().await;
        let profiles = ProfileService::new(&f.state);
        profiles.upsert(&f.alice, basic("Dev", "rust")).await.unwrap();

        let me = profiles.me(&f.alice).await.unwrap();
        assert_eq!(me["user"]["name"], "Alice");
        assert_eq!(me["user"]["avatar"], "a.png");

        let listed = profiles.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["user"]["id"], f.alice.id.to_string());

        let by_user = profiles.by_user(&f.alice.id.to_string()).await.unwrap();
        assert_eq!(by_user["status"], "Dev");
    }

    #[tokio::test]
    async fn by_user_classifies_bad_and_absent_ids() {
        let f = fixture().await;
        let profiles = ProfileService::new(&f.state);

        assert!(matches!(
            profiles.by_user("nope").await.unwrap_err(),
            ServiceError::MalformedId { kind: ResourceKind::Profile, .. }
        ));
        assert!(matches!(
            profiles.by_user(&Uuid::new_v4().to_string()).await.unwrap_err(),
            ServiceError::NotFound { kind: ResourceKind::Profile }
        ));
    }

    #[tokio::test]
    async fn experience_is_prepended_and_removed_by_id() {
        let f = fixture().await;
        let profiles = ProfileService::new(&f.state);
        profiles.upsert(&f.alice, basic("Dev", "rust")).await.unwrap();

        profiles.add_experience(&f.alice, experience("Junior")).await.unwrap();
        let profile = profiles.add_experience(&f.alice, experience("Senior")).await.unwrap();
        assert_eq!(profile.experience[0].title, "Senior");
        assert_eq!(profile.experience[1].title, "Junior");

        let junior = profile.experience[1].id.to_string();
        let profile = profiles.remove_experience(&f.alice, &junior).await.unwrap();
        assert_eq!(profile.experience.len(), 1);
        assert_eq!(profile.experience[0].title, "Senior");

        let unchanged = profiles.remove_experience(&f.alice, "unknown").await.unwrap();
        assert_eq!(unchanged.experience, profile.experience);
    }

    #[tokio::test]
    async fn experience_without_profile_is_no_profile() {
        let f = fixture().await;
        let err = ProfileService::new(&f.state)
            .add_experience(&f.alice, experience("Dev"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NoProfile));
    }

    #[tokio::test]
    async fn experience_validation_checks_dates() {
        let f = fixture().await;
        let err = ProfileService::new(&f.state)
            .add_experience(
                &f.alice,
                ExperienceRequest {
                    from: Some("yesterday".into()),
                    to: Some("later".into()),
                    ..experience("Dev")
                },
            )
            .await
            .unwrap_err();

        let ServiceError::Validation(errors) = &err else {
            panic!("expected validation failure, got {err:?}");
        };
        let params: Vec<_> = errors.iter().filter_map(|e| e.param.as_deref()).collect();
        assert_eq!(params, ["from", "to"]);
    }

    #[tokio::test]
    async fn education_round_trip() {
        let f = fixture().await;
        let profiles = ProfileService::new(&f.state);
        profiles.upsert(&f.alice, basic("Dev", "rust")).await.unwrap();

        let profile = profiles
            .add_education(
                &f.alice,
                EducationRequest {
                    school: Some("MIT".into()),
                    degree: Some("BSc".into()),
                    fieldofstudy: Some("CS".into()),
                    from: Some("2010-09-01".into()),
                    to: Some("2014-06-30T00:00:00Z".into()),
                    ..EducationRequest::default()
                },
            )
            .await
            .unwrap();
        let entry = &profile.education[0];
        assert_eq!(entry.school, "MIT");
        assert_eq!(entry.to, NaiveDate::from_ymd_opt(2014, 6, 30));

        let profile = profiles
            .remove_education(&f.alice, &entry.id.to_string())
            .await
            .unwrap();
        assert!(profile.education.is_empty());
    }
}
