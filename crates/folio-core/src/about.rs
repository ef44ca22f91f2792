//! The singleton "about" profile shown on the hero and about pages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Result, validate};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLinks {
  pub linkedin:  Option<String>,
  pub github:    Option<String>,
  pub twitter:   Option<String>,
  pub instagram: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
  pub company:     String,
  pub position:    String,
  pub duration:    String,
  pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
  pub institution: String,
  pub degree:      String,
  pub duration:    String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct About {
  pub name:          String,
  pub title:         String,
  pub bio:           String,
  pub long_bio:      String,
  pub email:         String,
  pub phone:         Option<String>,
  pub location:      Option<String>,
  pub profile_image: String,
  pub hero_image:    Option<String>,
  pub resume_url:    Option<String>,
  pub social_links:  SocialLinks,
  pub skills:        Vec<String>,
  pub experience:    Vec<Experience>,
  pub education:     Vec<Education>,
  pub updated_at:    DateTime<Utc>,
}

impl About {
  /// The placeholder profile served before the owner has edited anything.
  pub fn placeholder(now: DateTime<Utc>) -> Self {
    Self {
      name:          "Portfolio Owner".to_owned(),
      title:         "Marketing | Human Resources".to_owned(),
      bio:           "A short introduction shown on the home page.".to_owned(),
      long_bio:      "A longer biography shown on the about page.".to_owned(),
      email:         "owner@example.com".to_owned(),
      phone:         None,
      location:      None,
      profile_image: "https://via.placeholder.com/400".to_owned(),
      hero_image:    None,
      resume_url:    None,
      social_links:  SocialLinks::default(),
      skills:        Vec::new(),
      experience:    Vec::new(),
      education:     Vec::new(),
      updated_at:    now,
    }
  }
}

/// A partial update of the profile. For the optional text fields an empty
/// string clears the value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AboutPatch {
  pub name:          Option<String>,
  pub title:         Option<String>,
  pub bio:           Option<String>,
  pub long_bio:      Option<String>,
  pub email:         Option<String>,
  pub phone:         Option<String>,
  pub location:      Option<String>,
  pub profile_image: Option<String>,
  pub hero_image:    Option<String>,
  pub resume_url:    Option<String>,
  pub social_links:  Option<SocialLinks>,
  pub skills:        Option<Vec<String>>,
  pub experience:    Option<Vec<Experience>>,
  pub education:     Option<Vec<Education>>,
}

fn clearable_url(field: &str, value: Option<String>) -> Result<Option<String>> {
  match value {
    Some(v) if v.trim().is_empty() => Ok(Some(String::new())),
    Some(v) => validate::url(field, &v).map(Some),
    None => Ok(None),
  }
}

fn set_clearable(target: &mut Option<String>, value: Option<String>) {
  if let Some(v) = value {
    *target = (!v.is_empty()).then_some(v);
  }
}

impl AboutPatch {
  pub fn validate(self) -> Result<Self> {
    let required = |field: &str, v: Option<String>| {
      v.map(|v| validate::required(field, &v)).transpose()
    };
    Ok(Self {
      name:          required("name", self.name)?,
      title:         required("title", self.title)?,
      bio:           required("bio", self.bio)?,
      long_bio:      required("longBio", self.long_bio)?,
      email:         self.email.map(|v| validate::email("email", &v)).transpose()?,
      phone:         self.phone.map(|v| v.trim().to_owned()),
      location:      self.location.map(|v| v.trim().to_owned()),
      profile_image: self
        .profile_image
        .map(|v| validate::url("profileImage", &v))
        .transpose()?,
      hero_image:    clearable_url("heroImage", self.hero_image)?,
      resume_url:    clearable_url("resumeUrl", self.resume_url)?,
      social_links:  self.social_links.map(|links| SocialLinks {
        linkedin:  validate::optional(links.linkedin),
        github:    validate::optional(links.github),
        twitter:   validate::optional(links.twitter),
        instagram: validate::optional(links.instagram),
      }),
      skills:        self.skills.map(validate::string_list),
      experience:    self.experience,
      education:     self.education,
    })
  }

  /// The image URLs this patch sets, labelled by field.
  pub fn image_urls(&self) -> impl Iterator<Item = (&'static str, &str)> {
    [
      ("profileImage", self.profile_image.as_deref()),
      ("heroImage", self.hero_image.as_deref()),
    ]
    .into_iter()
    .filter_map(|(field, url)| url.filter(|u| !u.is_empty()).map(|u| (field, u)))
  }

  pub fn apply(self, about: &mut About, now: DateTime<Utc>) {
    if let Some(v) = self.name {
      about.name = v;
    }
    if let Some(v) = self.title {
      about.title = v;
    }
    if let Some(v) = self.bio {
      about.bio = v;
    }
    if let Some(v) = self.long_bio {
      about.long_bio = v;
    }
    if let Some(v) = self.email {
      about.email = v;
    }
    set_clearable(&mut about.phone, self.phone);
    set_clearable(&mut about.location, self.location);
    if let Some(v) = self.profile_image {
      about.profile_image = v;
    }
    set_clearable(&mut about.hero_image, self.hero_image);
    set_clearable(&mut about.resume_url, self.resume_url);
    if let Some(v) = self.social_links {
      about.social_links = v;
    }
    if let Some(v) = self.skills {
      about.skills = v;
    }
    if let Some(v) = self.experience {
      about.experience = v;
    }
    if let Some(v) = self.education {
      about.education = v;
    }
    about.updated_at = now;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn patch_merges_over_placeholder() {
    let now = Utc::now();
    let mut about = About::placeholder(now);
    let patch: AboutPatch = serde_json::from_value(serde_json::json!({
      "name": " Ana ",
      "skills": ["Recruiting", " "],
      "heroImage": "https://res.cloudinary.com/demo/hero.png",
    }))
    .unwrap();
    patch.validate().unwrap().apply(&mut about, now);

    assert_eq!(about.name, "Ana");
    assert_eq!(about.skills, vec!["Recruiting".to_owned()]);
    assert_eq!(
      about.hero_image.as_deref(),
      Some("https://res.cloudinary.com/demo/hero.png")
    );
    assert_eq!(about.title, About::placeholder(now).title);
  }

  #[test]
  fn empty_hero_image_clears_it() {
    let now = Utc::now();
    let mut about = About {
      hero_image: Some("https://example.com/a.png".into()),
      ..About::placeholder(now)
    };
    let patch = AboutPatch { hero_image: Some("".into()), ..Default::default() };
    patch.validate().unwrap().apply(&mut about, now);
    assert_eq!(about.hero_image, None);
  }

  #[test]
  fn invalid_profile_image_is_rejected() {
    let patch = AboutPatch { profile_image: Some("nope".into()), ..Default::default() };
    assert!(patch.validate().is_err());
  }
}
