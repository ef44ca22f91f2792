//! Portfolio projects, the orderable collection.
//!
//! A project's position in listings is derived from its `order` rank and its
//! creation time; see [`crate::ordering`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ObjectId, Result, validate};

pub const DEFAULT_CATEGORY: &str = "General";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
  pub id:               ObjectId,
  pub title:            String,
  pub description:      String,
  pub long_description: Option<String>,
  pub image_url:        String,
  pub category:         String,
  pub tags:             Vec<String>,
  pub featured:         bool,
  /// Display rank; lower sorts first. Not unique.
  pub order:            i64,
  pub created_at:       DateTime<Utc>,
  pub updated_at:       DateTime<Utc>,
}

/// Input to [`crate::store::PortfolioStore::create_project`].
///
/// Deserialises leniently (every field defaults) so that missing fields are
/// reported by [`NewProject::validate`] rather than by the JSON decoder.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewProject {
  pub title:            String,
  pub description:      String,
  pub long_description: Option<String>,
  pub image_url:        String,
  pub category:         Option<String>,
  pub tags:             Vec<String>,
  pub featured:         bool,
  pub order:            i64,
}

impl NewProject {
  pub fn validate(self) -> Result<Self> {
    Ok(Self {
      title:            validate::required("title", &self.title)?,
      description:      validate::required("description", &self.description)?,
      long_description: validate::optional(self.long_description),
      image_url:        validate::url("imageUrl", &self.image_url)?,
      category:         Some(
        validate::optional(self.category)
          .unwrap_or_else(|| DEFAULT_CATEGORY.to_owned()),
      ),
      tags:             validate::string_list(self.tags),
      featured:         self.featured,
      order:            self.order,
    })
  }

  /// Build the stored record. Call on a validated value.
  pub fn into_project(self, id: ObjectId, now: DateTime<Utc>) -> Project {
    Project {
      id,
      title: self.title,
      description: self.description,
      long_description: self.long_description,
      image_url: self.image_url,
      category: self
        .category
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_owned()),
      tags: self.tags,
      featured: self.featured,
      order: self.order,
      created_at: now,
      updated_at: now,
    }
  }
}

/// A partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectPatch {
  pub title:            Option<String>,
  pub description:      Option<String>,
  /// An empty string clears the long description.
  pub long_description: Option<String>,
  pub image_url:        Option<String>,
  pub category:         Option<String>,
  pub tags:             Option<Vec<String>>,
  pub featured:         Option<bool>,
  pub order:            Option<i64>,
}

impl ProjectPatch {
  /// A patch that only moves the item to `rank`.
  pub fn rank(rank: i64) -> Self {
    Self { order: Some(rank), ..Self::default() }
  }

  pub fn validate(self) -> Result<Self> {
    Ok(Self {
      title:            self
        .title
        .map(|v| validate::required("title", &v))
        .transpose()?,
      description:      self
        .description
        .map(|v| validate::required("description", &v))
        .transpose()?,
      long_description: self.long_description.map(|v| v.trim().to_owned()),
      image_url:        self
        .image_url
        .map(|v| validate::url("imageUrl", &v))
        .transpose()?,
      category:         self
        .category
        .map(|v| validate::required("category", &v))
        .transpose()?,
      tags:             self.tags.map(validate::string_list),
      featured:         self.featured,
      order:            self.order,
    })
  }

  /// Apply a validated patch to `project`, stamping `updated_at`.
  pub fn apply(self, project: &mut Project, now: DateTime<Utc>) {
    if let Some(title) = self.title {
      project.title = title;
    }
    if let Some(description) = self.description {
      project.description = description;
    }
    if let Some(long) = self.long_description {
      project.long_description = (!long.is_empty()).then_some(long);
    }
    if let Some(url) = self.image_url {
      project.image_url = url;
    }
    if let Some(category) = self.category {
      project.category = category;
    }
    if let Some(tags) = self.tags {
      project.tags = tags;
    }
    if let Some(featured) = self.featured {
      project.featured = featured;
    }
    if let Some(order) = self.order {
      project.order = order;
    }
    project.updated_at = now;
  }
}
