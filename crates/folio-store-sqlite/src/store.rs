//! [`SqliteStore`], the SQLite implementation of [`PortfolioStore`].

use std::{collections::HashSet, path::Path, sync::Arc};

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use folio_core::{
  ObjectId,
  about::{About, AboutPatch},
  account::{Account, NewAccount},
  clock::{Clock, SystemClock},
  contact::{ContactMessage, ContactPatch, NewContactMessage},
  ordering::rank_assignments,
  project::{NewProject, Project, ProjectPatch},
  store::PortfolioStore,
};

use crate::{
  Error, Result,
  encode::{
    ACCOUNT_COLUMNS, CONTACT_COLUMNS, PROJECT_COLUMNS, RawAccount, RawContact,
    RawProject, encode_dt, encode_id, encode_tags,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A portfolio store backed by a single SQLite file.
///
/// Clones share one background connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn:  tokio_rusqlite::Connection,
  clock: Arc<dyn Clock>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, clock: Arc::new(SystemClock) };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an empty in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, clock: Arc::new(SystemClock) };
    store.init_schema().await?;
    Ok(store)
  }

  /// Replace the clock used to stamp `created_at` / `updated_at`.
  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a fully-built [`Project`]. Returns `false` if the id is taken.
  async fn insert_project(&self, project: &Project) -> Result<bool> {
    let id_str          = encode_id(project.id);
    let title           = project.title.clone();
    let description     = project.description.clone();
    let long_desc       = project.long_description.clone();
    let image_url       = project.image_url.clone();
    let category        = project.category.clone();
    let tags_str        = encode_tags(&project.tags)?;
    let featured        = project.featured;
    let order           = project.order;
    let created_at_str  = encode_dt(project.created_at);
    let updated_at_str  = encode_dt(project.updated_at);

    let inserted = self
      .conn
      .call(move |conn| {
        let taken: bool = conn
          .query_row(
            "SELECT 1 FROM projects WHERE project_id = ?1",
            rusqlite::params![id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Ok(false);
        }

        conn.execute(
          "INSERT INTO projects (
             project_id, title, description, long_description, image_url,
             category, tags, featured, sort_order, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            id_str,
            title,
            description,
            long_desc,
            image_url,
            category,
            tags_str,
            featured,
            order,
            created_at_str,
            updated_at_str,
          ],
        )?;
        Ok(true)
      })
      .await?;
    Ok(inserted)
  }
}

// ─── PortfolioStore impl ─────────────────────────────────────────────────────

impl PortfolioStore for SqliteStore {
  type Error = Error;

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn create_account(&self, input: NewAccount) -> Result<Account> {
    let account = Account {
      id:            ObjectId::generate(self.clock.now()),
      name:          input.name,
      email:         input.email,
      password_hash: input.password_hash,
      created_at:    self.clock.now(),
    };

    let id_str   = encode_id(account.id);
    let name     = account.name.clone();
    let email    = account.email.clone();
    let hash     = account.password_hash.clone();
    let at_str   = encode_dt(account.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        let taken: bool = conn
          .query_row(
            "SELECT 1 FROM accounts WHERE name = ?1",
            rusqlite::params![name],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Ok(false);
        }
        conn.execute(
          "INSERT INTO accounts (account_id, name, email, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, name, email, hash, at_str],
        )?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::DuplicateAccount(account.name));
    }
    Ok(account)
  }

  async fn find_account_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> Result<Option<Account>> {
    let name = name.to_owned();
    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE name = ?1"),
            rusqlite::params![name],
            RawAccount::from_row,
          )
          .optional()?)
      })
      .await?;
    raw.map(RawAccount::into_account).transpose()
  }

  async fn get_account(&self, id: ObjectId) -> Result<Option<Account>> {
    let id_str = encode_id(id);
    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_id = ?1"),
            rusqlite::params![id_str],
            RawAccount::from_row,
          )
          .optional()?)
      })
      .await?;
    raw.map(RawAccount::into_account).transpose()
  }

  // ── Projects ──────────────────────────────────────────────────────────────

  async fn list_projects(&self) -> Result<Vec<Project>> {
    let raws: Vec<RawProject> = self
      .conn
      .call(|conn| {
        // Must agree with `folio_core::ordering::canonical_cmp`.
        let mut stmt = conn.prepare(&format!(
          "SELECT {PROJECT_COLUMNS} FROM projects
           ORDER BY sort_order ASC, created_at DESC, project_id DESC"
        ))?;
        let rows = stmt
          .query_map([], RawProject::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProject::into_project).collect()
  }

  async fn get_project(&self, id: ObjectId) -> Result<Option<Project>> {
    let id_str = encode_id(id);
    let raw: Option<RawProject> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE project_id = ?1"),
            rusqlite::params![id_str],
            RawProject::from_row,
          )
          .optional()?)
      })
      .await?;
    raw.map(RawProject::into_project).transpose()
  }

  async fn create_project(&self, input: NewProject) -> Result<Project> {
    let now = self.clock.now();
    let project = input.into_project(ObjectId::generate(now), now);
    if !self.insert_project(&project).await? {
      return Err(Error::DuplicateProject(project.id));
    }
    Ok(project)
  }

  async fn create_project_with_id(
    &self,
    id:    ObjectId,
    input: NewProject,
  ) -> Result<Project> {
    let project = input.into_project(id, self.clock.now());
    if !self.insert_project(&project).await? {
      return Err(Error::DuplicateProject(id));
    }
    Ok(project)
  }

  async fn update_project(
    &self,
    id:    ObjectId,
    patch: ProjectPatch,
  ) -> Result<Option<Project>> {
    let id_str = encode_id(id);
    let now    = self.clock.now();
    self
      .conn
      .call(move |conn| Ok(patch_project(conn, &id_str, patch, now)))
      .await?
  }

  async fn delete_project(&self, id: ObjectId) -> Result<bool> {
    let id_str = encode_id(id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM projects WHERE project_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn set_project_order(&self, id: ObjectId, rank: i64) -> Result<bool> {
    let id_str = encode_id(id);
    let at_str = encode_dt(self.clock.now());
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE projects SET sort_order = ?2, updated_at = ?3 WHERE project_id = ?1",
          rusqlite::params![id_str, rank, at_str],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn reorder_projects<'a>(&'a self, ids: &'a [ObjectId]) -> Result<usize> {
    let assignments: Vec<(String, i64)> = rank_assignments(ids)
      .into_iter()
      .map(|(id, rank)| (encode_id(id), rank))
      .collect();
    let requested = assignments.len();
    let at_str = encode_dt(self.clock.now());

    let matched = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut matched = HashSet::new();
        {
          let mut stmt = tx.prepare(
            "UPDATE projects SET sort_order = ?2, updated_at = ?3 WHERE project_id = ?1",
          )?;
          for (id, rank) in &assignments {
            if stmt.execute(rusqlite::params![id, rank, at_str])? > 0 {
              matched.insert(id.as_str());
            }
          }
        }
        let matched = matched.len();
        tx.commit()?;
        Ok(matched)
      })
      .await?;

    tracing::debug!(requested, matched, "reordered projects");
    Ok(matched)
  }

  // ── Contact messages ──────────────────────────────────────────────────────

  async fn list_contacts(&self) -> Result<Vec<ContactMessage>> {
    let raws: Vec<RawContact> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CONTACT_COLUMNS} FROM contacts
           ORDER BY created_at DESC, contact_id DESC"
        ))?;
        let rows = stmt
          .query_map([], RawContact::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawContact::into_contact).collect()
  }

  async fn create_contact(&self, input: NewContactMessage) -> Result<ContactMessage> {
    let now = self.clock.now();
    let message = input.into_message(ObjectId::generate(now), now);

    let id_str  = encode_id(message.id);
    let name    = message.name.clone();
    let email   = message.email.clone();
    let body    = message.message.clone();
    let at_str  = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contacts (contact_id, name, email, message, read, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)",
          rusqlite::params![id_str, name, email, body, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(message)
  }

  async fn update_contact(
    &self,
    id:    ObjectId,
    patch: ContactPatch,
  ) -> Result<Option<ContactMessage>> {
    let id_str = encode_id(id);
    let now    = self.clock.now();
    self
      .conn
      .call(move |conn| Ok(patch_contact(conn, &id_str, patch, now)))
      .await?
  }

  async fn delete_contact(&self, id: ObjectId) -> Result<bool> {
    let id_str = encode_id(id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM contacts WHERE contact_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  // ── About profile ─────────────────────────────────────────────────────────

  async fn get_about(&self) -> Result<Option<About>> {
    let doc: Option<String> = self
      .conn
      .call(|conn| {
        Ok(conn
          .query_row(
            "SELECT doc_json FROM about WHERE singleton = 1",
            [],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;
    Ok(doc.map(|d| serde_json::from_str(&d)).transpose()?)
  }

  async fn put_about(&self, about: About) -> Result<About> {
    let doc    = serde_json::to_string(&about)?;
    let at_str = encode_dt(about.updated_at);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO about (singleton, doc_json, updated_at) VALUES (1, ?1, ?2)
           ON CONFLICT(singleton) DO UPDATE SET
             doc_json = excluded.doc_json, updated_at = excluded.updated_at",
          rusqlite::params![doc, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(about)
  }

  async fn update_about(&self, patch: AboutPatch) -> Result<About> {
    let now = self.clock.now();
    self
      .conn
      .call(move |conn| Ok(patch_about(conn, patch, now)))
      .await?
  }
}

// ─── Read-modify-write helpers ───────────────────────────────────────────────
//
// Each runs inside one `Connection::call`, so the read, the patch and the write
// happen in a single transaction and concurrent patches cannot interleave.

fn patch_project(
  conn:   &mut rusqlite::Connection,
  id_str: &str,
  patch:  ProjectPatch,
  now:    DateTime<Utc>,
) -> Result<Option<Project>> {
  let tx = conn.transaction()?;
  let raw = tx
    .query_row(
      &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE project_id = ?1"),
      rusqlite::params![id_str],
      RawProject::from_row,
    )
    .optional()?;
  let Some(raw) = raw else {
    return Ok(None);
  };

  let mut project = raw.into_project()?;
  patch.apply(&mut project, now);
  tx.execute(
    "UPDATE projects SET
       title = ?2, description = ?3, long_description = ?4,
       image_url = ?5, category = ?6, tags = ?7, featured = ?8,
       sort_order = ?9, updated_at = ?10
     WHERE project_id = ?1",
    rusqlite::params![
      id_str,
      project.title,
      project.description,
      project.long_description,
      project.image_url,
      project.category,
      encode_tags(&project.tags)?,
      project.featured,
      project.order,
      encode_dt(project.updated_at),
    ],
  )?;
  tx.commit()?;
  Ok(Some(project))
}

fn patch_contact(
  conn:   &mut rusqlite::Connection,
  id_str: &str,
  patch:  ContactPatch,
  now:    DateTime<Utc>,
) -> Result<Option<ContactMessage>> {
  let tx = conn.transaction()?;
  let raw = tx
    .query_row(
      &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE contact_id = ?1"),
      rusqlite::params![id_str],
      RawContact::from_row,
    )
    .optional()?;
  let Some(raw) = raw else {
    return Ok(None);
  };

  let mut message = raw.into_contact()?;
  patch.apply(&mut message, now);
  tx.execute(
    "UPDATE contacts SET name = ?2, email = ?3, message = ?4, read = ?5, updated_at = ?6
     WHERE contact_id = ?1",
    rusqlite::params![
      id_str,
      message.name,
      message.email,
      message.message,
      message.read,
      encode_dt(message.updated_at),
    ],
  )?;
  tx.commit()?;
  Ok(Some(message))
}

/// Patch the stored profile, starting from the placeholder when none exists.
fn patch_about(
  conn:  &mut rusqlite::Connection,
  patch: AboutPatch,
  now:   DateTime<Utc>,
) -> Result<About> {
  let tx = conn.transaction()?;
  let doc: Option<String> = tx
    .query_row("SELECT doc_json FROM about WHERE singleton = 1", [], |row| {
      row.get(0)
    })
    .optional()?;
  let mut about = match doc {
    Some(doc) => serde_json::from_str(&doc)?,
    None => About::placeholder(now),
  };

  patch.apply(&mut about, now);
  tx.execute(
    "INSERT INTO about (singleton, doc_json, updated_at) VALUES (1, ?1, ?2)
     ON CONFLICT(singleton) DO UPDATE SET
       doc_json = excluded.doc_json, updated_at = excluded.updated_at",
    rusqlite::params![serde_json::to_string(&about)?, encode_dt(about.updated_at)],
  )?;
  tx.commit()?;
  Ok(about)
}
