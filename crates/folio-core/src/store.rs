//! The `PortfolioStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `folio-store-sqlite`).
//! Higher layers (`folio-api`, `folio-server`) depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use crate::{
  ObjectId,
  about::{About, AboutPatch},
  account::{Account, NewAccount},
  contact::{ContactMessage, ContactPatch, NewContactMessage},
  project::{NewProject, Project, ProjectPatch},
};

/// Abstraction over a portfolio store backend.
///
/// Inputs are expected to be validated already (`NewProject::validate` and
/// friends); backends persist what they are given.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PortfolioStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Persist a new account. Fails if the name is already taken.
  ///
  /// Only the provisioning command calls this; there is no HTTP route.
  fn create_account(
    &self,
    input: NewAccount,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + '_;

  /// Look an account up by its exact (already trimmed) name.
  fn find_account_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  fn get_account(
    &self,
    id: ObjectId,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  // ── Projects ──────────────────────────────────────────────────────────

  /// All projects in canonical order (see [`crate::ordering`]).
  fn list_projects(
    &self,
  ) -> impl Future<Output = Result<Vec<Project>, Self::Error>> + Send + '_;

  fn get_project(
    &self,
    id: ObjectId,
  ) -> impl Future<Output = Result<Option<Project>, Self::Error>> + Send + '_;

  /// Create a project with a fresh id. `created_at` is set by the store.
  fn create_project(
    &self,
    input: NewProject,
  ) -> impl Future<Output = Result<Project, Self::Error>> + Send + '_;

  /// Create a project with a caller-supplied id. Fails if the id is taken.
  fn create_project_with_id(
    &self,
    id: ObjectId,
    input: NewProject,
  ) -> impl Future<Output = Result<Project, Self::Error>> + Send + '_;

  /// Apply a partial update atomically. Returns `None` if the project does
  /// not exist.
  fn update_project(
    &self,
    id: ObjectId,
    patch: ProjectPatch,
  ) -> impl Future<Output = Result<Option<Project>, Self::Error>> + Send + '_;

  /// Returns `false` if nothing was deleted.
  fn delete_project(
    &self,
    id: ObjectId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Set one project's rank, leaving every other rank untouched. Ranks may
  /// collide afterwards. Returns `false` if the id matched nothing.
  fn set_project_order(
    &self,
    id: ObjectId,
    rank: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Give the project at position `i` of `ids` the rank `i`.
  ///
  /// Ids that match nothing are skipped. Returns how many distinct projects
  /// were matched. An error means the caller must re-read the collection; the
  /// stored ranks may not reflect `ids`.
  fn reorder_projects<'a>(
    &'a self,
    ids: &'a [ObjectId],
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  // ── Contact messages ──────────────────────────────────────────────────

  /// All messages, newest first.
  fn list_contacts(
    &self,
  ) -> impl Future<Output = Result<Vec<ContactMessage>, Self::Error>> + Send + '_;

  fn create_contact(
    &self,
    input: NewContactMessage,
  ) -> impl Future<Output = Result<ContactMessage, Self::Error>> + Send + '_;

  fn update_contact(
    &self,
    id: ObjectId,
    patch: ContactPatch,
  ) -> impl Future<Output = Result<Option<ContactMessage>, Self::Error>> + Send + '_;

  fn delete_contact(
    &self,
    id: ObjectId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── About profile ─────────────────────────────────────────────────────

  /// The stored profile, if one has been saved.
  fn get_about(
    &self,
  ) -> impl Future<Output = Result<Option<About>, Self::Error>> + Send + '_;

  /// Insert or replace the single profile record.
  fn put_about(
    &self,
    about: About,
  ) -> impl Future<Output = Result<About, Self::Error>> + Send + '_;

  /// Apply a partial update to the profile in one step, starting from
  /// [`About::placeholder`] when nothing is stored yet.
  fn update_about(
    &self,
    patch: AboutPatch,
  ) -> impl Future<Output = Result<About, Self::Error>> + Send + '_;
}
