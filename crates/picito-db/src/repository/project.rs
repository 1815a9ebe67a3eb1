//! SurrealDB implementation of [`ProjectRepository`].

use chrono::{DateTime, Utc};
use picito_core::error::PicitoResult;
use picito_core::models::project::{CreateProject, Project, UpdateProject, Visibility};
use picito_core::repository::ProjectRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ProjectRow {
    organization_id: String,
    name: String,
    embed_url: String,
    version: String,
    visibility: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ProjectRowWithId {
    record_id: String,
    organization_id: String,
    name: String,
    embed_url: String,
    version: String,
    visibility: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_visibility(s: &str) -> Result<Visibility, DbError> {
    match s {
        "public" => Ok(Visibility::Public),
        "private" => Ok(Visibility::Private),
        other => Err(DbError::Decode(format!("unknown visibility: {other}"))),
    }
}

fn row_to_project(row: ProjectRow, id: Uuid) -> Result<Project, DbError> {
    Ok(Project {
        id,
        organization_id: parse_uuid("organization", &row.organization_id)?,
        name: row.name,
        embed_url: row.embed_url,
        version: row.version,
        visibility: parse_visibility(&row.visibility)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

impl ProjectRowWithId {
    fn try_into_project(self) -> Result<Project, DbError> {
        let id = parse_uuid("project", &self.record_id)?;
        row_to_project(
            ProjectRow {
                organization_id: self.organization_id,
                name: self.name,
                embed_url: self.embed_url,
                version: self.version,
                visibility: self.visibility,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            id,
        )
    }
}

fn collect(rows: Vec<ProjectRowWithId>) -> Result<Vec<Project>, DbError> {
    rows.into_iter()
        .map(ProjectRowWithId::try_into_project)
        .collect()
}

/// SurrealDB implementation of the Project repository.
#[derive(Clone)]
pub struct SurrealProjectRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProjectRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ProjectRepository for SurrealProjectRepository<C> {
    async fn create(&self, input: CreateProject) -> PicitoResult<Project> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('project', $id) SET \
                 organization_id = $organization_id, name = $name, \
                 embed_url = $embed_url, version = $version, \
                 visibility = $visibility",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("name", input.name))
            .bind(("embed_url", input.embed_url))
            .bind(("version", input.version))
            .bind(("visibility", input.visibility.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("project", e))?;

        let rows: Vec<ProjectRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("project", id_str))?;

        Ok(row_to_project(row, id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> PicitoResult<Project> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('project', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProjectRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("project", id_str))?;

        Ok(row_to_project(row, id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateProject) -> PicitoResult<Project> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.embed_url.is_some() {
            sets.push("embed_url = $embed_url");
        }
        if input.version.is_some() {
            sets.push("version = $version");
        }
        if input.visibility.is_some() {
            sets.push("visibility = $visibility");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('project', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(embed_url) = input.embed_url {
            builder = builder.bind(("embed_url", embed_url));
        }
        if let Some(version) = input.version {
            builder = builder.bind(("version", version));
        }
        if let Some(visibility) = input.visibility {
            builder = builder.bind(("visibility", visibility.as_str().to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("project", e))?;

        let rows: Vec<ProjectRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("project", id_str))?;

        Ok(row_to_project(row, id)?)
    }

    async fn delete(&self, id: Uuid) -> PicitoResult<()> {
        let mut result = self
            .db
            .query("DELETE type::record('project', $id) RETURN BEFORE")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProjectRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::not_found("project", id.to_string()).into());
        }
        Ok(())
    }

    async fn delete_by_organization(&self, organization_id: Uuid) -> PicitoResult<u64> {
        let mut result = self
            .db
            .query("DELETE project WHERE organization_id = $organization_id RETURN BEFORE")
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProjectRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.len() as u64)
    }

    async fn delete_orphaned(&self) -> PicitoResult<u64> {
        let mut result = self
            .db
            .query(
                "DELETE project WHERE organization_id NOT IN (\
                     SELECT VALUE meta::id(id) FROM organization\
                 ) RETURN BEFORE",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProjectRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.len() as u64)
    }

    async fn list_all(&self) -> PicitoResult<Vec<Project>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM project ORDER BY created_at ASC")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProjectRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(collect(rows)?)
    }

    async fn list_visible(&self, user_id: Option<Uuid>) -> PicitoResult<Vec<Project>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM project \
                 WHERE visibility = 'public' \
                 OR organization_id IN (\
                     SELECT VALUE organization_id FROM membership \
                     WHERE user_id = $user_id\
                 ) \
                 ORDER BY created_at ASC",
            )
            .bind(("user_id", user_id.map(|id| id.to_string())))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProjectRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(collect(rows)?)
    }
}
