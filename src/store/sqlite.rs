// SQLite-backed store.
//
// `begin` opens a transaction whose first statement bumps `land.lock_version`,
// which takes SQLite's write lock before anything is read. Concurrent commands
// on any land wait on the busy timeout until the holder commits or rolls back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqliteConnection, SqlitePool, Transaction};
use std::collections::HashSet;
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

use super::{check_interest_uniqueness, LandStore, LandTransaction, StoreError};
use crate::domain::{
    CommercialTerms, Coordinates, EntityRef, InvestorInterest, Land, LandAggregate, LandId,
    LandSection, Task, TaskHistory, TaskId, TaskStatus, UserId,
};
use crate::events::{EventRecord, WorkflowEvent};

#[derive(Clone)]
pub struct SqliteLandStore {
    pool: SqlitePool,
}

#[derive(Clone, Copy)]
enum TaskColumn {
    AssignedTo,
    CreatedBy,
}

impl TaskColumn {
    fn filter(&self) -> &'static str {
        match self {
            TaskColumn::AssignedTo => "assigned_to = ?1",
            TaskColumn::CreatedBy => "created_by = ?1",
        }
    }

    fn order(&self) -> &'static str {
        match self {
            TaskColumn::AssignedTo => "end_date, created_at DESC",
            TaskColumn::CreatedBy => "created_at DESC",
        }
    }
}

impl SqliteLandStore {
    /// Expects a migrated database, see `DatabaseManager`
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn load_tasks(
        &self,
        column: TaskColumn,
        user: UserId,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>, StoreError> {
        let user = user.to_string();
        let mut tasks = sqlx::query(&format!(
            "SELECT * FROM task WHERE {} AND (?2 IS NULL OR status = ?2) ORDER BY {}",
            column.filter(),
            column.order()
        ))
        .bind(&user)
        .bind(status.map(|status| status.as_str()))
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(task_from_row)
        .collect::<Result<Vec<_>, _>>()?;

        let history_rows = sqlx::query(&format!(
            r#"
            SELECT * FROM task_history
            WHERE task_id IN (SELECT task_id FROM task WHERE {})
            ORDER BY start_ts, rowid
            "#,
            column.filter()
        ))
        .bind(&user)
        .fetch_all(&self.pool)
        .await?;
        for row in &history_rows {
            let entry = history_from_row(row)?;
            if let Some(task) = tasks.iter_mut().find(|task| task.id == entry.task_id) {
                task.history.push(entry);
            }
        }
        Ok(tasks)
    }
}

#[async_trait]
impl LandStore for SqliteLandStore {
    async fn owning_land(&self, entity: EntityRef) -> Result<Option<LandId>, StoreError> {
        let query = match entity {
            EntityRef::Land(_) => "SELECT land_id FROM land WHERE land_id = ?1",
            EntityRef::Section(_) => {
                "SELECT land_id FROM land_section WHERE land_section_id = ?1"
            }
            EntityRef::Task(_) => "SELECT land_id FROM task WHERE task_id = ?1",
            EntityRef::Interest(_) => {
                "SELECT land_id FROM investor_interest WHERE interest_id = ?1"
            }
        };
        let row = sqlx::query(query)
            .bind(entity.id_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| -> Result<LandId, StoreError> {
            parse(row.try_get("land_id")?, "land_id")
        })
        .transpose()
    }

    async fn begin(
        &self,
        land_id: LandId,
    ) -> Result<Option<Box<dyn LandTransaction>>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let locked =
            sqlx::query("UPDATE land SET lock_version = lock_version + 1 WHERE land_id = ?1")
                .bind(land_id.to_string())
                .execute(&mut *tx)
                .await?
                .rows_affected();
        if locked == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let Some(snapshot) = load_aggregate(&mut tx, land_id).await? else {
            tx.rollback().await?;
            return Ok(None);
        };
        debug!(land_id = %land_id, "Acquired land lock");

        let transaction: Box<dyn LandTransaction> = Box::new(SqliteTransaction { tx, snapshot });
        Ok(Some(transaction))
    }

    async fn insert(
        &self,
        aggregate: LandAggregate,
        events: Vec<EventRecord>,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        write_aggregate(&mut tx, &aggregate, &HashSet::new()).await?;
        append_events(&mut tx, &events).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn load(&self, land_id: LandId) -> Result<Option<LandAggregate>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        load_aggregate(&mut conn, land_id).await
    }

    async fn sections_for_reviewer(
        &self,
        user: UserId,
        roles: &[String],
    ) -> Result<Vec<LandSection>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT s.* FROM land_section s
            JOIN land l ON l.land_id = s.land_id
            WHERE l.status NOT IN ('draft', 'rejected')
              AND (s.assigned_user = ?1
                   OR s.assigned_role IN (SELECT value FROM json_each(?2)))
            ORDER BY s.created_at, s.section_key
            "#,
        )
        .bind(user.to_string())
        .bind(serde_json::to_string(roles)?)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(section_from_row).collect()
    }

    async fn interests_of_investor(
        &self,
        investor: UserId,
    ) -> Result<Vec<InvestorInterest>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM investor_interest WHERE investor_id = ?1 ORDER BY created_at",
        )
        .bind(investor.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(interest_from_row).collect()
    }

    async fn listed_lands(&self) -> Result<Vec<LandAggregate>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT land_id FROM land
            WHERE status IN ('published', 'interest_locked', 'rtb')
            ORDER BY published_at DESC, rowid
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        let mut lands = Vec::with_capacity(ids.len());
        for id in ids {
            let land_id: LandId = parse(id, "land_id")?;
            if let Some(aggregate) = load_aggregate(&mut conn, land_id).await? {
                lands.push(aggregate);
            }
        }
        Ok(lands)
    }

    async fn tasks_assigned_to(
        &self,
        user: UserId,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>, StoreError> {
        self.load_tasks(TaskColumn::AssignedTo, user, status).await
    }

    async fn tasks_created_by(
        &self,
        user: UserId,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>, StoreError> {
        self.load_tasks(TaskColumn::CreatedBy, user, status).await
    }

    async fn events(&self, land_id: LandId) -> Result<Vec<EventRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT land_id, actor, correlation_id, payload, recorded_at
            FROM workflow_event
            WHERE land_id = ?1
            ORDER BY event_id
            "#,
        )
        .bind(land_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<EventRecord, StoreError> {
                let payload: String = row.try_get("payload")?;
                Ok(EventRecord {
                    land_id: parse(row.try_get("land_id")?, "land_id")?,
                    actor: parse(row.try_get("actor")?, "actor")?,
                    correlation_id: row.try_get("correlation_id")?,
                    at: row.try_get("recorded_at")?,
                    event: serde_json::from_str::<WorkflowEvent>(&payload)?,
                })
            })
            .collect()
    }
}

struct SqliteTransaction {
    tx: Transaction<'static, Sqlite>,
    snapshot: LandAggregate,
}

#[async_trait]
impl LandTransaction for SqliteTransaction {
    fn snapshot(&self) -> &LandAggregate {
        &self.snapshot
    }

    async fn commit(
        mut self: Box<Self>,
        next: LandAggregate,
        events: Vec<EventRecord>,
    ) -> Result<(), StoreError> {
        if next.land.id != self.snapshot.land.id {
            return Err(StoreError::Corrupt(format!(
                "transaction for land {} cannot commit land {}",
                self.snapshot.land.id, next.land.id
            )));
        }
        check_interest_uniqueness(&next)?;

        let removed_tasks: HashSet<TaskId> = self
            .snapshot
            .tasks
            .iter()
            .map(|task| task.id)
            .filter(|id| !next.tasks.iter().any(|task| task.id == *id))
            .collect();

        write_aggregate(&mut self.tx, &next, &removed_tasks).await?;
        append_events(&mut self.tx, &events).await?;
        self.tx.commit().await?;
        Ok(())
    }

    async fn delete(mut self: Box<Self>, events: Vec<EventRecord>) -> Result<(), StoreError> {
        // Children go with the land through ON DELETE CASCADE
        sqlx::query("DELETE FROM land WHERE land_id = ?1")
            .bind(self.snapshot.land.id.to_string())
            .execute(&mut *self.tx)
            .await?;
        append_events(&mut self.tx, &events).await?;
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        debug!(land_id = %self.snapshot.land.id, "Rolled back land transaction");
        self.tx.rollback().await?;
        Ok(())
    }
}

fn parse<T>(value: String, column: &str) -> Result<T, StoreError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse()
        .map_err(|e| StoreError::Corrupt(format!("{column} = '{value}': {e}")))
}

fn parse_opt<T>(value: Option<String>, column: &str) -> Result<Option<T>, StoreError>
where
    T: FromStr,
    T::Err: Display,
{
    value.map(|value| parse(value, column)).transpose()
}

/// Map unique-index violations to `Conflict` so callers see a uniqueness failure
fn write_error(error: sqlx::Error) -> StoreError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(db.message().to_string())
        }
        _ => StoreError::Database(error),
    }
}

async fn load_aggregate(
    conn: &mut SqliteConnection,
    land_id: LandId,
) -> Result<Option<LandAggregate>, StoreError> {
    let id = land_id.to_string();

    let Some(land_row) = sqlx::query("SELECT * FROM land WHERE land_id = ?1")
        .bind(&id)
        .fetch_optional(&mut *conn)
        .await?
    else {
        return Ok(None);
    };
    let land = land_from_row(&land_row)?;

    let sections = sqlx::query(
        "SELECT * FROM land_section WHERE land_id = ?1 ORDER BY created_at, rowid",
    )
    .bind(&id)
    .fetch_all(&mut *conn)
    .await?
    .iter()
    .map(section_from_row)
    .collect::<Result<Vec<_>, _>>()?;

    let mut tasks = sqlx::query("SELECT * FROM task WHERE land_id = ?1 ORDER BY created_at, rowid")
        .bind(&id)
        .fetch_all(&mut *conn)
        .await?
        .iter()
        .map(task_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    let history_rows = sqlx::query(
        r#"
        SELECT h.* FROM task_history h
        JOIN task t ON t.task_id = h.task_id
        WHERE t.land_id = ?1
        ORDER BY h.start_ts, h.rowid
        "#,
    )
    .bind(&id)
    .fetch_all(&mut *conn)
    .await?;
    for row in &history_rows {
        let entry = history_from_row(row)?;
        if let Some(task) = tasks.iter_mut().find(|task| task.id == entry.task_id) {
            task.history.push(entry);
        }
    }

    let interests = sqlx::query(
        "SELECT * FROM investor_interest WHERE land_id = ?1 ORDER BY created_at, rowid",
    )
    .bind(&id)
    .fetch_all(&mut *conn)
    .await?
    .iter()
    .map(interest_from_row)
    .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(LandAggregate {
        land,
        sections,
        tasks,
        interests,
    }))
}

/// Upsert every row of the aggregate, in the order the rows were created
async fn write_aggregate(
    conn: &mut SqliteConnection,
    aggregate: &LandAggregate,
    removed_tasks: &HashSet<TaskId>,
) -> Result<(), StoreError> {
    let land = &aggregate.land;
    let coordinates = land.coordinates.map(|c| serde_json::to_string(&c)).transpose()?;
    sqlx::query(
        r#"
        INSERT INTO land (
            land_id, landowner_id, title, location_text, coordinates, area_acres, land_type,
            energy_type, capacity_mw, price_per_mwh, contract_term_years, developer_name,
            timeline_text, status, visibility, admin_notes, published_at, interest_locked_at,
            created_at, updated_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
        ON CONFLICT (land_id) DO UPDATE SET
            title = excluded.title,
            location_text = excluded.location_text,
            coordinates = excluded.coordinates,
            area_acres = excluded.area_acres,
            land_type = excluded.land_type,
            energy_type = excluded.energy_type,
            capacity_mw = excluded.capacity_mw,
            price_per_mwh = excluded.price_per_mwh,
            contract_term_years = excluded.contract_term_years,
            developer_name = excluded.developer_name,
            timeline_text = excluded.timeline_text,
            status = excluded.status,
            visibility = excluded.visibility,
            admin_notes = excluded.admin_notes,
            published_at = excluded.published_at,
            interest_locked_at = excluded.interest_locked_at,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(land.id.to_string())
    .bind(land.landowner_id.to_string())
    .bind(&land.title)
    .bind(&land.location_text)
    .bind(coordinates)
    .bind(land.area_acres)
    .bind(&land.land_type)
    .bind(&land.energy_type)
    .bind(land.terms.capacity_mw)
    .bind(land.terms.price_per_mwh)
    .bind(land.terms.contract_term_years.map(i64::from))
    .bind(&land.terms.developer_name)
    .bind(&land.terms.timeline_text)
    .bind(land.status.as_str())
    .bind(land.visibility.as_str())
    .bind(&land.admin_notes)
    .bind(land.published_at)
    .bind(land.interest_locked_at)
    .bind(land.created_at)
    .bind(land.updated_at)
    .execute(&mut *conn)
    .await
    .map_err(write_error)?;

    for section in &aggregate.sections {
        sqlx::query(
            r#"
            INSERT INTO land_section (
                land_section_id, land_id, section_key, status, assigned_role, assigned_user,
                data, reviewer_comments, submitted_at, approved_at, rejected_at,
                created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ON CONFLICT (land_section_id) DO UPDATE SET
                status = excluded.status,
                assigned_role = excluded.assigned_role,
                assigned_user = excluded.assigned_user,
                data = excluded.data,
                reviewer_comments = excluded.reviewer_comments,
                submitted_at = excluded.submitted_at,
                approved_at = excluded.approved_at,
                rejected_at = excluded.rejected_at,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(section.id.to_string())
        .bind(section.land_id.to_string())
        .bind(&section.section_key)
        .bind(section.status.as_str())
        .bind(&section.assigned_role)
        .bind(section.assigned_user.map(|user| user.to_string()))
        .bind(serde_json::to_string(&section.data)?)
        .bind(&section.reviewer_comments)
        .bind(section.submitted_at)
        .bind(section.approved_at)
        .bind(section.rejected_at)
        .bind(section.created_at)
        .bind(section.updated_at)
        .execute(&mut *conn)
        .await
        .map_err(write_error)?;
    }

    for task_id in removed_tasks {
        sqlx::query("DELETE FROM task WHERE task_id = ?1")
            .bind(task_id.to_string())
            .execute(&mut *conn)
            .await?;
    }

    for task in &aggregate.tasks {
        write_task(conn, task).await?;
    }

    for interest in &aggregate.interests {
        sqlx::query(
            r#"
            INSERT INTO investor_interest (
                interest_id, land_id, investor_id, investment_amount, message, status,
                created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT (interest_id) DO UPDATE SET
                status = excluded.status,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(interest.id.to_string())
        .bind(interest.land_id.to_string())
        .bind(interest.investor_id.to_string())
        .bind(interest.investment_amount)
        .bind(&interest.message)
        .bind(interest.status.as_str())
        .bind(interest.created_at)
        .bind(interest.updated_at)
        .execute(&mut *conn)
        .await
        .map_err(write_error)?;
    }

    Ok(())
}

async fn write_task(conn: &mut SqliteConnection, task: &Task) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO task (
            task_id, land_id, land_section_id, title, description, assigned_role, assigned_to,
            status, priority, start_date, end_date, created_by, created_at, updated_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        ON CONFLICT (task_id) DO UPDATE SET
            land_section_id = excluded.land_section_id,
            title = excluded.title,
            description = excluded.description,
            assigned_role = excluded.assigned_role,
            assigned_to = excluded.assigned_to,
            status = excluded.status,
            priority = excluded.priority,
            start_date = excluded.start_date,
            end_date = excluded.end_date,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(task.id.to_string())
    .bind(task.land_id.to_string())
    .bind(task.land_section_id.map(|id| id.to_string()))
    .bind(&task.title)
    .bind(&task.description)
    .bind(&task.assigned_role)
    .bind(task.assigned_to.map(|user| user.to_string()))
    .bind(task.status.as_str())
    .bind(task.priority.as_str())
    .bind(task.start_date)
    .bind(task.end_date)
    .bind(task.created_by.to_string())
    .bind(task.created_at)
    .bind(task.updated_at)
    .execute(&mut *conn)
    .await
    .map_err(write_error)?;

    // Rows are ordered oldest first, so the previous open row is closed
    // before the new open row is inserted.
    for entry in &task.history {
        sqlx::query(
            r#"
            INSERT INTO task_history (
                history_id, task_id, from_status, to_status, changed_by, note, start_ts, end_ts
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT (history_id) DO UPDATE SET end_ts = excluded.end_ts
            "#,
        )
        .bind(entry.id.to_string())
        .bind(entry.task_id.to_string())
        .bind(entry.from_status.map(|status| status.as_str()))
        .bind(entry.to_status.as_str())
        .bind(entry.changed_by.to_string())
        .bind(&entry.note)
        .bind(entry.start_ts)
        .bind(entry.end_ts)
        .execute(&mut *conn)
        .await
        .map_err(write_error)?;
    }
    Ok(())
}

async fn append_events(
    conn: &mut SqliteConnection,
    events: &[EventRecord],
) -> Result<(), StoreError> {
    for record in events {
        sqlx::query(
            r#"
            INSERT INTO workflow_event (land_id, actor, correlation_id, event_name, payload, recorded_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(record.land_id.to_string())
        .bind(record.actor.to_string())
        .bind(&record.correlation_id)
        .bind(record.event.name())
        .bind(serde_json::to_string(&record.event)?)
        .bind(record.at)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

fn land_from_row(row: &SqliteRow) -> Result<Land, StoreError> {
    let coordinates: Option<String> = row.try_get("coordinates")?;
    let coordinates = coordinates
        .map(|raw| serde_json::from_str::<Coordinates>(&raw))
        .transpose()?;
    let contract_term_years: Option<i64> = row.try_get("contract_term_years")?;
    let contract_term_years = contract_term_years
        .map(u32::try_from)
        .transpose()
        .map_err(|e| StoreError::Corrupt(format!("contract_term_years: {e}")))?;

    Ok(Land {
        id: parse(row.try_get("land_id")?, "land_id")?,
        landowner_id: parse(row.try_get("landowner_id")?, "landowner_id")?,
        title: row.try_get("title")?,
        location_text: row.try_get("location_text")?,
        coordinates,
        area_acres: row.try_get("area_acres")?,
        land_type: row.try_get("land_type")?,
        energy_type: row.try_get("energy_type")?,
        terms: CommercialTerms {
            capacity_mw: row.try_get("capacity_mw")?,
            price_per_mwh: row.try_get("price_per_mwh")?,
            contract_term_years,
            developer_name: row.try_get("developer_name")?,
            timeline_text: row.try_get("timeline_text")?,
        },
        status: parse(row.try_get("status")?, "land.status")?,
        visibility: parse(row.try_get("visibility")?, "land.visibility")?,
        admin_notes: row.try_get("admin_notes")?,
        published_at: row.try_get::<Option<DateTime<Utc>>, _>("published_at")?,
        interest_locked_at: row.try_get::<Option<DateTime<Utc>>, _>("interest_locked_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn section_from_row(row: &SqliteRow) -> Result<LandSection, StoreError> {
    let data: String = row.try_get("data")?;
    Ok(LandSection {
        id: parse(row.try_get("land_section_id")?, "land_section_id")?,
        land_id: parse(row.try_get("land_id")?, "land_id")?,
        section_key: row.try_get("section_key")?,
        status: parse(row.try_get("status")?, "land_section.status")?,
        assigned_role: row.try_get("assigned_role")?,
        assigned_user: parse_opt(row.try_get("assigned_user")?, "assigned_user")?,
        data: serde_json::from_str(&data)?,
        reviewer_comments: row.try_get("reviewer_comments")?,
        submitted_at: row.try_get("submitted_at")?,
        approved_at: row.try_get("approved_at")?,
        rejected_at: row.try_get("rejected_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn task_from_row(row: &SqliteRow) -> Result<Task, StoreError> {
    Ok(Task {
        id: parse(row.try_get("task_id")?, "task_id")?,
        land_id: parse(row.try_get("land_id")?, "land_id")?,
        land_section_id: parse_opt(row.try_get("land_section_id")?, "land_section_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        assigned_role: row.try_get("assigned_role")?,
        assigned_to: parse_opt(row.try_get("assigned_to")?, "assigned_to")?,
        status: parse(row.try_get("status")?, "task.status")?,
        priority: parse(row.try_get("priority")?, "task.priority")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        created_by: parse(row.try_get("created_by")?, "created_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        history: Vec::new(),
    })
}

fn history_from_row(row: &SqliteRow) -> Result<TaskHistory, StoreError> {
    Ok(TaskHistory {
        id: parse(row.try_get("history_id")?, "history_id")?,
        task_id: parse(row.try_get("task_id")?, "task_id")?,
        from_status: parse_opt(row.try_get("from_status")?, "task_history.from_status")?,
        to_status: parse(row.try_get("to_status")?, "task_history.to_status")?,
        changed_by: parse(row.try_get("changed_by")?, "changed_by")?,
        note: row.try_get("note")?,
        start_ts: row.try_get("start_ts")?,
        end_ts: row.try_get("end_ts")?,
    })
}

fn interest_from_row(row: &SqliteRow) -> Result<InvestorInterest, StoreError> {
    Ok(InvestorInterest {
        id: parse(row.try_get("interest_id")?, "interest_id")?,
        land_id: parse(row.try_get("land_id")?, "land_id")?,
        investor_id: parse(row.try_get("investor_id")?, "investor_id")?,
        investment_amount: row.try_get("investment_amount")?,
        message: row.try_get("message")?,
        status: parse(row.try_get("status")?, "investor_interest.status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
