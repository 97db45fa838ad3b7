pub mod models;
mod seed;

use sqlx::{sqlite::SqlitePoolOptions, SqliteExecutor, SqlitePool};

use crate::error::{AppError, Result};
use models::{
    Comment, CommentRow, Event, EventRow, Investment, InvestmentDetail, InvestmentDetailRow,
    InvestmentRow, Investor, InvestorRow, ProfitPoint, DATE_FORMAT,
};

const INVESTMENT_COLUMNS: &str = "id, title, investment_type, amount, profit, profit_percentage, \
     status, start_date, end_date, votes_total, votes_positive, image_src";

#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");

        // Ensure the data directory exists
        if !in_memory {
            if let Some(path) = url.strip_prefix("sqlite:") {
                let path = path.split('?').next().unwrap_or(path);
                if let Some(parent) = std::path::Path::new(path).parent() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        // Every in-memory connection is its own database, so the pool holds
        // exactly one and never recycles it.
        let options = if in_memory {
            SqlitePoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = options.connect(url).await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Loads the demo dataset unless the database already holds investments.
    pub async fn seed_demo_data(&self) -> Result<bool> {
        seed::seed_demo_data(&self.pool).await
    }

    /// All investments in insertion order, which is the tie-break order of
    /// every list sort.
    pub async fn investments(&self) -> Result<Vec<Investment>> {
        let rows = sqlx::query_as::<_, InvestmentRow>(&format!(
            "SELECT {INVESTMENT_COLUMNS} FROM investments ORDER BY rowid"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Investment::try_from).collect()
    }

    pub async fn investment(&self, id: &str) -> Result<Option<Investment>> {
        let row = sqlx::query_as::<_, InvestmentRow>(&format!(
            "SELECT {INVESTMENT_COLUMNS} FROM investments WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Investment::try_from).transpose()
    }

    pub async fn investment_detail(&self, investment_id: &str) -> Result<Option<InvestmentDetail>> {
        let row = sqlx::query_as::<_, InvestmentDetailRow>(
            r#"
            SELECT description, expected_return, risk_level, funding_stage, location,
                   team, documents, milestones, type_details
            FROM investment_details
            WHERE investment_id = ?
            "#,
        )
        .bind(investment_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(InvestmentDetail::try_from).transpose()
    }

    pub async fn investors(&self) -> Result<Vec<Investor>> {
        let rows = sqlx::query_as::<_, InvestorRow>(
            r#"
            SELECT id, name, email, total_contribution, join_date, status,
                   last_activity, investment_count, avatar
            FROM investors
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Investor::try_from).collect()
    }

    pub async fn events(&self) -> Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT e.id, e.title, e.event_date, e.event_type, e.description,
                   i.id AS investment_id, i.title AS investment_title,
                   i.investment_type AS investment_type
            FROM events e
            LEFT JOIN investments i ON e.investment_id = i.id
            ORDER BY e.rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Event::try_from).collect()
    }

    pub async fn comments(&self, investment_id: &str) -> Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, investment_id, author_name, is_admin, content, created_at
            FROM comments
            WHERE investment_id = ?
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(investment_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Comment::try_from).collect()
    }

    pub async fn profit_history(&self) -> Result<Vec<ProfitPoint>> {
        let points = sqlx::query_as::<_, ProfitPoint>(
            "SELECT label, profit FROM profit_history ORDER BY position ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(points)
    }
}

pub async fn insert_investment<'e, E>(executor: E, investment: &Investment) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(&format!(
        "INSERT INTO investments ({INVESTMENT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&investment.id)
    .bind(&investment.title)
    .bind(investment.investment_type.as_str())
    .bind(investment.amount)
    .bind(investment.profit)
    .bind(investment.profit_percentage)
    .bind(investment.status.as_str())
    .bind(investment.start_date.format(DATE_FORMAT).to_string())
    .bind(investment.end_date.map(|d| d.format(DATE_FORMAT).to_string()))
    .bind(investment.votes.map(|v| i64::from(v.total)))
    .bind(investment.votes.map(|v| i64::from(v.positive)))
    .bind(&investment.image_src)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn insert_investment_detail<'e, E>(
    executor: E,
    investment_id: &str,
    detail: &InvestmentDetail,
) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    let to_json = |value: serde_json::Result<String>| {
        value.map_err(|e| AppError::Internal(format!("Failed to encode detail column: {e}")))
    };

    let team = to_json(serde_json::to_string(&detail.team))?;
    let documents = to_json(serde_json::to_string(&detail.documents))?;
    let milestones = to_json(serde_json::to_string(&detail.milestones))?;
    let type_details = detail
        .type_details
        .as_ref()
        .map(|d| to_json(serde_json::to_string(d)))
        .transpose()?;

    sqlx::query(
        r#"
        INSERT INTO investment_details
            (investment_id, description, expected_return, risk_level, funding_stage,
             location, team, documents, milestones, type_details)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(investment_id)
    .bind(&detail.description)
    .bind(detail.expected_return)
    .bind(detail.risk_level.as_str())
    .bind(&detail.funding_stage)
    .bind(&detail.location)
    .bind(team)
    .bind(documents)
    .bind(milestones)
    .bind(type_details)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn insert_investor<'e, E>(executor: E, investor: &Investor) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO investors
            (id, name, email, total_contribution, join_date, status,
             last_activity, investment_count, avatar)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&investor.id)
    .bind(&investor.name)
    .bind(&investor.email)
    .bind(investor.total_contribution)
    .bind(investor.join_date.format(DATE_FORMAT).to_string())
    .bind(investor.status.as_str())
    .bind(investor.last_activity.format(DATE_FORMAT).to_string())
    .bind(investor.investment_count)
    .bind(&investor.avatar)
    .execute(executor)
    .await?;

    Ok(())
}
