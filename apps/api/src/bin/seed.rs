//! Seeds a demo account with two library answers and one sample project.
//!
//! Safe to re-run: the account's password is reset, and answers and the sample
//! project are only created when missing.

use anyhow::{anyhow, Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

const DEMO_EMAIL: &str = "demo@rfpcopilot.local";
const DEMO_PASSWORD: &str = "demo1234";
const DEMO_NAME: &str = "Demo User";

struct SeedAnswer {
    question_key: &'static str,
    title: &'static str,
    body: &'static str,
    tags: &'static str,
}

const DEMO_ANSWERS: [SeedAnswer; 2] = [
    SeedAnswer {
        question_key: "company-overview",
        title: "Company Overview",
        body: "We are a software consultancy specializing in secure cloud platforms and AI-assisted workflows.",
        tags: "company,overview",
    },
    SeedAnswer {
        question_key: "delivery-approach",
        title: "Delivery Approach",
        body: "We use a phased delivery model: discovery, implementation, QA, and enablement with weekly stakeholder sync.",
        tags: "delivery,methodology",
    },
];

const SAMPLE_PROJECT: &str = "Sample RFP - City Services Portal";
const SAMPLE_RAW_TEXT: &str = "Vendor shall provide project plan by 2026-04-10. Must ensure GDPR compliance. Proposal due 2026-03-30.";

/// (title, details, deadline, priority, status)
const SAMPLE_REQUIREMENTS: [(&str, &str, Option<&str>, &str, &str); 2] = [
    (
        "Submit project plan",
        "Vendor shall provide project plan by 2026-04-10.",
        Some("2026-04-10"),
        "High",
        "DRAFTED",
    ),
    (
        "Ensure GDPR compliance",
        "Must ensure GDPR compliance.",
        None,
        "High",
        "TODO",
    ),
];

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .context("Required environment variable 'DATABASE_URL' is not set")?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .context("failed to connect to PostgreSQL")?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run database migrations")?;

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(DEMO_PASSWORD.as_bytes(), &salt)
        .map_err(|e| anyhow!("failed to hash demo password: {e}"))?
        .to_string();

    let mut tx = pool.begin().await?;

    let user_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO users (email, name, password_hash) VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE SET password_hash = EXCLUDED.password_hash
        RETURNING id
        "#,
    )
    .bind(DEMO_EMAIL)
    .bind(DEMO_NAME)
    .bind(&password_hash)
    .fetch_one(&mut *tx)
    .await?;

    for answer in &DEMO_ANSWERS {
        sqlx::query(
            r#"
            INSERT INTO answers (owner_id, question_key, title, body, tags)
            SELECT $1, $2, $3, $4, $5
            WHERE NOT EXISTS (SELECT 1 FROM answers WHERE owner_id = $1 AND question_key = $2)
            "#,
        )
        .bind(user_id)
        .bind(answer.question_key)
        .bind(answer.title)
        .bind(answer.body)
        .bind(answer.tags)
        .execute(&mut *tx)
        .await?;
    }

    let existing: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM projects WHERE owner_id = $1 AND name = $2")
            .bind(user_id)
            .bind(SAMPLE_PROJECT)
            .fetch_optional(&mut *tx)
            .await?;

    if existing.is_none() {
        let project_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO projects (owner_id, name, description, status, raw_text)
            VALUES ($1, $2, 'Demo project seeded for first run', 'Drafting', $3)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(SAMPLE_PROJECT)
        .bind(SAMPLE_RAW_TEXT)
        .fetch_one(&mut *tx)
        .await?;

        for (position, (title, details, deadline, priority, status)) in
            (1i32..).zip(SAMPLE_REQUIREMENTS)
        {
            sqlx::query(
                r#"
                INSERT INTO project_requirements
                    (project_id, position, title, details, deadline, priority, status)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(project_id)
            .bind(position)
            .bind(title)
            .bind(details)
            .bind(deadline)
            .bind(priority)
            .bind(status)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    info!("Seed complete: {DEMO_EMAIL} / {DEMO_PASSWORD}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_answers_meet_library_minimums() {
        for answer in &DEMO_ANSWERS {
            assert!(answer.question_key.trim().chars().count() >= 2);
            assert!(answer.title.trim().chars().count() >= 2);
            assert!(answer.body.trim().chars().count() >= 10);
        }
    }

    #[test]
    fn test_sample_requirements_match_raw_text() {
        for (_, details, deadline, _, _) in SAMPLE_REQUIREMENTS {
            assert!(SAMPLE_RAW_TEXT.contains(details));
            if let Some(deadline) = deadline {
                assert!(details.contains(deadline));
            }
        }
        assert!(DEMO_PASSWORD.chars().count() >= 6);
    }
}
