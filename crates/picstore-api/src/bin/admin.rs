//! Picstore 관리 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 사용자 생성 (비밀번호는 인자 또는 환경 변수)
//! picstore-admin create-user --username alice --password 'Secret123'
//! PICSTORE_NEW_USER_PASSWORD='Secret123' picstore-admin create-user -u alice
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use picstore_api::auth::{validate_password_strength, CredentialVerifier};
use picstore_api::repository::{bootstrap_schema, PgUserStore, UserStore};
use picstore_core::{init_logging, AppConfig, LogConfig, User};

/// 비밀번호 환경 변수 (쉘 히스토리에 남기지 않을 때 사용).
const PASSWORD_ENV: &str = "PICSTORE_NEW_USER_PASSWORD";

#[derive(Parser)]
#[command(name = "picstore-admin")]
#[command(about = "Picstore administration tool", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 새 사용자 생성
    CreateUser {
        /// 사용자 이름
        #[arg(short, long)]
        username: String,

        /// 비밀번호 (생략 시 PICSTORE_NEW_USER_PASSWORD)
        #[arg(short, long)]
        password: Option<String>,
    },
}

/// 비밀번호 강도를 확인하고 해싱하여 사용자를 저장합니다.
async fn create_user(
    store: &dyn UserStore,
    verifier: &CredentialVerifier,
    username: &str,
    password: &str,
) -> anyhow::Result<User> {
    let username = username.trim();
    if username.is_empty() || username.chars().count() > 64 {
        bail!("username must be 1-64 characters");
    }
    if let Err(reason) = validate_password_strength(password) {
        bail!("weak password: {}", reason);
    }

    let hash = verifier.hash(password)?;
    let user = store.create(username, &hash).await?;
    Ok(user)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_default()?,
    };
    init_logging(LogConfig::from_settings(&config.logging))
        .map_err(|e| anyhow::anyhow!("logging init failed: {}", e))?;

    match cli.command {
        Commands::CreateUser { username, password } => {
            let password = password
                .or_else(|| std::env::var(PASSWORD_ENV).ok())
                .with_context(|| format!("--password or {} is required", PASSWORD_ENV))?;

            let database_url = config
                .database
                .url
                .as_deref()
                .context("database.url is not set (DATABASE_URL or PICSTORE__DATABASE__URL)")?;
            let pool = PgPoolOptions::new()
                .max_connections(1)
                .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
                .connect(database_url)
                .await
                .context("failed to connect to database")?;
            bootstrap_schema(&pool).await?;

            let store = PgUserStore::new(pool.clone());
            let user = create_user(&store, &CredentialVerifier::new(), &username, &password).await?;
            info!(user_id = %user.id, username = %user.username, "User created");
            println!("created user {} (id {})", user.username, user.id);

            pool.close().await;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use picstore_api::repository::MemoryUserStore;

    fn fast() -> CredentialVerifier {
        CredentialVerifier::with_cost(1024, 1, 1).unwrap()
    }

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let store = MemoryUserStore::new();
        let verifier = fast();

        let user = create_user(&store, &verifier, " alice ", "Password1")
            .await
            .unwrap();
        assert_eq!(user.username, "alice");
        assert_ne!(user.password_hash, "Password1");
        assert!(verifier.verify("Password1", &user.password_hash));
    }

    #[tokio::test]
    async fn test_create_user_rejects_weak_password() {
        let store = MemoryUserStore::new();
        let result = create_user(&store, &fast(), "bob", "short").await;
        assert!(result.is_err());
        assert!(store.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicate() {
        let store = MemoryUserStore::new();
        create_user(&store, &fast(), "carol", "Password1").await.unwrap();
        assert!(create_user(&store, &fast(), "carol", "Password2").await.is_err());
    }

    #[test]
    fn test_cli_parses_create_user() {
        let cli = Cli::try_parse_from([
            "picstore-admin",
            "create-user",
            "--username",
            "dave",
            "--password",
            "Password1",
        ])
        .unwrap();

        match cli.command {
            Commands::CreateUser { username, password } => {
                assert_eq!(username, "dave");
                assert_eq!(password.as_deref(), Some("Password1"));
            }
        }
    }
}
