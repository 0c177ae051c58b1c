use std::process::ExitStatus;

use tokio::process::Command;

use crate::settings::Config;

fn check_status(action: &str, status: ExitStatus) -> anyhow::Result<()> {
    if !status.success() {
        anyhow::bail!("sqlx migrate {} exited with {}", action, status);
    }
    Ok(())
}

pub async fn db_generate(migration_name: &str) -> anyhow::Result<()> {
    let status = Command::new("sqlx")
        .arg("migrate")
        .arg("add")
        .arg(migration_name)
        .arg("-r")
        .status()
        .await?;
    check_status("add", status)
}

pub async fn db_list(config: &Config) -> anyhow::Result<()> {
    let status = Command::new("sqlx")
        .arg("migrate")
        .arg("info")
        .arg("-D")
        .arg(&config.database_url)
        .status()
        .await?;
    check_status("info", status)
}

pub async fn db_migrate(config: &Config) -> anyhow::Result<()> {
    let status = Command::new("sqlx")
        .arg("migrate")
        .arg("run")
        .arg("-D")
        .arg(&config.database_url)
        .status()
        .await?;
    check_status("run", status)
}

pub async fn db_revert(config: &Config) -> anyhow::Result<()> {
    let status = Command::new("sqlx")
        .arg("migrate")
        .arg("revert")
        .arg("-D")
        .arg(&config.database_url)
        .status()
        .await?;
    check_status("revert", status)
}
