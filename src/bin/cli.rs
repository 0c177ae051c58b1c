use backoffice_core::{
    cli::{
        auth::{self, NewUser},
        db::{db_generate, db_list, db_migrate, db_revert},
    },
    core::db::init_pool,
    settings::get_config,
};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database related command
    Db(DbArgs),
    /// Authentication related command
    Auth(AuthArgs),
}

#[derive(Debug, Args)]
struct AuthArgs {
    #[command(subcommand)]
    command: AuthCommands,
}

#[derive(Debug, Subcommand)]
enum AuthCommands {
    /// Create new user
    CreateUser {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        /// role name, created when missing
        #[arg(short, long)]
        role: String,
        #[arg(short, long, default_value = "Male")]
        gender: String,
        /// YYYY-MM-DD
        #[arg(short, long, default_value = "2001-01-01")]
        birthdate: String,
    },
    /// Create the Super Admin role and the admin account
    Seed,
    /// Delete access tokens older than the given number of days
    PruneTokens {
        #[arg(short, long)]
        days: u32,
    },
}

#[derive(Debug, Args)]
struct DbArgs {
    #[command(subcommand)]
    command: DbCommands,
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Generate new migration file
    Generate { migration_name: String },
    /// List all migration
    List,
    /// Run all pending migration
    Migrate,
    /// Revert latest migration
    Revert,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let cli = Cli::parse();
    match &cli.command {
        Commands::Db(db_args) => match &db_args.command {
            DbCommands::Generate { migration_name } => {
                println!("generate migration: {migration_name:?}");
                db_generate(migration_name).await?;
            }
            DbCommands::List => {
                println!("list migration");
                let config = get_config()?;
                db_list(&config).await?;
            }
            DbCommands::Migrate => {
                println!("run all pending migration");
                let config = get_config()?;
                db_migrate(&config).await?;
            }
            DbCommands::Revert => {
                println!("revert latest migration");
                let config = get_config()?;
                db_revert(&config).await?;
            }
        },
        Commands::Auth(auth_args) => {
            let config = get_config()?;
            let pool = init_pool(&config).await?;
            match &auth_args.command {
                AuthCommands::CreateUser {
                    name,
                    email,
                    password,
                    role,
                    gender,
                    birthdate,
                } => {
                    println!("create user: {email:?}");
                    let new_user = NewUser {
                        name: name.clone(),
                        email: email.clone(),
                        password: password.clone(),
                        gender: gender.clone(),
                        birthdate: birthdate.clone(),
                        role: role.clone(),
                    };
                    let user = auth::create_user(&pool, &new_user).await?;
                    println!("user {} created", user.id);
                }
                AuthCommands::Seed => {
                    println!("seed admin account");
                    auth::seed(&pool, &config).await?;
                }
                AuthCommands::PruneTokens { days } => {
                    let removed = auth::prune_tokens(&pool, *days).await?;
                    println!("{removed} access tokens older than {days} days removed");
                }
            }
        }
    }
    Ok(())
}
