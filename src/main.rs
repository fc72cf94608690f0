use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use tracing_subscriber::EnvFilter;

use cloud_sql_restore::{BackupRun, Operation, SqlRestore};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let matches = Command::new("cloud-sql-restore")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Restore Cloud SQL backups across projects")
        .arg(
            Arg::new("key-file")
                .long("key-file")
                .global(true)
                .help("Path to a service account key JSON file"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("backups")
                .about("List backup runs for an instance")
                .arg(Arg::new("project").long("project").required(true))
                .arg(Arg::new("instance").long("instance").required(true)),
        )
        .subcommand(
            restore_targeting(Command::new("restore").about("Restore a specific backup run")).arg(
                Arg::new("backup-id")
                    .long("backup-id")
                    .required(true)
                    .help("Id of the backup run to restore"),
            ),
        )
        .subcommand(restore_targeting(
            Command::new("restore-latest")
                .about("Restore the latest successful backup of the source instance"),
        ))
        .subcommand(
            Command::new("operations")
                .about("List recent operations for a project")
                .arg(Arg::new("project").long("project").required(true))
                .arg(Arg::new("instance").long("instance"))
                .arg(
                    Arg::new("max-results")
                        .long("max-results")
                        .value_parser(clap::value_parser!(u32)),
                ),
        )
        .subcommand(
            Command::new("status")
                .about("Check an operation once by its selfLink URL")
                .arg(Arg::new("url").long("url").required(true)),
        )
        .get_matches();

    let key_file = matches
        .get_one::<String>("key-file")
        .ok_or_else(|| anyhow::anyhow!("--key-file is required"))?;
    let client = SqlRestore::authorize(key_file)?;

    match matches.subcommand() {
        Some(("backups", sub)) => {
            let backups = client
                .list_backups(arg(sub, "project"), arg(sub, "instance"))
                .await?;
            print_backups(&backups);
        }
        Some(("restore", sub)) => {
            let operation = client
                .restore_backup(
                    arg(sub, "source-project"),
                    arg(sub, "source-instance"),
                    arg(sub, "target-project"),
                    arg(sub, "target-instance"),
                    arg(sub, "backup-id"),
                )
                .await?;
            print_operation(&operation);
        }
        Some(("restore-latest", sub)) => {
            let operation = client
                .restore_latest_backup(
                    arg(sub, "source-project"),
                    arg(sub, "source-instance"),
                    arg(sub, "target-project"),
                    arg(sub, "target-instance"),
                )
                .await?;
            print_operation(&operation);
        }
        Some(("operations", sub)) => {
            let operations = client
                .list_operations(
                    arg(sub, "project"),
                    sub.get_one::<String>("instance").map(String::as_str),
                    sub.get_one::<u32>("max-results").copied(),
                )
                .await?;
            for operation in &operations {
                print_operation(operation);
            }
        }
        Some(("status", sub)) => {
            let operation = client.check_operation_url(arg(sub, "url")).await?;
            print_operation(&operation);
        }
        _ => unreachable!("subcommand is required"),
    }

    Ok(())
}

fn restore_targeting(command: Command) -> Command {
    command
        .arg(Arg::new("source-project").long("source-project").required(true))
        .arg(Arg::new("source-instance").long("source-instance").required(true))
        .arg(Arg::new("target-project").long("target-project").required(true))
        .arg(Arg::new("target-instance").long("target-instance").required(true))
}

fn arg<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .unwrap_or_default()
}

fn print_backups(backups: &[BackupRun]) {
    println!("{:<14} {:<28} {}", "ID", "START TIME", "STATUS");
    for backup in backups {
        let start_time = backup
            .start_time
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<14} {:<28} {:?}", backup.id, start_time, backup.status);
    }
}

fn print_operation(operation: &Operation) {
    println!(
        "{:<20} {:<10?} {}",
        operation.operation_type.as_deref().unwrap_or("-"),
        operation.status,
        operation.self_link
    );
}
