use anyhow::Context;
use clap::{Parser, Subcommand};
use raktmap_core::{
    compatible_donor_groups, normalize_blood_group, AccountService, DonorService, FileStore,
    NewUser, DEFAULT_DATA_DIR,
};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "raktmap")]
#[command(about = "RaktMap donor directory administration CLI")]
struct Cli {
    /// Directory holding the JSON store
    #[arg(long, env = "RAKTMAP_DATA_DIR", default_value = DEFAULT_DATA_DIR, global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace the donor directory with the rows of a CSV export
    ImportDonors {
        /// CSV with `Student Name`, `Blood Group`, `Mobile No`, `Email` and `Roll No` columns
        csv: PathBuf,
    },
    /// List all donors
    ListDonors,
    /// Show which donor groups can supply a requested group
    Compat {
        /// Requested blood group, e.g. "AB+" or "o -"
        group: String,
    },
    /// Create a hospital or admin account
    AddUser {
        email: String,
        /// Display name (hospital name for hospital accounts)
        name: String,
        /// `admin` or `hospital`
        #[arg(long, default_value = "hospital")]
        role: String,
        #[arg(long, env = "RAKTMAP_USER_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("raktmap=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::ImportDonors { csv }) => {
            let store = open_store(&cli.data_dir)?;
            let file = File::open(&csv)
                .with_context(|| format!("failed to open {}", csv.display()))?;
            let report = DonorService::new(store).import_csv(file)?;
            if report.donors.is_empty() {
                println!(
                    "No valid donors in {} ({} row(s) skipped); directory unchanged.",
                    csv.display(),
                    report.skipped
                );
            } else {
                println!(
                    "Imported {} donor(s), skipped {} row(s).",
                    report.donors.len(),
                    report.skipped
                );
            }
        }
        Some(Commands::ListDonors) => {
            let store = open_store(&cli.data_dir)?;
            let donors = DonorService::new(store).list()?;
            if donors.is_empty() {
                println!("No donors found.");
            } else {
                for donor in donors {
                    println!(
                        "ID: {}, Name: {}, Group: {}, Phone: {}",
                        donor.id,
                        donor.name,
                        donor.blood_group,
                        donor.contact_phone().unwrap_or("-")
                    );
                }
            }
        }
        Some(Commands::Compat { group }) => {
            let normalized = normalize_blood_group(&group);
            let groups = compatible_donor_groups(&group);
            if groups.is_empty() {
                println!("{normalized}: not a recognised blood group, no compatible donors");
            } else {
                let names: Vec<&str> = groups.iter().map(|g| g.as_str()).collect();
                println!("{normalized} accepts: {}", names.join(", "));
            }
        }
        Some(Commands::AddUser {
            email,
            name,
            role,
            password,
        }) => {
            let store = open_store(&cli.data_dir)?;
            let user = AccountService::new(store).register(NewUser {
                email: Some(email),
                password: Some(password),
                role: Some(role),
                name: Some(name),
            })?;
            println!("Created {} account {} with ID: {}", user.role, user.email, user.id);
        }
        None => {
            println!("Use 'raktmap --help' for commands");
        }
    }

    Ok(())
}

fn open_store(data_dir: &std::path::Path) -> anyhow::Result<Arc<FileStore>> {
    let store = FileStore::open(data_dir)
        .with_context(|| format!("failed to open data directory {}", data_dir.display()))?;
    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_user() {
        let cli = Cli::try_parse_from([
            "raktmap",
            "--data-dir",
            "/tmp/rm",
            "add-user",
            "desk@city.org",
            "City Hospital",
            "--password",
            "hospital-pass",
        ])
        .unwrap();

        assert_eq!(cli.data_dir, PathBuf::from("/tmp/rm"));
        match cli.command {
            Some(Commands::AddUser { role, name, .. }) => {
                assert_eq!(role, "hospital");
                assert_eq!(name, "City Hospital");
            }
            _ => panic!("expected add-user"),
        }
    }

    #[test]
    fn test_parse_compat() {
        let cli = Cli::try_parse_from(["raktmap", "compat", "o -"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Compat { group }) if group == "o -"));
    }
}
