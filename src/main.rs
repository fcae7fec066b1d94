mod cli;
mod commands;
mod error;
mod mcp;
mod output;
mod pdf;
mod selection;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use error::CliError;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err
                .downcast_ref::<CliError>()
                .map(CliError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Mcp => {
            mcp::run_server().await?;
        }
        Commands::Info { path, json } => {
            commands::info::run(&path, json)?;
        }
        Commands::Delete {
            path,
            select,
            output,
        } => {
            commands::delete::run(&path, output.as_deref(), &select.into_selection(false))?;
        }
        Commands::Extract {
            path,
            select,
            output,
        } => {
            commands::extract::run(&path, output.as_deref(), &select.into_selection(false))?;
        }
        Commands::Insert {
            path,
            insert,
            index,
            output,
        } => {
            commands::insert::run(&path, &insert, output.as_deref(), &index)?;
        }
        Commands::Merge {
            inputs,
            all,
            output,
        } => {
            commands::merge::run(&inputs, output.as_deref(), all)?;
        }
        Commands::Split {
            path,
            select,
            all,
            output,
        } => {
            commands::split::run(&path, output.as_deref(), &select.into_selection(all))?;
        }
        Commands::Encrypt {
            path,
            user_password,
            owner_password,
            use_40bit,
            output,
        } => {
            commands::encrypt::run(
                &path,
                output.as_deref(),
                &user_password,
                owner_password.as_deref(),
                use_40bit,
            )?;
        }
        Commands::Decrypt {
            path,
            password,
            output,
        } => {
            commands::decrypt::run(&path, output.as_deref(), &password)?;
        }
        Commands::Remove {
            path,
            images,
            links,
            text,
            output,
        } => {
            let targets = commands::remove::Targets {
                images,
                links,
                text,
            };
            commands::remove::run(&path, output.as_deref(), targets)?;
        }
        Commands::Reverse { path, output } => {
            commands::reverse::run(&path, output.as_deref())?;
        }
        Commands::Rotate {
            path,
            select,
            all,
            angle,
            output,
        } => {
            commands::rotate::run(&path, output.as_deref(), &select.into_selection(all), angle)?;
        }
        Commands::Scale {
            path,
            select,
            all,
            scale_to,
            horizontal,
            vertical,
            output,
        } => {
            commands::scale::run(
                &path,
                output.as_deref(),
                &select.into_selection(all),
                horizontal,
                vertical,
                scale_to,
            )?;
        }
    }

    Ok(())
}
