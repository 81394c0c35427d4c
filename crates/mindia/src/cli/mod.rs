//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the mindia binary.

mod commands;
mod media;
mod named;
mod output;
mod serve;
mod tasks;

pub use commands::{Cli, Commands};
pub use named::handle_named_command;
pub use serve::serve;
pub use tasks::handle_task_command;

use mindia::Mindia;
use mindia_error::MindiaResult;

/// Execute one command against `mindia`.
pub async fn run(mindia: &Mindia, command: Commands) -> MindiaResult<()> {
    match command {
        Commands::Upload {
            file,
            dir,
            keep_name,
            content_type,
            transformations,
            format,
        } => {
            media::upload(
                mindia,
                &file,
                &dir,
                keep_name,
                content_type.as_deref(),
                &transformations,
                format,
            )
            .await
        }
        Commands::Get { path, format } => media::get(mindia, path, format).await,
        Commands::Download {
            path,
            transformation,
            output,
        } => media::download(mindia, &path, transformation.as_deref(), &output).await,
        Commands::Archive { paths, output } => media::archive(mindia, paths, &output).await,
        Commands::List {
            prefix,
            offset,
            limit,
            sort,
            ascending,
            format,
        } => media::list(mindia, prefix, offset, limit, sort, ascending, format).await,
        Commands::Delete { paths } => media::delete(mindia, paths).await,
        Commands::Move { src, dst } => media::transfer(mindia, src, dst, false).await,
        Commands::Copy { src, dst } => media::transfer(mindia, src, dst, true).await,
        Commands::ClearCache { path, all } => media::clear_cache(mindia, path, all).await,
        Commands::Colorize { path } => media::colorize(mindia, path).await,
        Commands::Named(cmd) => handle_named_command(mindia, cmd).await,
        Commands::Tasks(cmd) => handle_task_command(mindia, cmd).await,
        Commands::Serve => serve(mindia).await,
    }
}
