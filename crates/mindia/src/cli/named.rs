//! Named transformation command handlers.

use super::commands::{NamedCommands, OutputFormat};
use super::output::print_json;
use mindia::Mindia;
use mindia_error::MindiaResult;

/// Handle named transformation commands.
pub async fn handle_named_command(mindia: &Mindia, cmd: NamedCommands) -> MindiaResult<()> {
    match cmd {
        NamedCommands::List { format } => {
            let all = mindia.named().list().await?;
            match format {
                OutputFormat::Json => print_json(&all)?,
                OutputFormat::Human => {
                    for named in &all {
                        println!("{:<24} {}", named.reference(), named.transformations());
                    }
                    println!("Total: {} items", all.len());
                }
            }
        }

        NamedCommands::Set {
            name,
            transformations,
        } => {
            let named = mindia.named().upsert(&name, &transformations).await?;
            println!("{} -> {}", named.reference(), named.transformations());
        }

        NamedCommands::Delete { name } => {
            mindia.named().delete(&name).await?;
            println!("Deleted t_{}", name);
        }

        NamedCommands::Clear => {
            mindia.named().delete_all().await?;
            println!("Deleted every named transformation");
        }
    }
    Ok(())
}
