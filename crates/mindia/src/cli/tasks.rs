//! Task inspection handlers.

use super::commands::{OutputFormat, TaskCommands};
use super::output::print_json;
use mindia::Mindia;
use mindia_error::MindiaResult;

/// Handle task inspection commands.
pub async fn handle_task_command(mindia: &Mindia, cmd: TaskCommands) -> MindiaResult<()> {
    match cmd {
        TaskCommands::List { format } => {
            let tasks = mindia.tasks().await?;
            match format {
                OutputFormat::Json => print_json(&tasks)?,
                OutputFormat::Human => {
                    for task in &tasks {
                        println!(
                            "{}  {:<10} {:<10} {}",
                            task.id,
                            task.name,
                            task.status,
                            task.error.as_deref().unwrap_or("")
                        );
                    }
                    println!("Total: {} items", tasks.len());
                }
            }
        }

        TaskCommands::Show { id } => match mindia.task(&id).await? {
            Some(task) => print_json(&task)?,
            None => println!("No task {}", id),
        },
    }
    Ok(())
}
