//! Printing helpers shared by the handlers.

use mindia::{CleanupReport, Media};
use mindia_error::{JsonError, MindiaResult};
use serde::Serialize;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> MindiaResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| JsonError::new(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

pub fn print_media(media: &Media) {
    println!("{}", media.path);
    println!("  type:     {}", media.content_type);
    println!("  size:     {} bytes", media.content_length);
    println!("  created:  {}", media.created_at.to_rfc3339());
    for (key, value) in &media.embedded_metadata {
        println!("  {}: {}", key, value);
    }
    for derived in &media.derived_medias {
        println!("  variant:  {} ({} bytes)", derived.path, derived.content_length);
    }
}

pub fn print_report(action: &str, report: &CleanupReport) {
    println!("{} {} object(s)", action, report.removed.len());
    for failure in &report.failures {
        eprintln!("  warning: {}", failure.kind);
    }
}
