//! Media command handlers.

use super::commands::OutputFormat;
use super::output::{print_json, print_media, print_report};
use bytes::Bytes;
use mindia::{ContentType, MediaPath, MediaQueryBuilder, Mindia};
use mindia_core::SortKey;
use mindia_error::{ConfigError, MindiaResult, StorageError, StorageErrorKind};
use std::path::Path;
use uuid::Uuid;

/// Store a local file and print its record.
pub async fn upload(
    mindia: &Mindia,
    file: &Path,
    dir: &str,
    keep_name: bool,
    content_type: Option<&str>,
    transformations: &[String],
    format: OutputFormat,
) -> MindiaResult<()> {
    let body = tokio::fs::read(file)
        .await
        .map_err(|e| StorageError::new(StorageErrorKind::FileRead(format!("{}: {}", file.display(), e))))?;

    let extension = file
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    let content_type = match content_type {
        Some(ct) => ContentType::from(ct),
        None => ContentType::from_extension(extension),
    };

    let name = match file.file_name().and_then(|n| n.to_str()) {
        Some(name) if keep_name => name.to_string(),
        _ if extension.is_empty() => Uuid::new_v4().to_string(),
        _ => format!("{}.{}", Uuid::new_v4(), extension),
    };
    let path = MediaPath::new(format!("{}/{}", dir.trim_end_matches('/'), name))?;

    let media = mindia
        .media()
        .upload(path, Bytes::from(body), content_type, transformations)
        .await?;
    match format {
        OutputFormat::Json => print_json(&media),
        OutputFormat::Human => {
            print_media(&media);
            Ok(())
        }
    }
}

/// Write media, or one of its variants, to a local file.
pub async fn download(
    mindia: &Mindia,
    path: &str,
    transformation: Option<&str>,
    output: &Path,
) -> MindiaResult<()> {
    let mut download = match transformation {
        Some(transformation) => {
            mindia
                .media()
                .download(&MediaPath::new(path)?, transformation)
                .await?
        }
        None => mindia.media().download_request(path).await?,
    };

    let write_error =
        |e: std::io::Error| StorageError::new(StorageErrorKind::FileWrite(format!("{}: {}", output.display(), e)));
    let mut file = tokio::fs::File::create(output).await.map_err(write_error)?;
    let written = tokio::io::copy(&mut download.body, &mut file)
        .await
        .map_err(write_error)?;

    println!(
        "Wrote {} ({}, {} bytes) to {}",
        download.path,
        download.content_type,
        written,
        output.display()
    );
    Ok(())
}

/// Print a media record.
pub async fn get(mindia: &Mindia, path: String, format: OutputFormat) -> MindiaResult<()> {
    let media = mindia.media().get(&MediaPath::new(path)?).await?;
    match format {
        OutputFormat::Json => print_json(&media),
        OutputFormat::Human => {
            print_media(&media);
            Ok(())
        }
    }
}

/// Print a page of media records.
pub async fn list(
    mindia: &Mindia,
    prefix: String,
    offset: usize,
    limit: usize,
    sort: SortKey,
    ascending: bool,
    format: OutputFormat,
) -> MindiaResult<()> {
    let query = MediaQueryBuilder::default()
        .prefix(MediaPath::new(prefix)?)
        .offset(offset)
        .limit(limit)
        .sort(sort)
        .ascending(ascending)
        .build()
        .map_err(|e| ConfigError::new(format!("Invalid query: {}", e)))?;
    let records = mindia.media().list(&query).await?;
    match format {
        OutputFormat::Json => print_json(&records),
        OutputFormat::Human => {
            for media in &records {
                println!("{}  {}  {} bytes", media.path, media.content_type, media.content_length);
            }
            println!("Total: {} items", records.len());
            Ok(())
        }
    }
}

/// Delete media and their variants.
pub async fn delete(mindia: &Mindia, paths: Vec<String>) -> MindiaResult<()> {
    let paths = paths
        .into_iter()
        .map(MediaPath::new)
        .collect::<Result<Vec<_>, _>>()?;
    let report = mindia.media().delete_many(&paths).await?;
    print_report("Deleted", &report);
    Ok(())
}

/// Bundle originals into a zip archive on disk.
pub async fn archive(mindia: &Mindia, paths: Vec<String>, output: &Path) -> MindiaResult<()> {
    let paths = paths
        .into_iter()
        .map(MediaPath::new)
        .collect::<Result<Vec<_>, _>>()?;
    let archive = mindia.media().download_many(&paths).await?;

    tokio::fs::write(output, &archive).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileWrite(format!("{}: {}", output.display(), e)))
    })?;
    println!(
        "Wrote {} media ({} bytes) to {}",
        paths.len(),
        archive.len(),
        output.display()
    );
    Ok(())
}

/// Move or copy media into another directory.
pub async fn transfer(mindia: &Mindia, src: String, dst: String, copy: bool) -> MindiaResult<()> {
    let src = MediaPath::new(src)?;
    let dst = MediaPath::new(dst)?;
    let outcome = if copy {
        mindia.media().copy_to(&src, &dst).await?
    } else {
        mindia.media().move_to(&src, &dst).await?
    };
    if copy {
        for failure in &outcome.report.failures {
            eprintln!("  warning: {}", failure.kind);
        }
    } else {
        print_report("Moved", &outcome.report);
    }
    print_media(&outcome.media);
    Ok(())
}

/// Delete the variants of one media, or every variant.
pub async fn clear_cache(mindia: &Mindia, path: Option<String>, all: bool) -> MindiaResult<()> {
    let report = match path {
        Some(path) if !all => mindia.media().clear_cache(&MediaPath::new(path)?).await?,
        _ => mindia.media().clear_all_cache().await?,
    };
    print_report("Cleared", &report);
    Ok(())
}

/// Queue a colorize task.
pub async fn colorize(mindia: &Mindia, path: String) -> MindiaResult<()> {
    match mindia.media().colorize(&MediaPath::new(path)?).await? {
        Some(task) => println!("Queued task {} ({})", task.id, task.status),
        None => println!("Colorize finished immediately"),
    }
    Ok(())
}
