//! Tests for record stores: media, named transformations and tasks.

use bytes::Bytes;
use mindia_core::{ContentType, Media, MediaPath, NamedTransformation, SortKey, Task, TaskPayload};
use mindia_interface::{
    FileStorage, MediaQueryBuilder, MediaRepository, NamedTransformationStorage, TaskQueue,
    TaskRepository,
};
use mindia_storage::{
    JsonMediaRepository, JsonNamedTransformationStorage, JsonTaskStore, MemoryFileStorage,
    MemoryMediaRepository, MemoryNamedTransformationStorage, MemoryTaskStore,
};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

#[derive(Debug, Serialize, Deserialize)]
struct Echo {
    text: String,
}

impl TaskPayload for Echo {
    const TASK_NAME: &'static str = "echo";
}

fn media(path: &str, len: u64) -> Media {
    Media::new(MediaPath::new(path).unwrap(), ContentType::ImagePng, len)
}

async fn exercise_media_repository(repo: &dyn MediaRepository) {
    repo.save(&media("/a/1.png", 30)).await.unwrap();
    repo.save(&media("/a/2.png", 10)).await.unwrap();
    repo.save(&media("/a/3.png", 20)).await.unwrap();
    repo.save(&media("/b/1.png", 99)).await.unwrap();

    let query = MediaQueryBuilder::default()
        .prefix(MediaPath::new("/a").unwrap())
        .sort(SortKey::ContentLength)
        .ascending(true)
        .offset(1usize)
        .limit(5usize)
        .build()
        .unwrap();
    let page = repo.list(&query).await.unwrap();
    let sizes: Vec<_> = page.iter().map(|m| m.content_length).collect();
    assert_eq!(sizes, vec![20, 30]);

    let one = MediaPath::new("/a/1.png").unwrap();
    assert_eq!(repo.get(&one).await.unwrap().content_length, 30);
    repo.delete(&one).await.unwrap();
    assert!(repo.get(&one).await.unwrap_err().is_not_found());
    assert!(repo.delete(&one).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_memory_media_repository() {
    let repo = MemoryMediaRepository::new();
    exercise_media_repository(&repo).await;
    assert_eq!(repo.len(), 3);
}

#[tokio::test]
async fn test_json_media_repository_persists() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("media.json");
    exercise_media_repository(&JsonMediaRepository::new(&file)).await;

    let reopened = JsonMediaRepository::new(&file);
    let all = reopened
        .list(&MediaQueryBuilder::default().build().unwrap())
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
}

async fn exercise_named_storage(store: &dyn NamedTransformationStorage) {
    assert!(store.get("sq").await.unwrap().is_none());

    store
        .save(&NamedTransformation::new("sq", "c_scale,w_100,h_100"))
        .await
        .unwrap();
    store
        .save(&NamedTransformation::new("avatar", "c_scale,w_32,h_32"))
        .await
        .unwrap();

    let sq = store.get("sq").await.unwrap().unwrap();
    assert_eq!(sq.transformations(), "c_scale,w_100,h_100");

    let names: Vec<_> = store
        .get_all()
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.name().clone())
        .collect();
    assert_eq!(names, vec!["avatar", "sq"]);

    store.delete("sq").await.unwrap();
    store.delete("sq").await.unwrap();
    assert!(store.get("sq").await.unwrap().is_none());

    store.delete_all().await.unwrap();
    assert!(store.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_memory_named_storage() {
    exercise_named_storage(&MemoryNamedTransformationStorage::new()).await;
}

#[tokio::test]
async fn test_json_named_storage() {
    let temp_dir = TempDir::new().unwrap();
    let store = JsonNamedTransformationStorage::new(temp_dir.path().join("named.json"));
    exercise_named_storage(&store).await;
}

#[tokio::test]
async fn test_json_named_storage_reads_existing_file() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("named.json");
    JsonNamedTransformationStorage::new(&file)
        .save(&NamedTransformation::new("sq", "c_scale,w_100,h_100"))
        .await
        .unwrap();

    let store = JsonNamedTransformationStorage::new(&file);
    assert!(store.get("sq").await.unwrap().is_some());
}

async fn exercise_task_store<S: TaskQueue + TaskRepository>(store: &S) {
    assert!(store.dequeue().await.unwrap().is_none());

    let first = Task::new(&Echo { text: "one".into() }).unwrap();
    let second = Task::new(&Echo { text: "two".into() }).unwrap();
    store.enqueue(first.clone()).await.unwrap();
    store.enqueue(second.clone()).await.unwrap();

    assert_eq!(store.dequeue().await.unwrap().unwrap().id, first.id);
    assert_eq!(store.dequeue().await.unwrap().unwrap().id, second.id);
    assert!(store.dequeue().await.unwrap().is_none());

    store.save(&first).await.unwrap();
    assert_eq!(store.get(&first.id).await.unwrap().unwrap().name, "echo");
    assert_eq!(store.get_all().await.unwrap().len(), 1);
    store.delete(&first.id).await.unwrap();
    assert!(store.get(&first.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_memory_task_store() {
    exercise_task_store(&MemoryTaskStore::new()).await;
}

#[tokio::test]
async fn test_json_task_store() {
    let temp_dir = TempDir::new().unwrap();
    exercise_task_store(&JsonTaskStore::new(temp_dir.path().join("tasks.json"))).await;
}

#[tokio::test]
async fn test_memory_file_storage() {
    let storage = MemoryFileStorage::new();
    let src = MediaPath::new("/x/idc_a.png").unwrap();
    storage
        .upload(&src, Bytes::from_static(b"abc"), &ContentType::ImageWebp)
        .await
        .unwrap();

    let info = storage.get(&src).await.unwrap();
    assert_eq!(info.content_type(), &ContentType::ImageWebp);
    assert_eq!(storage.list(&MediaPath::new("/x/id").unwrap()).await.unwrap().len(), 1);

    let dst = MediaPath::new("/y/idc_a.png").unwrap();
    storage.move_object(&src, &dst).await.unwrap();
    assert_eq!(storage.paths(), vec![dst.clone()]);
    assert_eq!(storage.space_usage().await.unwrap(), 3);
    assert!(storage.delete(&src).await.unwrap_err().is_not_found());
}
