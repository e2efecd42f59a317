//! Dialogue dataset loading.
//!
//! Supports:
//! - A single JSON file holding a whole dataset
//! - JSONL files (one item per line)
//! - A directory of either, read in sorted path order

use crate::dialogue::{Session, Turn};
use crate::error::{BenchError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// One dialogue with its memory context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueItem {
    /// Unique identifier for this item.
    pub id: String,
    /// The dialogue. Its final turn is the ideal response.
    pub turns: Session,
    /// Prior-knowledge context handed to the judge.
    #[serde(default, deserialize_with = "deserialize_memory")]
    pub memory: String,
}

/// Memory may be stored as one string or as a history of snapshots; the latest wins.
#[derive(Deserialize)]
#[serde(untagged)]
enum MemoryField {
    One(String),
    Many(Vec<String>),
}

fn deserialize_memory<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match MemoryField::deserialize(deserializer)? {
        MemoryField::One(s) => s,
        MemoryField::Many(v) => v.into_iter().last().unwrap_or_default(),
    })
}

/// A collection of dialogues with indexed access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueDataset {
    /// Dataset name.
    pub name: String,
    /// Dataset items.
    pub items: Vec<DialogueItem>,
}

impl DialogueDataset {
    /// Create a new empty dataset.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            items: Vec::new(),
        }
    }

    /// Add an item to the dataset.
    pub fn add_item(&mut self, item: DialogueItem) {
        self.items.push(item);
    }

    /// Number of sessions in the dataset.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Session at `index`.
    pub fn session(&self, index: usize) -> Option<&Session> {
        self.items.get(index).map(|item| &item.turns)
    }

    /// Memory value for the session at `index`.
    pub fn memory(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(|item| item.memory.as_str())
    }

    /// The first `n` items. Always the same prefix for the same source.
    pub fn take(&self, n: usize) -> Self {
        Self {
            name: self.name.clone(),
            items: self.items.iter().take(n).cloned().collect(),
        }
    }

    /// Load `path` and keep the first `n_samples` sessions.
    ///
    /// An empty result is a setup error.
    pub fn with_samples(path: &Path, n_samples: usize) -> Result<Self> {
        let dataset = Self::load(path)?.take(n_samples);
        if dataset.is_empty() {
            return Err(BenchError::EmptyDataset(dataset.name));
        }
        Ok(dataset)
    }

    /// Load from a JSON file, a JSONL file, or a directory of them.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BenchError::DatasetNotFound(path.to_path_buf()));
        }

        if path.is_dir() {
            return Self::load_dir(path);
        }

        Self::load_file(path)
    }

    fn load_dir(dir: &Path) -> Result<Self> {
        let name = dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("dataset")
            .to_string();
        let mut dataset = Self::new(&name);

        let mut files: Vec<_> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| matches!(p.extension().and_then(|e| e.to_str()), Some("json" | "jsonl")))
            .collect();
        files.sort();

        for file in files {
            dataset.items.extend(Self::load_file(&file)?.items);
        }

        Ok(dataset)
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| BenchError::io(path, e))?;

        if path.extension().and_then(|e| e.to_str()) == Some("jsonl") {
            let name = path
                .file_stem()
                .and_then(|n| n.to_str())
                .unwrap_or("dataset")
                .to_string();
            return Self::parse_jsonl(&name, &content);
        }

        serde_json::from_str(&content).map_err(|e| {
            BenchError::Serialization(format!("Failed to parse dataset {:?}: {}", path, e))
        })
    }

    fn parse_jsonl(name: &str, content: &str) -> Result<Self> {
        let mut dataset = Self::new(name);

        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let item: DialogueItem = serde_json::from_str(line).map_err(|e| {
                BenchError::Serialization(format!(
                    "Failed to parse dialogue at line {}: {}",
                    line_num + 1,
                    e
                ))
            })?;
            dataset.add_item(item);
        }

        Ok(dataset)
    }

    /// Save to a JSON file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| BenchError::Serialization(e.to_string()))?;
        fs::write(path, content).map_err(|e| BenchError::io(path, e))
    }
}

/// Create a sample dataset for smoke runs.
pub fn create_sample_dataset() -> DialogueDataset {
    let mut dataset = DialogueDataset::new("sample");

    dataset.add_item(DialogueItem {
        id: "sample_1".to_string(),
        turns: Session::new(vec![
            Turn::new("user", "I'm planning a trip to Lisbon next month."),
            Turn::new("assistant", "Lisbon is lovely in spring. Do you have dates yet?"),
            Turn::new("user", "The second week. Any neighbourhood you'd suggest staying in?"),
            Turn::new(
                "assistant",
                "Since you mentioned you love live music, Alfama is a good fit: it is the home of fado and close to the river.",
            ),
        ]),
        memory: "The user loves live music and prefers walkable neighbourhoods.".to_string(),
    });

    dataset.add_item(DialogueItem {
        id: "sample_2".to_string(),
        turns: Session::new(vec![
            Turn::new("user", "Can you remind me what I said about my sourdough?"),
            Turn::new("assistant", "You said it came out dense last weekend."),
            Turn::new("user", "Right. What should I change?"),
            Turn::new(
                "assistant",
                "Given your kitchen runs cold, try a longer bulk fermentation, around six to eight hours, before shaping.",
            ),
        ]),
        memory: "The user's kitchen is cold (around 18C). Their last loaf was dense.".to_string(),
    });

    dataset.add_item(DialogueItem {
        id: "sample_3".to_string(),
        turns: Session::new(vec![
            Turn::new("user", "What was the name of the book I was reading?"),
            Turn::new(
                "assistant",
                "You were reading The Left Hand of Darkness by Ursula K. Le Guin.",
            ),
        ]),
        memory: "The user is reading The Left Hand of Darkness by Ursula K. Le Guin.".to_string(),
    });

    dataset
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_dataset_operations() {
        let mut dataset = DialogueDataset::new("test");
        assert!(dataset.is_empty());

        dataset.add_item(DialogueItem {
            id: "1".to_string(),
            turns: Session::new(vec![Turn::new("user", "q"), Turn::new("assistant", "a")]),
            memory: "m".to_string(),
        });

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.session(0).unwrap().len(), 2);
        assert_eq!(dataset.memory(0), Some("m"));
        assert!(dataset.session(1).is_none());
    }

    #[test]
    fn test_dataset_take_is_prefix() {
        let dataset = create_sample_dataset();
        assert_eq!(dataset.len(), 3);

        let subset = dataset.take(2);
        assert_eq!(subset.len(), 2);
        assert_eq!(subset.items[0].id, "sample_1");
        assert_eq!(subset.items[1].id, "sample_2");
        assert_eq!(dataset.take(10).len(), 3);
    }

    #[test]
    fn test_memory_history_uses_latest() {
        let json = r#"{"id": "x", "turns": [{"role": "user", "text": "hi"}], "memory": ["old", "new"]}"#;
        let item: DialogueItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.memory, "new");

        let json = r#"{"id": "y", "turns": []}"#;
        let item: DialogueItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.memory, "");
    }

    #[test]
    fn test_load_json_and_jsonl_directory() {
        let dir = TempDir::new().unwrap();

        let mut first = DialogueDataset::new("first");
        first.add_item(create_sample_dataset().items[0].clone());
        first.save_json(&dir.path().join("a.json")).unwrap();

        let line = serde_json::to_string(&create_sample_dataset().items[2]).unwrap();
        fs::write(dir.path().join("b.jsonl"), format!("{}\n\n", line)).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let dataset = DialogueDataset::load(dir.path()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.items[0].id, "sample_1");
        assert_eq!(dataset.items[1].id, "sample_3");
    }

    #[test]
    fn test_missing_and_empty() {
        let missing = DialogueDataset::load(Path::new("/nonexistent/dialogues.json"));
        assert!(matches!(missing, Err(BenchError::DatasetNotFound(_))));

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.json");
        DialogueDataset::new("empty").save_json(&path).unwrap();
        let empty = DialogueDataset::with_samples(&path, 5);
        assert!(matches!(empty, Err(BenchError::EmptyDataset(_))));
    }

    #[test]
    fn test_sample_dataset() {
        let dataset = create_sample_dataset();
        for item in &dataset.items {
            assert!(item.turns.len() >= 2);
            assert!(!item.memory.is_empty());
        }
    }
}
