use std::path::{Path, PathBuf};

use crate::{collection::Collection, error::StoreError};

/// Writes fetched collections as `<symbol>_all.json` and `<symbol>_prices.json`.
#[derive(Debug, Clone)]
pub struct OutputStore {
    dir: PathBuf,
}

impl OutputStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The symbol ends up in a file name, so it must stay a single path component.
    pub fn check_symbol(symbol: &str) -> Result<(), StoreError> {
        let invalid = symbol.is_empty()
            || symbol == "."
            || symbol == ".."
            || symbol.contains(['/', '\\', '\0']);

        if invalid {
            return Err(StoreError::InvalidName(symbol.to_string()));
        }
        Ok(())
    }

    pub fn all_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}_all.json"))
    }

    pub fn prices_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}_prices.json"))
    }

    /// Overwrites both files of the collection, raw tokens first.
    #[tracing::instrument(skip(self, collection), fields(symbol = %collection.symbol))]
    pub async fn write_collection(
        &self,
        collection: &Collection,
    ) -> Result<(PathBuf, PathBuf), StoreError> {
        Self::check_symbol(&collection.symbol)?;

        let all = serde_json::to_vec(&collection.all())?;
        let prices = serde_json::to_vec(&collection.prices())?;

        let all_path = self.all_path(&collection.symbol);
        write(&all_path, all).await?;

        let prices_path = self.prices_path(&collection.symbol);
        write(&prices_path, prices).await?;

        tracing::info!(all = %all_path.display(), prices = %prices_path.display(), "Stored collection");

        Ok((all_path, prices_path))
    }
}

async fn write(path: &Path, content: Vec<u8>) -> Result<(), StoreError> {
    tokio::fs::write(path, content).await.map_err(|source| {
        tracing::error!("Writing {:?}: {:?}", path, source);
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eden::Token;
    use serde_json::json;
    use tempfile::TempDir;

    fn collection(symbol: &str) -> Collection {
        let tokens: Vec<Token> = vec![
            serde_json::from_value(json!({ "id": "a", "meta": { "name": "A" }, "listedPrice": 5 })).unwrap(),
            serde_json::from_value(json!({ "id": "b", "meta": { "name": "B" } })).unwrap(),
        ];
        Collection {
            symbol: symbol.to_string(),
            projected: tokens.iter().map(Token::project).collect(),
            tokens,
            pages: 2,
        }
    }

    #[test]
    fn rejects_path_like_symbols() {
        for symbol in ["", ".", "..", "a/b", "..\\x", "a\0b"] {
            assert!(
                matches!(OutputStore::check_symbol(symbol), Err(StoreError::InvalidName(_))),
                "{symbol:?} should be rejected"
            );
        }
        OutputStore::check_symbol("quantum_cats").unwrap();
        OutputStore::check_symbol("..cats").unwrap();
    }

    #[tokio::test]
    async fn writes_both_files() {
        let dir = TempDir::new().unwrap();
        let store = OutputStore::new(dir.path());

        let (all, prices) = store.write_collection(&collection("omb")).await.unwrap();

        assert_eq!(all, dir.path().join("omb_all.json"));
        assert_eq!(prices, dir.path().join("omb_prices.json"));

        let all: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&all).unwrap()).unwrap();
        assert_eq!(all["omb"].as_array().unwrap().len(), 2);
        assert_eq!(all["omb"][0]["meta"]["name"], "A");

        let prices = std::fs::read_to_string(&prices).unwrap();
        assert_eq!(
            prices,
            r#"{"omb":[{"id":"a","name":"A","listed":false,"listedAt":null,"listedPrice":5,"imageUrl":null},{"id":"b","name":"B","listed":false,"listedAt":null,"listedPrice":null,"imageUrl":null}]}"#
        );
    }

    #[tokio::test]
    async fn overwrites_previous_run() {
        let dir = TempDir::new().unwrap();
        let store = OutputStore::new(dir.path());
        std::fs::write(store.prices_path("omb"), "stale content that is longer than the new one".repeat(10)).unwrap();

        store.write_collection(&collection("omb")).await.unwrap();

        let prices = std::fs::read_to_string(store.prices_path("omb")).unwrap();
        assert!(prices.starts_with(r#"{"omb":["#));
        assert!(!prices.contains("stale"));
    }

    #[tokio::test]
    async fn missing_directory() {
        let dir = TempDir::new().unwrap();
        let store = OutputStore::new(dir.path().join("does-not-exist"));

        let err = store.write_collection(&collection("omb")).await.unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }
}
