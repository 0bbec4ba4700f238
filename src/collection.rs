use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::{
    eden::{Client, ProjectedToken, Token, PAGE_LIMIT},
    error::FetchError,
};

/// Every token of a single collection, raw and projected, in inscription order.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub symbol: String,
    pub tokens: Vec<Token>,
    pub projected: Vec<ProjectedToken>,
    /// Upstream pages requested, including the closing empty one.
    pub pages: usize,
}

/// A single-entry JSON object `{symbol: items}`.
pub struct Keyed<'c, T> {
    pub key: &'c str,
    pub items: &'c [T],
}

impl<T: Serialize> Serialize for Keyed<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key, self.items)?;
        map.end()
    }
}

impl Collection {
    fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            tokens: Vec::new(),
            projected: Vec::new(),
            pages: 0,
        }
    }

    fn extend(&mut self, page: Vec<Token>) {
        self.projected.extend(page.iter().map(ProjectedToken::from));
        self.tokens.extend(page);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn all(&self) -> Keyed<'_, Token> {
        Keyed {
            key: &self.symbol,
            items: &self.tokens,
        }
    }

    pub fn prices(&self) -> Keyed<'_, ProjectedToken> {
        Keyed {
            key: &self.symbol,
            items: &self.projected,
        }
    }
}

/// Pages through the listing of `symbol` until an empty page comes back.
///
/// An empty first page means the collection does not exist. Any failing page
/// aborts the whole fetch, nothing of the already loaded pages is kept.
#[tracing::instrument(skip(client))]
pub async fn fetch_collection(
    client: &Client,
    symbol: &str,
    max_pages: Option<usize>,
) -> Result<Collection, FetchError> {
    let mut collection = Collection::new(symbol);
    let mut offset = 0;

    loop {
        if max_pages.is_some_and(|max| collection.pages >= max) {
            tracing::error!(pages = collection.pages, "Reached page limit");
            return Err(FetchError::TooLarge {
                symbol: symbol.to_string(),
                pages: collection.pages,
            });
        }

        let page = client.load_page(symbol, offset).await?;
        collection.pages += 1;

        if page.is_empty() {
            if offset == 0 {
                tracing::warn!("Collection not found");
                return Err(FetchError::NotFound(symbol.to_string()));
            }
            break;
        }

        collection.extend(page);

        offset += PAGE_LIMIT;
    }

    tracing::info!(
        tokens = collection.len(),
        pages = collection.pages,
        "Loaded collection"
    );

    Ok(collection)
}
