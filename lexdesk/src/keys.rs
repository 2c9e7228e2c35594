/// Key construction for documents kept in Redis.
#[derive(Debug, Clone)]
pub struct KeyContext<'a> {
    pub prefix: &'a str,
}

impl<'a> KeyContext<'a> {
    pub fn new(prefix: &'a str) -> Self {
        Self { prefix }
    }

    pub fn document(&self, collection: &str, id: &str) -> String {
        format!("{}:{}:{}", self.prefix, collection, id)
    }

    /// Glob matching every document of `collection`.
    pub fn collection_pattern(&self, collection: &str) -> String {
        format!("{}:{}:*", self.prefix, collection)
    }

    /// Inverse of [`KeyContext::document`]: the id segment of a document key.
    pub fn document_id<'k>(&self, collection: &str, key: &'k str) -> Option<&'k str> {
        key.strip_prefix(self.prefix)?
            .strip_prefix(':')?
            .strip_prefix(collection)?
            .strip_prefix(':')
    }
}
