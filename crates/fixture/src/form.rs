//! Form payload model for synthetic requests.

use crate::error::FixtureResult;
use crate::files::{FilePart, UploadedFile};

/// One form entry: plain text or an uploaded file.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    File(UploadedFile),
}

/// Ordered form payload with repeatable keys.
///
/// Entries keep insertion order so encoded bodies are deterministic, and a
/// key may repeat (`tags=a&tags=b`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    entries: Vec<(String, FormValue)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field.
    pub fn text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((key.into(), FormValue::Text(value.into())));
        self
    }

    /// Append a file field.
    pub fn file(mut self, key: impl Into<String>, file: UploadedFile) -> Self {
        self.entries.push((key.into(), FormValue::File(file)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn has_files(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, value)| matches!(value, FormValue::File(_)))
    }

    /// Remove and return every file entry, leaving text fields in place.
    pub fn drain_files(&mut self) -> Vec<FilePart> {
        let mut files = Vec::new();
        for (key, value) in std::mem::take(&mut self.entries) {
            match value {
                FormValue::Text(text) => self.entries.push((key, FormValue::Text(text))),
                FormValue::File(file) => files.push(FilePart { name: key, file }),
            }
        }
        files
    }

    /// Text fields as borrowed pairs, in insertion order. Files are skipped.
    pub fn text_pairs(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(key, value)| match value {
                FormValue::Text(text) => Some((key.as_str(), text.as_str())),
                FormValue::File(_) => None,
            })
            .collect()
    }

    /// Urlencode the text fields (`a=1&b=two`). Files are skipped.
    pub fn to_urlencoded(&self) -> FixtureResult<String> {
        Ok(serde_urlencoded::to_string(self.text_pairs())?)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = FormData::new();
        for (key, value) in iter {
            data = data.text(key, value);
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urlencoding_keeps_insertion_order() {
        let data = FormData::new().text("b", "2").text("a", "1");
        assert_eq!(data.to_urlencoded().unwrap(), "b=2&a=1");
    }

    #[test]
    fn urlencoding_escapes_reserved_characters() {
        let data = FormData::new().text("note", "a&b=c d");
        assert_eq!(data.to_urlencoded().unwrap(), "note=a%26b%3Dc+d");
    }

    #[test]
    fn repeated_keys_survive_encoding() {
        let data = FormData::new().text("tags", "alpha").text("tags", "beta");
        assert_eq!(data.to_urlencoded().unwrap(), "tags=alpha&tags=beta");
    }

    #[test]
    fn drain_files_pulls_files_and_keeps_text() {
        let mut data = FormData::new()
            .text("title", "launch")
            .file("doc", UploadedFile::new("plan.txt", &b"go"[..]))
            .text("owner", "ops");

        let files = data.drain_files();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "doc");
        assert_eq!(files[0].file.filename(), "plan.txt");

        assert!(!data.has_files());
        assert_eq!(data.text_pairs(), [("title", "launch"), ("owner", "ops")]);
    }

    #[test]
    fn collects_from_pair_iterators() {
        let data: FormData = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(data.to_urlencoded().unwrap(), "a=1&b=2");
    }
}
