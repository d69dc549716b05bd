use std::mem;

use crate::field::FieldInfo;

/// A decoded form: an ordered mapping from field name to one value or, when
/// the same name repeats in the stream, an ordered collection of values.
///
/// Entries appear in order of first appearance; values within an entry keep
/// stream arrival order. A `Form` is only ever materialized whole — a failed
/// decode returns an error and no form.
#[derive(Debug, Default, PartialEq)]
pub struct Form {
    entries: Vec<(String, FormValue)>,
}

/// Either a single field value or the ordered collection a repeated name was
/// promoted to.
#[derive(Debug, PartialEq)]
pub enum FormValue {
    Single(FieldInfo),
    Multiple(Vec<FieldInfo>),
}

impl Form {
    pub(crate) fn new() -> Form {
        Form::default()
    }

    /// Inserts one decoded field, applying the promotion rule: the first
    /// value under a name is stored directly, a second promotes the entry to
    /// a collection, later ones append.
    pub(crate) fn insert(&mut self, info: FieldInfo) {
        match self.entries.iter_mut().find(|(name, _)| name == info.name()) {
            Some((_, value)) => value.push(info),
            None => {
                self.entries
                    .push((info.name().to_owned(), FormValue::Single(info)));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.entries
            .iter()
            .find(|(entry_name, _)| entry_name == name)
            .map(|(_, value)| value)
    }

    /// Number of distinct field names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in order of first appearance.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Every field value, flattened, in entry order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldInfo> {
        self.entries.iter().flat_map(|(_, value)| value.iter())
    }

    /// Every file field, for handing to a persistence collaborator.
    pub fn files(&self) -> impl Iterator<Item = &FieldInfo> {
        self.fields().filter(|info| info.is_file())
    }
}

impl FormValue {
    /// The first value in arrival order.
    pub fn first(&self) -> &FieldInfo {
        match self {
            FormValue::Single(info) => info,
            FormValue::Multiple(list) => &list[0],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldInfo> {
        let slice = match self {
            FormValue::Single(info) => std::slice::from_ref(info),
            FormValue::Multiple(list) => list.as_slice(),
        };
        slice.iter()
    }

    fn push(&mut self, info: FieldInfo) {
        let current = mem::replace(self, FormValue::Multiple(Vec::new()));
        *self = match current {
            FormValue::Single(first) => FormValue::Multiple(vec![first, info]),
            FormValue::Multiple(mut list) => {
                list.push(info);
                FormValue::Multiple(list)
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content_disposition::ContentDisposition;
    use crate::field::RawField;
    use bytes::Bytes;
    use http::header::{HeaderMap, HeaderValue, CONTENT_DISPOSITION};

    fn text_field(name: &str, value: &str) -> FieldInfo {
        let mut headers = HeaderMap::new();
        let disposition = format!("form-data; name=\"{}\"", name);
        headers.insert(
            CONTENT_DISPOSITION,
            HeaderValue::from_str(&disposition).unwrap(),
        );
        let parsed = ContentDisposition::parse(&headers);
        let raw = RawField {
            headers: Some(headers),
            body: Bytes::copy_from_slice(value.as_bytes()),
        };
        FieldInfo::classify(raw, parsed).unwrap()
    }

    #[test]
    fn test_single_stays_single() {
        let mut form = Form::new();
        form.insert(text_field("title", "hi"));

        match form.get("title").unwrap() {
            FormValue::Single(info) => assert_eq!(info.text(), Some("hi")),
            FormValue::Multiple(_) => panic!("unexpected promotion"),
        }
    }

    #[test]
    fn test_repeat_promotes_in_order() {
        let mut form = Form::new();
        form.insert(text_field("tag", "a"));
        form.insert(text_field("tag", "b"));
        form.insert(text_field("tag", "c"));

        match form.get("tag").unwrap() {
            FormValue::Multiple(list) => {
                let values: Vec<_> = list.iter().filter_map(|info| info.text()).collect();
                assert_eq!(values, vec!["a", "b", "c"]);
            }
            FormValue::Single(_) => panic!("expected promotion"),
        }
        assert_eq!(form.len(), 1);
    }

    #[test]
    fn test_first_appearance_order_preserved() {
        let mut form = Form::new();
        form.insert(text_field("b", "1"));
        form.insert(text_field("a", "2"));
        form.insert(text_field("b", "3"));

        let names: Vec<_> = form.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["b", "a"]);

        let flattened: Vec<_> = form.fields().filter_map(|info| info.text()).collect();
        assert_eq!(flattened, vec!["1", "3", "2"]);
    }
}
