use std::collections::BTreeMap;

use rustc_serialize::json::{Json, ToJson};

use crate::error::ApiError;

#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    id: u64,
    title: String,
    content: String,
}

impl Post {
    pub fn new(id: u64, title: &str, content: &str) -> Post {
        Post {
            id,
            title: title.to_string(),
            content: content.to_string(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Overwrite title and content. The id stays as assigned by the store.
    pub fn rewrite(&mut self, title: String, content: String) {
        self.title = title;
        self.content = content;
    }
}

impl ToJson for Post {
    fn to_json(&self) -> Json {
        let mut object = BTreeMap::new();
        object.insert("id".to_string(), self.id.to_json());
        object.insert("title".to_string(), self.title.to_json());
        object.insert("content".to_string(), self.content.to_json());
        Json::Object(object)
    }
}

/// Body of a create request. Both keys must be present; their values are
/// taken as given, with non-string JSON stored as text.
#[derive(Clone, Debug, PartialEq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
}

impl NewPost {
    pub fn from_body(body: &str) -> Result<NewPost, ApiError> {
        let object = body_object(body).ok_or(ApiError::MissingFields)?;
        match (object.get("title"), object.get("content")) {
            (Some(title), Some(content)) => Ok(NewPost {
                title: as_text(title),
                content: as_text(content),
            }),
            _ => Err(ApiError::MissingFields),
        }
    }
}

/// Body of an update request. Only truthy values are kept; the store decides
/// whether the combination is acceptable once the target post exists.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl PostChanges {
    /// A body that is not a JSON object yields no fields at all.
    pub fn from_body(body: &str) -> PostChanges {
        match body_object(body) {
            Some(object) => PostChanges {
                title: truthy_field(&object, "title"),
                content: truthy_field(&object, "content"),
            },
            None => PostChanges::default(),
        }
    }

    /// Both fields, provided each is present and non-empty.
    pub fn complete(self) -> Option<(String, String)> {
        match (self.title, self.content) {
            (Some(title), Some(content)) if !title.is_empty() && !content.is_empty() => {
                Some((title, content))
            }
            _ => None,
        }
    }
}

fn body_object(body: &str) -> Option<BTreeMap<String, Json>> {
    match Json::from_str(body) {
        Ok(Json::Object(object)) => Some(object),
        _ => None,
    }
}

/// Strings as-is, `null` as empty text, anything else as its JSON encoding.
fn as_text(value: &Json) -> String {
    match *value {
        Json::String(ref s) => s.clone(),
        Json::Null => String::new(),
        ref other => other.to_string(),
    }
}

fn is_truthy(value: &Json) -> bool {
    match *value {
        Json::Null => false,
        Json::Boolean(b) => b,
        Json::I64(n) => n != 0,
        Json::U64(n) => n != 0,
        Json::F64(n) => n != 0.0,
        Json::String(ref s) => !s.is_empty(),
        Json::Array(ref a) => !a.is_empty(),
        Json::Object(ref o) => !o.is_empty(),
    }
}

fn truthy_field(object: &BTreeMap<String, Json>, key: &str) -> Option<String> {
    object.get(key).filter(|v| is_truthy(v)).map(as_text)
}

/// `{"message": ...}` body used for confirmations.
pub fn message(text: String) -> Json {
    let mut object = BTreeMap::new();
    object.insert("message".to_string(), Json::String(text));
    Json::Object(object)
}
