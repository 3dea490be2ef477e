use url::form_urlencoded;

use crate::error::ApiError;
use crate::model::Post;

/// Decoded query-string pairs, in the order they appeared.
#[derive(Clone, Debug, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn parse(query: Option<&str>) -> QueryParams {
        let pairs = match query {
            Some(query) => form_urlencoded::parse(query.as_bytes())
                .map(|(key, value)| (key.into_owned(), value.into_owned()))
                .collect(),
            None => Vec::new(),
        };
        QueryParams { pairs }
    }

    /// First value supplied for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    Title,
    Content,
}

impl SortField {
    fn key<'a>(&self, post: &'a Post) -> &'a str {
        match *self {
            SortField::Title => post.title(),
            SortField::Content => post.content(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: Direction,
}

impl Sort {
    /// `None` unless `sort` names a sortable field. Only `direction=desc` reverses.
    pub fn from_params(params: &QueryParams) -> Option<Sort> {
        let field = match params.get("sort") {
            Some("title") => SortField::Title,
            Some("content") => SortField::Content,
            _ => return None,
        };
        let direction = match params.get("direction") {
            Some("desc") => Direction::Desc,
            _ => Direction::Asc,
        };
        Some(Sort { field, direction })
    }

    /// Stable, case-insensitive ordering. Equal keys keep their relative order
    /// in both directions.
    pub fn apply(&self, posts: &mut Vec<Post>) {
        let field = self.field;
        let mut keyed: Vec<(String, Post)> = posts
            .drain(..)
            .map(|post| (field.key(&post).to_lowercase(), post))
            .collect();
        let direction = self.direction;
        keyed.sort_by(|a, b| match direction {
            Direction::Asc => a.0.cmp(&b.0),
            Direction::Desc => b.0.cmp(&a.0),
        });
        posts.extend(keyed.into_iter().map(|(_, post)| post));
    }
}

/// Substring filters for search. A supplied but empty term filters nothing.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchCriteria {
    title: Option<String>,
    content: Option<String>,
    pub sort: Option<Sort>,
}

impl SearchCriteria {
    pub fn from_params(params: &QueryParams) -> Result<SearchCriteria, ApiError> {
        let title = params.get("title");
        let content = params.get("content");
        if title.is_none() && content.is_none() {
            return Err(ApiError::MissingSearchCriteria);
        }
        Ok(SearchCriteria {
            title: title.filter(|t| !t.is_empty()).map(str::to_lowercase),
            content: content.filter(|c| !c.is_empty()).map(str::to_lowercase),
            sort: Sort::from_params(params),
        })
    }

    pub fn matches(&self, post: &Post) -> bool {
        contains(post.title(), self.title.as_ref())
            && contains(post.content(), self.content.as_ref())
    }
}

fn contains(haystack: &str, needle: Option<&String>) -> bool {
    match needle {
        Some(needle) => haystack.to_lowercase().contains(needle.as_str()),
        None => true,
    }
}
