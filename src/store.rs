use crate::error::ApiError;
use crate::model::{NewPost, Post, PostChanges};
use crate::query::{SearchCriteria, Sort};

/// The post collection, kept in insertion order.
#[derive(Clone, Debug, Default)]
pub struct PostStore {
    posts: Vec<Post>,
}

impl PostStore {
    pub fn new() -> PostStore {
        PostStore { posts: vec![] }
    }

    /// The two demo posts the service starts with.
    pub fn seeded() -> PostStore {
        let mut store = PostStore::new();
        store.create(NewPost {
            title: "First post".to_string(),
            content: "This is the first post.".to_string(),
        });
        store.create(NewPost {
            title: "Second post".to_string(),
            content: "This is the second post.".to_string(),
        });
        store
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn list(&self, sort: Option<Sort>) -> Vec<Post> {
        let mut posts = self.posts.clone();
        if let Some(sort) = sort {
            sort.apply(&mut posts);
        }
        posts
    }

    pub fn get(&self, id: u64) -> Result<&Post, ApiError> {
        self.posts
            .iter()
            .find(|post| post.id() == id)
            .ok_or(ApiError::PostNotFound { id })
    }

    /// Appends a post whose id is one past the current maximum.
    pub fn create(&mut self, draft: NewPost) -> Post {
        let id = self.posts.iter().map(Post::id).max().map_or(1, |max| max + 1);
        let post = Post::new(id, &draft.title, &draft.content);
        self.posts.push(post.clone());
        debug!("created post {}", id);
        post
    }

    /// Fails with `PostNotFound` before looking at the changes.
    pub fn update(&mut self, id: u64, changes: PostChanges) -> Result<Post, ApiError> {
        let post = self
            .posts
            .iter_mut()
            .find(|post| post.id() == id)
            .ok_or(ApiError::PostNotFound { id })?;
        let (title, content) = changes.complete().ok_or(ApiError::MissingFields)?;
        post.rewrite(title, content);
        debug!("updated post {}", id);
        Ok(post.clone())
    }

    pub fn delete(&mut self, id: u64) -> Result<Post, ApiError> {
        let index = self
            .posts
            .iter()
            .position(|post| post.id() == id)
            .ok_or(ApiError::PostNotFound { id })?;
        debug!("deleted post {}", id);
        Ok(self.posts.remove(index))
    }

    /// Filtered, optionally sorted copy. An empty result is not an error.
    pub fn search(&self, criteria: &SearchCriteria) -> Vec<Post> {
        let mut results: Vec<Post> = self
            .posts
            .iter()
            .filter(|post| criteria.matches(post))
            .cloned()
            .collect();
        if let Some(sort) = criteria.sort {
            sort.apply(&mut results);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Direction, QueryParams, SortField};

    fn draft(title: &str, content: &str) -> NewPost {
        NewPost {
            title: title.to_string(),
            content: content.to_string(),
        }
    }

    fn changes(title: &str, content: &str) -> PostChanges {
        PostChanges {
            title: Some(title.to_string()),
            content: Some(content.to_string()),
        }
    }

    fn ids(posts: &[Post]) -> Vec<u64> {
        posts.iter().map(Post::id).collect()
    }

    fn criteria(query: &str) -> SearchCriteria {
        SearchCriteria::from_params(&QueryParams::parse(Some(query))).unwrap()
    }

    #[test]
    fn first_post_on_empty_store_gets_id_one() {
        let mut store = PostStore::new();
        assert!(store.is_empty());
        assert_eq!(store.create(draft("a", "b")).id(), 1);
        assert!(!store.is_empty());
    }

    #[test]
    fn ids_exceed_current_maximum() {
        let mut store = PostStore::seeded();
        assert_eq!(store.create(draft("a", "b")).id(), 3);
        store.delete(1).unwrap();
        assert_eq!(store.create(draft("c", "d")).id(), 4);
        store.delete(4).unwrap();
        assert_eq!(store.create(draft("e", "f")).id(), 4);
    }

    #[test]
    fn create_appends_and_round_trips() {
        let mut store = PostStore::seeded();
        let created = store.create(draft("Third", "Body"));
        assert_eq!(ids(&store.list(None)), vec![1, 2, 3]);
        let fetched = store.get(created.id()).unwrap();
        assert_eq!(fetched.title(), "Third");
        assert_eq!(fetched.content(), "Body");
    }

    #[test]
    fn get_unknown_id_is_not_found() {
        let store = PostStore::seeded();
        assert_eq!(store.get(42), Err(ApiError::PostNotFound { id: 42 }));
    }

    #[test]
    fn list_sorts_without_touching_store_order() {
        let mut store = PostStore::new();
        store.create(draft("banana", "3"));
        store.create(draft("Apple", "1"));
        store.create(draft("cherry", "2"));
        let by_title = Sort {
            field: SortField::Title,
            direction: Direction::Asc,
        };
        assert_eq!(ids(&store.list(Some(by_title))), vec![2, 1, 3]);
        let by_content = Sort {
            field: SortField::Content,
            direction: Direction::Desc,
        };
        assert_eq!(ids(&store.list(Some(by_content))), vec![1, 3, 2]);
        assert_eq!(ids(&store.list(None)), vec![1, 2, 3]);
        assert_eq!(store.list(Some(by_title)), store.list(Some(by_title)));
    }

    #[test]
    fn update_keeps_id_and_replaces_fields() {
        let mut store = PostStore::seeded();
        let updated = store.update(2, changes("New", "Text")).unwrap();
        assert_eq!(updated.id(), 2);
        assert_eq!(updated.title(), "New");
        assert_eq!(updated.content(), "Text");
        assert_eq!(store.get(2).unwrap(), &updated);
    }

    #[test]
    fn update_checks_existence_before_fields() {
        let mut store = PostStore::seeded();
        assert_eq!(
            store.update(9, PostChanges::default()),
            Err(ApiError::PostNotFound { id: 9 })
        );
        assert_eq!(
            store.update(1, changes("", "Text")),
            Err(ApiError::MissingFields)
        );
        assert_eq!(store.get(1).unwrap().title(), "First post");
    }

    #[test]
    fn delete_removes_post() {
        let mut store = PostStore::seeded();
        let removed = store.delete(1).unwrap();
        assert_eq!(removed.id(), 1);
        assert_eq!(store.get(1), Err(ApiError::PostNotFound { id: 1 }));
        assert_eq!(store.delete(1), Err(ApiError::PostNotFound { id: 1 }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn search_by_title_on_seed_data() {
        let store = PostStore::seeded();
        assert_eq!(ids(&store.search(&criteria("title=first"))), vec![1]);
    }

    #[test]
    fn search_filters_then_sorts() {
        let mut store = PostStore::seeded();
        store.create(draft("Another post", "Also a post."));
        let results = store.search(&criteria("content=POST&sort=title&direction=desc"));
        assert_eq!(ids(&results), vec![2, 1, 3]);
    }

    #[test]
    fn search_without_matches_is_empty() {
        let store = PostStore::seeded();
        assert!(store.search(&criteria("title=zzz")).is_empty());
    }
}
