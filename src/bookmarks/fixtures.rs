use super::model::NewBookmark;

pub fn bookmark(n: usize) -> NewBookmark {
    NewBookmark {
        title: format!("Title {n}"),
        url: "example.com".to_string(),
        desc: Some("some desc text".to_string()),
        rating: Some(n as i64),
    }
}

pub fn bookmarks() -> Vec<NewBookmark> {
    (1..=3).map(bookmark).collect()
}
