use serde::{Deserialize, Serialize};

/// Single-resource wrapper used by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PageLinks {
    #[serde(default)]
    pub first: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageMeta {
    pub current_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub last_page: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub links: PageLinks,
    pub meta: PageMeta,
}

impl<T> Paginated<T> {
    pub fn has_next(&self) -> bool {
        self.meta.current_page < self.meta.last_page
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// List parameters shared by every paginated endpoint.
#[derive(Debug, Clone, Default)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub sort: Option<(String, SortDirection)>,
    pub filters: Vec<(String, String)>,
}

impl PageQuery {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn search(mut self, term: &str) -> Self {
        let term = term.trim();
        self.search = (!term.is_empty()).then(|| term.to_string());
        self
    }

    pub fn sort(mut self, column: &str, direction: SortDirection) -> Self {
        self.sort = Some((column.to_string(), direction));
        self
    }

    pub fn filter(mut self, key: &str, value: &str) -> Self {
        self.filters.push((key.to_string(), value.to_string()));
        self
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut q = Vec::new();
        if let Some(page) = self.page {
            q.push(("page".to_string(), page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            q.push(("per_page".to_string(), per_page.to_string()));
        }
        if let Some(search) = &self.search {
            q.push(("search".to_string(), search.clone()));
        }
        if let Some((column, direction)) = &self.sort {
            q.push(("sort_by".to_string(), column.clone()));
            let dir = match direction {
                SortDirection::Asc => "asc",
                SortDirection::Desc => "desc",
            };
            q.push(("sort_dir".to_string(), dir.to_string()));
        }
        q.extend(self.filters.iter().cloned());
        q
    }
}
