//! Keyword-based category classification
//!
//! A category is a named vocabulary of keywords. An item belongs to a
//! category when any vocabulary keyword equals (case-insensitively) one of
//! the item's keywords. Categories overlap freely.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::CatalogItem;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryVocabulary {
    pub name: String,
    pub keywords: Vec<String>,
}

impl CategoryVocabulary {
    pub fn new<I, S>(name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}

/// Items matched by one category, in collection order.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMatches<'a> {
    pub category: &'a str,
    pub items: Vec<&'a CatalogItem>,
}

#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    categories: Vec<CategoryVocabulary>,
}

impl KeywordClassifier {
    /// Vocabulary keywords are normalized (trimmed, lower-cased) once here.
    pub fn new(categories: Vec<CategoryVocabulary>) -> Self {
        let categories = categories
            .into_iter()
            .map(|category| CategoryVocabulary {
                keywords: category.keywords.iter().map(|k| normalize(k)).collect(),
                name: category.name,
            })
            .collect();
        Self { categories }
    }

    pub fn categories(&self) -> &[CategoryVocabulary] {
        &self.categories
    }

    pub fn matches(&self, category: &CategoryVocabulary, item: &CatalogItem) -> bool {
        item.keywords.iter().any(|keyword| {
            let keyword = normalize(keyword);
            category.keywords.iter().any(|vocab| *vocab == keyword)
        })
    }

    /// Names of every category the item falls into, in vocabulary order.
    pub fn categories_for<'a>(&'a self, item: &CatalogItem) -> Vec<&'a str> {
        self.categories
            .iter()
            .filter(|category| self.matches(category, item))
            .map(|category| category.name.as_str())
            .collect()
    }

    /// Bucket the collection per category. Every configured category gets a
    /// bucket, even an empty one.
    pub fn classify<'a>(&'a self, items: &'a [CatalogItem]) -> Vec<CategoryMatches<'a>> {
        self.categories
            .iter()
            .map(|category| CategoryMatches {
                category: category.name.as_str(),
                items: items.iter().filter(|item| self.matches(category, item)).collect(),
            })
            .collect()
    }
}

fn normalize(keyword: &str) -> String {
    keyword.trim().to_lowercase()
}
