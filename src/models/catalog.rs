use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entities::{authors, books};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    #[serde(default)]
    pub id: Option<i32>,
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
}

impl From<authors::Model> for Author {
    fn from(model: authors::Model) -> Self {
        Self {
            id: Some(model.id),
            name: model.name,
            surname: model.surname,
            description: model.description,
            birth_date: model.birth_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(default)]
    pub id: Option<i32>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub publication_date: Option<NaiveDate>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub author_id: Option<i32>,
}

impl From<books::Model> for Book {
    fn from(model: books::Model) -> Self {
        Self {
            id: Some(model.id),
            title: model.title,
            description: model.description,
            publication_date: model.publication_date,
            price: model.price,
            author_id: model.author_id,
        }
    }
}

/// One page of a listing, plus the unpaged total.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}
