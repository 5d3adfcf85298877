use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};

/// Paging parameters for `GET /api/products`. Values are not validated
/// beyond defaulting; the REST layer decides what to do with odd windows.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListProductsQuery {
    /// 1-based page number.
    #[serde(default = "default_page")]
    #[param(default = 1)]
    pub page: i32,
    #[serde(default = "default_page_size")]
    #[param(default = 10)]
    pub page_size: i32,
}

fn default_page() -> i32 {
    1
}

fn default_page_size() -> i32 {
    10
}

impl Default for ListProductsQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

/// `$first` / `$after` window sent to the entity REST service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub first: i64,
    pub after: i64,
}

impl PageWindow {
    /// Zero-based offset `(page - 1) * page_size`, computed in i64 so any
    /// pair of i32 inputs is representable.
    pub fn for_page(page: i32, page_size: i32) -> Self {
        Self {
            first: i64::from(page_size),
            after: (i64::from(page) - 1) * i64::from(page_size),
        }
    }
}

impl From<ListProductsQuery> for PageWindow {
    fn from(query: ListProductsQuery) -> Self {
        PageWindow::for_page(query.page, query.page_size)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub page: i32,
    pub page_size: i32,
    /// Product rows exactly as returned by the REST layer.
    #[schema(value_type = Vec<Object>)]
    pub products: Vec<Value>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Free text matched against the catalog by vector similarity.
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SearchResponse {
    pub query: String,
    #[schema(value_type = Vec<Object>)]
    pub results: Vec<Map<String, Value>>,
}
