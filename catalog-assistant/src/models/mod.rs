pub mod chat;
pub mod product;

pub use chat::{ChatRequest, ChatResponse, RawReply, Recommendation, RecommendationSet, StructuredReply};
pub use product::{ListProductsQuery, PageWindow, ProductPage, SearchQuery, SearchResponse};
