use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Extension, Json,
};
use katalog_core::{find_by_id, query_products, NormalizedProduct, ProductQuery};
use katalog_upstream::normalize_product;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_upstream_error, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ProductListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct ProductListData {
    products: Vec<NormalizedProduct>,
    total_products: usize,
    page: usize,
    limit: usize,
    total_pages: usize,
}

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<ProductListQuery>, QueryRejection>,
) -> Result<Json<ProductListData>, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        ApiError::new(
            "bad_request",
            format!("Invalid query parameters: {}", rejection.body_text()),
        )
    })?;

    let products = load_catalog(&state, &req_id.0).await?;
    let page = query_products(
        products,
        &state.categories,
        &ProductQuery {
            category: query.category.as_deref(),
            search: query.search.as_deref(),
            page: query.page,
            limit: query.limit,
        },
    );

    tracing::debug!(
        request_id = %req_id.0,
        category = query.category.as_deref().unwrap_or(""),
        search = query.search.as_deref().unwrap_or(""),
        total = page.total,
        returned = page.items.len(),
        "product query served"
    );

    let total_pages = page.total_pages();
    Ok(Json(ProductListData {
        products: page.items,
        total_products: page.total,
        page: page.pagination.page,
        limit: page.pagination.limit,
        total_pages,
    }))
}

pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(product_id): Path<String>,
) -> Result<Json<NormalizedProduct>, ApiError> {
    let products = load_catalog(&state, &req_id.0).await?;

    find_by_id(&products, &product_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::new("not_found", "Product not found."))
}

/// Fetches the full upstream list with the stored token and normalizes it.
async fn load_catalog(
    state: &AppState,
    request_id: &str,
) -> Result<Vec<NormalizedProduct>, ApiError> {
    let Some(token) = state.tokens.get().await else {
        return Err(ApiError::new(
            "missing_token",
            "Authorization token is missing. Please log in.",
        ));
    };

    let raw = state
        .upstream
        .fetch_products(&token)
        .await
        .map_err(|e| map_upstream_error(request_id, "Error fetching products", &e))?;

    Ok(raw.into_iter().map(normalize_product).collect())
}
