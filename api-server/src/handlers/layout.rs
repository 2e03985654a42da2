//! Feature layout handler
//!
//! Lets model builders diff the serving layout against their training columns.

use axum::Json;

use carprice_core::LayoutInfo;

pub async fn get() -> Json<LayoutInfo> {
    Json(LayoutInfo::current())
}
