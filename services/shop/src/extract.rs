//! Extractor wrappers whose rejections render as [`ShopError`].

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ShopError;

/// JSON request body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ShopError))]
pub struct JsonBody<T>(pub T);

/// Typed path parameters.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ShopError))]
pub struct PathParam<T>(pub T);

/// Typed query string.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ShopError))]
pub struct QueryParams<T>(pub T);
