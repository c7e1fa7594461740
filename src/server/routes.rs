use serde::de::DeserializeOwned;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use super::handlers;
use crate::api::ProviderFactory;

const MAX_BODY_BYTES: u64 = 16 * 1024;

/// The full route tree. Apply [`handle_rejection`] with `.recover` before
/// serving so malformed bodies and unknown paths share the error envelope.
pub fn routes(
    factory: Arc<dyn ProviderFactory>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    health()
        .or(accounts(factory.clone()))
        .or(test_connection(factory.clone()))
        .or(execute_trade(factory.clone()))
        .or(get_positions(factory.clone()))
        .or(close_position(factory.clone()))
        .or(close_all_positions(factory.clone()))
        .or(get_history(factory))
}

fn health() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("health")
        .and(warp::get())
        .and_then(handlers::health)
}

fn accounts(
    factory: Arc<dyn ProviderFactory>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "metaapi" / "accounts")
        .and(warp::post())
        .and(json_body())
        .and(with_factory(factory))
        .and_then(handlers::accounts)
}

fn test_connection(
    factory: Arc<dyn ProviderFactory>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "metaapi" / "test-connection")
        .and(warp::post())
        .and(json_body())
        .and(with_factory(factory))
        .and_then(handlers::test_connection)
}

fn execute_trade(
    factory: Arc<dyn ProviderFactory>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "metaapi" / "execute-trade")
        .and(warp::post())
        .and(json_body())
        .and(with_factory(factory))
        .and_then(handlers::execute_trade)
}

fn get_positions(
    factory: Arc<dyn ProviderFactory>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "metaapi" / "get-positions")
        .and(warp::post())
        .and(json_body())
        .and(with_factory(factory))
        .and_then(handlers::get_positions)
}

fn close_position(
    factory: Arc<dyn ProviderFactory>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "metaapi" / "close-position")
        .and(warp::post())
        .and(json_body())
        .and(with_factory(factory))
        .and_then(handlers::close_position)
}

fn close_all_positions(
    factory: Arc<dyn ProviderFactory>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "metaapi" / "close-all-positions")
        .and(warp::post())
        .and(json_body())
        .and(with_factory(factory))
        .and_then(handlers::close_all_positions)
}

fn get_history(
    factory: Arc<dyn ProviderFactory>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "metaapi" / "get-history")
        .and(warp::post())
        .and(json_body())
        .and(with_factory(factory))
        .and_then(handlers::get_history)
}

fn json_body<T: DeserializeOwned + Send>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

fn with_factory(
    factory: Arc<dyn ProviderFactory>,
) -> impl Filter<Extract = (Arc<dyn ProviderFactory>,), Error = Infallible> + Clone {
    warp::any().map(move || factory.clone())
}

/// Maps warp rejections onto the gateway's error envelope.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (
            StatusCode::BAD_REQUEST,
            format!("Invalid request body: {}", e),
        )
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::BAD_REQUEST,
            "Request body too large".to_string(),
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed".to_string(),
        )
    } else {
        tracing::error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&json!({ "success": false, "error": message })),
        status,
    ))
}
